use std::iter::{Enumerate, Peekable};
use std::str::Chars;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Symbol {
    Letter(char),
    LParen,    // (
    RParen,    // )
    Lambda,    // \
    Dot,       // .
}

/// A symbol together with its character offset in the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lexeme {
    pub symbol: Symbol,
    pub position: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LexError {
    #[error("Unexpected character {ch:?} at position {position}")]
    UnexpectedChar { ch: char, position: usize },
}

pub struct Lexer<'a> {
    chars: Peekable<Enumerate<Chars<'a>>>,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            chars: input.chars().enumerate().peekable(),
        }
    }

    fn skip_whitespace(&mut self) {
        while let Some(&(_, c)) = self.chars.peek() {
            if !c.is_whitespace() {
                break;
            }
            self.chars.next();
        }
    }

    pub fn next_lexeme(&mut self) -> Result<Option<Lexeme>, LexError> {
        self.skip_whitespace();

        let (position, c) = match self.chars.next() {
            Some(pair) => pair,
            None => return Ok(None),
        };

        let symbol = match c {
            '(' => Symbol::LParen,
            ')' => Symbol::RParen,
            '\\' => Symbol::Lambda,
            '.' => Symbol::Dot,
            c if c.is_ascii_alphabetic() => Symbol::Letter(c),
            _ => return Err(LexError::UnexpectedChar { ch: c, position }),
        };

        Ok(Some(Lexeme { symbol, position }))
    }

    pub fn tokenize(mut self) -> Result<Vec<Lexeme>, LexError> {
        let mut lexemes = Vec::new();
        while let Some(lexeme) = self.next_lexeme()? {
            lexemes.push(lexeme);
        }
        Ok(lexemes)
    }
}
