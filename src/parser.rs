use crate::ast::{Token, chain};
use crate::lexer::{LexError, Lexeme, Lexer, Symbol};

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SyntaxErrorKind {
    #[error("Empty input, expected a term")]
    EmptyInput,
    #[error("Empty group, expected a term before the closing parenthesis")]
    UnterminatedGroup,
    #[error("Abstraction has no bound variable, expected a letter before '.'")]
    MissingBinder,
    #[error("Abstraction is missing '.', expected '.' after the bound variables")]
    MissingDot,
    #[error("Mismatched parentheses, expected a matching pair")]
    MismatchedParentheses,
    #[error("Unexpected symbol {0:?}, expected a letter or '('")]
    UnexpectedSymbol(char),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("{kind} (at position {position})")]
pub struct SyntaxError {
    pub kind: SyntaxErrorKind,
    pub position: usize,
}

impl SyntaxError {
    pub fn new(kind: SyntaxErrorKind, position: usize) -> Self {
        Self { kind, position }
    }
}

impl From<LexError> for SyntaxError {
    fn from(err: LexError) -> Self {
        match err {
            LexError::UnexpectedChar { ch, position } => {
                Self::new(SyntaxErrorKind::UnexpectedSymbol(ch), position)
            }
        }
    }
}

/// Parse a lambda term. The returned token is the head of the top-level chain.
pub fn parse(input: &str) -> Result<Token, SyntaxError> {
    Parser::new(input)?.parse()
}

/// Recursive-descent parser over a fully scanned lexeme buffer.
///
/// Every rule works on a half-open range `start..end` of the buffer, so a
/// group body is parsed by recursing into the range between its parentheses.
pub struct Parser {
    lexemes: Vec<Lexeme>,
    end_position: usize,
}

/// Check that every `(` has a matching `)`, reporting the first stray `)`
/// or the outermost unclosed `(`. Runs on the raw text so that unbalanced
/// input is reported as such whatever else is wrong with it.
fn check_balance(input: &str) -> Result<(), SyntaxError> {
    let mut open = Vec::new();
    for (position, c) in input.chars().enumerate() {
        match c {
            '(' => open.push(position),
            ')' => {
                if open.pop().is_none() {
                    return Err(SyntaxError::new(
                        SyntaxErrorKind::MismatchedParentheses,
                        position,
                    ));
                }
            }
            _ => {}
        }
    }
    match open.first() {
        Some(&position) => Err(SyntaxError::new(
            SyntaxErrorKind::MismatchedParentheses,
            position,
        )),
        None => Ok(()),
    }
}

impl Parser {
    pub fn new(input: &str) -> Result<Self, SyntaxError> {
        check_balance(input)?;
        let lexemes = Lexer::new(input).tokenize()?;
        Ok(Self {
            lexemes,
            end_position: input.chars().count(),
        })
    }

    pub fn parse(&self) -> Result<Token, SyntaxError> {
        if self.lexemes.is_empty() {
            return Err(SyntaxError::new(SyntaxErrorKind::EmptyInput, 0));
        }
        self.parse_sequence(0, self.lexemes.len())
    }

    fn position(&self, idx: usize) -> usize {
        self.lexemes
            .get(idx)
            .map_or(self.end_position, |l| l.position)
    }

    /// Parse a non-empty range as a chain of sibling terms.
    fn parse_sequence(&self, start: usize, end: usize) -> Result<Token, SyntaxError> {
        let mut terms = Vec::new();
        let mut idx = start;
        while idx < end {
            let (term, consumed) = self.parse_term(idx, end)?;
            terms.push(term);
            idx = consumed;
        }
        chain(terms).ok_or_else(|| {
            SyntaxError::new(SyntaxErrorKind::UnterminatedGroup, self.position(start))
        })
    }

    /// Parse one term starting at `start`, returning it and the index after it.
    fn parse_term(&self, start: usize, end: usize) -> Result<(Token, usize), SyntaxError> {
        let lexeme = self.lexemes[start];
        match lexeme.symbol {
            Symbol::Letter(c) => Ok((Token::var(c), start + 1)),
            Symbol::LParen => {
                let close = self.matching_paren(start, end)?;
                let group = self.parse_group(start, close)?;
                Ok((group, close + 1))
            }
            Symbol::RParen => Err(SyntaxError::new(
                SyntaxErrorKind::MismatchedParentheses,
                lexeme.position,
            )),
            Symbol::Lambda => Err(SyntaxError::new(
                SyntaxErrorKind::UnexpectedSymbol('\\'),
                lexeme.position,
            )),
            Symbol::Dot => Err(SyntaxError::new(
                SyntaxErrorKind::UnexpectedSymbol('.'),
                lexeme.position,
            )),
        }
    }

    /// Find the `)` closing the `(` at `open`, searching no further than `end`.
    fn matching_paren(&self, open: usize, end: usize) -> Result<usize, SyntaxError> {
        let mut depth = 0usize;
        for idx in open..end {
            match self.lexemes[idx].symbol {
                Symbol::LParen => depth += 1,
                Symbol::RParen => {
                    depth -= 1;
                    if depth == 0 {
                        return Ok(idx);
                    }
                }
                _ => {}
            }
        }
        Err(SyntaxError::new(
            SyntaxErrorKind::MismatchedParentheses,
            self.position(open),
        ))
    }

    /// Parse the group delimited by the parentheses at `open` and `close`.
    fn parse_group(&self, open: usize, close: usize) -> Result<Token, SyntaxError> {
        let start = open + 1;
        if start == close {
            return Err(SyntaxError::new(
                SyntaxErrorKind::UnterminatedGroup,
                self.position(close),
            ));
        }

        if self.lexemes[start].symbol != Symbol::Lambda {
            let body = self.parse_sequence(start, close)?;
            return Ok(Token::group(Vec::new(), body));
        }

        let mut idx = start + 1;
        let mut binders = Vec::new();
        while idx < close {
            match self.lexemes[idx].symbol {
                Symbol::Letter(c) => binders.push(c),
                _ => break,
            }
            idx += 1;
        }

        if binders.is_empty() {
            return Err(SyntaxError::new(
                SyntaxErrorKind::MissingBinder,
                self.position(idx),
            ));
        }
        if idx == close || self.lexemes[idx].symbol != Symbol::Dot {
            return Err(SyntaxError::new(
                SyntaxErrorKind::MissingDot,
                self.position(idx),
            ));
        }

        let body_start = idx + 1;
        if body_start == close {
            return Err(SyntaxError::new(
                SyntaxErrorKind::UnterminatedGroup,
                self.position(close),
            ));
        }

        let body = self.parse_sequence(body_start, close)?;
        Ok(Token::group(binders, body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::TokenKind;
    use proptest::prelude::*;

    fn kind_of(input: &str) -> SyntaxErrorKind {
        parse(input).unwrap_err().kind
    }

    #[test]
    fn test_parse_identity() {
        let tree = parse(r"(\x.x)").unwrap();
        assert_eq!(tree.binders(), &['x']);
        assert_eq!(tree.child(), Some(&Token::var('x')));
        assert!(tree.next().is_none());
    }

    #[test]
    fn test_parse_self_application() {
        let tree = parse(r"(\x.(x x))").unwrap();
        let body = tree.child().unwrap();
        assert!(!body.is_abstraction());
        let inner: Vec<char> = body
            .child()
            .unwrap()
            .siblings()
            .filter_map(Token::identifier)
            .collect();
        assert_eq!(inner, vec!['x', 'x']);
    }

    #[test]
    fn test_parse_multiple_binders() {
        let tree = parse(r"(\xyz.x z (y z))").unwrap();
        assert_eq!(tree.binders(), &['x', 'y', 'z']);
        assert_eq!(tree.child().unwrap().siblings().count(), 3);
    }

    #[test]
    fn test_parse_top_level_chain() {
        let tree = parse(r"(\x.x) y (z)").unwrap();
        let kinds: Vec<&TokenKind> = tree.siblings().map(|t| &t.kind).collect();
        assert_eq!(kinds.len(), 3);
        assert_eq!(kinds[1], &TokenKind::Var('y'));
    }

    #[test]
    fn test_whitespace_is_ignored() {
        assert_eq!(parse(r" ( \ x . x ) ").unwrap(), parse(r"(\x.x)").unwrap());
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(kind_of(""), SyntaxErrorKind::EmptyInput);
        assert_eq!(kind_of("   "), SyntaxErrorKind::EmptyInput);
    }

    #[test]
    fn test_unclosed_paren() {
        let err = parse(r"(\x.(x x)").unwrap_err();
        assert_eq!(err.kind, SyntaxErrorKind::MismatchedParentheses);
        assert_eq!(err.position, 0);
    }

    #[test]
    fn test_stray_close_paren() {
        let err = parse("x) (y").unwrap_err();
        assert_eq!(err.kind, SyntaxErrorKind::MismatchedParentheses);
        assert_eq!(err.position, 1);
    }

    #[test]
    fn test_unbalanced_parens_win_over_other_errors() {
        for input in [r"(\.x) (", "() (", r"\x (", "x 1 (", r"(\x x) ("] {
            let err = parse(input).unwrap_err();
            assert_eq!(err.kind, SyntaxErrorKind::MismatchedParentheses, "{input}");
            assert_eq!(err.position, input.chars().count() - 1, "{input}");
        }
    }

    #[test]
    fn test_long_application_chain() {
        let mut input = String::from(r"(\x.");
        for _ in 0..100_000 {
            input.push_str("x ");
        }
        input.push(')');
        let tree = parse(&input).unwrap();
        assert_eq!(tree.child().unwrap().siblings().count(), 100_000);
    }

    proptest! {
        #[test]
        fn unclosed_paren_is_always_mismatched(text in ".{0,40}") {
            let input = format!("{text}(");
            let err = parse(&input).unwrap_err();
            prop_assert_eq!(err.kind, SyntaxErrorKind::MismatchedParentheses);
        }

        #[test]
        fn stray_close_paren_is_always_mismatched(text in "[a-z\\\\. ]{0,20}") {
            let input = format!("{text})");
            let err = parse(&input).unwrap_err();
            prop_assert_eq!(err.kind, SyntaxErrorKind::MismatchedParentheses);
            prop_assert_eq!(err.position, text.chars().count());
        }
    }

    #[test]
    fn test_empty_group() {
        assert_eq!(kind_of("()"), SyntaxErrorKind::UnterminatedGroup);
        assert_eq!(kind_of(r"(\x.)"), SyntaxErrorKind::UnterminatedGroup);
        let msg = parse("()").unwrap_err().to_string();
        assert!(msg.starts_with("Empty group"), "{msg}");
    }

    #[test]
    fn test_missing_binder() {
        let err = parse(r"(\.x)").unwrap_err();
        assert_eq!(err.kind, SyntaxErrorKind::MissingBinder);
        assert_eq!(err.position, 2);
    }

    #[test]
    fn test_missing_dot() {
        assert_eq!(kind_of(r"(\x x)"), SyntaxErrorKind::MissingDot);
        assert_eq!(kind_of(r"(\xy)"), SyntaxErrorKind::MissingDot);
    }

    #[test]
    fn test_unexpected_symbol() {
        assert_eq!(kind_of(r"\x.x"), SyntaxErrorKind::UnexpectedSymbol('\\'));
        assert_eq!(kind_of("(. x)"), SyntaxErrorKind::UnexpectedSymbol('.'));
        assert_eq!(kind_of("(x 2)"), SyntaxErrorKind::UnexpectedSymbol('2'));
    }

    #[test]
    fn test_error_message_names_expectation() {
        let msg = parse("").unwrap_err().to_string();
        assert!(msg.contains("expected a term"));
    }
}
