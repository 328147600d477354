/// One parsed unit of a lambda term.
///
/// Terms in the same application chain are linked through `next`, so the
/// term `f x y` is three tokens `f -> x -> y`.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub next: Option<Box<Token>>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    /// A single-letter variable reference.
    Var(char),
    /// A parenthesised group. `binders` is empty for a plain application group.
    Group { binders: Vec<char>, body: Box<Token> },
}

impl Token {
    pub fn var(name: char) -> Self {
        Self {
            kind: TokenKind::Var(name),
            next: None,
        }
    }

    pub fn group(binders: Vec<char>, body: Token) -> Self {
        Self {
            kind: TokenKind::Group {
                binders,
                body: Box::new(body),
            },
            next: None,
        }
    }

    /// First token of the group body, `None` for a variable reference.
    pub fn child(&self) -> Option<&Token> {
        match &self.kind {
            TokenKind::Var(_) => None,
            TokenKind::Group { body, .. } => Some(body),
        }
    }

    pub fn binders(&self) -> &[char] {
        match &self.kind {
            TokenKind::Var(_) => &[],
            TokenKind::Group { binders, .. } => binders,
        }
    }

    /// The identifier of a leaf, or the first binder of an abstraction.
    pub fn identifier(&self) -> Option<char> {
        match &self.kind {
            TokenKind::Var(c) => Some(*c),
            TokenKind::Group { binders, .. } => binders.first().copied(),
        }
    }

    pub fn is_abstraction(&self) -> bool {
        !self.binders().is_empty()
    }

    pub fn next(&self) -> Option<&Token> {
        self.next.as_deref()
    }

    /// Iterate this token and every sibling after it.
    pub fn siblings(&self) -> Siblings<'_> {
        Siblings { cur: Some(self) }
    }

    /// Total number of tokens in this chain and all nested bodies.
    pub fn size(&self) -> usize {
        self.siblings()
            .map(|t| 1 + t.child().map_or(0, Token::size))
            .sum()
    }
}

impl Drop for Token {
    // unlink the sibling chain iteratively
    fn drop(&mut self) {
        let mut cur = self.next.take();
        while let Some(mut tok) = cur {
            cur = tok.next.take();
        }
    }
}

pub struct Siblings<'a> {
    cur: Option<&'a Token>,
}

impl<'a> Iterator for Siblings<'a> {
    type Item = &'a Token;

    fn next(&mut self) -> Option<Self::Item> {
        let tok = self.cur?;
        self.cur = tok.next();
        Some(tok)
    }
}

/// Link a list of tokens into a right-leaning chain.
pub fn chain(tokens: Vec<Token>) -> Option<Token> {
    tokens.into_iter().rev().fold(None, |next, mut tok| {
        tok.next = next.map(Box::new);
        Some(tok)
    })
}
