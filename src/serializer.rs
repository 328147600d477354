//! Serializer for converting a token tree back to lambda notation.

use crate::ast::{Token, TokenKind};

/// Serialize a token chain to its canonical source form.
///
/// Siblings are separated by a single space and every group keeps its own
/// parentheses, so `parse(serialize(t)) == t` for any parsed tree.
pub fn serialize(token: &Token) -> String {
    let mut output = String::new();
    serialize_chain(&mut output, token);
    output
}

fn serialize_chain(output: &mut String, token: &Token) {
    for (i, tok) in token.siblings().enumerate() {
        if i > 0 {
            output.push(' ');
        }
        serialize_term(output, tok);
    }
}

fn serialize_term(output: &mut String, token: &Token) {
    match &token.kind {
        TokenKind::Var(c) => output.push(*c),
        TokenKind::Group { binders, body } => {
            output.push('(');
            if !binders.is_empty() {
                output.push('\\');
                output.extend(binders.iter());
                output.push('.');
            }
            serialize_chain(output, body);
            output.push(')');
        }
    }
}
