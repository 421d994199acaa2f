//! Signature text parser.
//!
//! Parses the canonical text form used by manifests, tests and diagnostics:
//!
//! ```text
//! fn_sig := "fn" "(" [ type { "," type } ] ")" type
//! type   := { "*" [ "const" ] } base
//! base   := "Self" | "anytype" | fn_sig | IDENT
//! ```
//!
//! A function signature in type position is a function pointer; the pointer
//! prefix in `*const fn(...) R` is accepted and folded into `TypeRef::FnPtr`.

use crate::types::{FnSig, TypeRef};
use shapecheck_common::limits::MAX_INDIRECTION_DEPTH;
use std::str::FromStr;
use std::sync::Arc;

/// Error produced while parsing signature text.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("unexpected end of input, expected {expected}")]
    UnexpectedEnd { expected: &'static str },
    #[error("unexpected '{found}' at offset {offset}, expected {expected}")]
    UnexpectedToken {
        found: String,
        offset: usize,
        expected: &'static str,
    },
    #[error("indirection depth {depth} at offset {offset} exceeds the limit of {limit}")]
    IndirectionTooDeep {
        depth: usize,
        offset: usize,
        limit: u8,
    },
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum Token<'a> {
    Star,
    LParen,
    RParen,
    Comma,
    Ident(&'a str),
}

impl Token<'_> {
    fn text(&self) -> &str {
        match self {
            Token::Star => "*",
            Token::LParen => "(",
            Token::RParen => ")",
            Token::Comma => ",",
            Token::Ident(text) => text,
        }
    }
}

fn is_ident_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || matches!(ch, '_' | '.' | '?' | '[' | ']')
}

fn tokenize(source: &str) -> Result<Vec<(Token<'_>, usize)>, ParseError> {
    let mut tokens = Vec::new();
    let mut chars = source.char_indices().peekable();
    while let Some((offset, ch)) = chars.next() {
        let token = match ch {
            c if c.is_whitespace() => continue,
            '*' => Token::Star,
            '(' => Token::LParen,
            ')' => Token::RParen,
            ',' => Token::Comma,
            c if is_ident_char(c) => {
                let mut end = offset + c.len_utf8();
                while let Some(&(next_offset, next)) = chars.peek() {
                    if !is_ident_char(next) {
                        break;
                    }
                    end = next_offset + next.len_utf8();
                    chars.next();
                }
                Token::Ident(&source[offset..end])
            }
            other => {
                return Err(ParseError::UnexpectedToken {
                    found: other.to_string(),
                    offset,
                    expected: "a type",
                });
            }
        };
        tokens.push((token, offset));
    }
    Ok(tokens)
}

struct SignatureParser<'a> {
    tokens: Vec<(Token<'a>, usize)>,
    pos: usize,
}

impl<'a> SignatureParser<'a> {
    fn new(source: &'a str) -> Result<Self, ParseError> {
        Ok(Self {
            tokens: tokenize(source)?,
            pos: 0,
        })
    }

    fn peek(&self) -> Option<&Token<'a>> {
        self.tokens.get(self.pos).map(|(token, _)| token)
    }

    fn bump(&mut self, expected: &'static str) -> Result<(Token<'a>, usize), ParseError> {
        let next = self
            .tokens
            .get(self.pos)
            .cloned()
            .ok_or(ParseError::UnexpectedEnd { expected })?;
        self.pos += 1;
        Ok(next)
    }

    fn expect(&mut self, want: Token<'a>, expected: &'static str) -> Result<(), ParseError> {
        let (token, offset) = self.bump(expected)?;
        if token == want {
            Ok(())
        } else {
            Err(unexpected(&token, offset, expected))
        }
    }

    fn finish(&self) -> Result<(), ParseError> {
        match self.tokens.get(self.pos) {
            None => Ok(()),
            Some((token, offset)) => Err(unexpected(token, *offset, "end of input")),
        }
    }

    fn parse_type(&mut self) -> Result<TypeRef, ParseError> {
        let mut depth = 0usize;
        while let Some(Token::Star) = self.peek() {
            let (_, offset) = self.bump("a type")?;
            depth += 1;
            if depth > usize::from(MAX_INDIRECTION_DEPTH) {
                return Err(ParseError::IndirectionTooDeep {
                    depth,
                    offset,
                    limit: MAX_INDIRECTION_DEPTH,
                });
            }
            if let Some(Token::Ident("const")) = self.peek() {
                self.pos += 1;
            }
        }

        let (token, offset) = self.bump("a type")?;
        match token {
            Token::Ident("fn") => Ok(TypeRef::fn_ptr(self.parse_fn_rest()?)),
            Token::Ident("anytype") if depth == 0 => Ok(TypeRef::Wildcard),
            Token::Ident("anytype") => Err(unexpected(&token, offset, "a pointee type")),
            Token::Ident(name) => {
                let name = self.join_const_slice(name);
                Ok(TypeRef::Named {
                    name: Arc::from(name),
                    depth: depth as u8,
                })
            }
            other => Err(unexpected(&other, offset, "a type")),
        }
    }

    /// `[]const u8` scans as `[]const` followed by `u8`.
    fn join_const_slice(&mut self, name: &str) -> String {
        if name.starts_with('[') && name.ends_with("const") {
            if let Some(Token::Ident(element)) = self.peek() {
                let joined = format!("{name} {element}");
                self.pos += 1;
                return joined;
            }
        }
        name.to_string()
    }

    /// Parses `( params ) ret` after the `fn` keyword.
    fn parse_fn_rest(&mut self) -> Result<FnSig, ParseError> {
        self.expect(Token::LParen, "'('")?;
        let mut params = Vec::new();
        if let Some(Token::RParen) = self.peek() {
            self.pos += 1;
        } else {
            loop {
                params.push(self.parse_type()?);
                let (token, offset) = self.bump("',' or ')'")?;
                match token {
                    Token::Comma => continue,
                    Token::RParen => break,
                    other => return Err(unexpected(&other, offset, "',' or ')'")),
                }
            }
        }
        let ret = self.parse_type()?;
        Ok(FnSig::new(params, ret))
    }

    fn parse_fn_sig(&mut self) -> Result<FnSig, ParseError> {
        let (token, offset) = self.bump("'fn'")?;
        if token != Token::Ident("fn") {
            return Err(unexpected(&token, offset, "'fn'"));
        }
        self.parse_fn_rest()
    }
}

fn unexpected(token: &Token<'_>, offset: usize, expected: &'static str) -> ParseError {
    ParseError::UnexpectedToken {
        found: token.text().to_string(),
        offset,
        expected,
    }
}

impl FromStr for TypeRef {
    type Err = ParseError;

    fn from_str(source: &str) -> Result<Self, Self::Err> {
        let mut parser = SignatureParser::new(source)?;
        let ty = parser.parse_type()?;
        parser.finish()?;
        Ok(ty)
    }
}

impl FromStr for FnSig {
    type Err = ParseError;

    fn from_str(source: &str) -> Result<Self, Self::Err> {
        let mut parser = SignatureParser::new(source)?;
        let sig = parser.parse_fn_sig()?;
        parser.finish()?;
        Ok(sig)
    }
}

#[cfg(test)]
#[path = "../tests/parse_tests.rs"]
mod tests;
