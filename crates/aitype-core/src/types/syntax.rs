//! Textual type expressions, the inverse of the [`Type`] printer.
//!
//! ```text
//! type   := member ('|' member)*
//! member := name
//!         | '[' (type (',' type)*)? ']'
//!         | '@(' ('...' name | (type (',' type)*)?) ')' ':' type
//!         | '(' type ')'
//! ```

use super::Type;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} at offset {offset}")]
pub struct TypeSyntaxError {
    pub message: String,
    pub offset: usize,
}

pub fn parse_type(source: &str) -> Result<Type, TypeSyntaxError> {
    let mut parser = TypeParser { source, pos: 0 };
    let typ = parser.parse_type()?;
    parser.skip_whitespace();
    if parser.pos < source.len() {
        return Err(parser.error("unexpected trailing input"));
    }
    Ok(typ)
}

impl FromStr for Type {
    type Err = TypeSyntaxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_type(s)
    }
}

struct TypeParser<'a> {
    source: &'a str,
    pos: usize,
}

impl TypeParser<'_> {
    fn parse_type(&mut self) -> Result<Type, TypeSyntaxError> {
        let first = self.parse_member()?;
        if !self.peek_is("|") {
            return Ok(first);
        }

        let mut members = vec![first];
        while self.eat("|") {
            members.push(self.parse_member()?);
        }
        Ok(Type::Union(members))
    }

    fn parse_member(&mut self) -> Result<Type, TypeSyntaxError> {
        self.skip_whitespace();
        match self.peek() {
            Some('@') => {
                self.pos += 1;
                self.expect("(")?;
                let args = if self.eat("...") {
                    let rest = Type::Primitive(self.parse_name()?);
                    self.expect(")")?;
                    rest
                } else {
                    Type::Tuple(self.parse_list(")")?)
                };
                self.expect(":")?;
                let return_type = self.parse_type()?;
                Ok(Type::function(args, return_type))
            }
            Some('[') => {
                self.pos += 1;
                Ok(Type::Tuple(self.parse_list("]")?))
            }
            Some('(') => {
                self.pos += 1;
                let inner = self.parse_type()?;
                self.expect(")")?;
                Ok(inner)
            }
            Some(c) if is_name_char(c) => Ok(Type::Primitive(self.parse_name()?)),
            Some(c) => Err(self.error(format!("unexpected character '{}'", c))),
            None => Err(self.error("unexpected end of type expression")),
        }
    }

    /// Comma-separated types up to and including `close`
    fn parse_list(&mut self, close: &str) -> Result<Vec<Type>, TypeSyntaxError> {
        let mut items = Vec::new();
        if self.eat(close) {
            return Ok(items);
        }
        loop {
            items.push(self.parse_type()?);
            if !self.eat(",") {
                break;
            }
        }
        self.expect(close)?;
        Ok(items)
    }

    fn parse_name(&mut self) -> Result<String, TypeSyntaxError> {
        self.skip_whitespace();
        let rest = &self.source[self.pos..];
        let len = rest
            .char_indices()
            .find(|&(_, c)| !is_name_char(c))
            .map(|(i, _)| i)
            .unwrap_or(rest.len());
        if len == 0 {
            return Err(self.error("expected a type name"));
        }
        self.pos += len;
        Ok(rest[..len].to_string())
    }

    fn skip_whitespace(&mut self) {
        let rest = &self.source[self.pos..];
        self.pos += rest.len() - rest.trim_start().len();
    }

    fn peek(&self) -> Option<char> {
        self.source[self.pos..].chars().next()
    }

    fn peek_is(&mut self, token: &str) -> bool {
        self.skip_whitespace();
        self.source[self.pos..].starts_with(token)
    }

    fn eat(&mut self, token: &str) -> bool {
        if self.peek_is(token) {
            self.pos += token.len();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, token: &str) -> Result<(), TypeSyntaxError> {
        if self.eat(token) {
            Ok(())
        } else {
            Err(self.error(format!("expected '{}'", token)))
        }
    }

    fn error(&self, message: impl Into<String>) -> TypeSyntaxError {
        TypeSyntaxError {
            message: message.into(),
            offset: self.pos,
        }
    }
}

fn is_name_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}
