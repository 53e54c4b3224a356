//! Typed structural selectors.
//!
//! A deliberately small subset of CSS: compound selectors (`tag`, `*`, `#id`,
//! `.class`, `[attr]`, `[attr="value"]`, `:not(...)`) and comma lists.
//! Combinators are rejected because every lookup the assistant performs is
//! either a document-wide query or an explicit ancestor walk.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SelectorError;

/// Read-only view of an element, enough to evaluate a [`Selector`].
pub trait ElementLike {
    /// Lowercase tag name.
    fn tag_name(&self) -> &str;

    fn attribute(&self, name: &str) -> Option<&str>;
}

/// Structural predicate over a single element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Selector {
    /// `*`
    Any,
    Tag(String),
    Id(String),
    Class(String),
    HasAttr(String),
    AttrEquals { name: String, value: String },
    Not(Box<Selector>),
    /// Compound selector: every part must match.
    All(Vec<Selector>),
    /// Selector list: any alternative may match.
    AnyOf(Vec<Selector>),
}

impl Selector {
    /// Parse a selector string.
    pub fn parse(input: &str) -> Result<Self, SelectorError> {
        let mut parser = Parser::new(input);
        let selector = parser.selector_list()?;
        parser.skip_whitespace();
        if let Some(found) = parser.peek() {
            return Err(SelectorError::Unexpected {
                position: parser.pos,
                found,
            });
        }
        Ok(selector)
    }

    pub fn tag(name: impl Into<String>) -> Self {
        Self::Tag(name.into().to_ascii_lowercase())
    }

    pub fn class(name: impl Into<String>) -> Self {
        Self::Class(name.into())
    }

    pub fn attr(name: impl Into<String>) -> Self {
        Self::HasAttr(name.into())
    }

    pub fn attr_eq(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::AttrEquals {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Both `self` and `other` must match.
    ///
    /// Selector lists are distributed over the alternatives, so the result
    /// is always expressible as a comma list of compound selectors.
    pub fn and(self, other: Selector) -> Self {
        match (self, other) {
            (Self::AnyOf(alternatives), other) => Self::AnyOf(
                alternatives
                    .into_iter()
                    .map(|alternative| alternative.and(other.clone()))
                    .collect(),
            ),
            (this, Self::AnyOf(alternatives)) => Self::AnyOf(
                alternatives
                    .into_iter()
                    .map(|alternative| this.clone().and(alternative))
                    .collect(),
            ),
            (this, other) => this.and_compound(other),
        }
    }

    fn and_compound(self, other: Selector) -> Self {
        let mut parts = match self {
            Self::All(parts) => parts,
            single => vec![single],
        };
        match other {
            Self::All(more) => parts.extend(more),
            single => parts.push(single),
        }
        Self::All(parts)
    }

    pub fn not(self) -> Self {
        Self::Not(Box::new(self))
    }

    /// Evaluate against a single element.
    pub fn matches(&self, element: &dyn ElementLike) -> bool {
        match self {
            Self::Any => true,
            Self::Tag(tag) => element.tag_name().eq_ignore_ascii_case(tag),
            Self::Id(id) => element.attribute("id") == Some(id.as_str()),
            Self::Class(class) => element
                .attribute("class")
                .is_some_and(|classes| classes.split_whitespace().any(|c| c == class)),
            Self::HasAttr(name) => element.attribute(name).is_some(),
            Self::AttrEquals { name, value } => element.attribute(name) == Some(value.as_str()),
            Self::Not(inner) => !inner.matches(element),
            Self::All(parts) => parts.iter().all(|p| p.matches(element)),
            Self::AnyOf(alternatives) => alternatives.iter().any(|a| a.matches(element)),
        }
    }
}

impl FromStr for Selector {
    type Err = SelectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Selector {
    type Error = SelectorError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Selector> for String {
    fn from(selector: Selector) -> Self {
        selector.to_string()
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => write!(f, "*"),
            Self::Tag(tag) => write!(f, "{}", tag),
            Self::Id(id) => write!(f, "#{}", id),
            Self::Class(class) => write!(f, ".{}", class),
            Self::HasAttr(name) => write!(f, "[{}]", name),
            Self::AttrEquals { name, value } => {
                write!(f, "[{}=\"{}\"]", name, value.replace('\\', "\\\\").replace('"', "\\\""))
            }
            Self::Not(inner) => write!(f, ":not({})", inner),
            Self::All(parts) => {
                if let Some(list) = distribute(parts) {
                    return write!(f, "{}", list);
                }
                // Type selectors must lead a compound selector.
                let (leading, rest): (Vec<_>, Vec<_>) = parts
                    .iter()
                    .partition(|p| matches!(p, Self::Tag(_) | Self::Any));
                for part in leading.into_iter().chain(rest) {
                    write!(f, "{}", part)?;
                }
                Ok(())
            }
            Self::AnyOf(alternatives) => {
                for (i, alternative) in alternatives.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", alternative)?;
                }
                Ok(())
            }
        }
    }
}

struct Parser {
    chars: Vec<char>,
    pos: usize,
}

impl Parser {
    fn new(input: &str) -> Self {
        Self {
            chars: input.chars().collect(),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
    }

    fn expect(&mut self, expected: char, context: &'static str) -> Result<(), SelectorError> {
        match self.peek() {
            Some(c) if c == expected => {
                self.pos += 1;
                Ok(())
            }
            Some(found) => Err(SelectorError::Unexpected {
                position: self.pos,
                found,
            }),
            None => Err(SelectorError::Unterminated(context)),
        }
    }

    fn selector_list(&mut self) -> Result<Selector, SelectorError> {
        let mut alternatives = Vec::new();
        loop {
            self.skip_whitespace();
            alternatives.push(self.compound()?);
            self.skip_whitespace();
            if self.peek() == Some(',') {
                self.pos += 1;
                continue;
            }
            break;
        }

        Ok(match alternatives.len() {
            1 => alternatives.remove(0),
            _ => Selector::AnyOf(alternatives),
        })
    }

    fn compound(&mut self) -> Result<Selector, SelectorError> {
        let start = self.pos;
        let mut parts = Vec::new();

        match self.peek() {
            Some('*') => {
                self.pos += 1;
                parts.push(Selector::Any);
            }
            Some(c) if is_ident_char(c) => {
                parts.push(Selector::tag(self.ident("tag name")?));
            }
            _ => {}
        }

        loop {
            match self.peek() {
                Some('#') => {
                    self.pos += 1;
                    parts.push(Selector::Id(self.ident("id")?));
                }
                Some('.') => {
                    self.pos += 1;
                    parts.push(Selector::Class(self.ident("class")?));
                }
                Some('[') => {
                    self.pos += 1;
                    parts.push(self.attribute()?);
                }
                Some(':') => {
                    parts.push(self.pseudo_class()?);
                }
                Some(c) if c.is_whitespace() || matches!(c, '>' | '+' | '~') => {
                    self.skip_whitespace();
                    match self.peek() {
                        None | Some(',') | Some(')') => break,
                        _ => {
                            let text: String = self.chars[start..].iter().collect();
                            return Err(SelectorError::UnsupportedCombinator(
                                text.trim().to_string(),
                            ));
                        }
                    }
                }
                _ => break,
            }
        }

        match parts.len() {
            0 => match self.peek() {
                None => Err(SelectorError::Empty),
                Some(found) => Err(SelectorError::Unexpected {
                    position: self.pos,
                    found,
                }),
            },
            1 => Ok(parts.remove(0)),
            _ => Ok(Selector::All(parts)),
        }
    }

    fn ident(&mut self, context: &'static str) -> Result<String, SelectorError> {
        let start = self.pos;
        while self.peek().is_some_and(is_ident_char) {
            self.pos += 1;
        }
        if self.pos == start {
            return match self.peek() {
                Some(found) => Err(SelectorError::Unexpected {
                    position: self.pos,
                    found,
                }),
                None => Err(SelectorError::Unterminated(context)),
            };
        }
        Ok(self.chars[start..self.pos].iter().collect())
    }

    fn attribute(&mut self) -> Result<Selector, SelectorError> {
        self.skip_whitespace();
        let name = self.ident("attribute")?.to_ascii_lowercase();
        self.skip_whitespace();

        match self.peek() {
            Some(']') => {
                self.pos += 1;
                Ok(Selector::HasAttr(name))
            }
            Some('=') => {
                self.pos += 1;
                self.skip_whitespace();
                let value = match self.peek() {
                    Some(quote @ ('"' | '\'')) => self.quoted(quote)?,
                    Some(_) => self.ident("attribute")?,
                    None => return Err(SelectorError::Unterminated("attribute")),
                };
                self.skip_whitespace();
                self.expect(']', "attribute")?;
                Ok(Selector::AttrEquals { name, value })
            }
            Some(found) => Err(SelectorError::Unexpected {
                position: self.pos,
                found,
            }),
            None => Err(SelectorError::Unterminated("attribute")),
        }
    }

    fn quoted(&mut self, quote: char) -> Result<String, SelectorError> {
        self.pos += 1;
        let mut value = String::new();
        loop {
            match self.peek() {
                None => return Err(SelectorError::Unterminated("string")),
                Some('\\') => {
                    self.pos += 1;
                    match self.peek() {
                        Some(c) => value.push(c),
                        None => return Err(SelectorError::Unterminated("string")),
                    }
                }
                Some(c) if c == quote => {
                    self.pos += 1;
                    return Ok(value);
                }
                Some(c) => value.push(c),
            }
            self.pos += 1;
        }
    }

    fn pseudo_class(&mut self) -> Result<Selector, SelectorError> {
        let colon = self.pos;
        self.pos += 1;
        let name = self.ident("pseudo-class")?;
        if !name.eq_ignore_ascii_case("not") {
            return Err(SelectorError::Unexpected {
                position: colon,
                found: ':',
            });
        }

        self.expect('(', "pseudo-class")?;
        let inner = self.selector_list()?;
        self.skip_whitespace();
        self.expect(')', "pseudo-class")?;
        Ok(Selector::Not(Box::new(inner)))
    }
}

/// Rewrites a compound holding a selector list as a list of compounds.
fn distribute(parts: &[Selector]) -> Option<Selector> {
    let index = parts.iter().position(|p| matches!(p, Selector::AnyOf(_)))?;
    let Selector::AnyOf(alternatives) = &parts[index] else {
        return None;
    };
    let compounds = alternatives
        .iter()
        .map(|alternative| {
            let mut compound = parts.to_vec();
            compound[index] = alternative.clone();
            Selector::All(compound)
        })
        .collect();
    Some(Selector::AnyOf(compounds))
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '-' || c == '_'
}

#[cfg(test)]
#[path = "selector_tests.rs"]
mod tests;
