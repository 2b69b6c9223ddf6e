//! Owned element values exchanged with the [`Analyzer`](crate::Analyzer).
//!
//! The analyzer materializes a top-level element as an [`Element`] tree and
//! receives one back when asked to rewrite it. While edits are applied the
//! same data lives in an [`ElementTree`](crate::ElementTree) arena so that
//! masters have stable identities.

use std::fmt::{Display, Formatter, Result as FmtResult};

/// Value of a non-master element.
#[derive(Debug, Clone, PartialEq)]
pub enum ScalarValue {
    Unsigned(u64),
    Signed(i64),
    Float(f64),
    /// ASCII and UTF-8 strings alike.
    String(String),
    Binary(Vec<u8>),
}

impl ScalarValue {
    /// The value as an unsigned integer, if it is one.
    pub fn as_unsigned(&self) -> Option<u64> {
        match self {
            ScalarValue::Unsigned(value) => Some(*value),
            _ => None,
        }
    }

    /// The value as a string slice, if it is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ScalarValue::String(value) => Some(value),
            _ => None,
        }
    }
}

impl Display for ScalarValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            ScalarValue::Unsigned(value) => write!(f, "{value}"),
            ScalarValue::Signed(value) => write!(f, "{value}"),
            ScalarValue::Float(value) => write!(f, "{value}"),
            ScalarValue::String(value) => write!(f, "{value:?}"),
            ScalarValue::Binary(bytes) => {
                f.write_str("0x")?;
                for byte in bytes {
                    write!(f, "{byte:02x}")?;
                }
                Ok(())
            }
        }
    }
}

/// Content of an [`Element`].
#[derive(Debug, Clone, PartialEq)]
pub enum ElementBody {
    Master(Vec<Element>),
    Scalar(ScalarValue),
}

/// A container element together with everything nested below it.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    /// EBML ID, see [`schema`](crate::schema).
    pub id: u32,
    pub body: ElementBody,
}

impl Element {
    /// Create a master element with the given children.
    pub fn master(id: u32, children: Vec<Element>) -> Self {
        Self { id, body: ElementBody::Master(children) }
    }

    /// Create a scalar element.
    pub fn scalar(id: u32, value: ScalarValue) -> Self {
        Self { id, body: ElementBody::Scalar(value) }
    }

    /// Shorthand for an unsigned integer element.
    pub fn unsigned(id: u32, value: u64) -> Self {
        Self::scalar(id, ScalarValue::Unsigned(value))
    }

    /// Shorthand for a string element.
    pub fn string(id: u32, value: impl Into<String>) -> Self {
        Self::scalar(id, ScalarValue::String(value.into()))
    }

    /// Children of a master element; empty for scalars.
    pub fn children(&self) -> &[Element] {
        match &self.body {
            ElementBody::Master(children) => children,
            ElementBody::Scalar(_) => &[],
        }
    }

    /// First direct child with the given ID.
    pub fn child(&self, id: u32) -> Option<&Element> {
        self.children().iter().find(|child| child.id == id)
    }

    /// The scalar value, if this is not a master.
    pub fn value(&self) -> Option<&ScalarValue> {
        match &self.body {
            ElementBody::Scalar(value) => Some(value),
            ElementBody::Master(_) => None,
        }
    }

    pub fn is_master(&self) -> bool {
        matches!(self.body, ElementBody::Master(_))
    }
}
