// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Types through which an engine hands caller-supplied input to a scalar.

use std::fmt::{self, Display, Formatter};

/// The kind of an input value, as named by the engine's document syntax.
///
/// This is a closed set: every literal or variable value belongs to exactly one kind.
/// The [`Display`] form is the engine's AST node name, such as `StringValue`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum LiteralKind {
    /// An integer, such as `42`.
    Int,
    /// A floating point number, such as `4.2`.
    Float,
    /// A quoted string, such as `"2015-07-24T10:56:42.744Z"`.
    String,
    /// `true` or `false`.
    Boolean,
    /// `null`.
    Null,
    /// An unquoted enum value, such as `MONDAY`.
    Enum,
    /// A list, such as `[1, 2]`.
    List,
    /// An input object, such as `{ at: "..." }`.
    Object,
}

impl LiteralKind {
    /// Returns the engine's AST node name for this kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Int => "IntValue",
            Self::Float => "FloatValue",
            Self::String => "StringValue",
            Self::Boolean => "BooleanValue",
            Self::Null => "NullValue",
            Self::Enum => "EnumValue",
            Self::List => "ListValue",
            Self::Object => "ObjectValue",
        }
    }

    /// Returns the kind of a variable value.
    ///
    /// Variables arrive as JSON. Numbers that fit an integer are [`LiteralKind::Int`],
    /// every other number is [`LiteralKind::Float`].
    #[must_use]
    pub fn of_variable(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(_) => Self::Boolean,
            serde_json::Value::Number(n) if n.is_i64() || n.is_u64() => Self::Int,
            serde_json::Value::Number(_) => Self::Float,
            serde_json::Value::String(_) => Self::String,
            serde_json::Value::Array(_) => Self::List,
            serde_json::Value::Object(_) => Self::Object,
        }
    }
}

impl Display for LiteralKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An inline literal from a query document.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    /// An integer literal.
    Int(i64),
    /// A floating point literal.
    Float(f64),
    /// A string literal, with escapes already resolved.
    String(String),
    /// A boolean literal.
    Boolean(bool),
    /// The `null` literal.
    Null,
    /// An enum literal.
    Enum(String),
    /// A list literal.
    List(Vec<Self>),
    /// An input object literal, fields in document order.
    Object(Vec<(String, Self)>),
}

impl Literal {
    /// Returns the kind of this literal.
    #[must_use]
    pub const fn kind(&self) -> LiteralKind {
        match self {
            Self::Int(_) => LiteralKind::Int,
            Self::Float(_) => LiteralKind::Float,
            Self::String(_) => LiteralKind::String,
            Self::Boolean(_) => LiteralKind::Boolean,
            Self::Null => LiteralKind::Null,
            Self::Enum(_) => LiteralKind::Enum,
            Self::List(_) => LiteralKind::List,
            Self::Object(_) => LiteralKind::Object,
        }
    }
}

impl From<&str> for Literal {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for Literal {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

/// A position in a query document, 1-based.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SourceLocation {
    /// Line number, starting at 1.
    pub line: u32,
    /// Column number, starting at 1.
    pub column: u32,
}

impl SourceLocation {
    /// Creates a new location.
    #[must_use]
    pub const fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

impl Display for SourceLocation {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Input handed to a scalar's input coercion.
///
/// Both forms go through the same validation; they differ only in how a failure
/// is reported.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Input<'a> {
    /// An inline literal, with its position in the document when known.
    Literal {
        /// The literal value.
        value: &'a Literal,
        /// Where the literal starts in the document.
        location: Option<SourceLocation>,
    },

    /// The value bound to a variable.
    Variable(&'a serde_json::Value),
}

impl<'a> Input<'a> {
    /// Returns the kind of the input value.
    #[must_use]
    pub fn kind(&self) -> LiteralKind {
        match self {
            Self::Literal { value, .. } => value.kind(),
            Self::Variable(value) => LiteralKind::of_variable(value),
        }
    }

    /// Returns the text of a string input, or `None` for every other kind.
    #[must_use]
    pub fn as_text(&self) -> Option<&'a str> {
        match *self {
            Self::Literal {
                value: Literal::String(text),
                ..
            } => Some(text.as_str()),
            Self::Variable(serde_json::Value::String(text)) => Some(text.as_str()),
            Self::Literal { .. } | Self::Variable(_) => None,
        }
    }
}
