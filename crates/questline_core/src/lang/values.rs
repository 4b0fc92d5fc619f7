//! Define the value types an argument slot can declare, and the type-level checks for them.
//!
//! ## Notes
//! - Checks are deliberately shallow: they verify *shape* (is this an integer, does this look like a location),
//!   never runtime meaning (does this world exist).
//! - Reference types are only described here. Parsing references needs the ID grammar, which lives in
//!   `questline_syntax::reference`.
//!
//! ## Examples
//! ```rust
//! use questline_core::lang::values::{self, ValueType};
//!
//! assert!(values::check_scalar(ValueType::Integer, "12").is_ok());
//! assert!(values::check_scalar(ValueType::Integer, "twelve").is_err());
//! assert!(values::check_scalar(ValueType::Location, "100;64;-20;world").is_ok());
//! ```

use std::fmt;

use super::lists::ListKind;

/// The type of value an argument slot accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    /// Free text; never rejected.
    Text,
    Integer,
    Number,
    Boolean,
    /// `x;y;z;world` with optional `;yaw;pitch`.
    Location,
    /// An item name; any non-blank token.
    Item,
    /// A single ID reference into a list of the given kind.
    Reference(ListKind),
    /// A comma-separated list of ID references into a list of the given kind.
    ReferenceList(ListKind),
}

impl ValueType {
    /// The list kind referenced by this type, if it is a reference type.
    pub fn referenced_list(self) -> Option<ListKind> {
        match self {
            ValueType::Reference(list) | ValueType::ReferenceList(list) => Some(list),
            _ => None,
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueType::Text => write!(f, "text"),
            ValueType::Integer => write!(f, "integer"),
            ValueType::Number => write!(f, "number"),
            ValueType::Boolean => write!(f, "boolean"),
            ValueType::Location => write!(f, "location"),
            ValueType::Item => write!(f, "item"),
            ValueType::Reference(list) => write!(f, "{} ID", super::lists::singular(*list)),
            ValueType::ReferenceList(list) => write!(f, "list of {} IDs", super::lists::singular(*list)),
        }
    }
}

/// Check a non-reference value against its declared type.
///
/// ## Returns
/// - `Ok(())` for well-formed values and for reference types (checked elsewhere).
/// - `Err(reason)` with a short, lowercase reason otherwise.
pub fn check_scalar(ty: ValueType, value: &str) -> Result<(), &'static str> {
    match ty {
        ValueType::Text | ValueType::Reference(_) | ValueType::ReferenceList(_) => Ok(()),
        ValueType::Integer => value.parse::<i64>().map(|_| ()).map_err(|_| "expected a whole number"),
        ValueType::Number => parse_number(value).map(|_| ()).ok_or("expected a number"),
        ValueType::Boolean => match value {
            "true" | "false" => Ok(()),
            _ => Err("expected `true` or `false`"),
        },
        ValueType::Location => check_location(value),
        ValueType::Item => {
            if value.is_empty() || value.chars().any(char::is_whitespace) {
                Err("expected an item name without spaces")
            } else {
                Ok(())
            }
        }
    }
}

fn parse_number(value: &str) -> Option<f64> {
    value.parse::<f64>().ok().filter(|n| n.is_finite())
}

fn check_location(value: &str) -> Result<(), &'static str> {
    let parts: Vec<&str> = value.split(';').collect();
    if parts.len() != 4 && parts.len() != 6 {
        return Err("expected `x;y;z;world` or `x;y;z;world;yaw;pitch`");
    }
    if parts[..3].iter().any(|p| parse_number(p).is_none()) {
        return Err("location coordinates must be numbers");
    }
    if parts[3].trim().is_empty() {
        return Err("location is missing the world name");
    }
    if parts.len() == 6 && parts[4..].iter().any(|p| parse_number(p).is_none()) {
        return Err("location yaw and pitch must be numbers");
    }
    Ok(())
}
