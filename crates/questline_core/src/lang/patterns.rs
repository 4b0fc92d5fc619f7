//! Describe the argument shape of an instruction kind.
//!
//! An [`ArgumentPattern`] is a declarative description: an ordered list of mandatory (positional) slots, a set
//! of optional (`key:value`) slots, and two binding flags. It carries no behavior beyond validation of its own
//! invariants; the binder in `questline_syntax` interprets it.
//!
//! ## Notes
//! - Slot names use `Cow<'static, str>` so builtin slots stay borrowed while data-driven patterns (loaded from
//!   project configuration) can own their strings.
//! - Optional keys are unique within one pattern. [`ArgumentPattern::validate`] enforces this for patterns that
//!   did not come from the builtin registry.

use std::borrow::Cow;
use std::fmt;

use super::values::ValueType;

/// Where the run of optional `key:value` tokens sits in an instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum OptionalPosition {
    /// Optional arguments precede the mandatory ones.
    Head,
    /// Optional arguments follow the mandatory ones (the common case).
    #[default]
    Tail,
}

/// A positional, required argument slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MandatorySlot {
    pub name: Cow<'static, str>,
    pub value_type: ValueType,
    /// Example value shown when the slot is missing.
    pub default_value: Cow<'static, str>,
}

/// A keyed, order-independent argument slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionalSlot {
    pub key: Cow<'static, str>,
    pub value_type: ValueType,
    pub default_value: Cow<'static, str>,
}

/// Declarative argument shape of one instruction kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgumentPattern {
    pub mandatory: Cow<'static, [MandatorySlot]>,
    pub optional: Cow<'static, [OptionalSlot]>,
    pub optional_position: OptionalPosition,
    /// Join every mandatory token past the leading `N - 1` slots into the last slot, keeping the original
    /// whitespace (free-text tails such as messages and commands).
    pub preserve_whitespace_in_last_mandatory: bool,
}

impl ArgumentPattern {
    /// A pattern taking no arguments at all.
    pub const EMPTY: ArgumentPattern = ArgumentPattern {
        mandatory: Cow::Borrowed(&[]),
        optional: Cow::Borrowed(&[]),
        optional_position: OptionalPosition::Tail,
        preserve_whitespace_in_last_mandatory: false,
    };

    /// Build a pattern from owned slot lists (data-driven patterns).
    pub fn new(mandatory: Vec<MandatorySlot>, optional: Vec<OptionalSlot>) -> Self {
        Self {
            mandatory: Cow::Owned(mandatory),
            optional: Cow::Owned(optional),
            optional_position: OptionalPosition::Tail,
            preserve_whitespace_in_last_mandatory: false,
        }
    }

    pub fn with_optional_position(mut self, position: OptionalPosition) -> Self {
        self.optional_position = position;
        self
    }

    pub fn preserving_whitespace(mut self) -> Self {
        self.preserve_whitespace_in_last_mandatory = true;
        self
    }

    /// Find an optional slot by key.
    pub fn optional_slot(&self, key: &str) -> Option<&OptionalSlot> {
        self.optional.iter().find(|slot| slot.key == key)
    }

    /// Find a mandatory slot by name.
    pub fn mandatory_index(&self, name: &str) -> Option<usize> {
        self.mandatory.iter().position(|slot| slot.name == name)
    }

    /// Check the pattern's invariants.
    ///
    /// ## Errors
    /// - [`PatternError::DuplicateOptionalKey`] if two optional slots share a key.
    /// - [`PatternError::DuplicateSlotName`] if two mandatory slots share a name.
    /// - [`PatternError::InvalidKey`] if an optional key is empty or contains the key separator or whitespace.
    /// - [`PatternError::PreserveWithoutMandatory`] if the whitespace flag is set on a pattern without mandatory
    ///   slots.
    pub fn validate(&self) -> Result<(), PatternError> {
        for (i, slot) in self.optional.iter().enumerate() {
            if slot.key.is_empty()
                || slot.key.contains(super::conventions::KEY_SEPARATOR)
                || slot.key.chars().any(char::is_whitespace)
            {
                return Err(PatternError::InvalidKey(slot.key.to_string()));
            }
            if self.optional[..i].iter().any(|prev| prev.key == slot.key) {
                return Err(PatternError::DuplicateOptionalKey(slot.key.to_string()));
            }
        }
        for (i, slot) in self.mandatory.iter().enumerate() {
            if self.mandatory[..i].iter().any(|prev| prev.name == slot.name) {
                return Err(PatternError::DuplicateSlotName(slot.name.to_string()));
            }
        }
        if self.preserve_whitespace_in_last_mandatory && self.mandatory.is_empty() {
            return Err(PatternError::PreserveWithoutMandatory);
        }
        Ok(())
    }
}

impl Default for ArgumentPattern {
    fn default() -> Self {
        Self::EMPTY
    }
}

/// Invariant violation in a data-driven pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatternError {
    DuplicateOptionalKey(String),
    DuplicateSlotName(String),
    InvalidKey(String),
    PreserveWithoutMandatory,
}

impl fmt::Display for PatternError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PatternError::DuplicateOptionalKey(key) => write!(f, "optional key '{}' is declared twice", key),
            PatternError::DuplicateSlotName(name) => write!(f, "mandatory slot '{}' is declared twice", name),
            PatternError::InvalidKey(key) => write!(f, "'{}' is not a valid optional key", key),
            PatternError::PreserveWithoutMandatory => {
                write!(f, "whitespace-preserving tail requires at least one mandatory slot")
            }
        }
    }
}

impl std::error::Error for PatternError {}

// --- const helpers -------------------------------------------------------------

pub const fn slot(name: &'static str, value_type: ValueType, default_value: &'static str) -> MandatorySlot {
    MandatorySlot {
        name: Cow::Borrowed(name),
        value_type,
        default_value: Cow::Borrowed(default_value),
    }
}

pub const fn key(key: &'static str, value_type: ValueType, default_value: &'static str) -> OptionalSlot {
    OptionalSlot {
        key: Cow::Borrowed(key),
        value_type,
        default_value: Cow::Borrowed(default_value),
    }
}
