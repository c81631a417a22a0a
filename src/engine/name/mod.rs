//! FName resolution
//!
//! An `FName` in target memory is only a pair of integers; the characters
//! live in the engine's global name table. This module turns such handles
//! into strings using whichever strategy could be bound for the running
//! build:
//!
//! 1. **AppendString**: call `FName::AppendString(FString&)` with a buffer
//!    this tool owns
//! 2. **ToString**: call `FName::ToString()`, which returns a buffer the
//!    target owns
//! 3. **NameTable**: walk `FNamePool` / `TNameEntryArray` directly
//!
//! Binding happens exactly once, through [`UnboundResolver`]. Resolution is
//! only possible on the [`NameResolver`] that a successful bind returns, so
//! calling into an unbound strategy cannot be expressed.

pub mod buffer;
pub mod callable;
mod resolver;
pub mod table;

#[cfg(test)]
pub(crate) mod mock;

pub use buffer::{BufferOwnership, NameBuffer, RawFString, MAX_NAME_BUFFER_CAPACITY};
pub use callable::{BoundCallable, CallingConvention, NameArg, NameCallInvoker, NativeInvoker};
pub use resolver::{BindAttempt, BindFailure, NameResolver, UnboundResolver};
pub use table::NameTable;

use crate::utils::naming::to_valid_string;
use serde::{Deserialize, Serialize};
use std::fmt;
use widestring::U16String;

/// Reference to an `FName`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum NameHandle {
    /// Address of an `FName` value in target memory
    Address(usize),
    /// A bare comparison index, optionally with a number
    Index {
        /// `ComparisonIndex`
        comparison_index: u32,
        /// `Number`, or `None` for unnumbered names
        number: Option<u32>,
    },
}

impl NameHandle {
    /// Handle for an unnumbered comparison index
    pub const fn index(comparison_index: u32) -> Self {
        Self::Index {
            comparison_index,
            number: None,
        }
    }
}

/// The three string forms of one name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedName {
    /// Exactly what the engine produced
    pub raw: U16String,
    /// Raw form without any package path prefix
    pub display: String,
    /// Display form sanitised into an identifier
    pub valid: String,
}

impl ResolvedName {
    /// Sentinel for handles that could not be resolved
    pub fn empty() -> Self {
        Self {
            raw: U16String::new(),
            display: String::new(),
            valid: to_valid_string(""),
        }
    }

    /// Derive display and identifier forms from the raw characters
    pub fn from_wide(raw: Vec<u16>) -> Self {
        let raw = U16String::from_vec(raw);
        let display = String::from_utf16_lossy(display_slice(raw.as_slice()));
        let valid = to_valid_string(&display);

        Self { raw, display, valid }
    }

    /// Raw form as UTF-8
    pub fn raw_string(&self) -> String {
        self.raw.to_string_lossy()
    }

    /// Display form as UTF-16
    pub fn display_wide(&self) -> U16String {
        U16String::from_vec(display_slice(self.raw.as_slice()).to_vec())
    }

    /// Whether this is the unresolved sentinel
    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }
}

fn display_slice(raw: &[u16]) -> &[u16] {
    match raw.iter().rposition(|&c| c == u16::from(b'/')) {
        Some(slash) => &raw[slash + 1..],
        None => raw,
    }
}

/// Which resolution strategy a resolver uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum NameStrategyKind {
    /// `FName::AppendString`
    #[default]
    AppendString,
    /// `FName::ToString`
    ToString,
    /// Direct name table traversal
    NameTable,
}

impl fmt::Display for NameStrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Lifecycle of a resolver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindState {
    /// No strategy bound yet
    Unbound,
    /// Bound from an operator-supplied override
    BoundExplicit,
    /// Bound from signature scanning
    BoundAutoDetected,
    /// Bound through the conversion-thunk heuristic
    BoundFallback,
}

/// Initialization path, as reported in diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitPath {
    /// Operator-supplied override
    ExplicitOverride,
    /// Signature scanning
    AutoDetect,
    /// Conversion-thunk heuristic
    Fallback,
}

impl fmt::Display for InitPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            InitPath::ExplicitOverride => "explicit override",
            InitPath::AutoDetect => "auto-detect",
            InitPath::Fallback => "fallback",
        })
    }
}

/// Operator-supplied location of a name function or table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExplicitOverride {
    /// Offset from the module base
    pub offset: usize,
    /// What lives at that offset
    #[serde(default)]
    pub kind: NameStrategyKind,
    /// Whether the build uses `FNamePool`
    #[serde(default)]
    pub is_name_pool: bool,
    /// Module the offset is relative to; the main image when `None`
    #[serde(default)]
    pub module: Option<String>,
    /// ABI of a callback
    #[serde(default)]
    pub convention: CallingConvention,
}

/// Everything [`UnboundResolver::initialize`] needs to pick a strategy
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NameInit {
    /// Takes priority over every heuristic when present
    pub explicit: Option<ExplicitOverride>,
    /// Auto-detection looks only for the name table
    pub force_name_table: bool,
    /// Try the conversion-thunk heuristic when auto-detection fails
    pub allow_fallback: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_strips_package_path() {
        let name = ResolvedName::from_wide("/Script/Engine/Default__PlayerController".encode_utf16().collect());

        assert_eq!(name.raw_string(), "/Script/Engine/Default__PlayerController");
        assert_eq!(name.display, "Default__PlayerController");
        assert_eq!(name.display_wide().to_string_lossy(), "Default__PlayerController");
        assert_eq!(name.valid, "Default__PlayerController");
    }

    #[test]
    fn test_trailing_slash_yields_empty_display() {
        let name = ResolvedName::from_wide("/Game/".encode_utf16().collect());

        assert!(!name.is_empty());
        assert_eq!(name.display, "");
        assert_eq!(name.valid, "Unnamed");
    }

    #[test]
    fn test_empty_sentinel() {
        let empty = ResolvedName::empty();

        assert!(empty.is_empty());
        assert!(empty.display.is_empty());
        assert!(!empty.valid.is_empty());
    }

    #[test]
    fn test_explicit_override_from_json() {
        let init: NameInit = serde_json::from_str(
            r#"{ "explicit": { "offset": 5234688, "kind": "ToString", "module": "Game-Win64-Shipping.exe" } }"#,
        )
        .unwrap();

        let explicit = init.explicit.unwrap();
        assert_eq!(explicit.offset, 0x4FE000);
        assert_eq!(explicit.kind, NameStrategyKind::ToString);
        assert!(!explicit.is_name_pool);
        assert_eq!(explicit.convention, CallingConvention::C);
        assert!(!init.allow_fallback);
    }
}
