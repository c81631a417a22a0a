//! Automatic discovery of the name functions
//!
//! The resolver does not scan memory itself. It asks a
//! [`NameFunctionScanner`] for at most one candidate per target and then
//! validates what it is given. [`SignatureScanner`] is the stock
//! implementation, driven by byte signatures over the platform's
//! executable regions.

pub mod signature;

pub use signature::{parse_pattern, Signature, SignatureScanner, SignatureSet};

/// Source of candidate addresses for FName initialization
pub trait NameFunctionScanner {
    /// Address of `FName::AppendString`
    fn find_append_string(&self) -> Option<usize>;

    /// Address of `FName::ToString`
    fn find_to_string(&self) -> Option<usize>;

    /// Address of the global name table (`FNamePool` or `TNameEntryArray`)
    fn find_name_table(&self) -> Option<usize>;

    /// Address of a thunk known to forward to `FName::AppendString`
    fn find_conversion_thunk(&self) -> Option<usize>;
}
