//! IDA-style byte signatures

use super::NameFunctionScanner;
use crate::platform::{MemoryReader, Platform};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Parse `"48 8B ? ?? E8"` into bytes with `None` wildcards
pub fn parse_pattern(pattern: &str) -> Result<Vec<Option<u8>>> {
    let bytes = pattern
        .split_whitespace()
        .map(|token| match token {
            "?" | "??" => Ok(None),
            hex => u8::from_str_radix(hex, 16)
                .map(Some)
                .map_err(|_| Error::Config(format!("invalid byte '{hex}' in pattern \"{pattern}\""))),
        })
        .collect::<Result<Vec<_>>>()?;

    if bytes.is_empty() {
        return Err(Error::Config("empty pattern".to_string()));
    }
    if bytes.iter().all(Option::is_none) {
        return Err(Error::Config(format!("pattern \"{pattern}\" is all wildcards")));
    }

    Ok(bytes)
}

/// One signature and how to turn a match into an address
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature {
    /// Pattern text, e.g. `"48 8D 0D ? ? ? ? E8"`
    pub pattern: String,
    /// Offset of a `rel32` operand inside the match
    #[serde(default)]
    pub rel_offset: Option<usize>,
    /// Length of the instruction the operand belongs to, from match start
    #[serde(default)]
    pub instruction_len: Option<usize>,
}

impl Signature {
    /// A signature whose match address is the result
    pub fn new(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            rel_offset: None,
            instruction_len: None,
        }
    }

    /// A signature whose result is the target of a RIP-relative operand
    pub fn rip_relative(pattern: impl Into<String>, rel_offset: usize, instruction_len: usize) -> Self {
        Self {
            pattern: pattern.into(),
            rel_offset: Some(rel_offset),
            instruction_len: Some(instruction_len),
        }
    }

    /// Turn a match at `address` into the address this signature points at
    fn resolve<M: MemoryReader>(&self, memory: &M, address: usize) -> Option<usize> {
        let (Some(rel_offset), Some(instruction_len)) = (self.rel_offset, self.instruction_len) else {
            return Some(address);
        };

        let rel: i32 = memory.read(address + rel_offset).ok()?;
        (address + instruction_len).checked_add_signed(rel as isize)
    }
}

/// Signatures for every candidate the resolver may ask for
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignatureSet {
    /// `FName::AppendString`
    pub append_string: Vec<Signature>,
    /// `FName::ToString`
    pub to_string: Vec<Signature>,
    /// The global name table
    pub name_table: Vec<Signature>,
    /// A thunk forwarding to `FName::AppendString`
    pub conversion_thunk: Vec<Signature>,
}

impl SignatureSet {
    /// Signatures that hold across most UE4.23+ builds
    pub fn builtin() -> Self {
        Self {
            // lea rcx, [NamePoolData]; call FNamePool::FNamePool; mov byte [bNamePoolInitialized], 1
            name_table: vec![Signature::rip_relative("48 8D 0D ? ? ? ? E8 ? ? ? ? C6 05 ? ? ? ? 01", 3, 7)],
            ..Default::default()
        }
    }

    /// Parse a signature file
    pub fn from_json_str(json: &str) -> Result<Self> {
        let set: Self = serde_json::from_str(json)?;
        set.validate()?;
        Ok(set)
    }

    /// Load a signature file written by the operator
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    /// Check that every pattern parses
    pub fn validate(&self) -> Result<()> {
        [&self.append_string, &self.to_string, &self.name_table, &self.conversion_thunk]
            .into_iter()
            .flatten()
            .try_for_each(|signature| parse_pattern(&signature.pattern).map(drop))
    }
}

/// [`NameFunctionScanner`] backed by signature search over executable memory
pub struct SignatureScanner<'p, P: Platform> {
    platform: &'p P,
    signatures: SignatureSet,
}

impl<'p, P: Platform> SignatureScanner<'p, P> {
    /// Create a scanner over `platform`
    pub fn new(platform: &'p P, signatures: SignatureSet) -> Self {
        Self { platform, signatures }
    }

    /// The signatures in use
    pub fn signatures(&self) -> &SignatureSet {
        &self.signatures
    }

    /// First address any of `signatures` leads to
    fn first_candidate(&self, what: &str, signatures: &[Signature]) -> Option<usize> {
        for signature in signatures {
            let pattern = match parse_pattern(&signature.pattern) {
                Ok(pattern) => pattern,
                Err(error) => {
                    tracing::warn!(what, %error, "skipping signature");
                    continue;
                }
            };

            let matches = match self.platform.scan_pattern(&pattern) {
                Ok(matches) => matches,
                Err(error) => {
                    tracing::debug!(what, pattern = %signature.pattern, %error, "pattern scan failed");
                    continue;
                }
            };

            if let Some(address) = matches.iter().find_map(|m| signature.resolve(self.platform, m.address)) {
                tracing::debug!(what, pattern = %signature.pattern, hits = matches.len(), "found candidate at 0x{address:X}");
                return Some(address);
            }
        }

        tracing::debug!(what, "no signature matched");
        None
    }
}

impl<P: Platform> NameFunctionScanner for SignatureScanner<'_, P> {
    fn find_append_string(&self) -> Option<usize> {
        self.first_candidate("AppendString", &self.signatures.append_string)
    }

    fn find_to_string(&self) -> Option<usize> {
        self.first_candidate("ToString", &self.signatures.to_string)
    }

    fn find_name_table(&self) -> Option<usize> {
        self.first_candidate("name table", &self.signatures.name_table)
    }

    fn find_conversion_thunk(&self) -> Option<usize> {
        self.first_candidate("conversion thunk", &self.signatures.conversion_thunk)
    }
}
