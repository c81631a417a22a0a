//! Structural quirks of the target build
//!
//! Unreal builds disagree on how an `FName` is laid out and how the global
//! name table stores its entries. None of this is announced by the target;
//! it is either auto-detected by the host or pinned by the operator, and is
//! then frozen for the rest of the dump session. [`EngineVariantConfig`]
//! is the plain settings bag both paths fill in. It performs no
//! cross-field validation: a pool build without a separate number field is
//! the caller's business, not this type's.

use crate::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Where `FName::Number` sits relative to the display index on
/// case-preserving builds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum NumberPlacement {
    /// `{ ComparisonIndex, Number, DisplayIndex }`
    #[default]
    AfterComparisonIndex,
    /// `{ ComparisonIndex, DisplayIndex, Number }`
    AfterDisplayIndex,
}

/// Layout of the chunked `FNamePool` used since UE 4.23
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NamePoolLayout {
    /// Offset of the block pointer array inside the pool
    pub blocks_offset: usize,
    /// Bits of the comparison index that address inside a block
    pub block_offset_bits: u32,
    /// Length of the block pointer array
    pub max_blocks: usize,
    /// Entry alignment; the in-block index is multiplied by this
    pub stride: usize,
    /// Shift applied to the entry header to obtain the length
    pub len_shift: u32,
    /// Header bit set for UTF-16 entries
    pub wide_mask: u16,
    /// Upper bound on a single entry's character count
    pub max_name_len: usize,
}

impl Default for NamePoolLayout {
    fn default() -> Self {
        Self {
            blocks_offset: 0x10,
            block_offset_bits: 16,
            max_blocks: 8192,
            stride: 2,
            len_shift: 6,
            wide_mask: 0x1,
            max_name_len: 1024,
        }
    }
}

/// Layout of the legacy chunked `TNameEntryArray`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NameArrayLayout {
    /// Entries per chunk
    pub elements_per_chunk: usize,
    /// Offset of `FNameEntry::Index`
    pub entry_index_offset: usize,
    /// Offset of the character union in `FNameEntry`
    pub entry_string_offset: usize,
    /// Upper bound on a single entry's character count
    pub max_name_len: usize,
}

impl Default for NameArrayLayout {
    fn default() -> Self {
        Self {
            elements_per_chunk: 0x4000,
            entry_index_offset: 0x0,
            entry_string_offset: 0x10,
            max_name_len: 1024,
        }
    }
}

/// Process-wide description of the target build, fixed before the first
/// name is resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineVariantConfig {
    /// The build stores names in an `FNamePool` rather than a `TNameEntryArray`
    pub use_name_pool: bool,
    /// Names carry a `DisplayIndex` next to the comparison index
    pub use_case_preserving_name: bool,
    /// `Number` moved out of `FName` into numbered pool entries
    pub use_outline_number_name: bool,
    /// Placement of `Number` on case-preserving builds
    pub number_placement: NumberPlacement,
    /// `UObject::Name` precedes `UObject::Class`
    pub is_object_name_before_class: bool,
    /// Properties are `FProperty` rather than `UProperty`
    pub use_fproperty: bool,
    /// `FFieldVariant` distinguishes its owner with a mask bit
    pub use_mask_for_field_owner: bool,
    /// `FVector` uses `double` components (UE5+)
    pub use_large_world_coordinates: bool,
    /// `TWeakObjectPtr` lacks `TagAtLastTest`
    pub is_weak_object_ptr_without_tag: bool,
    /// `UEnum::Names` holds bare names without values
    pub is_enum_name_only: bool,
    /// Pool layout used by direct traversal when `use_name_pool` is set
    pub name_pool: NamePoolLayout,
    /// Array layout used by direct traversal otherwise
    pub name_array: NameArrayLayout,
}

impl EngineVariantConfig {
    /// Parse a configuration from JSON. Missing fields keep their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a configuration file written by the operator
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    /// Layout of an `FName` value under this configuration
    pub fn fname_layout(&self) -> FNameLayout {
        FNameLayout::from_config(self)
    }

    /// Offset of the `u16` header inside a pool entry
    pub fn pool_entry_header_offset(&self) -> usize {
        if self.use_case_preserving_name {
            4
        } else {
            0
        }
    }

    /// Offset of `{ Id, Number }` inside an outline-numbered pool entry
    pub fn pool_numbered_data_offset(&self) -> usize {
        let after_header = self.pool_entry_header_offset() + 2;
        if self.use_case_preserving_name {
            after_header + 2
        } else {
            after_header
        }
    }
}

/// Field offsets of an `FName` value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FNameLayout {
    /// Offset of `ComparisonIndex`
    pub comparison_index_offset: usize,
    /// Offset of `DisplayIndex`, if present
    pub display_index_offset: Option<usize>,
    /// Offset of `Number`, if it is stored inline
    pub number_offset: Option<usize>,
    /// Total size in bytes
    pub size: usize,
}

impl FNameLayout {
    /// Derive the layout from the build's settings
    pub fn from_config(config: &EngineVariantConfig) -> Self {
        let inline_number = !config.use_outline_number_name;

        let (display_index_offset, number_offset) = match (config.use_case_preserving_name, inline_number) {
            (false, true) => (None, Some(4)),
            (false, false) => (None, None),
            (true, false) => (Some(4), None),
            (true, true) => match config.number_placement {
                NumberPlacement::AfterComparisonIndex => (Some(8), Some(4)),
                NumberPlacement::AfterDisplayIndex => (Some(4), Some(8)),
            },
        };

        let fields = 1 + usize::from(display_index_offset.is_some()) + usize::from(number_offset.is_some());

        Self {
            comparison_index_offset: 0,
            display_index_offset,
            number_offset,
            size: fields * 4,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_fname_layout() {
        let layout = EngineVariantConfig::default().fname_layout();

        assert_eq!(layout.comparison_index_offset, 0);
        assert_eq!(layout.number_offset, Some(4));
        assert_eq!(layout.display_index_offset, None);
        assert_eq!(layout.size, 8);
    }

    #[test]
    fn test_case_preserving_number_placement() {
        let mut config = EngineVariantConfig {
            use_case_preserving_name: true,
            ..Default::default()
        };
        let layout = config.fname_layout();
        assert_eq!(layout.number_offset, Some(4));
        assert_eq!(layout.display_index_offset, Some(8));
        assert_eq!(layout.size, 12);

        config.number_placement = NumberPlacement::AfterDisplayIndex;
        let layout = config.fname_layout();
        assert_eq!(layout.display_index_offset, Some(4));
        assert_eq!(layout.number_offset, Some(8));
    }

    #[test]
    fn test_outline_number_has_no_inline_number() {
        let config = EngineVariantConfig {
            use_name_pool: true,
            use_outline_number_name: true,
            ..Default::default()
        };
        let layout = config.fname_layout();

        assert_eq!(layout.number_offset, None);
        assert_eq!(layout.size, 4);
        assert_eq!(config.pool_numbered_data_offset(), 2);
    }

    #[test]
    fn test_config_from_partial_json() {
        let config = EngineVariantConfig::from_json_str(
            r#"{ "use_name_pool": true, "number_placement": "AfterDisplayIndex", "name_pool": { "stride": 4 } }"#,
        )
        .unwrap();

        assert!(config.use_name_pool);
        assert!(!config.use_fproperty);
        assert_eq!(config.number_placement, NumberPlacement::AfterDisplayIndex);
        assert_eq!(config.name_pool.stride, 4);
        assert_eq!(config.name_pool.blocks_offset, 0x10);
    }

    #[test]
    fn test_config_rejects_malformed_json() {
        assert!(matches!(
            EngineVariantConfig::from_json_str("{ use_name_pool: yes"),
            Err(crate::Error::Serialization(_))
        ));
    }
}
