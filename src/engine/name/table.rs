//! Direct traversal of the engine's global name table
//!
//! Used when the operator forces the name-table mode, or names a table
//! address in an explicit override. Two layouts exist:
//!
//! - `FNamePool` (UE 4.23+): `ComparisonIndex = Block << 16 | Offset / Stride`.
//!   Each entry starts with a `u16` header, `Len << 6 | bIsWide`, followed
//!   by the characters. Builds with outline numbers store suffixed names as
//!   zero-length entries carrying `{ Id, Number }`.
//! - `TNameEntryArray`: a chunk table of entry pointers; the entry's
//!   `Index` field holds `bIsWide` in bit 0 and the null-terminated
//!   characters follow at a fixed offset.

use crate::engine::config::{EngineVariantConfig, NameArrayLayout, NamePoolLayout};
use crate::platform::MemoryReader;

const POINTER_SIZE: usize = 8;
const READ_CHUNK: usize = 32;

/// A located name table and the layout used to walk it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameTable {
    /// Chunked `FNamePool`
    Pool {
        /// Address of the pool object
        address: usize,
        /// Pool layout
        layout: NamePoolLayout,
    },
    /// Legacy `TNameEntryArray`
    Array {
        /// Address of the chunk pointer table
        address: usize,
        /// Array layout
        layout: NameArrayLayout,
    },
}

/// A decoded pool entry
enum PoolEntry {
    Plain(Vec<u16>),
    Numbered { id: u32, number: u32 },
}

impl NameTable {
    /// Pick the layout the configuration asks for
    pub fn from_config(address: usize, config: &EngineVariantConfig) -> Self {
        if config.use_name_pool {
            Self::Pool {
                address,
                layout: config.name_pool,
            }
        } else {
            Self::Array {
                address,
                layout: config.name_array,
            }
        }
    }

    /// Address of the table
    pub fn address(&self) -> usize {
        match self {
            Self::Pool { address, .. } | Self::Array { address, .. } => *address,
        }
    }

    /// Read the name stored under `comparison_index`, suffixed with
    /// `_{number - 1}` when `number` is non-zero.
    ///
    /// Returns `None` for indices that do not lead to a readable entry.
    pub fn read_name<M: MemoryReader>(
        &self,
        memory: &M,
        config: &EngineVariantConfig,
        comparison_index: u32,
        number: u32,
    ) -> Option<Vec<u16>> {
        let (mut name, number) = match self {
            Self::Pool { address, layout } => {
                match read_pool_entry(memory, *address, layout, config, comparison_index)? {
                    PoolEntry::Plain(name) => (name, number),
                    PoolEntry::Numbered { id, number } => {
                        match read_pool_entry(memory, *address, layout, config, id)? {
                            PoolEntry::Plain(name) => (name, number),
                            PoolEntry::Numbered { .. } => {
                                tracing::debug!(comparison_index, id, "numbered pool entry points at another numbered entry");
                                return None;
                            }
                        }
                    }
                }
            }
            Self::Array { address, layout } => (read_array_entry(memory, *address, layout, comparison_index)?, number),
        };

        if number != 0 {
            name.extend(format!("_{}", number - 1).encode_utf16());
        }

        Some(name)
    }
}

fn read_pool_entry<M: MemoryReader>(
    memory: &M,
    address: usize,
    layout: &NamePoolLayout,
    config: &EngineVariantConfig,
    comparison_index: u32,
) -> Option<PoolEntry> {
    let bits = layout.block_offset_bits;
    let block = comparison_index.checked_shr(bits).unwrap_or(0) as usize;
    let in_block = (comparison_index & 1u32.checked_shl(bits).map_or(u32::MAX, |bound| bound - 1)) as usize;

    if block >= layout.max_blocks {
        return None;
    }

    let block_slot = address.checked_add(layout.blocks_offset)?.checked_add(block * POINTER_SIZE)?;
    let block_address = memory.read_ptr(block_slot).ok()?;
    if block_address == 0 {
        return None;
    }

    let entry = block_address.checked_add(in_block.checked_mul(layout.stride)?)?;
    let header_address = entry.checked_add(config.pool_entry_header_offset())?;
    let header: u16 = memory.read(header_address).ok()?;

    let is_wide = header & layout.wide_mask != 0;
    let len = usize::from(header.checked_shr(layout.len_shift).unwrap_or(0));

    if len == 0 {
        if !config.use_outline_number_name {
            return None;
        }

        let data = entry.checked_add(config.pool_numbered_data_offset())?;
        let id: u32 = memory.read(data).ok()?;
        let number: u32 = memory.read(data.checked_add(4)?).ok()?;
        return Some(PoolEntry::Numbered { id, number });
    }

    if len > layout.max_name_len {
        tracing::debug!(comparison_index, len, "pool entry longer than the configured maximum");
        return None;
    }

    let chars = header_address.checked_add(2)?;
    let name = if is_wide {
        memory.read_wide(chars, len).ok()?
    } else {
        memory.read_bytes(chars, len).ok()?.into_iter().map(u16::from).collect()
    };

    Some(PoolEntry::Plain(name))
}

fn read_array_entry<M: MemoryReader>(
    memory: &M,
    address: usize,
    layout: &NameArrayLayout,
    comparison_index: u32,
) -> Option<Vec<u16>> {
    if layout.elements_per_chunk == 0 {
        return None;
    }

    let chunk = comparison_index as usize / layout.elements_per_chunk;
    let in_chunk = comparison_index as usize % layout.elements_per_chunk;

    let chunk_address = memory.read_ptr(address.checked_add(chunk * POINTER_SIZE)?).ok()?;
    if chunk_address == 0 {
        return None;
    }

    let entry = memory.read_ptr(chunk_address.checked_add(in_chunk * POINTER_SIZE)?).ok()?;
    if entry == 0 {
        return None;
    }

    let index: i32 = memory.read(entry.checked_add(layout.entry_index_offset)?).ok()?;
    let is_wide = index & 1 != 0;

    read_terminated(memory, entry.checked_add(layout.entry_string_offset)?, is_wide, layout.max_name_len)
}

/// Read a null-terminated string in small pieces so a short name near the
/// end of a mapping does not fail the whole read.
fn read_terminated<M: MemoryReader>(memory: &M, address: usize, wide: bool, max_len: usize) -> Option<Vec<u16>> {
    let unit = if wide { 2 } else { 1 };
    let mut name = Vec::new();

    while name.len() < max_len {
        let count = READ_CHUNK.min(max_len - name.len());
        let at = address.checked_add(name.len() * unit)?;

        let units: Vec<u16> = if wide {
            memory.read_wide(at, count).ok()?
        } else {
            memory.read_bytes(at, count).ok()?.into_iter().map(u16::from).collect()
        };

        if let Some(end) = units.iter().position(|&c| c == 0) {
            name.extend_from_slice(&units[..end]);
            return Some(name);
        }
        name.extend(units);
    }

    Some(name)
}
