//! Mock platform for testing
//!
//! This module provides a mock implementation of the platform traits
//! together with builders that lay out name tables the way a target
//! process would, so the resolver can be exercised without a real process.

use super::{pattern_matches, MemoryReader, MemoryRegion, ModuleInfo, PatternMatch, Platform, PlatformError};
use crate::utils::align;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// Mock memory storage
#[derive(Default, Clone)]
struct MockMemory {
    /// Written blocks keyed by base address
    blocks: HashMap<usize, Vec<u8>>,
}

impl MockMemory {
    fn write(&mut self, address: usize, data: &[u8]) {
        self.blocks.insert(address, data.to_vec());
    }

    fn read(&self, address: usize, size: usize) -> Option<Vec<u8>> {
        self.blocks.iter().find_map(|(&base, data)| {
            let offset = address.checked_sub(base)?;
            let end = offset.checked_add(size)?;
            (end <= data.len()).then(|| data[offset..end].to_vec())
        })
    }

    fn is_valid(&self, address: usize) -> bool {
        address != 0
            && self
                .blocks
                .iter()
                .any(|(&base, data)| address >= base && address - base < data.len())
    }
}

/// Mock platform implementation for testing
#[derive(Clone, Default)]
pub struct MockPlatform {
    memory: Arc<RwLock<MockMemory>>,
    modules: Arc<RwLock<Vec<ModuleInfo>>>,
    regions: Arc<RwLock<Vec<MemoryRegion>>>,
}

/// Address the sample name pool header is written to
pub const SAMPLE_POOL_ADDRESS: usize = 0x10_0000;
/// Address of the first sample pool block
pub const SAMPLE_BLOCK_ADDRESS: usize = 0x20_0000;
/// Address the sample legacy name array is written to
pub const SAMPLE_ARRAY_ADDRESS: usize = 0x30_0000;

impl MockPlatform {
    /// Create a new mock platform
    pub fn new() -> Self {
        Self::default()
    }

    /// Write data to mock memory as a readable region
    pub fn write_memory(&self, address: usize, data: &[u8]) {
        self.write_region(address, data, false);
    }

    /// Write data to mock memory as an executable region
    pub fn write_code(&self, address: usize, data: &[u8]) {
        self.write_region(address, data, true);
    }

    fn write_region(&self, address: usize, data: &[u8], executable: bool) {
        self.memory.write().write(address, data);
        self.regions.write().push(MemoryRegion {
            start: address,
            end: address + data.len(),
            readable: true,
            executable,
        });
    }

    /// Add a mock module
    pub fn add_module(&self, module: ModuleInfo) {
        self.modules.write().push(module);
    }

    /// Write a POD type to memory
    pub fn write_value<T: bytemuck::Pod>(&self, address: usize, value: &T) {
        self.write_memory(address, bytemuck::bytes_of(value));
    }

    /// Lay out an FNamePool with a single block holding `names` in order.
    ///
    /// Header: 8 byte lock, `CurrentBlock`, `CurrentByteCursor`, then block
    /// pointers at +0x10. Entries are 2-byte aligned with a `u16` header of
    /// `len << 6 | is_wide`. Returns the comparison index of each name.
    pub fn with_name_pool(names: &[&str]) -> (Self, Vec<u32>) {
        let platform = Self::new();

        let mut block = Vec::new();
        let mut indices = Vec::with_capacity(names.len());

        for name in names {
            indices.push((block.len() / 2) as u32);

            let is_wide = !name.is_ascii();
            let (payload, len) = if is_wide {
                let wide: Vec<u16> = name.encode_utf16().collect();
                (wide.iter().flat_map(|c| c.to_le_bytes()).collect::<Vec<u8>>(), wide.len())
            } else {
                (name.as_bytes().to_vec(), name.len())
            };

            let header = ((len as u16) << 6) | u16::from(is_wide);
            block.extend_from_slice(&header.to_le_bytes());
            block.extend_from_slice(&payload);
            block.resize(align(block.len(), 2), 0);
        }

        let mut header = vec![0u8; 0x18];
        header[0x08..0x0C].copy_from_slice(&0u32.to_le_bytes());
        header[0x0C..0x10].copy_from_slice(&(block.len() as u32).to_le_bytes());
        header[0x10..0x18].copy_from_slice(&(SAMPLE_BLOCK_ADDRESS as u64).to_le_bytes());

        platform.write_memory(SAMPLE_POOL_ADDRESS, &header);
        platform.write_memory(SAMPLE_BLOCK_ADDRESS, &block);

        (platform, indices)
    }

    /// Lay out a legacy chunked `TNameEntryArray` holding `names` at
    /// indices `0..names.len()`.
    ///
    /// Entries store `Index << 1 | is_wide` at +0x00 and the characters at
    /// +0x10, zero-padded to 0x100 bytes. Slot `i` of the single chunk
    /// points at entry `i`.
    pub fn with_name_array(names: &[&str]) -> Self {
        const ENTRY_SPACING: usize = 0x100;

        let platform = Self::new();

        let chunk_table = SAMPLE_ARRAY_ADDRESS;
        let chunk = SAMPLE_ARRAY_ADDRESS + 0x1000;
        let entries = SAMPLE_ARRAY_ADDRESS + 0x10_0000;

        platform.write_value(chunk_table, &(chunk as u64));

        let mut slots = Vec::with_capacity(names.len() * 8);
        for (index, name) in names.iter().enumerate() {
            let entry_address = entries + index * ENTRY_SPACING;
            slots.extend_from_slice(&(entry_address as u64).to_le_bytes());

            let is_wide = !name.is_ascii();
            let mut entry = vec![0u8; 0x10];
            entry[0..4].copy_from_slice(&(((index as i32) << 1) | i32::from(is_wide)).to_le_bytes());
            if is_wide {
                entry.extend(name.encode_utf16().flat_map(|c| c.to_le_bytes()));
                entry.extend_from_slice(&[0, 0]);
            } else {
                entry.extend_from_slice(name.as_bytes());
                entry.push(0);
            }
            entry.resize(align(entry.len(), ENTRY_SPACING), 0);
            platform.write_memory(entry_address, &entry);
        }
        platform.write_memory(chunk, &slots);

        platform
    }
}

impl MemoryReader for MockPlatform {
    fn read_bytes(&self, address: usize, size: usize) -> Result<Vec<u8>, PlatformError> {
        self.memory.read().read(address, size).ok_or(PlatformError::MemoryReadFailed {
            address,
            size,
            reason: "Address not found in mock memory".to_string(),
        })
    }

    fn is_valid_address(&self, address: usize) -> bool {
        self.memory.read().is_valid(address)
    }
}

impl Platform for MockPlatform {
    fn get_modules(&self) -> Result<Vec<ModuleInfo>, PlatformError> {
        Ok(self.modules.read().clone())
    }

    fn get_memory_regions(&self) -> Result<Vec<MemoryRegion>, PlatformError> {
        Ok(self.regions.read().clone())
    }

    fn find_pattern(
        &self,
        pattern: &[Option<u8>],
        start: usize,
        end: usize,
    ) -> Result<Vec<PatternMatch>, PlatformError> {
        if pattern.is_empty() {
            return Err(PlatformError::Other("Empty pattern".to_string()));
        }

        let mut results = Vec::new();

        for (&base, data) in &self.memory.read().blocks {
            let region_end = base + data.len();

            if region_end <= start || base >= end {
                continue;
            }

            let search_start = start.saturating_sub(base);
            let search_end = end.min(region_end) - base;

            for i in search_start..search_end {
                if pattern_matches(&data[i..], pattern) {
                    let address = base + i;
                    results.push(PatternMatch {
                        address,
                        offset: address - start,
                    });
                }
            }
        }

        results.sort_by_key(|m| m.address);
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_platform_reads_inside_blocks() {
        let platform = MockPlatform::new();
        platform.write_memory(0x1000, &[0x01, 0x02, 0x03, 0x04, 0x05]);

        assert_eq!(platform.read_bytes(0x1000, 5).unwrap(), vec![1, 2, 3, 4, 5]);
        assert_eq!(platform.read_bytes(0x1002, 2).unwrap(), vec![3, 4]);
        assert!(platform.read_bytes(0x1003, 4).is_err());
    }

    #[test]
    fn test_mock_platform_write_value() {
        let platform = MockPlatform::new();
        platform.write_value(0x2000, &0x1234_5678_90AB_CDEFu64);

        let result: u64 = platform.read(0x2000).unwrap();
        assert_eq!(result, 0x1234_5678_90AB_CDEF);
    }

    #[test]
    fn test_pattern_search_in_code() {
        let platform = MockPlatform::new();
        platform.write_code(0x4000, &[0x00, 0x11, 0xAA, 0xBB, 0xCC, 0xDD, 0x44]);
        platform.write_memory(0x8000, &[0xAA, 0xBB, 0xCC, 0xDD]);

        let matches = platform.scan_pattern(&[Some(0xAA), None, Some(0xCC)]).unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].address, 0x4002);
        assert!(platform.is_executable_address(0x4003));
        assert!(!platform.is_executable_address(0x8000));
    }

    #[test]
    fn test_sample_name_pool_layout() {
        let (platform, indices) = MockPlatform::with_name_pool(&["None", "ByteProperty"]);

        assert_eq!(indices, vec![0, 3]);
        let block: u64 = platform.read(SAMPLE_POOL_ADDRESS + 0x10).unwrap();
        assert_eq!(block as usize, SAMPLE_BLOCK_ADDRESS);
        let header: u16 = platform.read(SAMPLE_BLOCK_ADDRESS).unwrap();
        assert_eq!(header >> 6, 4);
    }

    #[test]
    fn test_is_valid_address() {
        let platform = MockPlatform::new();
        platform.write_memory(0x1000, &[0x01, 0x02, 0x03]);

        assert!(platform.is_valid_address(0x1002));
        assert!(!platform.is_valid_address(0x1003));
        assert!(!platform.is_valid_address(0));
    }
}
