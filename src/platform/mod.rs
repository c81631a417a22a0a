//! Platform abstraction layer
//!
//! The name core never talks to the operating system itself. Everything it
//! needs from the target process comes through the two traits below:
//! - [`MemoryReader`]: the raw read primitive keyed by address and size
//! - [`Platform`]: module lookup by name and pattern search over executable memory
//!
//! Concrete process backends live with the host tool; this crate ships only
//! a mock used by its own tests.

#[cfg(test)]
pub mod mock;

/// Failures reported by a memory or module backend
#[derive(Debug, thiserror::Error)]
pub enum PlatformError {
    /// A read did not return the requested bytes
    #[error("Memory read failed at 0x{address:X} (size: {size}): {reason}")]
    MemoryReadFailed {
        /// Address of the failed read
        address: usize,
        /// Requested size
        size: usize,
        /// Backend-specific reason
        reason: String,
    },

    /// Address is null or unmapped
    #[error("Invalid memory address: 0x{0:X}")]
    InvalidAddress(usize),

    /// No loaded module has the requested name
    #[error("Module not found: {0}")]
    ModuleNotFound(String),

    /// Anything else the backend wants to report
    #[error("Platform error: {0}")]
    Other(String),
}

/// A loaded image in the target process
#[derive(Debug, Clone)]
pub struct ModuleInfo {
    /// Load address
    pub base_address: usize,
    /// Image size in bytes
    pub size: usize,
    /// File name, e.g. `Game-Win64-Shipping.exe`
    pub name: String,
}

impl ModuleInfo {
    /// Whether `address` lies inside this module's image
    #[inline]
    pub fn contains(&self, address: usize) -> bool {
        address >= self.base_address && address - self.base_address < self.size
    }
}

/// A contiguous mapping with uniform protection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryRegion {
    /// First address
    pub start: usize,
    /// One past the last address
    pub end: usize,
    /// Mapped readable
    pub readable: bool,
    /// Mapped executable
    pub executable: bool,
}

impl MemoryRegion {
    /// Length in bytes
    #[inline]
    pub fn size(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// Whether `address` falls inside the mapping
    #[inline]
    pub fn contains(&self, address: usize) -> bool {
        address >= self.start && address < self.end
    }
}

/// One hit of a byte pattern search
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PatternMatch {
    /// Absolute address of the first matched byte
    pub address: usize,
    /// Distance from the start of the searched range
    pub offset: usize,
}

/// Raw read access to the target process
pub trait MemoryReader: Send + Sync {
    /// Read `size` raw bytes starting at `address`
    fn read_bytes(&self, address: usize, size: usize) -> Result<Vec<u8>, PlatformError>;

    /// Whether `address` can be read at all
    fn is_valid_address(&self, address: usize) -> bool;

    /// Read a POD value from memory
    fn read<T: bytemuck::Pod>(&self, address: usize) -> Result<T, PlatformError>
    where
        Self: Sized,
    {
        let size = std::mem::size_of::<T>();
        let bytes = self.read_bytes(address, size)?;

        if bytes.len() != size {
            return Err(PlatformError::MemoryReadFailed {
                address,
                size,
                reason: format!("Expected {} bytes, got {}", size, bytes.len()),
            });
        }

        Ok(bytemuck::pod_read_unaligned(&bytes))
    }

    /// Read a pointer-sized value
    fn read_ptr(&self, address: usize) -> Result<usize, PlatformError>
    where
        Self: Sized,
    {
        self.read::<u64>(address).map(|value| value as usize)
    }

    /// Read exactly `len` UTF-16 code units
    fn read_wide(&self, address: usize, len: usize) -> Result<Vec<u16>, PlatformError> {
        let bytes = self.read_bytes(address, len * 2)?;

        Ok(bytes
            .chunks_exact(2)
            .map(|chunk| u16::from_le_bytes([chunk[0], chunk[1]]))
            .collect())
    }

    /// Read up to `max_length` UTF-16 code units, stopping at the first null
    fn read_wide_terminated(&self, address: usize, max_length: usize) -> Result<Vec<u16>, PlatformError> {
        let mut wide = self.read_wide(address, max_length)?;
        if let Some(end) = wide.iter().position(|&c| c == 0) {
            wide.truncate(end);
        }
        Ok(wide)
    }

    /// Read up to `max_length` bytes, stopping at the first null
    fn read_narrow_terminated(&self, address: usize, max_length: usize) -> Result<Vec<u8>, PlatformError> {
        let mut bytes = self.read_bytes(address, max_length)?;
        if let Some(end) = bytes.iter().position(|&b| b == 0) {
            bytes.truncate(end);
        }
        Ok(bytes)
    }
}

/// Module and code lookup on top of [`MemoryReader`]
pub trait Platform: MemoryReader {
    /// Get all loaded modules in the target process; the main image comes first
    fn get_modules(&self) -> Result<Vec<ModuleInfo>, PlatformError>;

    /// Get a specific module by name (case-insensitive)
    fn get_module(&self, name: &str) -> Result<ModuleInfo, PlatformError> {
        self.get_modules()?
            .into_iter()
            .find(|m| m.name.eq_ignore_ascii_case(name))
            .ok_or_else(|| PlatformError::ModuleNotFound(name.to_string()))
    }

    /// Get the main executable image
    fn get_main_module(&self) -> Result<ModuleInfo, PlatformError> {
        self.get_modules()?
            .into_iter()
            .next()
            .ok_or_else(|| PlatformError::ModuleNotFound("<main image>".to_string()))
    }

    /// Every mapping of the target process
    fn get_memory_regions(&self) -> Result<Vec<MemoryRegion>, PlatformError>;

    /// Mappings that may hold code
    fn get_executable_regions(&self) -> Result<Vec<MemoryRegion>, PlatformError> {
        Ok(self.get_memory_regions()?
            .into_iter()
            .filter(|r| r.executable)
            .collect())
    }

    /// Whether `address` points into executable memory
    fn is_executable_address(&self, address: usize) -> bool {
        self.get_executable_regions()
            .map(|regions| regions.iter().any(|r| r.contains(address)))
            .unwrap_or(false)
    }

    /// Find every occurrence of `pattern` in `[start, end)`.
    ///
    /// `None` entries in the pattern are wildcards.
    fn find_pattern(
        &self,
        pattern: &[Option<u8>],
        start: usize,
        end: usize,
    ) -> Result<Vec<PatternMatch>, PlatformError>;

    /// Run [`Platform::find_pattern`] over every executable mapping
    fn scan_pattern(&self, pattern: &[Option<u8>]) -> Result<Vec<PatternMatch>, PlatformError> {
        let regions = self.get_executable_regions()?;
        let mut results = Vec::new();

        for region in regions {
            if let Ok(mut matches) = self.find_pattern(pattern, region.start, region.end) {
                results.append(&mut matches);
            }
        }

        Ok(results)
    }
}

/// Check if a wildcard pattern matches at the start of `data`
#[inline]
pub fn pattern_matches(data: &[u8], pattern: &[Option<u8>]) -> bool {
    if data.len() < pattern.len() {
        return false;
    }

    pattern
        .iter()
        .zip(data)
        .all(|(expected, &actual)| expected.map_or(true, |byte| byte == actual))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pattern_matches_with_wildcards() {
        let data = [0x48, 0x8B, 0x05, 0x11, 0x22];

        assert!(pattern_matches(&data, &[Some(0x48), None, Some(0x05)]));
        assert!(!pattern_matches(&data, &[Some(0x48), Some(0x8D)]));
        assert!(!pattern_matches(&data[..2], &[Some(0x48), None, None]));
    }

    #[test]
    fn test_module_contains() {
        let module = ModuleInfo {
            base_address: 0x1000,
            size: 0x100,
            name: "Game.exe".to_string(),
        };

        assert!(module.contains(0x1000));
        assert!(module.contains(0x10FF));
        assert!(!module.contains(0x1100));
        assert!(!module.contains(0xFFF));
    }
}
