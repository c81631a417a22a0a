//! Output buffers handed to the target's name functions
//!
//! A callback strategy asks the engine to write a name into an `FString`.
//! Who owns the characters afterwards depends on the strategy:
//! `AppendString` appends into storage this tool allocated, `ToString`
//! hands back the engine's own allocation. [`NameBuffer`] records which one
//! it holds when it is created and never changes its mind; releasing
//! target-owned memory with this tool's allocator would corrupt the target
//! heap, so such buffers are deliberately leaked (a few KiB per call at most).

use std::ptr;

/// Largest capacity, in UTF-16 units, a tool-owned buffer may reserve
pub const MAX_NAME_BUFFER_CAPACITY: usize = 0x10_0000;

/// In-memory layout of an engine `FString` (`TArray<TCHAR>`)
#[repr(C)]
#[derive(Debug)]
pub struct RawFString {
    /// Character storage
    pub data: *mut u16,
    /// Elements in use, including the terminating null when non-zero
    pub num: i32,
    /// Reserved elements
    pub max: i32,
}

impl RawFString {
    /// An `FString` with no storage
    pub const fn empty() -> Self {
        Self {
            data: ptr::null_mut(),
            num: 0,
            max: 0,
        }
    }
}

/// Who is responsible for freeing a buffer's storage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferOwnership {
    /// Allocated here; freed on drop
    Tool,
    /// Allocated by the target; never freed here
    Target,
}

/// What happened to a buffer's storage when it was dropped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Release {
    /// Tool-owned storage was returned to the allocator
    Freed,
    /// Storage belongs to the target and was left alone
    LeftToTarget,
    /// A callback swapped the storage pointer; neither allocation is freed
    Detached,
    /// There was nothing to release
    Empty,
}

#[cfg(test)]
thread_local! {
    static TOOL_RELEASES: std::cell::Cell<usize> = const { std::cell::Cell::new(0) };
}

/// Number of tool-owned allocations released on the current thread
#[cfg(test)]
pub(crate) fn tool_releases() -> usize {
    TOOL_RELEASES.with(|count| count.get())
}

/// An `FString` with a fixed ownership tag
#[derive(Debug)]
pub struct NameBuffer {
    raw: RawFString,
    ownership: BufferOwnership,
    /// The allocation this tool made, kept to detect pointer swaps
    allocation: Option<(*mut u16, usize)>,
}

impl NameBuffer {
    /// Allocate a tool-owned buffer with room for `capacity` UTF-16 units.
    ///
    /// Requests above [`MAX_NAME_BUFFER_CAPACITY`] (or of zero) produce an
    /// empty, unusable buffer rather than an allocation.
    pub fn with_capacity(capacity: usize) -> Self {
        if capacity == 0 || capacity > MAX_NAME_BUFFER_CAPACITY {
            tracing::debug!(capacity, "refusing name buffer reservation");
            return Self {
                raw: RawFString::empty(),
                ownership: BufferOwnership::Tool,
                allocation: None,
            };
        }

        let storage: Box<[u16]> = vec![0u16; capacity].into_boxed_slice();
        let data = Box::into_raw(storage) as *mut u16;

        Self {
            raw: RawFString {
                data,
                num: 0,
                max: capacity as i32,
            },
            ownership: BufferOwnership::Tool,
            allocation: Some((data, capacity)),
        }
    }

    /// Wrap an `FString` the target allocated.
    ///
    /// # Safety
    /// `raw.data` must be null or point to at least `raw.num` readable
    /// UTF-16 units for as long as this buffer is alive.
    pub unsafe fn from_target(raw: RawFString) -> Self {
        Self {
            raw,
            ownership: BufferOwnership::Target,
            allocation: None,
        }
    }

    /// Ownership tag fixed at construction
    #[inline]
    pub fn ownership(&self) -> BufferOwnership {
        self.ownership
    }

    /// Whether the buffer has storage to read from or write into
    #[inline]
    pub fn is_usable(&self) -> bool {
        !self.raw.data.is_null()
    }

    /// Whether a callback replaced the storage this tool allocated
    #[inline]
    pub fn is_detached(&self) -> bool {
        matches!(self.allocation, Some((data, _)) if data != self.raw.data)
    }

    /// Reserved elements
    #[inline]
    pub fn capacity(&self) -> usize {
        self.raw.max.max(0) as usize
    }

    /// Elements in use, terminator included
    #[inline]
    pub fn len(&self) -> usize {
        let num = self.raw.num.max(0) as usize;
        match self.ownership {
            BufferOwnership::Tool => num.min(self.capacity()),
            BufferOwnership::Target => num,
        }
    }

    /// Whether no characters are stored
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.as_wide().is_empty()
    }

    /// Drop the contents but keep the reserved storage
    #[inline]
    pub fn reset_len(&mut self) {
        self.raw.num = 0;
    }

    /// Pointer passed to the target as the `FString&` out-parameter
    #[inline]
    pub fn as_raw_mut(&mut self) -> *mut RawFString {
        &mut self.raw
    }

    /// The stored characters up to the first null
    pub fn as_wide(&self) -> &[u16] {
        if !self.is_usable() {
            return &[];
        }

        // SAFETY: tool-owned storage holds `capacity()` elements and `len()`
        // is clamped to it; target-owned storage is covered by the contract
        // of `from_target`.
        let chars = unsafe { std::slice::from_raw_parts(self.raw.data, self.len()) };
        let end = chars.iter().position(|&c| c == 0).unwrap_or(chars.len());
        &chars[..end]
    }

    /// Append `chars` the way `FString::Append` does, keeping a terminator.
    ///
    /// Only tool-owned buffers accept writes; returns `false` if the buffer
    /// is target-owned, unusable, or too small.
    pub fn append(&mut self, chars: &[u16]) -> bool {
        if self.ownership != BufferOwnership::Tool || !self.is_usable() || self.is_detached() {
            return false;
        }

        let start = self.as_wide().len();
        let end = start + chars.len();
        if end + 1 > self.capacity() {
            return false;
        }

        // SAFETY: `end + 1 <= capacity()` elements were allocated in `with_capacity`.
        unsafe {
            ptr::copy_nonoverlapping(chars.as_ptr(), self.raw.data.add(start), chars.len());
            *self.raw.data.add(end) = 0;
        }
        self.raw.num = (end + 1) as i32;

        true
    }

    /// Release the storage according to the ownership tag
    fn release(&mut self) -> Release {
        match (self.ownership, self.allocation.take()) {
            (BufferOwnership::Target, _) => Release::LeftToTarget,
            (BufferOwnership::Tool, None) => Release::Empty,
            (BufferOwnership::Tool, Some((data, _))) if data != self.raw.data => {
                tracing::warn!(
                    ours = ?data,
                    theirs = ?self.raw.data,
                    "name buffer storage was replaced by the target, leaking both"
                );
                Release::Detached
            }
            (BufferOwnership::Tool, Some((data, capacity))) => {
                // SAFETY: `data` came from `Box::into_raw` of a `capacity`-long
                // slice in `with_capacity` and `allocation` was just taken, so
                // this runs at most once.
                unsafe {
                    drop(Box::from_raw(ptr::slice_from_raw_parts_mut(data, capacity)));
                }
                self.raw = RawFString::empty();

                #[cfg(test)]
                TOOL_RELEASES.with(|count| count.set(count.get() + 1));

                Release::Freed
            }
        }
    }
}

impl Drop for NameBuffer {
    fn drop(&mut self) {
        let outcome = self.release();
        tracing::trace!(?outcome, "name buffer released");
    }
}
