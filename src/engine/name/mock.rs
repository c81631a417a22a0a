//! Stand-in for the target's name functions

use super::buffer::{NameBuffer, RawFString};
use super::callable::{BoundCallable, NameArg, NameCallInvoker};
use crate::engine::config::FNameLayout;
use crate::platform::PlatformError;
use parking_lot::Mutex;
use std::collections::HashMap;

/// Answers name calls from fixed tables, mimicking the engine's formatting
#[derive(Debug)]
pub struct MockInvoker {
    layout: FNameLayout,
    by_address: HashMap<usize, String>,
    by_index: HashMap<u32, String>,
    /// Storage handed out by `to_string`, kept alive like a target heap
    target_heap: Mutex<Vec<Box<[u16]>>>,
}

impl MockInvoker {
    pub fn new(layout: FNameLayout) -> Self {
        Self {
            layout,
            by_address: HashMap::new(),
            by_index: HashMap::new(),
            target_heap: Mutex::new(Vec::new()),
        }
    }

    /// Answer calls on the `FName` at `address` with `name`
    pub fn with_address(mut self, address: usize, name: &str) -> Self {
        self.by_address.insert(address, name.to_string());
        self
    }

    /// Answer calls on `FName`s whose comparison index is `index`
    pub fn with_index(mut self, index: u32, name: &str) -> Self {
        self.by_index.insert(index, name.to_string());
        self
    }

    fn lookup(&self, name: NameArg<'_>) -> Result<String, PlatformError> {
        match name {
            NameArg::Address(address) => self
                .by_address
                .get(&address)
                .cloned()
                .ok_or(PlatformError::InvalidAddress(address)),
            NameArg::Image(image) => {
                let field = |offset: usize| -> Option<u32> {
                    let bytes = image.get(offset..offset + 4)?;
                    Some(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
                };

                let index = field(self.layout.comparison_index_offset)
                    .ok_or_else(|| PlatformError::Other("FName image too small".to_string()))?;
                let number = self.layout.number_offset.and_then(field).unwrap_or(0);

                let base = self
                    .by_index
                    .get(&index)
                    .ok_or_else(|| PlatformError::Other(format!("unknown comparison index {index}")))?;

                Ok(match number {
                    0 => base.clone(),
                    n => format!("{base}_{}", n - 1),
                })
            }
        }
    }
}

impl NameCallInvoker for MockInvoker {
    fn append_string(
        &self,
        _callable: BoundCallable,
        name: NameArg<'_>,
        out: &mut NameBuffer,
    ) -> Result<(), PlatformError> {
        let name = self.lookup(name)?;
        let wide: Vec<u16> = name.encode_utf16().collect();
        if out.append(&wide) {
            Ok(())
        } else {
            Err(PlatformError::Other("name does not fit the output buffer".to_string()))
        }
    }

    fn to_string(&self, _callable: BoundCallable, name: NameArg<'_>) -> Result<NameBuffer, PlatformError> {
        let name = self.lookup(name)?;
        let mut storage: Box<[u16]> = name.encode_utf16().chain(std::iter::once(0)).collect();
        let raw = RawFString {
            data: storage.as_mut_ptr(),
            num: storage.len() as i32,
            max: storage.len() as i32,
        };
        self.target_heap.lock().push(storage);

        // SAFETY: the storage is owned by `target_heap` for the invoker's lifetime.
        Ok(unsafe { NameBuffer::from_target(raw) })
    }
}
