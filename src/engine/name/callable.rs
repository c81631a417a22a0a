//! Calling the target's own name conversion functions
//!
//! A bound callable is nothing more than an address and a calling
//! convention. The actual call goes through [`NameCallInvoker`] so the
//! resolver can be driven by an in-process native invoker or by a stand-in
//! in tests.

use super::buffer::{NameBuffer, RawFString};
use crate::platform::PlatformError;
use serde::{Deserialize, Serialize};
use std::ffi::c_void;

/// ABI used to call a bound function
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CallingConvention {
    /// `extern "C"`; on x86-64 this is also the member-function ABI
    #[default]
    C,
    /// `extern "system"`
    System,
}

/// A target function address together with its ABI
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundCallable {
    /// Absolute address of the function
    pub address: usize,
    /// How to call it
    pub convention: CallingConvention,
}

/// The `FName` a callback is invoked on
#[derive(Debug, Clone, Copy)]
pub enum NameArg<'a> {
    /// An `FName` living in target memory
    Address(usize),
    /// An `FName` image built locally from an index handle
    Image(&'a [u8]),
}

impl NameArg<'_> {
    /// Value passed as the `this` pointer
    pub fn as_ptr(&self) -> *const c_void {
        match self {
            NameArg::Address(address) => *address as *const c_void,
            NameArg::Image(image) => image.as_ptr().cast(),
        }
    }
}

/// Invokes bound name functions
pub trait NameCallInvoker: Send + Sync {
    /// Call `FName::AppendString(FString&)`, appending into `out`
    fn append_string(
        &self,
        callable: BoundCallable,
        name: NameArg<'_>,
        out: &mut NameBuffer,
    ) -> Result<(), PlatformError>;

    /// Call `FName::ToString()`. The returned buffer belongs to the target.
    fn to_string(&self, callable: BoundCallable, name: NameArg<'_>) -> Result<NameBuffer, PlatformError>;
}

type AppendStringC = unsafe extern "C" fn(*const c_void, *mut RawFString);
type AppendStringSystem = unsafe extern "system" fn(*const c_void, *mut RawFString);
// Member functions returning an FString by value take the hidden return
// slot after `this`.
type ToStringC = unsafe extern "C" fn(*const c_void, *mut RawFString) -> *mut RawFString;
type ToStringSystem = unsafe extern "system" fn(*const c_void, *mut RawFString) -> *mut RawFString;

/// Calls bound functions directly; only meaningful when this crate runs
/// inside the target process.
#[derive(Debug, Default, Clone, Copy)]
pub struct NativeInvoker;

impl NativeInvoker {
    fn check(callable: BoundCallable, name: NameArg<'_>) -> Result<(), PlatformError> {
        if callable.address == 0 {
            return Err(PlatformError::InvalidAddress(0));
        }
        if name.as_ptr().is_null() {
            return Err(PlatformError::Other("null FName passed to name function".to_string()));
        }
        Ok(())
    }
}

impl NameCallInvoker for NativeInvoker {
    fn append_string(
        &self,
        callable: BoundCallable,
        name: NameArg<'_>,
        out: &mut NameBuffer,
    ) -> Result<(), PlatformError> {
        Self::check(callable, name)?;
        if !out.is_usable() {
            return Err(PlatformError::Other("name buffer has no storage".to_string()));
        }

        let this = name.as_ptr();
        let out = out.as_raw_mut();

        // SAFETY: the address was validated as executable when the resolver
        // was bound, and `this` points at a live FName of the configured layout.
        unsafe {
            match callable.convention {
                CallingConvention::C => {
                    let function = std::mem::transmute::<usize, AppendStringC>(callable.address);
                    function(this, out);
                }
                CallingConvention::System => {
                    let function = std::mem::transmute::<usize, AppendStringSystem>(callable.address);
                    function(this, out);
                }
            }
        }

        Ok(())
    }

    fn to_string(&self, callable: BoundCallable, name: NameArg<'_>) -> Result<NameBuffer, PlatformError> {
        Self::check(callable, name)?;

        let this = name.as_ptr();
        let mut result = RawFString::empty();

        // SAFETY: as in `append_string`; `result` is the hidden return slot.
        unsafe {
            match callable.convention {
                CallingConvention::C => {
                    let function = std::mem::transmute::<usize, ToStringC>(callable.address);
                    function(this, &mut result);
                }
                CallingConvention::System => {
                    let function = std::mem::transmute::<usize, ToStringSystem>(callable.address);
                    function(this, &mut result);
                }
            }

            Ok(NameBuffer::from_target(result))
        }
    }
}
