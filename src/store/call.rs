use std::ffi::CString;
use std::ptr;

use crate::nv::{Mapping, NvHandle, NvList, decode_error_list, decode_list, nv_free};
use crate::store::error::{Result, StoreError};
use crate::store::translate::ErrList;

/// Convert an entity name to the NUL-terminated form native calls expect.
/// Interior NUL bytes can never be valid names.
pub fn c_name(name: &[u8]) -> Result<CString> {
	CString::new(name).map_err(|_| StoreError::NameInvalid {
		name: Some(name.into()),
	})
}

/// Pointer-to-pointer output slot for native calls that allocate a list.
///
/// The caller passes [`OutList::as_out`] to the native function; whatever
/// the callee leaves in the slot has exactly one owner afterwards: either
/// it is adopted via [`OutList::take`] or it is released when the slot
/// drops, including on translated-error paths.
#[derive(Debug)]
pub struct OutList {
	slot: *mut NvList,
}

impl OutList {
	/// Create an empty slot.
	pub fn new() -> Self {
		Self {
			slot: ptr::null_mut(),
		}
	}

	/// The raw output parameter to hand to the native call.
	pub fn as_out(&mut self) -> *mut *mut NvList {
		&mut self.slot
	}

	/// Adopt the callee-filled list, if any.
	pub fn take(mut self) -> Option<NvHandle> {
		let ptr = std::mem::replace(&mut self.slot, ptr::null_mut());
		// The slot is now empty; Drop has nothing left to release.
		unsafe { NvHandle::adopt(ptr) }
	}
}

impl Default for OutList {
	fn default() -> Self {
		Self::new()
	}
}

impl Drop for OutList {
	fn drop(&mut self) {
		if !self.slot.is_null() {
			unsafe { nv_free(self.slot) };
		}
	}
}

/// Decode a callee-filled per-item error map in storage order. An unfilled
/// slot means the native layer reported no per-item detail.
pub fn take_error_list(out: OutList) -> Result<ErrList> {
	match out.take() {
		Some(handle) => Ok(decode_error_list(&handle)?),
		None => Ok(Vec::new()),
	}
}

/// Decode a callee-filled result list. An unfilled slot decodes as an
/// empty mapping.
pub fn take_mapping(out: OutList) -> Result<Mapping> {
	match out.take() {
		Some(handle) => Ok(decode_list(&handle)?),
		None => Ok(Mapping::new()),
	}
}

#[cfg(test)]
mod tests {
	use super::{OutList, c_name, take_error_list, take_mapping};
	use crate::nv::{Value, live_list_count_for_test, nv_alloc};
	use crate::store::error::StoreError;

	#[test]
	fn interior_nul_is_an_invalid_name() {
		assert!(c_name(b"tank/fs").is_ok());
		assert!(matches!(
			c_name(b"tank\0fs"),
			Err(StoreError::NameInvalid { .. })
		));
	}

	#[test]
	fn unfilled_slot_yields_nothing() {
		let out = OutList::new();
		assert!(out.take().is_none());
		assert_eq!(take_error_list(OutList::new()).unwrap(), Vec::new());
		assert!(take_mapping(OutList::new()).unwrap().is_empty());
	}

	#[test]
	fn filled_slot_is_released_even_when_not_taken() {
		let before = live_list_count_for_test();
		{
			let mut out = OutList::new();
			let filled = nv_alloc();
			unsafe {
				(*filled).add_uint64(b"space", 1024);
				*out.as_out() = filled;
			}
			// Dropped without take(), as on a translated-error return.
		}
		assert_eq!(live_list_count_for_test(), before);
	}

	#[test]
	fn filled_slot_decodes_and_releases_on_take() {
		let before = live_list_count_for_test();
		let mut out = OutList::new();
		let filled = nv_alloc();
		unsafe {
			(*filled).add_uint64(b"space", 1024);
			*out.as_out() = filled;
		}
		let decoded = take_mapping(out).unwrap();
		assert_eq!(decoded.get(b"space".as_slice()), Some(&Value::UInt64(1024)));
		assert_eq!(live_list_count_for_test(), before);
	}
}
