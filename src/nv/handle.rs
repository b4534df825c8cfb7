use std::ptr::NonNull;

use crate::nv::list::{NvList, nv_alloc, nv_free};

/// Owning handle to a native list.
///
/// Exactly one owner exists for every live list: dropping the handle
/// releases the list on every exit path, or ownership moves out explicitly
/// through [`NvHandle::into_raw`].
#[derive(Debug)]
pub struct NvHandle {
	ptr: NonNull<NvList>,
}

impl NvHandle {
	/// Allocate a new empty list.
	pub fn new() -> Self {
		// nv_alloc never returns null.
		Self {
			ptr: unsafe { NonNull::new_unchecked(nv_alloc()) },
		}
	}

	/// Adopt a raw list pointer, typically a callee-filled output slot.
	/// Returns `None` for null.
	///
	/// # Safety
	///
	/// `ptr` must be null or a live list allocated by [`nv_alloc`] with no
	/// other owner.
	pub unsafe fn adopt(ptr: *mut NvList) -> Option<Self> {
		NonNull::new(ptr).map(|ptr| Self { ptr })
	}

	/// Borrow the underlying list.
	pub fn list(&self) -> &NvList {
		unsafe { self.ptr.as_ref() }
	}

	/// Mutably borrow the underlying list.
	pub fn list_mut(&mut self) -> &mut NvList {
		unsafe { self.ptr.as_mut() }
	}

	/// Raw pointer for passing to a native call that only reads.
	pub fn as_ptr(&self) -> *const NvList {
		self.ptr.as_ptr()
	}

	/// Give up ownership and return the raw pointer.
	pub fn into_raw(self) -> *mut NvList {
		let ptr = self.ptr.as_ptr();
		std::mem::forget(self);
		ptr
	}
}

impl Drop for NvHandle {
	fn drop(&mut self) {
		unsafe { nv_free(self.ptr.as_ptr()) };
	}
}

// A handle is the sole owner of its list, so moving it across threads is
// sound even though the list itself holds raw pointers.
unsafe impl Send for NvHandle {}

/// Arena of lists allocated during one encode call.
///
/// Every list the encoder creates is registered here, so abandoning an
/// encode partway through (an error on key N) still releases the handles
/// built for earlier keys. The finished root is detached before the scope
/// drops.
#[derive(Debug, Default)]
pub struct HandleScope {
	handles: Vec<*mut NvList>,
}

impl HandleScope {
	/// Create an empty scope.
	pub fn new() -> Self {
		Self::default()
	}

	/// Allocate a list owned by this scope.
	pub fn alloc(&mut self) -> *mut NvList {
		let ptr = nv_alloc();
		self.handles.push(ptr);
		ptr
	}

	/// Remove `ptr` from the scope and hand it to a new owning handle.
	pub fn detach(&mut self, ptr: *mut NvList) -> NvHandle {
		self.handles.retain(|handle| *handle != ptr);
		// Scope allocations are never null.
		unsafe { NvHandle::adopt(ptr) }.unwrap_or_else(NvHandle::new)
	}
}

impl Drop for HandleScope {
	fn drop(&mut self) {
		for handle in self.handles.drain(..) {
			unsafe { nv_free(handle) };
		}
	}
}

#[cfg(test)]
mod tests {
	use super::{HandleScope, NvHandle};
	use crate::nv::list::live_list_count_for_test;

	#[test]
	fn handle_releases_on_drop() {
		let before = live_list_count_for_test();
		let handle = NvHandle::new();
		assert_eq!(live_list_count_for_test(), before + 1);
		drop(handle);
		assert_eq!(live_list_count_for_test(), before);
	}

	#[test]
	fn into_raw_hands_ownership_out_and_adopt_takes_it_back() {
		let before = live_list_count_for_test();
		let handle = NvHandle::new();
		let raw = handle.into_raw();
		assert_eq!(live_list_count_for_test(), before + 1);
		let adopted = unsafe { NvHandle::adopt(raw) }.unwrap();
		drop(adopted);
		assert_eq!(live_list_count_for_test(), before);
	}

	#[test]
	fn scope_releases_everything_not_detached() {
		let before = live_list_count_for_test();
		let detached;
		{
			let mut scope = HandleScope::new();
			let root = scope.alloc();
			let _child_a = scope.alloc();
			let _child_b = scope.alloc();
			assert_eq!(live_list_count_for_test(), before + 3);
			detached = scope.detach(root);
		}
		// The two children died with the scope, the root survived.
		assert_eq!(live_list_count_for_test(), before + 1);
		drop(detached);
		assert_eq!(live_list_count_for_test(), before);
	}
}
