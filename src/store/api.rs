//! C-ABI surface of the native storage control library.
//!
//! The library itself is a black box. The embedding application installs a
//! [`StoreApi`] dispatch table once (typically generated from a `-sys`
//! crate); every entry point takes pre-encoded list arguments and raw
//! scalars, fills pointer-to-pointer output slots, and returns an integer
//! status where `0` means success.

use libc::{c_char, c_int, c_uint};

use crate::nv::NvList;

/// Kind argument for dataset creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum DatasetKind {
	/// A mountable filesystem.
	Filesystem = 2,
	/// A block volume.
	Volume = 3,
}

/// Command selector for encryption key changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u64)]
pub enum CryptCmd {
	/// Establish a new wrapping key.
	NewKey = 0,
	/// Inherit the parent's wrapping key.
	Inherit = 1,
	/// Force a new wrapping key.
	ForceNewKey = 2,
	/// Force inheritance of the parent's wrapping key.
	ForceInherit = 3,
}

/// Stream may use embedded block data.
pub const SEND_EMBED_DATA: c_uint = 1 << 0;
/// Stream may carry blocks larger than 128 KiB.
pub const SEND_LARGE_BLOCK: c_uint = 1 << 1;
/// Stream blocks stay compressed as stored.
pub const SEND_COMPRESS: c_uint = 1 << 2;
/// Stream carries raw (possibly encrypted) blocks.
pub const SEND_RAW: c_uint = 1 << 3;

/// Destination may be rolled back before receiving.
pub const RECV_FORCE: c_uint = 1 << 0;
/// Interrupted receives may be resumed later.
pub const RECV_RESUMABLE: c_uint = 1 << 1;
/// Stream is received raw, without re-encryption.
pub const RECV_RAW: c_uint = 1 << 2;
/// Stream uses embedded block data.
pub const RECV_EMBED_DATA: c_uint = 1 << 3;

/// Dispatch table of native entry points.
///
/// List arguments are borrowed for the duration of the call; output slots
/// are filled with freshly allocated lists the caller adopts and releases.
#[derive(Debug)]
#[repr(C)]
pub struct StoreApi {
	/// Bind the calling process to the control device.
	pub init: unsafe extern "C" fn() -> c_int,
	/// Create a filesystem or volume with the given properties.
	pub create: unsafe extern "C" fn(*const c_char, c_int, *const NvList) -> c_int,
	/// Clone a snapshot into a new filesystem: `(name, origin, props)`.
	pub clone_from: unsafe extern "C" fn(*const c_char, *const c_char, *const NvList) -> c_int,
	/// Destroy a filesystem or volume.
	pub destroy: unsafe extern "C" fn(*const c_char) -> c_int,
	/// Rename a dataset: `(source, target)`.
	pub rename: unsafe extern "C" fn(*const c_char, *const c_char) -> c_int,
	/// Roll back to the latest snapshot; fills the snapshot name buffer:
	/// `(name, out_buf, out_len)`.
	pub rollback: unsafe extern "C" fn(*const c_char, *mut c_char, c_int) -> c_int,
	/// Roll back to a named snapshot: `(name, snap)`.
	pub rollback_to: unsafe extern "C" fn(*const c_char, *const c_char) -> c_int,
	/// Create snapshots in one transaction: `(snaps, props, errlist_out)`.
	pub snapshot: unsafe extern "C" fn(*const NvList, *const NvList, *mut *mut NvList) -> c_int,
	/// Destroy snapshots: `(snaps, defer, errlist_out)`.
	pub destroy_snaps: unsafe extern "C" fn(*const NvList, c_int, *mut *mut NvList) -> c_int,
	/// Create bookmarks: `(bookmarks, errlist_out)`.
	pub bookmark: unsafe extern "C" fn(*const NvList, *mut *mut NvList) -> c_int,
	/// List a filesystem's bookmarks: `(fsname, opts, bookmarks_out)`.
	pub get_bookmarks:
		unsafe extern "C" fn(*const c_char, *const NvList, *mut *mut NvList) -> c_int,
	/// Destroy bookmarks: `(bookmarks, errlist_out)`.
	pub destroy_bookmarks: unsafe extern "C" fn(*const NvList, *mut *mut NvList) -> c_int,
	/// Space consumed between two snapshots: `(first, last, value_out)`.
	pub snaprange_space: unsafe extern "C" fn(*const c_char, *const c_char, *mut u64) -> c_int,
	/// Place holds: `(holds, cleanup_fd, errlist_out)`.
	pub hold: unsafe extern "C" fn(*const NvList, c_int, *mut *mut NvList) -> c_int,
	/// Release holds: `(holds, errlist_out)`.
	pub release: unsafe extern "C" fn(*const NvList, *mut *mut NvList) -> c_int,
	/// List holds on a snapshot: `(snapname, holds_out)`.
	pub get_holds: unsafe extern "C" fn(*const c_char, *mut *mut NvList) -> c_int,
	/// Write a transfer stream: `(snapname, fromsnap, fd, flags)`.
	pub send: unsafe extern "C" fn(*const c_char, *const c_char, c_int, c_uint) -> c_int,
	/// Estimate a transfer stream's size: `(snapname, fromsnap, flags, value_out)`.
	pub send_space: unsafe extern "C" fn(*const c_char, *const c_char, c_uint, *mut u64) -> c_int,
	/// Receive a transfer stream:
	/// `(snapname, props, origin, flags, fd, properrs_out)`.
	pub receive: unsafe extern "C" fn(
		*const c_char,
		*const NvList,
		*const c_char,
		c_uint,
		c_int,
		*mut *mut NvList,
	) -> c_int,
	/// Promote a clone.
	pub promote: unsafe extern "C" fn(*const c_char) -> c_int,
	/// Force a pool-wide sync: `(pool, force)`.
	pub sync: unsafe extern "C" fn(*const c_char, c_int) -> c_int,
	/// Reopen a pool's devices: `(pool, scrub_restart)`.
	pub reopen: unsafe extern "C" fn(*const c_char, c_int) -> c_int,
	/// Read a dataset's properties: `(name, props_out)`.
	pub get_props: unsafe extern "C" fn(*const c_char, *mut *mut NvList) -> c_int,
	/// Apply properties to a dataset: `(name, props)`.
	pub set_prop: unsafe extern "C" fn(*const c_char, *const NvList) -> c_int,
	/// Reset a property to its inherited value: `(name, prop)`.
	pub inherit_prop: unsafe extern "C" fn(*const c_char, *const c_char) -> c_int,
	/// Run a channel program:
	/// `(pool, program, instr_limit, mem_limit, args, out)`.
	pub channel_program: unsafe extern "C" fn(
		*const c_char,
		*const c_char,
		u64,
		u64,
		*const NvList,
		*mut *mut NvList,
	) -> c_int,
	/// Create a pool checkpoint.
	pub pool_checkpoint: unsafe extern "C" fn(*const c_char) -> c_int,
	/// Discard the pool checkpoint.
	pub pool_checkpoint_discard: unsafe extern "C" fn(*const c_char) -> c_int,
	/// Load or verify an encryption key: `(name, noop, key, key_len)`.
	pub load_key: unsafe extern "C" fn(*const c_char, c_int, *const u8, usize) -> c_int,
	/// Unload an encryption key.
	pub unload_key: unsafe extern "C" fn(*const c_char) -> c_int,
	/// Change an encryption key: `(name, cmd, props, key, key_len)`.
	pub change_key:
		unsafe extern "C" fn(*const c_char, u64, *const NvList, *const u8, usize) -> c_int,
}
