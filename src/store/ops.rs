//! Operation wrappers over the native library.
//!
//! Each wrapper encodes its arguments, invokes the native entry point
//! through the installed dispatch table, and routes the raw status through
//! that operation's translator. Calls block the current thread for the
//! duration of the native call; cancellation and timeouts belong to the
//! caller.

use std::ptr;

use libc::{c_char, c_int, c_uint};

use crate::nv::{Mapping, Value, encode_mapping};
use crate::store::api::{
	CryptCmd, DatasetKind, RECV_EMBED_DATA, RECV_FORCE, RECV_RAW, RECV_RESUMABLE, SEND_COMPRESS,
	SEND_EMBED_DATA, SEND_LARGE_BLOCK, SEND_RAW,
};
use crate::store::call::{OutList, c_name, take_error_list, take_mapping};
use crate::store::codes::MAXNAMELEN;
use crate::store::error::Result;
use crate::store::runtime::library;
use crate::store::translate::{self, ReceiveContext};

/// Feature switches for [`send`] and [`send_space`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SendFlags {
	/// Allow embedded block data in the stream.
	pub embed_data: bool,
	/// Allow blocks larger than 128 KiB.
	pub large_blocks: bool,
	/// Keep blocks compressed as stored.
	pub compress: bool,
	/// Send raw (possibly encrypted) blocks.
	pub raw: bool,
}

impl SendFlags {
	fn bits(self) -> c_uint {
		let mut bits = 0;
		if self.embed_data {
			bits |= SEND_EMBED_DATA;
		}
		if self.large_blocks {
			bits |= SEND_LARGE_BLOCK;
		}
		if self.compress {
			bits |= SEND_COMPRESS;
		}
		if self.raw {
			bits |= SEND_RAW;
		}
		bits
	}
}

/// Feature switches for [`receive`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ReceiveFlags {
	/// Roll the destination back before receiving if needed.
	pub force: bool,
	/// Ask for a resumable receive.
	pub resumable: bool,
	/// Receive the stream raw, without re-encryption.
	pub raw: bool,
	/// Stream uses embedded block data.
	pub embedded: bool,
}

impl ReceiveFlags {
	fn bits(self) -> c_uint {
		let mut bits = 0;
		if self.force {
			bits |= RECV_FORCE;
		}
		if self.resumable {
			bits |= RECV_RESUMABLE;
		}
		if self.raw {
			bits |= RECV_RAW;
		}
		if self.embedded {
			bits |= RECV_EMBED_DATA;
		}
		bits
	}
}

fn unit_flags(names: &[Vec<u8>]) -> Mapping {
	let mut flags = Mapping::new();
	for name in names {
		flags.insert(name.clone(), Value::Unit);
	}
	flags
}

fn as_slices(names: &[Vec<u8>]) -> Vec<&[u8]> {
	names.iter().map(Vec::as_slice).collect()
}

/// Create a filesystem or volume.
pub fn create(name: &[u8], kind: DatasetKind, props: &Mapping) -> Result<()> {
	let api = library()?;
	let cname = c_name(name)?;
	let props_nv = encode_mapping(props)?;
	let ret = unsafe { (api.create)(cname.as_ptr(), kind as c_int, props_nv.as_ptr()) };
	translate::create(ret, name)
}

/// Clone `origin` into a new filesystem `name`.
pub fn clone_from(name: &[u8], origin: &[u8], props: &Mapping) -> Result<()> {
	let api = library()?;
	let cname = c_name(name)?;
	let corigin = c_name(origin)?;
	let props_nv = encode_mapping(props)?;
	let ret = unsafe { (api.clone_from)(cname.as_ptr(), corigin.as_ptr(), props_nv.as_ptr()) };
	translate::clone_from(ret, name, origin)
}

/// Destroy a filesystem or volume.
pub fn destroy(name: &[u8]) -> Result<()> {
	let api = library()?;
	let cname = c_name(name)?;
	let ret = unsafe { (api.destroy)(cname.as_ptr()) };
	translate::destroy(ret, name)
}

/// Rename a dataset within its pool.
pub fn rename(source: &[u8], target: &[u8]) -> Result<()> {
	let api = library()?;
	let csource = c_name(source)?;
	let ctarget = c_name(target)?;
	let ret = unsafe { (api.rename)(csource.as_ptr(), ctarget.as_ptr()) };
	translate::rename(ret, source, target)
}

/// Roll a filesystem back to its latest snapshot and return that
/// snapshot's name.
pub fn rollback(name: &[u8]) -> Result<Vec<u8>> {
	let api = library()?;
	let cname = c_name(name)?;
	let mut snap_buf = [0_u8; MAXNAMELEN + 1];
	let ret = unsafe {
		(api.rollback)(
			cname.as_ptr(),
			snap_buf.as_mut_ptr().cast::<c_char>(),
			snap_buf.len() as c_int,
		)
	};
	translate::rollback(ret, name)?;
	let end = snap_buf.iter().position(|byte| *byte == 0).unwrap_or(snap_buf.len());
	Ok(snap_buf[..end].to_vec())
}

/// Roll a filesystem back to a named snapshot.
pub fn rollback_to(name: &[u8], snap: &[u8]) -> Result<()> {
	let api = library()?;
	let cname = c_name(name)?;
	let csnap = c_name(snap)?;
	let ret = unsafe { (api.rollback_to)(cname.as_ptr(), csnap.as_ptr()) };
	translate::rollback_to(ret, name, snap)
}

/// Create the named snapshots atomically, all with the same properties.
pub fn snapshot(snaps: &[Vec<u8>], props: &Mapping) -> Result<()> {
	let api = library()?;
	let snaps_nv = encode_mapping(&unit_flags(snaps))?;
	let props_nv = encode_mapping(props)?;
	let mut errs = OutList::new();
	let ret = unsafe { (api.snapshot)(snaps_nv.as_ptr(), props_nv.as_ptr(), errs.as_out()) };
	let errlist = take_error_list(errs)?;
	Ok(translate::snapshot(ret, errlist, &as_slices(snaps))?)
}

/// Destroy the named snapshots. With `defer`, destruction of busy
/// snapshots is postponed instead of failing.
pub fn destroy_snapshots(snaps: &[Vec<u8>], defer: bool) -> Result<()> {
	let api = library()?;
	let snaps_nv = encode_mapping(&unit_flags(snaps))?;
	let mut errs = OutList::new();
	let ret =
		unsafe { (api.destroy_snaps)(snaps_nv.as_ptr(), c_int::from(defer), errs.as_out()) };
	let errlist = take_error_list(errs)?;
	Ok(translate::destroy_snapshots(ret, errlist, &as_slices(snaps))?)
}

/// Create bookmarks; each entry pairs the new bookmark name with its
/// source snapshot or bookmark.
pub fn bookmark(bookmarks: &[(Vec<u8>, Vec<u8>)]) -> Result<()> {
	let api = library()?;
	let mut args = Mapping::new();
	for (bmark, source) in bookmarks {
		args.insert(bmark.clone(), Value::Str(source.clone()));
	}
	let args_nv = encode_mapping(&args)?;
	let mut errs = OutList::new();
	let ret = unsafe { (api.bookmark)(args_nv.as_ptr(), errs.as_out()) };
	let errlist = take_error_list(errs)?;
	Ok(translate::bookmark(ret, errlist, bookmarks)?)
}

/// List a filesystem's bookmarks, returning the requested properties for
/// each.
pub fn get_bookmarks(fsname: &[u8], props: &[Vec<u8>]) -> Result<Mapping> {
	let api = library()?;
	let cfsname = c_name(fsname)?;
	let opts_nv = encode_mapping(&unit_flags(props))?;
	let mut out = OutList::new();
	let ret = unsafe { (api.get_bookmarks)(cfsname.as_ptr(), opts_nv.as_ptr(), out.as_out()) };
	translate::get_bookmarks(ret, fsname)?;
	take_mapping(out)
}

/// Destroy the named bookmarks.
pub fn destroy_bookmarks(bookmarks: &[Vec<u8>]) -> Result<()> {
	let api = library()?;
	let args_nv = encode_mapping(&unit_flags(bookmarks))?;
	let mut errs = OutList::new();
	let ret = unsafe { (api.destroy_bookmarks)(args_nv.as_ptr(), errs.as_out()) };
	let errlist = take_error_list(errs)?;
	Ok(translate::destroy_bookmarks(ret, errlist, &as_slices(bookmarks))?)
}

/// Space consumed by the snapshot range `(firstsnap, lastsnap]`.
pub fn snaprange_space(firstsnap: &[u8], lastsnap: &[u8]) -> Result<u64> {
	let api = library()?;
	let cfirst = c_name(firstsnap)?;
	let clast = c_name(lastsnap)?;
	let mut space = 0_u64;
	let ret = unsafe { (api.snaprange_space)(cfirst.as_ptr(), clast.as_ptr(), &mut space) };
	translate::snaprange_space(ret, firstsnap, lastsnap)?;
	Ok(space)
}

/// Place holds; each entry pairs a snapshot with the tag to place.
/// A cleanup descriptor, when given, releases the holds when closed.
pub fn hold(holds: &[(Vec<u8>, Vec<u8>)], cleanup_fd: Option<c_int>) -> Result<()> {
	let api = library()?;
	let mut args = Mapping::new();
	for (snap, tag) in holds {
		args.insert(snap.clone(), Value::Str(tag.clone()));
	}
	let args_nv = encode_mapping(&args)?;
	let mut errs = OutList::new();
	let ret =
		unsafe { (api.hold)(args_nv.as_ptr(), cleanup_fd.unwrap_or(-1), errs.as_out()) };
	let errlist = take_error_list(errs)?;
	translate::hold(ret, errlist, holds)
}

/// Release holds; each entry pairs a snapshot with the tags to release.
pub fn release(holds: &[(Vec<u8>, Vec<Vec<u8>>)]) -> Result<()> {
	let api = library()?;
	let mut args = Mapping::new();
	for (snap, tags) in holds {
		args.insert(snap.clone(), Value::Map(unit_flags(tags)));
	}
	let args_nv = encode_mapping(&args)?;
	let mut errs = OutList::new();
	let ret = unsafe { (api.release)(args_nv.as_ptr(), errs.as_out()) };
	let errlist = take_error_list(errs)?;
	Ok(translate::release(ret, errlist, holds)?)
}

/// List the holds on a snapshot as a tag-to-timestamp mapping.
pub fn get_holds(snapname: &[u8]) -> Result<Mapping> {
	let api = library()?;
	let csnap = c_name(snapname)?;
	let mut out = OutList::new();
	let ret = unsafe { (api.get_holds)(csnap.as_ptr(), out.as_out()) };
	translate::get_holds(ret, snapname)?;
	take_mapping(out)
}

/// Write a transfer stream for `snapname` to `fd`, incremental from
/// `fromsnap` when given.
pub fn send(snapname: &[u8], fromsnap: Option<&[u8]>, fd: c_int, flags: SendFlags) -> Result<()> {
	let api = library()?;
	let csnap = c_name(snapname)?;
	let cfrom = fromsnap.map(c_name).transpose()?;
	let from_ptr = cfrom.as_ref().map_or(ptr::null(), |from| from.as_ptr());
	let ret = unsafe { (api.send)(csnap.as_ptr(), from_ptr, fd, flags.bits()) };
	translate::send(ret, snapname, fromsnap)
}

/// Estimate the size of the stream [`send`] would produce.
pub fn send_space(snapname: &[u8], fromsnap: Option<&[u8]>, flags: SendFlags) -> Result<u64> {
	let api = library()?;
	let csnap = c_name(snapname)?;
	let cfrom = fromsnap.map(c_name).transpose()?;
	let from_ptr = cfrom.as_ref().map_or(ptr::null(), |from| from.as_ptr());
	let mut space = 0_u64;
	let ret = unsafe { (api.send_space)(csnap.as_ptr(), from_ptr, flags.bits(), &mut space) };
	translate::send_space(ret, snapname, fromsnap)?;
	Ok(space)
}

/// Receive a transfer stream from `fd` into `snapname`, applying `props`
/// to the received dataset.
pub fn receive(
	snapname: &[u8],
	fd: c_int,
	flags: ReceiveFlags,
	origin: Option<&[u8]>,
	props: &Mapping,
) -> Result<()> {
	let api = library()?;
	let csnap = c_name(snapname)?;
	let corigin = origin.map(c_name).transpose()?;
	let origin_ptr = corigin.as_ref().map_or(ptr::null(), |origin| origin.as_ptr());
	let props_nv = encode_mapping(props)?;
	let mut properrs = OutList::new();
	let ret = unsafe {
		(api.receive)(
			csnap.as_ptr(),
			props_nv.as_ptr(),
			origin_ptr,
			flags.bits(),
			fd,
			properrs.as_out(),
		)
	};
	let properrs = take_error_list(properrs)?;
	let ctx = ReceiveContext {
		snapname,
		origin,
		force: flags.force,
		raw: flags.raw,
		resumable: flags.resumable,
		embedded: flags.embedded,
	};
	translate::receive(ret, &ctx, properrs)
}

/// Promote a clone, swapping it with its origin filesystem.
pub fn promote(name: &[u8]) -> Result<()> {
	let api = library()?;
	let cname = c_name(name)?;
	let ret = unsafe { (api.promote)(cname.as_ptr()) };
	translate::promote(ret, name)
}

/// Force the pool to flush all pending writes. With `force`, also sync
/// when the pool is idle.
pub fn sync(pool: &[u8], force: bool) -> Result<()> {
	let api = library()?;
	let cpool = c_name(pool)?;
	let ret = unsafe { (api.sync)(cpool.as_ptr(), c_int::from(force)) };
	translate::sync(ret, pool)
}

/// Reopen the pool's devices, optionally restarting a running scrub.
pub fn reopen(pool: &[u8], scrub_restart: bool) -> Result<()> {
	let api = library()?;
	let cpool = c_name(pool)?;
	let ret = unsafe { (api.reopen)(cpool.as_ptr(), c_int::from(scrub_restart)) };
	translate::reopen(ret, pool)
}

/// Read all properties of a dataset.
pub fn get_props(name: &[u8]) -> Result<Mapping> {
	let api = library()?;
	let cname = c_name(name)?;
	let mut out = OutList::new();
	let ret = unsafe { (api.get_props)(cname.as_ptr(), out.as_out()) };
	translate::get_props(ret, name)?;
	take_mapping(out)
}

/// Set one property on a dataset.
pub fn set_prop(name: &[u8], prop: &[u8], value: &Value) -> Result<()> {
	let api = library()?;
	let cname = c_name(name)?;
	let mut props = Mapping::new();
	props.insert(prop.to_vec(), value.clone());
	let props_nv = encode_mapping(&props)?;
	let ret = unsafe { (api.set_prop)(cname.as_ptr(), props_nv.as_ptr()) };
	translate::set_prop(ret, name, prop)
}

/// Reset a property to the value inherited from the parent.
pub fn inherit_prop(name: &[u8], prop: &[u8]) -> Result<()> {
	let api = library()?;
	let cname = c_name(name)?;
	let cprop = c_name(prop)?;
	let ret = unsafe { (api.inherit_prop)(cname.as_ptr(), cprop.as_ptr()) };
	translate::inherit_prop(ret, name, prop)
}

/// Run a channel program against a pool and return its output mapping.
pub fn channel_program(
	pool: &[u8],
	program: &[u8],
	instr_limit: u64,
	mem_limit: u64,
	params: &Mapping,
) -> Result<Mapping> {
	let api = library()?;
	let cpool = c_name(pool)?;
	let cprogram = c_name(program)?;
	let args_nv = encode_mapping(params)?;
	let mut out = OutList::new();
	let ret = unsafe {
		(api.channel_program)(
			cpool.as_ptr(),
			cprogram.as_ptr(),
			instr_limit,
			mem_limit,
			args_nv.as_ptr(),
			out.as_out(),
		)
	};

	let outcome = out.take();
	if ret == 0 {
		return match outcome {
			Some(handle) => Ok(crate::nv::decode_list(&handle)?),
			None => Ok(Mapping::new()),
		};
	}

	// On failure the output list, when present, carries the program
	// diagnostics under the "error" key.
	let details = outcome
		.and_then(|handle| crate::nv::decode_list(&handle).ok())
		.and_then(|mapping| match mapping.get(b"error".as_slice()) {
			Some(Value::Str(text)) => Some(text.clone()),
			_ => None,
		});
	translate::channel_program(ret, pool, details.as_deref())?;
	Ok(Mapping::new())
}

/// Create a pool checkpoint.
pub fn pool_checkpoint(pool: &[u8]) -> Result<()> {
	let api = library()?;
	let cpool = c_name(pool)?;
	let ret = unsafe { (api.pool_checkpoint)(cpool.as_ptr()) };
	translate::pool_checkpoint(ret, pool)
}

/// Discard the pool's checkpoint.
pub fn pool_checkpoint_discard(pool: &[u8]) -> Result<()> {
	let api = library()?;
	let cpool = c_name(pool)?;
	let ret = unsafe { (api.pool_checkpoint_discard)(cpool.as_ptr()) };
	translate::pool_checkpoint_discard(ret, pool)
}

/// Load an encryption key, or only verify it with `noop`.
pub fn load_key(name: &[u8], noop: bool, key: &[u8]) -> Result<()> {
	let api = library()?;
	let cname = c_name(name)?;
	let ret =
		unsafe { (api.load_key)(cname.as_ptr(), c_int::from(noop), key.as_ptr(), key.len()) };
	translate::load_key(ret, name, noop)
}

/// Unload a loaded encryption key.
pub fn unload_key(name: &[u8]) -> Result<()> {
	let api = library()?;
	let cname = c_name(name)?;
	let ret = unsafe { (api.unload_key)(cname.as_ptr()) };
	translate::unload_key(ret, name)
}

/// Change or rewrap an encryption key.
pub fn change_key(
	name: &[u8],
	cmd: CryptCmd,
	props: &Mapping,
	key: Option<&[u8]>,
) -> Result<()> {
	let api = library()?;
	let cname = c_name(name)?;
	let props_nv = encode_mapping(props)?;
	let (key_ptr, key_len) = match key {
		Some(key) => (key.as_ptr(), key.len()),
		None => (ptr::null(), 0),
	};
	let ret = unsafe {
		(api.change_key)(cname.as_ptr(), cmd as u64, props_nv.as_ptr(), key_ptr, key_len)
	};
	translate::change_key(ret, name)
}
