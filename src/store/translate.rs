//! Per-operation status translation.
//!
//! A raw status code means different things depending on which operation
//! produced it and what the caller passed in, so every operation has its own
//! translator. Translators are pure: they re-validate the caller's inputs to
//! disambiguate overloaded codes and deterministically select one error.
//! Status `0` is always a no-op return; unmapped codes fall back to a
//! generic error that still carries the raw status and subject.

use libc::{
	E2BIG, EACCES, EAGAIN, EBADF, EBUSY, EDQUOT, EEXIST, EINVAL, EIO, ENAMETOOLONG, ENODEV,
	ENOENT, ENOMEM, ENOSPC, ENOTSOCK, ENOTSUP, EPERM, EROFS, ESRCH, ETXTBSY, EXDEV,
};

use crate::store::batch::{BatchFailure, BatchOp, reconcile};
use crate::store::codes::{
	ECHRNG, ECKSUM, ERR_BADPROP, ERR_BOOKMARK_SOURCE_NOT_ANCESTOR, ERR_CHECKPOINT_EXISTS,
	ERR_DEVRM_IN_PROGRESS, ERR_DISCARDING_CHECKPOINT, ERR_NO_CHECKPOINT, ERR_STREAM_TRUNCATED,
	ERR_VDEV_TOO_BIG, ERR_WRONG_PARENT, ETIME, MAXNAMELEN,
};
use crate::store::error::{Name, Result, StoreError};
use crate::store::names::{
	fs_name, is_valid_bookmark_name, is_valid_fs_name, is_valid_snap_name, pool_name,
	validate_bookmark_name, validate_fs_name, validate_fs_or_snap_name, validate_snap_name,
};

/// Per-item error map in native storage order.
pub type ErrList = Vec<(Vec<u8>, i32)>;

fn named(name: &[u8]) -> Option<Name> {
	Some(name.into())
}

fn opt(name: Option<&[u8]>) -> Option<Name> {
	name.map(Into::into)
}

/// Fixed errno-to-error fallback used when an operation has no specific
/// mapping for a code.
fn generic(errno: i32, name: Option<&[u8]>, message: &'static str) -> StoreError {
	match errno {
		EIO => StoreError::Io { name: opt(name) },
		ENOSPC => StoreError::NoSpace { name: opt(name) },
		EDQUOT => StoreError::QuotaExceeded { name: opt(name) },
		EBUSY => StoreError::DatasetBusy { name: opt(name) },
		ENAMETOOLONG => StoreError::NameTooLong { name: opt(name) },
		EROFS => StoreError::ReadOnlyPool { name: opt(name) },
		EAGAIN => StoreError::SuspendedPool { name: opt(name) },
		EXDEV => StoreError::PoolsDiffer { name: opt(name) },
		ENOTSUP => StoreError::PropertyNotSupported { name: opt(name) },
		_ => StoreError::Generic {
			errno,
			name: opt(name),
			message,
		},
	}
}

/// Translate the outcome of creating a filesystem or volume.
pub fn create(ret: i32, name: &[u8]) -> Result<()> {
	match ret {
		0 => Ok(()),
		EINVAL => {
			validate_fs_name(name)?;
			Err(StoreError::PropertyInvalid { name: named(name) })
		}
		EEXIST => Err(StoreError::FilesystemExists { name: named(name) }),
		ENOENT => Err(StoreError::ParentNotFound { name: named(name) }),
		ERR_WRONG_PARENT => Err(StoreError::WrongParent {
			name: named(fs_name(name)),
		}),
		ERR_BADPROP => Err(StoreError::PropertyInvalid { name: named(name) }),
		_ => Err(generic(ret, Some(name), "failed to create filesystem")),
	}
}

/// Translate the outcome of cloning a snapshot.
pub fn clone_from(ret: i32, name: &[u8], origin: &[u8]) -> Result<()> {
	match ret {
		0 => Ok(()),
		EINVAL => {
			validate_fs_name(name)?;
			validate_snap_name(origin)?;
			Err(StoreError::PropertyInvalid { name: named(name) })
		}
		EXDEV => Err(StoreError::PoolsDiffer { name: named(name) }),
		EEXIST => Err(StoreError::FilesystemExists { name: named(name) }),
		ENOENT => {
			if !is_valid_snap_name(origin) {
				Err(StoreError::SnapshotNameInvalid { name: named(origin) })
			} else {
				Err(StoreError::DatasetNotFound { name: named(name) })
			}
		}
		_ => Err(generic(ret, Some(name), "failed to create clone")),
	}
}

/// Translate the outcome of rolling a filesystem back to its latest
/// snapshot.
pub fn rollback(ret: i32, name: &[u8]) -> Result<()> {
	match ret {
		0 => Ok(()),
		ESRCH => Err(StoreError::SnapshotNotFound { name: named(name) }),
		EINVAL => {
			validate_fs_name(name)?;
			Err(StoreError::NameInvalid { name: named(name) })
		}
		ENOENT => {
			if !is_valid_fs_name(name) {
				Err(StoreError::NameInvalid { name: named(name) })
			} else {
				Err(StoreError::FilesystemNotFound { name: named(name) })
			}
		}
		_ => Err(generic(ret, Some(name), "failed to rollback")),
	}
}

/// Translate the outcome of rolling back to a named snapshot.
pub fn rollback_to(ret: i32, name: &[u8], snap: &[u8]) -> Result<()> {
	if ret == EEXIST {
		Err(StoreError::SnapshotNotLatest { name: named(snap) })
	} else {
		rollback(ret, name)
	}
}

/// Translate the outcome of a batch snapshot request.
pub fn snapshot(
	ret: i32,
	errlist: ErrList,
	snaps: &[&[u8]],
) -> std::result::Result<(), BatchFailure> {
	let map = |status: i32, name: Option<&[u8]>| -> StoreError {
		match status {
			EXDEV => {
				let mut pools = snaps.iter().map(|snap| pool_name(snap));
				let first = pools.next();
				let same_pool = pools.all(|pool| Some(pool) == first);
				if same_pool {
					StoreError::DuplicateSnapshots { name: opt(name) }
				} else {
					StoreError::PoolsDiffer { name: opt(name) }
				}
			}
			EINVAL => {
				if snaps.iter().any(|snap| !is_valid_snap_name(snap)) {
					StoreError::NameInvalid { name: opt(name) }
				} else if snaps.iter().any(|snap| snap.len() > MAXNAMELEN) {
					StoreError::NameTooLong { name: opt(name) }
				} else {
					StoreError::PropertyInvalid { name: opt(name) }
				}
			}
			EEXIST => StoreError::SnapshotExists { name: opt(name) },
			ENOENT => StoreError::FilesystemNotFound { name: opt(name) },
			_ => generic(status, name, "failed to create snapshot"),
		}
	};

	reconcile(BatchOp::SnapshotCreate, ret, errlist, snaps, map)
}

/// Translate the outcome of a batch snapshot destruction.
pub fn destroy_snapshots(
	ret: i32,
	errlist: ErrList,
	snaps: &[&[u8]],
) -> std::result::Result<(), BatchFailure> {
	let map = |status: i32, name: Option<&[u8]>| -> StoreError {
		match status {
			EEXIST => StoreError::SnapshotIsCloned { name: opt(name) },
			ENOENT => StoreError::PoolNotFound { name: opt(name) },
			EBUSY => StoreError::SnapshotIsHeld { name: opt(name) },
			_ => generic(status, name, "failed to destroy snapshot"),
		}
	};

	reconcile(BatchOp::SnapshotDestroy, ret, errlist, snaps, map)
}

/// Translate the outcome of a batch bookmark request. `bookmarks` pairs
/// each new bookmark name with its source snapshot or bookmark.
pub fn bookmark(
	ret: i32,
	errlist: ErrList,
	bookmarks: &[(Vec<u8>, Vec<u8>)],
) -> std::result::Result<(), BatchFailure> {
	let map = |status: i32, name: Option<&[u8]>| -> StoreError {
		let source = name.and_then(|name| {
			bookmarks
				.iter()
				.find(|(bmark, _)| bmark == name)
				.map(|(_, source)| source.as_slice())
		});

		if status == EINVAL {
			if let Some(name) = name {
				if let Err(err) = validate_bookmark_name(name) {
					return err;
				}
				if let Some(source) = source {
					let source_is_snap = validate_snap_name(source).is_ok();
					let source_is_bmark = validate_bookmark_name(source).is_ok();
					if !source_is_snap && !source_is_bmark {
						return StoreError::BookmarkSourceInvalid { name: named(source) };
					}
				}
				let pool = pool_name(name);
				if bookmarks.iter().any(|(bmark, _)| pool_name(bmark) != pool) {
					return StoreError::PoolsDiffer { name: named(name) };
				}
			} else if let Some((invalid, _)) = bookmarks
				.iter()
				.find(|(bmark, _)| !is_valid_bookmark_name(bmark))
			{
				return StoreError::BookmarkNameInvalid {
					name: named(invalid),
				};
			}
		}
		match status {
			EEXIST => StoreError::BookmarkExists { name: opt(name) },
			ENOENT => StoreError::SnapshotNotFound { name: opt(name) },
			ENOTSUP => StoreError::BookmarkNotSupported { name: opt(name) },
			ERR_BOOKMARK_SOURCE_NOT_ANCESTOR => StoreError::BookmarkMismatch { name: opt(source) },
			_ => generic(status, name, "failed to create bookmark"),
		}
	};

	let names: Vec<&[u8]> = bookmarks.iter().map(|(bmark, _)| bmark.as_slice()).collect();
	reconcile(BatchOp::BookmarkCreate, ret, errlist, &names, map)
}

/// Translate the outcome of listing a filesystem's bookmarks.
pub fn get_bookmarks(ret: i32, fsname: &[u8]) -> Result<()> {
	match ret {
		0 => Ok(()),
		ENOENT => Err(StoreError::FilesystemNotFound {
			name: named(fsname),
		}),
		_ => Err(generic(ret, Some(fsname), "failed to list bookmarks")),
	}
}

/// Translate the outcome of a batch bookmark destruction.
pub fn destroy_bookmarks(
	ret: i32,
	errlist: ErrList,
	bookmarks: &[&[u8]],
) -> std::result::Result<(), BatchFailure> {
	let map = |status: i32, name: Option<&[u8]>| -> StoreError {
		match status {
			EINVAL => StoreError::NameInvalid { name: opt(name) },
			_ => generic(status, name, "failed to destroy bookmark"),
		}
	};

	reconcile(BatchOp::BookmarkDestroy, ret, errlist, bookmarks, map)
}

/// Translate the outcome of measuring space used by a snapshot range.
pub fn snaprange_space(ret: i32, firstsnap: &[u8], lastsnap: &[u8]) -> Result<()> {
	match ret {
		0 => Ok(()),
		EXDEV => {
			if pool_name(firstsnap) != pool_name(lastsnap) {
				Err(StoreError::PoolsDiffer {
					name: named(lastsnap),
				})
			} else {
				Err(StoreError::SnapshotMismatch {
					name: named(lastsnap),
				})
			}
		}
		EINVAL => {
			if !is_valid_snap_name(firstsnap) {
				Err(StoreError::NameInvalid {
					name: named(firstsnap),
				})
			} else if !is_valid_snap_name(lastsnap) {
				Err(StoreError::NameInvalid {
					name: named(lastsnap),
				})
			} else if firstsnap.len() > MAXNAMELEN {
				Err(StoreError::NameTooLong {
					name: named(firstsnap),
				})
			} else if lastsnap.len() > MAXNAMELEN {
				Err(StoreError::NameTooLong {
					name: named(lastsnap),
				})
			} else if pool_name(firstsnap) != pool_name(lastsnap) {
				Err(StoreError::PoolsDiffer {
					name: named(lastsnap),
				})
			} else {
				Err(StoreError::SnapshotMismatch {
					name: named(lastsnap),
				})
			}
		}
		ENOENT => Err(StoreError::SnapshotNotFound {
			name: named(lastsnap),
		}),
		_ => Err(generic(
			ret,
			Some(lastsnap),
			"failed to calculate space used by range of snapshots",
		)),
	}
}

/// Translate the outcome of a batch hold request. `holds` pairs each
/// snapshot with the tag to place on it.
pub fn hold(ret: i32, errlist: ErrList, holds: &[(Vec<u8>, Vec<u8>)]) -> Result<()> {
	if ret == EBADF {
		return Err(StoreError::BadCleanupFd);
	}

	let map = |status: i32, name: Option<&[u8]>| -> StoreError {
		if status == EINVAL {
			if let Some(name) = name {
				if !is_valid_snap_name(name) {
					return StoreError::NameInvalid { name: named(name) };
				}
				if name.len() > MAXNAMELEN {
					return StoreError::NameTooLong { name: named(name) };
				}
				let pool = pool_name(name);
				if holds.iter().any(|(snap, _)| pool_name(snap) != pool) {
					return StoreError::PoolsDiffer { name: named(name) };
				}
			} else if let Some((invalid, _)) =
				holds.iter().find(|(snap, _)| !is_valid_snap_name(snap))
			{
				return StoreError::NameInvalid {
					name: named(invalid),
				};
			}
		}

		let hold_tag = name.and_then(|name| {
			holds
				.iter()
				.find(|(snap, _)| snap == name)
				.map(|(_, tag)| tag.as_slice())
		});
		match status {
			EXDEV => StoreError::PoolsDiffer { name: opt(name) },
			ENOENT => StoreError::FilesystemNotFound {
				name: opt(name.map(fs_name)),
			},
			EEXIST => StoreError::HoldExists { name: opt(name) },
			E2BIG => StoreError::NameTooLong {
				name: opt(hold_tag),
			},
			ENOTSUP => StoreError::FeatureNotSupported {
				name: opt(name.map(pool_name)),
			},
			_ => generic(status, name, "failed to hold snapshot"),
		}
	};

	let names: Vec<&[u8]> = holds.iter().map(|(snap, _)| snap.as_slice()).collect();
	reconcile(BatchOp::Hold, ret, errlist, &names, map)?;
	Ok(())
}

/// Translate the outcome of a batch hold release. `holds` pairs each
/// snapshot with the tags to release from it.
pub fn release(
	ret: i32,
	errlist: ErrList,
	holds: &[(Vec<u8>, Vec<Vec<u8>>)],
) -> std::result::Result<(), BatchFailure> {
	let map = |status: i32, name: Option<&[u8]>| -> StoreError {
		if status == EINVAL {
			if let Some(name) = name {
				if !is_valid_snap_name(name) {
					return StoreError::NameInvalid { name: named(name) };
				}
				if name.len() > MAXNAMELEN {
					return StoreError::NameTooLong { name: named(name) };
				}
				let pool = pool_name(name);
				if holds.iter().any(|(snap, _)| pool_name(snap) != pool) {
					return StoreError::PoolsDiffer { name: named(name) };
				}
			} else if let Some((invalid, _)) =
				holds.iter().find(|(snap, _)| !is_valid_snap_name(snap))
			{
				return StoreError::NameInvalid {
					name: named(invalid),
				};
			}
		}
		match status {
			EXDEV => StoreError::PoolsDiffer { name: opt(name) },
			ENOENT => StoreError::HoldNotFound { name: opt(name) },
			E2BIG => {
				let too_long = name.and_then(|name| {
					holds
						.iter()
						.find(|(snap, _)| snap == name)
						.and_then(|(_, tags)| tags.iter().find(|tag| tag.len() > MAXNAMELEN))
				});
				StoreError::NameTooLong {
					name: too_long.map(|tag| tag.as_slice().into()),
				}
			}
			ENOTSUP => StoreError::FeatureNotSupported {
				name: opt(name.map(pool_name)),
			},
			_ => generic(status, name, "failed to release snapshot hold"),
		}
	};

	let names: Vec<&[u8]> = holds.iter().map(|(snap, _)| snap.as_slice()).collect();
	reconcile(BatchOp::Release, ret, errlist, &names, map)
}

/// Translate the outcome of listing holds on a snapshot.
pub fn get_holds(ret: i32, snapname: &[u8]) -> Result<()> {
	match ret {
		0 => Ok(()),
		EINVAL => {
			validate_snap_name(snapname)?;
			Err(generic(
				ret,
				Some(snapname),
				"failed to get holds on snapshot",
			))
		}
		ENOENT => Err(StoreError::SnapshotNotFound {
			name: named(snapname),
		}),
		ENOTSUP => Err(StoreError::FeatureNotSupported {
			name: named(pool_name(snapname)),
		}),
		_ => Err(generic(
			ret,
			Some(snapname),
			"failed to get holds on snapshot",
		)),
	}
}

/// Translate the outcome of generating a transfer stream.
pub fn send(ret: i32, snapname: &[u8], fromsnap: Option<&[u8]>) -> Result<()> {
	match ret {
		0 => Ok(()),
		EXDEV if fromsnap.is_some() => {
			let from = fromsnap.unwrap_or_default();
			if pool_name(from) != pool_name(snapname) {
				Err(StoreError::PoolsDiffer {
					name: named(snapname),
				})
			} else {
				Err(StoreError::SnapshotMismatch {
					name: named(snapname),
				})
			}
		}
		EINVAL => {
			if let Some(from) = fromsnap {
				if !is_valid_snap_name(from) && !is_valid_bookmark_name(from) {
					return Err(StoreError::NameInvalid { name: named(from) });
				}
				if from.len() > MAXNAMELEN {
					return Err(StoreError::NameTooLong { name: named(from) });
				}
			}
			if !is_valid_snap_name(snapname) && !is_valid_fs_name(snapname) {
				return Err(StoreError::NameInvalid {
					name: named(snapname),
				});
			}
			if snapname.len() > MAXNAMELEN {
				return Err(StoreError::NameTooLong {
					name: named(snapname),
				});
			}
			if let Some(from) = fromsnap {
				if pool_name(from) != pool_name(snapname) {
					return Err(StoreError::PoolsDiffer {
						name: named(snapname),
					});
				}
			}
			Err(StoreError::StreamIo { errno: ret })
		}
		ENOENT => {
			if let Some(from) = fromsnap {
				if !is_valid_snap_name(from) && !is_valid_bookmark_name(from) {
					return Err(StoreError::NameInvalid { name: named(from) });
				}
			}
			Err(StoreError::SnapshotNotFound {
				name: named(snapname),
			})
		}
		ENAMETOOLONG => {
			if fromsnap.is_some_and(|from| from.len() > MAXNAMELEN) {
				Err(StoreError::NameTooLong {
					name: opt(fromsnap),
				})
			} else {
				Err(StoreError::NameTooLong {
					name: named(snapname),
				})
			}
		}
		_ => Err(StoreError::StreamIo { errno: ret }),
	}
}

/// Translate the outcome of estimating a transfer stream's size.
pub fn send_space(ret: i32, snapname: &[u8], fromsnap: Option<&[u8]>) -> Result<()> {
	match ret {
		0 => Ok(()),
		EXDEV if fromsnap.is_some() => {
			let from = fromsnap.unwrap_or_default();
			if pool_name(from) != pool_name(snapname) {
				Err(StoreError::PoolsDiffer {
					name: named(snapname),
				})
			} else {
				Err(StoreError::SnapshotMismatch {
					name: named(snapname),
				})
			}
		}
		EINVAL => {
			if let Some(from) = fromsnap {
				if !is_valid_snap_name(from) {
					return Err(StoreError::NameInvalid { name: named(from) });
				}
			}
			if !is_valid_snap_name(snapname) {
				return Err(StoreError::NameInvalid {
					name: named(snapname),
				});
			}
			if let Some(from) = fromsnap {
				if from.len() > MAXNAMELEN {
					return Err(StoreError::NameTooLong { name: named(from) });
				}
			}
			if snapname.len() > MAXNAMELEN {
				return Err(StoreError::NameTooLong {
					name: named(snapname),
				});
			}
			if let Some(from) = fromsnap {
				if pool_name(from) != pool_name(snapname) {
					return Err(StoreError::PoolsDiffer {
						name: named(snapname),
					});
				}
			}
			Err(generic(
				ret,
				Some(snapname),
				"failed to estimate transfer stream size",
			))
		}
		ENOENT => {
			if let Some(from) = fromsnap {
				if !is_valid_snap_name(from) {
					return Err(StoreError::NameInvalid { name: named(from) });
				}
			}
			Err(StoreError::SnapshotNotFound {
				name: named(snapname),
			})
		}
		_ => Err(generic(
			ret,
			Some(snapname),
			"failed to estimate transfer stream size",
		)),
	}
}

/// Call context for [`receive`].
#[derive(Debug, Clone, Copy)]
pub struct ReceiveContext<'a> {
	/// Destination snapshot name.
	pub snapname: &'a [u8],
	/// Clone origin, when receiving into a clone.
	pub origin: Option<&'a [u8]>,
	/// Whether the destination may be rolled back first.
	pub force: bool,
	/// Whether the stream is raw (encrypted as stored).
	pub raw: bool,
	/// Whether a resumable stream was requested.
	pub resumable: bool,
	/// Whether the stream uses embedded data.
	pub embedded: bool,
}

/// Translate the outcome of receiving a transfer stream.
///
/// A zero status with a non-empty `properrs` map still fails: the stream
/// applied but one or more properties did not.
pub fn receive(ret: i32, ctx: &ReceiveContext<'_>, properrs: ErrList) -> Result<()> {
	if ret == 0 {
		if properrs.is_empty() {
			return Ok(());
		}
		let map = |status: i32, name: Option<&[u8]>| -> StoreError {
			match status {
				EINVAL | ERR_BADPROP => StoreError::PropertyInvalid { name: opt(name) },
				_ => generic(status, name, "failed to set property"),
			}
		};
		reconcile(
			BatchOp::ReceiveProperty,
			EINVAL,
			properrs,
			&[ctx.snapname],
			map,
		)?;
		return Ok(());
	}

	let snapname = ctx.snapname;
	match ret {
		EINVAL => {
			if !is_valid_snap_name(snapname) && !is_valid_fs_name(snapname) {
				Err(StoreError::NameInvalid {
					name: named(snapname),
				})
			} else if snapname.len() > MAXNAMELEN {
				Err(StoreError::NameTooLong {
					name: named(snapname),
				})
			} else if ctx.origin.is_some_and(|origin| !is_valid_snap_name(origin)) {
				Err(StoreError::NameInvalid {
					name: opt(ctx.origin),
				})
			} else if ctx.resumable {
				Err(StoreError::StreamFeatureInvalid)
			} else if ctx.embedded && !ctx.raw {
				Err(StoreError::StreamFeatureIncompatible)
			} else {
				Err(StoreError::BadStream)
			}
		}
		ENOENT => {
			if !is_valid_snap_name(snapname) {
				Err(StoreError::NameInvalid {
					name: named(snapname),
				})
			} else {
				Err(StoreError::DatasetNotFound {
					name: named(snapname),
				})
			}
		}
		EEXIST => Err(StoreError::DatasetExists {
			name: named(snapname),
		}),
		ENOTSUP => Err(StoreError::StreamFeatureNotSupported),
		ENODEV => Err(StoreError::StreamMismatch {
			name: named(fs_name(snapname)),
		}),
		ETXTBSY => Err(StoreError::DestinationModified {
			name: named(fs_name(snapname)),
		}),
		EBUSY => Err(StoreError::DatasetBusy {
			name: named(fs_name(snapname)),
		}),
		ENOSPC => Err(StoreError::NoSpace {
			name: named(fs_name(snapname)),
		}),
		EDQUOT => Err(StoreError::QuotaExceeded {
			name: named(fs_name(snapname)),
		}),
		ENAMETOOLONG => Err(StoreError::NameTooLong {
			name: named(snapname),
		}),
		EROFS => Err(StoreError::ReadOnlyPool {
			name: named(pool_name(snapname)),
		}),
		EAGAIN => Err(StoreError::SuspendedPool {
			name: named(pool_name(snapname)),
		}),
		ECKSUM => Err(StoreError::BadStream),
		ERR_WRONG_PARENT => Err(StoreError::WrongParent {
			name: named(fs_name(snapname)),
		}),
		ERR_STREAM_TRUNCATED => Err(StoreError::StreamTruncated),
		ERR_BADPROP => Err(StoreError::PropertyInvalid {
			name: named(snapname),
		}),
		_ => Err(StoreError::StreamIo { errno: ret }),
	}
}

/// Translate the outcome of promoting a clone.
pub fn promote(ret: i32, name: &[u8]) -> Result<()> {
	match ret {
		0 => Ok(()),
		EINVAL => {
			validate_fs_name(name)?;
			Err(StoreError::NotClone { name: named(name) })
		}
		ENOTSOCK => Err(StoreError::NotClone { name: named(name) }),
		ENOENT => Err(StoreError::FilesystemNotFound { name: named(name) }),
		EEXIST => Err(StoreError::SnapshotExists { name: named(name) }),
		_ => Err(generic(ret, Some(name), "failed to promote dataset")),
	}
}

/// Translate the outcome of changing an encryption key.
pub fn change_key(ret: i32, name: &[u8]) -> Result<()> {
	match ret {
		0 => Ok(()),
		EINVAL => {
			validate_fs_name(name)?;
			Err(StoreError::PropertyInvalid { name: named(name) })
		}
		ENOENT => Err(StoreError::FilesystemNotFound { name: named(name) }),
		EACCES => Err(StoreError::KeyNotLoaded),
		_ => Err(generic(ret, Some(name), "failed to change encryption key")),
	}
}

/// Translate the outcome of loading or verifying an encryption key.
pub fn load_key(ret: i32, name: &[u8], noop: bool) -> Result<()> {
	match ret {
		0 => Ok(()),
		EINVAL => {
			validate_fs_name(name)?;
			Err(StoreError::PropertyInvalid { name: named(name) })
		}
		ENOENT => Err(StoreError::FilesystemNotFound { name: named(name) }),
		EACCES => Err(StoreError::KeyInvalid),
		EEXIST => Err(StoreError::KeyAlreadyLoaded),
		_ if noop => Err(generic(ret, Some(name), "failed to load encryption key")),
		_ => Err(generic(ret, Some(name), "failed to verify encryption key")),
	}
}

/// Translate the outcome of unloading an encryption key.
pub fn unload_key(ret: i32, name: &[u8]) -> Result<()> {
	match ret {
		0 => Ok(()),
		EINVAL => {
			validate_fs_name(name)?;
			Err(StoreError::PropertyInvalid { name: named(name) })
		}
		ENOENT => Err(StoreError::FilesystemNotFound { name: named(name) }),
		EACCES => Err(StoreError::KeyNotLoaded),
		_ => Err(generic(ret, Some(name), "failed to unload encryption key")),
	}
}

/// Translate the outcome of forcing a pool sync.
pub fn sync(ret: i32, name: &[u8]) -> Result<()> {
	match ret {
		0 => Ok(()),
		ENOENT => Err(StoreError::PoolNotFound { name: named(name) }),
		_ => Err(generic(ret, Some(name), "failed to sync pool")),
	}
}

/// Translate the outcome of reopening a pool's devices.
pub fn reopen(ret: i32, name: &[u8]) -> Result<()> {
	match ret {
		0 => Ok(()),
		ENOENT => Err(StoreError::PoolNotFound { name: named(name) }),
		_ => Err(generic(ret, Some(name), "failed to reopen pool")),
	}
}

/// Translate the outcome of running a channel program. `error` carries the
/// diagnostics string decoded from the program's output list, when present.
pub fn channel_program(ret: i32, name: &[u8], error: Option<&[u8]>) -> Result<()> {
	match ret {
		0 => Ok(()),
		ENOENT => Err(StoreError::PoolNotFound { name: named(name) }),
		ETIME => Err(StoreError::ProgramTimeout),
		ENOMEM => Err(StoreError::ProgramMemory),
		ENOSPC => Err(StoreError::ProgramSpace),
		EPERM => Err(StoreError::ProgramNotPrivileged),
		ECHRNG => Err(StoreError::ProgramRuntime {
			details: opt(error),
		}),
		EINVAL => match error {
			None => Err(StoreError::ProgramLimitInvalid),
			Some(details) => Err(StoreError::ProgramSyntax {
				details: named(details),
			}),
		},
		_ => Err(generic(
			ret,
			Some(name),
			"failed to execute channel program",
		)),
	}
}

fn checkpoint_impl(ret: i32, name: &[u8], message: &'static str) -> Result<()> {
	match ret {
		0 => Ok(()),
		ENOENT => Err(StoreError::PoolNotFound { name: named(name) }),
		ERR_CHECKPOINT_EXISTS => Err(StoreError::CheckpointExists),
		ERR_NO_CHECKPOINT => Err(StoreError::CheckpointNotFound),
		ERR_DISCARDING_CHECKPOINT => Err(StoreError::CheckpointDiscarding),
		ERR_DEVRM_IN_PROGRESS => Err(StoreError::DeviceRemovalRunning),
		ERR_VDEV_TOO_BIG => Err(StoreError::DeviceTooBig),
		_ => Err(generic(ret, Some(name), message)),
	}
}

/// Translate the outcome of creating a pool checkpoint.
pub fn pool_checkpoint(ret: i32, name: &[u8]) -> Result<()> {
	checkpoint_impl(ret, name, "failed to create pool checkpoint")
}

/// Translate the outcome of discarding a pool checkpoint.
pub fn pool_checkpoint_discard(ret: i32, name: &[u8]) -> Result<()> {
	checkpoint_impl(ret, name, "failed to discard pool checkpoint")
}

/// Translate the outcome of renaming a dataset.
pub fn rename(ret: i32, source: &[u8], target: &[u8]) -> Result<()> {
	match ret {
		0 => Ok(()),
		EINVAL => {
			validate_fs_name(source)?;
			validate_fs_name(target)?;
			if pool_name(source) != pool_name(target) {
				return Err(StoreError::PoolsDiffer {
					name: named(source),
				});
			}
			Err(generic(ret, Some(source), "failed to rename dataset"))
		}
		EEXIST => Err(StoreError::FilesystemExists {
			name: named(target),
		}),
		ENOENT => Err(StoreError::FilesystemNotFound {
			name: named(source),
		}),
		ERR_WRONG_PARENT => Err(StoreError::WrongParent {
			name: named(target),
		}),
		_ => Err(generic(ret, Some(source), "failed to rename dataset")),
	}
}

/// Translate the outcome of destroying a filesystem or volume.
pub fn destroy(ret: i32, name: &[u8]) -> Result<()> {
	match ret {
		0 => Ok(()),
		EINVAL => {
			validate_fs_name(name)?;
			Err(generic(ret, Some(name), "failed to destroy dataset"))
		}
		ENOENT => Err(StoreError::FilesystemNotFound { name: named(name) }),
		_ => Err(generic(ret, Some(name), "failed to destroy dataset")),
	}
}

/// Translate the outcome of resetting a property to its inherited value.
pub fn inherit_prop(ret: i32, name: &[u8], prop: &[u8]) -> Result<()> {
	match ret {
		0 => Ok(()),
		EINVAL => {
			validate_fs_name(name)?;
			Err(StoreError::PropertyInvalid { name: named(prop) })
		}
		ENOENT => Err(StoreError::DatasetNotFound { name: named(name) }),
		_ => Err(generic(ret, Some(name), "failed to inherit a property")),
	}
}

/// Translate the outcome of setting a property.
pub fn set_prop(ret: i32, name: &[u8], prop: &[u8]) -> Result<()> {
	match ret {
		0 => Ok(()),
		EINVAL => {
			validate_fs_or_snap_name(name)?;
			Err(StoreError::PropertyInvalid { name: named(prop) })
		}
		ENOENT => Err(StoreError::DatasetNotFound { name: named(name) }),
		_ => Err(generic(ret, Some(name), "failed to set a property")),
	}
}

/// Translate the outcome of reading a dataset's properties.
pub fn get_props(ret: i32, name: &[u8]) -> Result<()> {
	match ret {
		0 => Ok(()),
		EINVAL => {
			validate_fs_or_snap_name(name)?;
			Err(generic(ret, Some(name), "failed to get properties"))
		}
		ENOENT => Err(StoreError::DatasetNotFound { name: named(name) }),
		_ => Err(generic(ret, Some(name), "failed to get properties")),
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn success_status_is_always_a_no_op() {
		assert!(create(0, b"tank/fs").is_ok());
		assert!(destroy(0, b"tank/fs").is_ok());
		assert!(snapshot(0, Vec::new(), &[b"tank/fs@s"]).is_ok());
	}

	#[test]
	fn create_einval_disambiguates_on_name_syntax() {
		// Invalid filesystem name: the re-validation wins.
		let err = create(EINVAL, b"tank/bad*name").unwrap_err();
		assert!(matches!(err, StoreError::FilesystemNameInvalid { .. }));

		// Valid name: the property must have been at fault.
		let err = create(EINVAL, b"tank/fs").unwrap_err();
		assert!(matches!(err, StoreError::PropertyInvalid { .. }));
		assert_eq!(err.errno(), EINVAL);
	}

	#[test]
	fn clone_enoent_distinguishes_origin_from_target() {
		let err = clone_from(ENOENT, b"tank/fs", b"tank/other-not-a-snap").unwrap_err();
		assert!(matches!(err, StoreError::SnapshotNameInvalid { .. }));

		let err = clone_from(ENOENT, b"tank/fs", b"tank/other@snap").unwrap_err();
		assert!(matches!(err, StoreError::DatasetNotFound { .. }));
	}

	#[test]
	fn snapshot_exdev_depends_on_pool_spread() {
		let snaps: &[&[u8]] = &[b"tank/a@s", b"tank/b@s"];
		let failure = snapshot(EXDEV, Vec::new(), snaps).unwrap_err();
		assert!(matches!(
			failure.errors[0],
			StoreError::DuplicateSnapshots { .. }
		));

		let snaps: &[&[u8]] = &[b"tank/a@s", b"dozer/b@s"];
		let failure = snapshot(EXDEV, Vec::new(), snaps).unwrap_err();
		assert!(matches!(failure.errors[0], StoreError::PoolsDiffer { .. }));
	}

	#[test]
	fn snapshot_einval_checks_names_before_properties() {
		let snaps: &[&[u8]] = &[b"tank/a", b"tank/b@s"];
		let failure = snapshot(EINVAL, Vec::new(), snaps).unwrap_err();
		assert!(matches!(failure.errors[0], StoreError::NameInvalid { .. }));

		let snaps: &[&[u8]] = &[b"tank/a@s", b"tank/b@s"];
		let failure = snapshot(EINVAL, Vec::new(), snaps).unwrap_err();
		assert!(matches!(
			failure.errors[0],
			StoreError::PropertyInvalid { .. }
		));
	}

	#[test]
	fn hold_ebadf_takes_priority_over_the_batch() {
		let holds = vec![(b"tank/fs@s".to_vec(), b"tag".to_vec())];
		let err = hold(EBADF, Vec::new(), &holds).unwrap_err();
		assert_eq!(err, StoreError::BadCleanupFd);
	}

	#[test]
	fn hold_enoent_attributes_the_filesystem() {
		let holds = vec![(b"tank/fs@s".to_vec(), b"tag".to_vec())];
		let err = hold(ENOENT, Vec::new(), &holds).unwrap_err();
		let StoreError::Batch(failure) = err else {
			panic!("expected a batch failure");
		};
		let StoreError::FilesystemNotFound { name } = &failure.errors[0] else {
			panic!("expected FilesystemNotFound");
		};
		assert_eq!(name.as_ref().unwrap().as_bytes(), b"tank/fs");
	}

	#[test]
	fn release_e2big_points_at_the_oversized_tag() {
		let long_tag = vec![b'x'; MAXNAMELEN + 1];
		let holds = vec![(b"tank/fs@s".to_vec(), vec![b"ok".to_vec(), long_tag.clone()])];
		let failure = release(E2BIG, Vec::new(), &holds).unwrap_err();
		let StoreError::NameTooLong { name } = &failure.errors[0] else {
			panic!("expected NameTooLong");
		};
		assert_eq!(name.as_ref().unwrap().as_bytes(), long_tag.as_slice());
	}

	#[test]
	fn send_unknown_status_becomes_stream_io() {
		let err = send(EIO, b"tank/fs@s", None).unwrap_err();
		assert_eq!(err, StoreError::StreamIo { errno: EIO });
		assert_eq!(err.errno(), EIO);
	}

	#[test]
	fn receive_feature_flags_shape_einval() {
		let base = ReceiveContext {
			snapname: b"tank/fs@s",
			origin: None,
			force: false,
			raw: false,
			resumable: false,
			embedded: false,
		};

		let ctx = ReceiveContext { resumable: true, ..base };
		assert_eq!(
			receive(EINVAL, &ctx, Vec::new()).unwrap_err(),
			StoreError::StreamFeatureInvalid
		);

		let ctx = ReceiveContext { embedded: true, ..base };
		assert_eq!(
			receive(EINVAL, &ctx, Vec::new()).unwrap_err(),
			StoreError::StreamFeatureIncompatible
		);

		let ctx = ReceiveContext { embedded: true, raw: true, ..base };
		assert_eq!(receive(EINVAL, &ctx, Vec::new()).unwrap_err(), StoreError::BadStream);
	}

	#[test]
	fn receive_success_with_property_errors_still_fails() {
		let ctx = ReceiveContext {
			snapname: b"tank/fs@s",
			origin: None,
			force: false,
			raw: false,
			resumable: false,
			embedded: false,
		};
		let properrs = vec![(b"compression".to_vec(), EINVAL)];
		let err = receive(0, &ctx, properrs).unwrap_err();
		let StoreError::Batch(failure) = err else {
			panic!("expected a batch failure");
		};
		assert!(matches!(
			failure.errors[0],
			StoreError::PropertyInvalid { .. }
		));
	}

	#[test]
	fn channel_program_einval_depends_on_diagnostics() {
		assert_eq!(
			channel_program(EINVAL, b"tank", None).unwrap_err(),
			StoreError::ProgramLimitInvalid
		);
		let err = channel_program(EINVAL, b"tank", Some(b"parse error at line 3")).unwrap_err();
		assert!(matches!(err, StoreError::ProgramSyntax { .. }));
	}

	#[test]
	fn unmapped_codes_keep_the_raw_status() {
		let err = create(libc::EILSEQ, b"tank/fs").unwrap_err();
		let StoreError::Generic { errno, .. } = err else {
			panic!("expected Generic");
		};
		assert_eq!(errno, libc::EILSEQ);
	}

	#[test]
	fn generic_fallback_promotes_well_known_codes() {
		let err = destroy(ENOSPC, b"tank/fs").unwrap_err();
		assert!(matches!(err, StoreError::NoSpace { .. }));
		let err = destroy(EROFS, b"tank/fs").unwrap_err();
		assert!(matches!(err, StoreError::ReadOnlyPool { .. }));
	}
}
