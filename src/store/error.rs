use std::fmt;

use thiserror::Error;

use crate::nv::NvError;
use crate::store::batch::BatchFailure;
use crate::store::codes;

/// Store-local result type.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Entity name attached to an error, kept as the raw bytes the caller
/// supplied and rendered lossily for display.
#[derive(Clone, PartialEq, Eq)]
pub struct Name(Vec<u8>);

impl Name {
	/// Raw name bytes.
	pub fn as_bytes(&self) -> &[u8] {
		&self.0
	}
}

impl fmt::Display for Name {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", String::from_utf8_lossy(&self.0))
	}
}

impl fmt::Debug for Name {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{:?}", String::from_utf8_lossy(&self.0))
	}
}

impl From<&[u8]> for Name {
	fn from(bytes: &[u8]) -> Self {
		Name(bytes.to_vec())
	}
}

impl From<Vec<u8>> for Name {
	fn from(bytes: Vec<u8>) -> Self {
		Name(bytes)
	}
}

pub(crate) fn suffix(name: &Option<Name>) -> String {
	match name {
		Some(name) => format!(": '{name}'"),
		None => String::new(),
	}
}

/// Errors raised by store operations.
///
/// Every variant reports the raw native status code through
/// [`StoreError::errno`] and, when one is known, the subject entity through
/// [`StoreError::subject`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
	/// Generic I/O failure inside the pool.
	#[error("i/o error{}", suffix(.name))]
	Io {
		/// Affected entity, when attributable.
		name: Option<Name>,
	},
	/// Pool ran out of space.
	#[error("no space left{}", suffix(.name))]
	NoSpace {
		/// Affected entity, when attributable.
		name: Option<Name>,
	},
	/// A quota stopped the operation.
	#[error("quota exceeded{}", suffix(.name))]
	QuotaExceeded {
		/// Affected entity, when attributable.
		name: Option<Name>,
	},
	/// Dataset is in use.
	#[error("dataset is busy{}", suffix(.name))]
	DatasetBusy {
		/// Affected entity, when attributable.
		name: Option<Name>,
	},
	/// Name exceeds the protocol's length ceiling.
	#[error("name is too long{}", suffix(.name))]
	NameTooLong {
		/// Offending name.
		name: Option<Name>,
	},
	/// Pool is imported read-only.
	#[error("pool is read-only{}", suffix(.name))]
	ReadOnlyPool {
		/// Pool name, when attributable.
		name: Option<Name>,
	},
	/// Pool I/O is suspended.
	#[error("pool is suspended{}", suffix(.name))]
	SuspendedPool {
		/// Pool name, when attributable.
		name: Option<Name>,
	},
	/// Operation spans two different pools.
	#[error("source and target belong to different pools{}", suffix(.name))]
	PoolsDiffer {
		/// Affected entity, when attributable.
		name: Option<Name>,
	},
	/// Property is unknown to this library version.
	#[error("property is not supported in this version{}", suffix(.name))]
	PropertyNotSupported {
		/// Affected entity, when attributable.
		name: Option<Name>,
	},
	/// Feature is unknown to this pool version.
	#[error("feature is not supported in this version{}", suffix(.name))]
	FeatureNotSupported {
		/// Pool name, when attributable.
		name: Option<Name>,
	},
	/// Property name or value was rejected.
	#[error("invalid property or property value{}", suffix(.name))]
	PropertyInvalid {
		/// Affected entity, when attributable.
		name: Option<Name>,
	},
	/// Name is syntactically invalid for the operation.
	#[error("invalid name{}", suffix(.name))]
	NameInvalid {
		/// Offending name.
		name: Option<Name>,
	},
	/// Name is not a valid filesystem or volume name.
	#[error("invalid name for filesystem or volume{}", suffix(.name))]
	FilesystemNameInvalid {
		/// Offending name.
		name: Option<Name>,
	},
	/// Name is not a valid snapshot name.
	#[error("invalid name for snapshot{}", suffix(.name))]
	SnapshotNameInvalid {
		/// Offending name.
		name: Option<Name>,
	},
	/// Name is not a valid bookmark name.
	#[error("invalid name for bookmark{}", suffix(.name))]
	BookmarkNameInvalid {
		/// Offending name.
		name: Option<Name>,
	},
	/// A snapshot or filesystem is missing and the causes cannot be told
	/// apart.
	#[error("dataset not found{}", suffix(.name))]
	DatasetNotFound {
		/// Requested dataset.
		name: Option<Name>,
	},
	/// A snapshot or filesystem already exists and the causes cannot be
	/// told apart.
	#[error("dataset already exists{}", suffix(.name))]
	DatasetExists {
		/// Conflicting dataset.
		name: Option<Name>,
	},
	/// Filesystem does not exist.
	#[error("filesystem not found{}", suffix(.name))]
	FilesystemNotFound {
		/// Requested filesystem.
		name: Option<Name>,
	},
	/// Filesystem already exists.
	#[error("filesystem already exists{}", suffix(.name))]
	FilesystemExists {
		/// Conflicting filesystem.
		name: Option<Name>,
	},
	/// Parent dataset does not exist.
	#[error("parent not found{}", suffix(.name))]
	ParentNotFound {
		/// Requested child name.
		name: Option<Name>,
	},
	/// Parent dataset is not a filesystem.
	#[error("parent dataset is not a filesystem{}", suffix(.name))]
	WrongParent {
		/// Affected filesystem.
		name: Option<Name>,
	},
	/// Snapshot does not exist.
	#[error("snapshot not found{}", suffix(.name))]
	SnapshotNotFound {
		/// Requested snapshot.
		name: Option<Name>,
	},
	/// Snapshot already exists.
	#[error("snapshot already exists{}", suffix(.name))]
	SnapshotExists {
		/// Conflicting snapshot.
		name: Option<Name>,
	},
	/// Rollback target is not the most recent snapshot.
	#[error("snapshot is not the latest{}", suffix(.name))]
	SnapshotNotLatest {
		/// Requested snapshot.
		name: Option<Name>,
	},
	/// Snapshot has dependent clones.
	#[error("snapshot is cloned{}", suffix(.name))]
	SnapshotIsCloned {
		/// Affected snapshot.
		name: Option<Name>,
	},
	/// Snapshot carries user holds.
	#[error("snapshot is held{}", suffix(.name))]
	SnapshotIsHeld {
		/// Affected snapshot.
		name: Option<Name>,
	},
	/// One request named several snapshots of the same filesystem.
	#[error("requested multiple snapshots of the same filesystem{}", suffix(.name))]
	DuplicateSnapshots {
		/// One of the duplicates.
		name: Option<Name>,
	},
	/// Snapshot is not a descendant of the transfer source.
	#[error("snapshot is not a descendant of the source snapshot{}", suffix(.name))]
	SnapshotMismatch {
		/// Affected snapshot.
		name: Option<Name>,
	},
	/// Bookmark already exists.
	#[error("bookmark already exists{}", suffix(.name))]
	BookmarkExists {
		/// Conflicting bookmark.
		name: Option<Name>,
	},
	/// Bookmark does not exist.
	#[error("bookmark not found{}", suffix(.name))]
	BookmarkNotFound {
		/// Requested bookmark.
		name: Option<Name>,
	},
	/// Bookmark source is not an ancestor of the bookmark's dataset.
	#[error("source is not an ancestor of the new bookmark's dataset{}", suffix(.name))]
	BookmarkMismatch {
		/// Offending source.
		name: Option<Name>,
	},
	/// Bookmark source is neither a snapshot nor an existing bookmark.
	#[error("bookmark source is not a valid snapshot or existing bookmark{}", suffix(.name))]
	BookmarkSourceInvalid {
		/// Offending source.
		name: Option<Name>,
	},
	/// Pool does not support bookmarks.
	#[error("bookmark feature is not supported{}", suffix(.name))]
	BookmarkNotSupported {
		/// Affected bookmark.
		name: Option<Name>,
	},
	/// Hold with the given tag already exists.
	#[error("hold with a given tag already exists on snapshot{}", suffix(.name))]
	HoldExists {
		/// Affected snapshot.
		name: Option<Name>,
	},
	/// Hold with the given tag does not exist.
	#[error("hold with a given tag does not exist on snapshot{}", suffix(.name))]
	HoldNotFound {
		/// Affected snapshot.
		name: Option<Name>,
	},
	/// Cleanup descriptor passed to a hold request is not valid.
	#[error("bad cleanup file descriptor")]
	BadCleanupFd,
	/// Pool does not exist.
	#[error("no such pool{}", suffix(.name))]
	PoolNotFound {
		/// Requested pool.
		name: Option<Name>,
	},
	/// Promotion target is not a clone.
	#[error("filesystem is not a clone, can not promote{}", suffix(.name))]
	NotClone {
		/// Affected filesystem.
		name: Option<Name>,
	},
	/// Stream does not apply to the destination dataset.
	#[error("stream is not applicable to destination dataset{}", suffix(.name))]
	StreamMismatch {
		/// Destination dataset.
		name: Option<Name>,
	},
	/// Destination changed since the stream was generated.
	#[error("destination dataset has modifications that can not be undone{}", suffix(.name))]
	DestinationModified {
		/// Destination dataset.
		name: Option<Name>,
	},
	/// Stream is damaged.
	#[error("bad transfer stream")]
	BadStream,
	/// Stream carries a feature this version cannot receive.
	#[error("stream contains an unsupported feature")]
	StreamFeatureNotSupported,
	/// Stream requires a newer native library to receive.
	#[error("native library must be upgraded to receive this stream")]
	StreamFeatureInvalid,
	/// Embedded stream data is incompatible with a raw receive.
	#[error("embedded stream feature is incompatible with raw receive")]
	StreamFeatureIncompatible,
	/// Stream ended before its declared end.
	#[error("incomplete stream")]
	StreamTruncated,
	/// I/O failure while reading or writing a stream.
	#[error("stream i/o error (status {errno})")]
	StreamIo {
		/// Raw status observed on the stream descriptor.
		errno: i32,
	},
	/// Encryption key is not loaded.
	#[error("encryption key is not currently loaded")]
	KeyNotLoaded,
	/// Encryption key is already loaded.
	#[error("encryption key is already loaded")]
	KeyAlreadyLoaded,
	/// Supplied encryption key is wrong.
	#[error("incorrect encryption key provided")]
	KeyInvalid,
	/// Channel program failed to parse.
	#[error("program contains syntax errors{}", suffix(.details))]
	ProgramSyntax {
		/// Parser diagnostics reported by the native library.
		details: Option<Name>,
	},
	/// Channel program faulted while running.
	#[error("program encountered a runtime error{}", suffix(.details))]
	ProgramRuntime {
		/// Runtime diagnostics reported by the native library.
		details: Option<Name>,
	},
	/// Channel program limits were rejected.
	#[error("program called with invalid limits")]
	ProgramLimitInvalid,
	/// Channel program exceeded its time limit.
	#[error("program timed out")]
	ProgramTimeout,
	/// Channel program exhausted its memory limit.
	#[error("program exhausted the memory limit")]
	ProgramSpace,
	/// Channel program's return value was too large.
	#[error("program return value too large")]
	ProgramMemory,
	/// Channel programs require privilege.
	#[error("program must be run with privilege")]
	ProgramNotPrivileged,
	/// Pool already has a checkpoint.
	#[error("pool already has a checkpoint")]
	CheckpointExists,
	/// Pool has no checkpoint.
	#[error("pool does not have a checkpoint")]
	CheckpointNotFound,
	/// Pool checkpoint is being discarded.
	#[error("pool checkpoint is being discarded")]
	CheckpointDiscarding,
	/// A device removal is running.
	#[error("a device is currently being removed")]
	DeviceRemovalRunning,
	/// A top-level device exceeds the maximum supported size.
	#[error("one or more top-level devices exceed the maximum device size")]
	DeviceTooBig,
	/// Native library initialization failed; retried on next use.
	#[error("failed to initialize the native library (status {errno})")]
	InitFailed {
		/// Raw status returned by the native init entry point.
		errno: i32,
	},
	/// No native dispatch table has been installed.
	#[error("no native dispatch table installed")]
	NoBackend,
	/// Status code with no specific mapping for the operation.
	#[error("{message} (status {errno}){}", suffix(.name))]
	Generic {
		/// Raw status code.
		errno: i32,
		/// Affected entity, when attributable.
		name: Option<Name>,
		/// Operation context.
		message: &'static str,
	},
	/// Marshalling failed before the native call was issued.
	#[error("codec: {0}")]
	Codec(#[from] NvError),
	/// A batch operation failed for one or more enumerated reasons.
	#[error(transparent)]
	Batch(#[from] BatchFailure),
}

impl StoreError {
	/// Raw native status code behind this error.
	pub fn errno(&self) -> i32 {
		match self {
			StoreError::Io { .. } => libc::EIO,
			StoreError::NoSpace { .. } | StoreError::ProgramSpace => libc::ENOSPC,
			StoreError::QuotaExceeded { .. } => libc::EDQUOT,
			StoreError::DatasetBusy { .. } | StoreError::SnapshotIsHeld { .. } => libc::EBUSY,
			StoreError::NameTooLong { .. } => libc::ENAMETOOLONG,
			StoreError::ReadOnlyPool { .. } => libc::EROFS,
			StoreError::SuspendedPool { .. } => libc::EAGAIN,
			StoreError::PoolsDiffer { .. } | StoreError::DuplicateSnapshots { .. } => libc::EXDEV,
			StoreError::PropertyNotSupported { .. }
			| StoreError::FeatureNotSupported { .. }
			| StoreError::BookmarkNotSupported { .. }
			| StoreError::StreamFeatureNotSupported => libc::ENOTSUP,
			StoreError::PropertyInvalid { .. }
			| StoreError::NameInvalid { .. }
			| StoreError::FilesystemNameInvalid { .. }
			| StoreError::SnapshotNameInvalid { .. }
			| StoreError::BookmarkNameInvalid { .. }
			| StoreError::BookmarkMismatch { .. }
			| StoreError::BookmarkSourceInvalid { .. }
			| StoreError::NotClone { .. }
			| StoreError::StreamFeatureInvalid
			| StoreError::StreamFeatureIncompatible
			| StoreError::ProgramSyntax { .. }
			| StoreError::ProgramLimitInvalid
			| StoreError::Codec(_) => libc::EINVAL,
			StoreError::DatasetNotFound { .. }
			| StoreError::FilesystemNotFound { .. }
			| StoreError::ParentNotFound { .. }
			| StoreError::SnapshotNotFound { .. }
			| StoreError::BookmarkNotFound { .. }
			| StoreError::HoldNotFound { .. }
			| StoreError::PoolNotFound { .. } => libc::ENOENT,
			StoreError::DatasetExists { .. }
			| StoreError::FilesystemExists { .. }
			| StoreError::SnapshotExists { .. }
			| StoreError::SnapshotNotLatest { .. }
			| StoreError::SnapshotIsCloned { .. }
			| StoreError::BookmarkExists { .. }
			| StoreError::HoldExists { .. }
			| StoreError::KeyAlreadyLoaded => libc::EEXIST,
			StoreError::WrongParent { .. } => codes::ERR_WRONG_PARENT,
			StoreError::SnapshotMismatch { .. } | StoreError::StreamMismatch { .. } => libc::ENODEV,
			StoreError::BadCleanupFd => libc::EBADF,
			StoreError::DestinationModified { .. } => libc::ETXTBSY,
			StoreError::BadStream => codes::ECKSUM,
			StoreError::StreamTruncated => codes::ERR_STREAM_TRUNCATED,
			StoreError::StreamIo { errno } => *errno,
			StoreError::KeyNotLoaded | StoreError::KeyInvalid => libc::EACCES,
			StoreError::ProgramRuntime { .. } => codes::ECHRNG,
			StoreError::ProgramTimeout => codes::ETIME,
			StoreError::ProgramMemory => libc::ENOMEM,
			StoreError::ProgramNotPrivileged => libc::EPERM,
			StoreError::CheckpointExists => codes::ERR_CHECKPOINT_EXISTS,
			StoreError::CheckpointNotFound => codes::ERR_NO_CHECKPOINT,
			StoreError::CheckpointDiscarding => codes::ERR_DISCARDING_CHECKPOINT,
			StoreError::DeviceRemovalRunning => codes::ERR_DEVRM_IN_PROGRESS,
			StoreError::DeviceTooBig => codes::ERR_VDEV_TOO_BIG,
			StoreError::InitFailed { errno } => *errno,
			StoreError::NoBackend => libc::ENOSYS,
			StoreError::Generic { errno, .. } => *errno,
			StoreError::Batch(failure) => failure.errno(),
		}
	}

	/// Subject entity of this error, when one is known.
	pub fn subject(&self) -> Option<&Name> {
		match self {
			StoreError::Io { name }
			| StoreError::NoSpace { name }
			| StoreError::QuotaExceeded { name }
			| StoreError::DatasetBusy { name }
			| StoreError::NameTooLong { name }
			| StoreError::ReadOnlyPool { name }
			| StoreError::SuspendedPool { name }
			| StoreError::PoolsDiffer { name }
			| StoreError::PropertyNotSupported { name }
			| StoreError::FeatureNotSupported { name }
			| StoreError::PropertyInvalid { name }
			| StoreError::NameInvalid { name }
			| StoreError::FilesystemNameInvalid { name }
			| StoreError::SnapshotNameInvalid { name }
			| StoreError::BookmarkNameInvalid { name }
			| StoreError::DatasetNotFound { name }
			| StoreError::DatasetExists { name }
			| StoreError::FilesystemNotFound { name }
			| StoreError::FilesystemExists { name }
			| StoreError::ParentNotFound { name }
			| StoreError::WrongParent { name }
			| StoreError::SnapshotNotFound { name }
			| StoreError::SnapshotExists { name }
			| StoreError::SnapshotNotLatest { name }
			| StoreError::SnapshotIsCloned { name }
			| StoreError::SnapshotIsHeld { name }
			| StoreError::DuplicateSnapshots { name }
			| StoreError::SnapshotMismatch { name }
			| StoreError::BookmarkExists { name }
			| StoreError::BookmarkNotFound { name }
			| StoreError::BookmarkMismatch { name }
			| StoreError::BookmarkSourceInvalid { name }
			| StoreError::BookmarkNotSupported { name }
			| StoreError::HoldExists { name }
			| StoreError::HoldNotFound { name }
			| StoreError::PoolNotFound { name }
			| StoreError::NotClone { name }
			| StoreError::StreamMismatch { name }
			| StoreError::DestinationModified { name }
			| StoreError::Generic { name, .. } => name.as_ref(),
			_ => None,
		}
	}
}
