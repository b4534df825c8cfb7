//! Raw status codes shared with the native library.
//!
//! The native protocol reports classic errno values (Linux numbering) and
//! extends them with its own codes from 1024 upward. Everything here is part
//! of the wire contract.

/// Longest accepted entity name, including the pool component.
pub const MAXNAMELEN: usize = 256;

/// Channel-range errno, reused by the protocol for program runtime faults.
pub const ECHRNG: i32 = 44;

/// Checksum errno alias used for damaged streams.
pub const ECKSUM: i32 = 52;

/// Timer-expired errno, reused for program timeouts.
pub const ETIME: i32 = 62;

/// Pool already has a checkpoint.
pub const ERR_CHECKPOINT_EXISTS: i32 = 1024;

/// Pool checkpoint is currently being discarded.
pub const ERR_DISCARDING_CHECKPOINT: i32 = 1025;

/// Pool has no checkpoint.
pub const ERR_NO_CHECKPOINT: i32 = 1026;

/// A device removal is in progress.
pub const ERR_DEVRM_IN_PROGRESS: i32 = 1027;

/// A top-level device exceeds the supported size.
pub const ERR_VDEV_TOO_BIG: i32 = 1028;

/// Target's parent dataset is not a filesystem.
pub const ERR_WRONG_PARENT: i32 = 1033;

/// Bookmark source is not an ancestor of the new bookmark's dataset.
pub const ERR_BOOKMARK_SOURCE_NOT_ANCESTOR: i32 = 1039;

/// Transfer stream ended before its declared end.
pub const ERR_STREAM_TRUNCATED: i32 = 1040;

/// Invalid property name or value.
pub const ERR_BADPROP: i32 = 1044;

/// Reserved per-item error-map key carrying the count of suppressed errors.
pub const N_MORE_ERRORS: &[u8] = b"N_MORE_ERRORS";
