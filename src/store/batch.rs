use thiserror::Error;

use crate::store::codes;
use crate::store::error::StoreError;

/// Batch operations that report per-item failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchOp {
	/// Snapshot creation.
	SnapshotCreate,
	/// Snapshot destruction.
	SnapshotDestroy,
	/// Bookmark creation.
	BookmarkCreate,
	/// Bookmark destruction.
	BookmarkDestroy,
	/// Hold placement.
	Hold,
	/// Hold release.
	Release,
	/// Property application during receive.
	ReceiveProperty,
}

impl BatchOp {
	fn message(self) -> &'static str {
		match self {
			BatchOp::SnapshotCreate => "creation of snapshot(s) failed for one or more reasons",
			BatchOp::SnapshotDestroy => "destruction of snapshot(s) failed for one or more reasons",
			BatchOp::BookmarkCreate => "creation of bookmark(s) failed for one or more reasons",
			BatchOp::BookmarkDestroy => "destruction of bookmark(s) failed for one or more reasons",
			BatchOp::Hold => "placement of hold(s) failed for one or more reasons",
			BatchOp::Release => "release of hold(s) failed for one or more reasons",
			BatchOp::ReceiveProperty => "receiving of properties failed for one or more reasons",
		}
	}
}

/// Compound outcome of a failed batch operation: one typed sub-error per
/// attributable failure plus the count of failures the native layer chose
/// not to enumerate.
///
/// `errors` is non-empty by construction. When the native layer reports a
/// single undifferentiated status for a multi-item batch, only one
/// sub-error appears even if the batch failed for several independent
/// reasons; the protocol gives no way to recover the rest.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{}; {} errors included, {} suppressed", .op.message(), .errors.len(), .suppressed)]
pub struct BatchFailure {
	/// Which batch operation failed.
	pub op: BatchOp,
	/// One typed error per enumerated failure, in native storage order.
	pub errors: Vec<StoreError>,
	/// Failures the native layer did not enumerate.
	pub suppressed: u64,
}

impl BatchFailure {
	/// Overall status code: the first sub-error's code.
	pub fn errno(&self) -> i32 {
		self.errors.first().map_or(0, StoreError::errno)
	}
}

/// Convert a batch outcome into a compound failure.
///
/// With an empty `errlist` the native layer reported one undifferentiated
/// status for the whole batch: it is attributed to the single requested
/// item if there was exactly one, and to no item otherwise. With a
/// non-empty `errlist` the reserved suppressed-count sentinel is split off
/// and every remaining entry is mapped in storage order.
pub fn reconcile(
	op: BatchOp,
	ret: i32,
	errlist: Vec<(Vec<u8>, i32)>,
	names: &[&[u8]],
	mapper: impl Fn(i32, Option<&[u8]>) -> StoreError,
) -> Result<(), BatchFailure> {
	if ret == 0 {
		return Ok(());
	}

	let mut suppressed = 0_u64;
	let mut errors = Vec::new();

	if errlist.is_empty() {
		let name = if names.len() == 1 { Some(names[0]) } else { None };
		errors.push(mapper(ret, name));
	} else {
		for (name, status) in errlist {
			if name == codes::N_MORE_ERRORS {
				suppressed = u64::try_from(status).unwrap_or(0);
				continue;
			}
			errors.push(mapper(status, Some(name.as_slice())));
		}
		if errors.is_empty() {
			// Degenerate native report: only the sentinel was present.
			errors.push(mapper(ret, None));
		}
	}

	Err(BatchFailure {
		op,
		errors,
		suppressed,
	})
}

#[cfg(test)]
mod tests {
	use super::{BatchOp, reconcile};
	use crate::store::error::StoreError;

	fn map(status: i32, name: Option<&[u8]>) -> StoreError {
		StoreError::Generic {
			errno: status,
			name: name.map(Into::into),
			message: "failed",
		}
	}

	#[test]
	fn success_reconciles_to_nothing() {
		assert!(reconcile(BatchOp::SnapshotCreate, 0, Vec::new(), &[b"a"], map).is_ok());
	}

	#[test]
	fn undifferentiated_failure_attributes_a_single_name() {
		let failure = reconcile(BatchOp::SnapshotCreate, libc::EEXIST, Vec::new(), &[b"a"], map)
			.unwrap_err();
		assert_eq!(failure.errors.len(), 1);
		assert_eq!(failure.suppressed, 0);
		assert_eq!(failure.errors[0].subject().unwrap().as_bytes(), b"a");
		assert_eq!(failure.errno(), libc::EEXIST);
	}

	#[test]
	fn undifferentiated_failure_with_many_names_has_no_subject() {
		let failure = reconcile(
			BatchOp::SnapshotCreate,
			libc::EEXIST,
			Vec::new(),
			&[b"a", b"b"],
			map,
		)
		.unwrap_err();
		assert_eq!(failure.errors.len(), 1);
		assert!(failure.errors[0].subject().is_none());
	}

	#[test]
	fn per_item_detail_maps_each_entry_and_pops_the_sentinel() {
		let errlist = vec![
			(b"a".to_vec(), libc::EEXIST),
			(b"b".to_vec(), libc::ENOENT),
			(b"N_MORE_ERRORS".to_vec(), 3),
		];
		let failure = reconcile(
			BatchOp::SnapshotDestroy,
			libc::EEXIST,
			errlist,
			&[b"a", b"b", b"c"],
			map,
		)
		.unwrap_err();
		assert_eq!(failure.errors.len(), 2);
		assert_eq!(failure.suppressed, 3);
		assert_eq!(failure.errors[0].subject().unwrap().as_bytes(), b"a");
		assert_eq!(failure.errors[0].errno(), libc::EEXIST);
		assert_eq!(failure.errors[1].subject().unwrap().as_bytes(), b"b");
		assert_eq!(failure.errors[1].errno(), libc::ENOENT);
	}

	#[test]
	fn sentinel_never_becomes_a_sub_error() {
		let errlist = vec![(b"N_MORE_ERRORS".to_vec(), 5)];
		let failure =
			reconcile(BatchOp::Hold, libc::EINVAL, errlist, &[b"a", b"b"], map).unwrap_err();
		assert_eq!(failure.suppressed, 5);
		assert_eq!(failure.errors.len(), 1);
		assert!(failure.errors[0].subject().is_none());
	}

	#[test]
	fn display_counts_included_and_suppressed() {
		let failure = reconcile(
			BatchOp::Hold,
			libc::EINVAL,
			vec![(b"a".to_vec(), libc::EINVAL), (b"N_MORE_ERRORS".to_vec(), 2)],
			&[b"a"],
			map,
		)
		.unwrap_err();
		let text = failure.to_string();
		assert!(text.contains("1 errors included"));
		assert!(text.contains("2 suppressed"));
	}
}
