use thiserror::Error;

/// Codec-local result type.
pub type Result<T> = std::result::Result<T, NvError>;

/// Errors produced while marshalling values to and from a native
/// tagged-value list.
///
/// None of these are batch-partial: any codec failure aborts the whole
/// encode or decode before a native call is issued.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NvError {
	/// A cell carried a tag number this build does not know.
	///
	/// Fatal by contract: an unknown tag means the native library and this
	/// crate disagree about the wire protocol version.
	#[error("unknown native tag {raw}")]
	UnknownTag {
		/// Raw tag number read from the cell.
		raw: i32,
	},
	/// A recognized tag with no representation in the value model.
	#[error("native tag {raw} is not representable in the value model")]
	UnsupportedTag {
		/// Raw tag number read from the cell.
		raw: i32,
	},
	/// Array elements did not all share one concrete kind.
	#[error("heterogeneous array under key '{}': element {index} is {got}, expected {expected}", String::from_utf8_lossy(.key))]
	HeterogeneousArray {
		/// Key the array was attached to.
		key: Vec<u8>,
		/// Index of the first mismatching element.
		index: usize,
		/// Kind reported by the first element.
		expected: &'static str,
		/// Kind reported by the mismatching element.
		got: &'static str,
	},
	/// Array element kind that cannot be carried in a native array.
	#[error("array under key '{}' holds {kind} elements, which have no native array form", String::from_utf8_lossy(.key))]
	UnsupportedArrayElement {
		/// Key the array was attached to.
		key: Vec<u8>,
		/// Offending element kind.
		kind: &'static str,
	},
	/// An unlabelled integer did not fit the width selected for its key.
	#[error("integer {value} under key '{}' does not fit {width}", String::from_utf8_lossy(.key))]
	IntOverflow {
		/// Key the integer was attached to.
		key: Vec<u8>,
		/// Supplied value.
		value: i128,
		/// Name of the selected native width.
		width: &'static str,
	},
	/// Nested list depth exceeded the recursion guard.
	#[error("list nesting exceeded depth limit {max_depth}")]
	DepthExceeded {
		/// Configured depth ceiling.
		max_depth: u32,
	},
	/// A packed payload ended before the declared element count.
	#[error("truncated payload at offset {at}: need {need} bytes, remaining {rem}")]
	TruncatedPayload {
		/// Byte offset where the read was attempted.
		at: usize,
		/// Requested bytes.
		need: usize,
		/// Bytes still available.
		rem: usize,
	},
	/// A packed payload carried more bytes than its declared element count.
	#[error("payload for tag {raw} has {leftover} trailing bytes")]
	TrailingBytes {
		/// Raw tag number of the cell.
		raw: i32,
		/// Unconsumed bytes.
		leftover: usize,
	},
	/// Cell storage does not match what its tag requires.
	///
	/// Seen only on corrupted or hand-built lists, e.g. a string tag over a
	/// packed scalar payload or a scalar cell with an element count other
	/// than one.
	#[error("cell '{}' storage does not match tag {raw}", String::from_utf8_lossy(.name))]
	StorageMismatch {
		/// Cell name.
		name: Vec<u8>,
		/// Raw tag number of the cell.
		raw: i32,
	},
	/// A per-item error map entry did not carry an integer status.
	#[error("error-list entry '{}' is not an integer status", String::from_utf8_lossy(.name))]
	BadErrorListEntry {
		/// Entry name.
		name: Vec<u8>,
	},
}
