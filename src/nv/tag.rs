/// Native cell tag numbering.
///
/// The numeric values are part of the wire contract with the native library
/// and must not be reordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum Tag {
	/// Presence-only flag, no payload.
	Boolean = 1,
	/// Raw byte.
	Byte = 2,
	/// Signed 16-bit integer.
	Int16 = 3,
	/// Unsigned 16-bit integer.
	Uint16 = 4,
	/// Signed 32-bit integer.
	Int32 = 5,
	/// Unsigned 32-bit integer.
	Uint32 = 6,
	/// Signed 64-bit integer.
	Int64 = 7,
	/// Unsigned 64-bit integer.
	Uint64 = 8,
	/// NUL-terminated text.
	Str = 9,
	/// Array of raw bytes.
	ByteArray = 10,
	/// Array of signed 16-bit integers.
	Int16Array = 11,
	/// Array of unsigned 16-bit integers.
	Uint16Array = 12,
	/// Array of signed 32-bit integers.
	Int32Array = 13,
	/// Array of unsigned 32-bit integers.
	Uint32Array = 14,
	/// Array of signed 64-bit integers.
	Int64Array = 15,
	/// Array of unsigned 64-bit integers.
	Uint64Array = 16,
	/// Array of strings.
	StrArray = 17,
	/// High-resolution time; recognized but not representable.
	Hrtime = 18,
	/// Nested list.
	List = 19,
	/// Array of nested lists.
	ListArray = 20,
	/// Explicit true/false value, stored as a 4-byte native boolean.
	BooleanValue = 21,
	/// Signed 8-bit integer.
	Int8 = 22,
	/// Unsigned 8-bit integer.
	Uint8 = 23,
	/// Array of explicit boolean values.
	BooleanArray = 24,
	/// Array of signed 8-bit integers.
	Int8Array = 25,
	/// Array of unsigned 8-bit integers.
	Uint8Array = 26,
	/// IEEE double; recognized but not representable.
	Double = 27,
}

/// Keys whose unlabelled integers are narrowed from the 64-bit default.
///
/// This table is part of the wire contract: the native library reads these
/// keys at the listed widths, so encoding them any wider would silently
/// misinterpret bytes on the other side.
const FORCED_INT_TAGS: &[(&[u8], Tag)] = &[
	(b"rewind-request", Tag::Uint32),
	(b"type", Tag::Uint32),
	(b"pool_context", Tag::Int32),
	(b"N_MORE_ERRORS", Tag::Int32),
];

/// Integer width forced for a reserved key, if any.
pub fn forced_int_tag(key: &[u8]) -> Option<Tag> {
	FORCED_INT_TAGS.iter().find(|(k, _)| *k == key).map(|(_, tag)| *tag)
}

impl Tag {
	/// Map a raw cell tag to its known variant.
	pub fn from_raw(raw: i32) -> Option<Tag> {
		Some(match raw {
			1 => Tag::Boolean,
			2 => Tag::Byte,
			3 => Tag::Int16,
			4 => Tag::Uint16,
			5 => Tag::Int32,
			6 => Tag::Uint32,
			7 => Tag::Int64,
			8 => Tag::Uint64,
			9 => Tag::Str,
			10 => Tag::ByteArray,
			11 => Tag::Int16Array,
			12 => Tag::Uint16Array,
			13 => Tag::Int32Array,
			14 => Tag::Uint32Array,
			15 => Tag::Int64Array,
			16 => Tag::Uint64Array,
			17 => Tag::StrArray,
			18 => Tag::Hrtime,
			19 => Tag::List,
			20 => Tag::ListArray,
			21 => Tag::BooleanValue,
			22 => Tag::Int8,
			23 => Tag::Uint8,
			24 => Tag::BooleanArray,
			25 => Tag::Int8Array,
			26 => Tag::Uint8Array,
			27 => Tag::Double,
			_ => return None,
		})
	}

	/// Raw wire number for this tag.
	pub fn raw(self) -> i32 {
		self as i32
	}

	/// Whether this tag is an array variant.
	pub fn is_array(self) -> bool {
		matches!(
			self,
			Tag::ByteArray
				| Tag::Int8Array
				| Tag::Uint8Array
				| Tag::Int16Array
				| Tag::Uint16Array
				| Tag::Int32Array
				| Tag::Uint32Array
				| Tag::Int64Array
				| Tag::Uint64Array
				| Tag::StrArray
				| Tag::BooleanArray
				| Tag::ListArray
		)
	}

	/// Element tag for an array variant.
	pub fn element(self) -> Option<Tag> {
		Some(match self {
			Tag::ByteArray => Tag::Byte,
			Tag::Int8Array => Tag::Int8,
			Tag::Uint8Array => Tag::Uint8,
			Tag::Int16Array => Tag::Int16,
			Tag::Uint16Array => Tag::Uint16,
			Tag::Int32Array => Tag::Int32,
			Tag::Uint32Array => Tag::Uint32,
			Tag::Int64Array => Tag::Int64,
			Tag::Uint64Array => Tag::Uint64,
			Tag::StrArray => Tag::Str,
			Tag::BooleanArray => Tag::BooleanValue,
			Tag::ListArray => Tag::List,
			_ => return None,
		})
	}

	/// Array variant for a scalar tag.
	pub fn array_variant(self) -> Option<Tag> {
		Some(match self {
			Tag::Byte => Tag::ByteArray,
			Tag::Int8 => Tag::Int8Array,
			Tag::Uint8 => Tag::Uint8Array,
			Tag::Int16 => Tag::Int16Array,
			Tag::Uint16 => Tag::Uint16Array,
			Tag::Int32 => Tag::Int32Array,
			Tag::Uint32 => Tag::Uint32Array,
			Tag::Int64 => Tag::Int64Array,
			Tag::Uint64 => Tag::Uint64Array,
			Tag::Str => Tag::StrArray,
			Tag::BooleanValue => Tag::BooleanArray,
			Tag::List => Tag::ListArray,
			_ => return None,
		})
	}

	/// Packed byte width for fixed-width scalar kinds.
	///
	/// `BooleanValue` is a 4-byte native boolean. Tags stored outside the
	/// packed representation (strings, lists, the presence flag) have none.
	pub fn scalar_width(self) -> Option<usize> {
		Some(match self {
			Tag::Byte | Tag::Int8 | Tag::Uint8 => 1,
			Tag::Int16 | Tag::Uint16 => 2,
			Tag::Int32 | Tag::Uint32 | Tag::BooleanValue => 4,
			Tag::Int64 | Tag::Uint64 => 8,
			_ => return None,
		})
	}
}

#[cfg(test)]
mod tests {
	use super::{Tag, forced_int_tag};

	#[test]
	fn raw_round_trip_covers_all_known_tags() {
		for raw in 1..=27 {
			let tag = Tag::from_raw(raw).unwrap();
			assert_eq!(tag.raw(), raw);
		}
		assert_eq!(Tag::from_raw(0), None);
		assert_eq!(Tag::from_raw(28), None);
		assert_eq!(Tag::from_raw(-1), None);
	}

	#[test]
	fn array_classification_matches_element_mapping() {
		for raw in 1..=27 {
			let tag = Tag::from_raw(raw).unwrap();
			assert_eq!(tag.is_array(), tag.element().is_some());
			if let Some(elem) = tag.element() {
				assert_eq!(elem.array_variant(), Some(tag));
			}
		}
	}

	#[test]
	fn packed_widths_cover_exactly_the_fixed_width_kinds() {
		assert_eq!(Tag::Byte.scalar_width(), Some(1));
		assert_eq!(Tag::Int8.scalar_width(), Some(1));
		assert_eq!(Tag::Uint16.scalar_width(), Some(2));
		assert_eq!(Tag::Int32.scalar_width(), Some(4));
		assert_eq!(Tag::BooleanValue.scalar_width(), Some(4));
		assert_eq!(Tag::Uint64.scalar_width(), Some(8));
		assert_eq!(Tag::Boolean.scalar_width(), None);
		assert_eq!(Tag::Str.scalar_width(), None);
		assert_eq!(Tag::List.scalar_width(), None);
	}

	#[test]
	fn reserved_keys_force_32_bit_widths() {
		assert_eq!(forced_int_tag(b"rewind-request"), Some(Tag::Uint32));
		assert_eq!(forced_int_tag(b"type"), Some(Tag::Uint32));
		assert_eq!(forced_int_tag(b"pool_context"), Some(Tag::Int32));
		assert_eq!(forced_int_tag(b"N_MORE_ERRORS"), Some(Tag::Int32));
		assert_eq!(forced_int_tag(b"other"), None);
	}
}
