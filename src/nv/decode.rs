use crate::nv::bytes::Cursor;
use crate::nv::handle::NvHandle;
use crate::nv::list::{NvList, NvPair, Payload};
use crate::nv::tag::Tag;
use crate::nv::value::{Mapping, Value};
use crate::nv::{NvError, Result};

/// Nesting ceiling for decoded lists. The value model has no inherent depth
/// limit, but a corrupted native blob must fail with an error instead of
/// overflowing the call stack.
const MAX_LIST_DEPTH: u32 = 64;

/// Decode a native list into a mapping.
///
/// Cells are visited in storage order; the order carries no contract for
/// callers. The handle is only borrowed.
pub fn decode_list(handle: &NvHandle) -> Result<Mapping> {
	decode_impl(handle.list(), 0)
}

/// Decode a borrowed raw list pointer, the native side of the boundary.
///
/// # Safety
///
/// `list` must point to a live list and must not be mutated for the
/// duration of the call.
pub unsafe fn decode_list_ptr(list: *const NvList) -> Result<Mapping> {
	decode_impl(unsafe { &*list }, 0)
}

/// Flat storage-order view of a per-item error map: `(item name, status)`.
///
/// Batch reconciliation must see entries in the order the native layer
/// stored them, which a key-sorted [`Mapping`] would lose.
pub fn decode_error_list(handle: &NvHandle) -> Result<Vec<(Vec<u8>, i32)>> {
	let mut out = Vec::with_capacity(handle.list().len());
	for pair in handle.list().pairs() {
		let raw = pair.raw_tag();
		let tag = Tag::from_raw(raw).ok_or(NvError::UnknownTag { raw })?;
		let value = decode_pair(pair, tag, 0)?;
		let status = value
			.as_int()
			.and_then(|wide| i32::try_from(wide).ok())
			.ok_or_else(|| NvError::BadErrorListEntry {
				name: pair.name().to_vec(),
			})?;
		out.push((pair.name().to_vec(), status));
	}
	Ok(out)
}

fn decode_impl(list: &NvList, depth: u32) -> Result<Mapping> {
	if depth >= MAX_LIST_DEPTH {
		return Err(NvError::DepthExceeded {
			max_depth: MAX_LIST_DEPTH,
		});
	}

	let mut out = Mapping::new();
	for pair in list.pairs() {
		let raw = pair.raw_tag();
		let tag = Tag::from_raw(raw).ok_or(NvError::UnknownTag { raw })?;
		out.insert(pair.name().to_vec(), decode_pair(pair, tag, depth)?);
	}
	Ok(out)
}

fn decode_pair(pair: &NvPair, tag: Tag, depth: u32) -> Result<Value> {
	match tag {
		Tag::Boolean => {
			let (nelem, bytes) = packed(pair, tag)?;
			if nelem != 0 || !bytes.is_empty() {
				return Err(storage_mismatch(pair, tag));
			}
			Ok(Value::Unit)
		}
		Tag::BooleanValue
		| Tag::Byte
		| Tag::Int8
		| Tag::Uint8
		| Tag::Int16
		| Tag::Uint16
		| Tag::Int32
		| Tag::Uint32
		| Tag::Int64
		| Tag::Uint64 => decode_packed(pair, tag, tag, false),
		Tag::Str => match pair.payload() {
			Payload::Strs(items) if items.len() == 1 => Ok(Value::Str(items[0].clone())),
			_ => Err(storage_mismatch(pair, tag)),
		},
		Tag::List => match pair.payload() {
			Payload::Lists(children) if children.len() == 1 => {
				// Child lists are owned by the cell and never null.
				let child = unsafe { &*children[0] };
				Ok(Value::Map(decode_impl(child, depth + 1)?))
			}
			_ => Err(storage_mismatch(pair, tag)),
		},
		Tag::BooleanArray
		| Tag::ByteArray
		| Tag::Int8Array
		| Tag::Uint8Array
		| Tag::Int16Array
		| Tag::Uint16Array
		| Tag::Int32Array
		| Tag::Uint32Array
		| Tag::Int64Array
		| Tag::Uint64Array => {
			let element = tag.element().ok_or(NvError::UnknownTag { raw: tag.raw() })?;
			decode_packed(pair, tag, element, true)
		}
		Tag::StrArray => match pair.payload() {
			Payload::Strs(items) => Ok(Value::Array(
				items.iter().map(|item| Value::Str(item.clone())).collect(),
			)),
			_ => Err(storage_mismatch(pair, tag)),
		},
		Tag::ListArray => match pair.payload() {
			Payload::Lists(children) => {
				let mut out = Vec::with_capacity(children.len());
				for child in children {
					let child = unsafe { &**child };
					out.push(Value::Map(decode_impl(child, depth + 1)?));
				}
				Ok(Value::Array(out))
			}
			_ => Err(storage_mismatch(pair, tag)),
		},
		Tag::Hrtime | Tag::Double => Err(NvError::UnsupportedTag { raw: tag.raw() }),
	}
}

fn decode_packed(pair: &NvPair, tag: Tag, element: Tag, as_array: bool) -> Result<Value> {
	let (nelem, bytes) = packed(pair, tag)?;
	if !as_array && nelem != 1 {
		return Err(storage_mismatch(pair, tag));
	}

	let mut cursor = Cursor::new(bytes);
	let mut values = Vec::with_capacity(nelem as usize);
	for _ in 0..nelem {
		values.push(read_scalar(&mut cursor, element)?);
	}
	if cursor.remaining() > 0 {
		return Err(NvError::TrailingBytes {
			raw: tag.raw(),
			leftover: cursor.remaining(),
		});
	}

	if as_array {
		Ok(Value::Array(values))
	} else {
		values.pop().ok_or_else(|| storage_mismatch(pair, tag))
	}
}

fn read_scalar(cursor: &mut Cursor<'_>, element: Tag) -> Result<Value> {
	Ok(match element {
		Tag::BooleanValue => Value::Bool(cursor.read_u32_le()? != 0),
		Tag::Byte => Value::Byte(cursor.read_u8()?),
		Tag::Int8 => Value::Int8(cursor.read_u8()? as i8),
		Tag::Uint8 => Value::UInt8(cursor.read_u8()?),
		Tag::Int16 => Value::Int16(cursor.read_u16_le()? as i16),
		Tag::Uint16 => Value::UInt16(cursor.read_u16_le()?),
		Tag::Int32 => Value::Int32(cursor.read_u32_le()? as i32),
		Tag::Uint32 => Value::UInt32(cursor.read_u32_le()?),
		Tag::Int64 => Value::Int64(cursor.read_u64_le()? as i64),
		Tag::Uint64 => Value::UInt64(cursor.read_u64_le()?),
		_ => return Err(NvError::UnsupportedTag { raw: element.raw() }),
	})
}

fn packed<'a>(pair: &'a NvPair, tag: Tag) -> Result<(u32, &'a [u8])> {
	match pair.payload() {
		Payload::Packed { nelem, bytes } => Ok((*nelem, bytes)),
		_ => Err(storage_mismatch(pair, tag)),
	}
}

fn storage_mismatch(pair: &NvPair, tag: Tag) -> NvError {
	NvError::StorageMismatch {
		name: pair.name().to_vec(),
		raw: tag.raw(),
	}
}

#[cfg(test)]
mod tests {
	use super::{decode_error_list, decode_list};
	use crate::nv::encode::encode_mapping;
	use crate::nv::value::{Mapping, Value};
	use crate::nv::NvError;

	fn single(key: &[u8], value: Value) -> Mapping {
		let mut props = Mapping::new();
		props.insert(key.to_vec(), value);
		props
	}

	#[test]
	fn unknown_tag_is_fatal() {
		let mut handle = encode_mapping(&single(b"k", Value::Int(1))).unwrap();
		handle.list_mut().corrupt_tag_for_test(b"k", 99);
		let err = decode_list(&handle).unwrap_err();
		assert_eq!(err, NvError::UnknownTag { raw: 99 });
	}

	#[test]
	fn unrepresentable_tag_is_rejected() {
		let mut handle = encode_mapping(&single(b"k", Value::UInt64(1))).unwrap();
		// 18 is the high-resolution time tag, recognized but unsupported.
		handle.list_mut().corrupt_tag_for_test(b"k", 18);
		let err = decode_list(&handle).unwrap_err();
		assert_eq!(err, NvError::UnsupportedTag { raw: 18 });
	}

	#[test]
	fn truncated_payload_is_a_hard_failure() {
		let mut handle = encode_mapping(&single(b"k", Value::UInt64(0x0102_0304))).unwrap();
		handle.list_mut().truncate_payload_for_test(b"k", 3);
		let err = decode_list(&handle).unwrap_err();
		assert!(matches!(err, NvError::TruncatedPayload { .. }));
	}

	#[test]
	fn pathological_depth_fails_instead_of_overflowing() {
		let mut props = single(b"leaf", Value::Int(1));
		for _ in 0..80 {
			props = single(b"nested", Value::Map(props));
		}
		let handle = encode_mapping(&props).unwrap();
		let err = decode_list(&handle).unwrap_err();
		assert!(matches!(err, NvError::DepthExceeded { .. }));
	}

	#[test]
	fn error_list_preserves_storage_order() {
		let mut handle = encode_mapping(&Mapping::new()).unwrap();
		let list = handle.list_mut();
		// Names deliberately out of sort order.
		list.add_int32(b"pool/fs@zz", 17);
		list.add_int32(b"pool/fs@aa", 28);
		list.add_int32(b"N_MORE_ERRORS", 3);

		let entries = decode_error_list(&handle).unwrap();
		assert_eq!(
			entries,
			vec![
				(b"pool/fs@zz".to_vec(), 17),
				(b"pool/fs@aa".to_vec(), 28),
				(b"N_MORE_ERRORS".to_vec(), 3),
			]
		);
	}

	#[test]
	fn error_list_rejects_non_integer_entries() {
		let mut handle = encode_mapping(&Mapping::new()).unwrap();
		handle.list_mut().add_string(b"pool/fs@s", b"oops");
		let err = decode_error_list(&handle).unwrap_err();
		assert!(matches!(err, NvError::BadErrorListEntry { .. }));
	}
}
