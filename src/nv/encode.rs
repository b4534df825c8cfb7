use crate::nv::handle::{HandleScope, NvHandle};
use crate::nv::list::NvList;
use crate::nv::tag::{Tag, forced_int_tag};
use crate::nv::value::{Mapping, Value};
use crate::nv::{NvError, Result};

/// Encode a mapping into a freshly allocated native list.
///
/// The returned handle is the sole owner of the list. Intermediate lists
/// built for nested mappings live in an encode-local scope and are released
/// when the call returns, whether it succeeds or fails partway through.
pub fn encode_mapping(props: &Mapping) -> Result<NvHandle> {
	let mut scope = HandleScope::new();
	let root = scope.alloc();
	encode_into(&mut scope, root, props)?;
	Ok(scope.detach(root))
}

fn encode_into(scope: &mut HandleScope, list: *mut NvList, props: &Mapping) -> Result<()> {
	for (key, value) in props {
		encode_pair(scope, list, key, value)?;
	}
	Ok(())
}

fn encode_pair(scope: &mut HandleScope, list: *mut NvList, key: &[u8], value: &Value) -> Result<()> {
	// Scope-owned allocation, uniquely referenced during this call.
	let list = unsafe { &mut *list };
	match value {
		Value::Unit => list.add_boolean(key),
		Value::Bool(v) => list.add_boolean_value(key, *v),
		Value::Byte(v) => list.add_byte(key, *v),
		Value::Int8(v) => list.add_int8(key, *v),
		Value::Int16(v) => list.add_int16(key, *v),
		Value::Int32(v) => list.add_int32(key, *v),
		Value::Int64(v) => list.add_int64(key, *v),
		Value::UInt8(v) => list.add_uint8(key, *v),
		Value::UInt16(v) => list.add_uint16(key, *v),
		Value::UInt32(v) => list.add_uint32(key, *v),
		Value::UInt64(v) => list.add_uint64(key, *v),
		Value::Int(v) => encode_bare_int(list, key, *v)?,
		Value::Str(v) => list.add_string(key, v),
		Value::Map(nested) => {
			let child = scope.alloc();
			encode_into(scope, child, nested)?;
			list.add_list(key, unsafe { &*child });
		}
		Value::Array(elems) => encode_array(scope, list, key, elems)?,
	}
	Ok(())
}

/// Unlabelled integers default to the widest unsigned width; a small set of
/// reserved keys narrows them to 32 bits (see [`forced_int_tag`]).
fn encode_bare_int(list: &mut NvList, key: &[u8], value: i128) -> Result<()> {
	match forced_int_tag(key) {
		Some(Tag::Uint32) => {
			let narrow = u32::try_from(value).map_err(|_| overflow(key, value, "uint32"))?;
			list.add_uint32(key, narrow);
		}
		Some(Tag::Int32) => {
			let narrow = i32::try_from(value).map_err(|_| overflow(key, value, "int32"))?;
			list.add_int32(key, narrow);
		}
		_ => {
			let wide = u64::try_from(value).map_err(|_| overflow(key, value, "uint64"))?;
			list.add_uint64(key, wide);
		}
	}
	Ok(())
}

fn overflow(key: &[u8], value: i128, width: &'static str) -> NvError {
	NvError::IntOverflow {
		key: key.to_vec(),
		value,
		width,
	}
}

fn encode_array(scope: &mut HandleScope, list: &mut NvList, key: &[u8], elems: &[Value]) -> Result<()> {
	let Some(first) = elems.first() else {
		// An empty array has no element to take a kind from; emit the
		// default unsigned kind.
		list.add_uint64_array(key, &[]);
		return Ok(());
	};

	if matches!(first, Value::Unit | Value::Array(_)) {
		return Err(NvError::UnsupportedArrayElement {
			key: key.to_vec(),
			kind: first.kind(),
		});
	}

	for (index, elem) in elems.iter().enumerate().skip(1) {
		if std::mem::discriminant(elem) != std::mem::discriminant(first) {
			return Err(NvError::HeterogeneousArray {
				key: key.to_vec(),
				index,
				expected: first.kind(),
				got: elem.kind(),
			});
		}
	}

	match first {
		Value::Bool(_) => {
			let values: Vec<bool> = elems
				.iter()
				.filter_map(|elem| if let Value::Bool(v) = elem { Some(*v) } else { None })
				.collect();
			list.add_boolean_array(key, &values);
		}
		Value::Byte(_) => {
			let values: Vec<u8> = elems
				.iter()
				.filter_map(|elem| if let Value::Byte(v) = elem { Some(*v) } else { None })
				.collect();
			list.add_byte_array(key, &values);
		}
		Value::Int8(_) => {
			let values: Vec<i8> = elems
				.iter()
				.filter_map(|elem| if let Value::Int8(v) = elem { Some(*v) } else { None })
				.collect();
			list.add_int8_array(key, &values);
		}
		Value::Int16(_) => {
			let values: Vec<i16> = elems
				.iter()
				.filter_map(|elem| if let Value::Int16(v) = elem { Some(*v) } else { None })
				.collect();
			list.add_int16_array(key, &values);
		}
		Value::Int32(_) => {
			let values: Vec<i32> = elems
				.iter()
				.filter_map(|elem| if let Value::Int32(v) = elem { Some(*v) } else { None })
				.collect();
			list.add_int32_array(key, &values);
		}
		Value::Int64(_) => {
			let values: Vec<i64> = elems
				.iter()
				.filter_map(|elem| if let Value::Int64(v) = elem { Some(*v) } else { None })
				.collect();
			list.add_int64_array(key, &values);
		}
		Value::UInt8(_) => {
			let values: Vec<u8> = elems
				.iter()
				.filter_map(|elem| if let Value::UInt8(v) = elem { Some(*v) } else { None })
				.collect();
			list.add_uint8_array(key, &values);
		}
		Value::UInt16(_) => {
			let values: Vec<u16> = elems
				.iter()
				.filter_map(|elem| if let Value::UInt16(v) = elem { Some(*v) } else { None })
				.collect();
			list.add_uint16_array(key, &values);
		}
		Value::UInt32(_) => {
			let values: Vec<u32> = elems
				.iter()
				.filter_map(|elem| if let Value::UInt32(v) = elem { Some(*v) } else { None })
				.collect();
			list.add_uint32_array(key, &values);
		}
		Value::UInt64(_) => {
			let values: Vec<u64> = elems
				.iter()
				.filter_map(|elem| if let Value::UInt64(v) = elem { Some(*v) } else { None })
				.collect();
			list.add_uint64_array(key, &values);
		}
		Value::Int(_) => {
			// Bare integer arrays always take the 64-bit default; the
			// reserved-key table applies to scalar cells only.
			let mut values = Vec::with_capacity(elems.len());
			for elem in elems {
				if let Value::Int(v) = elem {
					values.push(u64::try_from(*v).map_err(|_| overflow(key, *v, "uint64"))?);
				}
			}
			list.add_uint64_array(key, &values);
		}
		Value::Str(_) => {
			let values: Vec<Vec<u8>> = elems
				.iter()
				.filter_map(|elem| if let Value::Str(v) = elem { Some(v.clone()) } else { None })
				.collect();
			list.add_string_array(key, &values);
		}
		Value::Map(_) => {
			let mut children = Vec::with_capacity(elems.len());
			for elem in elems {
				if let Value::Map(nested) = elem {
					let child = scope.alloc();
					encode_into(scope, child, nested)?;
					children.push(child);
				}
			}
			let refs: Vec<&NvList> = children.iter().map(|child| unsafe { &**child }).collect();
			list.add_list_array(key, &refs);
		}
		Value::Unit | Value::Array(_) => unreachable!("rejected above"),
	}
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::encode_mapping;
	use crate::nv::list::live_list_count_for_test;
	use crate::nv::tag::Tag;
	use crate::nv::value::{Mapping, Value};
	use crate::nv::NvError;

	fn single(key: &[u8], value: Value) -> Mapping {
		let mut props = Mapping::new();
		props.insert(key.to_vec(), value);
		props
	}

	fn first_tag(props: &Mapping) -> i32 {
		let handle = encode_mapping(props).unwrap();
		handle.list().pairs()[0].raw_tag()
	}

	#[test]
	fn bare_integer_defaults_to_uint64() {
		assert_eq!(first_tag(&single(b"other", Value::Int(5))), Tag::Uint64.raw());
	}

	#[test]
	fn reserved_keys_narrow_bare_integers() {
		assert_eq!(first_tag(&single(b"N_MORE_ERRORS", Value::Int(5))), Tag::Int32.raw());
		assert_eq!(first_tag(&single(b"rewind-request", Value::Int(5))), Tag::Uint32.raw());
		assert_eq!(first_tag(&single(b"pool_context", Value::Int(-5))), Tag::Int32.raw());
	}

	#[test]
	fn explicit_width_wins_over_reserved_key() {
		assert_eq!(
			first_tag(&single(b"N_MORE_ERRORS", Value::UInt64(5))),
			Tag::Uint64.raw()
		);
	}

	#[test]
	fn uint64_boundaries() {
		assert!(encode_mapping(&single(b"k", Value::Int(0))).is_ok());
		assert!(encode_mapping(&single(b"k", Value::Int(i128::from(u64::MAX)))).is_ok());
		let err = encode_mapping(&single(b"k", Value::Int(i128::from(u64::MAX) + 1))).unwrap_err();
		assert!(matches!(err, NvError::IntOverflow { width: "uint64", .. }));
		let err = encode_mapping(&single(b"k", Value::Int(-1))).unwrap_err();
		assert!(matches!(err, NvError::IntOverflow { width: "uint64", .. }));
	}

	#[test]
	fn forced_int32_boundaries() {
		let key: &[u8] = b"pool_context";
		assert!(encode_mapping(&single(key, Value::Int(i128::from(i32::MAX)))).is_ok());
		assert!(encode_mapping(&single(key, Value::Int(i128::from(i32::MIN)))).is_ok());
		let err = encode_mapping(&single(key, Value::Int(i128::from(i32::MAX) + 1))).unwrap_err();
		assert!(matches!(err, NvError::IntOverflow { width: "int32", .. }));
		let err = encode_mapping(&single(key, Value::Int(i128::from(i32::MIN) - 1))).unwrap_err();
		assert!(matches!(err, NvError::IntOverflow { width: "int32", .. }));
	}

	#[test]
	fn forced_uint32_boundaries() {
		let key: &[u8] = b"rewind-request";
		assert!(encode_mapping(&single(key, Value::Int(i128::from(u32::MAX)))).is_ok());
		let err = encode_mapping(&single(key, Value::Int(i128::from(u32::MAX) + 1))).unwrap_err();
		assert!(matches!(err, NvError::IntOverflow { width: "uint32", .. }));
		let err = encode_mapping(&single(key, Value::Int(-1))).unwrap_err();
		assert!(matches!(err, NvError::IntOverflow { width: "uint32", .. }));
	}

	#[test]
	fn heterogeneous_arrays_are_rejected() {
		let err = encode_mapping(&single(
			b"k",
			Value::Array(vec![Value::Int(1), Value::from("a")]),
		))
		.unwrap_err();
		assert!(matches!(err, NvError::HeterogeneousArray { index: 1, .. }));

		let err = encode_mapping(&single(
			b"k",
			Value::Array(vec![Value::Bool(true), Value::Int(5)]),
		))
		.unwrap_err();
		assert!(matches!(err, NvError::HeterogeneousArray { .. }));

		// Mixed explicit widths are also a mismatch.
		let err = encode_mapping(&single(
			b"k",
			Value::Array(vec![Value::UInt64(0), Value::UInt32(0)]),
		))
		.unwrap_err();
		assert!(matches!(err, NvError::HeterogeneousArray { .. }));
	}

	#[test]
	fn homogeneous_arrays_are_accepted() {
		let ints = Value::Array(vec![Value::Int(1), Value::Int(2), Value::Int(3)]);
		assert!(encode_mapping(&single(b"k", ints)).is_ok());

		let maps = Value::Array(vec![
			Value::Map(Mapping::new()),
			Value::Map(single(b"k", Value::Int(1))),
		]);
		assert!(encode_mapping(&single(b"k", maps)).is_ok());
	}

	#[test]
	fn unit_and_nested_arrays_have_no_array_form() {
		let err = encode_mapping(&single(b"k", Value::Array(vec![Value::Unit]))).unwrap_err();
		assert!(matches!(err, NvError::UnsupportedArrayElement { kind: "unit", .. }));

		let err = encode_mapping(&single(
			b"k",
			Value::Array(vec![Value::Array(vec![Value::Int(1)])]),
		))
		.unwrap_err();
		assert!(matches!(err, NvError::UnsupportedArrayElement { kind: "array", .. }));
	}

	#[test]
	fn partial_failure_releases_every_handle() {
		// Keys sort a..e; the failure hits key "d" after the nested maps
		// under "a", "b", and "c" have already produced native handles.
		let mut props = Mapping::new();
		props.insert(b"a".to_vec(), Value::Map(single(b"x", Value::Int(1))));
		props.insert(
			b"b".to_vec(),
			Value::Map(single(b"y", Value::Map(Mapping::new()))),
		);
		props.insert(b"c".to_vec(), Value::Map(Mapping::new()));
		props.insert(b"d".to_vec(), Value::Int(-1));
		props.insert(b"e".to_vec(), Value::Int(7));

		let before = live_list_count_for_test();
		let err = encode_mapping(&props).unwrap_err();
		assert!(matches!(err, NvError::IntOverflow { .. }));
		assert_eq!(live_list_count_for_test(), before);
	}
}
