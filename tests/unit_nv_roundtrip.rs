#![allow(missing_docs)]

use nvstore::nv::{
	Mapping, NvHandle, Value, decode_list, encode_mapping, live_list_count_for_test, nv_dup,
};

fn roundtrip(props: &Mapping) -> Mapping {
	// Route through a native-side deep copy, as a call boundary would.
	let encoded = encode_mapping(props).unwrap();
	let copied = unsafe { NvHandle::adopt(nv_dup(encoded.as_ptr())) }.unwrap();
	decode_list(&copied).unwrap()
}

fn single(key: &[u8], value: Value) -> Mapping {
	let mut props = Mapping::new();
	props.insert(key.to_vec(), value);
	props
}

#[test]
fn empty_mapping_roundtrips() {
	let props = Mapping::new();
	assert_eq!(roundtrip(&props), props);
}

#[test]
fn scalar_kinds_roundtrip_exactly() {
	let mut props = Mapping::new();
	props.insert(b"unit".to_vec(), Value::Unit);
	props.insert(b"yes".to_vec(), Value::Bool(true));
	props.insert(b"no".to_vec(), Value::Bool(false));
	props.insert(b"byte".to_vec(), Value::Byte(0xA5));
	props.insert(b"i8".to_vec(), Value::Int8(i8::MIN));
	props.insert(b"i16".to_vec(), Value::Int16(i16::MIN));
	props.insert(b"i32".to_vec(), Value::Int32(i32::MIN));
	props.insert(b"i64".to_vec(), Value::Int64(i64::MIN));
	props.insert(b"u8".to_vec(), Value::UInt8(u8::MAX));
	props.insert(b"u16".to_vec(), Value::UInt16(u16::MAX));
	props.insert(b"u32".to_vec(), Value::UInt32(u32::MAX));
	props.insert(b"u64".to_vec(), Value::UInt64(u64::MAX));
	props.insert(b"text".to_vec(), Value::from("value"));
	assert_eq!(roundtrip(&props), props);
}

#[test]
fn bare_integer_roundtrips_by_value() {
	// Decoding reports the wire width, which still compares equal.
	let props = single(b"key", Value::Int(1));
	let decoded = roundtrip(&props);
	assert_eq!(decoded, props);
	assert!(matches!(
		decoded.get(b"key".as_slice()),
		Some(Value::UInt64(1))
	));
}

#[test]
fn reserved_key_width_reinterpretation_compares_equal() {
	let mut props = Mapping::new();
	props.insert(b"rewind-request".to_vec(), Value::Int(i128::from(u32::MAX)));
	props.insert(b"pool_context".to_vec(), Value::Int(i128::from(i32::MIN)));
	let decoded = roundtrip(&props);
	assert_eq!(decoded, props);
	assert!(matches!(
		decoded.get(b"rewind-request".as_slice()),
		Some(Value::UInt32(_))
	));
	assert!(matches!(
		decoded.get(b"pool_context".as_slice()),
		Some(Value::Int32(_))
	));
}

#[test]
fn arrays_roundtrip() {
	let mut props = Mapping::new();
	props.insert(
		b"bools".to_vec(),
		Value::Array(vec![Value::Bool(true), Value::Bool(false)]),
	);
	props.insert(
		b"bytes".to_vec(),
		Value::Array(vec![Value::Byte(0), Value::Byte(255)]),
	);
	props.insert(
		b"words".to_vec(),
		Value::Array(vec![
			Value::Int(0),
			Value::Int(1),
			Value::Int(i128::from(u64::MAX)),
		]),
	);
	props.insert(
		b"narrow".to_vec(),
		Value::Array(vec![Value::Int16(-5), Value::Int16(5)]),
	);
	props.insert(
		b"texts".to_vec(),
		Value::Array(vec![Value::from("value"), Value::from("value2")]),
	);
	props.insert(b"none".to_vec(), Value::Array(Vec::new()));
	assert_eq!(roundtrip(&props), props);
}

#[test]
fn nested_mappings_roundtrip() {
	let props = single(b"key", Value::Map(single(b"key", Value::Map(Mapping::new()))));
	assert_eq!(roundtrip(&props), props);
}

#[test]
fn mapping_arrays_roundtrip() {
	let props = single(
		b"key",
		Value::Array(vec![
			Value::Map(single(b"key", Value::Int(1))),
			Value::Map(single(b"key", Value::Unit)),
			Value::Map(single(b"key", Value::Map(Mapping::new()))),
		]),
	);
	assert_eq!(roundtrip(&props), props);
}

#[test]
fn complex_mapping_roundtrips() {
	let mut inner = Mapping::new();
	inner.insert(b"skey1".to_vec(), Value::Bool(true));
	inner.insert(b"skey2".to_vec(), Value::Unit);
	inner.insert(
		b"skey3".to_vec(),
		Value::Array(vec![
			Value::Bool(true),
			Value::Bool(false),
			Value::Bool(true),
		]),
	);

	let mut pair_a = Mapping::new();
	pair_a.insert(b"skey71".to_vec(), Value::from("a"));
	pair_a.insert(b"skey72".to_vec(), Value::from("b"));
	let mut pair_b = Mapping::new();
	pair_b.insert(b"skey71".to_vec(), Value::from("c"));
	pair_b.insert(b"skey72".to_vec(), Value::from("d"));

	let mut props = Mapping::new();
	props.insert(b"key1".to_vec(), Value::from("str"));
	props.insert(b"key2".to_vec(), Value::Int(10));
	props.insert(b"key3".to_vec(), Value::Map(inner));
	props.insert(
		b"key4".to_vec(),
		Value::Array(vec![Value::from("ab"), Value::from("bc")]),
	);
	props.insert(
		b"key5".to_vec(),
		Value::Array(vec![
			Value::Int(i128::from(u64::MAX)),
			Value::Int(1),
			Value::Int(2),
			Value::Int(3),
		]),
	);
	props.insert(
		b"key6".to_vec(),
		Value::Array(vec![Value::Map(pair_a), Value::Map(pair_b)]),
	);
	props.insert(b"type".to_vec(), Value::Int(i128::from(u32::MAX)));
	props.insert(b"pool_context".to_vec(), Value::Int(i128::from(i32::MIN)));

	assert_eq!(roundtrip(&props), props);
}

#[test]
fn end_to_end_example_mapping() {
	let mut props = Mapping::new();
	props.insert(b"size".to_vec(), Value::Int(1024));
	props.insert(b"name".to_vec(), Value::from("pool1"));
	props.insert(
		b"opts".to_vec(),
		Value::Array(vec![Value::Int(1), Value::Int(2), Value::Int(3)]),
	);

	let before = live_list_count_for_test();
	let decoded = roundtrip(&props);
	assert_eq!(decoded, props);
	// Every native list from the round trip has been released.
	assert_eq!(live_list_count_for_test(), before);
}
