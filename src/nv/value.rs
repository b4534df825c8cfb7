use std::collections::BTreeMap;

/// Key/value mapping exchanged with the native library.
///
/// Keys are opaque byte sequences; insertion order is not significant.
pub type Mapping = BTreeMap<Vec<u8>, Value>;

/// One value in the model exchanged with the native library.
///
/// Integer-kind values (`Byte`, the `Int*`/`UInt*` widths, and the
/// unlabelled `Int`) compare equal by numeric value regardless of width, so
/// a mapping survives an encode/decode round trip even when the encoder
/// reinterprets a width for a reserved key.
#[derive(Debug, Clone)]
pub enum Value {
	/// Presence-only flag: the key itself is the payload.
	Unit,
	/// Explicit true/false value.
	Bool(bool),
	/// Raw byte, distinct from `UInt8` on the wire.
	Byte(u8),
	/// Signed 8-bit integer.
	Int8(i8),
	/// Signed 16-bit integer.
	Int16(i16),
	/// Signed 32-bit integer.
	Int32(i32),
	/// Signed 64-bit integer.
	Int64(i64),
	/// Unsigned 8-bit integer.
	UInt8(u8),
	/// Unsigned 16-bit integer.
	UInt16(u16),
	/// Unsigned 32-bit integer.
	UInt32(u32),
	/// Unsigned 64-bit integer.
	UInt64(u64),
	/// Unlabelled integer; the encoder selects its width per key.
	Int(i128),
	/// Opaque text carried as raw bytes.
	Str(Vec<u8>),
	/// Nested mapping.
	Map(Mapping),
	/// Homogeneous array; mixed element kinds are rejected by the encoder.
	Array(Vec<Value>),
}

impl Value {
	/// Short kind name used in error reports.
	pub fn kind(&self) -> &'static str {
		match self {
			Value::Unit => "unit",
			Value::Bool(_) => "bool",
			Value::Byte(_) => "byte",
			Value::Int8(_) => "int8",
			Value::Int16(_) => "int16",
			Value::Int32(_) => "int32",
			Value::Int64(_) => "int64",
			Value::UInt8(_) => "uint8",
			Value::UInt16(_) => "uint16",
			Value::UInt32(_) => "uint32",
			Value::UInt64(_) => "uint64",
			Value::Int(_) => "int",
			Value::Str(_) => "string",
			Value::Map(_) => "mapping",
			Value::Array(_) => "array",
		}
	}

	/// Numeric view shared by all integer-kind variants.
	pub fn as_int(&self) -> Option<i128> {
		match *self {
			Value::Byte(v) => Some(i128::from(v)),
			Value::Int8(v) => Some(i128::from(v)),
			Value::Int16(v) => Some(i128::from(v)),
			Value::Int32(v) => Some(i128::from(v)),
			Value::Int64(v) => Some(i128::from(v)),
			Value::UInt8(v) => Some(i128::from(v)),
			Value::UInt16(v) => Some(i128::from(v)),
			Value::UInt32(v) => Some(i128::from(v)),
			Value::UInt64(v) => Some(i128::from(v)),
			Value::Int(v) => Some(v),
			_ => None,
		}
	}
}

impl PartialEq for Value {
	fn eq(&self, other: &Self) -> bool {
		if let (Some(a), Some(b)) = (self.as_int(), other.as_int()) {
			return a == b;
		}
		match (self, other) {
			(Value::Unit, Value::Unit) => true,
			(Value::Bool(a), Value::Bool(b)) => a == b,
			(Value::Str(a), Value::Str(b)) => a == b,
			(Value::Map(a), Value::Map(b)) => a == b,
			(Value::Array(a), Value::Array(b)) => a == b,
			_ => false,
		}
	}
}

impl Eq for Value {}

impl From<bool> for Value {
	fn from(v: bool) -> Self {
		Value::Bool(v)
	}
}

impl From<i32> for Value {
	fn from(v: i32) -> Self {
		Value::Int(i128::from(v))
	}
}

impl From<u32> for Value {
	fn from(v: u32) -> Self {
		Value::Int(i128::from(v))
	}
}

impl From<i64> for Value {
	fn from(v: i64) -> Self {
		Value::Int(i128::from(v))
	}
}

impl From<u64> for Value {
	fn from(v: u64) -> Self {
		Value::Int(i128::from(v))
	}
}

impl From<&str> for Value {
	fn from(v: &str) -> Self {
		Value::Str(v.as_bytes().to_vec())
	}
}

impl From<&[u8]> for Value {
	fn from(v: &[u8]) -> Self {
		Value::Str(v.to_vec())
	}
}

impl From<Mapping> for Value {
	fn from(v: Mapping) -> Self {
		Value::Map(v)
	}
}

#[cfg(test)]
mod tests {
	use super::Value;

	#[test]
	fn integer_kinds_compare_by_numeric_value() {
		assert_eq!(Value::Int(5), Value::UInt64(5));
		assert_eq!(Value::UInt32(7), Value::Int64(7));
		assert_eq!(Value::Byte(255), Value::UInt16(255));
		assert_eq!(Value::Int8(-3), Value::Int32(-3));
		assert_ne!(Value::Int(-1), Value::UInt64(u64::MAX));
	}

	#[test]
	fn bool_never_equals_integer() {
		assert_ne!(Value::Bool(true), Value::Int(1));
		assert_ne!(Value::Bool(false), Value::Int(0));
	}

	#[test]
	fn unit_equals_only_unit() {
		assert_eq!(Value::Unit, Value::Unit);
		assert_ne!(Value::Unit, Value::Bool(false));
	}

	#[test]
	fn bare_integer_conversions_stay_unlabelled() {
		assert!(matches!(Value::from(1024_u64), Value::Int(_)));
		assert!(matches!(Value::from(-1_i32), Value::Int(_)));
	}
}
