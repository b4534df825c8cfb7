use std::cell::Cell;

use crate::nv::Tag;

thread_local! {
	// Allocation bookkeeping is per thread: codec work is synchronous and
	// thread-confined, which keeps the counter exact under parallel tests.
	static LIVE_LISTS: Cell<usize> = const { Cell::new(0) };
}

/// Native tagged-value list: the self-describing name/tag/payload container
/// exchanged with the native library.
///
/// Lists live on the heap and are addressed by raw pointers at the call
/// boundary. Allocation goes through [`nv_alloc`], release through
/// [`nv_free`]; nested lists are owned by their parent cell and released
/// with it.
#[derive(Debug)]
pub struct NvList {
	pairs: Vec<NvPair>,
}

/// One cell of a native list: name, raw tag, and storage.
#[derive(Debug)]
pub struct NvPair {
	name: Vec<u8>,
	raw_tag: i32,
	payload: Payload,
}

/// Cell storage. Fixed-width kinds pack their elements contiguously in the
/// native in-memory layout; strings and nested lists are stored out of line.
#[derive(Debug)]
pub(crate) enum Payload {
	/// `nelem` fixed-width elements packed little-endian.
	Packed {
		/// Declared element count.
		nelem: u32,
		/// Packed element bytes.
		bytes: Vec<u8>,
	},
	/// String elements, one byte vector per element.
	Strs(Vec<Vec<u8>>),
	/// Nested lists, owned by this cell.
	Lists(Vec<*mut NvList>),
}

impl Drop for Payload {
	fn drop(&mut self) {
		if let Payload::Lists(children) = self {
			for child in children.drain(..) {
				if !child.is_null() {
					// Children are uniquely owned by this cell.
					unsafe { nv_free(child) };
				}
			}
		}
	}
}

impl NvPair {
	/// Cell name bytes.
	pub fn name(&self) -> &[u8] {
		&self.name
	}

	/// Raw tag number as stored.
	pub fn raw_tag(&self) -> i32 {
		self.raw_tag
	}

	pub(crate) fn payload(&self) -> &Payload {
		&self.payload
	}

	fn deep_clone(&self) -> NvPair {
		let payload = match &self.payload {
			Payload::Packed { nelem, bytes } => Payload::Packed {
				nelem: *nelem,
				bytes: bytes.clone(),
			},
			Payload::Strs(items) => Payload::Strs(items.clone()),
			Payload::Lists(children) => Payload::Lists(
				children
					.iter()
					.map(|child| {
						// Children are never null while owned by a cell.
						clone_list(unsafe { &**child })
					})
					.collect(),
			),
		};
		NvPair {
			name: self.name.clone(),
			raw_tag: self.raw_tag,
			payload,
		}
	}
}

impl NvList {
	fn new() -> Self {
		Self { pairs: Vec::new() }
	}

	/// Cells in storage order.
	pub fn pairs(&self) -> &[NvPair] {
		&self.pairs
	}

	/// Number of cells.
	pub fn len(&self) -> usize {
		self.pairs.len()
	}

	/// Whether the list has no cells.
	pub fn is_empty(&self) -> bool {
		self.pairs.is_empty()
	}

	fn set(&mut self, name: &[u8], tag: Tag, payload: Payload) {
		// Names are unique; a re-add replaces the existing cell.
		self.pairs.retain(|pair| pair.name != name);
		self.pairs.push(NvPair {
			name: name.to_vec(),
			raw_tag: tag.raw(),
			payload,
		});
	}

	fn set_packed(&mut self, name: &[u8], tag: Tag, nelem: u32, bytes: Vec<u8>) {
		self.set(name, tag, Payload::Packed { nelem, bytes });
	}

	/// Attach a presence-only flag.
	pub fn add_boolean(&mut self, name: &[u8]) {
		self.set_packed(name, Tag::Boolean, 0, Vec::new());
	}

	/// Attach an explicit boolean value.
	pub fn add_boolean_value(&mut self, name: &[u8], value: bool) {
		self.set_packed(name, Tag::BooleanValue, 1, u32::from(value).to_le_bytes().to_vec());
	}

	/// Attach a raw byte.
	pub fn add_byte(&mut self, name: &[u8], value: u8) {
		self.set_packed(name, Tag::Byte, 1, vec![value]);
	}

	/// Attach a signed 8-bit integer.
	pub fn add_int8(&mut self, name: &[u8], value: i8) {
		self.set_packed(name, Tag::Int8, 1, value.to_le_bytes().to_vec());
	}

	/// Attach an unsigned 8-bit integer.
	pub fn add_uint8(&mut self, name: &[u8], value: u8) {
		self.set_packed(name, Tag::Uint8, 1, value.to_le_bytes().to_vec());
	}

	/// Attach a signed 16-bit integer.
	pub fn add_int16(&mut self, name: &[u8], value: i16) {
		self.set_packed(name, Tag::Int16, 1, value.to_le_bytes().to_vec());
	}

	/// Attach an unsigned 16-bit integer.
	pub fn add_uint16(&mut self, name: &[u8], value: u16) {
		self.set_packed(name, Tag::Uint16, 1, value.to_le_bytes().to_vec());
	}

	/// Attach a signed 32-bit integer.
	pub fn add_int32(&mut self, name: &[u8], value: i32) {
		self.set_packed(name, Tag::Int32, 1, value.to_le_bytes().to_vec());
	}

	/// Attach an unsigned 32-bit integer.
	pub fn add_uint32(&mut self, name: &[u8], value: u32) {
		self.set_packed(name, Tag::Uint32, 1, value.to_le_bytes().to_vec());
	}

	/// Attach a signed 64-bit integer.
	pub fn add_int64(&mut self, name: &[u8], value: i64) {
		self.set_packed(name, Tag::Int64, 1, value.to_le_bytes().to_vec());
	}

	/// Attach an unsigned 64-bit integer.
	pub fn add_uint64(&mut self, name: &[u8], value: u64) {
		self.set_packed(name, Tag::Uint64, 1, value.to_le_bytes().to_vec());
	}

	/// Attach a string.
	pub fn add_string(&mut self, name: &[u8], value: &[u8]) {
		self.set(name, Tag::Str, Payload::Strs(vec![value.to_vec()]));
	}

	/// Attach a nested list. The source is copied; the caller keeps
	/// ownership of `value`.
	pub fn add_list(&mut self, name: &[u8], value: &NvList) {
		self.set(name, Tag::List, Payload::Lists(vec![clone_list(value)]));
	}

	/// Attach an array of explicit boolean values.
	pub fn add_boolean_array(&mut self, name: &[u8], values: &[bool]) {
		let mut bytes = Vec::with_capacity(values.len() * 4);
		for value in values {
			bytes.extend_from_slice(&u32::from(*value).to_le_bytes());
		}
		self.set_packed(name, Tag::BooleanArray, values.len() as u32, bytes);
	}

	/// Attach an array of raw bytes.
	pub fn add_byte_array(&mut self, name: &[u8], values: &[u8]) {
		self.set_packed(name, Tag::ByteArray, values.len() as u32, values.to_vec());
	}

	/// Attach an array of signed 8-bit integers.
	pub fn add_int8_array(&mut self, name: &[u8], values: &[i8]) {
		let bytes = values.iter().map(|value| *value as u8).collect();
		self.set_packed(name, Tag::Int8Array, values.len() as u32, bytes);
	}

	/// Attach an array of unsigned 8-bit integers.
	pub fn add_uint8_array(&mut self, name: &[u8], values: &[u8]) {
		self.set_packed(name, Tag::Uint8Array, values.len() as u32, values.to_vec());
	}

	/// Attach an array of signed 16-bit integers.
	pub fn add_int16_array(&mut self, name: &[u8], values: &[i16]) {
		let mut bytes = Vec::with_capacity(values.len() * 2);
		for value in values {
			bytes.extend_from_slice(&value.to_le_bytes());
		}
		self.set_packed(name, Tag::Int16Array, values.len() as u32, bytes);
	}

	/// Attach an array of unsigned 16-bit integers.
	pub fn add_uint16_array(&mut self, name: &[u8], values: &[u16]) {
		let mut bytes = Vec::with_capacity(values.len() * 2);
		for value in values {
			bytes.extend_from_slice(&value.to_le_bytes());
		}
		self.set_packed(name, Tag::Uint16Array, values.len() as u32, bytes);
	}

	/// Attach an array of signed 32-bit integers.
	pub fn add_int32_array(&mut self, name: &[u8], values: &[i32]) {
		let mut bytes = Vec::with_capacity(values.len() * 4);
		for value in values {
			bytes.extend_from_slice(&value.to_le_bytes());
		}
		self.set_packed(name, Tag::Int32Array, values.len() as u32, bytes);
	}

	/// Attach an array of unsigned 32-bit integers.
	pub fn add_uint32_array(&mut self, name: &[u8], values: &[u32]) {
		let mut bytes = Vec::with_capacity(values.len() * 4);
		for value in values {
			bytes.extend_from_slice(&value.to_le_bytes());
		}
		self.set_packed(name, Tag::Uint32Array, values.len() as u32, bytes);
	}

	/// Attach an array of signed 64-bit integers.
	pub fn add_int64_array(&mut self, name: &[u8], values: &[i64]) {
		let mut bytes = Vec::with_capacity(values.len() * 8);
		for value in values {
			bytes.extend_from_slice(&value.to_le_bytes());
		}
		self.set_packed(name, Tag::Int64Array, values.len() as u32, bytes);
	}

	/// Attach an array of unsigned 64-bit integers.
	pub fn add_uint64_array(&mut self, name: &[u8], values: &[u64]) {
		let mut bytes = Vec::with_capacity(values.len() * 8);
		for value in values {
			bytes.extend_from_slice(&value.to_le_bytes());
		}
		self.set_packed(name, Tag::Uint64Array, values.len() as u32, bytes);
	}

	/// Attach an array of strings.
	pub fn add_string_array(&mut self, name: &[u8], values: &[Vec<u8>]) {
		self.set(name, Tag::StrArray, Payload::Strs(values.to_vec()));
	}

	/// Attach an array of nested lists. The sources are copied.
	pub fn add_list_array(&mut self, name: &[u8], values: &[&NvList]) {
		let children = values.iter().map(|value| clone_list(value)).collect();
		self.set(name, Tag::ListArray, Payload::Lists(children));
	}
}

fn clone_list(src: &NvList) -> *mut NvList {
	let out = nv_alloc();
	// Freshly allocated, not shared yet.
	let out_ref = unsafe { &mut *out };
	out_ref.pairs = src.pairs.iter().map(NvPair::deep_clone).collect();
	out
}

/// Allocate an empty native list and return its raw handle.
pub fn nv_alloc() -> *mut NvList {
	LIVE_LISTS.with(|count| count.set(count.get() + 1));
	Box::into_raw(Box::new(NvList::new()))
}

/// Release a native list and everything it owns.
///
/// # Safety
///
/// `list` must have come from [`nv_alloc`] (directly or via [`nv_dup`]) and
/// must not be used, or freed again, afterwards.
pub unsafe fn nv_free(list: *mut NvList) {
	LIVE_LISTS.with(|count| count.set(count.get().saturating_sub(1)));
	drop(unsafe { Box::from_raw(list) });
}

/// Deep-copy a native list into a new allocation.
///
/// # Safety
///
/// `src` must point to a live list allocated by [`nv_alloc`].
pub unsafe fn nv_dup(src: *const NvList) -> *mut NvList {
	clone_list(unsafe { &*src })
}

/// Number of native lists currently allocated on this thread. Test
/// instrumentation for leak and double-release checks.
pub fn live_list_count_for_test() -> usize {
	LIVE_LISTS.with(Cell::get)
}

#[cfg(test)]
impl NvList {
	/// Overwrite a cell's tag with an arbitrary raw value, simulating a
	/// list produced by a newer or corrupted native library.
	pub(crate) fn corrupt_tag_for_test(&mut self, name: &[u8], raw: i32) {
		for pair in &mut self.pairs {
			if pair.name == name {
				pair.raw_tag = raw;
			}
		}
	}

	/// Drop trailing payload bytes from a cell, simulating truncation.
	pub(crate) fn truncate_payload_for_test(&mut self, name: &[u8], keep: usize) {
		for pair in &mut self.pairs {
			if pair.name == name {
				if let Payload::Packed { bytes, .. } = &mut pair.payload {
					bytes.truncate(keep);
				}
			}
		}
	}
}
