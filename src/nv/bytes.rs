use crate::nv::{NvError, Result};

/// Bounded cursor over a packed cell payload.
///
/// Payloads use the native library's in-memory layout: little-endian,
/// no padding between elements.
pub struct Cursor<'a> {
	bytes: &'a [u8],
	pos: usize,
}

impl<'a> Cursor<'a> {
	/// Create a cursor at position 0.
	pub fn new(bytes: &'a [u8]) -> Self {
		Self { bytes, pos: 0 }
	}

	/// Return remaining unread bytes.
	pub fn remaining(&self) -> usize {
		self.bytes.len().saturating_sub(self.pos)
	}

	/// Read exactly `n` bytes and advance the cursor.
	pub fn read_exact(&mut self, n: usize) -> Result<&'a [u8]> {
		if n > self.remaining() {
			return Err(NvError::TruncatedPayload {
				at: self.pos,
				need: n,
				rem: self.remaining(),
			});
		}

		let start = self.pos;
		self.pos += n;
		Ok(&self.bytes[start..self.pos])
	}

	/// Read a single byte.
	pub fn read_u8(&mut self) -> Result<u8> {
		Ok(self.read_exact(1)?[0])
	}

	/// Read a little-endian `u16`.
	pub fn read_u16_le(&mut self) -> Result<u16> {
		let raw = self.read_exact(2)?;
		let mut buf = [0_u8; 2];
		buf.copy_from_slice(raw);
		Ok(u16::from_le_bytes(buf))
	}

	/// Read a little-endian `u32`.
	pub fn read_u32_le(&mut self) -> Result<u32> {
		let raw = self.read_exact(4)?;
		let mut buf = [0_u8; 4];
		buf.copy_from_slice(raw);
		Ok(u32::from_le_bytes(buf))
	}

	/// Read a little-endian `u64`.
	pub fn read_u64_le(&mut self) -> Result<u64> {
		let raw = self.read_exact(8)?;
		let mut buf = [0_u8; 8];
		buf.copy_from_slice(raw);
		Ok(u64::from_le_bytes(buf))
	}
}

#[cfg(test)]
mod tests {
	use super::Cursor;
	use crate::nv::NvError;

	#[test]
	fn reads_advance_in_order() {
		let bytes = [1_u8, 0, 2, 0, 0, 0];
		let mut cursor = Cursor::new(&bytes);
		assert_eq!(cursor.read_u16_le().unwrap(), 1);
		assert_eq!(cursor.read_u32_le().unwrap(), 2);
		assert_eq!(cursor.remaining(), 0);
	}

	#[test]
	fn short_read_reports_offset_and_need() {
		let bytes = [0_u8; 3];
		let mut cursor = Cursor::new(&bytes);
		cursor.read_u8().unwrap();
		let err = cursor.read_u32_le().unwrap_err();
		assert_eq!(err, NvError::TruncatedPayload { at: 1, need: 4, rem: 2 });
	}
}
