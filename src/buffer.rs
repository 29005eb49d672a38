use crate::{ClassFileError, ClassFileResult};

/// A big-endian cursor over class file bytes.
#[derive(Debug, Copy, Clone)]
pub struct ClassBuffer<'class> {
    data: &'class [u8],
    pos: usize,
}

impl<'class> ClassBuffer<'class> {
    pub fn new(data: &'class [u8]) -> ClassBuffer<'class> {
        ClassBuffer { data, pos: 0 }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    fn read_array<const N: usize>(&mut self) -> ClassFileResult<[u8; N]> {
        let slice = self.read_bytes(N)?;
        // SAFETY: just read the correct amount of bytes so the conversion to array should succeed
        let array = unsafe { slice.try_into().unwrap_unchecked() };
        Ok(array)
    }

    pub fn read_u8(&mut self) -> ClassFileResult<u8> {
        self.read_array::<1>().map(|arr| arr[0])
    }

    pub fn read_u16(&mut self) -> ClassFileResult<u16> {
        self.read_array::<2>().map(u16::from_be_bytes)
    }

    pub fn read_u32(&mut self) -> ClassFileResult<u32> {
        self.read_array::<4>().map(u32::from_be_bytes)
    }

    pub fn read_u64(&mut self) -> ClassFileResult<u64> {
        self.read_array::<8>().map(u64::from_be_bytes)
    }

    pub fn read_i32(&mut self) -> ClassFileResult<i32> {
        self.read_u32().map(|u| u as i32)
    }

    pub fn read_i64(&mut self) -> ClassFileResult<i64> {
        self.read_u64().map(|u| u as i64)
    }

    pub fn read_f32(&mut self) -> ClassFileResult<f32> {
        self.read_u32().map(f32::from_bits)
    }

    pub fn read_f64(&mut self) -> ClassFileResult<f64> {
        self.read_u64().map(f64::from_bits)
    }

    pub fn read_bytes(&mut self, len: usize) -> ClassFileResult<&'class [u8]> {
        let bytes = self
            .data
            .get(self.pos..self.pos + len)
            .ok_or_else(|| ClassFileError::OutOfBounds {
                index: self.pos + len,
                len: self.data.len(),
            })?;
        self.pos += len;
        Ok(bytes)
    }

    /// Splits off the next `len` bytes as their own buffer and advances past them.
    pub fn split(&mut self, len: usize) -> ClassFileResult<ClassBuffer<'class>> {
        self.read_bytes(len).map(ClassBuffer::new)
    }

    /// Reads a `u16` count followed by that many items.
    pub fn read_vec<T>(
        &mut self,
        mut read: impl FnMut(&mut Self) -> ClassFileResult<T>,
    ) -> ClassFileResult<Vec<T>> {
        let count = self.read_u16()? as usize;
        let mut items = Vec::with_capacity(count.min(self.remaining()));
        for _ in 0..count {
            items.push(read(self)?);
        }
        Ok(items)
    }
}

/// The big-endian output side of [`ClassBuffer`].
#[derive(Debug, Clone, Default)]
pub struct ClassWriter {
    out: Vec<u8>,
}

impl ClassWriter {
    pub fn new() -> ClassWriter {
        ClassWriter::default()
    }

    pub fn len(&self) -> usize {
        self.out.len()
    }

    pub fn is_empty(&self) -> bool {
        self.out.is_empty()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.out
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.out
    }

    pub fn write_u8(&mut self, value: u8) {
        self.out.push(value);
    }

    pub fn write_u16(&mut self, value: u16) {
        self.out.extend_from_slice(&value.to_be_bytes());
    }

    pub fn write_u32(&mut self, value: u32) {
        self.out.extend_from_slice(&value.to_be_bytes());
    }

    pub fn write_i32(&mut self, value: i32) {
        self.out.extend_from_slice(&value.to_be_bytes());
    }

    pub fn write_i64(&mut self, value: i64) {
        self.out.extend_from_slice(&value.to_be_bytes());
    }

    pub fn write_f32(&mut self, value: f32) {
        self.write_u32(value.to_bits());
    }

    pub fn write_f64(&mut self, value: f64) {
        self.out.extend_from_slice(&value.to_bits().to_be_bytes());
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.out.extend_from_slice(bytes);
    }

    /// Writes `count` as a `u16`, failing if it does not fit.
    pub fn write_count(&mut self, what: &'static str, count: usize) -> ClassFileResult<()> {
        let count = u16::try_from(count).map_err(|_| ClassFileError::TooManyEntries {
            what,
            count,
            max: u16::MAX as usize,
        })?;
        self.write_u16(count);
        Ok(())
    }

    /// Writes `count` as a `u8`, failing if it does not fit.
    pub fn write_count_u8(&mut self, what: &'static str, count: usize) -> ClassFileResult<()> {
        let count = u8::try_from(count).map_err(|_| ClassFileError::TooManyEntries {
            what,
            count,
            max: u8::MAX as usize,
        })?;
        self.write_u8(count);
        Ok(())
    }

    /// Writes a `u16` count followed by every item.
    pub fn write_vec<T>(
        &mut self,
        what: &'static str,
        items: &[T],
        mut write: impl FnMut(&mut Self, &T) -> ClassFileResult<()>,
    ) -> ClassFileResult<()> {
        self.write_count(what, items.len())?;
        for item in items {
            write(self, item)?;
        }
        Ok(())
    }
}
