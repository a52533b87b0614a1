use std::io::Write;

use time::OffsetDateTime;

use crate::date::days_from_date;
use crate::reverse::reverse_to;
use crate::Result;

/// Append-only encoder for the RowBinary layout read by [`crate::RowReader`].
#[derive(Debug, Default, Clone)]
pub struct RowWriter {
    buf: Vec<u8>,
}

impl RowWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
        }
    }

    pub fn write_uvarint(&mut self, mut value: u64) {
        while value >= 0x80 {
            self.buf.push((value as u8) | 0x80);
            value >>= 7;
        }
        self.buf.push(value as u8);
    }

    pub fn write_u8(&mut self, value: u8) {
        self.buf.push(value);
    }

    pub fn write_u16(&mut self, value: u16) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    pub fn write_u32(&mut self, value: u32) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    pub fn write_u64(&mut self, value: u64) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    pub fn write_f64(&mut self, value: f64) {
        self.write_u64(value.to_bits());
    }

    pub fn write_bytes(&mut self, value: &[u8]) {
        self.write_uvarint(value.len() as u64);
        self.buf.extend_from_slice(value);
    }

    pub fn write_string(&mut self, value: &str) {
        self.write_bytes(value.as_bytes());
    }

    /// Writes `path` with its segments reversed, straight into the buffer.
    pub fn write_reversed_path(&mut self, path: &[u8]) {
        self.write_uvarint(path.len() as u64);
        let start = self.buf.len();
        self.buf.resize(start + path.len(), 0);
        reverse_to(&mut self.buf[start..], path);
    }

    pub fn write_date_days(&mut self, days: u16) {
        self.write_u16(days);
    }

    /// Writes the UTC day of `date`. Fails for dates outside the `u16` day
    /// range (1970-01-01 through 2149-06-06).
    pub fn write_date(&mut self, date: OffsetDateTime) -> Result<()> {
        self.write_date_days(days_from_date(date)?);
        Ok(())
    }

    pub fn write_string_list<S: AsRef<str>>(&mut self, values: &[S]) {
        self.write_uvarint(values.len() as u64);
        for value in values {
            self.write_string(value.as_ref());
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn clear(&mut self) {
        self.buf.clear();
    }

    /// Writes the encoded bytes to `out` and clears the buffer.
    pub fn flush_to<W: Write>(&mut self, out: &mut W) -> Result<()> {
        out.write_all(&self.buf)?;
        self.buf.clear();
        Ok(())
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.buf
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn varint_encoding_matches_known_bytes() {
        let mut writer = RowWriter::new();
        writer.write_uvarint(0);
        writer.write_uvarint(127);
        writer.write_uvarint(270);
        assert_eq!(writer.as_bytes(), &[0x00u8, 0x7F, 0x8E, 0x02]);
    }

    #[test]
    fn max_varint_uses_ten_groups() {
        let mut writer = RowWriter::new();
        writer.write_uvarint(u64::MAX);
        let bytes = writer.into_inner();
        assert_eq!(bytes.len(), 10);
        assert_eq!(bytes[9], 0x01);
    }

    #[test]
    fn string_is_length_prefixed() {
        let mut writer = RowWriter::new();
        writer.write_string("hello");
        writer.write_string("");
        assert_eq!(writer.as_bytes(), b"\x05hello\x00");
    }

    #[test]
    fn reversed_path_keeps_length() {
        let mut writer = RowWriter::new();
        writer.write_reversed_path(b"host.cpu.load");
        assert_eq!(writer.as_bytes(), b"\x0dload.cpu.host");
    }

    #[test]
    fn flush_clears_buffer() {
        let mut writer = RowWriter::new();
        writer.write_u32(7);
        let mut out = Vec::new();
        writer.flush_to(&mut out).expect("flush");
        assert_eq!(out, 7u32.to_le_bytes());
        assert!(writer.is_empty());
    }
}
