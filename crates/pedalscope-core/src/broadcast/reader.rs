use super::layout;

/// Cursor-relative view over an advertisement payload.
///
/// The optional BLE flags prefix is consumed at construction; all offsets
/// passed to the read methods are relative to the byte after the prefix.
/// Reads return `None` past the end; the parser's payload gate decides how
/// a short payload is reported.
pub struct BroadcastReader<'a> {
    payload: &'a [u8],
    base: usize,
}

impl<'a> BroadcastReader<'a> {
    pub fn new(payload: &'a [u8]) -> Self {
        let base = if payload.len() >= layout::FLAGS_PREFIX.len()
            && payload[..layout::FLAGS_PREFIX.len()] == layout::FLAGS_PREFIX
        {
            layout::FLAGS_PREFIX.len()
        } else {
            0
        };
        Self { payload, base }
    }

    /// Bytes available from the current cursor position.
    pub fn remaining(&self) -> usize {
        self.payload.len().saturating_sub(self.base)
    }

    /// Advance the cursor past bytes already consumed (the version header).
    pub fn advance(&mut self, count: usize) {
        self.base += count;
    }

    pub fn read_u8(&self, offset: usize) -> Option<u8> {
        self.payload.get(self.base + offset).copied()
    }

    pub fn read_u16_le(&self, range: std::ops::Range<usize>) -> Option<u16> {
        let lo = self.read_u8(range.start)?;
        let hi = self.read_u8(range.end - 1)?;
        Some(u16::from_le_bytes([lo, hi]))
    }
}

#[cfg(test)]
mod tests {
    use super::BroadcastReader;

    #[test]
    fn flags_prefix_is_skipped() {
        let reader = BroadcastReader::new(&[0x02, 0x01, 0x06, 0x21]);
        assert_eq!(reader.remaining(), 2);
        assert_eq!(reader.read_u8(0), Some(0x06));
    }

    #[test]
    fn no_prefix_reads_from_start() {
        let reader = BroadcastReader::new(&[0x06, 0x21, 0x00, 0x00]);
        assert_eq!(reader.remaining(), 4);
        assert_eq!(reader.read_u8(0), Some(0x06));
    }

    #[test]
    fn partial_prefix_is_not_skipped() {
        let reader = BroadcastReader::new(&[0x02, 0x02, 0x06, 0x21]);
        assert_eq!(reader.remaining(), 4);
        assert_eq!(reader.read_u8(0), Some(0x02));
    }

    #[test]
    fn u16_reads_are_little_endian() {
        let mut reader = BroadcastReader::new(&[0x06, 0x21, 0xE8, 0x03]);
        reader.advance(2);
        assert_eq!(reader.read_u16_le(0..2), Some(1000));
    }

    #[test]
    fn read_past_end_is_none() {
        let reader = BroadcastReader::new(&[0x06, 0x21]);
        assert_eq!(reader.read_u8(1), Some(0x21));
        assert_eq!(reader.read_u8(2), None);
        assert_eq!(reader.read_u16_le(1..3), None);
    }
}
