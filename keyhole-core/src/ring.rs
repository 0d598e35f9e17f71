//! Circular message buffers.
//!
//! The kernel accumulates console output in a fixed ring described by a
//! write cursor and a fill count. [`extract`] linearizes such a ring into
//! chronological order, [`MessageRing`] owns one and also accepts new
//! bytes, which is how locally collected diagnostics are kept.

use crate::error::GenericError;

/// Linearize a circular buffer into chronological order.
///
/// `next` is the index the next byte would be written at, `size` how many
/// bytes are live. The oldest byte sits `size` positions behind `next`,
/// wrapping around the start. A `size` beyond the capacity is clamped, a
/// snapshot that lies about its fill count still yields every byte once.
pub fn extract(buf: &[u8], next: usize, size: usize) -> Vec<u8> {
    let cap = buf.len();
    if cap == 0 {
        return Vec::new();
    }
    let size = size.min(cap);
    let start = (next % cap + cap - size) % cap;
    (0..size).map(|i| buf[(start + i) % cap]).collect()
}

/// Linearize a circular buffer and decode it as text, lossily.
pub fn extract_text(buf: &[u8], next: usize, size: usize) -> String {
    String::from_utf8_lossy(&extract(buf, next, size)).into_owned()
}

/// An owned circular byte buffer.
#[derive(Debug, Clone)]
pub struct MessageRing {
    buf: Box<[u8]>,
    next: usize,
    size: usize,
}

impl MessageRing {

    /// An empty ring with the given capacity.
    pub fn new(capacity: usize) -> Self {
        MessageRing {
            buf: vec![0; capacity].into_boxed_slice(),
            next: 0,
            size: 0,
        }
    }

    /// Rebuild a ring from snapshot parts, validating the cursor.
    pub fn from_parts(buf: Vec<u8>, next: usize, size: usize) -> Result<Self, GenericError> {
        let cap = buf.len();
        if next >= cap && !(cap == 0 && next == 0) {
            return Err(GenericError::Generic(format!(
                "ring cursor {} outside capacity {}", next, cap
            )));
        }
        if size > cap {
            return Err(GenericError::Generic(format!(
                "ring holds {} bytes but capacity is {}", size, cap
            )));
        }
        Ok(MessageRing {
            buf: buf.into_boxed_slice(),
            next,
            size,
        })
    }

    /// Ring capacity in bytes.
    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    /// Live bytes in the ring.
    pub fn len(&self) -> usize {
        self.size
    }

    /// Whether the ring holds no bytes.
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Append bytes, overwriting the oldest once the ring is full.
    pub fn append(&mut self, bytes: &[u8]) {
        let cap = self.buf.len();
        if cap == 0 {
            return;
        }
        for &byte in bytes {
            self.buf[self.next] = byte;
            self.next = (self.next + 1) % cap;
        }
        self.size = (self.size + bytes.len()).min(cap);
    }

    /// The backing buffer, write cursor and fill count, unlinearized.
    pub fn raw_parts(&self) -> (&[u8], usize, usize) {
        (&self.buf, self.next, self.size)
    }

    /// The ring contents in chronological order.
    pub fn extract(&self) -> Vec<u8> {
        extract(&self.buf, self.next, self.size)
    }

    /// The ring contents as text, decoded lossily.
    pub fn extract_text(&self) -> String {
        extract_text(&self.buf, self.next, self.size)
    }

}

#[cfg(test)]
mod tests {

    use super::*;

    #[test]
    fn wrapped_ring_is_linearized() {
        // capacity 16, cursor at 5, 10 live bytes: tail 11..16 then head 0..5
        let buf: Vec<u8> = (0..16).collect();
        let out = extract(&buf, 5, 10);
        let expected: Vec<u8> = (11..16).chain(0..5).collect();
        assert_eq!(out, expected);
    }

    #[test]
    fn unwrapped_ring_is_a_plain_slice() {
        let buf: Vec<u8> = (0..16).collect();
        assert_eq!(extract(&buf, 12, 5), (7..12).collect::<Vec<u8>>());
    }

    #[test]
    fn full_ring_starts_at_cursor() {
        let buf: Vec<u8> = (0..8).collect();
        let out = extract(&buf, 3, 8);
        let expected: Vec<u8> = (3..8).chain(0..3).collect();
        assert_eq!(out, expected);
    }

    #[test]
    fn empty_and_degenerate_rings() {
        let buf: Vec<u8> = (0..8).collect();
        assert!(extract(&buf, 3, 0).is_empty());
        assert!(extract(&[], 0, 0).is_empty());
    }

    #[test]
    fn oversized_fill_count_is_clamped() {
        let buf: Vec<u8> = (0..8).collect();
        let out = extract(&buf, 3, 99);
        assert_eq!(out.len(), 8);
        let expected: Vec<u8> = (3..8).chain(0..3).collect();
        assert_eq!(out, expected);
    }

    #[test]
    fn extraction_visits_each_live_byte_once() {
        for &(cap, next, size) in &[(16usize, 5usize, 10usize), (16, 0, 16), (7, 6, 3), (4, 1, 4)] {
            let buf: Vec<u8> = (0..cap as u8).collect();
            let out = extract(&buf, next, size);
            assert_eq!(out.len(), size);
            let mut sorted = out.clone();
            sorted.sort_unstable();
            sorted.dedup();
            assert_eq!(sorted.len(), size, "cap {} next {} size {}", cap, next, size);
        }
    }

    #[test]
    fn complementary_extractions_rebuild_the_buffer() {
        // the size bytes ending at the cursor, preceded by the other
        // cap - size bytes, are the whole ring read from the cursor
        let cap = 16;
        let buf: Vec<u8> = (0..cap as u8).collect();
        for next in 0..cap {
            for size in 0..=cap {
                let recent = extract(&buf, next, size);
                let start = (next + cap - size) % cap;
                let older = extract(&buf, start, cap - size);
                let mut rebuilt = older;
                rebuilt.extend_from_slice(&recent);
                assert_eq!(rebuilt, extract(&buf, next, cap), "next {} size {}", next, size);
            }
        }
    }

    #[test]
    fn appended_text_comes_back_in_order() {
        let mut ring = MessageRing::new(8);
        ring.append(b"abc");
        ring.append(b"de");
        assert_eq!(ring.extract_text(), "abcde");
        assert_eq!(ring.len(), 5);
    }

    #[test]
    fn append_overwrites_oldest_when_full() {
        let mut ring = MessageRing::new(4);
        ring.append(b"abcdef");
        assert_eq!(ring.extract_text(), "cdef");
        assert_eq!(ring.len(), 4);
        ring.append(b"g");
        assert_eq!(ring.extract_text(), "defg");
    }

    #[test]
    fn zero_capacity_ring_swallows_everything() {
        let mut ring = MessageRing::new(0);
        ring.append(b"abc");
        assert!(ring.is_empty());
        assert!(ring.extract().is_empty());
    }

    #[test]
    fn snapshot_parts_are_validated() {
        assert!(MessageRing::from_parts(vec![0; 8], 8, 0).is_err());
        assert!(MessageRing::from_parts(vec![0; 8], 0, 9).is_err());
        let ring = MessageRing::from_parts(b"ldxhello wor".to_vec(), 2, 11).unwrap();
        assert_eq!(ring.extract_text(), "hello world");
    }

}
