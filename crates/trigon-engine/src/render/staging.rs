/// Host-side byte staging buffer with doubling growth.
///
/// This is the CPU half of [`VertexBuffer`](super::VertexBuffer): an
/// append-only byte store whose capacity doubles whenever an append would
/// meet or exceed it. Capacity therefore stays a power-of-two multiple of
/// the initial capacity, and `len() < capacity()` holds after every append.
#[derive(Debug, Clone)]
pub struct StagingBuffer {
    data: Vec<u8>,
    capacity: usize,
}

/// Capacity change reported by an append that had to grow.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Growth {
    pub from: usize,
    pub to: usize,
}

impl StagingBuffer {
    /// Room for eight 3-float vertices.
    pub const DEFAULT_CAPACITY: usize = 96;

    pub fn new() -> Self {
        Self::with_capacity(Self::DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        debug_assert!(capacity > 0);
        Self {
            data: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Appends `bytes`, growing first if needed.
    ///
    /// Returns the capacity change when the append triggered growth.
    pub fn append(&mut self, bytes: &[u8]) -> Option<Growth> {
        let growth = self.reserve(bytes.len());
        self.data.extend_from_slice(bytes);
        growth
    }

    fn reserve(&mut self, additional: usize) -> Option<Growth> {
        if self.data.len() + additional < self.capacity {
            return None;
        }

        let from = self.capacity;
        while self.data.len() + additional >= self.capacity {
            self.capacity *= 2;
        }
        self.data.reserve(self.capacity - self.data.len());

        Some(Growth { from, to: self.capacity })
    }

    /// Total bytes appended so far.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline]
    pub fn bytes(&self) -> &[u8] {
        &self.data
    }
}

impl Default for StagingBuffer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_pow2_multiple(capacity: usize, initial: usize) -> bool {
        capacity % initial == 0 && (capacity / initial).is_power_of_two()
    }

    // ── size accounting ───────────────────────────────────────────────────

    #[test]
    fn len_is_the_sum_of_appended_lengths() {
        let mut buf = StagingBuffer::new();
        let mut expected = 0;
        for chunk in [3usize, 12, 1, 96, 7] {
            buf.append(&vec![0xAB; chunk]);
            expected += chunk;
            assert_eq!(buf.len(), expected);
        }
    }

    #[test]
    fn contents_are_preserved_across_growth() {
        let mut buf = StagingBuffer::with_capacity(8);
        buf.append(&[1, 2, 3, 4]);
        buf.append(&[5, 6, 7, 8, 9]); // forces growth
        assert_eq!(buf.bytes(), &[1, 2, 3, 4, 5, 6, 7, 8, 9]);
    }

    #[test]
    fn first_bytes_read_back_as_floats() {
        let mut buf = StagingBuffer::new();
        buf.append(bytemuck::cast_slice(&[1.0f32, 0.0, 0.0]));
        let floats: [f32; 3] = bytemuck::pod_read_unaligned(&buf.bytes()[..12]);
        assert_eq!(floats, [1.0, 0.0, 0.0]);
    }

    // ── growth policy ─────────────────────────────────────────────────────

    #[test]
    fn capacity_stays_a_power_of_two_multiple_of_the_initial() {
        let mut buf = StagingBuffer::new();
        for _ in 0..64 {
            buf.append(&[0u8; 13]);
            assert!(is_pow2_multiple(buf.capacity(), StagingBuffer::DEFAULT_CAPACITY));
            assert!(buf.capacity() > buf.len());
        }
    }

    #[test]
    fn append_that_exactly_fills_the_buffer_grows() {
        let mut buf = StagingBuffer::with_capacity(16);
        let growth = buf.append(&[0u8; 16]);
        assert_eq!(growth, Some(Growth { from: 16, to: 32 }));
    }

    #[test]
    fn append_below_capacity_does_not_grow() {
        let mut buf = StagingBuffer::with_capacity(16);
        assert_eq!(buf.append(&[0u8; 15]), None);
        assert_eq!(buf.capacity(), 16);
    }

    #[test]
    fn oversized_append_doubles_repeatedly() {
        let mut buf = StagingBuffer::with_capacity(16);
        let growth = buf.append(&[0u8; 100]).expect("must grow");
        assert_eq!(growth.from, 16);
        assert_eq!(growth.to, 128);
        assert_eq!(buf.len(), 100);
    }
}
