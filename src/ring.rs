/// Size of the decoder's history window, fixed by the LZ4 block format's
/// 16-bit match distance: no match can ever reach further back than 64 KiB.
pub(crate) const RING_SIZE: usize = 64 * 1024;
const RING_MASK: usize = RING_SIZE - 1;

/// A 64 KiB circular buffer holding the most recently decoded bytes, used
/// to satisfy matches whose distance reaches behind what the current call
/// has written.
///
/// Rather than physically padding the buffer to allow "sloppy" word-at-a-time
/// reads and writes across the wraparound point (the approach the format's
/// reference tooling takes in an unchecked language), every method here is
/// wrap-aware and bounds-checked, splitting any access that would cross the
/// end of the backing array into two bounded copies.
pub(crate) struct Ring {
    buf: [u8; RING_SIZE],
    /// Index one past the most recently written byte, modulo `RING_SIZE`.
    pos: usize,
}

impl Ring {
    pub(crate) fn new() -> Self {
        Ring {
            buf: [0u8; RING_SIZE],
            pos: 0,
        }
    }

    /// Copies `dst` bytes that ended `distance` bytes before the current
    /// write position into `out`. `distance` must be at least `dst.len()`
    /// less than or equal to `RING_SIZE`; the caller (the match-distance
    /// check in the decode loop) is responsible for that bound.
    pub(crate) fn read_behind(&self, distance: usize, out: &mut [u8]) {
        let start = (self.pos + RING_SIZE - distance) & RING_MASK;
        let end = start + out.len();
        if end <= RING_SIZE {
            out.copy_from_slice(&self.buf[start..end]);
        } else {
            let first = RING_SIZE - start;
            out[..first].copy_from_slice(&self.buf[start..]);
            out[first..].copy_from_slice(&self.buf[..end - RING_SIZE]);
        }
    }

    /// Appends `data` to the ring, overwriting the oldest bytes once it
    /// wraps. If `data` is at least as long as the ring itself, only its
    /// final `RING_SIZE` bytes matter, since anything before that has
    /// already been fully overwritten.
    pub(crate) fn advance(&mut self, data: &[u8]) {
        let data = if data.len() >= RING_SIZE {
            &data[data.len() - RING_SIZE..]
        } else {
            data
        };
        let start = self.pos;
        let end = start + data.len();
        if end <= RING_SIZE {
            self.buf[start..end].copy_from_slice(data);
        } else {
            let first = RING_SIZE - start;
            self.buf[start..].copy_from_slice(&data[..first]);
            self.buf[..end - RING_SIZE].copy_from_slice(&data[first..]);
        }
        self.pos = end & RING_MASK;
    }
}

impl core::fmt::Debug for Ring {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        f.debug_struct("Ring").field("pos", &self.pos).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advance_then_read_behind_roundtrips() {
        let mut ring = Ring::new();
        ring.advance(b"hello world");
        let mut out = [0u8; 5];
        ring.read_behind(11, &mut out);
        assert_eq!(&out, b"hello");
        let mut out = [0u8; 5];
        ring.read_behind(5, &mut out);
        assert_eq!(&out, b"world");
    }

    #[test]
    fn advance_wraps_around_the_end() {
        let mut ring = Ring::new();
        // fill to leave the write cursor 4 bytes before the end
        ring.advance(&vec![0u8; RING_SIZE - 4]);
        ring.advance(b"abcdefgh");
        let mut out = [0u8; 8];
        ring.read_behind(8, &mut out);
        assert_eq!(&out, b"abcdefgh");
    }

    #[test]
    fn advance_longer_than_ring_keeps_only_the_tail() {
        let mut ring = Ring::new();
        let mut data = vec![0xAAu8; RING_SIZE + 10];
        data[RING_SIZE..].copy_from_slice(b"0123456789");
        ring.advance(&data);
        let mut out = [0u8; 10];
        ring.read_behind(10, &mut out);
        assert_eq!(&out, b"0123456789");
    }
}
