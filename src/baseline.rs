//! The "baseline" streaming decoder: assumes the caller's output buffer, taken
//! across all calls so far, is itself readable, and only reconciles its
//! internal history ring against it when it suspends.

use crate::phase::{extend_length, Phase, MINMATCH};
use crate::ring::Ring;
use crate::{DecompressError, Progress};

/// A resumable LZ4 block decoder that reads matches back from the caller's
/// own output buffer when possible, falling back to an internal 64 KiB ring
/// only for bytes the current call cannot see.
///
/// Use this variant when `output` passed to successive [`Decoder::decompress`]
/// calls are contiguous slices of one growing buffer (for instance,
/// successive calls each handed `&mut vec[vec_len..]` of the same `Vec<u8>`).
/// If the destination is write-only — a socket, an `mmap`, someone else's
/// ring buffer — use [`crate::UncachedDecoder`] instead.
pub struct Decoder {
    ring: Ring,
    phase: Phase,
    lit_len: u32,
    mat_len: u32,
    mat_dst: usize,
    error: Option<DecompressError>,
}

impl Default for Decoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder {
    /// Creates a decoder positioned at the start of a fresh block.
    pub fn new() -> Self {
        Decoder {
            ring: Ring::new(),
            phase: Phase::ReadTok,
            lit_len: 0,
            mat_len: 0,
            mat_dst: 0,
            error: None,
        }
    }

    /// Resets the decoder to the same state as a freshly constructed one.
    /// Equivalent to, but cheaper than, replacing it with `Decoder::new()`.
    pub fn reset(&mut self) {
        *self = Decoder::new();
    }

    /// True if the decoder sits exactly at a block boundary: phase
    /// `READ_TOK` with no partial literal or match in flight. Framing code
    /// layered on top of this decoder can use this to decide whether it has
    /// seen a complete block once input is exhausted.
    pub fn is_idle(&self) -> bool {
        matches!(self.phase, Phase::ReadTok) && self.lit_len == 0 && self.mat_len == 0
    }

    /// Returns the latched error, if this decoder has already failed.
    pub fn last_error(&self) -> Option<DecompressError> {
        self.error
    }

    /// Decodes as much of `input` into `output` as it can before either
    /// buffer is exhausted, suspending in between calls rather than
    /// blocking or erroring on a short buffer.
    ///
    /// `output` need not be, and usually is not, the same slice across
    /// calls — but for this variant, bytes previously written by earlier
    /// calls must remain readable at the same addresses for matches to
    /// resolve correctly (e.g. successive windows into one `Vec<u8>` that is
    /// only ever appended to). If that assumption does not hold for your
    /// output, use [`crate::UncachedDecoder`] instead.
    ///
    /// On success, returns how much of `input` was consumed and how much of
    /// `output` was written. On error, the decoder is permanently latched
    /// and nothing from this call is considered consumed or written.
    pub fn decompress(
        &mut self,
        input: &[u8],
        output: &mut [u8],
    ) -> Result<Progress, DecompressError> {
        if let Some(err) = self.error {
            return Err(err);
        }

        let mut in_pos = 0usize;
        let mut out_pos = 0usize;
        let mut phase = self.phase;
        let mut lit_len = self.lit_len;
        let mut mat_len = self.mat_len;
        let mut mat_dst = self.mat_dst;

        let result = self.run(
            input,
            output,
            &mut in_pos,
            &mut out_pos,
            &mut phase,
            &mut lit_len,
            &mut mat_len,
            &mut mat_dst,
        );

        match result {
            Ok(()) => {
                self.phase = phase;
                self.lit_len = lit_len;
                self.mat_len = mat_len;
                self.mat_dst = mat_dst;
                // Resync the ring from what this call actually wrote; the
                // ring never needs to see anything finer-grained than that.
                self.ring.advance(&output[..out_pos]);
                Ok(Progress {
                    consumed: in_pos,
                    written: out_pos,
                })
            }
            Err(err) => {
                self.phase = Phase::ReportError;
                self.error = Some(err);
                Err(err)
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn run(
        &self,
        input: &[u8],
        output: &mut [u8],
        in_pos: &mut usize,
        out_pos: &mut usize,
        phase: &mut Phase,
        lit_len: &mut u32,
        mat_len: &mut u32,
        mat_dst: &mut usize,
    ) -> Result<(), DecompressError> {
        loop {
            match *phase {
                Phase::ReadTok => {
                    if *in_pos == input.len() {
                        return Ok(());
                    }
                    let tok = input[*in_pos];
                    *in_pos += 1;

                    let lit_nibble = tok >> 4;
                    *mat_len = (tok & 0x0F) as u32 + MINMATCH as u32;

                    *phase = match lit_nibble {
                        0 => {
                            *lit_len = 0;
                            Phase::ReadOfs1
                        }
                        0x0F => {
                            *lit_len = 0x0F;
                            Phase::ReadLitLenExt
                        }
                        n => {
                            *lit_len = n as u32;
                            Phase::CopyLit
                        }
                    };
                }

                Phase::ReadLitLenExt => {
                    if *in_pos == input.len() {
                        return Ok(());
                    }
                    let b = input[*in_pos];
                    *in_pos += 1;
                    let done = extend_length(lit_len, b)?;
                    *phase = if done {
                        Phase::CopyLit
                    } else {
                        Phase::ReadLitLenExt
                    };
                }

                Phase::CopyLit => {
                    let n = (*lit_len as usize)
                        .min(input.len() - *in_pos)
                        .min(output.len() - *out_pos);
                    if n > 0 {
                        output[*out_pos..*out_pos + n]
                            .copy_from_slice(&input[*in_pos..*in_pos + n]);
                        *in_pos += n;
                        *out_pos += n;
                        *lit_len -= n as u32;
                    }
                    if *lit_len != 0 {
                        return Ok(());
                    }
                    *phase = Phase::ReadOfs1;
                }

                Phase::ReadOfs1 => {
                    if *in_pos == input.len() {
                        return Ok(());
                    }
                    *mat_dst = input[*in_pos] as usize;
                    *in_pos += 1;
                    *phase = Phase::ReadOfs2;
                }

                Phase::ReadOfs2 => {
                    if *in_pos == input.len() {
                        return Ok(());
                    }
                    *mat_dst |= (input[*in_pos] as usize) << 8;
                    *in_pos += 1;

                    if *mat_dst == 0 {
                        return Err(DecompressError::ZeroDistance);
                    }

                    *phase = if *mat_len == 15 + MINMATCH as u32 {
                        Phase::ReadMatLenExt
                    } else {
                        Phase::CopyMat
                    };
                }

                Phase::ReadMatLenExt => {
                    if *in_pos == input.len() {
                        return Ok(());
                    }
                    let b = input[*in_pos];
                    *in_pos += 1;
                    let done = extend_length(mat_len, b)?;
                    *phase = if done {
                        Phase::CopyMat
                    } else {
                        Phase::ReadMatLenExt
                    };
                }

                Phase::CopyMat => {
                    self.copy_mat(output, out_pos, mat_len, *mat_dst);
                    if *mat_len != 0 {
                        return Ok(());
                    }
                    *phase = Phase::ReadTok;
                }

                Phase::ReportError => {
                    unreachable!("decompress() returns before entering run() once latched")
                }
            }
        }
    }

    /// Copies as many of `mat_len` bytes as `output` has room left for,
    /// `mat_dst` bytes behind the write cursor. Bytes already emitted during
    /// this call live in `output[..*out_pos]`; anything further back than
    /// that lives in the ring from a previous call.
    fn copy_mat(&self, output: &mut [u8], out_pos: &mut usize, mat_len: &mut u32, mat_dst: usize) {
        let avail_out = output.len() - *out_pos;
        let len = (*mat_len as usize).min(avail_out);
        if len == 0 {
            return;
        }

        let n_emitted_this_call = *out_pos;
        let mut remaining = len;

        if mat_dst > n_emitted_this_call {
            // The match reaches behind what this call has written so far;
            // pull the part of it that falls outside `output[..out_pos]`
            // from the ring left over from a previous call.
            let buf_dst = mat_dst - n_emitted_this_call;
            let buf_cnt = buf_dst.min(remaining);

            self.ring
                .read_behind(buf_dst, &mut output[*out_pos..*out_pos + buf_cnt]);
            *out_pos += buf_cnt;
            remaining -= buf_cnt;
        }

        // The rest of the match is fully inside what this call (or an
        // earlier one, now readable through `output`) has already written.
        // This must proceed byte-by-byte: a short distance makes the source
        // and destination regions overlap, which is exactly the RLE
        // pattern-repeat semantics the format relies on.
        for _ in 0..remaining {
            output[*out_pos] = output[*out_pos - mat_dst];
            *out_pos += 1;
        }

        *mat_len -= len as u32;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests_support::compress;

    fn decode_all(decoder: &mut Decoder, input: &[u8], out: &mut [u8]) -> Progress {
        let mut total = Progress::default();
        let mut in_pos = 0;
        loop {
            let p = decoder
                .decompress(&input[in_pos..], &mut out[total.written..])
                .unwrap();
            total.consumed += p.consumed;
            total.written += p.written;
            in_pos += p.consumed;
            if p.consumed == 0 && p.written == 0 {
                break;
            }
            if in_pos == input.len() {
                break;
            }
        }
        total
    }

    #[test]
    fn s1_pure_literal_run() {
        let mut decoder = Decoder::new();
        // token(L=4, M irrelevant/absent since stream ends after literal)
        let input = [0x40, b'w', b'x', b'y', b'z'];
        let mut out = [0u8; 16];
        let p = decoder.decompress(&input, &mut out).unwrap();
        assert_eq!(p.consumed, 5);
        assert_eq!(&out[..p.written], b"wxyz");
        // the token after a literal run always expects an offset field;
        // with none left in `input` the decoder suspends waiting for one,
        // not at a clean token boundary.
        assert!(!decoder.is_idle());
    }

    #[test]
    fn s3_literal_plus_short_match() {
        let mut decoder = Decoder::new();
        let input = [0x14, 0x41, 0x01, 0x00];
        let mut out = [0u8; 16];
        let p = decoder.decompress(&input, &mut out).unwrap();
        assert_eq!(&out[..p.written], b"AAAAAAAAA");
        // input is fully consumed exactly as CopyMat finishes, landing back
        // at a clean READ_TOK boundary.
        assert!(decoder.is_idle());
    }

    #[test]
    fn s5_zero_distance_is_sticky() {
        let mut decoder = Decoder::new();
        let input = [0x14, 0x41, 0x00, 0x00];
        let mut out = [0u8; 16];
        let err = decoder.decompress(&input, &mut out).unwrap_err();
        assert_eq!(err, DecompressError::ZeroDistance);
        let err2 = decoder.decompress(&input, &mut out).unwrap_err();
        assert_eq!(err2, DecompressError::ZeroDistance);
        assert_eq!(decoder.last_error(), Some(DecompressError::ZeroDistance));
    }

    #[test]
    fn byte_at_a_time_matches_one_shot() {
        let data: Vec<u8> = (0..2000).map(|i| (i % 17) as u8).collect();
        let compressed = compress(&data);

        let mut one_shot = Decoder::new();
        let mut out_a = vec![0u8; data.len()];
        let p = decode_all(&mut one_shot, &compressed, &mut out_a);
        assert_eq!(&out_a[..p.written], &data[..]);

        let mut trickled = Decoder::new();
        let mut out_b = vec![0u8; data.len()];
        let mut written = 0;
        for byte in &compressed {
            loop {
                let p = trickled
                    .decompress(core::slice::from_ref(byte), &mut out_b[written..])
                    .unwrap();
                written += p.written;
                if p.consumed == 1 || (p.consumed == 0 && p.written == 0) {
                    break;
                }
            }
        }
        assert_eq!(&out_b[..written], &data[..]);
    }

    #[test]
    fn suspends_when_output_is_full_mid_literal() {
        let mut decoder = Decoder::new();
        let input = [0x40, b'w', b'x', b'y', b'z'];
        let mut out = [0u8; 2];
        let p1 = decoder.decompress(&input, &mut out).unwrap();
        assert_eq!(p1.written, 2);
        assert_eq!(p1.consumed, 2);
        assert!(!decoder.is_idle());

        let mut out2 = [0u8; 2];
        let p2 = decoder.decompress(&input[p1.consumed..], &mut out2).unwrap();
        assert_eq!(&out2[..p2.written], b"yz");
    }
}
