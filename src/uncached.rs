//! The "uncached" streaming decoder: treats the caller's output as write-only
//! and always sources match data from its own history ring, which is kept in
//! lock-step with every byte emitted.

use crate::phase::{extend_length, Phase, MINMATCH};
use crate::ring::Ring;
use crate::{DecompressError, Progress};

/// Number of bytes a single ring access kernel moves at a time. Matches
/// are only ever guaranteed safe to read and write a full word at once when
/// the match distance is at least this wide; see [`Decoder::copy_mat`] for
/// why.
const WORD: usize = core::mem::size_of::<u64>();

/// A resumable LZ4 block decoder that never reads back from its own output
/// buffer, sourcing every match instead from an internal 64 KiB ring that is
/// updated as each byte is produced.
///
/// Use this variant when successive `output` slices handed to
/// [`Decoder::decompress`] are not guaranteed to stay valid or visible to the
/// decoder afterwards — a socket, a `Write` adapter, someone else's ring
/// buffer. If your output is one contiguous, readable buffer across calls,
/// [`crate::baseline::Decoder`] avoids this variant's extra copy into the
/// ring on every literal byte.
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
    pub fn reset(&mut self) {
        *self = Decoder::new();
    }

    /// True if the decoder sits exactly at a block boundary: phase
    /// `READ_TOK` with no partial literal or match in flight.
    pub fn is_idle(&self) -> bool {
        matches!(self.phase, Phase::ReadTok) && self.lit_len == 0 && self.mat_len == 0
    }

    /// Returns the latched error, if this decoder has already failed.
    pub fn last_error(&self) -> Option<DecompressError> {
        self.error
    }

    /// Decodes as much of `input` into `output` as it can before either
    /// buffer is exhausted. Unlike [`crate::baseline::Decoder`], `output`
    /// is never read by this decoder, only written — successive calls may
    /// pass entirely unrelated buffers, or even the same buffer overwritten
    /// in place, without affecting correctness.
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
        &mut self,
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
                        self.ring.advance(&output[*out_pos..*out_pos + n]);
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
    /// `mat_dst` bytes behind the ring's write cursor, dispatching into
    /// whichever of the two kernels `mat_dst` admits.
    ///
    /// A match distance of at least [`WORD`] lets every word-sized read
    /// trail the write cursor that produced its source bytes by at least a
    /// full word: the source region of iteration *i* was finished by
    /// iteration *i - 1* before iteration *i* ever reads it, so bulk
    /// word-at-a-time transfer is safe whether or not the match
    /// conceptually "overlaps" its own source (the non-overlapping and
    /// long-distance-RLE kernels alike). Below that threshold, a word-wide
    /// read's tail would land inside bytes this same iteration is still
    /// computing, so distances `1..WORD` instead replicate a short seed
    /// pattern read once up front.
    fn copy_mat(&mut self, output: &mut [u8], out_pos: &mut usize, mat_len: &mut u32, mat_dst: usize) {
        let avail_out = output.len() - *out_pos;
        let len = (*mat_len as usize).min(avail_out);
        if len == 0 {
            return;
        }

        if mat_dst >= WORD {
            let mut remaining = len;
            while remaining >= WORD {
                let mut word = [0u8; WORD];
                self.ring.read_behind(mat_dst, &mut word);
                output[*out_pos..*out_pos + WORD].copy_from_slice(&word);
                self.ring.advance(&word);
                *out_pos += WORD;
                remaining -= WORD;
            }
            if remaining > 0 {
                let mut tail = [0u8; WORD];
                self.ring.read_behind(mat_dst, &mut tail[..remaining]);
                output[*out_pos..*out_pos + remaining].copy_from_slice(&tail[..remaining]);
                self.ring.advance(&tail[..remaining]);
                *out_pos += remaining;
            }
        } else {
            let mut seed = [0u8; WORD];
            self.ring.read_behind(mat_dst, &mut seed[..mat_dst]);
            for i in 0..len {
                output[*out_pos + i] = seed[i % mat_dst];
            }
            self.ring.advance(&output[*out_pos..*out_pos + len]);
            *out_pos += len;
        }

        *mat_len -= len as u32;
    }
}
