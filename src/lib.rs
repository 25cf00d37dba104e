/*! Resumable, allocation-free streaming decoder for the LZ4 block format.

This crate decodes raw LZ4 blocks (no frame header, no magic number, no
content checksum) incrementally: input and output are handed to the decoder
in arbitrary-sized chunks across any number of calls, and the decoder picks
up exactly where it suspended. This makes it suitable for decoding a block
whose compressed bytes arrive over a socket, or whose decompressed bytes must
be drained into a fixed-size buffer smaller than the block itself.

Two variants are provided, trading a small amount of extra state for
independence from the caller's output buffer:

- [`Decoder`] assumes the caller's output slices, taken together, form a
  growing buffer it may read back from (e.g. a `Vec<u8>` that is only ever
  appended to). It keeps its internal history ring in sync with that buffer
  lazily, only when it suspends.
- [`UncachedDecoder`] makes no assumption about the output at all; every
  byte it emits is also written into its own ring as it is produced. Use
  this variant when the destination is write-only, such as a ring buffer of
  your own, an `mmap`'d region you won't read back, or a `Write` impl.

Neither variant allocates: both carry their 64 KiB history window inline.

# Example
```
use lz4_stream_decode::Decoder;

// token(literal_len=3, match_len=9-4=5), "abc", offset=3 (le16)
let compressed = [0x35, b'a', b'b', b'c', 0x03, 0x00];
let mut decoder = Decoder::new();
let mut out = [0u8; 64];
let progress = decoder.decompress(&compressed, &mut out).unwrap();
assert_eq!(&out[..progress.written], b"abcabcabcabc");
```
*/
#![cfg_attr(not(feature = "std"), no_std)]
#![deny(unsafe_code)]

mod error;
mod phase;
mod ring;

pub mod baseline;
pub mod uncached;

#[cfg(test)]
mod tests_support;

pub use baseline::Decoder;
pub use error::DecompressError;
pub use uncached::Decoder as UncachedDecoder;

/// Result of a single [`Decoder::decompress`] or [`UncachedDecoder::decompress`] call.
///
/// Reports how much of `input` was consumed and how much of `output` was
/// filled during that call. Neither count implies the block is finished;
/// call [`Decoder::is_idle`] / [`UncachedDecoder::is_idle`] to check for a
/// clean end-of-block boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Progress {
    /// Number of bytes read from the front of `input`.
    pub consumed: usize,
    /// Number of bytes written to the front of `output`.
    pub written: usize,
}
