/// The minimum length of a match; the token's match-length nibble (and any
/// extension bytes following it) encodes `match_len - MINMATCH`.
pub(crate) const MINMATCH: usize = 4;

/// Point the decoder suspends and resumes at. Each variant corresponds to a
/// label in the original computed-goto state machine this crate's loop
/// replaces; resuming re-enters the `match` at exactly the phase the last
/// call left off in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Phase {
    /// Waiting for the next token byte. If a decoder is in this phase with
    /// both residual lengths at zero, it sits at a block boundary.
    ReadTok,
    /// Extending the literal length past its initial token nibble of 15 by
    /// reading `0xFF`-chained continuation bytes.
    ReadLitLenExt,
    /// Copying `lit_len` literal bytes from input to output.
    CopyLit,
    /// Reading the low byte of the 2-byte little-endian match distance.
    ReadOfs1,
    /// Reading the high byte of the 2-byte little-endian match distance.
    ReadOfs2,
    /// Extending the match length past its initial token nibble of 15 by
    /// reading `0xFF`-chained continuation bytes.
    ReadMatLenExt,
    /// Copying `mat_len` bytes from `mat_dst` bytes behind the write cursor.
    CopyMat,
    /// A sticky terminal state reached after an error; every subsequent
    /// call returns the latched error without touching any other state.
    ReportError,
}

/// Folds one `0xFF`-chained length-extension byte into `len`, per the LZ4
/// block format: the run continues as long as the byte read is `0xFF`, and
/// the final (non-`0xFF`) byte is added without continuing.
///
/// Returns `true` once the extension is complete (the byte read was not
/// `0xFF`), or an error if accumulating it would overflow a `u32`.
pub(crate) fn extend_length(len: &mut u32, byte: u8) -> Result<bool, crate::DecompressError> {
    *len = len
        .checked_add(byte as u32)
        .ok_or(crate::DecompressError::LengthOverflow)?;
    Ok(byte != 0xFF)
}
