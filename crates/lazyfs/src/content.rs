//! Deterministic content generation.
//!
//! Files have no backing storage, so reads are answered from a pure
//! function of the file's logical size and the requested range: every
//! in-bounds position yields the sentinel byte, everything past the end
//! is zero padding. No I/O, no state, safe to call from any thread.

/// Byte returned for every in-bounds read position, for every file.
pub const SENTINEL_BYTE: u8 = 0xFE;

/// Number of bytes a read of `length` at `offset` actually yields
/// against a file of logical `size`.
///
/// Mirrors a short read at end-of-file: zero once the offset reaches the
/// size, clamped to the remaining bytes otherwise.
pub fn effective_len(size: u64, offset: u64, length: usize) -> usize {
    if offset >= size {
        0
    } else {
        (size - offset).min(length as u64) as usize
    }
}

/// Fill `buf` for a read at `offset` against a file of logical `size`.
///
/// The first `effective_len` bytes are sentinel bytes; the remainder of
/// the buffer is zeroed. The zeroed tail is padding only and is not
/// counted as part of the read.
///
/// # Returns
/// The effective read length.
pub fn fill(buf: &mut [u8], size: u64, offset: u64) -> usize {
    let n = effective_len(size, offset, buf.len());
    buf[..n].fill(SENTINEL_BYTE);
    buf[n..].fill(0);
    n
}

/// Produce the bytes for a read of `length` at `offset` against a file
/// of logical `size`.
///
/// The returned vector holds exactly the effective length; an empty
/// vector signals end-of-file.
pub fn generate(size: u64, offset: u64, length: usize) -> Vec<u8> {
    vec![SENTINEL_BYTE; effective_len(size, offset, length)]
}
