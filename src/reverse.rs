//! Segment reversal for dot-delimited metric paths.
//!
//! `a.b.c` becomes `c.b.a`. Empty segments are kept, so leading, trailing
//! and doubled delimiters move with the segments around them:
//! `.hello..world.` becomes `.world..hello.`. Output length always equals
//! input length. Storing reversed paths lets a prefix range scan find every
//! series sharing the same leaf segments.
//!
//! The functions work on raw bytes and never fail.

pub const DELIMITER: u8 = b'.';

/// Reverses segment order in place using no buffer proportional to the input.
///
/// The whole path is reversed first, which puts the segments in the right
/// order with their bytes backwards; each segment is then reversed back.
pub fn reverse_in_place(path: &mut [u8]) {
    path.reverse();
    for segment in path.split_mut(|&b| b == DELIMITER) {
        segment.reverse();
    }
}

/// Writes the reversed form of `src` into `dst[..src.len()]`.
///
/// `src` is left untouched and bytes of `dst` past `src.len()` are not
/// written, so one destination buffer can be reused across many paths.
///
/// # Panics
///
/// Panics if `dst` is shorter than `src`.
pub fn reverse_to(dst: &mut [u8], src: &[u8]) {
    assert!(
        dst.len() >= src.len(),
        "destination of {} bytes cannot hold a {} byte path",
        dst.len(),
        src.len()
    );
    let mut pos = 0;
    for (i, segment) in src.rsplit(|&b| b == DELIMITER).enumerate() {
        if i > 0 {
            dst[pos] = DELIMITER;
            pos += 1;
        }
        dst[pos..pos + segment.len()].copy_from_slice(segment);
        pos += segment.len();
    }
}

/// Allocating form of [`reverse_to`].
pub fn reverse_bytes(src: &[u8]) -> Vec<u8> {
    let mut out = vec![0u8; src.len()];
    reverse_to(&mut out, src);
    out
}

/// Number of segments in `path`, counting empty ones. Never zero.
pub fn segment_count(path: &[u8]) -> usize {
    path.iter().filter(|&&b| b == DELIMITER).count() + 1
}
