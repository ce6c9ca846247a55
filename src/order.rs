//! Number-aware name ordering for object properties.
//!
//! Tree views sort object properties so that names containing digit runs are
//! ordered by magnitude rather than code point: `item2` sorts before
//! `item10`. Names without digits fall back to plain byte-wise order.

use std::cmp::Ordering;

/// Compare two property names, treating embedded digit runs as magnitudes.
///
/// Digit runs are compared numerically (leading zeros ignored for magnitude,
/// used as a tiebreaker), everything else byte-wise.
pub fn compare_names(a: &str, b: &str) -> Ordering {
    let a = a.as_bytes();
    let b = b.as_bytes();
    let mut i = 0;
    let mut j = 0;

    while i < a.len() && j < b.len() {
        let ca = a[i];
        let cb = b[j];
        if ca.is_ascii_digit() && cb.is_ascii_digit() {
            let ra = digit_run(a, &mut i);
            let rb = digit_run(b, &mut j);
            match compare_digit_runs(ra, rb) {
                Ordering::Equal => continue,
                other => return other,
            }
        }
        match ca.cmp(&cb) {
            Ordering::Equal => {
                i += 1;
                j += 1;
            }
            other => return other,
        }
    }

    (a.len() - i).cmp(&(b.len() - j))
}

/// Advance `pos` past the contiguous digit run starting there.
fn digit_run<'a>(s: &'a [u8], pos: &mut usize) -> &'a [u8] {
    let start = *pos;
    while *pos < s.len() && s[*pos].is_ascii_digit() {
        *pos += 1;
    }
    &s[start..*pos]
}

fn compare_digit_runs(a: &[u8], b: &[u8]) -> Ordering {
    let sa = strip_leading_zeros(a);
    let sb = strip_leading_zeros(b);
    // Longer stripped run means larger magnitude.
    match sa.len().cmp(&sb.len()) {
        Ordering::Equal => match sa.cmp(sb) {
            // Same magnitude: fewer leading zeros sorts first.
            Ordering::Equal => a.len().cmp(&b.len()),
            other => other,
        },
        other => other,
    }
}

fn strip_leading_zeros(run: &[u8]) -> &[u8] {
    let mut i = 0;
    while i + 1 < run.len() && run[i] == b'0' {
        i += 1;
    }
    &run[i..]
}
