//! Final response assembly.

use bytes::{Bytes, BytesMut};

/// Cached fragments, in dispatch order, followed by the whole fresh response.
///
/// A byte splice; the result is not guaranteed to be well-formed JSON when
/// both sides are non-empty.
pub fn merge(cached: &[Bytes], fresh: &Bytes) -> Bytes {
    if cached.is_empty() {
        return fresh.clone();
    }
    let len = cached.iter().map(Bytes::len).sum::<usize>() + fresh.len();
    let mut out = BytesMut::with_capacity(len);
    for fragment in cached {
        out.extend_from_slice(fragment);
    }
    out.extend_from_slice(fresh);
    out.freeze()
}

/// Inline report for check tokens that did not normalize.
pub fn invalid_check_report(invalid: &[String]) -> Bytes {
    let mut out = String::new();
    for token in invalid {
        out.push_str(&format!("Incorrect Check: \"{}\"", token));
    }
    Bytes::from(out)
}
