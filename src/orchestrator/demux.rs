//! Splitting a combined WordPress response into per-check segments.
//!
//! # Wire Contract
//! The WordPress service concatenates, in this fixed order and only for the
//! kinds it was asked for:
//! ```text
//! [plugin array] {config object} [user array]
//! ```
//! Segments are assigned by position, not by content:
//! - `plugin` = first top-level bracketed span
//! - `config` = whole body with every top-level bracketed span removed
//! - `user`   = next top-level bracketed span after `plugin` (first if no plugin)
//!
//! The layout is not self-describing; a service emitting `user` before
//! `plugin` silently swaps the two segments.

use bytes::{Bytes, BytesMut};
use std::collections::BTreeMap;
use std::ops::Range;

use crate::cache::{SessionCache, SessionNonce};
use crate::check::CheckKind;

/// Result of splitting a combined response.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Demuxed {
    pub segments: BTreeMap<CheckKind, Bytes>,
    /// Body with all top-level bracketed spans removed.
    pub residual: Bytes,
}

/// Byte ranges of every top-level `[...]` span, left to right.
///
/// Brackets inside JSON strings and inside `{...}` objects are not span
/// boundaries. An unterminated span at the end of input is ignored.
pub fn bracketed_spans(body: &[u8]) -> Vec<Range<usize>> {
    let mut spans = Vec::new();
    let mut depth = 0usize;
    let mut start = None;
    let mut in_string = false;
    let mut escaped = false;

    for (i, &b) in body.iter().enumerate() {
        if in_string {
            match b {
                _ if escaped => escaped = false,
                b'\\' => escaped = true,
                b'"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match b {
            b'"' => in_string = true,
            b'[' | b'{' => {
                if depth == 0 && b == b'[' {
                    start = Some(i);
                }
                depth += 1;
            }
            b']' | b'}' if depth > 0 => {
                depth -= 1;
                if depth == 0 {
                    if let Some(s) = start.take() {
                        spans.push(s..i + 1);
                    }
                }
            }
            _ => {}
        }
    }
    spans
}

fn strip_spans(body: &Bytes, spans: &[Range<usize>]) -> Bytes {
    let mut residual = BytesMut::with_capacity(body.len());
    let mut cursor = 0;
    for span in spans {
        residual.extend_from_slice(&body[cursor..span.start]);
        cursor = span.end;
    }
    residual.extend_from_slice(&body[cursor..]);
    residual.freeze()
}

/// Assign segments of `combined` to the `requested` kinds.
pub fn demux(combined: &Bytes, requested: &[CheckKind]) -> Demuxed {
    let spans = bracketed_spans(combined);
    let residual = strip_spans(combined, &spans);
    let mut segments = BTreeMap::new();
    let mut cursor = 0;

    if requested.contains(&CheckKind::Plugin) {
        match spans.get(cursor) {
            Some(span) => {
                segments.insert(CheckKind::Plugin, combined.slice(span.clone()));
            }
            None => tracing::warn!("Combined response has no plugin segment"),
        }
        cursor += 1;
    }

    if requested.contains(&CheckKind::Config) {
        segments.insert(CheckKind::Config, residual.clone());
    }

    if requested.contains(&CheckKind::User) {
        match spans.get(cursor) {
            Some(span) => {
                segments.insert(CheckKind::User, combined.slice(span.clone()));
            }
            None => tracing::warn!("Combined response has no user segment"),
        }
    }

    Demuxed { segments, residual }
}

/// Write every demultiplexed segment into the cache under `nonce`.
///
/// Not atomic as a whole; readers may observe some kinds before others.
pub fn commit(cache: &SessionCache, nonce: &SessionNonce, demuxed: &Demuxed) {
    for (kind, segment) in &demuxed.segments {
        cache.put(nonce, *kind, segment.clone());
        tracing::debug!(check = %kind, bytes = segment.len(), "Cached segment");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    const PLUGINS: &str = r#"[{"slug":"akismet","latest":"5.3"}]"#;
    const CONFIG: &str = r#"{"title":"Blog","tags":["a","b"]}"#;
    const USERS: &str = r#"[{"id":1,"name":"admin"}]"#;

    fn combined(parts: &[&str]) -> Bytes {
        Bytes::from(parts.concat())
    }

    #[test]
    fn test_spans_left_to_right() {
        let body = combined(&[PLUGINS, CONFIG, USERS]);
        let spans = bracketed_spans(&body);
        assert_eq!(spans.len(), 2);
        assert_eq!(&body[spans[0].clone()], PLUGINS.as_bytes());
        assert_eq!(&body[spans[1].clone()], USERS.as_bytes());
    }

    #[test]
    fn test_brackets_in_strings_ignored() {
        let body = Bytes::from_static(br#"[{"name":"a]b"}]["\"[x"]"#);
        let spans = bracketed_spans(&body);
        assert_eq!(spans, vec![0..16, 16..24]);
    }

    #[test]
    fn test_unterminated_span_ignored() {
        assert!(bracketed_spans(b"[1,2").is_empty());
        assert!(bracketed_spans(b"]]{}").is_empty());
    }

    #[test]
    fn test_plugin_then_user_positional() {
        let body = combined(&[PLUGINS, USERS]);
        // Caller order must not matter
        let d = demux(&body, &[CheckKind::User, CheckKind::Plugin]);
        assert_eq!(d.segments[&CheckKind::Plugin], PLUGINS.as_bytes());
        assert_eq!(d.segments[&CheckKind::User], USERS.as_bytes());
        assert!(d.residual.is_empty());
    }

    #[test]
    fn test_user_only_takes_first_span() {
        let d = demux(&Bytes::from_static(USERS.as_bytes()), &[CheckKind::User]);
        assert_eq!(d.segments[&CheckKind::User], USERS.as_bytes());
        assert_eq!(d.segments.len(), 1);
    }

    #[test]
    fn test_config_is_residual() {
        let body = combined(&[PLUGINS, CONFIG, USERS]);
        let d = demux(&body, &[CheckKind::Plugin, CheckKind::Config, CheckKind::User]);
        assert_eq!(d.segments[&CheckKind::Config], CONFIG.as_bytes());
        assert_eq!(d.segments[&CheckKind::Plugin], PLUGINS.as_bytes());
        assert_eq!(d.segments[&CheckKind::User], USERS.as_bytes());
    }

    #[test]
    fn test_missing_span_not_assigned() {
        let d = demux(&Bytes::from_static(PLUGINS.as_bytes()), &[CheckKind::Plugin, CheckKind::User]);
        assert!(d.segments.contains_key(&CheckKind::Plugin));
        assert!(!d.segments.contains_key(&CheckKind::User));
    }

    #[test]
    fn test_commit_caches_under_nonce() {
        let cache = SessionCache::new(Duration::from_secs(300));
        let nonce = SessionNonce::new("n");
        let d = demux(&combined(&[PLUGINS, USERS]), &[CheckKind::Plugin, CheckKind::User]);
        commit(&cache, &nonce, &d);

        assert_eq!(cache.get(&nonce, CheckKind::Plugin).unwrap(), PLUGINS.as_bytes());
        assert_eq!(cache.get(&nonce, CheckKind::User).unwrap(), USERS.as_bytes());
        assert!(cache.get(&nonce, CheckKind::Config).is_none());
    }
}
