//! Leaf matchers: the terminal rules of a grammar.
//!
//! A leaf matches raw input against a fixed pattern or a predicate and
//! reports how many bytes it consumed. Leaves never rewind; rewinding is
//! always the responsibility of an enclosing combinator, and a failing
//! leaf consumes nothing to begin with.

use compact_str::CompactString;
use smallvec::SmallVec;
use std::sync::Arc;

/// Prefix matcher for a leaf rule.
///
/// `Predicate` is the extension point for matchers the fixed variants do
/// not cover, and the documented place for a host to implant a
/// cancellation check (return `None` and let an enclosing `must` abort).
#[derive(Clone)]
pub enum LeafMatcher {
    /// A fixed byte string.
    Literal(CompactString),
    /// Any single byte.
    AnyByte,
    /// A single byte in the inclusive range `lo..=hi`.
    ByteRange { lo: u8, hi: u8 },
    /// A single byte from a fixed set.
    OneOf(SmallVec<[u8; 8]>),
    /// End of input; zero-width.
    Eof,
    /// An arbitrary prefix matcher: given the unconsumed input, return
    /// the number of bytes matched, or `None` on failure.
    Predicate {
        /// Name used in `Debug` output and diagnostics.
        name: &'static str,
        matcher: Arc<dyn Fn(&[u8]) -> Option<usize> + Send + Sync>,
    },
}

impl LeafMatcher {
    /// Attempt to match a prefix of `rest`, returning the consumed length.
    #[must_use]
    pub fn match_len(&self, rest: &[u8]) -> Option<usize> {
        match self {
            Self::Literal(text) => rest
                .starts_with(text.as_bytes())
                .then_some(text.len()),
            Self::AnyByte => (!rest.is_empty()).then_some(1),
            Self::ByteRange { lo, hi } => rest
                .first()
                .is_some_and(|b| (*lo..=*hi).contains(b))
                .then_some(1),
            Self::OneOf(set) => rest
                .first()
                .is_some_and(|b| set.contains(b))
                .then_some(1),
            Self::Eof => rest.is_empty().then_some(0),
            Self::Predicate { matcher, .. } => matcher(rest),
        }
    }
}

impl std::fmt::Debug for LeafMatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Literal(text) => f.debug_tuple("Literal").field(text).finish(),
            Self::AnyByte => f.write_str("AnyByte"),
            Self::ByteRange { lo, hi } => f
                .debug_struct("ByteRange")
                .field("lo", lo)
                .field("hi", hi)
                .finish(),
            Self::OneOf(set) => f.debug_tuple("OneOf").field(set).finish(),
            Self::Eof => f.write_str("Eof"),
            Self::Predicate { name, .. } => f.debug_tuple("Predicate").field(name).finish(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use smallvec::smallvec;

    #[test]
    fn test_literal() {
        let leaf = LeafMatcher::Literal("ab".into());
        assert_eq!(leaf.match_len(b"abc"), Some(2));
        assert_eq!(leaf.match_len(b"ab"), Some(2));
        assert_eq!(leaf.match_len(b"a"), None);
        assert_eq!(leaf.match_len(b"xb"), None);
    }

    #[test]
    fn test_any_byte() {
        assert_eq!(LeafMatcher::AnyByte.match_len(b"x"), Some(1));
        assert_eq!(LeafMatcher::AnyByte.match_len(b""), None);
    }

    #[test]
    fn test_byte_range() {
        let digit = LeafMatcher::ByteRange { lo: b'0', hi: b'9' };
        assert_eq!(digit.match_len(b"42"), Some(1));
        assert_eq!(digit.match_len(b"a"), None);
        assert_eq!(digit.match_len(b""), None);
    }

    #[test]
    fn test_one_of() {
        let leaf = LeafMatcher::OneOf(smallvec![b'+', b'-']);
        assert_eq!(leaf.match_len(b"+1"), Some(1));
        assert_eq!(leaf.match_len(b"*"), None);
    }

    #[test]
    fn test_eof_zero_width() {
        assert_eq!(LeafMatcher::Eof.match_len(b""), Some(0));
        assert_eq!(LeafMatcher::Eof.match_len(b"x"), None);
    }

    #[test]
    fn test_predicate() {
        let ident = LeafMatcher::Predicate {
            name: "ident",
            matcher: Arc::new(|rest| {
                let len = rest.iter().take_while(|b| b.is_ascii_alphabetic()).count();
                (len > 0).then_some(len)
            }),
        };
        assert_eq!(ident.match_len(b"abc1"), Some(3));
        assert_eq!(ident.match_len(b"1abc"), None);
        assert!(format!("{ident:?}").contains("ident"));
    }
}
