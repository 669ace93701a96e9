//! RFC 6901 JSON Pointer parsing and encoding.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::PointerError;

const DELIMITER: char = '/';
const ESCAPE: char = '~';

/// A parsed JSON Pointer.
///
/// Pointers keep both the decoded reference tokens and the raw string they
/// were parsed from. Equality and hashing only consider the tokens.
///
/// ```
/// # use jpatch_core::Pointer;
/// let pointer = Pointer::parse("/a~1b/0")?;
/// assert_eq!(pointer.tokens(), ["a/b", "0"]);
/// assert_eq!(pointer.raw(), "/a~1b/0");
/// # Ok::<(), jpatch_core::PointerError>(())
/// ```
#[derive(Clone, Debug, Default)]
pub struct Pointer {
    raw: String,
    tokens: Vec<String>,
}

impl Pointer {
    /// Returns the pointer to the whole document.
    #[must_use]
    pub fn root() -> Self {
        Self::default()
    }

    /// Parses a raw pointer string.
    ///
    /// ```
    /// # use jpatch_core::Pointer;
    /// assert!(Pointer::parse("")?.is_root());
    /// assert!(Pointer::parse("/").is_err());
    /// assert!(Pointer::parse("/a//c").is_err());
    /// assert_eq!(Pointer::parse("/~01")?.tokens(), ["~1"]);
    /// # Ok::<(), jpatch_core::PointerError>(())
    /// ```
    pub fn parse(raw: &str) -> Result<Self, PointerError> {
        if raw.is_empty() {
            return Ok(Self::root());
        }
        let Some(body) = raw.strip_prefix(DELIMITER) else {
            return Err(PointerError::MissingDelimiter { raw: raw.to_owned() });
        };
        let mut tokens = Vec::new();
        for segment in body.split(DELIMITER) {
            if segment.is_empty() {
                return Err(PointerError::EmptyReferenceToken { raw: raw.to_owned() });
            }
            tokens.push(unescape_token(segment));
        }
        Ok(Self { raw: raw.to_owned(), tokens })
    }

    /// Builds a pointer from already decoded tokens.
    ///
    /// Empty tokens are rejected, since their encoding would not parse back.
    ///
    /// ```
    /// # use jpatch_core::Pointer;
    /// let pointer = Pointer::from_tokens(["a/b", "~c"])?;
    /// assert_eq!(pointer.raw(), "/a~1b/~0c");
    /// assert!(Pointer::from_tokens(["a", ""]).is_err());
    /// # Ok::<(), jpatch_core::PointerError>(())
    /// ```
    pub fn from_tokens<I, S>(tokens: I) -> Result<Self, PointerError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let tokens: Vec<String> = tokens.into_iter().map(Into::into).collect();
        if tokens.iter().any(String::is_empty) {
            return Err(PointerError::EmptyReferenceToken { raw: encode(&tokens) });
        }
        Ok(Self::from_decoded(tokens))
    }

    /// Returns the pointer to `token` inside the location `self` addresses.
    ///
    /// ```
    /// # use jpatch_core::Pointer;
    /// let child = Pointer::parse("/a")?.child("b/c")?;
    /// assert_eq!(child.raw(), "/a/b~1c");
    /// # Ok::<(), jpatch_core::PointerError>(())
    /// ```
    pub fn child(&self, token: &str) -> Result<Self, PointerError> {
        Self::from_tokens(self.tokens.iter().map(String::as_str).chain([token]))
    }

    // Callers guarantee that no token is empty.
    fn from_decoded(tokens: Vec<String>) -> Self {
        Self { raw: encode(&tokens), tokens }
    }

    /// Returns the raw string the pointer was parsed from.
    #[must_use]
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Returns the decoded reference tokens.
    #[must_use]
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    /// Returns the number of reference tokens.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Indicates whether the pointer has no tokens.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Indicates whether the pointer addresses the whole document.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.is_empty()
    }

    /// Returns the last reference token, if any.
    #[must_use]
    pub fn last(&self) -> Option<&str> {
        self.tokens.last().map(String::as_str)
    }

    /// Returns the pointer to the parent location, or `None` for the root.
    ///
    /// ```
    /// # use jpatch_core::Pointer;
    /// let pointer = Pointer::parse("/a/b")?;
    /// assert_eq!(pointer.parent(), Some(Pointer::parse("/a")?));
    /// assert_eq!(Pointer::root().parent(), None);
    /// # Ok::<(), jpatch_core::PointerError>(())
    /// ```
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        let (_, init) = self.tokens.split_last()?;
        Some(Self::from_decoded(init.to_vec()))
    }

    /// Returns the pointer over the tokens left after dropping the first one.
    ///
    /// Returns `None` for the root pointer, which has nothing to traverse.
    ///
    /// ```
    /// # use jpatch_core::Pointer;
    /// let pointer = Pointer::parse("/abc/b/hallo/welt")?;
    /// let rest = pointer.traverse().expect("non-root pointer");
    /// assert_eq!(rest.raw(), "/b/hallo/welt");
    /// # Ok::<(), jpatch_core::PointerError>(())
    /// ```
    #[must_use]
    pub fn traverse(&self) -> Option<Self> {
        let (_, rest) = self.tokens.split_first()?;
        Some(Self::from_decoded(rest.to_vec()))
    }

    /// Indicates whether `self` addresses a location strictly inside `other`'s
    /// subtree, i.e. `other` is a proper prefix of `self`.
    ///
    /// ```
    /// # use jpatch_core::Pointer;
    /// let parent = Pointer::parse("/a")?;
    /// assert!(Pointer::parse("/a/b")?.is_descendant_of(&parent));
    /// assert!(!parent.is_descendant_of(&parent));
    /// # Ok::<(), jpatch_core::PointerError>(())
    /// ```
    #[must_use]
    pub fn is_descendant_of(&self, other: &Self) -> bool {
        self.tokens.len() > other.tokens.len() && self.tokens.starts_with(&other.tokens)
    }
}

/// Decodes `~1` to `/` and `~0` to `~` in a single reference token.
///
/// Escapes are consumed left to right as two-character units, so `~01`
/// decodes to `~1`. A `~` that does not start a valid escape is kept as is.
///
/// ```
/// # use jpatch_core::unescape_token;
/// assert_eq!(unescape_token("~1~0"), "/~");
/// assert_eq!(unescape_token("~01"), "~1");
/// assert_eq!(unescape_token("a~b"), "a~b");
/// ```
#[must_use]
pub fn unescape_token(token: &str) -> String {
    if !token.contains(ESCAPE) {
        return token.to_owned();
    }
    let mut decoded = String::with_capacity(token.len());
    let mut chars = token.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch != ESCAPE {
            decoded.push(ch);
            continue;
        }
        match chars.peek() {
            Some('0') => {
                chars.next();
                decoded.push(ESCAPE);
            }
            Some('1') => {
                chars.next();
                decoded.push(DELIMITER);
            }
            _ => decoded.push(ESCAPE),
        }
    }
    decoded
}

/// Encodes `~` as `~0` and `/` as `~1` in a single reference token.
///
/// ```
/// # use jpatch_core::escape_token;
/// assert_eq!(escape_token("a/b~c"), "a~1b~0c");
/// ```
#[must_use]
pub fn escape_token(token: &str) -> String {
    if !token.contains([ESCAPE, DELIMITER]) {
        return token.to_owned();
    }
    token.replace(ESCAPE, "~0").replace(DELIMITER, "~1")
}

fn encode(tokens: &[String]) -> String {
    let mut raw = String::new();
    for token in tokens {
        raw.push(DELIMITER);
        raw.push_str(&escape_token(token));
    }
    raw
}

impl PartialEq for Pointer {
    fn eq(&self, other: &Self) -> bool {
        self.tokens == other.tokens
    }
}

impl Eq for Pointer {}

impl Hash for Pointer {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.tokens.hash(state);
    }
}

impl fmt::Display for Pointer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl FromStr for Pointer {
    type Err = PointerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<&str> for Pointer {
    type Error = PointerError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl Serialize for Pointer {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.raw)
    }
}

impl<'de> Deserialize<'de> for Pointer {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::{collection::vec, prelude::*, string::string_regex};

    #[test]
    fn empty_pointer_is_root() {
        let pointer = Pointer::parse("").unwrap();
        assert!(pointer.is_root());
        assert_eq!(pointer.raw(), "");
        assert_eq!(pointer, Pointer::root());
    }

    #[test]
    fn lone_delimiter_is_rejected() {
        let err = Pointer::parse("/").unwrap_err();
        assert_eq!(err, PointerError::EmptyReferenceToken { raw: "/".into() });
    }

    #[test]
    fn missing_leading_delimiter_is_rejected() {
        for raw in ["ab", "a/b/c"] {
            let err = Pointer::parse(raw).unwrap_err();
            assert!(matches!(err, PointerError::MissingDelimiter { .. }), "{raw}");
        }
    }

    #[test]
    fn empty_reference_tokens_are_rejected() {
        for raw in ["/a//c", "/a/", "//"] {
            assert!(Pointer::parse(raw).is_err(), "{raw}");
        }
    }

    #[test]
    fn escapes_decode_as_atomic_units() {
        let cases: [(&str, &[&str]); 7] = [
            ("/~1", &["/"]),
            ("/~0", &["~"]),
            ("/~01", &["~1"]),
            ("/~10", &["/0"]),
            ("/~1~0", &["/~"]),
            ("/~1/~0", &["/", "~"]),
            ("/~0/~1", &["~", "/"]),
        ];
        for (raw, expected) in cases {
            assert_eq!(Pointer::parse(raw).unwrap().tokens(), expected, "{raw}");
        }
    }

    #[test]
    fn malformed_escape_is_kept_literally() {
        let pointer = Pointer::parse("/a~2/~").unwrap();
        assert_eq!(pointer.tokens(), ["a~2", "~"]);
    }

    #[test]
    fn unicode_pointer_keeps_raw_value() {
        let raw = "/1234567890-=!@£$%^&*()_+¡€#¢∞§¶•ªº–≠⁄™‹›ﬁﬂ‡°·‚—±qwertyuiop[]{}œ∑´®†¥¨^øπ“‘";
        let pointer = Pointer::parse(raw).unwrap();
        assert_eq!(pointer.raw(), raw);
        assert_eq!(pointer.len(), 1);
    }

    #[test]
    fn traverse_drops_first_token() {
        let pointer = Pointer::parse("/a/b").unwrap();
        let rest = pointer.traverse().unwrap();
        assert_eq!(rest, Pointer::parse("/b").unwrap());
        assert_eq!(rest.raw(), "/b");
        assert_eq!(rest.traverse(), Some(Pointer::root()));
        assert_eq!(Pointer::root().traverse(), None);
    }

    #[test]
    fn traverse_reescapes_remaining_tokens() {
        let pointer = Pointer::parse("/a/b~1c/~0").unwrap();
        assert_eq!(pointer.traverse().unwrap().raw(), "/b~1c/~0");
    }

    #[test]
    fn equality_ignores_raw_spelling() {
        // `~2` is not an escape, so both spellings decode to the same token.
        let lhs = Pointer::parse("/a~2").unwrap();
        let rhs = Pointer::from_tokens(["a~2"]).unwrap();
        assert_eq!(lhs, rhs);
        assert_ne!(lhs.raw(), rhs.raw());
    }

    #[test]
    fn from_tokens_rejects_empty_tokens() {
        let err = Pointer::from_tokens([""]).unwrap_err();
        assert_eq!(err, PointerError::EmptyReferenceToken { raw: "/".into() });
        assert!(Pointer::from_tokens(["a", "", "b"]).is_err());
        assert!(Pointer::root().child("").is_err());
        assert_eq!(Pointer::from_tokens(Vec::<String>::new()).unwrap(), Pointer::root());
    }

    #[test]
    fn child_appends_one_token() {
        let pointer = Pointer::parse("/a").unwrap().child("~").unwrap();
        assert_eq!(pointer.raw(), "/a/~0");
        assert_eq!(pointer.parent(), Some(Pointer::parse("/a").unwrap()));
    }

    #[test]
    fn serde_uses_raw_string() {
        let pointer = Pointer::parse("/foo/0").unwrap();
        let json = serde_json::to_string(&pointer).unwrap();
        assert_eq!(json, "\"/foo/0\"");
        let decoded: Pointer = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, pointer);
        assert!(serde_json::from_str::<Pointer>("\"foo\"").is_err());
    }

    fn arb_raw_pointer() -> impl Strategy<Value = String> {
        let token = string_regex("([a-zA-Z0-9 _.-]|~0|~1){1,6}").unwrap();
        vec(token, 0..5).prop_map(|tokens| tokens.iter().map(|t| format!("/{t}")).collect())
    }

    proptest! {
        #[test]
        fn parse_then_encode_round_trips(raw in arb_raw_pointer()) {
            let pointer = Pointer::parse(&raw).unwrap();
            prop_assert_eq!(encode(pointer.tokens()), raw);
        }

        #[test]
        fn from_tokens_then_parse_round_trips(tokens in vec(".{1,6}", 0..5)) {
            let pointer = Pointer::from_tokens(tokens.clone()).unwrap();
            let reparsed = Pointer::parse(pointer.raw()).unwrap();
            prop_assert_eq!(reparsed.tokens(), tokens.as_slice());
        }
    }
}
