//! Reversible flattening of a filesystem path into one path segment.
//!
//! `/` becomes `_` and a literal `_` becomes the 12-byte escape
//! `<underscore>`. Input that already contains `<underscore>` would decode
//! to something else, so [`encode`] refuses it.

use std::path::{Path, PathBuf};

use crate::error::InvalidPathError;

/// Escape emitted for a literal `_`.
pub const ESCAPED_UNDERSCORE: &str = "<underscore>";

/// Everything in [`ESCAPED_UNDERSCORE`] after the leading `<`.
const ESCAPE_TAIL: &str = "underscore>";

/// Encode `path` into a flat token.
///
/// The scan is a single left-to-right pass over the input; escapes are
/// appended to the output and never rescanned. A `<` in the input that is
/// immediately followed by `underscore>` is rejected.
pub fn encode(path: &str) -> Result<String, InvalidPathError> {
    let mut out = String::with_capacity(path.len());
    for (offset, ch) in path.char_indices() {
        match ch {
            '/' => out.push('_'),
            '_' => out.push_str(ESCAPED_UNDERSCORE),
            '<' if path[offset + 1..].starts_with(ESCAPE_TAIL) => {
                tracing::warn!(path, offset, "refusing to encode path containing `<underscore>`");
                return Err(InvalidPathError::ReservedEscape {
                    path: path.to_owned(),
                    offset,
                });
            }
            _ => out.push(ch),
        }
    }
    Ok(out)
}

/// Decode a token produced by [`encode`].
///
/// `decode(&encode(p)?) == p` for every accepted `p`. Tokens that did not
/// come from `encode` still decode, but may not re-encode to themselves.
pub fn decode(token: &str) -> String {
    let mut out = String::with_capacity(token.len());
    let mut rest = token;
    while let Some(ch) = rest.chars().next() {
        if let Some(after) = rest.strip_prefix(ESCAPED_UNDERSCORE) {
            out.push('_');
            rest = after;
            continue;
        }
        out.push(if ch == '_' { '/' } else { ch });
        rest = &rest[ch.len_utf8()..];
    }
    out
}

/// [`encode`] for a [`Path`]. Non UTF-8 paths are refused.
pub fn encode_path(path: &Path) -> Result<String, InvalidPathError> {
    let Some(text) = path.to_str() else {
        return Err(InvalidPathError::NotUtf8 {
            path: path.to_owned(),
        });
    };
    encode(text)
}

/// [`decode`] into a [`PathBuf`].
pub fn decode_path(token: &str) -> PathBuf {
    PathBuf::from(decode(token))
}
