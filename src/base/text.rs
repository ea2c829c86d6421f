//! Character classes used when mapping a cursor offset onto a symbol.

use super::location::{TextRange, TextSize};

/// Characters that can appear in a C/C++ identifier, including `~` for
/// destructor names.
#[inline]
pub fn is_symbol_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_' || ch == '~'
}

/// Punctuation that can make up a C/C++ operator token.
#[inline]
pub fn is_operator_char(ch: char) -> bool {
    matches!(
        ch,
        '!' | '%'
            | '&'
            | '('
            | ')'
            | '+'
            | ','
            | '-'
            | '.'
            | '/'
            | ':'
            | '<'
            | '='
            | '>'
            | '?'
            | '['
            | ']'
            | '^'
            | '|'
            | '~'
    )
}

/// Expand `offset` to the identifier surrounding it.
///
/// An offset just past the end of an identifier still selects it, so a
/// cursor placed after `foo` resolves to `foo`. Returns `None` when no
/// symbol character touches the offset.
pub fn symbol_range(text: &str, offset: TextSize) -> Option<TextRange> {
    let offset = usize::from(offset);
    if offset > text.len() || !text.is_char_boundary(offset) {
        return None;
    }

    let start = text[..offset]
        .char_indices()
        .rev()
        .take_while(|&(_, ch)| is_symbol_char(ch))
        .last()
        .map_or(offset, |(idx, _)| idx);
    let end = text[offset..]
        .char_indices()
        .find(|&(_, ch)| !is_symbol_char(ch))
        .map_or(text.len(), |(idx, _)| offset + idx);

    if start == end {
        return None;
    }
    Some(TextRange::new(
        TextSize::from(start as u32),
        TextSize::from(end as u32),
    ))
}
