//! Source positions: line/column pairs and file-qualified locations.

use std::fmt;
use std::ops::RangeInclusive;

use super::file_id::{FileId, FileRegistry};

// Re-export from text-size for compatibility
pub use text_size::TextRange;
pub use text_size::TextSize;

/// Zero-based line and byte column inside one file.
///
/// Shown one-based (`line:col`), the way compilers print positions.
/// Ordered by line, then column.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LineCol {
    pub line: u32,
    /// UTF-8 bytes from the start of the line.
    pub col: u32,
}

impl LineCol {
    pub const MAX: LineCol = LineCol::new(u32::MAX, u32::MAX);

    #[inline]
    pub const fn new(line: u32, col: u32) -> Self {
        Self { line, col }
    }

    /// From the one-based form diagnostics print. A 0 is read as 1.
    #[inline]
    pub const fn from_one_indexed(line: u32, col: u32) -> Self {
        Self::new(line.saturating_sub(1), col.saturating_sub(1))
    }
}

impl fmt::Display for LineCol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", u64::from(self.line) + 1, u64::from(self.col) + 1)
    }
}

impl fmt::Debug for LineCol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

/// A position inside a named file.
///
/// Every index of the cross-reference store is keyed by `Location`.
/// Locations order by file id first and by position within the file
/// second, so all locations of one file form a contiguous range of an
/// ordered map (see [`Location::file_range`]).
///
/// [`Location::NULL`] (file id 0) stands for "no result".
#[derive(Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Location {
    file: FileId,
    pos: LineCol,
}

impl Location {
    pub const NULL: Location = Location {
        file: FileId::NULL,
        pos: LineCol::new(0, 0),
    };

    #[inline]
    pub const fn new(file: FileId, line: u32, col: u32) -> Self {
        Self {
            file,
            pos: LineCol::new(line, col),
        }
    }

    #[inline]
    pub const fn at(file: FileId, pos: LineCol) -> Self {
        Self { file, pos }
    }

    #[inline]
    pub const fn file(self) -> FileId {
        self.file
    }

    #[inline]
    pub const fn line_col(self) -> LineCol {
        self.pos
    }

    #[inline]
    pub const fn line(self) -> u32 {
        self.pos.line
    }

    #[inline]
    pub const fn col(self) -> u32 {
        self.pos.col
    }

    #[inline]
    pub const fn is_null(self) -> bool {
        self.file.is_null()
    }

    /// All locations that belong to `file`, as an inclusive range usable
    /// with `BTreeMap::range`.
    pub fn file_range(file: FileId) -> RangeInclusive<Location> {
        Location::at(file, LineCol::new(0, 0))..=Location::at(file, LineCol::MAX)
    }

    /// Render as `path:line:col` using the registry, or `None` if the
    /// file id does not resolve.
    pub fn display_with(self, registry: &dyn FileRegistry) -> Option<String> {
        let path = registry.path(self.file)?;
        Some(format!("{}:{}", path.display(), self.pos))
    }
}

impl fmt::Debug for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            return f.write_str("Location(null)");
        }
        write!(f, "Location({}:{})", self.file.index(), self.pos)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.pos)
    }
}

/// Line starts of one file's text, for turning the byte offsets a
/// front-end reports into [`LineCol`]s and back.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LineIndex {
    /// First byte of every line; `line_starts[0]` is always 0.
    line_starts: Vec<TextSize>,
    end: TextSize,
}

impl LineIndex {
    pub fn new(text: &str) -> Self {
        let line_starts = std::iter::once(TextSize::from(0))
            .chain(
                text.match_indices('\n')
                    .map(|(newline, _)| TextSize::from(newline as u32 + 1)),
            )
            .collect();
        Self {
            line_starts,
            end: TextSize::of(text),
        }
    }

    /// Position of `offset`. Offsets past the end of the text are clamped.
    pub fn line_col(&self, offset: TextSize) -> LineCol {
        let offset = offset.min(self.end);
        let line = self
            .line_starts
            .partition_point(|&start| start <= offset)
            .saturating_sub(1);
        let col = offset - self.line_starts[line];
        LineCol::new(line as u32, col.into())
    }

    /// Byte offset of `pos`.
    ///
    /// `None` when the line does not exist or the column runs past the end
    /// of its line (the newline itself is the last valid column).
    pub fn offset(&self, pos: LineCol) -> Option<TextSize> {
        let line = usize::try_from(pos.line).ok()?;
        let start = *self.line_starts.get(line)?;
        let line_end = self
            .line_starts
            .get(line + 1)
            .map_or(self.end, |&next| next - TextSize::from(1));
        start
            .checked_add(TextSize::from(pos.col))
            .filter(|&offset| offset <= line_end)
    }

    /// Build a [`Location`] in `file` from a byte offset.
    pub fn location(&self, file: FileId, offset: TextSize) -> Location {
        Location::at(file, self.line_col(offset))
    }

    /// Number of lines. Empty text has one.
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Length of the indexed text.
    pub fn text_len(&self) -> TextSize {
        self.end
    }
}
