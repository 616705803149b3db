// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Byte offset to line/column mapping.

/// A 0-based line and column. Columns count UTF-8 bytes from line start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Position {
    /// 0-based line number.
    pub line: u32,
    /// 0-based byte column.
    pub column: u32,
}

impl Position {
    /// Creates a new position.
    #[must_use]
    pub const fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line + 1, self.column + 1)
    }
}

/// Line start offsets for one source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineIndex {
    line_starts: Vec<u32>,
    len: u32,
}

impl LineIndex {
    /// Builds the index for `source`.
    #[must_use]
    #[expect(
        clippy::cast_possible_truncation,
        reason = "source files over 4GB are not supported"
    )]
    pub fn new(source: &str) -> Self {
        let mut line_starts = vec![0];
        line_starts.extend(
            source
                .bytes()
                .enumerate()
                .filter(|&(_, b)| b == b'\n')
                .map(|(i, _)| (i + 1) as u32),
        );
        Self {
            line_starts,
            len: source.len() as u32,
        }
    }

    /// Number of lines (a trailing newline starts an empty final line).
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Converts a byte offset to a position. Offsets past the end clamp to
    /// the end of the text.
    #[must_use]
    #[expect(
        clippy::cast_possible_truncation,
        reason = "line count is bounded by the u32 source length"
    )]
    pub fn position(&self, offset: u32) -> Position {
        let offset = offset.min(self.len);
        let line = self
            .line_starts
            .partition_point(|&start| start <= offset)
            .saturating_sub(1);
        Position::new(line as u32, offset - self.line_starts[line])
    }

    /// Converts a position back to a byte offset, or `None` if the line does
    /// not exist.
    #[must_use]
    pub fn offset(&self, position: Position) -> Option<u32> {
        let start = *self.line_starts.get(position.line as usize)?;
        Some((start + position.column).min(self.len))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_offsets_to_positions() {
        let index = LineIndex::new("ab\ncd\n\nx");
        assert_eq!(index.line_count(), 4);
        assert_eq!(index.position(0), Position::new(0, 0));
        assert_eq!(index.position(2), Position::new(0, 2));
        assert_eq!(index.position(3), Position::new(1, 0));
        assert_eq!(index.position(6), Position::new(2, 0));
        assert_eq!(index.position(7), Position::new(3, 0));
        assert_eq!(index.position(99), Position::new(3, 1));
    }

    #[test]
    fn maps_positions_back() {
        let index = LineIndex::new("ab\ncd");
        assert_eq!(index.offset(Position::new(1, 1)), Some(4));
        assert_eq!(index.offset(Position::new(5, 0)), None);
    }

    #[test]
    fn display_is_one_based() {
        assert_eq!(Position::new(0, 4).to_string(), "1:5");
    }
}
