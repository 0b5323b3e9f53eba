//! Per-file line table.
//!
//! Built once per file by a single scan, then shared read-only. Two parallel
//! prefix arrays record, for each line, the byte offset and the UTF-16
//! code-unit offset of its first character.

#[derive(Debug)]
pub(crate) struct LineIndex {
    /// Byte offset of the first character of each line. `line_starts[0] == 0`.
    line_starts: Vec<u32>,
    /// UTF-16 code-unit offset of the first character of each line.
    utf16_starts: Vec<u32>,
}

impl LineIndex {
    pub(crate) fn build(text: &str) -> Self {
        let mut line_starts = vec![0u32];
        let mut utf16_starts = vec![0u32];
        let mut utf16 = 0u32;
        for (i, c) in text.char_indices() {
            utf16 += c.len_utf16() as u32;
            if c == '\n' {
                line_starts.push((i + 1) as u32);
                utf16_starts.push(utf16);
            }
        }
        Self {
            line_starts,
            utf16_starts,
        }
    }

    /// 0-based line containing byte `offset`. An offset at `len(text)` maps
    /// to the last line.
    pub(crate) fn line_of(&self, offset: usize) -> usize {
        self.line_starts
            .partition_point(|&start| start as usize <= offset)
            - 1
    }

    /// Byte offset of the first character of 0-based `line`.
    pub(crate) fn line_start(&self, line: usize) -> usize {
        self.line_starts[line] as usize
    }

    /// UTF-16 code-unit offset of the start of 0-based `line`.
    pub(crate) fn utf16_line_start(&self, line: usize) -> usize {
        self.utf16_starts[line] as usize
    }

    /// Number of lines. A trailing newline opens a final empty line.
    pub(crate) fn line_count(&self) -> usize {
        self.line_starts.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_text_has_one_line() {
        let index = LineIndex::build("");
        assert_eq!(index.line_count(), 1);
        assert_eq!(index.line_of(0), 0);
    }

    #[test]
    fn line_of_brackets_newlines() {
        let index = LineIndex::build("ab\ncd\n");
        assert_eq!(index.line_count(), 3);
        assert_eq!(index.line_of(0), 0);
        assert_eq!(index.line_of(2), 0);
        assert_eq!(index.line_of(3), 1);
        assert_eq!(index.line_of(5), 1);
        assert_eq!(index.line_of(6), 2);
        assert_eq!(index.line_start(1), 3);
    }

    #[test]
    fn utf16_starts_count_code_units() {
        // '𝄞' is one code point, two UTF-16 units, four UTF-8 bytes.
        let index = LineIndex::build("𝄞\nx");
        assert_eq!(index.utf16_line_start(0), 0);
        assert_eq!(index.utf16_line_start(1), 3);
        assert_eq!(index.line_start(1), 5);
    }
}
