//! Display-column measurement.
//!
//! Columns are what a terminal draws, not what the byte stream stores: tabs
//! advance to the next multiple of the tab stop, East Asian wide characters
//! take two cells, combining marks take none.

use unicode_width::UnicodeWidthChar;

/// Default tab stop used by location queries and the printer.
pub const DEFAULT_TAB_STOP: usize = 4;

/// Width of `c` when drawn at 0-based display column `col`.
pub fn char_width(c: char, col: usize, tab_stop: usize) -> usize {
    if c == '\t' {
        tab_stop - col % tab_stop
    } else {
        UnicodeWidthChar::width(c).unwrap_or(0)
    }
}

/// Display width of `text` when drawing starts at 0-based column `start_col`.
pub fn display_width(text: &str, start_col: usize, tab_stop: usize) -> usize {
    let mut col = start_col;
    for c in text.chars() {
        col += char_width(c, col, tab_stop);
    }
    col - start_col
}

/// Returns `line` with every tab replaced by spaces up to the next tab stop.
pub fn expand_tabs(line: &str, tab_stop: usize) -> String {
    let mut out = String::with_capacity(line.len());
    let mut col = 0;
    for c in line.chars() {
        if c == '\t' {
            let n = tab_stop - col % tab_stop;
            for _ in 0..n {
                out.push(' ');
            }
            col += n;
        } else {
            out.push(c);
            col += UnicodeWidthChar::width(c).unwrap_or(0);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tabs_advance_to_next_stop() {
        assert_eq!(char_width('\t', 0, 4), 4);
        assert_eq!(char_width('\t', 1, 4), 3);
        assert_eq!(char_width('\t', 3, 4), 1);
        assert_eq!(char_width('\t', 4, 4), 4);
    }

    #[test]
    fn wide_and_zero_width() {
        assert_eq!(char_width('a', 0, 4), 1);
        assert_eq!(char_width('語', 0, 4), 2);
        // combining acute accent
        assert_eq!(char_width('\u{0301}', 0, 4), 0);
    }

    #[test]
    fn display_width_mixes_tabs_and_text() {
        assert_eq!(display_width("ab\tc", 0, 4), 5);
        assert_eq!(display_width("\t", 2, 4), 2);
        assert_eq!(display_width("語x", 0, 4), 3);
    }

    #[test]
    fn expand_tabs_matches_width() {
        assert_eq!(expand_tabs("a\tb", 4), "a   b");
        assert_eq!(expand_tabs("\t\t", 4), "        ");
        assert_eq!(expand_tabs("no tabs", 4), "no tabs");
    }
}
