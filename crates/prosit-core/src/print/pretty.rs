//! Multi-window diagnostic rendering.
//!
//! One header per diagnostic, one window per contiguous group of annotations
//! in the same file, underlines under single-line annotations, sidebar rails
//! for multi-line annotations, then footers and suggested-edit diffs.

use crate::colors::Colors;
use crate::report::{Diagnostic, Level, SuggestedEdits};
use crate::source::File;
use crate::width::{char_width, display_width, expand_tabs};

pub(super) fn level_color(level: Level, c: Colors) -> &'static str {
    match level {
        Level::Ice | Level::Error => c.red,
        Level::Warning => c.yellow,
        Level::Remark => c.cyan,
    }
}

pub(super) fn render_diagnostic(
    diag: &Diagnostic,
    colors: Colors,
    tab_stop: usize,
    out: &mut String,
) {
    let c = colors;
    let lc = level_color(diag.level(), c);

    out.push_str(c.bold);
    out.push_str(lc);
    out.push_str(&diag.level().to_string());
    if let Some(tag) = diag.tag() {
        out.push_str(&format!("[{tag}]"));
    }
    out.push_str(&format!("{}: {}{}{}\n", c.reset, c.bold, diag.message(), c.reset));

    let windows = windows(diag, tab_stop);
    if windows.is_empty()
        && let Some(path) = diag.in_file()
    {
        out.push_str(&format!("{}{} -->{} {path}\n", c.bold, c.blue, c.reset));
    }

    let mut gutter = 0;
    for (i, window) in windows.iter().enumerate() {
        gutter = gutter.max(render_window(window, diag.level(), c, tab_stop, i == 0, out));
    }

    let pad = " ".repeat(gutter);
    for note in diag.notes() {
        out.push_str(&format!("{pad} {}={} note: {note}\n", c.bold, c.reset));
    }
    for help in diag.helps() {
        out.push_str(&format!("{pad} {}={} help: {help}\n", c.bold, c.reset));
    }
    for debug in diag.debugs() {
        out.push_str(&format!("{pad} {}={} debug: {debug}\n", c.bold, c.reset));
    }

    for suggestion in diag.suggestions() {
        render_suggestion(suggestion, c, tab_stop, out);
    }
}

/// A resolved annotation: positions in lines and display columns.
#[derive(Debug, Clone)]
struct Ann {
    message: String,
    primary: bool,
    start_line: usize,
    end_line: usize,
    /// 0-based display column of the first byte on `start_line`.
    start_col0: usize,
    /// Single-line only: underline width in cells, at least 1.
    width: usize,
    /// 0-based display column just past the last char on `end_line`.
    end_col0: usize,
    /// Sidebar rail column, assigned to multi-line annotations per window.
    rail: usize,
}

impl Ann {
    fn is_multiline(&self) -> bool {
        self.start_line != self.end_line
    }
}

struct Window {
    file: File,
    anns: Vec<Ann>,
}

fn resolve(
    file: &File,
    span_start: usize,
    span_end: usize,
    message: &str,
    primary: bool,
    tab_stop: usize,
) -> Ann {
    let text = file.text();
    let sloc = file.location_with(span_start, tab_stop);
    let start_col0 = sloc.column - 1;

    // last char of the span, clamped back to a boundary
    let mut last = span_end.saturating_sub(1).max(span_start);
    while last > span_start && !text.is_char_boundary(last) {
        last -= 1;
    }
    let lloc = file.location_with(last, tab_stop);

    if sloc.line == lloc.line {
        let width = display_width(&text[span_start..span_end], start_col0, tab_stop).max(1);
        Ann {
            message: message.to_string(),
            primary,
            start_line: sloc.line,
            end_line: sloc.line,
            start_col0,
            width,
            end_col0: start_col0 + width,
            rail: 0,
        }
    } else {
        let last_col0 = lloc.column - 1;
        let last_width = text[last..span_end]
            .chars()
            .next()
            .map(|ch| char_width(ch, last_col0, tab_stop))
            .unwrap_or(1)
            .max(1);
        Ann {
            message: message.to_string(),
            primary,
            start_line: sloc.line,
            end_line: lloc.line,
            start_col0,
            width: 0,
            end_col0: last_col0 + last_width,
            rail: 0,
        }
    }
}

/// Groups annotations into per-file windows: primary's file first, then
/// first-appearance order; within a file a new window opens when the next
/// annotation starts more than two lines below the previous one.
fn windows(diag: &Diagnostic, tab_stop: usize) -> Vec<Window> {
    let mut files: Vec<File> = Vec::new();
    if let Some(primary) = diag.primary()
        && let Some(f) = primary.span.file()
    {
        files.push(f.clone());
    }
    for ann in diag.annotations() {
        if let Some(f) = ann.span.file()
            && !files.iter().any(|known| known.same_file(f))
        {
            files.push(f.clone());
        }
    }

    let mut windows = Vec::new();
    for file in files {
        let mut anns: Vec<Ann> = diag
            .annotations()
            .iter()
            .filter(|a| a.span.file().is_some_and(|f| f.same_file(&file)))
            .map(|a| {
                resolve(
                    &file,
                    a.span.start(),
                    a.span.end(),
                    &a.message,
                    a.primary,
                    tab_stop,
                )
            })
            .collect();
        anns.sort_by_key(|a| (a.start_line, a.start_col0, a.end_line));

        let mut current: Vec<Ann> = Vec::new();
        let mut last_line = 0usize;
        for ann in anns {
            if !current.is_empty() && ann.start_line > last_line + 2 {
                windows.push(Window {
                    file: file.clone(),
                    anns: std::mem::take(&mut current),
                });
            }
            last_line = last_line.max(ann.end_line);
            current.push(ann);
        }
        if !current.is_empty() {
            windows.push(Window {
                file: file.clone(),
                anns: current,
            });
        }
    }
    windows
}

/// Renders one window; returns the gutter width used, so footers align.
fn render_window(
    window: &Window,
    level: Level,
    c: Colors,
    tab_stop: usize,
    first: bool,
    out: &mut String,
) -> usize {
    let file = &window.file;
    let mut anns = window.anns.clone();

    let first_line = anns.iter().map(|a| a.start_line).min().unwrap();
    let last_line = anns.iter().map(|a| a.end_line).max().unwrap();
    let ctx_first = first_line.saturating_sub(1).max(1);
    let mut ctx_last = last_line;
    if last_line < file.line_count() && !file.line_text(last_line + 1).is_empty() {
        ctx_last = last_line + 1;
    }
    let gutter = digits(ctx_last);
    let pad = " ".repeat(gutter);

    // assign sidebar rails to multi-line annotations
    let mut rail_busy_until: Vec<usize> = Vec::new();
    for ann in anns.iter_mut().filter(|a| a.is_multiline()) {
        let rail = rail_busy_until
            .iter()
            .position(|&until| until < ann.start_line)
            .unwrap_or_else(|| {
                rail_busy_until.push(0);
                rail_busy_until.len() - 1
            });
        rail_busy_until[rail] = ann.end_line;
        ann.rail = rail;
    }
    let rails = rail_busy_until.len();

    // window header and its blank sidebar row
    let head = &anns[0];
    let arrow = if first { "-->" } else { ":::" };
    out.push_str(&format!(
        "{pad}{}{}{arrow}{} {}:{}:{}\n",
        c.bold,
        c.blue,
        c.reset,
        file.path(),
        head.start_line,
        head.start_col0 + 1,
    ));
    out.push_str(&format!("{pad}{}{} |{}\n", c.bold, c.blue, c.reset));

    // physical layout: `N | ` prefix covers columns 0..gutter+2, rails sit at
    // gutter+3+rail, source text starts at `base`
    let base = gutter + 3 + rails + usize::from(rails > 0);

    for line in ctx_first..=ctx_last {
        // source row: rails as cells, then the text verbatim so wide and
        // zero-width characters survive untouched
        let mut source_row = format!("{}{}{line:>gutter$} |{} ", c.bold, c.blue, c.reset);
        if rails > 0 {
            for rail in 0..rails {
                let cell = anns
                    .iter()
                    .filter(|a| a.is_multiline() && a.rail == rail)
                    .find_map(|a| {
                        if line == a.start_line {
                            Some(('/', marker_color(a, level, c)))
                        } else if a.start_line < line && line <= a.end_line {
                            Some(('|', marker_color(a, level, c)))
                        } else {
                            None
                        }
                    });
                match cell {
                    Some((ch, color)) if !color.is_empty() => {
                        source_row.push_str(&format!("{color}{ch}{}", c.reset));
                    }
                    Some((ch, _)) => source_row.push(ch),
                    None => source_row.push(' '),
                }
            }
            source_row.push(' ');
        }
        source_row.push_str(&expand_tabs(file.line_text(line), tab_stop));
        out.push_str(source_row.trim_end());
        out.push('\n');

        let singles: Vec<usize> = (0..anns.len())
            .filter(|&i| !anns[i].is_multiline() && anns[i].start_line == line)
            .collect();
        if !singles.is_empty() {
            underline_rows(&singles, &anns, line, gutter, base, level, c, out);
        }

        // closing rows for multi-line annotations ending here, inner rails first
        let mut closing: Vec<usize> = (0..anns.len())
            .filter(|&i| anns[i].is_multiline() && anns[i].end_line == line)
            .collect();
        closing.sort_by_key(|&i| std::cmp::Reverse(anns[i].rail));
        for i in closing {
            let ann = &anns[i];
            let color = marker_color(ann, level, c);
            let mut row = Row::new();
            for (j, other) in anns.iter().enumerate() {
                if j == i || !other.is_multiline() {
                    continue;
                }
                let still_open = other.start_line <= line
                    && (other.end_line > line
                        || (other.end_line == line && other.rail < ann.rail));
                if still_open {
                    row.put(gutter + 3 + other.rail, '|', marker_color(other, level, c));
                }
            }
            let marker_pos = base + ann.end_col0.saturating_sub(1);
            row.put(gutter + 3 + ann.rail, '|', color);
            for pos in (gutter + 3 + ann.rail + 1)..marker_pos {
                row.put(pos, '_', color);
            }
            row.put(marker_pos, marker(ann), color);
            if !ann.message.is_empty() {
                row.put_str(marker_pos + 2, &ann.message, color);
            }
            out.push_str(&format!("{pad}{}{} |{}", c.bold, c.blue, c.reset));
            row.emit_from(gutter + 2, c, out);
        }
    }

    gutter
}

#[allow(clippy::too_many_arguments)]
fn underline_rows(
    singles: &[usize],
    anns: &[Ann],
    line: usize,
    gutter: usize,
    base: usize,
    level: Level,
    c: Colors,
    out: &mut String,
) {
    let pad = " ".repeat(gutter);
    let rail_cells = |row: &mut Row| {
        for ann in anns.iter().filter(|a| a.is_multiline()) {
            if ann.start_line <= line && line <= ann.end_line {
                row.put(gutter + 3 + ann.rail, '|', marker_color(ann, level, c));
            }
        }
    };

    // marker row: widest underlines first so narrow ones stay visible on top
    let mut draw_order = singles.to_vec();
    draw_order.sort_by_key(|&i| std::cmp::Reverse(anns[i].width));
    let mut row = Row::new();
    rail_cells(&mut row);
    for &i in &draw_order {
        let ann = &anns[i];
        let color = marker_color(ann, level, c);
        for k in 0..ann.width {
            row.put(base + ann.start_col0 + k, marker(ann), color);
        }
    }

    // the rightmost labeled annotation goes inline after the last underline
    let rightmost_end = singles.iter().map(|&i| anns[i].end_col0).max().unwrap_or(0);
    let inline = singles
        .iter()
        .copied()
        .filter(|&i| !anns[i].message.is_empty())
        .max_by_key(|&i| anns[i].end_col0);
    if let Some(i) = inline {
        let ann = &anns[i];
        row.put_str(base + rightmost_end + 1, &ann.message, marker_color(ann, level, c));
    }
    out.push_str(&format!("{pad}{}{} |{}", c.bold, c.blue, c.reset));
    row.emit_from(gutter + 2, c, out);

    // remaining labels stack below, rightmost first, connected by risers
    let mut stacked: Vec<usize> = singles
        .iter()
        .copied()
        .filter(|&i| !anns[i].message.is_empty() && Some(i) != inline)
        .collect();
    stacked.sort_by_key(|&i| std::cmp::Reverse(anns[i].start_col0));
    if stacked.is_empty() {
        return;
    }

    let mut riser = Row::new();
    rail_cells(&mut riser);
    for &i in &stacked {
        let ann = &anns[i];
        riser.put(base + ann.start_col0, '|', marker_color(ann, level, c));
    }
    out.push_str(&format!("{pad}{}{} |{}", c.bold, c.blue, c.reset));
    riser.emit_from(gutter + 2, c, out);

    for (k, &i) in stacked.iter().enumerate() {
        let ann = &anns[i];
        let mut row = Row::new();
        rail_cells(&mut row);
        for &later in &stacked[k + 1..] {
            let other = &anns[later];
            row.put(base + other.start_col0, '|', marker_color(other, level, c));
        }
        row.put_str(base + ann.start_col0, &ann.message, marker_color(ann, level, c));
        out.push_str(&format!("{pad}{}{} |{}", c.bold, c.blue, c.reset));
        row.emit_from(gutter + 2, c, out);
    }
}

fn marker(ann: &Ann) -> char {
    if ann.primary { '^' } else { '-' }
}

fn marker_color(ann: &Ann, level: Level, c: Colors) -> &'static str {
    if ann.primary {
        level_color(level, c)
    } else {
        c.blue
    }
}

/// Renders a suggested fix as a removed/added line diff.
fn render_suggestion(suggestion: &SuggestedEdits, c: Colors, tab_stop: usize, out: &mut String) {
    let Some(file) = suggestion.span.file() else {
        return;
    };
    if suggestion.edits.is_empty() {
        out.push_str(&format!(
            "{}{}help:{} {}\n",
            c.bold, c.cyan, c.reset, suggestion.message
        ));
        return;
    }

    let text = file.text();
    let mut edits = suggestion.edits.clone();
    edits.sort_by_key(|e| (e.start, e.end));

    let lo = edits.iter().map(|e| e.start).min().unwrap();
    let hi = edits.iter().map(|e| e.end).max().unwrap();
    let mut new_text = text.to_string();
    for edit in edits.iter().rev() {
        new_text.replace_range(edit.start..edit.end, &edit.replace);
    }
    let delta = new_text.len() as isize - text.len() as isize;
    let mut new_hi = (hi as isize + delta).max(lo as isize) as usize;
    while new_hi < new_text.len() && !new_text.is_char_boundary(new_hi) {
        new_hi += 1;
    }

    let old_first = file.location_with(lo, tab_stop).line;
    let old_last = file.location_with(hi, tab_stop).line;
    let patched = File::new(file.path(), new_text);
    let new_last = patched.location_with(new_hi, tab_stop).line;
    let gutter = digits(old_last.max(new_last));
    let pad = " ".repeat(gutter);

    out.push_str(&format!(
        "{}{}help:{} {}\n",
        c.bold, c.cyan, c.reset, suggestion.message
    ));
    out.push_str(&format!("{pad}{}{} |{}\n", c.bold, c.blue, c.reset));
    for line in old_first..=old_last {
        out.push_str(&format!(
            "{}{}{line:>gutter$} -{} {}\n",
            c.bold,
            c.red,
            c.reset,
            expand_tabs(file.line_text(line), tab_stop)
        ));
    }
    for line in old_first..=new_last {
        out.push_str(&format!(
            "{}{}{line:>gutter$} +{} {}\n",
            c.bold,
            c.green,
            c.reset,
            expand_tabs(patched.line_text(line), tab_stop)
        ));
    }
    out.push_str(&format!("{pad}{}{} |{}\n", c.bold, c.blue, c.reset));
}

fn digits(mut n: usize) -> usize {
    let mut d = 1;
    while n >= 10 {
        n /= 10;
        d += 1;
    }
    d
}

/// A physical output row addressed by display column, with per-cell color.
struct Row {
    cells: Vec<(char, &'static str)>,
}

impl Row {
    fn new() -> Self {
        Self { cells: Vec::new() }
    }

    fn put(&mut self, pos: usize, ch: char, color: &'static str) {
        if self.cells.len() <= pos {
            self.cells.resize(pos + 1, (' ', ""));
        }
        self.cells[pos] = (ch, color);
    }

    fn put_str(&mut self, pos: usize, text: &str, color: &'static str) {
        for (i, ch) in text.chars().enumerate() {
            self.put(pos + i, ch, color);
        }
    }

    /// Emits cells from `from` onward (earlier columns are covered by the
    /// gutter prefix), trimming trailing blanks.
    fn emit_from(&self, from: usize, c: Colors, out: &mut String) {
        let mut end = self.cells.len();
        while end > from && self.cells[end - 1] == (' ', "") {
            end -= 1;
        }
        let cells = if from < end { &self.cells[from..end] } else { &[][..] };
        let mut current = "";
        for (ch, color) in cells {
            if *color != current {
                if !current.is_empty() {
                    out.push_str(c.reset);
                }
                if !color.is_empty() {
                    out.push_str(color);
                }
                current = color;
            }
            out.push(*ch);
        }
        if !current.is_empty() {
            out.push_str(c.reset);
        }
        out.push('\n');
    }
}
