//! Rendering diagnostics to text.
//!
//! Two styles: [`Style::Simple`] prints one `path:line:col: message` line per
//! diagnostic; [`Style::Pretty`] draws source windows with underlines,
//! sidebars, and footers, optionally colored with ANSI escapes.

mod pretty;
mod simple;

use std::io;

use crate::colors::Colors;
use crate::report::Report;
use crate::width::DEFAULT_TAB_STOP;

/// Rendering style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Style {
    #[default]
    Simple,
    Pretty,
}

/// Builder-pattern renderer for a [`Report`].
#[derive(Debug, Clone, Copy)]
pub struct Printer {
    style: Style,
    colors: Colors,
    tab_stop: usize,
}

impl Default for Printer {
    fn default() -> Self {
        Self::new()
    }
}

impl Printer {
    pub fn new() -> Self {
        Self {
            style: Style::Simple,
            colors: Colors::OFF,
            tab_stop: DEFAULT_TAB_STOP,
        }
    }

    pub fn pretty() -> Self {
        Self {
            style: Style::Pretty,
            ..Self::new()
        }
    }

    pub fn style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    pub fn colored(mut self, enabled: bool) -> Self {
        self.colors = Colors::new(enabled);
        self
    }

    pub fn tab_stop(mut self, tab_stop: usize) -> Self {
        self.tab_stop = tab_stop;
        self
    }

    /// Renders the whole report into a string.
    pub fn render(&self, report: &Report) -> String {
        let mut out = String::new();
        match self.style {
            Style::Simple => {
                for diag in report.iter() {
                    simple::render_diagnostic(diag, self.colors, &mut out);
                }
            }
            Style::Pretty => {
                for (i, diag) in report.iter().enumerate() {
                    if i > 0 {
                        out.push('\n');
                    }
                    pretty::render_diagnostic(diag, self.colors, self.tab_stop, &mut out);
                }
                if let Some(summary) = summary_line(report) {
                    if !report.is_empty() {
                        out.push('\n');
                    }
                    let c = self.colors;
                    out.push_str(&format!("{}{}{summary}{}\n", c.bold, c.red, c.reset));
                }
            }
        }
        out
    }

    /// Renders the report into any byte sink.
    pub fn emit(&self, report: &Report, out: &mut dyn io::Write) -> io::Result<()> {
        out.write_all(self.render(report).as_bytes())
    }
}

fn summary_line(report: &Report) -> Option<String> {
    let errors = report.error_count();
    let warnings = report.warning_count();
    match (errors, warnings) {
        (0, 0) => None,
        (e, 0) => Some(counted(e, "error")),
        (0, w) => Some(counted(w, "warning")),
        (e, w) => Some(format!("{}, {}", counted(e, "error"), counted(w, "warning"))),
    }
}

fn counted(n: usize, noun: &str) -> String {
    if n == 1 {
        format!("1 {noun}")
    } else {
        format!("{n} {noun}s")
    }
}
