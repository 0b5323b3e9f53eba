//! Single-line diagnostic rendering.

use crate::colors::Colors;
use crate::report::Diagnostic;

/// Renders `path:line:col: level[tag]: message`, degrading gracefully when
/// the diagnostic has no annotation.
pub(super) fn render_diagnostic(diag: &Diagnostic, colors: Colors, out: &mut String) {
    let c = colors;
    match diag.primary() {
        Some(ann) if !ann.span.is_zero() => {
            let file = ann.span.file().expect("non-zero span has a file");
            let loc = ann.span.start_loc().expect("non-zero span has a location");
            out.push_str(&format!(
                "{}:{}:{}: ",
                file.path(),
                loc.line,
                loc.column
            ));
        }
        _ => {
            if let Some(path) = diag.in_file() {
                out.push_str(&format!("{path}: "));
            }
        }
    }
    out.push_str(&format!("{}{}{}", c.bold, super::pretty::level_color(diag.level(), c), diag.level()));
    if let Some(tag) = diag.tag() {
        out.push_str(&format!("[{tag}]"));
    }
    out.push_str(&format!(":{} {}\n", c.reset, diag.message()));
}
