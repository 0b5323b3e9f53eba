use indoc::indoc;

use crate::print::Printer;
use crate::report::{Edit, Report, tags};
use crate::source::File;

#[test]
fn simple_style_is_one_line_per_diagnostic() {
    let file = File::new("foo.proto", "syntax = \"proto2\";\n");
    let mut report = Report::new();
    report
        .error("unexpected token")
        .snippet(file.span(0, 6), "here")
        .tag(tags::UNRECOGNIZED_TOKEN)
        .emit();
    report.warning("whole-file warning").in_file("bar.proto").emit();
    report.remark("free-floating remark").emit();

    let out = Printer::new().render(&report);
    insta::assert_snapshot!(out, @r"
    foo.proto:1:1: error[unrecognized-token]: unexpected token
    bar.proto: warning: whole-file warning
    remark: free-floating remark
    ");
}

#[test]
fn pretty_single_annotation() {
    let file = File::new("foo.proto", "message M {");
    let mut report = Report::new();
    report
        .error("delimiter is never closed")
        .snippet(file.span(10, 11), "never closed")
        .tag(tags::UNCLOSED_DELIMITER)
        .emit();

    let out = Printer::pretty().render(&report);
    assert_eq!(
        out,
        indoc! {"
            error[unclosed-delimiter]: delimiter is never closed
             --> foo.proto:1:11
              |
            1 | message M {
              |           ^ never closed

            1 error
        "}
    );
}

#[test]
fn pretty_stacks_labels_on_one_line() {
    let file = File::new("foo.proto", "x = 1;");
    let mut report = Report::new();
    report
        .error("bad field")
        .snippet(file.span(0, 1), "name")
        .snippet(file.span(4, 5), "value")
        .emit();

    let out = Printer::pretty().render(&report);
    assert_eq!(
        out,
        indoc! {"
            error: bad field
             --> foo.proto:1:1
              |
            1 | x = 1;
              | ^   - value
              | |
              | name

            1 error
        "}
    );
}

#[test]
fn pretty_draws_multiline_sidebar() {
    let file = File::new("foo.proto", "message M {\n  int32 x = 1;\n}\n");
    let mut report = Report::new();
    report
        .error("message spans lines")
        .snippet(file.span(0, 28), "whole message")
        .emit();

    let out = Printer::pretty().render(&report);
    assert_eq!(
        out,
        indoc! {"
            error: message spans lines
             --> foo.proto:1:1
              |
            1 | / message M {
            2 | |   int32 x = 1;
            3 | | }
              | |_^ whole message

            1 error
        "}
    );
}

#[test]
fn pretty_whole_file_diagnostic_with_footers() {
    let mut report = Report::new();
    report
        .warning("something odd")
        .in_file("bar.proto")
        .note("a note")
        .help("try again")
        .emit();

    let out = Printer::pretty().render(&report);
    assert_eq!(
        out,
        indoc! {"
            warning: something odd
             --> bar.proto
             = note: a note
             = help: try again

            1 warning
        "}
    );
}

#[test]
fn pretty_renders_suggested_edits_as_diff() {
    let file = File::new("a.proto", "x = 1;\n");
    let mut report = Report::new();
    report
        .error("bad value")
        .snippet(file.span(4, 5), "not allowed")
        .suggest_edits(file.span(4, 5), "use 2", [Edit::new(4, 5, "2")])
        .emit();

    let out = Printer::pretty().render(&report);
    assert_eq!(
        out,
        indoc! {"
            error: bad value
             --> a.proto:1:5
              |
            1 | x = 1;
              |     ^ not allowed
            help: use 2
              |
            1 - x = 1;
            1 + x = 2;
              |

            1 error
        "}
    );
}

#[test]
fn pretty_splits_windows_and_files() {
    let a = File::new("a.proto", "aaa\n");
    let b = File::new("b.proto", "bbb\n");
    let mut report = Report::new();
    report
        .error("clash")
        .snippet(a.span(0, 3), "first")
        .snippet(b.span(0, 3), "second")
        .emit();

    let out = Printer::pretty().render(&report);
    assert_eq!(
        out,
        indoc! {"
            error: clash
             --> a.proto:1:1
              |
            1 | aaa
              | ^^^ first
             ::: b.proto:1:1
              |
            1 | bbb
              | --- second

            1 error
        "}
    );
}

#[test]
fn pretty_expands_tabs_in_source_and_columns() {
    let file = File::new("foo.proto", "\tmessage");
    let mut report = Report::new();
    report
        .error("indented")
        .snippet(file.span(1, 8), "the keyword")
        .emit();

    let out = Printer::pretty().render(&report);
    assert_eq!(
        out,
        indoc! {"
            error: indented
             --> foo.proto:1:5
              |
            1 |     message
              |     ^^^^^^^ the keyword

            1 error
        "}
    );
}

#[test]
fn pretty_includes_context_lines() {
    let file = File::new("foo.proto", "before\nbad line\nafter");
    let mut report = Report::new();
    report
        .error("context check")
        .snippet(file.span(7, 10), "here")
        .emit();

    let out = Printer::pretty().render(&report);
    assert_eq!(
        out,
        indoc! {"
            error: context check
             --> foo.proto:2:1
              |
            1 | before
            2 | bad line
              | ^^^ here
            3 | after

            1 error
        "}
    );
}

#[test]
fn summary_counts_errors_and_warnings() {
    let file = File::new("foo.proto", "abcdef");
    let mut report = Report::new();
    report.error("one").snippet(file.span(0, 1), "").emit();
    report.error("two").snippet(file.span(1, 2), "").emit();
    report.warning("three").snippet(file.span(2, 3), "").emit();

    let out = Printer::pretty().render(&report);
    assert!(out.ends_with("\n2 errors, 1 warning\n"), "got: {out}");
}

#[test]
fn empty_report_renders_nothing() {
    let report = Report::new();
    assert_eq!(Printer::pretty().render(&report), "");
    assert_eq!(Printer::new().render(&report), "");
}

#[test]
fn colored_output_uses_ansi_escapes() {
    let file = File::new("foo.proto", "abc");
    let mut report = Report::new();
    report.error("colored").snippet(file.span(0, 1), "here").emit();

    let out = Printer::pretty().colored(true).render(&report);
    assert!(out.contains("\x1b[31m"), "level color missing: {out:?}");
    assert!(out.contains("\x1b[0m"));

    let plain = Printer::pretty().render(&report);
    assert!(!plain.contains('\x1b'));
}
