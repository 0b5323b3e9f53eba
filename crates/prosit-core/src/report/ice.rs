//! Panic capture for internal compiler errors.
//!
//! [`Report::catch_ice`] wraps a compiler phase: a panic inside the closure
//! becomes an ICE-level diagnostic carrying the panic message and a cleaned
//! stack trace, and is optionally re-raised afterwards. The installed panic
//! hook is process-global but only intercepts panics on threads that are
//! currently inside a guard; everything else falls through to the previous
//! hook.

use std::any::Any;
use std::backtrace::Backtrace;
use std::cell::{Cell, RefCell};
use std::panic::{self, AssertUnwindSafe};
use std::sync::Once;

use super::{Diagnostic, Level, Report};

thread_local! {
    static GUARD_DEPTH: Cell<u32> = const { Cell::new(0) };
    static PANIC_TRACE: RefCell<Option<String>> = const { RefCell::new(None) };
}

fn install_hook() {
    static INSTALLED: Once = Once::new();
    INSTALLED.call_once(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            if GUARD_DEPTH.with(Cell::get) > 0 {
                let trace = Backtrace::force_capture().to_string();
                PANIC_TRACE.with(|slot| *slot.borrow_mut() = Some(trace));
            } else {
                previous(info);
            }
        }));
    });
}

impl Report {
    /// Runs `body`, converting a panic into an ICE-level diagnostic.
    ///
    /// Returns `Some` with the closure's value on success and `None` when a
    /// panic was recorded. With `resume_panic` the panic is re-raised after
    /// being recorded, for callers that still want the process to die.
    pub fn catch_ice<T>(
        &mut self,
        resume_panic: bool,
        body: impl FnOnce(&mut Report) -> T,
    ) -> Option<T> {
        self.catch_ice_with(resume_panic, |_| {}, body)
    }

    /// Like [`Report::catch_ice`], with a hook that may decorate the ICE
    /// diagnostic (extra notes, context) before it is recorded.
    pub fn catch_ice_with<T>(
        &mut self,
        resume_panic: bool,
        decorate: impl FnOnce(&mut Diagnostic),
        body: impl FnOnce(&mut Report) -> T,
    ) -> Option<T> {
        install_hook();

        GUARD_DEPTH.with(|d| d.set(d.get() + 1));
        let result = panic::catch_unwind(AssertUnwindSafe(|| body(self)));
        GUARD_DEPTH.with(|d| d.set(d.get() - 1));

        match result {
            Ok(value) => Some(value),
            Err(payload) => {
                let trace = PANIC_TRACE.with(|slot| slot.borrow_mut().take());
                let mut diag =
                    Diagnostic::new(Level::Ice, payload_message(payload.as_ref()), self.stage);
                for line in trace.as_deref().map(clean_trace).unwrap_or_default() {
                    diag.debugs.push(line);
                }
                decorate(&mut diag);
                self.push(diag);
                if resume_panic {
                    panic::resume_unwind(payload);
                }
                None
            }
        }
    }
}

fn payload_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

/// Maximum frames kept in a cleaned trace.
const MAX_FRAMES: usize = 32;

/// Drops panic machinery and this module's own frames from a raw backtrace,
/// keeping `symbol` + `at file:line` pairs.
fn clean_trace(raw: &str) -> Vec<String> {
    let mut frames = Vec::new();
    let mut lines = raw.lines().peekable();
    while let Some(line) = lines.next() {
        let trimmed = line.trim_start();
        let Some(rest) = frame_symbol(trimmed) else {
            continue;
        };
        if is_internal_frame(rest) {
            // also swallow the frame's `at` line
            if lines.peek().is_some_and(|l| l.trim_start().starts_with("at ")) {
                lines.next();
            }
            continue;
        }
        let mut frame = format!("stack: {rest}");
        if let Some(at) = lines.peek().map(|l| l.trim_start())
            && at.starts_with("at ")
        {
            frame.push_str(&format!(" ({})", &at[3..]));
            lines.next();
        }
        frames.push(frame);
        if frames.len() >= MAX_FRAMES {
            break;
        }
    }
    frames
}

/// Parses `N: symbol` frame lines; returns the symbol.
fn frame_symbol(line: &str) -> Option<&str> {
    let (index, rest) = line.split_once(": ")?;
    if index.bytes().all(|b| b.is_ascii_digit()) && !index.is_empty() {
        Some(rest)
    } else {
        None
    }
}

/// Frames that belong to the capture plumbing, not to the phase that died.
fn is_internal_frame(symbol: &str) -> bool {
    const INTERNAL: &[&str] = &[
        "std::panicking",
        "core::panicking",
        "std::panic",
        "std::sys",
        "std::backtrace",
        "rust_begin_unwind",
        "catch_ice",
        "prosit_core::report::ice",
        "__rust_",
    ];
    INTERNAL.iter().any(|m| symbol.contains(m))
}

/// Captures the current stack for diagnostic tracing, keeping up to `depth`
/// user frames.
pub(super) fn capture_frames(depth: usize) -> Vec<String> {
    let raw = Backtrace::force_capture().to_string();
    let mut frames = clean_trace(&raw);
    frames.truncate(depth);
    frames
}
