//! Stack capture for classified errors and recovered panics.
//!
//! `std::backtrace::Backtrace` does not expose frames on stable, so the
//! rendered backtrace is parsed back into `{function, file, line}` triples.

use std::backtrace::Backtrace;
use std::fmt;

use serde::Serialize;

/// Default number of frames kept for a classified error.
pub const DEFAULT_DEPTH: usize = 10;

/// Frames belonging to the capture machinery itself.
const SKIPPED_PREFIXES: &[&str] = &[
    "std::backtrace",
    "std::backtrace_rs",
    "backtrace::",
    "mediary::error::stack::",
    "mediary::error::AppError::",
    "mediary::resilience::fault_boundary::install_panic_hook",
    "std::panicking::",
    "core::panicking::",
    "std::sys::backtrace::",
];

/// Machinery frames whose symbols carry a varying path or generic prefix.
const SKIPPED_FRAGMENTS: &[&str] = &["rust_begin_unwind", "PanicHookInfo"];

fn is_machinery(function: &str) -> bool {
    SKIPPED_PREFIXES
        .iter()
        .any(|prefix| function.starts_with(prefix))
        || SKIPPED_FRAGMENTS
            .iter()
            .any(|fragment| function.contains(fragment))
}

/// A single resolved stack frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StackFrame {
    pub function: String,
    pub file: String,
    pub line: u32,
}

/// An ordered list of frames, innermost first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct StackTrace {
    frames: Vec<StackFrame>,
}

impl StackTrace {
    /// Capture the caller's stack, keeping at most `depth` frames.
    #[inline(never)]
    pub fn capture(depth: usize) -> Self {
        Self::from_backtrace(&Backtrace::force_capture(), depth)
    }

    /// Convert an already captured backtrace.
    pub fn from_backtrace(backtrace: &Backtrace, depth: usize) -> Self {
        Self::parse(&backtrace.to_string(), depth)
    }

    /// Parse the textual rendering of a `std::backtrace::Backtrace`.
    pub fn parse(rendered: &str, depth: usize) -> Self {
        let frames = parse_frames(rendered)
            .into_iter()
            .filter(|frame| !is_machinery(&frame.function))
            .take(depth)
            .collect();
        Self { frames }
    }

    pub fn frames(&self) -> &[StackFrame] {
        &self.frames
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }
}

impl fmt::Display for StackTrace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for frame in &self.frames {
            writeln!(f, "{}\n\t{}:{}", frame.function, frame.file, frame.line)?;
        }
        Ok(())
    }
}

fn parse_frames(rendered: &str) -> Vec<StackFrame> {
    let mut frames: Vec<StackFrame> = Vec::new();

    for line in rendered.lines() {
        let trimmed = line.trim();

        if let Some(location) = trimmed.strip_prefix("at ") {
            if let Some(frame) = frames.last_mut() {
                if frame.line == 0 {
                    let (file, line_no) = split_location(location);
                    frame.file = file;
                    frame.line = line_no;
                }
            }
            continue;
        }

        // "  12: some::function"
        let Some((index, function)) = trimmed.split_once(": ") else {
            continue;
        };
        if index.is_empty() || !index.bytes().all(|b| b.is_ascii_digit()) {
            continue;
        }

        frames.push(StackFrame {
            function: function.to_string(),
            file: "<unknown>".to_string(),
            line: 0,
        });
    }

    frames
}

/// Split `path/to/file.rs:12:5` into the path and the line number.
fn split_location(location: &str) -> (String, u32) {
    let mut parts = location.rsplitn(3, ':');
    let column = parts.next();
    let line = parts.next();
    let file = parts.next();

    match (file, line, column) {
        (Some(file), Some(line), Some(_)) => match line.parse() {
            Ok(line) => (file.to_string(), line),
            Err(_) => (location.to_string(), 0),
        },
        _ => (location.to_string(), 0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RENDERED: &str = "   0: std::backtrace_rs::backtrace::libunwind::trace
             at /rustc/abc/library/std/src/../../backtrace/src/backtrace/libunwind.rs:116:5
   1: std::backtrace::Backtrace::create
             at /rustc/abc/library/std/src/backtrace.rs:331:13
   2: mediary::error::stack::StackTrace::capture
             at ./src/error/stack.rs:41:28
   3: mediary::error::AppError::new
             at ./src/error/mod.rs:90:20
   4: mediary::config::loader::load_config
             at ./src/config/loader.rs:40:9
   5: mediary::lifecycle::startup::run::{{closure}}
             at ./src/lifecycle/startup.rs:55:18
   6: main
";

    #[test]
    fn parse_drops_capture_frames() {
        let stack = StackTrace::parse(RENDERED, DEFAULT_DEPTH);
        assert_eq!(stack.len(), 3);
        assert_eq!(
            stack.frames()[0],
            StackFrame {
                function: "mediary::config::loader::load_config".into(),
                file: "./src/config/loader.rs".into(),
                line: 40,
            }
        );
        assert_eq!(stack.frames()[2].function, "main");
        assert_eq!(stack.frames()[2].file, "<unknown>");
    }

    const PANIC_RENDERED: &str = "   0: mediary::resilience::fault_boundary::install_panic_hook::{{closure}}
             at ./src/resilience/fault_boundary.rs:131:57
   1: <alloc::boxed::Box<dyn for<'a, 'b> core::ops::function::Fn<(&'a std::panic::PanicHookInfo<'b>,)> + core::marker::Sync + core::marker::Send> as core::ops::function::Fn<(&std::panic::PanicHookInfo,)>>::call
             at /rustc/abc/library/alloc/src/boxed.rs:1985:9
   2: std::panicking::rust_panic_with_hook
             at /rustc/abc/library/std/src/panicking.rs:841:13
   3: __rustc::rust_begin_unwind
             at /rustc/abc/library/std/src/panicking.rs:697:5
   4: core::panicking::panic_fmt
             at /rustc/abc/library/core/src/panicking.rs:75:14
   5: mediary::http::handlers::simulate_panic::{{closure}}
             at ./src/http/handlers.rs:12:5
";

    #[test]
    fn parse_drops_panic_machinery() {
        let stack = StackTrace::parse(PANIC_RENDERED, DEFAULT_DEPTH);
        assert_eq!(stack.len(), 1);
        assert_eq!(
            stack.frames()[0].function,
            "mediary::http::handlers::simulate_panic::{{closure}}"
        );
    }

    #[test]
    fn parse_respects_depth() {
        let stack = StackTrace::parse(RENDERED, 1);
        assert_eq!(stack.len(), 1);
    }

    #[test]
    fn parse_of_disabled_backtrace_is_empty() {
        let stack = StackTrace::parse("disabled backtrace", DEFAULT_DEPTH);
        assert!(stack.is_empty());
    }

    #[test]
    fn display_matches_frame_layout() {
        let stack = StackTrace::parse(RENDERED, 1);
        assert_eq!(
            stack.to_string(),
            "mediary::config::loader::load_config\n\t./src/config/loader.rs:40\n"
        );
    }

    #[test]
    fn capture_is_bounded() {
        let stack = StackTrace::capture(4);
        assert!(stack.len() <= 4);
        assert!(stack
            .frames()
            .iter()
            .all(|f| !f.function.starts_with("std::backtrace")));
    }
}
