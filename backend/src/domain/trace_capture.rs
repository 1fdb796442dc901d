//! Stack trace capture strategies for diagnostic errors.
//!
//! A [`TraceCapturer`] is chosen once, when configuration is loaded, and
//! handed to the adapters that construct errors. Capture is best effort: a
//! capturer may return `None` and callers must cope with a missing trace.

use std::backtrace::{Backtrace, BacktraceStatus};
use std::fmt;
use std::panic::Location;
use std::str::FromStr;
use std::sync::Arc;

use thiserror::Error;

/// Leading frames containing any of these belong to the capture machinery or
/// the error constructor and are dropped from native traces.
const CAPTURE_FRAME_MARKERS: &[&str] = &[
    "std::backtrace",
    "std::backtrace_rs",
    "trace_capture::",
    "PersistenceError::",
    "PersistenceError>::",
];

/// Configured capture strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TraceCaptureMode {
    /// Use the platform backtrace facility.
    #[default]
    Native,
    /// Record only the construction site reported by `#[track_caller]`.
    Fallback,
    /// Do not capture traces.
    Off,
}

impl TraceCaptureMode {
    /// Configuration spelling of the mode.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Native => "native",
            Self::Fallback => "fallback",
            Self::Off => "off",
        }
    }
}

impl fmt::Display for TraceCaptureMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raised when a configured capture mode is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown trace capture mode `{value}` (expected native, fallback or off)")]
pub struct TraceCaptureModeParseError {
    value: String,
}

impl FromStr for TraceCaptureMode {
    type Err = TraceCaptureModeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "native" => Ok(Self::Native),
            "fallback" => Ok(Self::Fallback),
            "off" | "disabled" => Ok(Self::Off),
            _ => Err(TraceCaptureModeParseError {
                value: s.to_owned(),
            }),
        }
    }
}

/// Produces a diagnostic trace for an error under construction.
///
/// `origin` is the construction site as reported by `#[track_caller]`.
pub trait TraceCapturer: Send + Sync + fmt::Debug {
    /// Capture a trace, or `None` when this strategy cannot provide one.
    fn capture(&self, origin: &'static Location<'static>) -> Option<String>;

    /// The mode this capturer implements.
    fn mode(&self) -> TraceCaptureMode;
}

/// Captures a full backtrace through [`std::backtrace::Backtrace`].
///
/// Capture is forced regardless of `RUST_BACKTRACE`. Platforms without
/// backtrace support yield `None`.
#[derive(Debug, Default, Clone, Copy)]
pub struct NativeCapturer;

impl NativeCapturer {
    /// Whether the platform can produce backtraces at all.
    #[must_use]
    pub fn is_supported() -> bool {
        Backtrace::force_capture().status() == BacktraceStatus::Captured
    }
}

impl TraceCapturer for NativeCapturer {
    fn capture(&self, _origin: &'static Location<'static>) -> Option<String> {
        let backtrace = Backtrace::force_capture();
        if backtrace.status() != BacktraceStatus::Captured {
            return None;
        }
        let rendered = backtrace.to_string();
        let trimmed = trim_capture_frames(&rendered);
        if !trimmed.trim().is_empty() {
            Some(trimmed)
        } else if !rendered.trim().is_empty() {
            Some(rendered)
        } else {
            None
        }
    }

    fn mode(&self) -> TraceCaptureMode {
        TraceCaptureMode::Native
    }
}

/// Derives a single-frame trace from the construction site.
#[derive(Debug, Default, Clone, Copy)]
pub struct FallbackCapturer;

impl TraceCapturer for FallbackCapturer {
    fn capture(&self, origin: &'static Location<'static>) -> Option<String> {
        Some(format!(
            "    at {}:{}:{}",
            origin.file(),
            origin.line(),
            origin.column()
        ))
    }

    fn mode(&self) -> TraceCaptureMode {
        TraceCaptureMode::Fallback
    }
}

/// Never captures; stands in for environments without a capture facility.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledCapturer;

impl TraceCapturer for DisabledCapturer {
    fn capture(&self, _origin: &'static Location<'static>) -> Option<String> {
        None
    }

    fn mode(&self) -> TraceCaptureMode {
        TraceCaptureMode::Off
    }
}

/// Build the capturer implementing `mode`.
///
/// No platform probing happens here; see `NativeCapturer::is_supported`.
#[must_use]
pub fn capturer_for(mode: TraceCaptureMode) -> Arc<dyn TraceCapturer> {
    match mode {
        TraceCaptureMode::Native => Arc::new(NativeCapturer),
        TraceCaptureMode::Fallback => Arc::new(FallbackCapturer),
        TraceCaptureMode::Off => Arc::new(DisabledCapturer),
    }
}

fn is_frame_header(line: &str) -> bool {
    let trimmed = line.trim_start();
    let digits = trimmed.chars().take_while(char::is_ascii_digit).count();
    digits > 0
        && trimmed
            .get(digits..)
            .is_some_and(|rest| rest.starts_with(": "))
}

fn is_capture_frame(frame: &[&str]) -> bool {
    frame.first().is_some_and(|header| {
        CAPTURE_FRAME_MARKERS
            .iter()
            .any(|marker| header.contains(marker))
    })
}

/// Drop the leading frames that belong to the capture call itself.
fn trim_capture_frames(rendered: &str) -> String {
    let mut frames: Vec<Vec<&str>> = Vec::new();
    for line in rendered.lines() {
        if is_frame_header(line) || frames.is_empty() {
            frames.push(vec![line]);
        } else if let Some(frame) = frames.last_mut() {
            frame.push(line);
        }
    }

    frames
        .iter()
        .skip_while(|frame| is_capture_frame(frame))
        .flatten()
        .copied()
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const SAMPLE: &str = "\
   0: std::backtrace_rs::backtrace::libunwind::trace
             at /rustc/library/std/src/../../backtrace/src/backtrace/libunwind.rs:116:5
   1: std::backtrace::Backtrace::create
             at /rustc/library/std/src/backtrace.rs:331:13
   2: <scaffold_backend::domain::trace_capture::NativeCapturer as scaffold_backend::domain::trace_capture::TraceCapturer>::capture
             at ./src/domain/trace_capture.rs:101:25
   3: scaffold_backend::domain::persistence_error::PersistenceError::with_capturer
             at ./src/domain/persistence_error.rs:80:21
   4: scaffold_backend::outbound::persistence::tcp_probe::TcpPersistenceProbe::check
             at ./src/outbound/persistence/tcp_probe.rs:60:13
   5: core::ops::function::FnOnce::call_once
             at /rustc/library/core/src/ops/function.rs:250:5";

    #[rstest]
    #[case("native", TraceCaptureMode::Native)]
    #[case("Fallback", TraceCaptureMode::Fallback)]
    #[case(" off ", TraceCaptureMode::Off)]
    #[case("disabled", TraceCaptureMode::Off)]
    fn parses_modes(#[case] raw: &str, #[case] expected: TraceCaptureMode) {
        assert_eq!(raw.parse::<TraceCaptureMode>(), Ok(expected));
    }

    #[rstest]
    fn rejects_unknown_modes() {
        let err = "verbose"
            .parse::<TraceCaptureMode>()
            .expect_err("unknown mode must fail");
        assert!(err.to_string().contains("verbose"));
    }

    #[rstest]
    fn trims_leading_capture_frames() {
        let trimmed = trim_capture_frames(SAMPLE);
        assert!(trimmed.starts_with("   4: scaffold_backend::outbound"));
        assert!(trimmed.contains("FnOnce::call_once"));
        assert!(!trimmed.contains("Backtrace::create"));
        assert!(!trimmed.contains("PersistenceError::with_capturer"));
    }

    #[rstest]
    fn keeps_frames_after_the_first_caller_frame() {
        let rendered = "   0: app::main\n   1: std::backtrace::Backtrace::create";
        assert_eq!(trim_capture_frames(rendered), rendered);
    }

    #[rstest]
    fn fallback_reports_the_origin() {
        let origin = Location::caller();
        let trace = FallbackCapturer
            .capture(origin)
            .expect("fallback always captures");
        assert!(trace.contains(origin.file()));
        assert!(trace.contains(&origin.line().to_string()));
    }

    #[rstest]
    fn disabled_never_captures() {
        assert!(DisabledCapturer.capture(Location::caller()).is_none());
    }

    #[rstest]
    fn native_captures_when_supported() {
        let trace = NativeCapturer.capture(Location::caller());
        if NativeCapturer::is_supported() {
            assert!(trace.is_some_and(|t| !t.trim().is_empty()));
        } else {
            assert!(trace.is_none());
        }
    }

    #[rstest]
    #[case(TraceCaptureMode::Native)]
    #[case(TraceCaptureMode::Fallback)]
    #[case(TraceCaptureMode::Off)]
    fn capturer_for_matches_mode(#[case] mode: TraceCaptureMode) {
        assert_eq!(capturer_for(mode).mode(), mode);
    }
}
