//! Application settings loaded via OrthoConfig.
//!
//! Values are layered from defaults, an optional configuration file,
//! `BACKEND_*` environment variables, and command-line flags.

use std::net::{AddrParseError, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::domain::trace_capture::{
    FallbackCapturer, NativeCapturer, TraceCaptureModeParseError, capturer_for,
};
use crate::domain::{TraceCaptureMode, TraceCapturer};

/// Address the server binds to when none is configured.
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
/// Readiness probe timeout when none is configured.
pub const DEFAULT_PROBE_TIMEOUT_MS: u64 = 2_000;

/// Errors raised while interpreting loaded settings.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// `bind_addr` is not a socket address.
    #[error("invalid bind address `{value}`: {source}")]
    BindAddr {
        value: String,
        #[source]
        source: AddrParseError,
    },
    /// `database_addr` is not a socket address.
    #[error("invalid database address `{value}`: {source}")]
    DatabaseAddr {
        value: String,
        #[source]
        source: AddrParseError,
    },
    /// `trace_capture` names an unknown mode.
    #[error(transparent)]
    TraceCapture(#[from] TraceCaptureModeParseError),
}

/// Configuration values for the HTTP server and its adapters.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "BACKEND")]
pub struct AppSettings {
    /// Socket address for the HTTP listener.
    pub bind_addr: Option<String>,
    /// Stack trace capture mode: `native`, `fallback`, or `off`.
    pub trace_capture: Option<String>,
    /// Database endpoint (`ip:port`) probed for readiness.
    pub database_addr: Option<String>,
    /// Readiness probe timeout in milliseconds.
    #[ortho_config(default = DEFAULT_PROBE_TIMEOUT_MS)]
    pub probe_timeout_ms: u64,
}

impl AppSettings {
    /// Return the configured bind address, falling back to the default.
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let raw = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        raw.trim()
            .parse()
            .map_err(|source| SettingsError::BindAddr {
                value: raw.to_owned(),
                source,
            })
    }

    /// Return the configured capture mode, falling back to native capture.
    pub fn trace_capture_mode(&self) -> Result<TraceCaptureMode, SettingsError> {
        match self.trace_capture.as_deref() {
            Some(raw) => Ok(raw.parse()?),
            None => Ok(TraceCaptureMode::default()),
        }
    }

    /// Return the database endpoint, if one is configured.
    pub fn database_addr(&self) -> Result<Option<SocketAddr>, SettingsError> {
        self.database_addr
            .as_deref()
            .map(str::trim)
            .filter(|raw| !raw.is_empty())
            .map(|raw| {
                raw.parse().map_err(|source| SettingsError::DatabaseAddr {
                    value: raw.to_owned(),
                    source,
                })
            })
            .transpose()
    }

    /// Return the readiness probe timeout.
    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }

    /// Select the capturer for the configured mode.
    pub fn trace_capturer(&self) -> Result<Arc<dyn TraceCapturer>, SettingsError> {
        Ok(select_capturer(self.trace_capture_mode()?))
    }
}

/// Choose a capturer for `mode`, probing the platform once.
///
/// When native capture is requested on a platform that cannot produce
/// backtraces, the fallback capturer is selected instead.
pub fn select_capturer(mode: TraceCaptureMode) -> Arc<dyn TraceCapturer> {
    let capturer = if mode == TraceCaptureMode::Native && !NativeCapturer::is_supported() {
        warn!("native backtraces unsupported on this platform; using fallback trace capture");
        Arc::new(FallbackCapturer)
    } else {
        capturer_for(mode)
    };
    info!(requested = %mode, selected = %capturer.mode(), "trace capture configured");
    capturer
}

#[cfg(test)]
mod tests {
    //! Unit tests for settings parsing.

    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    const VARS: [&str; 4] = [
        "BACKEND_BIND_ADDR",
        "BACKEND_TRACE_CAPTURE",
        "BACKEND_DATABASE_ADDR",
        "BACKEND_PROBE_TIMEOUT_MS",
    ];

    fn load_from_empty_args() -> AppSettings {
        AppSettings::load_from_iter([OsString::from("scaffold-backend")])
            .expect("config should load")
    }

    fn blank_settings(trace_capture: Option<&str>) -> AppSettings {
        AppSettings {
            bind_addr: None,
            trace_capture: trace_capture.map(str::to_owned),
            database_addr: None,
            probe_timeout_ms: DEFAULT_PROBE_TIMEOUT_MS,
        }
    }

    #[rstest]
    fn default_values_are_used_when_missing() {
        let _guard = lock_env(VARS.map(|name| (name, None::<String>)));

        let settings = load_from_empty_args();
        assert_eq!(
            settings.bind_addr().expect("default bind address"),
            DEFAULT_BIND_ADDR.parse::<SocketAddr>().expect("valid default")
        );
        assert_eq!(
            settings.trace_capture_mode().expect("default mode"),
            TraceCaptureMode::Native
        );
        assert!(settings.database_addr().expect("no database").is_none());
        assert_eq!(settings.probe_timeout_ms, DEFAULT_PROBE_TIMEOUT_MS);
        assert_eq!(
            settings.probe_timeout(),
            Duration::from_millis(DEFAULT_PROBE_TIMEOUT_MS)
        );
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let _guard = lock_env([
            ("BACKEND_BIND_ADDR", Some("127.0.0.1:9090".to_owned())),
            ("BACKEND_TRACE_CAPTURE", Some("fallback".to_owned())),
            ("BACKEND_DATABASE_ADDR", Some("127.0.0.1:5432".to_owned())),
            ("BACKEND_PROBE_TIMEOUT_MS", Some("250".to_owned())),
        ]);

        let settings = load_from_empty_args();
        assert_eq!(
            settings.bind_addr().expect("bind address"),
            "127.0.0.1:9090".parse::<SocketAddr>().expect("valid address")
        );
        assert_eq!(
            settings.trace_capture_mode().expect("mode"),
            TraceCaptureMode::Fallback
        );
        assert_eq!(
            settings.database_addr().expect("database address"),
            Some("127.0.0.1:5432".parse().expect("valid address"))
        );
        assert_eq!(settings.probe_timeout(), Duration::from_millis(250));
    }

    #[rstest]
    fn partial_environment_keeps_remaining_defaults() {
        let _guard = lock_env([
            ("BACKEND_BIND_ADDR", None),
            ("BACKEND_TRACE_CAPTURE", Some("off".to_owned())),
            ("BACKEND_DATABASE_ADDR", None),
            ("BACKEND_PROBE_TIMEOUT_MS", None),
        ]);

        let settings = load_from_empty_args();
        assert_eq!(
            settings.trace_capture_mode().expect("mode"),
            TraceCaptureMode::Off
        );
        assert_eq!(settings.probe_timeout_ms, DEFAULT_PROBE_TIMEOUT_MS);
        assert_eq!(
            settings.bind_addr().expect("default bind address"),
            DEFAULT_BIND_ADDR.parse::<SocketAddr>().expect("valid default")
        );
    }

    #[rstest]
    fn invalid_bind_address_is_rejected() {
        let settings = AppSettings {
            bind_addr: Some("not-an-address".to_owned()),
            ..blank_settings(None)
        };
        assert!(matches!(
            settings.bind_addr(),
            Err(SettingsError::BindAddr { .. })
        ));
    }

    #[rstest]
    fn blank_database_address_means_none() {
        let settings = AppSettings {
            database_addr: Some("  ".to_owned()),
            ..blank_settings(None)
        };
        assert!(settings.database_addr().expect("blank is allowed").is_none());
    }

    #[rstest]
    fn unknown_trace_capture_mode_is_rejected() {
        assert!(matches!(
            blank_settings(Some("loud")).trace_capturer(),
            Err(SettingsError::TraceCapture(_))
        ));
    }

    #[rstest]
    #[case("fallback", TraceCaptureMode::Fallback)]
    #[case("off", TraceCaptureMode::Off)]
    fn non_native_modes_are_selected_verbatim(
        #[case] raw: &str,
        #[case] expected: TraceCaptureMode,
    ) {
        let capturer = blank_settings(Some(raw))
            .trace_capturer()
            .expect("valid mode");
        assert_eq!(capturer.mode(), expected);
    }

    #[rstest]
    fn native_mode_degrades_to_fallback_when_unsupported() {
        let capturer = select_capturer(TraceCaptureMode::Native);
        let expected = if NativeCapturer::is_supported() {
            TraceCaptureMode::Native
        } else {
            TraceCaptureMode::Fallback
        };
        assert_eq!(capturer.mode(), expected);
    }
}
