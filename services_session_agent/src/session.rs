//! Session kind detection and the X11 foreground fallback.
//!
//! Wayland compositors answer foreground queries over the bus; plain X11
//! sessions have no such service, there the agent shells out to `xprop`.

use std::env;
use std::io;
use std::process::Command;

use thiserror::Error;

/// Environment variable naming the session's display protocol.
const SESSION_TYPE_VAR: &str = "XDG_SESSION_TYPE";

/// Pipeline resolving the active window's class under X11.
const XPROP_COMMAND: &str =
    "xprop -id $(xprop -root _NET_ACTIVE_WINDOW | cut -d ' ' -f 5) WM_CLASS";

/// The display protocol the user session runs under.
///
/// Read from the environment once at agent construction and fixed for the
/// agent's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionKind {
    Wayland,
    X11,
}

impl SessionKind {
    /// Reads the session kind from the environment.
    ///
    /// Anything other than an explicit wayland session is treated as X11.
    pub fn from_env() -> Self {
        Self::from_session_type(env::var(SESSION_TYPE_VAR).ok().as_deref())
    }

    fn from_session_type(value: Option<&str>) -> Self {
        match value {
            Some("wayland") => SessionKind::Wayland,
            _ => SessionKind::X11,
        }
    }
}

/// Failures while inspecting the foreground window outside the bus.
#[derive(Debug, Error)]
pub enum InspectError {
    #[error("failed to run window inspection command: {0}")]
    Command(#[from] io::Error),

    #[error("window inspection command produced no output")]
    NoOutput,
}

/// Resolves the class of the window the user is currently looking at.
///
/// Trait seam so handlers can be exercised without a display server.
pub trait WindowInspector {
    fn foreground_window_class(&self) -> Result<String, InspectError>;
}

/// Production inspector: shells out to `xprop`.
#[derive(Debug, Default)]
pub struct XpropInspector;

impl WindowInspector for XpropInspector {
    fn foreground_window_class(&self) -> Result<String, InspectError> {
        let output = Command::new("sh").arg("-c").arg(XPROP_COMMAND).output()?;
        let stdout = String::from_utf8_lossy(&output.stdout);
        let line = stdout.lines().next().unwrap_or("").trim();
        if line.is_empty() {
            return Err(InspectError::NoOutput);
        }
        Ok(line.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_wayland_session() {
        assert_eq!(
            SessionKind::from_session_type(Some("wayland")),
            SessionKind::Wayland
        );
    }

    #[test]
    fn test_everything_else_falls_back_to_x11() {
        assert_eq!(SessionKind::from_session_type(Some("x11")), SessionKind::X11);
        assert_eq!(SessionKind::from_session_type(Some("tty")), SessionKind::X11);
        assert_eq!(SessionKind::from_session_type(None), SessionKind::X11);
    }
}
