//! Redirect side effect for a chosen mission level.

use std::process::{Command, Stdio};
use std::sync::{Arc, Mutex, PoisonError};

use tracing::debug;

/// Opens an external mission URL.
pub trait Navigator: Send + Sync {
    /// Opens `url`.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the platform opener could not be started.
    fn open(&mut self, url: &str) -> std::io::Result<()>;
}

/// Navigator using the platform URL opener.
///
/// With `launch` disabled it only records the request in the log; the
/// destination is still shown by the hub.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemNavigator {
    launch: bool,
}

impl SystemNavigator {
    /// Creates a navigator that launches the browser when `launch` is set.
    #[must_use]
    pub const fn new(launch: bool) -> Self {
        Self { launch }
    }

    const fn opener() -> &'static str {
        if cfg!(target_os = "macos") {
            "open"
        } else if cfg!(target_os = "windows") {
            "explorer"
        } else {
            "xdg-open"
        }
    }
}

impl Navigator for SystemNavigator {
    fn open(&mut self, url: &str) -> std::io::Result<()> {
        if !self.launch {
            debug!(url, "browser launch disabled");
            return Ok(());
        }
        let opener = Self::opener();
        debug!(url, opener, "launching browser");
        Command::new(opener)
            .arg(url)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map(drop)
    }
}

/// Navigator that records opened URLs in order.
///
/// Clones share the same record, so a harness can keep one handle and give
/// the other to the controller.
#[derive(Debug, Clone, Default)]
pub struct RecordingNavigator {
    opened: Arc<Mutex<Vec<String>>>,
}

impl RecordingNavigator {
    /// Creates an empty record.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the URLs opened so far.
    #[must_use]
    pub fn opened(&self) -> Vec<String> {
        self.opened
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Navigator for RecordingNavigator {
    fn open(&mut self, url: &str) -> std::io::Result<()> {
        self.opened
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(url.to_string());
        Ok(())
    }
}
