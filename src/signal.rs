//! Ctrl+C handling.
//!
//! A shared `AtomicBool` is raised when the user interrupts. The classifier
//! checks it between files and the hasher checks it between buffer reads, so
//! a run stops promptly and the binary exits with code 130.
//!
//! ```rust,no_run
//! use dupfilter::duplicates::ClassifierConfig;
//! use dupfilter::signal::install_handler;
//!
//! let handler = install_handler().expect("signal handler");
//! let config = ClassifierConfig::default().with_shutdown_flag(handler.get_flag());
//! ```

use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

/// Shared shutdown flag.
#[derive(Debug, Clone, Default)]
pub struct ShutdownHandler {
    flag: Arc<AtomicBool>,
}

impl ShutdownHandler {
    /// Create a handler with no shutdown requested.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether Ctrl+C was pressed or `request_shutdown` was called.
    #[must_use]
    pub fn is_shutdown_requested(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// Raise the flag manually.
    pub fn request_shutdown(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// Clone of the flag for the classifier and hasher.
    #[must_use]
    pub fn get_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.flag)
    }

    /// Lower the flag again.
    pub fn reset(&self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}

/// Error type for signal handler installation.
#[derive(Debug, thiserror::Error)]
pub enum SignalError {
    /// Failed to install the Ctrl+C handler.
    #[error("Failed to install signal handler: {0}")]
    InstallFailed(#[from] ctrlc::Error),
}

static GLOBAL_HANDLER: OnceLock<ShutdownHandler> = OnceLock::new();

/// Install the process-wide Ctrl+C handler.
///
/// The handler is installed once per process. Later calls (library users
/// running several classifications, tests calling `run_app` in parallel)
/// get the same handler back with its flag lowered.
///
/// # Errors
///
/// Returns `SignalError::InstallFailed` if the OS refuses the handler for a
/// reason other than one being registered already.
pub fn install_handler() -> Result<ShutdownHandler, SignalError> {
    if let Some(handler) = GLOBAL_HANDLER.get() {
        handler.reset();
        return Ok(handler.clone());
    }

    let handler = ShutdownHandler::new();
    let flag = handler.get_flag();

    let installed = ctrlc::set_handler(move || {
        flag.store(true, Ordering::SeqCst);
        let _ = writeln!(std::io::stderr(), "\nInterrupted. Stopping...");
        let _ = std::io::stderr().flush();
        log::info!("Shutdown signal received");
    });

    match installed {
        Ok(()) => {
            let _ = GLOBAL_HANDLER.set(handler);
        }
        Err(ctrlc::Error::MultipleHandlers) => {
            log::debug!("Ctrl+C handler already registered, using unhooked handler");
            let _ = GLOBAL_HANDLER.set(ShutdownHandler::new());
        }
        Err(e) => return Err(e.into()),
    }

    // Another thread may have won the race to set the global.
    let handler = GLOBAL_HANDLER.get().cloned().unwrap_or_default();
    handler.reset();
    Ok(handler)
}
