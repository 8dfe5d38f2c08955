//! # Cross-platform termination signal listeners.
//!
//! [`ShutdownSignals`] registers its listeners once, up front, and then yields
//! each termination signal the process receives as a raw signal number.
//! Registering before the first child is spawned means a signal can never fall
//! into a gap between listeners: tokio buffers deliveries until the next `recv`.
//!
//! ## Signals
//! **Unix platforms:**
//! - `SIGINT` (Ctrl-C in terminal)
//! - `SIGTERM` (default kill signal, used by systemd/Kubernetes)
//! - `SIGQUIT` (quit signal, often used for core dumps or hard stop)
//! - `SIGHUP` (controlling terminal closed)
//!
//! **Windows platforms:**
//! - `Ctrl-C` via [`tokio::signal::ctrl_c`], reported as `SIGINT` (2)

/// Registered termination signal listeners.
#[cfg(unix)]
pub(crate) struct ShutdownSignals {
    sigint: tokio::signal::unix::Signal,
    sigterm: tokio::signal::unix::Signal,
    sigquit: tokio::signal::unix::Signal,
    sighup: tokio::signal::unix::Signal,
}

#[cfg(unix)]
impl ShutdownSignals {
    /// Installs all listeners.
    ///
    /// Returns `Err` if signal registration fails.
    pub(crate) fn install() -> std::io::Result<Self> {
        use tokio::signal::unix::{SignalKind, signal};

        Ok(Self {
            sigint: signal(SignalKind::interrupt())?,
            sigterm: signal(SignalKind::terminate())?,
            sigquit: signal(SignalKind::quit())?,
            sighup: signal(SignalKind::hangup())?,
        })
    }

    /// Waits for the next termination signal and returns its number.
    pub(crate) async fn recv(&mut self) -> i32 {
        use nix::sys::signal::Signal;

        tokio::select! {
            Some(()) = self.sigint.recv()  => Signal::SIGINT as i32,
            Some(()) = self.sigterm.recv() => Signal::SIGTERM as i32,
            Some(()) = self.sigquit.recv() => Signal::SIGQUIT as i32,
            Some(()) = self.sighup.recv()  => Signal::SIGHUP as i32,
            else => std::future::pending::<i32>().await,
        }
    }
}

/// Registered termination signal listeners.
#[cfg(not(unix))]
pub(crate) struct ShutdownSignals {
    _private: (),
}

#[cfg(not(unix))]
impl ShutdownSignals {
    /// Ctrl-C needs no up-front registration.
    pub(crate) fn install() -> std::io::Result<Self> {
        Ok(Self { _private: () })
    }

    /// Waits for the next Ctrl-C and reports it as `SIGINT`.
    pub(crate) async fn recv(&mut self) -> i32 {
        match tokio::signal::ctrl_c().await {
            Ok(()) => 2,
            Err(_) => std::future::pending::<i32>().await,
        }
    }
}
