//! OS signal handling.
//!
//! # Responsibilities
//! - Listen for SIGTERM/SIGINT (Ctrl-C elsewhere) for the whole session
//! - Translate the first signal into a shutdown trigger
//! - Force the process out on a second signal
//!
//! # Design Decisions
//! - The first signal only flips the shutdown channel; the probe loop finishes
//!   its in-flight request and returns normally
//! - Multiple SIGTERM/SIGINT triggers forced shutdown, so a hung request
//!   cannot hold the process for the whole request timeout

use std::future::Future;

use tokio::task::JoinHandle;

use crate::lifecycle::Shutdown;

/// Exit status used when a second signal forces the process out.
pub const FORCED_EXIT_CODE: i32 = 130;

/// Source of termination signals.
pub trait SignalSource {
    /// Wait for the next signal and return its name, or `None` once the
    /// source can deliver no more.
    fn recv(&mut self) -> impl Future<Output = Option<&'static str>> + Send;
}

/// Termination signals of the current process.
#[cfg(unix)]
pub struct OsSignals {
    terminate: tokio::signal::unix::Signal,
    interrupt: tokio::signal::unix::Signal,
}

#[cfg(unix)]
impl OsSignals {
    /// Register the handlers. They stay installed for the life of the value.
    pub fn install() -> std::io::Result<Self> {
        use tokio::signal::unix::{signal, SignalKind};

        Ok(Self {
            terminate: signal(SignalKind::terminate())?,
            interrupt: signal(SignalKind::interrupt())?,
        })
    }
}

#[cfg(unix)]
impl SignalSource for OsSignals {
    async fn recv(&mut self) -> Option<&'static str> {
        tokio::select! {
            s = self.terminate.recv() => s.map(|_| "SIGTERM"),
            s = self.interrupt.recv() => s.map(|_| "SIGINT"),
        }
    }
}

/// Termination signals of the current process.
#[cfg(not(unix))]
pub struct OsSignals;

#[cfg(not(unix))]
impl OsSignals {
    pub fn install() -> std::io::Result<Self> {
        Ok(Self)
    }
}

#[cfg(not(unix))]
impl SignalSource for OsSignals {
    async fn recv(&mut self) -> Option<&'static str> {
        tokio::signal::ctrl_c().await.ok().map(|_| "Ctrl-C")
    }
}

/// Trigger `shutdown` on the first signal.
///
/// Returns the name of a second signal, which means the caller should stop
/// waiting for a clean exit. Returns `None` if the source runs dry first.
pub async fn escalate<S: SignalSource>(
    signals: &mut S,
    shutdown: &Shutdown,
) -> Option<&'static str> {
    let first = signals.recv().await?;
    tracing::info!(
        signal = first,
        "Termination signal received, finishing current request"
    );
    shutdown.trigger();

    let second = signals.recv().await?;
    tracing::warn!(signal = second, "Second termination signal received, forcing exit");
    Some(second)
}

/// Spawn a task that triggers `shutdown` on the first termination signal and
/// exits the process on the second.
pub fn spawn_signal_listener(shutdown: Shutdown) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut signals = match OsSignals::install() {
            Ok(signals) => signals,
            Err(e) => {
                tracing::error!(error = %e, "Failed to install signal handlers");
                return;
            }
        };

        if escalate(&mut signals, &shutdown).await.is_some() {
            std::process::exit(FORCED_EXIT_CODE);
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    struct Scripted(VecDeque<&'static str>);

    impl SignalSource for Scripted {
        async fn recv(&mut self) -> Option<&'static str> {
            self.0.pop_front()
        }
    }

    #[tokio::test]
    async fn test_first_signal_triggers_shutdown() {
        let shutdown = Shutdown::new();
        let mut rx = shutdown.subscribe();
        let mut signals = Scripted(VecDeque::from(["SIGINT"]));

        assert_eq!(escalate(&mut signals, &shutdown).await, None);
        assert!(rx.try_recv().is_ok());
    }

    #[tokio::test]
    async fn test_second_signal_forces_exit() {
        let shutdown = Shutdown::new();
        let mut rx = shutdown.subscribe();
        let mut signals = Scripted(VecDeque::from(["SIGINT", "SIGTERM"]));

        assert_eq!(escalate(&mut signals, &shutdown).await, Some("SIGTERM"));
        assert!(rx.try_recv().is_ok());
    }

    #[tokio::test]
    async fn test_no_signal_leaves_shutdown_untouched() {
        let shutdown = Shutdown::new();
        let mut rx = shutdown.subscribe();
        let mut signals = Scripted(VecDeque::new());

        assert_eq!(escalate(&mut signals, &shutdown).await, None);
        assert!(rx.try_recv().is_err());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_os_signals_install() {
        assert!(OsSignals::install().is_ok());
    }
}
