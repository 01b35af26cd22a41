//! Shutdown signal handling for the composer

use colored::Colorize;
use tokio::sync::mpsc;

/// Why the composer was asked to stop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownSignal {
    Interrupt,
    Terminate,
}

impl ShutdownSignal {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Interrupt => "SIGINT",
            Self::Terminate => "SIGTERM",
        }
    }
}

/// Listens for SIGINT/SIGTERM and forwards them over a channel
pub struct ShutdownListener {
    receiver: mpsc::Receiver<ShutdownSignal>,
}

impl ShutdownListener {
    /// Install the handlers. Must be called from within the runtime.
    pub fn install() -> Result<Self, std::io::Error> {
        let (tx, rx) = mpsc::channel(4);

        let tx_int = tx.clone();
        tokio::spawn(async move {
            while tokio::signal::ctrl_c().await.is_ok() {
                eprintln!("{} Received SIGINT", "↓".cyan());
                if tx_int.send(ShutdownSignal::Interrupt).await.is_err() {
                    break;
                }
            }
        });

        #[cfg(unix)]
        {
            use tokio::signal::unix::{signal, SignalKind};

            let mut sigterm = signal(SignalKind::terminate())?;
            tokio::spawn(async move {
                while sigterm.recv().await.is_some() {
                    eprintln!("{} Received SIGTERM", "↓".cyan());
                    if tx.send(ShutdownSignal::Terminate).await.is_err() {
                        break;
                    }
                }
            });
        }
        #[cfg(not(unix))]
        drop(tx);

        Ok(Self { receiver: rx })
    }

    /// Wait for the next signal
    pub async fn recv(&mut self) -> Option<ShutdownSignal> {
        self.receiver.recv().await
    }
}
