//! Print service abstraction and the `lp` implementation

use async_trait::async_trait;
use std::process::Stdio;
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, error};

/// Errors surfaced by a print dispatch
#[derive(Error, Debug)]
pub enum PrintError {
    /// The print job was rejected as unusable before dispatch
    #[error("Invalid print job: {0}")]
    InvalidJob(String),

    /// The print spooler could not be invoked
    #[error("Failed to invoke print spooler: {0}")]
    Spooler(#[from] std::io::Error),

    /// The print spooler rejected the job
    #[error("Printer rejected the job: {0}")]
    Rejected(String),
}

/// Dispatches one rendered PDF to a local printer
#[async_trait]
pub trait PrintService: Send + Sync {
    /// Print the given PDF bytes; returns once the job is handed to the
    /// print driver
    async fn print_pdf(&self, pdf: &[u8]) -> Result<(), PrintError>;
}

/// Print service shelling out to the CUPS `lp` spooler
pub struct LpPrinter {
    printer: Option<String>,
}

impl LpPrinter {
    /// Create a printer targeting the given destination, or the system
    /// default printer when `None`
    pub fn new(printer: Option<String>) -> Self {
        Self { printer }
    }
}

#[async_trait]
impl PrintService for LpPrinter {
    async fn print_pdf(&self, pdf: &[u8]) -> Result<(), PrintError> {
        if pdf.is_empty() {
            return Err(PrintError::InvalidJob("empty PDF payload".into()));
        }

        let mut command = Command::new("lp");
        command.arg("-s");
        if let Some(printer) = &self.printer {
            command.args(["-d", printer]);
        }
        command
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());

        debug!(printer = ?self.printer, bytes = pdf.len(), "dispatching print job");
        let mut child = command.spawn()?;
        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| PrintError::Rejected("spooler stdin unavailable".into()))?;
        stdin.write_all(pdf).await?;
        drop(stdin);

        let output = child.wait_with_output().await?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            error!(status = ?output.status, %stderr, "print spooler rejected the job");
            return Err(PrintError::Rejected(if stderr.is_empty() {
                format!("lp exited with {}", output.status)
            } else {
                stderr
            }));
        }
        Ok(())
    }
}
