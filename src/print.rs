//! Send a label to a CUPS printer with `lp`.

use std::path::Path;
use std::process::Command;

use tracing::info;

use crate::config::PrinterConfig;
use crate::error::{LabelError, Result};

/// Printer target taken from configuration.
#[derive(Debug, Clone)]
pub struct Printer {
    command: String,
    server: String,
    name: String,
}

impl Printer {
    pub fn new(config: &PrinterConfig) -> Self {
        Self {
            command: config.command.clone(),
            server: config.server.clone(),
            name: config.name.clone(),
        }
    }

    /// The command line that [`Printer::print`] runs, without a shell.
    pub fn command_for(&self, file: &Path) -> Command {
        let mut cmd = Command::new(&self.command);
        cmd.arg("-h")
            .arg(&self.server)
            .arg("-d")
            .arg(&self.name)
            .arg(file);
        cmd
    }

    /// Print `file`. A non-zero exit carries the command's stdout and stderr.
    pub fn print(&self, file: &Path) -> Result<()> {
        let output = self
            .command_for(file)
            .output()
            .map_err(|e| LabelError::Print {
                status: format!("could not run '{}'", self.command),
                output: e.to_string(),
            })?;

        if !output.status.success() {
            let stdout = String::from_utf8_lossy(&output.stdout);
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(LabelError::Print {
                status: output.status.to_string(),
                output: format!("{}\nError:\n{}", stdout.trim_end(), stderr.trim_end()),
            });
        }

        info!(
            file = %file.display(),
            server = %self.server,
            printer = %self.name,
            "Sent label to printer"
        );
        Ok(())
    }
}
