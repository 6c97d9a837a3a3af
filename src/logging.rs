//! Logging setup for drivers that embed the integrator

use color_eyre::eyre::{Result, WrapErr};
use std::fmt;
use std::fs::File;
use std::path::Path;
use std::time::SystemTime;
use tracing_subscriber::{
    fmt::format::Writer, fmt::layer, fmt::time::FormatTime, layer::SubscriberExt,
    util::SubscriberInitExt, Registry,
};

/// Timer that prints wall-clock time as HH:MM:SS
struct SecondPrecisionTimer;

impl FormatTime for SecondPrecisionTimer {
    fn format_time(&self, w: &mut Writer<'_>) -> fmt::Result {
        let total_seconds = SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();
        let hours = (total_seconds / 3600) % 24;
        let minutes = (total_seconds / 60) % 60;
        let seconds = total_seconds % 60;
        write!(w, "{:02}:{:02}:{:02}", hours, minutes, seconds)
    }
}

/// Installs a global tracing subscriber writing to `output`, or stdout.
///
/// Fails if a global subscriber is already set.
pub fn init_logging(output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            let log = File::create(path)
                .wrap_err_with(|| format!("Could not create log file: {}", path.display()))?;
            let file_layer = layer()
                .with_writer(log)
                .with_timer(SecondPrecisionTimer)
                .with_ansi(false);
            Registry::default()
                .with(file_layer)
                .try_init()
                .wrap_err("Failed to install tracing subscriber")?;
        }
        None => {
            let stdout_layer = layer()
                .with_writer(std::io::stdout)
                .with_timer(SecondPrecisionTimer)
                .with_ansi(true);
            Registry::default()
                .with(stdout_layer)
                .try_init()
                .wrap_err("Failed to install tracing subscriber")?;
        }
    }
    tracing::info!("Logging initialised");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subscriber_is_installed_once() {
        let path = std::env::temp_dir().join(format!("pbc_numint_{}.log", std::process::id()));
        assert!(init_logging(Some(&path)).is_ok());
        assert!(path.exists());
        assert!(init_logging(None).is_err());
        let _ = std::fs::remove_file(&path);
    }
}
