use crate::cli::OutputFormat;
use crate::commands::CommandResult;
use colored::Colorize;
use declarative::{ProgressCallback, WaitOutcome};
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::Value;
use std::time::Duration;

/// Print an info message
pub fn info(msg: &str) {
    println!("{} {}", "ℹ".blue(), msg);
}

/// Print a success message
pub fn success(msg: &str) {
    println!("{} {}", "✓".green(), msg);
}

/// Print an error message
pub fn error(msg: &str) {
    eprintln!("{} {}", "✗".red(), msg);
}

/// Print a dim/muted message
pub fn dim(msg: &str) {
    println!("  {}", msg.dimmed());
}

/// Print a key-value pair
pub fn kv(key: &str, value: &str) {
    println!("  {}: {}", key.dimmed(), value);
}

// ============================================================================
// Result rendering
// ============================================================================

/// Print a command result in the requested format
pub fn render(result: &CommandResult, format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(result)?),
        OutputFormat::Text => {
            if result.changed {
                success(&result.message);
            } else {
                info(&result.message);
            }
            for (key, value) in &result.fields {
                kv(key, &display_value(value));
            }
        }
    }
    Ok(())
}

/// Render a field value on one line; strings are shown unquoted
pub fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "-".to_string(),
        other => other.to_string(),
    }
}

// ============================================================================
// Wait spinner
// ============================================================================

/// Spinner shown while waiting for instances to become ready
pub struct WaitSpinner {
    bar: ProgressBar,
}

impl WaitSpinner {
    pub fn new(visible: bool) -> Self {
        if !visible {
            return Self {
                bar: ProgressBar::hidden(),
            };
        }

        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.cyan} {msg} [{elapsed}]")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        bar.set_message("waiting for instances");
        bar.enable_steady_tick(Duration::from_millis(120));
        Self { bar }
    }
}

impl ProgressCallback for WaitSpinner {
    fn on_poll(&mut self, ready: usize, target: usize, _elapsed: Duration) {
        self.bar
            .set_message(format!("waiting for instances ({ready}/{target} ready)"));
    }

    fn on_finish(&mut self, outcome: &WaitOutcome) {
        self.bar.finish_and_clear();
        match outcome {
            WaitOutcome::Ready { ready } => log::info!("{ready} instance(s) ready"),
            WaitOutcome::TimedOut { ready, target } => {
                log::warn!("only {ready}/{target} instance(s) ready before timeout");
            }
        }
    }
}
