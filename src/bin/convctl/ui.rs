//! Terminal output: colours, the progress spinner, and report rendering.

use convctl::registry::SupportedConversion;
use convctl::{ConversionKey, ConversionProgressCallback, DoctorReport};
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Arc;
use std::time::Duration;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

pub fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
pub fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
pub fn yellow(s: &str) -> String {
    format!("\x1b[33m{s}\x1b[0m")
}
pub fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
pub fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
pub fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

const TICKS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"];

// ── Spinner progress callback ────────────────────────────────────────────────

/// Spinner plus one log line per finished step.
pub struct SpinnerProgress {
    bar: ProgressBar,
}

impl SpinnerProgress {
    pub fn new() -> Arc<Self> {
        let bar = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}  {elapsed:.dim}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(TICKS);
        bar.set_style(style);
        bar.set_prefix("Preparing");
        Arc::new(Self { bar })
    }
}

impl ConversionProgressCallback for SpinnerProgress {
    fn on_conversion_start(&self, total_steps: usize) {
        self.bar.set_length(total_steps as u64);
        self.bar.enable_steady_tick(Duration::from_millis(80));
    }

    fn on_step_start(&self, step: usize, total_steps: usize, key: &ConversionKey) {
        self.bar.set_prefix(format!("Step {step}/{total_steps}"));
        self.bar.set_message(key.to_string());
    }

    fn on_step_complete(&self, step: usize, total_steps: usize) {
        self.bar.println(format!(
            "  {} Step {}/{}  {}",
            green("✓"),
            step,
            total_steps,
            dim(&format!("{:.1}s", self.bar.elapsed().as_secs_f64())),
        ));
        self.bar.inc(1);
    }

    fn on_step_error(&self, step: usize, total_steps: usize, error: &str) {
        let first_line = error.lines().next().unwrap_or(error);
        self.bar.println(format!(
            "  {} Step {}/{}  {}",
            red("✗"),
            step,
            total_steps,
            red(first_line),
        ));
        self.bar.finish_and_clear();
    }

    fn on_conversion_complete(&self, _total_steps: usize) {
        self.bar.finish_and_clear();
    }
}

/// Spinner for operations that report no steps.
pub fn busy(message: impl Into<String>) -> ProgressBar {
    let bar = ProgressBar::new_spinner();
    bar.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(TICKS),
    );
    bar.set_message(message.into());
    bar.enable_steady_tick(Duration::from_millis(80));
    bar
}

// ── Report rendering ─────────────────────────────────────────────────────────

pub fn print_doctor(report: &DoctorReport) {
    println!("{}", bold("System dependencies"));
    println!("{}", dim(&"─".repeat(48)));
    for dep in &report.dependencies {
        let status = if dep.found { green("OK") } else { red("MISSING") };
        println!("  {:<14} {}  {}", dep.name, status, dim(&dep.used_for));
        if let Some(path) = &dep.path {
            println!("      └─ {}", path.display());
        }
        if let Some(hint) = &dep.hint {
            for line in hint.lines() {
                println!("      {}", yellow(line));
            }
        }
    }

    println!();
    println!("{}", bold("Platform"));
    println!("{}", dim(&"─".repeat(48)));
    println!("  System:   {} ({})", report.platform.os, report.platform.family);
    println!("  Machine:  {}", report.platform.arch);
    println!("  convctl:  {}", report.platform.convctl_version);
}

pub fn print_conversions(rows: &[SupportedConversion]) {
    println!(
        "{}",
        bold(&format!("{:<6} {:<6} {:<6} {}", "FROM", "TO", "VIA", "HANDLER"))
    );
    for row in rows {
        println!(
            "{:<6} {:<6} {:<6} {}",
            row.from,
            row.to,
            row.via.as_deref().unwrap_or("-"),
            dim(&row.handler)
        );
    }
}
