//! Output formatting for CLI
//!
//! Every command renders through these helpers so table, JSON and YAML
//! output stay consistent.

use colored::Colorize;
use serde::Serialize;
use tabled::{Table, Tabled};

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
    Yaml,
}

/// Print rows in the specified format (table, JSON, or YAML)
pub fn print_output<T: Tabled + Serialize>(
    data: Vec<T>,
    format: OutputFormat,
) -> anyhow::Result<()> {
    match format {
        OutputFormat::Table => print_table(data),
        OutputFormat::Json => print_json(&data)?,
        OutputFormat::Yaml => print_yaml(&data)?,
    }
    Ok(())
}

/// Print a single item; tables fall back to pretty JSON
pub fn print_single<T: Serialize>(data: &T, format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Table | OutputFormat::Json => print_json(data)?,
        OutputFormat::Yaml => print_yaml(data)?,
    }
    Ok(())
}

/// Print data as a table using the tabled crate
pub fn print_table<T: Tabled>(data: Vec<T>) {
    if data.is_empty() {
        println!("{}", "No results found".yellow());
        return;
    }

    println!("{}", Table::new(data));
}

/// Print data as pretty-printed JSON
pub fn print_json<T: Serialize>(data: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(data)?);
    Ok(())
}

/// Print data as YAML
pub fn print_yaml<T: Serialize>(data: &T) -> anyhow::Result<()> {
    println!("{}", serde_yaml::to_string(data)?);
    Ok(())
}

/// Print a success message with green checkmark
pub fn print_success(message: &str) {
    println!("{} {}", "✓".green().bold(), message.green());
}

/// Print an error message with red X
pub fn print_error(message: &str) {
    eprintln!("{} {}", "✗".red().bold(), message.red());
}

/// Print an info message with blue i
pub fn print_info(message: &str) {
    println!("{} {}", "ℹ".blue().bold(), message);
}

/// Print a warning message with yellow triangle
pub fn print_warning(message: &str) {
    println!("{} {}", "⚠".yellow().bold(), message.yellow());
}

/// Pass/fail marker for a verdict column
pub fn status_marker(passed: bool) -> String {
    if passed {
        "PASS".green().bold().to_string()
    } else {
        "FAIL".red().bold().to_string()
    }
}

/// Percentage with one decimal
pub fn format_percent(value: f64) -> String {
    format!("{:.1}%", value)
}
