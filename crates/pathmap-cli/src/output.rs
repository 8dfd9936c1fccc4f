//! Output formatting and writing utilities
//!
//! This module provides utilities for formatting and writing output
//! in various formats (JSON, YAML, human-readable), with dedicated
//! rendering for transform outcomes and lossiness reports.

use crate::cli::OutputFormat;
use crate::error::Result;
use colored::Colorize;
use pathmap_core::{LossinessItem, LossinessReport, MappingOutcome};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::io::{self, Write};
use tracing::{debug, trace};

/// Trait for formatting output with specialized support for common types
pub trait OutputFormatter {
    /// Format a serializable value
    fn format<T: Serialize>(&self, value: &T) -> Result<String>;

    /// Format a transform outcome with its lossiness report
    fn format_outcome(&self, outcome: &MappingOutcome) -> Result<String>;

    /// Format a lossiness report with categorization
    fn format_lossiness_report(&self, report: &LossinessReport) -> Result<String>;
}

impl OutputFormatter for OutputFormat {
    fn format<T: Serialize>(&self, value: &T) -> Result<String> {
        match self {
            OutputFormat::Json => Ok(serde_json::to_string(value)?),
            OutputFormat::JsonPretty => Ok(serde_json::to_string_pretty(value)?),
            OutputFormat::Yaml => Ok(serde_yaml::to_string(value)?),
            OutputFormat::Human => {
                // For human format, use pretty JSON as fallback
                Ok(serde_json::to_string_pretty(value)?)
            }
        }
    }

    fn format_outcome(&self, outcome: &MappingOutcome) -> Result<String> {
        match self {
            OutputFormat::Human => format_outcome_human(outcome),
            machine => machine.format(outcome),
        }
    }

    fn format_lossiness_report(&self, report: &LossinessReport) -> Result<String> {
        match self {
            OutputFormat::Human => Ok(format_lossiness_report_human(report)),
            machine => machine.format(report),
        }
    }
}

/// Output writer that handles different output formats and colors
pub struct OutputWriter {
    format: OutputFormat,
    use_color: bool,
    quiet: bool,
    writer: Box<dyn Write>,
}

impl OutputWriter {
    /// Create a new output writer
    pub fn new(format: OutputFormat, use_color: bool, quiet: bool) -> Self {
        Self::with_writer(format, use_color, quiet, Box::new(io::stdout()))
    }

    /// Create an output writer with a custom writer
    pub fn with_writer(
        format: OutputFormat,
        use_color: bool,
        quiet: bool,
        writer: Box<dyn Write>,
    ) -> Self {
        Self {
            format,
            use_color,
            quiet,
            writer,
        }
    }

    /// Whether human-oriented messages are written
    pub fn is_human(&self) -> bool {
        self.format == OutputFormat::Human
    }

    /// Write a line of output
    pub fn writeln(&mut self, content: &str) -> Result<()> {
        writeln!(self.writer, "{}", content)?;
        self.writer.flush()?;
        Ok(())
    }

    /// Write an info message
    pub fn info(&mut self, message: &str) -> Result<()> {
        debug!("Output info: {}", message);

        if self.quiet || !self.is_human() {
            return Ok(());
        }

        if self.use_color {
            self.writeln(&format!("{} {}", "ℹ".blue(), message))
        } else {
            self.writeln(&format!("INFO: {}", message))
        }
    }

    /// Write a success message
    pub fn success(&mut self, message: &str) -> Result<()> {
        if self.quiet || !self.is_human() {
            return Ok(());
        }

        if self.use_color {
            self.writeln(&message.green().to_string())
        } else {
            self.writeln(message)
        }
    }

    /// Write a warning message
    pub fn warning(&mut self, message: &str) -> Result<()> {
        if !self.is_human() {
            return Ok(());
        }

        if self.use_color {
            self.writeln(&message.yellow().to_string())
        } else {
            self.writeln(&format!("WARNING: {}", message))
        }
    }

    /// Write a section header
    pub fn section(&mut self, title: &str) -> Result<()> {
        if self.quiet || !self.is_human() {
            return Ok(());
        }

        self.writeln("")?;
        if self.use_color {
            self.writeln(&format!("═══ {} ═══", title).bright_blue().to_string())
        } else {
            self.writeln(&format!("=== {} ===", title))
        }
    }

    /// Write data in the configured format
    pub fn data<T: Serialize>(&mut self, value: &T) -> Result<()> {
        let formatted = self.format.format(value)?;
        trace!("Outputting {} bytes of data", formatted.len());

        // YAML already ends with a newline
        self.writeln(formatted.trim_end_matches('\n'))
    }

    /// Write a transform outcome with specialized formatting
    pub fn outcome(&mut self, outcome: &MappingOutcome) -> Result<()> {
        let formatted = self.format.format_outcome(outcome)?;
        self.writeln(formatted.trim_end_matches('\n'))
    }

    /// Write a lossiness report with specialized formatting
    pub fn lossiness_report(&mut self, report: &LossinessReport) -> Result<()> {
        let formatted = self.format.format_lossiness_report(report)?;
        self.writeln(formatted.trim_end_matches('\n'))
    }

    /// Write a table (for human format)
    pub fn table(&mut self, headers: &[&str], rows: Vec<Vec<String>>) -> Result<()> {
        if self.quiet || !self.is_human() {
            return Ok(());
        }

        // Calculate column widths
        let mut widths = headers.iter().map(|h| h.chars().count()).collect::<Vec<_>>();
        for row in &rows {
            for (i, cell) in row.iter().enumerate() {
                if i < widths.len() {
                    widths[i] = widths[i].max(cell.chars().count());
                }
            }
        }

        let header_row = headers
            .iter()
            .enumerate()
            .map(|(i, h)| format!("{:width$}", h, width = widths[i]))
            .collect::<Vec<_>>()
            .join(" │ ");

        if self.use_color {
            self.writeln(&header_row.trim_end().bold().to_string())?;
        } else {
            self.writeln(header_row.trim_end())?;
        }

        let separator = widths
            .iter()
            .map(|w| "─".repeat(*w))
            .collect::<Vec<_>>()
            .join("─┼─");
        self.writeln(&separator)?;

        for row in rows {
            let row_str = row
                .iter()
                .enumerate()
                .map(|(i, cell)| match widths.get(i) {
                    Some(width) => format!("{:width$}", cell, width = *width),
                    None => cell.clone(),
                })
                .collect::<Vec<_>>()
                .join(" │ ");
            self.writeln(row_str.trim_end())?;
        }

        Ok(())
    }
}

/// Format a transform outcome for human reading
fn format_outcome_human(outcome: &MappingOutcome) -> Result<String> {
    let mut output = String::new();

    output.push_str(&format!("═══ Transform Result ({}) ═══\n\n", outcome.verse));
    output.push_str(&serde_json::to_string_pretty(&outcome.output)?);
    output.push_str("\n\n");
    output.push_str(&format_lossiness_report_human(&outcome.lossiness));

    Ok(output)
}

/// Format lossiness report for human reading
fn format_lossiness_report_human(report: &LossinessReport) -> String {
    let mut output = String::new();

    if report.items.is_empty() {
        output.push_str("✅ No lossiness detected\n");
        return output;
    }

    output.push_str(&format!(
        "🔍 Lossiness Report - {} Issue(s), max severity {}\n\n",
        report.summary.total_items, report.max_severity
    ));

    // Sorted so the summary reads the same on every run
    let by_code: BTreeMap<&String, &usize> = report.summary.by_code.iter().collect();
    output.push_str("📋 Summary by Type:\n");
    for (code, count) in by_code {
        output.push_str(&format!("  • {}: {}\n", code, count));
    }
    output.push('\n');

    for item in &report.items {
        output.push_str(&format_lossiness_item_human(item));
    }

    output
}

fn format_lossiness_item_human(item: &LossinessItem) -> String {
    let mut output = String::new();

    output.push_str(&format!("  📍 Path: {}\n", item.path));
    output.push_str(&format!("  🏷️  Code: {} ({})\n", item.code, item.severity));
    output.push_str(&format!("  💬 Message: {}\n", item.message));
    if let Some(before) = &item.before {
        output.push_str(&format!("  📥 Before: {}\n", format_value_compact(before)));
    }
    if let Some(after) = &item.after {
        output.push_str(&format!("  📤 After: {}\n", format_value_compact(after)));
    }
    output.push('\n');

    output
}

/// Format a JSON value in a compact, human-readable way
fn format_value_compact(value: &Value) -> String {
    match value {
        Value::String(s) => format!("\"{}\"", s),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        Value::Array(arr) => {
            if arr.len() <= 3 {
                format!(
                    "[{}]",
                    arr.iter().map(format_value_compact).collect::<Vec<_>>().join(", ")
                )
            } else {
                format!("[{} items]", arr.len())
            }
        }
        Value::Object(obj) => {
            if obj.len() <= 2 {
                let items: Vec<String> = obj
                    .iter()
                    .map(|(k, v)| format!("{}: {}", k, format_value_compact(v)))
                    .collect();
                format!("{{{}}}", items.join(", "))
            } else {
                format!("{{{} fields}}", obj.len())
            }
        }
    }
}

/// In-memory writer whose contents stay readable after it is boxed
#[cfg(test)]
#[derive(Clone, Default)]
pub(crate) struct SharedBuffer(std::rc::Rc<std::cell::RefCell<Vec<u8>>>);

#[cfg(test)]
impl SharedBuffer {
    pub(crate) fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.borrow()).into_owned()
    }

    pub(crate) fn writer(&self, format: OutputFormat) -> OutputWriter {
        OutputWriter::with_writer(format, false, false, Box::new(self.clone()))
    }
}

#[cfg(test)]
impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
