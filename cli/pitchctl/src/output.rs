//! Output formatting for CLI commands.
//!
//! JSON goes to stdout pretty-printed with keys in lexical order; tables use
//! `tabled` with the row types' column names.

use clap::ValueEnum;
use colored::Colorize;
use serde::Serialize;
use tabled::{Table, Tabled};

/// Output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table format.
    #[default]
    Table,
    /// JSON format.
    Json,
}

/// Print a list of rows.
pub fn print_output<T: Serialize + Tabled>(rows: &[T], format: OutputFormat) {
    match format {
        OutputFormat::Table if rows.is_empty() => println!("{}", "No rows.".dimmed()),
        OutputFormat::Table => println!("{}", Table::new(rows)),
        OutputFormat::Json => println!("{}", to_json(rows)),
    }
}

/// Print one record: a single-row table, or `json` as a JSON object.
///
/// The table row and the JSON body are separate so the JSON keeps typed
/// fields while the table gets display strings.
pub fn print_record<R: Tabled, J: Serialize>(row: R, json: &J, format: OutputFormat) {
    match format {
        OutputFormat::Table => println!("{}", Table::new([row])),
        OutputFormat::Json => println!("{}", to_json(json)),
    }
}

/// Print one row that serves as both the table and the JSON body.
pub fn print_row<T: Serialize + Tabled>(row: T, format: OutputFormat) {
    match format {
        OutputFormat::Table => println!("{}", Table::new([row])),
        OutputFormat::Json => println!("{}", to_json(&row)),
    }
}

/// Print a success message.
pub fn print_success(message: &str) {
    println!("{} {}", "Success:".green().bold(), message);
}

/// Print an info message.
pub fn print_info(message: &str) {
    println!("{} {}", "Info:".blue().bold(), message);
}

/// Table cell text for an optional value.
pub fn dash<T: ToString>(value: Option<T>) -> String {
    value.map_or_else(|| "-".to_string(), |v| v.to_string())
}

fn to_json<T: Serialize + ?Sized>(data: &T) -> String {
    serde_json::to_value(data)
        .and_then(|mut value| {
            value.sort_all_objects();
            serde_json::to_string_pretty(&value)
        })
        .unwrap_or_else(|e| format!("{{\"error\": \"{e}\"}}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    #[serde(rename_all = "camelCase")]
    struct Sample {
        r#type: &'static str,
        area_code: &'static str,
        nested: Vec<Inner>,
    }

    #[derive(Serialize)]
    struct Inner {
        z: bool,
        y: bool,
    }

    #[test]
    fn json_keys_are_ordered() {
        let out = to_json(&Sample {
            r#type: "application",
            area_code: "PA",
            nested: vec![Inner { z: true, y: false }],
        });
        assert!(out.find("\"areaCode\"").unwrap() < out.find("\"type\"").unwrap());
        assert!(out.find("\"y\"").unwrap() < out.find("\"z\"").unwrap());
    }

    #[test]
    fn dash_fills_missing_values() {
        assert_eq!(dash(Some(7)), "7");
        assert_eq!(dash::<u16>(None), "-");
    }
}
