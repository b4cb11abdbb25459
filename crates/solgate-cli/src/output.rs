//! Output formatting for human-readable and JSON modes.
//!
//! Human mode uses colored terminal output.
//! JSON mode outputs pure JSON with no ANSI escapes.

use colored::Colorize;

/// Prints a success message.
pub fn print_success(msg: &str, json_mode: bool) {
    if json_mode {
        let obj = serde_json::json!({ "status": "ok", "message": msg });
        println!("{}", obj);
    } else {
        println!("{} {}", "✓".green().bold(), msg);
    }
}

/// Prints an informational progress message.
pub fn print_info(msg: &str, json_mode: bool) {
    if json_mode {
        let obj = serde_json::json!({ "status": "info", "message": msg });
        println!("{}", obj);
    } else {
        println!("{} {}", "→".cyan(), msg);
    }
}

/// Prints a single key-value pair.
pub fn print_kv(key: &str, value: &str, json_mode: bool) {
    if json_mode {
        let obj = serde_json::json!({ key: value });
        println!("{}", obj);
    } else {
        println!("{}: {}", key.bold(), value);
    }
}

/// Prints an error message.
pub fn print_error(msg: &str, json_mode: bool) {
    if json_mode {
        let obj = serde_json::json!({ "error": msg });
        eprintln!("{}", obj);
    } else {
        eprintln!("{} {}", "error:".red().bold(), msg);
    }
}

/// Prints a table of rows in human mode, a JSON array in JSON mode.
pub fn print_table(headers: &[&str], rows: &[Vec<String>], json_mode: bool) {
    if json_mode {
        let arr: Vec<serde_json::Value> = rows
            .iter()
            .map(|row| {
                let mut obj = serde_json::Map::new();
                for (i, h) in headers.iter().enumerate() {
                    let val = row.get(i).cloned().unwrap_or_default();
                    obj.insert(h.to_string(), serde_json::Value::String(val));
                }
                serde_json::Value::Object(obj)
            })
            .collect();
        println!("{}", serde_json::Value::Array(arr));
        return;
    }

    if rows.is_empty() {
        println!("{}", "(no results)".dimmed());
        return;
    }

    let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            if i < widths.len() && cell.len() > widths[i] {
                widths[i] = cell.len();
            }
        }
    }

    let header_line: Vec<String> = headers
        .iter()
        .enumerate()
        .map(|(i, h)| format!("{:<w$}", h.to_uppercase(), w = widths[i]))
        .collect();
    println!("{}", header_line.join("  ").bold());

    let sep: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    println!("{}", sep.join("  ").dimmed());

    for row in rows {
        let line: Vec<String> = row
            .iter()
            .enumerate()
            .map(|(i, cell)| {
                let w = widths.get(i).copied().unwrap_or(cell.len());
                format!("{cell:<w$}")
            })
            .collect();
        println!("{}", line.join("  "));
    }
}
