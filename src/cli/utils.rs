use serde_json::{Map, Value};

use crate::cli::OutputFormat;
use crate::database::models::User;

/// Print a completed command. Text mode shows the message with the fields aligned under it.
pub fn print_done(
    output_format: &OutputFormat,
    message: &str,
    fields: &[(&str, Value)],
) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&done_json(message, fields))?),
        OutputFormat::Text => print!("{}", done_text(message, fields)),
    }
    Ok(())
}

/// Print a command that ran but declined to act, e.g. an email that is already taken
pub fn print_refused(output_format: &OutputFormat, message: &str, code: &str) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let body = serde_json::json!({ "ok": false, "code": code, "error": message });
            println!("{}", serde_json::to_string_pretty(&body)?);
        }
        OutputFormat::Text => eprintln!("{} ({})", message, code),
    }
    Ok(())
}

/// Print accounts as a JSON array or an aligned table
pub fn print_users(output_format: &OutputFormat, users: &[User]) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(users)?),
        OutputFormat::Text => print!("{}", user_table(users)),
    }
    Ok(())
}

fn done_json(message: &str, fields: &[(&str, Value)]) -> Value {
    let mut body = Map::new();
    body.insert("ok".to_string(), Value::Bool(true));
    body.insert("message".to_string(), Value::String(message.to_string()));
    for (key, value) in fields {
        body.insert(key.to_string(), value.clone());
    }
    Value::Object(body)
}

fn done_text(message: &str, fields: &[(&str, Value)]) -> String {
    let width = fields.iter().map(|(key, _)| key.len()).max().unwrap_or(0);
    let mut out = format!("{}\n", message);
    for (key, value) in fields {
        out.push_str(&format!("  {:<width$}  {}\n", key, plain(value), width = width));
    }
    out
}

fn user_table(users: &[User]) -> String {
    const HEADERS: [&str; 5] = ["ID", "EMAIL", "ROLE", "DEPARTMENT", "REQUEST"];

    let rows: Vec<[String; 5]> = users
        .iter()
        .map(|u| {
            [
                u.id.to_string(),
                u.email.clone(),
                u.role.to_string(),
                u.department.clone().unwrap_or_else(|| "-".to_string()),
                u.admin_request.as_str().to_string(),
            ]
        })
        .collect();

    let mut widths = HEADERS.map(str::len);
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.len());
        }
    }

    let mut out = table_line(&HEADERS.map(str::to_string), &widths);
    for row in &rows {
        out.push_str(&table_line(row, &widths));
    }
    out.push_str(&format!("{} account(s)\n", rows.len()));
    out
}

fn table_line(cells: &[String; 5], widths: &[usize; 5]) -> String {
    let padded: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| format!("{:<width$}", cell, width = width))
        .collect();
    format!("{}\n", padded.join("  ").trim_end())
}

/// Strings print bare, everything else as compact JSON
fn plain(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
