pub mod auth;
pub mod users;

use serde_json::json;

use crate::cli::utils::print_done;
use crate::cli::OutputFormat;
use crate::config::config;

pub fn show_config(output_format: OutputFormat) -> anyhow::Result<()> {
    let config = config();
    match output_format {
        OutputFormat::Json => print_done(
            &output_format,
            "Effective configuration",
            &[("config", json!(config))],
        ),
        OutputFormat::Text => {
            println!("{}", serde_json::to_string_pretty(config)?);
            Ok(())
        }
    }
}
