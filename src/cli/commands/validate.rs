//! Validate config command implementation
//!
//! This module implements the `validate-config` command for validating
//! the Ferry configuration file.

use super::{EXIT_CONFIG, EXIT_OK};
use crate::config::load_config;
use crate::config::schema::{DatabaseTarget, FerryConfig};
use clap::Args;
use secrecy::ExposeSecret;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("🔍 Validating configuration file: {config_path}");
        println!();

        // Loading applies substitution, overrides and validation
        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                println!("❌ Configuration validation failed");
                println!("   Error: {e}");
                println!();
                return Ok(EXIT_CONFIG);
            }
        };

        println!("✅ Configuration is valid");
        println!();
        for line in summary(&config) {
            println!("{line}");
        }
        println!();
        Ok(EXIT_OK)
    }
}

fn summary(config: &FerryConfig) -> Vec<String> {
    let mut lines = vec![
        "Configuration Summary:".to_string(),
        format!("  Log Level: {}", config.application.log_level),
        format!("  Chunk Size: {}", config.batch.chunk_size),
        format!("  Page Size: {}", config.batch.page_size),
        format!("  Export Path: {}", config.batch.export_path),
        format!("  Delimiter: '{}'", config.batch.delimiter),
    ];

    match config.database_target {
        DatabaseTarget::Memory => {
            lines.push("  Database Target: memory (nothing persists between runs)".to_string());
        }
        DatabaseTarget::PostgreSQL => {
            lines.push("  Database Target: PostgreSQL".to_string());
            if let Some(pg_config) = &config.postgresql {
                let conn_str: &str = pg_config.connection_string.expose_secret().as_ref();
                lines.push(format!(
                    "  PostgreSQL Server: {}",
                    conn_str.rsplit('@').next().unwrap_or("***")
                ));
                lines.push(format!("  Max Connections: {}", pg_config.max_connections));
            }
        }
    }

    lines.push(format!(
        "  File Logging: {}",
        if config.logging.local_enabled {
            format!("{} ({})", config.logging.local_path, config.logging.local_rotation)
        } else {
            "disabled".to_string()
        }
    ));
    lines
}
