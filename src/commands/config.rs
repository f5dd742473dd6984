//! Config command - offline inspection of the credentials file.
//!
//! Checks presence and shape of the recognized keys without making any
//! network calls, so a bad file is caught before a verification run.

use anyhow::{bail, Context, Result};
use colored::Colorize;
use std::fs;
use std::path::Path;
use uuid::Uuid;

use crate::api::DEFAULT_BASE_URL;
use crate::credentials::{parse_env_file, KEY_BASE_URL, KEY_ORGANIZATION_UUID, REQUIRED_KEYS};

/// Execute the config command.
pub fn execute(env_file: &Path) -> Result<()> {
    println!("{}", "Inspecting credentials file...".bold());
    println!("File: {}", env_file.display());
    println!();

    if !env_file.exists() {
        bail!("credentials file not found: {}", env_file.display());
    }
    let content = fs::read_to_string(env_file)
        .with_context(|| format!("failed to read {}", env_file.display()))?;
    let vars = parse_env_file(&content);

    let mut issues = 0;

    for key in REQUIRED_KEYS {
        match vars.get(key) {
            Some(value) => println!("  {} {key} = {}", "✓".green(), mask_value(value)),
            None => {
                println!("  {} {key} {}", "✗".red(), "(missing)".red());
                issues += 1;
            }
        }
    }

    match vars.get(KEY_ORGANIZATION_UUID) {
        Some(raw) if Uuid::parse_str(raw).is_ok() => {
            println!("  {} {KEY_ORGANIZATION_UUID} = {raw}", "✓".green());
        }
        Some(raw) => {
            println!(
                "  {} {KEY_ORGANIZATION_UUID} = {raw} {}",
                "✗".red(),
                "(not a valid UUID)".red()
            );
            issues += 1;
        }
        None => println!(
            "  {} {KEY_ORGANIZATION_UUID} {}",
            "-".dimmed(),
            "(optional, not set; first listed organization will be used)".dimmed()
        ),
    }

    match vars.get(KEY_BASE_URL) {
        Some(url) => println!("  {} {KEY_BASE_URL} = {url}", "✓".green()),
        None => println!(
            "  {} {KEY_BASE_URL} {}",
            "-".dimmed(),
            "(optional, not set)".dimmed()
        ),
    }

    let base_url = vars
        .get(KEY_BASE_URL)
        .cloned()
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
    println!();
    println!("Resolved base URL: {base_url}");

    if issues == 0 {
        println!();
        println!("{}", "Credentials file is complete.".green().bold());
        Ok(())
    } else {
        println!();
        println!("{} {} issue(s) found", "✗".red().bold(), issues);
        std::process::exit(1);
    }
}

/// Show only the first few characters of a secret value.
fn mask_value(value: &str) -> String {
    let visible: String = value.chars().take(4).collect();
    format!("{visible}****")
}
