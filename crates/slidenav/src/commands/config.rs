use anyhow::Result;
use colored::Colorize;

use slidenav::config::Config;

use crate::cli::ConfigCommands;

pub fn run(command: ConfigCommands) -> Result<()> {
    match command {
        ConfigCommands::Show => show(),
        ConfigCommands::Set { key, value } => set(&key, &value),
    }
}

fn show() -> Result<()> {
    let path = Config::path()?;
    let config = Config::load_or_default();

    println!("{} {}", "Config file:".bold(), path.display());
    if !path.exists() {
        println!("{}", "  (not created yet, showing defaults)".dimmed());
    }
    println!();
    print_entry("defaults.theme", config.theme().unwrap_or("light"));
    let start = config
        .defaults
        .as_ref()
        .and_then(|d| d.start_slide.clone())
        .unwrap_or_else(|| "first".to_string());
    print_entry("defaults.start_slide", &start);
    print_entry("defaults.windowed", &config.windowed().to_string());
    Ok(())
}

fn print_entry(key: &str, value: &str) {
    println!("  {:<22} {}", key.cyan(), value);
}

fn set(key: &str, value: &str) -> Result<()> {
    let mut config = Config::load_or_default();
    config.set(key, value)?;
    let path = config.save()?;
    println!("{} {key} = {value}", "Set".green().bold());
    println!("{}", format!("Saved to {}", path.display()).dimmed());
    Ok(())
}
