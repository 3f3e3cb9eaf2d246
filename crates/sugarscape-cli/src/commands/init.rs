//! Initialize a new Sugarscape project.

use anyhow::{Context, Result};
use colored::Colorize;
use std::path::PathBuf;

use crate::config::{Config, CONFIG_FILE};

pub fn run(path: Option<PathBuf>, force: bool) -> Result<()> {
    let base_path = match path {
        Some(p) => p,
        None => std::env::current_dir().context("Failed to read current directory")?,
    };

    println!("{} Initializing Sugarscape project...", "→".blue());

    std::fs::create_dir_all(&base_path)
        .with_context(|| format!("Failed to create {}", base_path.display()))?;

    let config_path = base_path.join(CONFIG_FILE);
    if config_path.exists() && !force {
        println!("  {} {} already exists", "•".yellow(), config_path.display());
    } else {
        Config::default().save(&config_path)?;
        println!("  {} Created {}", "✓".green(), config_path.display());
    }

    let config = Config::load_from(&config_path)?;
    let gitignore_path = base_path.join(".gitignore");
    if !gitignore_path.exists() {
        std::fs::write(&gitignore_path, format!("{}/\n", config.run.output_dir.display()))
            .with_context(|| format!("Failed to write {}", gitignore_path.display()))?;
        println!("  {} Created {}", "✓".green(), gitignore_path.display());
    }

    println!();
    println!("{} Sugarscape project initialized!", "✓".green().bold());
    println!();
    println!("Next steps:");
    println!("  {} edit {} to tune the world", "1.".blue(), CONFIG_FILE);
    println!("  {} sugarscape run --ticks 30", "2.".blue());
    println!("  {} sugarscape show outputs/run_01/run_01.json", "3.".blue());

    Ok(())
}
