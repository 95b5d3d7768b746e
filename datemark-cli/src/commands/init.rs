use anyhow::Result;
use datemark_core::config::DatemarkConfig;
use owo_colors::OwoColorize;

pub fn run() -> Result<()> {
    let path = DatemarkConfig::config_path()?;

    if path.exists() {
        println!(
            "{}",
            format!("  Config already exists at {}", path.display()).dimmed()
        );
        return Ok(());
    }

    DatemarkConfig::create_default_config(&path)?;
    println!("{}", format!("  Created {}", path.display()).green());
    Ok(())
}
