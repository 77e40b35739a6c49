//! Config command implementation.
//!
//! Manages CLI configuration.

use anyhow::Result;

use crate::config::{validate_ws_url, Config};

/// Show current configuration.
pub fn show(config: &Config) -> Result<()> {
    println!("Agent Trace Viewer Configuration");
    println!("{:-<40}", "");

    println!("Events URL:    {}", config.ws_url);
    println!(
        "Window Size:   {}x{}",
        config.window_width, config.window_height
    );
    println!("Dark Mode:     {}", config.dark_mode);
    println!("Trace Panel:   {}", config.show_sidebar);

    if let Some(config_path) = Config::config_file_path() {
        println!("\nConfig file: {}", config_path.display());
    }

    Ok(())
}

/// Print the config file location.
pub fn path() -> Result<()> {
    match Config::config_file_path() {
        Some(path) => println!("{}", path.display()),
        None => println!("(no config file path available)"),
    }
    Ok(())
}

/// Persist a new events URL.
pub fn set_url(config: &mut Config, url: &str) -> Result<()> {
    validate_ws_url(url)?;
    config.ws_url = url.to_string();
    config.save()?;
    println!("Set events URL to: {}", url);
    Ok(())
}
