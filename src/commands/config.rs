//! Config subcommands handler

use anyhow::Result;

use flowlog::Config;

/// Show the effective configuration as TOML.
#[cfg(not(tarpaulin_include))]
pub fn handle_show() -> Result<()> {
    let config = Config::load()?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{}", toml_str.trim_end());
    Ok(())
}

/// Print the configuration file path.
#[cfg(not(tarpaulin_include))]
pub fn handle_path() -> Result<()> {
    let config_path = Config::config_path()?;
    println!("{}", config_path.display());
    Ok(())
}
