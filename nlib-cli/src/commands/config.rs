use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use nlib_core::Settings;

use crate::CliError;

use super::Context;

/// Print the effective settings (file values plus command-line overrides).
pub(crate) fn run_config_show(ctx: &Context) -> Result<(), CliError> {
    let text = ctx.settings.to_toml_string()?;
    if ctx.json {
        println!("{}", serde_json::to_string_pretty(&ctx.settings)?);
        return Ok(());
    }

    let state = if ctx.settings_path.exists() {
        "(exists)".if_supports_color(Stdout, |t| t.green()).to_string()
    } else {
        "(not found, using defaults)"
            .if_supports_color(Stdout, |t| t.dimmed())
            .to_string()
    };
    log::info!(
        "  Settings file: {} {}",
        ctx.settings_path
            .display()
            .if_supports_color(Stdout, |t| t.cyan()),
        state
    );
    crate::log_blank();
    for line in text.lines() {
        log::info!("{}", line);
    }
    Ok(())
}

/// Print the settings file path.
pub(crate) fn run_config_path(ctx: &Context) -> Result<(), CliError> {
    println!("{}", ctx.settings_path.display());
    Ok(())
}

/// Write a settings file holding every default.
pub(crate) fn run_config_init(ctx: &Context, force: bool) -> Result<(), CliError> {
    if ctx.settings_path.exists() && !force {
        log::warn!(
            "Settings file already exists at {} (use --force to overwrite)",
            ctx.settings_path.display()
        );
        return Ok(());
    }
    Settings::default().save(&ctx.settings_path)?;
    log::info!(
        "Wrote default settings to {}",
        ctx.settings_path
            .display()
            .if_supports_color(Stdout, |t| t.cyan())
    );
    Ok(())
}
