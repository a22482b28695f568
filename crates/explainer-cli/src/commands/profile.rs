//! Profile command implementation.

use crate::cli::{ProfileAction, ProfileArgs};
use crate::config::{Config, Profile};
use crate::error::{CliError, Result};
use crate::output::Formatter;
use explainer_llm::BackendKind;
use std::path::Path;

/// Execute the profile command.
pub fn execute_profile(
    args: ProfileArgs,
    config: &mut Config,
    config_path: &Path,
    formatter: &Formatter,
) -> Result<()> {
    match args.action {
        ProfileAction::List => list_profiles(config, formatter),
        ProfileAction::Show => show_active_profile(config, formatter),
        ProfileAction::Switch { name } => switch_profile(config, config_path, name, formatter),
        ProfileAction::Set {
            name,
            backend,
            base_url,
            model,
            timeout_secs,
        } => {
            let profile = build_profile(&backend, base_url, model, timeout_secs)?;
            set_profile(config, config_path, name, profile, formatter)
        }
        ProfileAction::Delete { name } => delete_profile(config, config_path, name, formatter),
    }
}

/// Profile for `backend`, with unset fields taken from that backend's defaults.
fn build_profile(
    backend: &str,
    base_url: Option<String>,
    model: Option<String>,
    timeout_secs: Option<u64>,
) -> Result<Profile> {
    let kind = BackendKind::parse(backend)?;
    let mut profile = Profile::for_backend(kind);
    if let Some(url) = base_url {
        profile.base_url = url;
    }
    if let Some(m) = model {
        profile.model = m;
    }
    if let Some(t) = timeout_secs {
        if t == 0 {
            return Err(CliError::InvalidInput("Timeout must be greater than 0".to_string()));
        }
        profile.timeout_secs = t;
    }
    Ok(profile)
}

fn print_profile(profile: &Profile, indent: &str) {
    println!("{}Backend: {}", indent, profile.backend);
    println!("{}URL: {}", indent, profile.base_url);
    println!("{}Model: {}", indent, profile.model);
    println!("{}Timeout: {}s", indent, profile.timeout_secs);
}

/// List all profiles.
fn list_profiles(config: &Config, formatter: &Formatter) -> Result<()> {
    if config.profiles.is_empty() {
        println!("{}", formatter.info("No profiles configured"));
        return Ok(());
    }

    println!("Available profiles:");
    for (name, profile) in &config.profiles {
        if name == &config.active_profile {
            println!("* {}", formatter.success(name));
        } else {
            println!("  {}", name);
        }
        print_profile(profile, "    ");
    }

    Ok(())
}

/// Show the active profile.
fn show_active_profile(config: &Config, formatter: &Formatter) -> Result<()> {
    let profile = config.get_active_profile()?;

    println!("Active profile: {}", formatter.success(&config.active_profile));
    print_profile(profile, "  ");

    Ok(())
}

/// Switch to a different profile.
fn switch_profile(
    config: &mut Config,
    config_path: &Path,
    name: String,
    formatter: &Formatter,
) -> Result<()> {
    config.switch_profile(name.clone())?;
    config.save(config_path)?;
    println!(
        "{}",
        formatter.success(&format!("Switched to profile '{}'", name))
    );
    Ok(())
}

/// Create or update a profile.
fn set_profile(
    config: &mut Config,
    config_path: &Path,
    name: String,
    profile: Profile,
    formatter: &Formatter,
) -> Result<()> {
    let action = if config.profiles.contains_key(&name) {
        "Updated"
    } else {
        "Created"
    };

    config.set_profile(name.clone(), profile);
    config.save(config_path)?;

    println!(
        "{}",
        formatter.success(&format!("{} profile '{}'", action, name))
    );

    Ok(())
}

/// Delete a profile.
fn delete_profile(
    config: &mut Config,
    config_path: &Path,
    name: String,
    formatter: &Formatter,
) -> Result<()> {
    if name == config.active_profile {
        return Err(CliError::NotPermitted(
            "Cannot delete the active profile".to_string(),
        ));
    }

    if config.profiles.remove(&name).is_some() {
        config.save(config_path)?;
        println!(
            "{}",
            formatter.success(&format!("Deleted profile '{}'", name))
        );
    } else {
        println!(
            "{}",
            formatter.warning(&format!("Profile '{}' does not exist", name))
        );
    }

    Ok(())
}
