//! CLI configuration: a thin layer over `lawliet_config`.
//!
//! Adds resolution that respects `GlobalOpts` flag overrides
//! (--profile, --server, --insecure, --timeout).

use std::time::Duration;

use lawliet_core::{ClientConfig, TlsVerification};

use crate::cli::GlobalOpts;
use crate::error::CliError;

pub use lawliet_config::{Config, Defaults, Profile, config_path, load_config, save_config};

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .unwrap_or_else(|| config.active_profile_name().to_owned())
}

/// Translate the active profile plus global flags into a `ClientConfig`.
///
/// Flag overrides take priority over profile values.
pub fn resolve(global: &GlobalOpts, config: &Config) -> Result<ClientConfig, CliError> {
    let name = active_profile_name(global, config);
    let mut profile = config.profile(&name).map_err(|_| CliError::ProfileNotFound {
        name: name.clone(),
        available: available_profiles(config),
    })?;

    if let Some(server) = &global.server {
        profile.server.clone_from(server);
    }

    let mut client = lawliet_config::profile_to_client_config(&profile, &config.defaults)?;
    if global.insecure {
        client.tls = TlsVerification::DangerAcceptInvalid;
    }
    if let Some(secs) = global.timeout {
        client.timeout = Duration::from_secs(secs);
    }
    Ok(client)
}

/// Buffer size to submit: the flag when given, else the configured default.
/// Range checks happen at submission.
pub fn buffer_size(flag: Option<u32>, config: &Config) -> u32 {
    flag.unwrap_or(config.defaults.buffer_size)
}

fn available_profiles(config: &Config) -> String {
    if config.profiles.is_empty() {
        "(none)".into()
    } else {
        config.profiles.keys().cloned().collect::<Vec<_>>().join(", ")
    }
}
