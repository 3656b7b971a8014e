//! Configuration validation functions.

use super::Config;

const ROTATIONS: [&str; 4] = ["daily", "hourly", "minutely", "never"];

/// Reject configurations the server cannot run with.
pub fn validate_config(config: &Config) -> anyhow::Result<()> {
    if config.port == 0 {
        anyhow::bail!("port must be between 1 and 65535");
    }

    let server = &config.server;
    if server.max_chat_message_length == 0 {
        anyhow::bail!("server.max_chat_message_length must be at least 1");
    }
    if server.reaper_interval_secs == 0 {
        anyhow::bail!("server.reaper_interval_secs must be at least 1 second");
    }
    if server.waiting_timeout_secs != 0 && server.waiting_timeout_secs < server.reaper_interval_secs
    {
        eprintln!(
            "WARNING: server.waiting_timeout_secs ({}) is shorter than server.reaper_interval_secs ({}); \
             waiting clients may be held up to one reaper interval past the timeout",
            server.waiting_timeout_secs, server.reaper_interval_secs
        );
    }
    if server.server_name.trim().is_empty() {
        anyhow::bail!("server.server_name must not be empty");
    }

    let security = &config.security;
    if security.max_message_size < 1024 {
        anyhow::bail!(
            "security.max_message_size must be at least 1024 bytes (configured: {})",
            security.max_message_size
        );
    }
    if security.max_connections_per_ip == 0 {
        anyhow::bail!("security.max_connections_per_ip must be at least 1");
    }
    if security.cors_origins.trim().is_empty() {
        anyhow::bail!("security.cors_origins must be \"*\" or a comma-separated origin list");
    }

    config.websocket.validate()?;

    let rotation = config.logging.rotation.to_lowercase();
    if !ROTATIONS.contains(&rotation.as_str()) {
        anyhow::bail!(
            "logging.rotation must be one of {:?} (configured: {})",
            ROTATIONS,
            config.logging.rotation
        );
    }

    Ok(())
}
