use std::fmt;
use std::net::IpAddr;
use std::path::{Path, PathBuf};

use crate::config::{ConfigError, EnvironmentProvider};

const DEFAULT_DATABASE_URL: &str = "sqlite://union.db?mode=rwc";
const DEFAULT_AUDIT_DATABASE_URL: &str = "sqlite://audit.db?mode=rwc";
const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: &str = "3000";
const DEFAULT_UPLOAD_DIR: &str = "uploads";

/// Infrastructure settings read once at startup
///
/// Everything that can change at runtime lives in the `system_settings`
/// table instead.
pub struct BootstrapSettings {
    database_url: String,
    audit_database_url: String,
    server_host: String,
    server_port: u16,
    upload_dir: PathBuf,
}

impl BootstrapSettings {
    pub fn from_env_provider(env: &dyn EnvironmentProvider) -> Result<Self, ConfigError> {
        let database_url = non_empty(
            "DATABASE_URL",
            env.get_var_or("DATABASE_URL", DEFAULT_DATABASE_URL),
        )?;
        let audit_database_url = non_empty(
            "AUDIT_DATABASE_URL",
            env.get_var_or("AUDIT_DATABASE_URL", DEFAULT_AUDIT_DATABASE_URL),
        )?;

        let server_host = non_empty("HOST", env.get_var_or("HOST", DEFAULT_HOST))?;
        validate_host(&server_host)?;

        let server_port = parse_port(&env.get_var_or("PORT", DEFAULT_PORT))?;

        let upload_dir = PathBuf::from(non_empty(
            "UPLOAD_DIR",
            env.get_var_or("UPLOAD_DIR", DEFAULT_UPLOAD_DIR),
        )?);

        Ok(Self {
            database_url,
            audit_database_url,
            server_host,
            server_port,
            upload_dir,
        })
    }

    /// Convenience method that uses the system environment provider
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_provider(&crate::config::SystemEnvironment)
    }

    pub fn database_url(&self) -> &str {
        &self.database_url
    }

    pub fn audit_database_url(&self) -> &str {
        &self.audit_database_url
    }

    pub fn server_host(&self) -> &str {
        &self.server_host
    }

    pub fn server_port(&self) -> u16 {
        self.server_port
    }

    pub fn upload_dir(&self) -> &Path {
        &self.upload_dir
    }

    pub fn server_address(&self) -> String {
        match self.server_host.parse::<IpAddr>() {
            Ok(IpAddr::V6(_)) => format!("[{}]:{}", self.server_host, self.server_port),
            _ => format!("{}:{}", self.server_host, self.server_port),
        }
    }
}

fn non_empty(setting_name: &str, value: String) -> Result<String, ConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::invalid_setting(setting_name, "must not be empty"));
    }
    Ok(trimmed.to_string())
}

fn validate_host(host: &str) -> Result<(), ConfigError> {
    if host.parse::<IpAddr>().is_ok() {
        return Ok(());
    }

    let valid_hostname = host
        .split('.')
        .all(|label| {
            !label.is_empty()
                && label.len() <= 63
                && !label.starts_with('-')
                && !label.ends_with('-')
                && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
        });

    if valid_hostname {
        Ok(())
    } else {
        Err(ConfigError::invalid_setting(
            "HOST",
            format!("'{}' is neither an IP address nor a hostname", host),
        ))
    }
}

fn parse_port(value: &str) -> Result<u16, ConfigError> {
    let port: u16 = value
        .trim()
        .parse()
        .map_err(|_| ConfigError::invalid_setting("PORT", format!("'{}' is not a valid port", value)))?;

    if port == 0 {
        return Err(ConfigError::invalid_setting("PORT", "must be between 1 and 65535"));
    }

    Ok(port)
}

impl fmt::Debug for BootstrapSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BootstrapSettings")
            .field("database_url", &self.database_url)
            .field("audit_database_url", &self.audit_database_url)
            .field("server_host", &self.server_host)
            .field("server_port", &self.server_port)
            .field("upload_dir", &self.upload_dir)
            .finish()
    }
}
