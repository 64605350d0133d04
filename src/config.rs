//! Configuration loading via `ortho-config`.
//!
//! Connection parameters are read once, in a single pass, into
//! [`OpenStackConfig`]. [`OpenStackConfig::resolve`] then applies the domain
//! compatibility shim and checks every required value, producing the
//! [`Credentials`] the rest of the pipeline works from.

use std::fmt;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use thiserror::Error;

/// `OpenStack` connection parameters derived from environment variables and
/// configuration files.
///
/// Every field is optional at load time so that missing values are reported
/// by [`OpenStackConfig::resolve`] with the variable name attached.
#[derive(Clone, Debug, Default, Deserialize, OrthoConfig, PartialEq, Eq)]
#[ortho_config(prefix = "OS")]
pub struct OpenStackConfig {
    /// Keystone identity endpoint.
    pub auth_url: Option<String>,
    /// User name used for password authentication.
    pub username: Option<String>,
    /// Password used for password authentication.
    pub password: Option<String>,
    /// Domain identifier of the project.
    pub project_domain_id: Option<String>,
    /// Region hosting the compute service.
    pub region_name: Option<String>,
    /// Project name. Also names the output files.
    pub project_name: Option<String>,
    /// Domain name of the user.
    pub user_domain_name: Option<String>,
    /// Endpoint interface to use (`public`, `internal` or `admin`).
    pub interface: Option<String>,
    /// Project identifier used to scope the token.
    pub project_id: Option<String>,
    /// Legacy domain name. Replaced by `user_domain_name` when that is set.
    pub domain_name: Option<String>,
}

/// Metadata for a configuration field, used to generate actionable error messages.
struct FieldMetadata {
    description: &'static str,
    env_var: &'static str,
}

impl FieldMetadata {
    const fn new(description: &'static str, env_var: &'static str) -> Self {
        Self {
            description,
            env_var,
        }
    }
}

impl OpenStackConfig {
    fn require_field(
        value: Option<&String>,
        metadata: &FieldMetadata,
    ) -> Result<String, ConfigError> {
        match value.map(|raw| raw.trim()) {
            Some(trimmed) if !trimmed.is_empty() => Ok(trimmed.to_owned()),
            _ => Err(ConfigError::MissingField(format!(
                "missing {}: set {}",
                metadata.description, metadata.env_var
            ))),
        }
    }

    /// Loads configuration without attempting to parse CLI arguments. Values
    /// merge configuration files and environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] when the merge fails.
    pub fn load_without_cli_args() -> Result<Self, ConfigError> {
        Self::load_from_iter([std::ffi::OsString::from("os-inventory")])
            .map_err(|err| ConfigError::Parse(err.to_string()))
    }

    /// Applies the domain-name compatibility shim in place.
    ///
    /// Newer clouds only publish `OS_USER_DOMAIN_NAME`, older ones only
    /// `OS_DOMAIN_NAME`. When the legacy value is blank, or the user domain is
    /// present, the legacy value takes the user domain.
    pub fn apply_domain_shim(&mut self) {
        let domain_blank = self
            .domain_name
            .as_deref()
            .is_none_or(|value| value.trim().is_empty());
        let user_domain_present = self
            .user_domain_name
            .as_deref()
            .is_some_and(|value| !value.trim().is_empty());
        if domain_blank || user_domain_present {
            self.domain_name.clone_from(&self.user_domain_name);
        }
    }

    /// Applies the domain shim and validates every required field, in the
    /// order the variables are documented.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingField`] naming the first blank variable.
    pub fn resolve(mut self) -> Result<Credentials, ConfigError> {
        self.apply_domain_shim();

        let auth_url = Self::require_field(
            self.auth_url.as_ref(),
            &FieldMetadata::new("Keystone auth URL", "OS_AUTH_URL"),
        )?;
        let username = Self::require_field(
            self.username.as_ref(),
            &FieldMetadata::new("user name", "OS_USERNAME"),
        )?;
        let password = Self::require_field(
            self.password.as_ref(),
            &FieldMetadata::new("password", "OS_PASSWORD"),
        )?;
        let project_domain_id = Self::require_field(
            self.project_domain_id.as_ref(),
            &FieldMetadata::new("project domain ID", "OS_PROJECT_DOMAIN_ID"),
        )?;
        let region_name = Self::require_field(
            self.region_name.as_ref(),
            &FieldMetadata::new("region name", "OS_REGION_NAME"),
        )?;
        let project_name = Self::require_field(
            self.project_name.as_ref(),
            &FieldMetadata::new("project name", "OS_PROJECT_NAME"),
        )?;
        let user_domain_name = Self::require_field(
            self.user_domain_name.as_ref(),
            &FieldMetadata::new("user domain name", "OS_USER_DOMAIN_NAME"),
        )?;
        let interface = Self::require_field(
            self.interface.as_ref(),
            &FieldMetadata::new("endpoint interface", "OS_INTERFACE"),
        )?;
        let project_id = Self::require_field(
            self.project_id.as_ref(),
            &FieldMetadata::new("project ID", "OS_PROJECT_ID"),
        )?;
        let domain_name = Self::require_field(
            self.domain_name.as_ref(),
            &FieldMetadata::new("domain name", "OS_DOMAIN_NAME"),
        )?;

        Ok(Credentials {
            auth_url,
            username,
            password,
            project_domain_id,
            region_name,
            project_name,
            user_domain_name,
            interface,
            project_id,
            domain_name,
        })
    }
}

/// Validated connection parameters. Every field is non-empty and trimmed.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Keystone identity endpoint.
    pub auth_url: String,
    /// User name used for password authentication.
    pub username: String,
    /// Password used for password authentication.
    pub password: String,
    /// Domain identifier of the project.
    pub project_domain_id: String,
    /// Region hosting the compute service.
    pub region_name: String,
    /// Project name.
    pub project_name: String,
    /// Domain name of the user.
    pub user_domain_name: String,
    /// Endpoint interface to use.
    pub interface: String,
    /// Project identifier used to scope the token.
    pub project_id: String,
    /// Domain name after the compatibility shim.
    pub domain_name: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("auth_url", &self.auth_url)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("project_domain_id", &self.project_domain_id)
            .field("region_name", &self.region_name)
            .field("project_name", &self.project_name)
            .field("user_domain_name", &self.user_domain_name)
            .field("interface", &self.interface)
            .field("project_id", &self.project_id)
            .field("domain_name", &self.domain_name)
            .finish()
    }
}

/// Per-run switches that shape what gets written besides the inventory.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct OutputOptions {
    /// Echo the rendered inventory to standard output.
    pub debug: bool,
    /// Emit the known-hosts reset script.
    pub ssh_reset: bool,
    /// DNS suffix appended to host names in the reset script.
    pub dns_domain: Option<String>,
}

impl OutputOptions {
    /// Interprets raw flag values the way the environment variables are
    /// documented: `DEBUG` is on for any non-empty value, `SSH_RESET` only for
    /// exactly `true`, and a blank `DNS_DOMAIN` counts as unset.
    #[must_use]
    pub fn from_raw(debug: Option<&str>, ssh_reset: Option<&str>, dns_domain: Option<&str>) -> Self {
        Self {
            debug: debug.is_some_and(|value| !value.is_empty()),
            ssh_reset: ssh_reset == Some("true"),
            dns_domain: dns_domain
                .map(str::trim)
                .filter(|value| !value.is_empty())
                .map(str::to_owned),
        }
    }
}

/// Errors raised during configuration loading and validation.
#[derive(Debug, Error, Eq, PartialEq)]
pub enum ConfigError {
    /// Indicates a required configuration field is empty or missing.
    #[error("missing configuration field: {0}")]
    MissingField(String),
    /// Surfaces errors from the `ortho-config` loader.
    #[error("configuration parsing failed: {0}")]
    Parse(String),
}

impl From<ortho_config::OrthoError> for ConfigError {
    fn from(value: ortho_config::OrthoError) -> Self {
        Self::Parse(value.to_string())
    }
}
