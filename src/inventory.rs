//! Projection of instances into an Ansible inventory and its YAML form.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::backend::Instance;
use crate::resolve::{AddressPolicy, ResolveError, resolve_address};

/// Remote user Ansible connects as.
pub const DEFAULT_REMOTE_USER: &str = "ubuntu";

/// Extra SSH arguments applied to every host.
pub const DEFAULT_SSH_OPTIONS: &str = "-o StrictHostKeyChecking=no";

/// Plain scalars that YAML 1.1 readers, Ansible among them, load as booleans.
const YAML_1_1_BOOLEANS: [&str; 16] = [
    "y", "Y", "yes", "Yes", "YES", "n", "N", "no", "No", "NO", "on", "On", "ON", "off", "Off",
    "OFF",
];

/// Errors raised while building or (de)serialising an inventory.
#[derive(Debug, Error)]
pub enum InventoryError {
    /// Raised when an active instance has no usable address.
    #[error(transparent)]
    Resolve(#[from] ResolveError),
    /// Raised when the inventory cannot be rendered.
    #[error("failed to render inventory: {0}")]
    Render(#[source] serde_yaml::Error),
    /// Raised when inventory text cannot be parsed.
    #[error("failed to parse inventory: {0}")]
    Parse(#[source] serde_yaml::Error),
}

/// How Ansible reaches one host.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct InventoryHost {
    /// Address Ansible connects to.
    #[serde(rename = "ansible_host")]
    pub address: String,
    /// Host name, equal to the instance name.
    pub hostname: String,
}

/// Connection variables shared by every host.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct InventoryVariables {
    /// Remote login user.
    #[serde(rename = "ansible_user")]
    pub remote_user: String,
    /// Extra arguments for every SSH invocation.
    #[serde(rename = "ansible_ssh_common_args")]
    pub ssh_options: String,
}

impl Default for InventoryVariables {
    fn default() -> Self {
        Self {
            remote_user: DEFAULT_REMOTE_USER.to_owned(),
            ssh_options: DEFAULT_SSH_OPTIONS.to_owned(),
        }
    }
}

/// The `all` group: hosts keyed by instance name plus shared variables.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct HostGroup {
    /// Hosts keyed by instance name.
    pub hosts: BTreeMap<String, InventoryHost>,
    /// Variables applied to every host.
    pub vars: InventoryVariables,
}

/// Top-level inventory document.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct Inventory {
    /// The implicit group containing every host.
    pub all: HostGroup,
}

impl Inventory {
    /// Renders the inventory as YAML.
    ///
    /// Host names and values that a YAML 1.1 reader would take for a
    /// boolean (`yes`, `on`, `n` and friends) are single-quoted so Ansible
    /// reads them back as strings.
    ///
    /// # Errors
    ///
    /// Returns [`InventoryError::Render`] when serialisation fails.
    pub fn to_yaml(&self) -> Result<String, InventoryError> {
        serde_yaml::to_string(self)
            .map(|yaml| quote_boolean_words(&yaml))
            .map_err(InventoryError::Render)
    }

    /// Parses an inventory previously rendered by [`Inventory::to_yaml`].
    ///
    /// # Errors
    ///
    /// Returns [`InventoryError::Parse`] when the text is not a valid
    /// inventory.
    pub fn from_yaml(text: &str) -> Result<Self, InventoryError> {
        serde_yaml::from_str(text).map_err(InventoryError::Parse)
    }

    /// Number of hosts in the inventory.
    #[must_use]
    pub fn host_count(&self) -> usize {
        self.all.hosts.len()
    }
}

/// Quotes plain mapping keys and values that YAML 1.1 resolves to booleans.
///
/// The inventory is a block mapping of plain scalars, one entry per line, so
/// each line is split into its key and optional value.
fn quote_boolean_words(yaml: &str) -> String {
    let mut out = String::with_capacity(yaml.len());
    for line in yaml.split_inclusive('\n') {
        let content = line.strip_suffix('\n').unwrap_or(line);
        let body = content.trim_start();
        out.push_str(content.strip_suffix(body).unwrap_or_default());
        match body.split_once(": ") {
            Some((key, value)) => {
                push_scalar(&mut out, key);
                out.push_str(": ");
                push_scalar(&mut out, value);
            }
            None => match body.strip_suffix(':') {
                Some(key) => {
                    push_scalar(&mut out, key);
                    out.push(':');
                }
                None => out.push_str(body),
            },
        }
        if line.ends_with('\n') {
            out.push('\n');
        }
    }
    out
}

fn push_scalar(out: &mut String, token: &str) {
    if YAML_1_1_BOOLEANS.contains(&token) {
        out.push('\'');
        out.push_str(token);
        out.push('\'');
    } else {
        out.push_str(token);
    }
}

/// Builds the inventory from every `ACTIVE` instance.
///
/// Instances in any other state are skipped. A later instance with the same
/// name replaces an earlier one.
///
/// # Errors
///
/// Returns [`InventoryError::Resolve`] as soon as an active instance has no
/// usable address; no partial inventory is produced.
pub fn project_inventory(
    instances: &[Instance],
    policy: &dyn AddressPolicy,
) -> Result<Inventory, InventoryError> {
    let mut hosts = BTreeMap::new();
    for instance in instances {
        if !instance.status.is_active() {
            debug!(instance = %instance.name, status = %instance.status, "skipping inactive instance");
            continue;
        }
        let address = resolve_address(policy, instance)?;
        hosts.insert(
            instance.name.clone(),
            InventoryHost {
                address,
                hostname: instance.name.clone(),
            },
        );
    }

    Ok(Inventory {
        all: HostGroup {
            hosts,
            vars: InventoryVariables::default(),
        },
    })
}
