//! Orchestrates one inventory run.
//!
//! The run lists instances through a backend, projects the active ones into
//! an inventory, renders it, and writes the inventory file followed by the
//! optional known-hosts reset script. Projection happens before any write,
//! so a failing run leaves no new files behind.

use camino::Utf8PathBuf;
use thiserror::Error;
use tracing::info;

use crate::backend::{AddressDecodeWarning, ComputeBackend};
use crate::config::OutputOptions;
use crate::inventory::{InventoryError, project_inventory};
use crate::known_hosts::render_reset_script;
use crate::output::{OutputDir, OutputError};
use crate::resolve::AddressPolicy;

/// Errors surfaced while performing an inventory run.
#[derive(Debug, Error)]
pub enum RunError<BackendError>
where
    BackendError: std::error::Error + 'static,
{
    /// Raised when listing instances fails.
    #[error("failed to list instances: {0}")]
    List(#[source] BackendError),
    /// Raised when an active instance cannot be placed in the inventory.
    #[error("failed to build inventory: {0}")]
    Project(#[source] InventoryError),
    /// Raised when the inventory cannot be rendered.
    #[error(transparent)]
    Render(InventoryError),
    /// Raised when an output file cannot be written.
    #[error(transparent)]
    Write(#[from] OutputError),
}

/// Outcome of a successful run.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RunReport {
    /// Path of the written inventory.
    pub inventory_path: Utf8PathBuf,
    /// Path of the reset script, when one was requested.
    pub script_path: Option<Utf8PathBuf>,
    /// Rendered inventory text.
    pub yaml: String,
    /// Number of hosts in the inventory.
    pub host_count: usize,
    /// Instances whose address data was dropped while listing.
    pub warnings: Vec<AddressDecodeWarning>,
}

/// Executes the inventory flow using the provided backend and address policy.
pub struct InventoryRun<B, P> {
    backend: B,
    policy: P,
    options: OutputOptions,
}

impl<B, P> InventoryRun<B, P>
where
    B: ComputeBackend,
    P: AddressPolicy,
{
    /// Creates a new run.
    #[must_use]
    pub const fn new(backend: B, policy: P, options: OutputOptions) -> Self {
        Self {
            backend,
            policy,
            options,
        }
    }

    /// Options the run was created with.
    #[must_use]
    pub const fn options(&self) -> &OutputOptions {
        &self.options
    }

    /// Lists, projects, renders, and writes the inventory for `project_name`
    /// into `output`.
    ///
    /// # Errors
    ///
    /// Returns [`RunError`] when listing, projection, rendering, or writing
    /// fails. Nothing is written when listing or projection fails.
    pub async fn execute(
        &self,
        output: &OutputDir,
        project_name: &str,
    ) -> Result<RunReport, RunError<B::Error>> {
        let listing = self
            .backend
            .list_instances()
            .await
            .map_err(RunError::List)?;

        let inventory =
            project_inventory(&listing.instances, &self.policy).map_err(RunError::Project)?;
        let yaml = inventory.to_yaml().map_err(RunError::Render)?;
        info!(hosts = inventory.host_count(), "built inventory");

        let inventory_path = output.write_inventory(project_name, &yaml)?;

        let script_path = if self.options.ssh_reset {
            let script = render_reset_script(&inventory, self.options.dns_domain.as_deref());
            Some(output.write_reset_script(project_name, &script)?)
        } else {
            None
        };

        Ok(RunReport {
            inventory_path,
            script_path,
            yaml,
            host_count: inventory.host_count(),
            warnings: listing.warnings,
        })
    }
}
