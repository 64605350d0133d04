//! Core library for the `OpenStack` Ansible inventory generator.
//!
//! The crate authenticates against Keystone, lists the compute instances of
//! one project, and turns the `ACTIVE` ones into an Ansible inventory with a
//! single reachable address per host. An optional shell script clears stale
//! known-hosts entries for the same hosts.

pub mod backend;
pub mod config;
pub mod inventory;
pub mod known_hosts;
pub mod openstack;
pub mod output;
pub mod resolve;
pub mod run;
pub mod test_support;
pub mod types;

pub use backend::{
    AddressDecodeWarning, BackendFuture, ComputeBackend, Instance, InstanceListing,
    NetworkAddress,
};
pub use config::{ConfigError, Credentials, OpenStackConfig, OutputOptions};
pub use inventory::{
    HostGroup, Inventory, InventoryError, InventoryHost, InventoryVariables, project_inventory,
};
pub use known_hosts::render_reset_script;
pub use openstack::{OpenStackBackend, OpenStackBackendError};
pub use output::{OutputDir, OutputError};
pub use resolve::{AddressPolicy, LastAddress, RankedAddress, ResolveError, resolve_address};
pub use run::{InventoryRun, RunError, RunReport};
pub use types::{InstanceId, InstanceStatus};
