//! Command-line interface definitions for the `os-inventory` binary.
//!
//! This module centralises the clap parser structures so both the main binary
//! and the build script can reuse them when generating the manual page.

use clap::{Parser, ValueEnum};

/// Top-level CLI for the `os-inventory` binary.
///
/// `OpenStack` connection parameters are read from the usual `OS_*`
/// environment variables.
#[derive(Debug, Parser)]
#[command(
    name = "os-inventory",
    about = "Generate an Ansible inventory from the running instances of an OpenStack project"
)]
pub(crate) struct Cli {
    /// Directory receiving `<project>.yaml` and the optional reset script.
    #[arg(long, value_name = "DIR", default_value = ".")]
    pub(crate) output_dir: String,
    /// Print the rendered inventory to standard output (any non-empty value enables).
    #[arg(
        long,
        env = "DEBUG",
        value_name = "VALUE",
        num_args = 0..=1,
        default_missing_value = "1"
    )]
    pub(crate) debug: Option<String>,
    /// Also write `reset-ssh-<project>.sh` (enabled only by the value `true`).
    #[arg(
        long,
        env = "SSH_RESET",
        value_name = "VALUE",
        num_args = 0..=1,
        default_missing_value = "true"
    )]
    pub(crate) ssh_reset: Option<String>,
    /// DNS domain appended to host names in the reset script.
    #[arg(long, env = "DNS_DOMAIN", value_name = "DOMAIN")]
    pub(crate) dns_domain: Option<String>,
    /// Rule used to pick one address per instance.
    #[arg(long, value_enum, default_value_t = AddressSelection::Last)]
    pub(crate) address_selection: AddressSelection,
}

/// Address selection rules exposed on the command line.
#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub(crate) enum AddressSelection {
    /// Use the last address reported for the instance.
    Last,
    /// Prefer floating addresses, falling back to the last fixed one.
    FloatingFirst,
}
