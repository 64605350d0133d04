//! Binary entry point for the `os-inventory` CLI.

use std::io::{self, Write};
use std::process;

use camino::Utf8Path;
use clap::Parser;
use thiserror::Error;
use tracing::{Level, warn};

use os_inventory::{
    AddressPolicy, ConfigError, InventoryRun, LastAddress, OpenStackBackend,
    OpenStackBackendError, OpenStackConfig, OutputDir, OutputError, OutputOptions, RankedAddress,
    RunError, RunReport,
};

mod cli;

use cli::{AddressSelection, Cli};

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("error while authenticating with OpenStack: {0}")]
    Connect(#[source] OpenStackBackendError),
    #[error(transparent)]
    Output(#[from] OutputError),
    #[error(transparent)]
    Run(#[from] RunError<OpenStackBackendError>),
    #[error("failed to write to standard output: {0}")]
    Stdout(#[source] io::Error),
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();
    let options = OutputOptions::from_raw(
        cli.debug.as_deref(),
        cli.ssh_reset.as_deref(),
        cli.dns_domain.as_deref(),
    );
    init_tracing(options.debug);

    let exit_code = match generate(&cli, options).await {
        Ok(()) => 0,
        Err(err) => {
            report_error(&err);
            1
        }
    };

    process::exit(exit_code);
}

fn init_tracing(debug: bool) {
    let level = if debug { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_max_level(level)
        .with_target(false)
        .init();
}

fn address_policy(selection: AddressSelection) -> Box<dyn AddressPolicy> {
    match selection {
        AddressSelection::Last => Box::new(LastAddress),
        AddressSelection::FloatingFirst => Box::new(RankedAddress::floating_first()),
    }
}

async fn generate(cli: &Cli, options: OutputOptions) -> Result<(), CliError> {
    let credentials = OpenStackConfig::load_without_cli_args()?.resolve()?;
    let output = OutputDir::open(Utf8Path::new(&cli.output_dir))?;
    let backend = OpenStackBackend::connect(&credentials)
        .await
        .map_err(CliError::Connect)?;

    let run = InventoryRun::new(backend, address_policy(cli.address_selection), options);
    let report = run.execute(&output, &credentials.project_name).await?;
    if let Some(names) = degraded_instances(&report) {
        warn!(
            count = report.warnings.len(),
            instances = %names,
            "listed instances without address data; inactive ones were left out"
        );
    }

    announce(io::stdout(), &report, run.options()).map_err(CliError::Stdout)
}

/// Comma-separated names of instances whose addresses failed to decode.
fn degraded_instances(report: &RunReport) -> Option<String> {
    if report.warnings.is_empty() {
        return None;
    }
    let names: Vec<&str> = report
        .warnings
        .iter()
        .map(|warning| warning.instance_name.as_str())
        .collect();
    Some(names.join(", "))
}

fn announce(mut target: impl Write, report: &RunReport, options: &OutputOptions) -> io::Result<()> {
    writeln!(target, "Wrote {}", report.inventory_path)?;
    if options.debug {
        write!(target, "{}", report.yaml)?;
    }
    if let Some(script_path) = &report.script_path {
        writeln!(target, "Also generating SSH reset script")?;
        writeln!(target, "Wrote {script_path}")?;
    }
    Ok(())
}

fn report_error(err: &CliError) {
    write_error(io::stderr(), err);
}

fn write_error(mut target: impl Write, err: &CliError) {
    writeln!(target, "{err}").ok();
}
