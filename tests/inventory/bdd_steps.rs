//! BDD step definitions for inventory generation.

use std::fs;

use os_inventory::test_support::instance;
use os_inventory::{Inventory, InventoryRun, LastAddress, OutputDir, RunReport};
use rstest_bdd_macros::{given, then, when};
use tokio::runtime::Runtime;

use super::test_helpers::{InventoryContext, InventoryResult, InventoryTestError};

#[derive(Debug, thiserror::Error)]
pub enum StepError {
    #[error(transparent)]
    Setup(#[from] InventoryTestError),
    #[error("assertion failed: {0}")]
    Assertion(String),
}

#[given("a project named \"{name}\"")]
fn project_named(mut inventory_context: InventoryContext, name: String) -> InventoryContext {
    inventory_context.project_name = name;
    inventory_context
}

#[given("an instance \"{name}\" with status \"{status}\" and addresses \"{addresses}\"")]
fn instance_with_addresses(
    inventory_context: InventoryContext,
    name: String,
    status: String,
    addresses: String,
) -> InventoryContext {
    let list: Vec<&str> = addresses.split(',').map(str::trim).collect();
    inventory_context
        .backend
        .push_instance(instance(&name, &status, &list));
    inventory_context
}

#[given("an instance \"{name}\" with status \"{status}\" and no addresses")]
fn instance_without_addresses(
    inventory_context: InventoryContext,
    name: String,
    status: String,
) -> InventoryContext {
    inventory_context
        .backend
        .push_instance(instance(&name, &status, &[]));
    inventory_context
}

#[given("an instance \"{name}\" with status \"{status}\" and undecodable addresses")]
fn instance_with_undecodable_addresses(
    inventory_context: InventoryContext,
    name: String,
    status: String,
) -> InventoryContext {
    inventory_context
        .backend
        .push_degraded_instance(instance(&name, &status, &["10.0.0.99"]));
    inventory_context
}

#[given("SSH reset is enabled")]
fn ssh_reset_enabled(mut inventory_context: InventoryContext) -> InventoryContext {
    inventory_context.options.ssh_reset = true;
    inventory_context
}

#[given("the DNS domain is \"{domain}\"")]
fn dns_domain(mut inventory_context: InventoryContext, domain: String) -> InventoryContext {
    inventory_context.options.dns_domain = Some(domain);
    inventory_context
}

#[given("the compute backend fails to list instances")]
fn backend_fails_listing(inventory_context: InventoryContext) -> InventoryContext {
    inventory_context.backend.fail_on_list();
    inventory_context
}

#[when("I generate the inventory")]
fn generate(inventory_context: InventoryContext) -> Result<InventoryContext, StepError> {
    let runtime = Runtime::new().map_err(|err| StepError::Assertion(err.to_string()))?;
    let InventoryContext {
        backend,
        options,
        project_name,
        output_root,
        output_tmp,
        ..
    } = inventory_context;

    let output = OutputDir::open(&output_root)
        .map_err(|err| InventoryTestError::Workspace(err.to_string()))?;
    let run = InventoryRun::new(backend.clone(), LastAddress, options.clone());
    let result = runtime.block_on(run.execute(&output, &project_name));
    let outcome = match result {
        Ok(report) => InventoryResult::Success(report),
        Err(err) => InventoryResult::Failure(err.to_string()),
    };

    Ok(InventoryContext {
        backend,
        options,
        project_name,
        output_root,
        outcome: Some(outcome),
        output_tmp,
    })
}

fn report(inventory_context: &InventoryContext) -> Result<&RunReport, StepError> {
    match &inventory_context.outcome {
        Some(InventoryResult::Success(report)) => Ok(report),
        Some(InventoryResult::Failure(message)) => Err(StepError::Assertion(format!(
            "expected success, got failure: {message}"
        ))),
        None => Err(StepError::Assertion(String::from("missing outcome"))),
    }
}

fn written_inventory(inventory_context: &InventoryContext) -> Result<Inventory, StepError> {
    let path = &report(inventory_context)?.inventory_path;
    let text = fs::read_to_string(path)
        .map_err(|err| StepError::Assertion(format!("read {path}: {err}")))?;
    Inventory::from_yaml(&text).map_err(|err| StepError::Assertion(err.to_string()))
}

#[then("the run succeeds")]
fn run_succeeds(inventory_context: &InventoryContext) -> Result<(), StepError> {
    report(inventory_context).map(|_| ())
}

#[then("the run fails mentioning \"{text}\"")]
fn run_fails(inventory_context: &InventoryContext, text: String) -> Result<(), StepError> {
    match &inventory_context.outcome {
        Some(InventoryResult::Failure(message)) if message.contains(&text) => Ok(()),
        other => Err(StepError::Assertion(format!(
            "expected failure mentioning {text:?}, got {other:?}"
        ))),
    }
}

#[then("the inventory lists \"{count}\" hosts")]
fn inventory_lists(inventory_context: &InventoryContext, count: usize) -> Result<(), StepError> {
    let reported = report(inventory_context)?.host_count;
    let written = written_inventory(inventory_context)?.host_count();
    if reported == count && written == count {
        Ok(())
    } else {
        Err(StepError::Assertion(format!(
            "expected {count} hosts, report says {reported}, file holds {written}"
        )))
    }
}

#[then("host \"{name}\" is reached at \"{address}\"")]
fn host_reached_at(
    inventory_context: &InventoryContext,
    name: String,
    address: String,
) -> Result<(), StepError> {
    let inventory = written_inventory(inventory_context)?;
    let host = inventory
        .all
        .hosts
        .get(&name)
        .ok_or_else(|| StepError::Assertion(format!("host {name} missing")))?;
    if host.address == address && host.hostname == name {
        Ok(())
    } else {
        Err(StepError::Assertion(format!(
            "expected {name} at {address}, got {host:?}"
        )))
    }
}

#[then("host \"{name}\" is absent")]
fn host_absent(inventory_context: &InventoryContext, name: String) -> Result<(), StepError> {
    let inventory = written_inventory(inventory_context)?;
    if inventory.all.hosts.contains_key(&name) {
        Err(StepError::Assertion(format!("host {name} should be absent")))
    } else {
        Ok(())
    }
}

#[then("no reset script is written")]
fn no_reset_script(inventory_context: &InventoryContext) -> Result<(), StepError> {
    let script = report(inventory_context)?.script_path.as_ref();
    let on_disk = inventory_context
        .output_root
        .join(format!("reset-ssh-{}.sh", inventory_context.project_name));
    if script.is_none() && !on_disk.exists() {
        Ok(())
    } else {
        Err(StepError::Assertion(String::from(
            "reset script should not be written",
        )))
    }
}

#[then("the reset script removes \"{host}\"")]
fn reset_script_removes(inventory_context: &InventoryContext, host: String) -> Result<(), StepError> {
    let path = report(inventory_context)?
        .script_path
        .as_ref()
        .ok_or_else(|| StepError::Assertion(String::from("reset script missing")))?;
    let script = fs::read_to_string(path)
        .map_err(|err| StepError::Assertion(format!("read {path}: {err}")))?;
    let expected = format!("ssh-keygen -f \"$HOME/.ssh/known_hosts\" -R {host}");
    if script.lines().any(|line| line == expected) {
        Ok(())
    } else {
        Err(StepError::Assertion(format!(
            "expected line {expected:?} in script:\n{script}"
        )))
    }
}

#[then("the listing reports degraded instance \"{name}\"")]
fn listing_reports_degraded(
    inventory_context: &InventoryContext,
    name: String,
) -> Result<(), StepError> {
    let warnings = &report(inventory_context)?.warnings;
    if warnings.iter().any(|warning| warning.instance_name == name) {
        Ok(())
    } else {
        Err(StepError::Assertion(format!(
            "expected a decode warning for {name}, got {warnings:?}"
        )))
    }
}

#[then("the compute backend is listed once")]
fn backend_listed_once(inventory_context: &InventoryContext) -> Result<(), StepError> {
    match inventory_context.backend.list_calls() {
        1 => Ok(()),
        calls => Err(StepError::Assertion(format!(
            "expected one listing call, got {calls}"
        ))),
    }
}

#[then("no files are written")]
fn no_files_written(inventory_context: &InventoryContext) -> Result<(), StepError> {
    let count = fs::read_dir(&inventory_context.output_root)
        .map_err(|err| StepError::Assertion(format!("read output dir: {err}")))?
        .count();
    if count == 0 {
        Ok(())
    } else {
        Err(StepError::Assertion(format!(
            "expected an empty output directory, found {count} entries"
        )))
    }
}
