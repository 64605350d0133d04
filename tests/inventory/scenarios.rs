//! BDD scenarios for inventory generation.

use rstest_bdd_macros::scenario;

use super::test_helpers::{InventoryContext, inventory_context};

#[scenario(
    path = "tests/features/inventory.feature",
    name = "List only active instances in the inventory"
)]
fn scenario_active_instances_only(inventory_context: InventoryContext) {
    let _ = inventory_context;
}

#[scenario(
    path = "tests/features/inventory.feature",
    name = "Qualify reset script hosts with the DNS domain"
)]
fn scenario_reset_script_with_domain(inventory_context: InventoryContext) {
    let _ = inventory_context;
}

#[scenario(
    path = "tests/features/inventory.feature",
    name = "Use bare host names without a DNS domain"
)]
fn scenario_reset_script_without_domain(inventory_context: InventoryContext) {
    let _ = inventory_context;
}

#[scenario(
    path = "tests/features/inventory.feature",
    name = "Abort when an active instance has no address"
)]
fn scenario_missing_address_aborts(inventory_context: InventoryContext) {
    let _ = inventory_context;
}

#[scenario(
    path = "tests/features/inventory.feature",
    name = "Ignore inactive instances without addresses"
)]
fn scenario_inactive_without_address(inventory_context: InventoryContext) {
    let _ = inventory_context;
}

#[scenario(
    path = "tests/features/inventory.feature",
    name = "Report inactive instances whose addresses failed to decode"
)]
fn scenario_degraded_inactive_instance(inventory_context: InventoryContext) {
    let _ = inventory_context;
}

#[scenario(
    path = "tests/features/inventory.feature",
    name = "Abort when an active instance has undecodable addresses"
)]
fn scenario_degraded_active_instance(inventory_context: InventoryContext) {
    let _ = inventory_context;
}

#[scenario(
    path = "tests/features/inventory.feature",
    name = "Surface listing failures without writing files"
)]
fn scenario_listing_failure(inventory_context: InventoryContext) {
    let _ = inventory_context;
}

#[scenario(
    path = "tests/features/inventory.feature",
    name = "Write an empty inventory for a project without active instances"
)]
fn scenario_empty_project(inventory_context: InventoryContext) {
    let _ = inventory_context;
}
