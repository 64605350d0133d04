//! Shared fixtures for inventory BDD scenarios.

use std::sync::Arc;

use camino::Utf8PathBuf;
use os_inventory::{OutputOptions, RunReport};
use rstest::fixture;
use tempfile::TempDir;
use thiserror::Error;

use super::test_doubles::ScriptedComputeBackend;

#[derive(Clone, Debug)]
pub struct InventoryContext {
    pub backend: ScriptedComputeBackend,
    pub options: OutputOptions,
    pub project_name: String,
    pub output_root: Utf8PathBuf,
    pub outcome: Option<InventoryResult>,
    pub(crate) output_tmp: Arc<TempDir>,
}

#[derive(Clone, Debug)]
pub enum InventoryResult {
    Success(RunReport),
    Failure(String),
}

#[derive(Clone, Debug, Error)]
pub enum InventoryTestError {
    #[error("failed to create output directory: {0}")]
    Workspace(String),
}

#[fixture]
pub fn inventory_context_result() -> Result<InventoryContext, InventoryTestError> {
    build_inventory_context()
}

#[fixture]
pub fn inventory_context(
    inventory_context_result: Result<InventoryContext, InventoryTestError>,
) -> InventoryContext {
    inventory_context_result
        .unwrap_or_else(|err| panic!("inventory context fixture should initialise: {err}"))
}

pub fn build_inventory_context() -> Result<InventoryContext, InventoryTestError> {
    let tmp_dir =
        TempDir::new().map_err(|err| InventoryTestError::Workspace(format!("tempdir: {err}")))?;
    let output_root = Utf8PathBuf::from_path_buf(tmp_dir.path().to_path_buf()).map_err(|path| {
        InventoryTestError::Workspace(format!("non-utf8 tempdir path: {}", path.display()))
    })?;

    Ok(InventoryContext {
        backend: ScriptedComputeBackend::new(),
        options: OutputOptions::default(),
        project_name: String::from("demo"),
        output_root,
        outcome: None,
        output_tmp: Arc::new(tmp_dir),
    })
}
