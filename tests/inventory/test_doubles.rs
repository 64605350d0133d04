//! Test doubles for inventory generation scenarios.
//!
//! Provides a compute backend that serves a scripted instance list, can mark
//! instances as having undecodable addresses, and can be told to fail the
//! listing outright.

use std::sync::{Arc, Mutex};

use os_inventory::backend::BackendFuture;
use os_inventory::{AddressDecodeWarning, ComputeBackend, Instance, InstanceListing};
use thiserror::Error;

#[derive(Clone, Debug)]
pub struct ScriptedComputeBackend {
    state: Arc<Mutex<State>>,
}

#[derive(Debug, Default)]
struct State {
    instances: Vec<Instance>,
    warnings: Vec<AddressDecodeWarning>,
    fail_on_list: bool,
    list_calls: u32,
}

impl ScriptedComputeBackend {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(State::default())),
        }
    }

    pub fn push_instance(&self, instance: Instance) {
        self.state
            .lock()
            .unwrap_or_else(|err| panic!("scripted backend lock poisoned: {err}"))
            .instances
            .push(instance);
    }

    /// Lists the instance with no addresses and a matching decode warning,
    /// as the `OpenStack` backend does for a malformed address map.
    pub fn push_degraded_instance(&self, mut instance: Instance) {
        let mut state = self
            .state
            .lock()
            .unwrap_or_else(|err| panic!("scripted backend lock poisoned: {err}"));
        instance.addresses.clear();
        state.warnings.push(AddressDecodeWarning {
            instance_id: instance.id.clone(),
            instance_name: instance.name.clone(),
            network: String::from("private"),
            message: String::from("invalid type: string, expected a sequence"),
        });
        state.instances.push(instance);
    }

    pub fn fail_on_list(&self) {
        self.state
            .lock()
            .unwrap_or_else(|err| panic!("scripted backend lock poisoned: {err}"))
            .fail_on_list = true;
    }

    pub fn list_calls(&self) -> u32 {
        self.state
            .lock()
            .unwrap_or_else(|err| panic!("scripted backend lock poisoned: {err}"))
            .list_calls
    }
}

#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum ScriptedComputeError {
    #[error("scripted listing failure")]
    List,
}

impl ComputeBackend for ScriptedComputeBackend {
    type Error = ScriptedComputeError;

    fn list_instances(&self) -> BackendFuture<'_, InstanceListing, Self::Error> {
        Box::pin(async move {
            let mut state = self
                .state
                .lock()
                .map_err(|_| ScriptedComputeError::List)?;
            state.list_calls += 1;
            if state.fail_on_list {
                return Err(ScriptedComputeError::List);
            }
            Ok(InstanceListing {
                instances: state.instances.clone(),
                warnings: state.warnings.clone(),
            })
        })
    }
}
