//! Test support utilities shared across unit and integration tests.

use std::collections::BTreeSet;
use std::env;
use std::ffi::OsString;

use tokio::sync::{Mutex, MutexGuard};

use crate::backend::{Instance, NetworkAddress};
use crate::config::Credentials;
use crate::types::{InstanceId, InstanceStatus};

/// Builds an instance whose id is derived from its name and whose address
/// records only carry the address field.
#[must_use]
pub fn instance(name: &str, status: &str, addresses: &[&str]) -> Instance {
    Instance {
        id: InstanceId::new(format!("id-{name}")),
        name: name.to_owned(),
        owner_id: String::from("project-id"),
        status: InstanceStatus::from(status),
        addresses: addresses
            .iter()
            .map(|address| NetworkAddress::with_address(*address))
            .collect(),
    }
}

/// Returns a complete, valid set of credentials.
#[must_use]
pub fn credentials() -> Credentials {
    Credentials {
        auth_url: String::from("https://keystone.example.com:5000/v3"),
        username: String::from("ops"),
        password: String::from("secret"),
        project_domain_id: String::from("default"),
        region_name: String::from("RegionOne"),
        project_name: String::from("demo"),
        user_domain_name: String::from("Default"),
        interface: String::from("public"),
        project_id: String::from("project-id"),
        domain_name: String::from("Default"),
    }
}

/// Global mutex used to serialise environment mutation in tests.
pub static ENV_LOCK: Mutex<()> = Mutex::const_new(());

/// Guard that holds the env mutex and restores variables on drop.
pub struct EnvGuard {
    previous: Vec<(String, Option<OsString>)>,
    _guard: MutexGuard<'static, ()>,
}

impl EnvGuard {
    /// Sets and removes environment variables while holding a global mutex.
    ///
    /// Pairs with a `None` value are removed for the guard's lifetime.
    pub async fn set_vars(pairs: &[(&str, Option<&str>)]) -> Self {
        debug_assert!(
            {
                let mut seen = BTreeSet::new();
                pairs.iter().all(|(key, _)| seen.insert(*key))
            },
            "duplicate environment variable keys passed to EnvGuard::set_vars"
        );

        let guard = ENV_LOCK.lock().await;
        let mut previous = Vec::with_capacity(pairs.len());
        for (key, value) in pairs {
            let old = env::var_os(key);
            // SAFETY: Environment mutation is serialised by `ENV_LOCK`, preventing races.
            unsafe {
                match value {
                    Some(val) => env::set_var(key, val),
                    None => env::remove_var(key),
                }
            }
            previous.push(((*key).to_owned(), old));
        }

        Self {
            previous,
            _guard: guard,
        }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        for (key, old) in &self.previous {
            // SAFETY: Environment mutation is serialised by holding `_guard`.
            unsafe {
                match old {
                    Some(val) => env::set_var(key, val),
                    None => env::remove_var(key),
                }
            }
        }
    }
}
