//! Backend abstraction for enumerating compute instances.
//!
//! The inventory pipeline only needs one capability from a cloud: list the
//! instances visible to the caller's project. Backends normalise provider
//! records into [`Instance`] values and report per-instance degradation
//! alongside the data instead of failing the whole listing.

use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};

use crate::types::{InstanceId, InstanceStatus};

/// One address attached to one of an instance's network interfaces.
///
/// Field names follow the compute API's extended address attributes. Missing
/// fields decode as empty values and unknown fields are ignored.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct NetworkAddress {
    /// MAC address of the interface carrying this address.
    #[serde(rename = "OS-EXT-IPS-MAC:mac_addr", default)]
    pub interface_mac: String,
    /// Address kind reported by the provider (`fixed` or `floating`).
    #[serde(rename = "OS-EXT-IPS:type", default)]
    pub address_type: String,
    /// The address itself.
    #[serde(rename = "addr", default)]
    pub address: String,
    /// IP version, 4 or 6.
    #[serde(rename = "version", default)]
    pub ip_version: u8,
}

impl NetworkAddress {
    /// Builds an address record with only the address field populated.
    #[must_use]
    pub fn with_address(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            ..Self::default()
        }
    }
}

/// Normalised view of a provider instance.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Instance {
    /// Provider identifier.
    pub id: InstanceId,
    /// Instance name, unique within a project; used as the inventory key.
    pub name: String,
    /// Owning project (tenant) identifier.
    pub owner_id: String,
    /// Lifecycle state at enumeration time.
    pub status: InstanceStatus,
    /// Addresses across all attached networks, in network-name order.
    pub addresses: Vec<NetworkAddress>,
}

/// Records an instance whose address data could not be decoded.
///
/// The instance is still returned, with an empty address list.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AddressDecodeWarning {
    /// Identifier of the affected instance.
    pub instance_id: InstanceId,
    /// Name of the affected instance.
    pub instance_name: String,
    /// Network whose address list failed to decode.
    pub network: String,
    /// Decoder message.
    pub message: String,
}

/// Result of a successful listing, possibly carrying degraded records.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct InstanceListing {
    /// Every instance visible to the project, in provider order.
    pub instances: Vec<Instance>,
    /// Instances whose address data was dropped during decoding.
    pub warnings: Vec<AddressDecodeWarning>,
}

impl InstanceListing {
    /// Returns `true` when at least one instance lost its address data.
    #[must_use]
    pub const fn is_degraded(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// Future returned by backend operations.
pub type BackendFuture<'a, T, E> = Pin<Box<dyn Future<Output = Result<T, E>> + Send + 'a>>;

/// Minimal interface implemented by compute backends.
pub trait ComputeBackend {
    /// Provider specific error type returned by the backend.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Lists every instance in the caller's project, following pagination to
    /// the end.
    fn list_instances(&self) -> BackendFuture<'_, InstanceListing, Self::Error>;
}
