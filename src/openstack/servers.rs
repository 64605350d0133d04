//! Decoding of compute `servers/detail` pages into normalised instances.
//!
//! The provider's `addresses` attribute is an open-ended object keyed by
//! network name. It is kept as raw JSON until each network's list is decoded
//! into [`NetworkAddress`] records, so one malformed network degrades a
//! single instance instead of failing the page.

use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::warn;

use super::error::OpenStackBackendError;
use crate::backend::{AddressDecodeWarning, Instance, NetworkAddress};
use crate::types::{InstanceId, InstanceStatus};

#[derive(Debug, Deserialize)]
struct ServersPage {
    servers: Vec<ServerRecord>,
    #[serde(default)]
    servers_links: Vec<Link>,
}

#[derive(Debug, Deserialize)]
struct Link {
    #[serde(default)]
    rel: String,
}

#[derive(Debug, Deserialize)]
struct ServerRecord {
    id: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    tenant_id: String,
    #[serde(default)]
    status: String,
    #[serde(default)]
    addresses: Map<String, Value>,
}

/// One decoded listing page.
#[derive(Debug, Default)]
pub(crate) struct DecodedPage {
    pub(crate) instances: Vec<Instance>,
    pub(crate) warnings: Vec<AddressDecodeWarning>,
    pub(crate) has_next: bool,
}

impl DecodedPage {
    /// Marker for the following page: the id of the last instance.
    pub(crate) fn next_marker(&self) -> Option<&str> {
        if !self.has_next {
            return None;
        }
        self.instances.last().map(|instance| instance.id.as_str())
    }
}

/// Decodes a `servers/detail` response body.
///
/// # Errors
///
/// Returns [`OpenStackBackendError::Decode`] when the page itself is
/// malformed. Address-level failures only produce warnings.
pub(crate) fn decode_page(body: &str) -> Result<DecodedPage, OpenStackBackendError> {
    let page: ServersPage =
        serde_json::from_str(body).map_err(|err| OpenStackBackendError::Decode {
            context: String::from("servers page"),
            message: err.to_string(),
        })?;

    let has_next = page.servers_links.iter().any(|link| link.rel == "next");
    let mut decoded = DecodedPage {
        has_next,
        ..DecodedPage::default()
    };
    for record in page.servers {
        let (instance, warning) = normalise(record);
        if let Some(degraded) = warning {
            decoded.warnings.push(degraded);
        }
        decoded.instances.push(instance);
    }
    Ok(decoded)
}

fn normalise(record: ServerRecord) -> (Instance, Option<AddressDecodeWarning>) {
    let id = InstanceId::from(record.id);
    let (addresses, warning) = match decode_addresses(record.addresses) {
        Ok(addresses) => (addresses, None),
        Err((network, message)) => {
            warn!(
                instance_id = %id,
                instance = %record.name,
                network = %network,
                error = %message,
                "dropping undecodable address data"
            );
            let warning = AddressDecodeWarning {
                instance_id: id.clone(),
                instance_name: record.name.clone(),
                network,
                message,
            };
            (Vec::new(), Some(warning))
        }
    };

    let instance = Instance {
        id,
        name: record.name,
        owner_id: record.tenant_id,
        status: InstanceStatus::from(record.status),
        addresses,
    };
    (instance, warning)
}

/// Flattens the per-network address lists in network-name order.
fn decode_addresses(networks: Map<String, Value>) -> Result<Vec<NetworkAddress>, (String, String)> {
    let mut ordered: Vec<(String, Value)> = networks.into_iter().collect();
    ordered.sort_by(|lhs, rhs| lhs.0.cmp(&rhs.0));

    let mut addresses = Vec::new();
    for (network, value) in ordered {
        let entries = serde_json::from_value::<Vec<NetworkAddress>>(value)
            .map_err(|err| (network, err.to_string()))?;
        addresses.extend(entries);
    }
    Ok(addresses)
}
