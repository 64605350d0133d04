//! Service catalog lookup.

use serde::Deserialize;

use super::error::OpenStackBackendError;

/// Catalog service type of the compute API.
pub const COMPUTE_SERVICE: &str = "compute";

/// One service in the Keystone catalog.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
pub struct CatalogEntry {
    #[serde(rename = "type")]
    pub(crate) service_type: String,
    #[serde(default)]
    pub(crate) endpoints: Vec<Endpoint>,
}

/// One endpoint of a catalog service.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
pub struct Endpoint {
    pub(crate) interface: String,
    #[serde(default)]
    pub(crate) region: Option<String>,
    #[serde(default)]
    pub(crate) region_id: Option<String>,
    pub(crate) url: String,
}

impl Endpoint {
    fn in_region(&self, region: &str) -> bool {
        self.region.as_deref() == Some(region) || self.region_id.as_deref() == Some(region)
    }
}

/// Normalises an interface name so `publicURL` and `public` compare equal.
#[must_use]
pub fn normalise_interface(raw: &str) -> String {
    let lowered = raw.trim().to_ascii_lowercase();
    lowered
        .strip_suffix("url")
        .map_or_else(|| lowered.clone(), str::to_owned)
}

/// Finds the URL of `service_type` for the given interface and region.
///
/// # Errors
///
/// Returns [`OpenStackBackendError::EndpointNotFound`] when no endpoint
/// matches.
pub fn find_endpoint(
    catalog: &[CatalogEntry],
    service_type: &str,
    interface: &str,
    region: &str,
) -> Result<String, OpenStackBackendError> {
    let wanted = normalise_interface(interface);
    catalog
        .iter()
        .filter(|entry| entry.service_type == service_type)
        .flat_map(|entry| entry.endpoints.iter())
        .find(|endpoint| normalise_interface(&endpoint.interface) == wanted && endpoint.in_region(region))
        .map(|endpoint| endpoint.url.trim_end_matches('/').to_owned())
        .ok_or_else(|| OpenStackBackendError::EndpointNotFound {
            service: service_type.to_owned(),
            interface: wanted,
            region: region.to_owned(),
        })
}
