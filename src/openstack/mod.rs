//! `OpenStack` backend: Keystone authentication and compute listing.
//!
//! [`OpenStackBackend::connect`] performs the password handshake and resolves
//! the region's compute endpoint. Listing then pages through
//! `servers/detail` for the token's own project, re-authenticating once if
//! the token is rejected part way through.

pub mod auth;
mod catalog;
mod error;
mod servers;

use reqwest::{Client, StatusCode};
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::backend::{BackendFuture, ComputeBackend, InstanceListing};
use crate::config::Credentials;

pub use auth::{AuthOptions, Session};
pub use error::OpenStackBackendError;

use auth::authenticate;
use catalog::{COMPUTE_SERVICE, find_endpoint};
use servers::{DecodedPage, decode_page};

const AUTH_TOKEN_HEADER: &str = "X-Auth-Token";
const PAGE_SIZE: u32 = 500;

/// Backend that enumerates instances through the `OpenStack` compute API.
#[derive(Debug)]
pub struct OpenStackBackend {
    client: Client,
    options: AuthOptions,
    session: Mutex<Session>,
    compute_url: String,
    page_size: u32,
}

impl OpenStackBackend {
    /// Authenticates and resolves the compute endpoint for the configured
    /// region and interface.
    ///
    /// # Errors
    ///
    /// Returns [`OpenStackBackendError`] when the HTTP client cannot be built,
    /// authentication fails or yields no token, or the catalog lacks a
    /// matching compute endpoint.
    pub async fn connect(credentials: &Credentials) -> Result<Self, OpenStackBackendError> {
        let client = Client::builder().build()?;
        let options = AuthOptions::from_credentials(credentials);
        let session = authenticate(&client, &options).await?;
        let compute_url = find_endpoint(
            session.catalog(),
            COMPUTE_SERVICE,
            &credentials.interface,
            &credentials.region_name,
        )?;
        debug!(url = %compute_url, region = %credentials.region_name, "resolved compute endpoint");

        Ok(Self {
            client,
            options,
            session: Mutex::new(session),
            compute_url,
            page_size: PAGE_SIZE,
        })
    }

    /// Overrides the listing page size.
    #[must_use]
    pub const fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    /// Base URL of the compute API in use.
    #[must_use]
    pub fn compute_url(&self) -> &str {
        &self.compute_url
    }

    async fn fetch_page(&self, marker: Option<&str>) -> Result<DecodedPage, OpenStackBackendError> {
        let url = format!("{}/servers/detail", self.compute_url);
        let mut query = vec![(String::from("limit"), self.page_size.to_string())];
        if let Some(last_id) = marker {
            query.push((String::from("marker"), last_id.to_owned()));
        }

        let mut reauthenticated = false;
        loop {
            let token = self.session.lock().await.token().to_owned();
            let response = self
                .client
                .get(&url)
                .header(AUTH_TOKEN_HEADER, token)
                .query(&query)
                .send()
                .await?;

            let status = response.status();
            if status == StatusCode::UNAUTHORIZED && self.options.allow_reauth && !reauthenticated
            {
                info!("token rejected by compute API, re-authenticating");
                let fresh = authenticate(&self.client, &self.options).await?;
                *self.session.lock().await = fresh;
                reauthenticated = true;
                continue;
            }

            let body = response.text().await?;
            if !status.is_success() {
                return Err(OpenStackBackendError::Api {
                    status: status.as_u16(),
                    message: body,
                });
            }
            return decode_page(&body);
        }
    }

    async fn list_all(&self) -> Result<InstanceListing, OpenStackBackendError> {
        let mut listing = InstanceListing::default();
        let mut marker: Option<String> = None;
        loop {
            let page = self.fetch_page(marker.as_deref()).await?;
            debug!(
                instances = page.instances.len(),
                marker = marker.as_deref().unwrap_or("<first>"),
                "fetched servers page"
            );
            marker = page.next_marker().map(str::to_owned);
            listing.instances.extend(page.instances);
            listing.warnings.extend(page.warnings);
            if marker.is_none() {
                break;
            }
        }

        info!(
            instances = listing.instances.len(),
            degraded = listing.warnings.len(),
            "listed project instances"
        );
        Ok(listing)
    }
}

impl ComputeBackend for OpenStackBackend {
    type Error = OpenStackBackendError;

    fn list_instances(&self) -> BackendFuture<'_, InstanceListing, Self::Error> {
        Box::pin(async move { self.list_all().await })
    }
}
