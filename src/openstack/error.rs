//! Error types for the `OpenStack` backend.

use thiserror::Error;

/// Errors raised by the `OpenStack` backend.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum OpenStackBackendError {
    /// Raised when the HTTP client cannot be built or a request cannot be sent.
    #[error("transport error: {message}")]
    Transport {
        /// Message returned by the HTTP client.
        message: String,
    },
    /// Raised when Keystone rejects the credentials.
    #[error("authentication failed with status {status}: {message}")]
    Authentication {
        /// HTTP status returned by Keystone.
        status: u16,
        /// Response body, if any.
        message: String,
    },
    /// Raised when Keystone answers successfully but returns no token.
    #[error("no valid auth result")]
    EmptyAuthResult,
    /// Raised when the service catalog has no matching endpoint.
    #[error("no {service} endpoint with interface {interface} in region {region}")]
    EndpointNotFound {
        /// Catalog service type that was looked up.
        service: String,
        /// Requested endpoint interface.
        interface: String,
        /// Requested region.
        region: String,
    },
    /// Raised when the compute API returns a non-success status.
    #[error("compute API returned status {status}: {message}")]
    Api {
        /// HTTP status returned by the API.
        status: u16,
        /// Response body, if any.
        message: String,
    },
    /// Raised when a response body cannot be decoded.
    #[error("failed to decode {context}: {message}")]
    Decode {
        /// What was being decoded (for example `servers page`).
        context: String,
        /// Decoder message.
        message: String,
    },
}

impl From<reqwest::Error> for OpenStackBackendError {
    fn from(value: reqwest::Error) -> Self {
        Self::Transport {
            message: value.to_string(),
        }
    }
}
