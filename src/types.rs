//! Newtypes for provider values to avoid stringly-typed code.

use std::fmt;
use std::ops::Deref;

use serde::{Deserialize, Serialize};

macro_rules! newtype {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Debug, Default, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Wraps a raw provider value.
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            /// Returns the wrapped value.
            #[must_use]
            pub const fn as_str(&self) -> &str {
                self.0.as_str()
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_owned())
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                self.as_str()
            }
        }

        impl Deref for $name {
            type Target = str;
            fn deref(&self) -> &Self::Target {
                self.as_str()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

newtype!(
    /// Opaque provider identifier of an instance.
    InstanceId
);
newtype!(
    /// Provider-reported lifecycle state (for example `ACTIVE` or `SHUTOFF`).
    InstanceStatus
);

/// Lifecycle state of instances that belong in the inventory.
pub const ACTIVE_STATUS: &str = "ACTIVE";

impl InstanceStatus {
    /// Returns `true` only for the exact string `ACTIVE`.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.as_str() == ACTIVE_STATUS
    }
}
