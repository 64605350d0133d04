//! Selection of the one address an inventory host is reached on.
//!
//! The default policy, [`LastAddress`], keeps the historical behaviour: the
//! last entry of the instance's address list wins, with no regard to address
//! family or type. [`RankedAddress`] lets callers rank addresses instead.

use thiserror::Error;

use crate::backend::{Instance, NetworkAddress};

/// Errors raised while resolving an instance address.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum ResolveError {
    /// Raised when an instance has no usable address.
    #[error("unable to find any address for instance {instance}")]
    NoAddress {
        /// Name of the instance.
        instance: String,
    },
}

/// Strategy choosing one address out of an instance's address list.
pub trait AddressPolicy {
    /// Returns the selected entry, or `None` when nothing is usable.
    fn select<'a>(&self, addresses: &'a [NetworkAddress]) -> Option<&'a NetworkAddress>;
}

impl<T: AddressPolicy + ?Sized> AddressPolicy for Box<T> {
    fn select<'a>(&self, addresses: &'a [NetworkAddress]) -> Option<&'a NetworkAddress> {
        (**self).select(addresses)
    }
}

/// Picks the last entry. A trailing entry with an empty address yields no
/// selection even if earlier entries carry one.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct LastAddress;

impl AddressPolicy for LastAddress {
    fn select<'a>(&self, addresses: &'a [NetworkAddress]) -> Option<&'a NetworkAddress> {
        addresses.last().filter(|entry| !entry.address.is_empty())
    }
}

/// Picks the highest-ranked non-empty address. Ties go to the later entry,
/// so a constant ranking behaves like [`LastAddress`] over non-empty entries.
#[derive(Clone, Copy, Debug)]
pub struct RankedAddress<F> {
    rank: F,
}

impl<F> RankedAddress<F>
where
    F: Fn(&NetworkAddress) -> u8,
{
    /// Wraps a ranking function; higher ranks are preferred.
    pub const fn new(rank: F) -> Self {
        Self { rank }
    }
}

/// Address type the compute API reports for floating IPs.
pub const FLOATING_ADDRESS_TYPE: &str = "floating";

fn floating_rank(address: &NetworkAddress) -> u8 {
    u8::from(address.address_type == FLOATING_ADDRESS_TYPE)
}

impl RankedAddress<fn(&NetworkAddress) -> u8> {
    /// Ranks floating addresses above fixed ones.
    #[must_use]
    pub fn floating_first() -> Self {
        Self::new(floating_rank)
    }
}

impl<F> AddressPolicy for RankedAddress<F>
where
    F: Fn(&NetworkAddress) -> u8,
{
    fn select<'a>(&self, addresses: &'a [NetworkAddress]) -> Option<&'a NetworkAddress> {
        addresses
            .iter()
            .filter(|entry| !entry.address.is_empty())
            .max_by_key(|entry| (self.rank)(entry))
    }
}

/// Resolves the address the inventory should use for `instance`.
///
/// # Errors
///
/// Returns [`ResolveError::NoAddress`] when the policy selects nothing.
pub fn resolve_address(
    policy: &dyn AddressPolicy,
    instance: &Instance,
) -> Result<String, ResolveError> {
    policy
        .select(&instance.addresses)
        .map(|entry| entry.address.clone())
        .ok_or_else(|| ResolveError::NoAddress {
            instance: instance.name.clone(),
        })
}
