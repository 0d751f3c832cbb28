//! Owner-only access control.

use clmm_provider_domain::{Address, ProviderError, ProviderResult};
use tracing::warn;

/// The single privileged identity, fixed at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ownership {
    owner: Address,
}

impl Ownership {
    pub fn new(owner: Address) -> Self {
        Self { owner }
    }

    pub fn owner(&self) -> Address {
        self.owner
    }

    /// Fails with `NotAuthorized` unless `caller` is the owner.
    pub fn ensure_owner(&self, caller: Address) -> ProviderResult<()> {
        if caller != self.owner {
            warn!(caller = %caller, "Privileged call denied");
            return Err(ProviderError::NotAuthorized { caller });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_owner_passes() {
        let ownership = Ownership::new(Address::from_low_u64(1));
        assert!(ownership.ensure_owner(Address::from_low_u64(1)).is_ok());
        assert_eq!(
            ownership.ensure_owner(Address::from_low_u64(2)),
            Err(ProviderError::NotAuthorized {
                caller: Address::from_low_u64(2)
            })
        );
    }
}
