//! Host chain access
//!
//! The governance core never reads chain state on its own. Height, token
//! issuance and call execution come from a [`ChainFacade`] supplied by the
//! host runtime.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::{Balance, BlockNumber, CurrencyId, OrganizationId};

/// Collaborator interface to the host chain.
pub trait ChainFacade {
    /// Current block height. Monotonic.
    fn current_height(&self) -> BlockNumber;

    /// Total supply of `currency`.
    fn total_issuance(&self, currency: CurrencyId) -> Balance;

    /// Execute an encoded call with `origin` as the signer. The error string
    /// is reported back to the caller as-is.
    fn dispatch(&mut self, origin: &OrganizationId, call: &[u8]) -> Result<(), String>;
}

/// A dispatched call, as recorded by [`LocalChain`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchedCall {
    pub origin: OrganizationId,
    #[serde(with = "crate::proposal::hex_bytes")]
    pub call: Vec<u8>,
    pub height: BlockNumber,
}

/// In-process chain used by the CLI and tests. Calls are recorded instead
/// of executed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LocalChain {
    pub height: BlockNumber,
    pub issuance: BTreeMap<CurrencyId, Balance>,
    pub dispatched: Vec<DispatchedCall>,
    /// When set, every dispatch fails.
    #[serde(default)]
    pub fail_dispatches: bool,
}

impl LocalChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_issuance(currency: CurrencyId, amount: Balance) -> Self {
        let mut chain = Self::new();
        chain.issuance.insert(currency, amount);
        chain
    }

    /// Move the chain forward by `blocks`.
    pub fn advance(&mut self, blocks: BlockNumber) -> BlockNumber {
        self.height = self.height.saturating_add(blocks);
        self.height
    }

    /// Increase the supply of `currency` by `amount`.
    pub fn mint(&mut self, currency: CurrencyId, amount: Balance) -> Balance {
        let supply = self.issuance.entry(currency).or_insert(0);
        *supply = supply.saturating_add(amount);
        *supply
    }
}

impl ChainFacade for LocalChain {
    fn current_height(&self) -> BlockNumber {
        self.height
    }

    fn total_issuance(&self, currency: CurrencyId) -> Balance {
        self.issuance.get(&currency).copied().unwrap_or(0)
    }

    fn dispatch(&mut self, origin: &OrganizationId, call: &[u8]) -> Result<(), String> {
        if self.fail_dispatches {
            return Err(format!("dispatch of {} byte call rejected", call.len()));
        }
        self.dispatched.push(DispatchedCall {
            origin: origin.clone(),
            call: call.to_vec(),
            height: self.height,
        });
        Ok(())
    }
}
