//! Cycle arithmetic, lock planning and payout math for the stacking engine.

pub mod cycles;
pub mod locking;
pub mod shares;
pub mod signature;

pub use cycles::CycleSchedule;
pub use locking::{plan_lock, LockAction, LockPlan, LockRequest};
pub use shares::calculate_share;
pub use signature::{AuthorizationVerifier, CommitAuthorization, Secp256k1Verifier};

use anchor_lang::prelude::*;
use anchor_lang::solana_program::keccak;

use crate::error::ErrorCode;

/// Maximum length of the hash part of a reward address (p2tr/p2wsh use 32).
pub const MAX_POX_ADDR_HASH_BYTES: usize = 32;

/// A BTC reward address in its wire form: one version byte plus 1-32 hash
/// bytes, exactly as the base protocol encodes `{version, hashbytes}`.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct PoxAddress {
    pub version: u8,
    pub hashbytes: Vec<u8>,
}

impl PoxAddress {
    /// Serialized size inside an account: 1 version byte + 4-byte vec length
    /// prefix + up to 32 hash bytes.
    pub const MAX_LEN: usize = 1 + 4 + MAX_POX_ADDR_HASH_BYTES;

    pub fn validate(&self) -> Result<()> {
        require!(
            !self.hashbytes.is_empty() && self.hashbytes.len() <= MAX_POX_ADDR_HASH_BYTES,
            ErrorCode::InvalidPoxAddress
        );
        Ok(())
    }

    /// Stable 32-byte digest used wherever the address participates in PDA
    /// seeds (hash bytes alone may exceed the seed length limit).
    pub fn seed_hash(&self) -> [u8; 32] {
        keccak::hashv(&[&[self.version], self.hashbytes.as_slice()]).to_bytes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(version: u8, len: usize) -> PoxAddress {
        PoxAddress {
            version,
            hashbytes: vec![7u8; len],
        }
    }

    #[test]
    fn accepts_hash_lengths_up_to_32() {
        assert!(addr(1, 20).validate().is_ok());
        assert!(addr(4, 32).validate().is_ok());
        assert!(addr(1, 0).validate().is_err());
        assert!(addr(1, 33).validate().is_err());
    }

    #[test]
    fn seed_hash_distinguishes_version_and_bytes() {
        assert_ne!(addr(1, 20).seed_hash(), addr(2, 20).seed_hash());
        assert_ne!(addr(1, 20).seed_hash(), addr(1, 21).seed_hash());
        assert_eq!(addr(1, 20).seed_hash(), addr(1, 20).seed_hash());
    }
}
