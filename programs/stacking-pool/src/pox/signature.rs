//! Signer-key authorization for aggregation commits.
//!
//! The engine never interprets signatures itself; it consumes a verification
//! capability. [`Secp256k1Verifier`] is the production implementation
//! (65-byte recoverable signature over a keccak digest of the authorization
//! fields, compared against a 33-byte compressed signer key); tests inject
//! fakes.

use anchor_lang::prelude::*;
use anchor_lang::solana_program::keccak;
use anchor_lang::solana_program::secp256k1_recover::secp256k1_recover;

use crate::error::ErrorCode;
use crate::pox::PoxAddress;

pub const TOPIC_AGG_COMMIT: &[u8] = b"agg-commit";
pub const TOPIC_AGG_INCREASE: &[u8] = b"agg-increase";

/// The fields a signer key authorizes with one signature.
#[derive(Clone, Debug)]
pub struct CommitAuthorization<'a> {
    pub topic: &'a [u8],
    pub reward_cycle: u64,
    pub period: u64,
    pub max_amount_ustx: u128,
    pub pox_address: &'a PoxAddress,
    pub auth_id: u64,
}

impl CommitAuthorization<'_> {
    /// Keccak digest the signature is taken over. Every field participates,
    /// so a signature never authorizes more than one concrete action.
    pub fn digest(&self) -> [u8; 32] {
        keccak::hashv(&[
            self.topic,
            &self.reward_cycle.to_le_bytes(),
            &self.period.to_le_bytes(),
            &self.max_amount_ustx.to_le_bytes(),
            &[self.pox_address.version],
            self.pox_address.hashbytes.as_slice(),
            &self.auth_id.to_le_bytes(),
        ])
        .to_bytes()
    }
}

/// Verification capability consumed by the aggregation committer.
pub trait AuthorizationVerifier {
    fn verify(
        &self,
        auth: &CommitAuthorization,
        signature: &[u8; 65],
        signer_key: &[u8; 33],
    ) -> bool;
}

/// Run `verifier` over the authorization and map a rejection to the
/// engine's error taxonomy.
pub fn verify_authorization(
    verifier: &impl AuthorizationVerifier,
    auth: &CommitAuthorization,
    signature: &[u8; 65],
    signer_key: &[u8; 33],
) -> Result<()> {
    require!(
        verifier.verify(auth, signature, signer_key),
        ErrorCode::SignatureInvalid
    );
    Ok(())
}

/// Recovers the signing key from the 64-byte signature plus recovery id and
/// compares its compressed form against the claimed signer key.
pub struct Secp256k1Verifier;

impl AuthorizationVerifier for Secp256k1Verifier {
    fn verify(
        &self,
        auth: &CommitAuthorization,
        signature: &[u8; 65],
        signer_key: &[u8; 33],
    ) -> bool {
        let digest = auth.digest();
        let recovery_id = signature[64] & 3;
        let recovered = match secp256k1_recover(&digest, recovery_id, &signature[..64]) {
            Ok(key) => key.to_bytes(),
            Err(_) => return false,
        };
        compress_pubkey(&recovered) == *signer_key
    }
}

/// Compressed SEC1 form of an uncompressed (x || y) secp256k1 point.
fn compress_pubkey(uncompressed: &[u8; 64]) -> [u8; 33] {
    let mut out = [0u8; 33];
    out[0] = if uncompressed[63] & 1 == 1 { 0x03 } else { 0x02 };
    out[1..].copy_from_slice(&uncompressed[..32]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    struct AcceptAll;
    impl AuthorizationVerifier for AcceptAll {
        fn verify(&self, _: &CommitAuthorization, _: &[u8; 65], _: &[u8; 33]) -> bool {
            true
        }
    }

    struct RejectAll;
    impl AuthorizationVerifier for RejectAll {
        fn verify(&self, _: &CommitAuthorization, _: &[u8; 65], _: &[u8; 33]) -> bool {
            false
        }
    }

    fn auth<'a>(addr: &'a PoxAddress, cycle: u64, auth_id: u64) -> CommitAuthorization<'a> {
        CommitAuthorization {
            topic: TOPIC_AGG_COMMIT,
            reward_cycle: cycle,
            period: 1,
            max_amount_ustx: 100_000_000_000_000,
            pox_address: addr,
            auth_id,
        }
    }

    #[test]
    fn digest_is_deterministic() {
        let addr = PoxAddress {
            version: 1,
            hashbytes: vec![2u8; 20],
        };
        assert_eq!(auth(&addr, 1, 1).digest(), auth(&addr, 1, 1).digest());
    }

    #[test]
    fn every_field_reaches_the_digest() {
        let addr = PoxAddress {
            version: 1,
            hashbytes: vec![2u8; 20],
        };
        let base = auth(&addr, 1, 1).digest();

        assert_ne!(auth(&addr, 2, 1).digest(), base);
        assert_ne!(auth(&addr, 1, 2).digest(), base);

        let mut increase = auth(&addr, 1, 1);
        increase.topic = TOPIC_AGG_INCREASE;
        assert_ne!(increase.digest(), base);

        let mut bigger = auth(&addr, 1, 1);
        bigger.max_amount_ustx += 1;
        assert_ne!(bigger.digest(), base);

        let other_addr = PoxAddress {
            version: 1,
            hashbytes: vec![3u8; 20],
        };
        assert_ne!(auth(&other_addr, 1, 1).digest(), base);
    }

    #[test]
    fn verifier_capability_is_injectable() {
        let addr = PoxAddress {
            version: 1,
            hashbytes: vec![2u8; 20],
        };
        let auth = auth(&addr, 1, 1);
        assert!(verify_authorization(&AcceptAll, &auth, &[0u8; 65], &[0u8; 33]).is_ok());
        let rejected = verify_authorization(&RejectAll, &auth, &[0u8; 65], &[0u8; 33]);
        assert_eq!(rejected.unwrap_err(), ErrorCode::SignatureInvalid.into());
    }

    #[test]
    fn garbage_signature_is_rejected() {
        let addr = PoxAddress {
            version: 1,
            hashbytes: vec![2u8; 20],
        };
        let verifier = Secp256k1Verifier;
        assert!(!verifier.verify(&auth(&addr, 1, 1), &[0u8; 65], &[0u8; 33]));
    }

    #[test]
    fn compression_parity_follows_y() {
        let mut even = [0u8; 64];
        even[0] = 0xaa;
        assert_eq!(compress_pubkey(&even)[0], 0x02);
        assert_eq!(compress_pubkey(&even)[1], 0xaa);

        let mut odd = [0u8; 64];
        odd[63] = 1;
        assert_eq!(compress_pubkey(&odd)[0], 0x03);
    }
}
