// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! TON-Connect `ton_proof` verification.
//!
//! The wallet signs a hash chain built from its address, the requesting
//! domain, a timestamp and a server-issued payload token:
//!
//! ```text
//! message = "ton-proof-item-v2/" ‖ workchain (i32 BE) ‖ hash (32 bytes)
//!         ‖ domain length (u32 LE) ‖ domain ‖ timestamp (u64 LE) ‖ payload
//! digest  = sha256(0xFF 0xFF ‖ "ton-connect" ‖ sha256(message))
//! ```
//!
//! `digest` is verified as an Ed25519 signature under the submitted public key.

use std::str::FromStr;

use base64ct::{Base64, Encoding};
use ed25519_dalek::{Signature, Verifier, VerifyingKey};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use utoipa::ToSchema;

use super::session::{PayloadClaims, SessionIssuer};
use super::AuthError;

const PROOF_PREFIX: &[u8] = b"ton-proof-item-v2/";
const CONNECT_PREFIX: &[u8] = b"ton-connect";

/// Proofs dated this far ahead of the server clock are still accepted.
const FUTURE_SKEW_SECS: u64 = 60;

/// Domain the proof was requested from.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TonDomain {
    pub length_bytes: u32,
    pub value: String,
}

/// The `ton_proof` item returned by a TON-Connect wallet.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TonProof {
    /// Unix seconds at which the wallet produced the proof
    pub timestamp: u64,
    pub domain: TonDomain,
    /// Base64 Ed25519 signature
    pub signature: String,
    /// Payload token from `GET /auth/payload`
    pub payload: String,
}

/// Raw `workchain:hex-hash` account address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TonAddress {
    pub workchain: i32,
    pub hash: [u8; 32],
}

impl FromStr for TonAddress {
    type Err = AuthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (workchain, hash) = s.trim().split_once(':').ok_or(AuthError::InvalidSignature)?;
        let workchain = workchain
            .parse::<i32>()
            .map_err(|_| AuthError::InvalidSignature)?;
        let hash: [u8; 32] = alloy::hex::decode(hash)
            .ok()
            .and_then(|bytes| bytes.try_into().ok())
            .ok_or(AuthError::InvalidSignature)?;
        Ok(Self { workchain, hash })
    }
}

/// Bytes the wallet commits to, before hashing.
pub fn proof_message(address: &TonAddress, proof: &TonProof) -> Vec<u8> {
    let domain = proof.domain.value.as_bytes();
    let payload = proof.payload.as_bytes();

    let mut message =
        Vec::with_capacity(PROOF_PREFIX.len() + 4 + 32 + 4 + domain.len() + 8 + payload.len());
    message.extend_from_slice(PROOF_PREFIX);
    message.extend_from_slice(&address.workchain.to_be_bytes());
    message.extend_from_slice(&address.hash);
    message.extend_from_slice(&proof.domain.length_bytes.to_le_bytes());
    message.extend_from_slice(domain);
    message.extend_from_slice(&proof.timestamp.to_le_bytes());
    message.extend_from_slice(payload);
    message
}

/// Digest that is actually signed.
pub fn signed_digest(message: &[u8]) -> [u8; 32] {
    let inner = Sha256::digest(message);

    let mut outer = Sha256::new();
    outer.update([0xFF, 0xFF]);
    outer.update(CONNECT_PREFIX);
    outer.update(inner);
    outer.finalize().into()
}

/// Successful proof check.
///
/// The payload nonce still has to be consumed by the caller.
#[derive(Debug)]
pub struct VerifiedProof {
    pub address: String,
    pub payload: PayloadClaims,
}

/// Verifies TON-Connect proofs against payloads minted by a [`SessionIssuer`].
pub struct TonVerifier<'a> {
    sessions: &'a SessionIssuer,
    proof_ttl_secs: u64,
}

impl<'a> TonVerifier<'a> {
    pub fn new(sessions: &'a SessionIssuer, proof_ttl_secs: u64) -> Self {
        Self {
            sessions,
            proof_ttl_secs,
        }
    }

    /// Verify `proof` for `address` signed by `public_key_hex` at time `now`
    /// (unix seconds). Returns the address unchanged on success.
    ///
    /// The public key is not derived from the wallet's `state_init`, so
    /// nothing ties it to `address`: a valid proof shows that the holder of
    /// `public_key_hex` answered this server's challenge, not that it
    /// controls `address`. Treat the returned address as self-asserted.
    pub fn verify(
        &self,
        address: &str,
        public_key_hex: &str,
        proof: &TonProof,
        now: u64,
    ) -> Result<VerifiedProof, AuthError> {
        let payload = self.sessions.parse_payload(&proof.payload)?;

        if proof.timestamp > now.saturating_add(FUTURE_SKEW_SECS)
            || now.saturating_sub(proof.timestamp) > self.proof_ttl_secs
        {
            tracing::debug!(
                timestamp = proof.timestamp,
                now,
                "TON proof outside freshness window"
            );
            return Err(AuthError::ProofExpired);
        }

        let parsed: TonAddress = address.parse()?;
        let key = decode_public_key(public_key_hex)?;

        let signature = Base64::decode_vec(proof.signature.trim())
            .map_err(|_| AuthError::InvalidSignature)?;
        let signature =
            Signature::from_slice(&signature).map_err(|_| AuthError::InvalidSignature)?;

        let digest = signed_digest(&proof_message(&parsed, proof));
        key.verify(&digest, &signature)
            .map_err(|_| AuthError::InvalidSignature)?;

        Ok(VerifiedProof {
            address: address.to_string(),
            payload,
        })
    }
}

fn decode_public_key(hex: &str) -> Result<VerifyingKey, AuthError> {
    let bytes: [u8; 32] = alloy::hex::decode(hex.trim())
        .ok()
        .and_then(|bytes| bytes.try_into().ok())
        .ok_or(AuthError::InvalidSignature)?;
    VerifyingKey::from_bytes(&bytes).map_err(|_| AuthError::InvalidSignature)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AuthSettings;
    use ed25519_dalek::{Signer, SigningKey};

    const ADDRESS: &str = "0:f63660ff947e5fe6ed4a8f729f1b24ef859497d0483aaa9d9ae48414297c4e1b";
    const DOMAIN: &str = "ton-connect.github.io";

    struct Wallet {
        key: SigningKey,
    }

    impl Wallet {
        fn new() -> Self {
            Self {
                key: SigningKey::from_bytes(&[7u8; 32]),
            }
        }

        fn public_key_hex(&self) -> String {
            alloy::hex::encode(self.key.verifying_key().to_bytes())
        }

        fn prove(&self, address: &str, payload: &str, timestamp: u64) -> TonProof {
            let mut proof = TonProof {
                timestamp,
                domain: TonDomain {
                    length_bytes: DOMAIN.len() as u32,
                    value: DOMAIN.to_string(),
                },
                signature: String::new(),
                payload: payload.to_string(),
            };
            let address: TonAddress = address.parse().unwrap();
            let digest = signed_digest(&proof_message(&address, &proof));
            proof.signature = Base64::encode_string(&self.key.sign(&digest).to_bytes());
            proof
        }
    }

    fn issuer() -> SessionIssuer {
        SessionIssuer::new(&AuthSettings::with_secret("ton-test-secret"))
    }

    fn now() -> u64 {
        chrono::Utc::now().timestamp() as u64
    }

    #[test]
    fn message_layout_is_bit_exact() {
        let address = TonAddress {
            workchain: -1,
            hash: [0xAB; 32],
        };
        let proof = TonProof {
            timestamp: 1_668_094_767,
            domain: TonDomain {
                length_bytes: 21,
                value: DOMAIN.to_string(),
            },
            signature: String::new(),
            payload: "abc".to_string(),
        };

        let mut expected = b"ton-proof-item-v2/".to_vec();
        expected.extend_from_slice(&[0xFF, 0xFF, 0xFF, 0xFF]);
        expected.extend_from_slice(&[0xAB; 32]);
        expected.extend_from_slice(&[0x15, 0x00, 0x00, 0x00]);
        expected.extend_from_slice(DOMAIN.as_bytes());
        expected.extend_from_slice(&[0x2F, 0x1B, 0x6D, 0x63, 0x00, 0x00, 0x00, 0x00]);
        expected.extend_from_slice(b"abc");

        assert_eq!(proof_message(&address, &proof), expected);
    }

    #[test]
    fn digest_wraps_inner_hash() {
        let inner = Sha256::digest(b"msg");
        let mut buf = vec![0xFF, 0xFF];
        buf.extend_from_slice(b"ton-connect");
        buf.extend_from_slice(&inner);
        let expected: [u8; 32] = Sha256::digest(&buf).into();
        assert_eq!(signed_digest(b"msg"), expected);
    }

    #[test]
    fn parses_raw_addresses() {
        let address: TonAddress = ADDRESS.parse().unwrap();
        assert_eq!(address.workchain, 0);
        assert_eq!(address.hash[0], 0xf6);

        let masterchain: TonAddress = format!("-1:{}", "00".repeat(32)).parse().unwrap();
        assert_eq!(masterchain.workchain, -1);

        assert!("f63660ff".parse::<TonAddress>().is_err());
        assert!("0:abcd".parse::<TonAddress>().is_err());
        assert!("x:00".parse::<TonAddress>().is_err());
    }

    #[test]
    fn valid_proof_returns_address_unchanged() {
        let sessions = issuer();
        let payload = sessions.issue_payload().unwrap();
        let wallet = Wallet::new();
        let proof = wallet.prove(ADDRESS, &payload.token, now());

        let verified = TonVerifier::new(&sessions, 900)
            .verify(ADDRESS, &wallet.public_key_hex(), &proof, now())
            .unwrap();
        assert_eq!(verified.address, ADDRESS);
        assert_eq!(verified.payload.nonce, payload.nonce);
    }

    #[test]
    fn mutated_fields_fail_signature_check() {
        let sessions = issuer();
        let payload = sessions.issue_payload().unwrap();
        let wallet = Wallet::new();
        let verifier = TonVerifier::new(&sessions, 900);
        let ts = now();
        let proof = wallet.prove(ADDRESS, &payload.token, ts);

        let mut other_domain = proof.clone();
        other_domain.domain.value = "evil.example.org".to_string();
        other_domain.domain.length_bytes = 16;

        let mut other_length = proof.clone();
        other_length.domain.length_bytes += 1;

        let mut other_timestamp = proof.clone();
        other_timestamp.timestamp -= 1;

        for mutated in [other_domain, other_length, other_timestamp] {
            let result = verifier.verify(ADDRESS, &wallet.public_key_hex(), &mutated, ts);
            assert!(matches!(result, Err(AuthError::InvalidSignature)));
        }

        let other_workchain = ADDRESS.replacen("0:", "-1:", 1);
        let other_hash = format!("0:{}", "11".repeat(32));
        for address in [other_workchain, other_hash] {
            let result = verifier.verify(&address, &wallet.public_key_hex(), &proof, ts);
            assert!(matches!(result, Err(AuthError::InvalidSignature)));
        }

        let stranger_key = SigningKey::from_bytes(&[9u8; 32]);
        let stranger = alloy::hex::encode(stranger_key.verifying_key().to_bytes());
        let result = verifier.verify(ADDRESS, &stranger, &proof, ts);
        assert!(matches!(result, Err(AuthError::InvalidSignature)));
    }

    #[test]
    fn swapped_payload_is_rejected() {
        let sessions = issuer();
        let first = sessions.issue_payload().unwrap();
        let second = sessions.issue_payload().unwrap();
        let wallet = Wallet::new();
        let ts = now();

        let mut proof = wallet.prove(ADDRESS, &first.token, ts);
        proof.payload = second.token;
        let result =
            TonVerifier::new(&sessions, 900).verify(ADDRESS, &wallet.public_key_hex(), &proof, ts);
        assert!(matches!(result, Err(AuthError::InvalidSignature)));
    }

    #[test]
    fn forged_payload_is_rejected() {
        let sessions = issuer();
        let foreign = SessionIssuer::new(&AuthSettings::with_secret("someone-else"));
        let payload = foreign.issue_payload().unwrap();
        let wallet = Wallet::new();
        let proof = wallet.prove(ADDRESS, &payload.token, now());

        let result = TonVerifier::new(&sessions, 900).verify(
            ADDRESS,
            &wallet.public_key_hex(),
            &proof,
            now(),
        );
        assert!(matches!(result, Err(AuthError::PayloadInvalid)));
    }

    #[test]
    fn stale_and_future_proofs_expire() {
        let sessions = issuer();
        let payload = sessions.issue_payload().unwrap();
        let wallet = Wallet::new();
        let verifier = TonVerifier::new(&sessions, 900);
        let ts = now();

        let stale = wallet.prove(ADDRESS, &payload.token, ts - 901);
        let result = verifier.verify(ADDRESS, &wallet.public_key_hex(), &stale, ts);
        assert!(matches!(result, Err(AuthError::ProofExpired)));

        let future = wallet.prove(ADDRESS, &payload.token, ts + 120);
        let result = verifier.verify(ADDRESS, &wallet.public_key_hex(), &future, ts);
        assert!(matches!(result, Err(AuthError::ProofExpired)));

        let slightly_ahead = wallet.prove(ADDRESS, &payload.token, ts + 30);
        assert!(verifier
            .verify(ADDRESS, &wallet.public_key_hex(), &slightly_ahead, ts)
            .is_ok());
    }

    #[test]
    fn malformed_key_and_signature_are_rejected() {
        let sessions = issuer();
        let payload = sessions.issue_payload().unwrap();
        let wallet = Wallet::new();
        let verifier = TonVerifier::new(&sessions, 900);
        let ts = now();
        let proof = wallet.prove(ADDRESS, &payload.token, ts);

        let result = verifier.verify(ADDRESS, "abcd", &proof, ts);
        assert!(matches!(result, Err(AuthError::InvalidSignature)));

        let mut bad_signature = proof.clone();
        bad_signature.signature = "not base64!".to_string();
        let result = verifier.verify(ADDRESS, &wallet.public_key_hex(), &bad_signature, ts);
        assert!(matches!(result, Err(AuthError::InvalidSignature)));
    }
}
