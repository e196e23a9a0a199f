// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! EVM personal-message sign-in.
//!
//! The wallet signs the challenge text with EIP-191 (`personal_sign`). The
//! server recovers the signer from the 65-byte `r ‖ s ‖ v` signature and uses
//! the EIP-55 checksummed address as the account identity.
//!
//! Recovery always yields some address, so a corrupted signature is only
//! detected when the client also sends the address it expects to sign in
//! as. Without it a bit-flipped signature signs in as an unrelated wallet.
//! With `EVM_REQUIRE_PAYLOAD` on, the expected address is mandatory too.

use alloy::primitives::{Address, Signature};

use super::AuthError;

/// Challenge text a wallet signs.
///
/// With a payload the nonce is appended on its own line, which binds the
/// signature to a single challenge issued by this server.
pub fn challenge_message(base: &str, payload: Option<&str>) -> String {
    match payload {
        Some(payload) => format!("{base}\n\nNonce: {payload}"),
        None => base.to_string(),
    }
}

/// Recover the signer of `message` from a hex encoded signature.
pub fn recover_signer(message: &str, signature_hex: &str) -> Result<Address, AuthError> {
    let bytes = alloy::hex::decode(signature_hex.trim()).map_err(|_| AuthError::InvalidSignature)?;
    if bytes.len() != 65 {
        return Err(AuthError::InvalidSignature);
    }

    let signature =
        Signature::try_from(bytes.as_slice()).map_err(|_| AuthError::InvalidSignature)?;

    signature
        .recover_address_from_msg(message.as_bytes())
        .map_err(|_| AuthError::InvalidSignature)
}

/// Verify a sign-in signature and return the checksummed wallet address.
///
/// When `expected` is given the recovered signer must match it
/// (case-insensitively); a corrupted signature usually recovers to some
/// unrelated address, so this is the only way to reject it.
pub fn verify(
    challenge: &str,
    signature_hex: &str,
    expected: Option<&str>,
) -> Result<String, AuthError> {
    let recovered = recover_signer(challenge, signature_hex)?;

    if let Some(expected) = expected {
        let expected: Address = expected.trim().parse().map_err(|_| AuthError::InvalidSignature)?;
        if expected != recovered {
            tracing::debug!(%recovered, %expected, "Recovered signer does not match address");
            return Err(AuthError::InvalidSignature);
        }
    }

    Ok(recovered.to_checksum(None))
}

/// EIP-55 form of `raw` if it is an EVM address.
pub fn checksum_address(raw: &str) -> Option<String> {
    raw.trim()
        .parse::<Address>()
        .ok()
        .map(|address| address.to_checksum(None))
}
