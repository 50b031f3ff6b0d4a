//! HMAC-signed OAuth `state` parameter (§4.5).
//!
//! `"<subject-id>:<hex-hmac-sha256(signing-secret, subject-id)>"` binds the
//! callback to the originating subject without any server-side state.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::error::{OAuthError, Result};

type HmacSha256 = Hmac<Sha256>;

pub fn sign(subject_id: &str, signing_secret: &str) -> String {
    let digest = hmac_hex(subject_id, signing_secret);
    format!("{subject_id}:{digest}")
}

fn hmac_hex(subject_id: &str, signing_secret: &str) -> String {
    let mut mac = HmacSha256::new_from_slice(signing_secret.as_bytes())
        .expect("HMAC accepts keys of any length");
    mac.update(subject_id.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

/// Splits `state` on `:`, requiring exactly two parts, and compares the
/// supplied digest against the recomputed one in constant time. Returns
/// the subject id on success.
pub fn verify(state: &str, signing_secret: &str) -> Result<String> {
    let parts: Vec<&str> = state.splitn(2, ':').collect();
    let [subject_id, supplied_digest] = parts.as_slice() else {
        return Err(OAuthError::InvalidState);
    };

    let expected_digest = hmac_hex(subject_id, signing_secret);

    let supplied_bytes = hex::decode(supplied_digest).map_err(|_| OAuthError::InvalidState)?;
    let expected_bytes = hex::decode(&expected_digest).map_err(|_| OAuthError::InvalidState)?;

    if supplied_bytes.len() != expected_bytes.len()
        || supplied_bytes.ct_eq(&expected_bytes).unwrap_u8() != 1
    {
        return Err(OAuthError::InvalidState);
    }

    Ok(subject_id.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_for_the_signing_subject() {
        let state = sign("U12345", "secret");
        assert_eq!(verify(&state, "secret").unwrap(), "U12345");
    }

    #[test]
    fn tampered_digest_fails() {
        let state = "U12345:ffff";
        assert!(matches!(
            verify(state, "secret"),
            Err(OAuthError::InvalidState)
        ));
    }

    #[test]
    fn missing_colon_fails() {
        assert!(matches!(
            verify("U12345", "secret"),
            Err(OAuthError::InvalidState)
        ));
    }

    #[test]
    fn wrong_secret_fails() {
        let state = sign("U12345", "secret-a");
        assert!(matches!(
            verify(&state, "secret-b"),
            Err(OAuthError::InvalidState)
        ));
    }
}
