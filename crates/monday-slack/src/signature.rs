//! Request-signature verification for inbound Slack webhooks (v0 scheme):
//! `HMAC-SHA256("v0:{timestamp}:{body}", signing_secret)`, compared
//! constant-time against `X-Slack-Signature`.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::error::{Result, SlackError};

type HmacSha256 = Hmac<Sha256>;

/// Five minutes, Slack's own recommended replay-window bound.
const MAX_CLOCK_SKEW_SECS: i64 = 60 * 5;

pub fn verify(
    signing_secret: &str,
    timestamp_header: &str,
    signature_header: &str,
    body: &[u8],
    now_epoch_secs: i64,
) -> Result<()> {
    let timestamp: i64 = timestamp_header
        .parse()
        .map_err(|_| SlackError::InvalidSignature("malformed X-Slack-Request-Timestamp".into()))?;

    if (now_epoch_secs - timestamp).abs() > MAX_CLOCK_SKEW_SECS {
        return Err(SlackError::InvalidSignature("timestamp outside tolerance".into()));
    }

    let sig_hex = signature_header
        .strip_prefix("v0=")
        .ok_or_else(|| SlackError::InvalidSignature("missing v0= prefix".into()))?;
    let expected = hex::decode(sig_hex)
        .map_err(|_| SlackError::InvalidSignature("signature is not valid hex".into()))?;

    let mut mac = HmacSha256::new_from_slice(signing_secret.as_bytes())
        .map_err(|_| SlackError::InvalidSignature("invalid signing secret length".into()))?;
    mac.update(b"v0:");
    mac.update(timestamp_header.as_bytes());
    mac.update(b":");
    mac.update(body);
    let computed = mac.finalize().into_bytes();

    if computed.as_slice().ct_eq(&expected).unwrap_u8() == 1 {
        Ok(())
    } else {
        Err(SlackError::InvalidSignature("HMAC mismatch".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sign(secret: &str, ts: &str, body: &[u8]) -> String {
        let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).unwrap();
        mac.update(b"v0:");
        mac.update(ts.as_bytes());
        mac.update(b":");
        mac.update(body);
        format!("v0={}", hex::encode(mac.finalize().into_bytes()))
    }

    #[test]
    fn valid_signature_passes() {
        let secret = "shh";
        let ts = "1700000000";
        let body = b"{\"ok\":true}";
        let sig = sign(secret, ts, body);
        assert!(verify(secret, ts, &sig, body, 1700000000).is_ok());
    }

    #[test]
    fn tampered_body_fails() {
        let secret = "shh";
        let ts = "1700000000";
        let sig = sign(secret, ts, b"original");
        assert!(verify(secret, ts, &sig, b"tampered", 1700000000).is_err());
    }

    #[test]
    fn stale_timestamp_fails() {
        let secret = "shh";
        let ts = "1700000000";
        let body = b"{}";
        let sig = sign(secret, ts, body);
        assert!(verify(secret, ts, &sig, body, 1700001000).is_err());
    }
}
