//! Short-lived submission authorization tokens.
//!
//! A token binds a submitter identity to an expiry instant under the
//! issuer's key. Logs that rate-limit submissions verify the token before
//! accepting a leaf. The caller provides `now`; this crate reads no clock.

use ed25519_dalek::Signature;
use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};

use crate::errors::{CoreResult, Error};
use crate::keys::{Keypair, VerificationKey};

/// A signed, time-bounded submission capability.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthToken {
    /// Identity the log's rate limiter accounts against, typically a
    /// registered domain.
    pub submitter_id: String,
    /// Unix seconds after which the token is no longer valid.
    pub expiry: i64,
    #[serde(with = "crate::hash::hexsig")]
    pub signature: Signature,
}

impl AuthToken {
    /// Encode for transport as `<submitter_id> <expiry> <hex-signature>`.
    pub fn to_header_value(&self) -> String {
        format!(
            "{} {} {}",
            self.submitter_id,
            self.expiry,
            hex::encode(self.signature.to_bytes())
        )
    }

    /// Decode the header form produced by [`AuthToken::to_header_value`].
    pub fn from_header_value(raw: &str) -> CoreResult<Self> {
        let mut parts = raw.split_whitespace();
        let submitter_id = parts
            .next()
            .ok_or_else(|| Error::malformed_token("empty token"))?;
        let expiry = parts
            .next()
            .ok_or_else(|| Error::malformed_token("missing expiry"))?
            .parse::<i64>()
            .map_err(|e| Error::malformed_token(format!("bad expiry: {e}")))?;
        let sig_hex = parts
            .next()
            .ok_or_else(|| Error::malformed_token("missing signature"))?;
        if parts.next().is_some() {
            return Err(Error::malformed_token("trailing fields"));
        }
        let sig_bytes = hex::decode(sig_hex)
            .map_err(|e| Error::malformed_token(format!("bad signature hex: {e}")))?;
        let sig_bytes: [u8; 64] = sig_bytes
            .try_into()
            .map_err(|_| Error::malformed_token("signature must be 64 bytes"))?;
        Ok(Self {
            submitter_id: submitter_id.to_string(),
            expiry,
            signature: Signature::from_bytes(&sig_bytes),
        })
    }
}

/// Issues tokens under one signing key.
#[derive(Debug, Clone)]
pub struct TokenIssuer {
    keypair: Keypair,
}

impl TokenIssuer {
    pub fn new(keypair: Keypair) -> Self {
        Self { keypair }
    }

    pub fn public(&self) -> VerificationKey {
        self.keypair.public()
    }

    /// Issue a token valid until `now + valid_for`.
    pub fn issue(&self, submitter_id: &str, valid_for: Duration, now: OffsetDateTime) -> AuthToken {
        let expiry = (now + valid_for).unix_timestamp();
        let signature = self.keypair.sign(&token_message(submitter_id, expiry));
        AuthToken {
            submitter_id: submitter_id.to_string(),
            expiry,
            signature,
        }
    }
}

/// Check signature and expiry. Pure; false on any mismatch.
pub fn verify_token(token: &AuthToken, issuer: &VerificationKey, now: OffsetDateTime) -> bool {
    if now.unix_timestamp() > token.expiry {
        return false;
    }
    issuer.verify(
        &token_message(&token.submitter_id, token.expiry),
        &token.signature,
    )
}

fn token_message(submitter_id: &str, expiry: i64) -> Vec<u8> {
    let label = crate::domain::AUTH_TOKEN.as_bytes();
    let mut buf = Vec::with_capacity(label.len() + submitter_id.len() + 8);
    buf.extend_from_slice(label);
    buf.extend_from_slice(submitter_id.as_bytes());
    buf.extend_from_slice(&expiry.to_be_bytes());
    buf
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn issuer() -> TokenIssuer {
        TokenIssuer::new(Keypair::from_seed(&[11u8; 32]))
    }

    fn epoch() -> OffsetDateTime {
        OffsetDateTime::from_unix_timestamp(1_700_000_000).unwrap()
    }

    #[test]
    fn issue_then_verify() {
        let issuer = issuer();
        let token = issuer.issue("submitter.example.org", Duration::minutes(5), epoch());
        assert!(verify_token(&token, &issuer.public(), epoch()));
    }

    #[test]
    fn expired_token_rejected() {
        let issuer = issuer();
        let token = issuer.issue("submitter.example.org", Duration::minutes(5), epoch());
        let later = epoch() + Duration::minutes(6);
        assert!(!verify_token(&token, &issuer.public(), later));
    }

    #[test]
    fn tampered_token_rejected() {
        let issuer = issuer();
        let mut token = issuer.issue("submitter.example.org", Duration::minutes(5), epoch());
        token.submitter_id = "attacker.example.org".to_string();
        assert!(!verify_token(&token, &issuer.public(), epoch()));

        let mut token = issuer.issue("submitter.example.org", Duration::minutes(5), epoch());
        token.expiry += 3600;
        assert!(!verify_token(&token, &issuer.public(), epoch()));
    }

    #[test]
    fn wrong_issuer_rejected() {
        let token = issuer().issue("submitter.example.org", Duration::minutes(5), epoch());
        let other = TokenIssuer::new(Keypair::from_seed(&[12u8; 32]));
        assert!(!verify_token(&token, &other.public(), epoch()));
    }

    #[test]
    fn header_roundtrip() {
        let token = issuer().issue("submitter.example.org", Duration::minutes(5), epoch());
        let restored = AuthToken::from_header_value(&token.to_header_value()).unwrap();
        assert_eq!(token, restored);
    }

    #[test]
    fn malformed_headers_rejected() {
        assert_matches!(
            AuthToken::from_header_value(""),
            Err(Error::MalformedToken(_))
        );
        assert_matches!(
            AuthToken::from_header_value("id notanumber aabb"),
            Err(Error::MalformedToken(_))
        );
        assert_matches!(
            AuthToken::from_header_value("id 123 zz"),
            Err(Error::MalformedToken(_))
        );
        assert_matches!(
            AuthToken::from_header_value("id 123 aabb extra"),
            Err(Error::MalformedToken(_))
        );
    }
}
