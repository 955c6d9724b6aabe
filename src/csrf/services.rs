use std::time::Duration;

use axum::extract::FromRef;
use jsonwebtoken::{decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use time::{Duration as TimeDuration, OffsetDateTime};
use tracing::debug;
use uuid::Uuid;

use crate::config::CsrfConfig;
use crate::state::AppState;

/// Payload of a CSRF token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CsrfClaims {
    pub nonce: Uuid,  // makes every token unique
    pub iat: usize,   // issued at (unix timestamp)
    pub exp: usize,   // expires at (unix timestamp)
    pub iss: String,
    pub aud: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum CsrfError {
    #[error("The CSRF token is missing.")]
    Missing,
    #[error("The CSRF token is invalid.")]
    Invalid,
    #[error("The CSRF token has expired.")]
    Expired,
}

/// Signing and verification keys for CSRF tokens.
#[derive(Clone)]
pub struct CsrfKeys {
    pub encoding: EncodingKey,
    pub decoding: DecodingKey,
    pub issuer: String,
    pub audience: String,
    pub ttl: Duration,
    pub enabled: bool,
}

impl FromRef<AppState> for CsrfKeys {
    fn from_ref(state: &AppState) -> Self {
        CsrfKeys::from_config(&state.config.csrf)
    }
}

impl CsrfKeys {
    pub fn from_config(cfg: &CsrfConfig) -> Self {
        Self {
            encoding: EncodingKey::from_secret(cfg.secret.as_bytes()),
            decoding: DecodingKey::from_secret(cfg.secret.as_bytes()),
            issuer: cfg.issuer.clone(),
            audience: cfg.audience.clone(),
            ttl: Duration::from_secs((cfg.ttl_minutes.max(0) as u64) * 60),
            enabled: cfg.enabled,
        }
    }

    pub fn issue(&self) -> anyhow::Result<String> {
        let now = OffsetDateTime::now_utc();
        let exp = now + TimeDuration::seconds(self.ttl.as_secs() as i64);
        let claims = CsrfClaims {
            nonce: Uuid::new_v4(),
            iat: now.unix_timestamp() as usize,
            exp: exp.unix_timestamp() as usize,
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
        };
        let token = encode(&Header::default(), &claims, &self.encoding)?;
        debug!(nonce = %claims.nonce, "csrf token issued");
        Ok(token)
    }

    pub fn verify(&self, token: Option<&str>) -> Result<(), CsrfError> {
        if !self.enabled {
            return Ok(());
        }
        let token = match token.map(str::trim) {
            Some(t) if !t.is_empty() => t,
            _ => return Err(CsrfError::Missing),
        };
        let mut validation = Validation::default();
        validation.set_audience(std::slice::from_ref(&self.audience));
        validation.set_issuer(std::slice::from_ref(&self.issuer));
        match decode::<CsrfClaims>(token, &self.decoding, &validation) {
            Ok(_) => Ok(()),
            Err(e) if matches!(e.kind(), ErrorKind::ExpiredSignature) => Err(CsrfError::Expired),
            Err(e) => {
                debug!(error = %e, "csrf token rejected");
                Err(CsrfError::Invalid)
            }
        }
    }
}

#[cfg(test)]
mod csrf_tests {
    use super::*;

    fn config(secret: &str) -> CsrfConfig {
        CsrfConfig {
            secret: secret.into(),
            issuer: "movieshelf".into(),
            audience: "csrf".into(),
            ttl_minutes: 60,
            enabled: true,
        }
    }

    #[test]
    fn issued_token_verifies() {
        let keys = CsrfKeys::from_config(&config("s3cret"));
        let token = keys.issue().expect("issue");
        assert_eq!(keys.verify(Some(&token)), Ok(()));
    }

    #[test]
    fn tokens_are_unique() {
        let keys = CsrfKeys::from_config(&config("s3cret"));
        assert_ne!(keys.issue().unwrap(), keys.issue().unwrap());
    }

    #[test]
    fn missing_and_blank_tokens() {
        let keys = CsrfKeys::from_config(&config("s3cret"));
        assert_eq!(keys.verify(None), Err(CsrfError::Missing));
        assert_eq!(keys.verify(Some("   ")), Err(CsrfError::Missing));
    }

    #[test]
    fn foreign_or_garbage_token_is_invalid() {
        let ours = CsrfKeys::from_config(&config("s3cret"));
        let theirs = CsrfKeys::from_config(&config("other"));
        let token = theirs.issue().unwrap();
        assert_eq!(ours.verify(Some(&token)), Err(CsrfError::Invalid));
        assert_eq!(ours.verify(Some("not-a-token")), Err(CsrfError::Invalid));
    }

    #[test]
    fn expired_token() {
        let keys = CsrfKeys::from_config(&config("s3cret"));
        let past = OffsetDateTime::now_utc() - TimeDuration::hours(2);
        let claims = CsrfClaims {
            nonce: Uuid::new_v4(),
            iat: past.unix_timestamp() as usize,
            exp: (past + TimeDuration::minutes(1)).unix_timestamp() as usize,
            iss: keys.issuer.clone(),
            aud: keys.audience.clone(),
        };
        let token = encode(&Header::default(), &claims, &keys.encoding).unwrap();
        assert_eq!(keys.verify(Some(&token)), Err(CsrfError::Expired));
    }

    #[test]
    fn disabled_accepts_anything() {
        let mut cfg = config("s3cret");
        cfg.enabled = false;
        let keys = CsrfKeys::from_config(&cfg);
        assert_eq!(keys.verify(None), Ok(()));
    }
}
