//! HS256 bearer tokens in compact JWT form.
//!
//!   base64url(header) "." base64url(claims) "." base64url(HMAC-SHA256)
//!
//! Only `HS256` is accepted on verification. Padding is never emitted.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::{Duration, Utc};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use healix_contracts::error::{HealixError, HealixResult};

type HmacSha256 = Hmac<Sha256>;

const ALGORITHM: &str = "HS256";

#[derive(Debug, Serialize, Deserialize)]
struct Header {
    alg: String,
    typ: String,
}

/// The claims carried by every token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// User id.
    pub sub: String,
    pub email: String,
    pub role: String,
    /// Expiry, seconds since the Unix epoch.
    pub exp: i64,
}

/// Signs and verifies tokens with one shared secret.
#[derive(Clone)]
pub struct TokenSigner {
    secret: Vec<u8>,
    ttl_minutes: i64,
}

impl TokenSigner {
    pub fn new(secret: impl AsRef<[u8]>, ttl_minutes: i64) -> Self {
        Self { secret: secret.as_ref().to_vec(), ttl_minutes }
    }

    /// Claims for `sub` expiring one TTL from now.
    ///
    /// # Errors
    ///
    /// `ConfigError` if the TTL does not fit in a timestamp.
    pub fn claims_for(&self, sub: &str, email: &str, role: &str) -> HealixResult<Claims> {
        let exp = Duration::try_minutes(self.ttl_minutes)
            .and_then(|ttl| Utc::now().checked_add_signed(ttl))
            .ok_or_else(|| HealixError::ConfigError {
                reason: format!("token TTL of {} minutes is out of range", self.ttl_minutes),
            })?;
        Ok(Claims {
            sub: sub.to_string(),
            email: email.to_string(),
            role: role.to_string(),
            exp: exp.timestamp(),
        })
    }

    pub fn sign(&self, claims: &Claims) -> HealixResult<String> {
        let header = Header { alg: ALGORITHM.to_string(), typ: "JWT".to_string() };
        let header = encode_json(&header)?;
        let payload = encode_json(claims)?;
        let signing_input = format!("{header}.{payload}");

        let signature = self.mac(signing_input.as_bytes())?.finalize().into_bytes();
        Ok(format!("{signing_input}.{}", URL_SAFE_NO_PAD.encode(signature)))
    }

    /// Check signature, algorithm and expiry; return the claims.
    pub fn verify(&self, token: &str) -> HealixResult<Claims> {
        let parts: Vec<&str> = token.trim().split('.').collect();
        let [header, payload, signature] = parts.as_slice() else {
            return Err(invalid("expected three dot-separated segments"));
        };

        let signature = URL_SAFE_NO_PAD
            .decode(signature)
            .map_err(|e| invalid(&format!("signature is not base64url: {e}")))?;
        self.mac(format!("{header}.{payload}").as_bytes())?
            .verify_slice(&signature)
            .map_err(|_| invalid("signature mismatch"))?;

        let header: Header = decode_json(header)?;
        if header.alg != ALGORITHM {
            return Err(invalid(&format!("unsupported algorithm '{}'", header.alg)));
        }

        let claims: Claims = decode_json(payload)?;
        if Utc::now().timestamp() > claims.exp {
            return Err(invalid("token expired"));
        }
        Ok(claims)
    }

    fn mac(&self, input: &[u8]) -> HealixResult<HmacSha256> {
        let mut mac = HmacSha256::new_from_slice(&self.secret)
            .map_err(|e| HealixError::ConfigError { reason: format!("invalid token secret: {e}") })?;
        mac.update(input);
        Ok(mac)
    }
}

fn invalid(reason: &str) -> HealixError {
    HealixError::TokenInvalid { reason: reason.to_string() }
}

fn encode_json<T: Serialize>(value: &T) -> HealixResult<String> {
    let json = serde_json::to_vec(value)
        .map_err(|e| HealixError::TokenInvalid { reason: format!("failed to encode segment: {e}") })?;
    Ok(URL_SAFE_NO_PAD.encode(json))
}

fn decode_json<T: for<'de> Deserialize<'de>>(segment: &str) -> HealixResult<T> {
    let bytes = URL_SAFE_NO_PAD
        .decode(segment)
        .map_err(|e| invalid(&format!("segment is not base64url: {e}")))?;
    serde_json::from_slice(&bytes).map_err(|e| invalid(&format!("segment is not valid JSON: {e}")))
}
