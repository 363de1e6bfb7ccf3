use std::fmt;
use ae_core::{Error, Result, SessionId};
use axum::http::header::COOKIE;
use axum::http::{HeaderMap, HeaderValue};
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

pub const SESSION_COOKIE: &str = "ae_session";

/// Signs session ids into cookie values and checks them on the way back in.
pub struct SessionSigner {
    mac: HmacSha256,
}

impl fmt::Debug for SessionSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionSigner")
            .field("key", &"<redacted>")
            .finish()
    }
}

/// The session a request belongs to, plus the cookie to send when it is new.
#[derive(Debug)]
pub struct ResolvedSession {
    pub id: SessionId,
    pub set_cookie: Option<HeaderValue>,
}

impl SessionSigner {
    pub fn new(secret: impl AsRef<[u8]>) -> Result<Self> {
        let mac = HmacSha256::new_from_slice(secret.as_ref())
            .map_err(|e| Error::Config(format!("invalid session secret: {}", e)))?;
        Ok(Self { mac })
    }

    /// Hex HMAC-SHA256 of the session id under the signer's key.
    fn signature(&self, id: &str) -> String {
        let mut mac = self.mac.clone();
        mac.update(id.as_bytes());
        format!("{:x}", mac.finalize().into_bytes())
    }

    pub fn sign(&self, id: &SessionId) -> String {
        let id = id.to_string();
        let signature = self.signature(&id);
        format!("{}.{}", id, signature)
    }

    pub fn verify(&self, value: &str) -> Option<SessionId> {
        let (id, signature) = value.split_once('.')?;
        let expected = self.signature(id);
        if !constant_time_eq(expected.as_bytes(), signature.as_bytes()) {
            return None;
        }
        id.parse().ok()
    }

    /// Session from the request's cookie, or a fresh one when the cookie is absent or forged.
    pub fn resolve(&self, headers: &HeaderMap) -> ResolvedSession {
        if let Some(id) = cookie_value(headers, SESSION_COOKIE).and_then(|v| self.verify(v)) {
            return ResolvedSession { id, set_cookie: None };
        }

        let id = SessionId::new();
        let cookie = format!("{}={}; Path=/; HttpOnly; SameSite=Lax", SESSION_COOKIE, self.sign(&id));
        ResolvedSession {
            id,
            set_cookie: HeaderValue::from_str(&cookie).ok(),
        }
    }
}

fn cookie_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(COOKIE)
        .into_iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value)
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.len() == b.len() && a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
