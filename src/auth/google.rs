use axum::async_trait;
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::warn;

const GOOGLE_JWKS_URL: &str = "https://www.googleapis.com/oauth2/v3/certs";
const GOOGLE_ISSUERS: [&str; 2] = ["https://accounts.google.com", "accounts.google.com"];
const JWKS_TTL: Duration = Duration::from_secs(60 * 60);

/// Identity claim extracted from a verified Google ID token.
#[derive(Debug, Clone, Deserialize)]
pub struct GoogleClaims {
    pub sub: String,
    pub email: String,
    pub name: String,
    pub picture: Option<String>,
}

/// Uniform verification failure. The cause is logged, never surfaced:
/// a rejected assertion carries no partial trust.
#[derive(Debug, thiserror::Error)]
#[error("identity assertion rejected")]
pub struct VerifyError;

/// Validates a third-party identity assertion and returns the verified claim.
///
/// Constructed once per process and injected into the auth service, so tests
/// can substitute a fake.
#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    async fn verify(&self, credential: &str) -> Result<GoogleClaims, VerifyError>;
}

#[derive(Debug, Deserialize)]
struct Jwk {
    kid: String,
    n: String,
    e: String,
}

#[derive(Debug, Deserialize)]
struct JwkSet {
    keys: Vec<Jwk>,
}

struct CachedKeys {
    keys: Vec<Jwk>,
    fetched_at: Instant,
}

/// Verifies Google ID tokens against Google's published signing keys.
///
/// The key set is cached across requests (read-mostly) and refreshed when
/// stale or when a token references an unknown `kid`.
pub struct GoogleVerifier {
    http: reqwest::Client,
    client_id: String,
    jwks: RwLock<Option<CachedKeys>>,
}

impl GoogleVerifier {
    pub fn new(client_id: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            client_id,
            jwks: RwLock::new(None),
        }
    }

    async fn fetch_jwks(&self) -> Result<(), VerifyError> {
        let set: JwkSet = self
            .http
            .get(GOOGLE_JWKS_URL)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| {
                warn!(error = %e, "google jwks fetch failed");
                VerifyError
            })?
            .json()
            .await
            .map_err(|e| {
                warn!(error = %e, "google jwks parse failed");
                VerifyError
            })?;
        *self.jwks.write().await = Some(CachedKeys {
            keys: set.keys,
            fetched_at: Instant::now(),
        });
        Ok(())
    }

    async fn decoding_key(&self, kid: &str) -> Result<DecodingKey, VerifyError> {
        {
            let guard = self.jwks.read().await;
            if let Some(c) = guard.as_ref() {
                if c.fetched_at.elapsed() < JWKS_TTL {
                    if let Some(jwk) = c.keys.iter().find(|k| k.kid == kid) {
                        return DecodingKey::from_rsa_components(&jwk.n, &jwk.e)
                            .map_err(|_| VerifyError);
                    }
                }
            }
        }
        // Stale cache, or an unknown kid after a key rotation: refetch once.
        self.fetch_jwks().await?;
        let guard = self.jwks.read().await;
        let cached = guard.as_ref().ok_or(VerifyError)?;
        let jwk = cached.keys.iter().find(|k| k.kid == kid).ok_or_else(|| {
            warn!(kid, "google jwks has no matching key");
            VerifyError
        })?;
        DecodingKey::from_rsa_components(&jwk.n, &jwk.e).map_err(|_| VerifyError)
    }
}

#[async_trait]
impl IdentityVerifier for GoogleVerifier {
    async fn verify(&self, credential: &str) -> Result<GoogleClaims, VerifyError> {
        let header = decode_header(credential).map_err(|e| {
            warn!(error = %e, "malformed google credential");
            VerifyError
        })?;
        let kid = header.kid.ok_or(VerifyError)?;
        let key = self.decoding_key(&kid).await?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_audience(std::slice::from_ref(&self.client_id));
        validation.set_issuer(&GOOGLE_ISSUERS);

        let data = decode::<GoogleClaims>(credential, &key, &validation).map_err(|e| {
            warn!(error = %e, "google credential rejected");
            VerifyError
        })?;
        Ok(data.claims)
    }
}
