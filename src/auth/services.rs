use std::sync::Arc;

use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, warn};

use crate::{
    auth::{
        dto::{AuthResponse, GoogleLoginRequest, LoginRequest, RegisterRequest},
        google::IdentityVerifier,
        jwt::JwtKeys,
        password::{hash_password, verify_password},
        repo::{StoreError, UserStore},
        repo_types::{NewUser, Role},
    },
    error::ApiError,
};

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

fn internal(e: StoreError) -> ApiError {
    match e {
        StoreError::Duplicate => ApiError::Conflict,
        StoreError::Other(e) => ApiError::Internal(e),
    }
}

/// Orchestrates the three authentication flows over an injected store,
/// identity verifier and token keys. Constructed once per process.
pub struct AuthService {
    store: Arc<dyn UserStore>,
    verifier: Arc<dyn IdentityVerifier>,
    keys: JwtKeys,
    invitation_code: Option<String>,
}

impl AuthService {
    pub fn new(
        store: Arc<dyn UserStore>,
        verifier: Arc<dyn IdentityVerifier>,
        keys: JwtKeys,
        invitation_code: Option<String>,
    ) -> Self {
        Self {
            store,
            verifier,
            keys,
            invitation_code,
        }
    }

    /// Trainer role requires an exact, case-sensitive match against the
    /// configured invitation code. Anything else stays a learner.
    fn derive_role(&self, invitation_code: Option<&str>) -> Role {
        match (invitation_code, self.invitation_code.as_deref()) {
            (Some(given), Some(expected)) if given == expected => Role::Trainer,
            _ => Role::Learner,
        }
    }

    pub async fn register(&self, req: RegisterRequest) -> Result<AuthResponse, ApiError> {
        let name = req.name.trim();
        let email = req.email.trim();
        if name.is_empty() || email.is_empty() || req.password.is_empty() {
            return Err(ApiError::Validation(
                "Name, email and password are required".into(),
            ));
        }
        if !is_valid_email(email) {
            warn!(email, "register rejected: invalid email");
            return Err(ApiError::Validation("Invalid email address".into()));
        }

        if self
            .store
            .find_by_email(email)
            .await
            .map_err(internal)?
            .is_some()
        {
            warn!(email, "register rejected: email taken");
            return Err(ApiError::Conflict);
        }

        let role = self.derive_role(req.invitation_code.as_deref());
        let password_hash = hash_password(&req.password)?;

        // A concurrent registration for the same email loses here via the
        // unique index and maps to the same conflict as the pre-check.
        let user = self
            .store
            .insert(NewUser {
                name: name.to_string(),
                email: email.to_string(),
                password_hash: Some(password_hash),
                google_id: None,
                profile_picture: None,
                role,
            })
            .await
            .map_err(internal)?;

        let token = self.keys.sign(user.id)?;
        info!(user_id = %user.id, role = ?user.role, "user registered");
        Ok(AuthResponse::from_user(&user, token))
    }

    pub async fn login(&self, req: LoginRequest) -> Result<AuthResponse, ApiError> {
        let email = req.email.trim();

        let user = match self.store.find_by_email(email).await.map_err(internal)? {
            Some(u) => u,
            None => {
                warn!(email, "login failed: unknown email");
                return Err(ApiError::Authentication);
            }
        };

        // A Google-only account has no hash to compare against; that is the
        // same failure as a wrong password, not a server error.
        let ok = match user.password_hash.as_deref() {
            Some(hash) => verify_password(&req.password, hash)?,
            None => false,
        };
        if !ok {
            warn!(user_id = %user.id, "login failed: bad credentials");
            return Err(ApiError::Authentication);
        }

        let token = self.keys.sign(user.id)?;
        info!(user_id = %user.id, "user logged in");
        Ok(AuthResponse::from_user(&user, token))
    }

    pub async fn google_login(&self, req: GoogleLoginRequest) -> Result<AuthResponse, ApiError> {
        let claims = self.verifier.verify(&req.credential).await.map_err(|_| {
            warn!("google credential verification failed");
            ApiError::FederatedAuth
        })?;

        let user = match self
            .store
            .find_by_email(&claims.email)
            .await
            .map_err(internal)?
        {
            // Credential account signing in with Google for the first time:
            // link the subject id, keep role and password untouched.
            Some(u) if u.google_id.is_none() => {
                info!(user_id = %u.id, "linking google identity");
                self.store
                    .attach_google_id(u.id, &claims.sub)
                    .await
                    .map_err(internal)?
            }
            Some(u) => u,
            None => {
                self.store
                    .insert(NewUser {
                        name: claims.name,
                        email: claims.email,
                        password_hash: None,
                        google_id: Some(claims.sub),
                        profile_picture: claims.picture,
                        role: Role::Learner,
                    })
                    .await
                    .map_err(internal)?
            }
        };

        let token = self.keys.sign(user.id)?;
        info!(user_id = %user.id, "google login succeeded");
        Ok(AuthResponse::from_user(&user, token))
    }
}
