use argon2::{Argon2, password_hash::{PasswordHasher, PasswordVerifier, SaltString}, PasswordHash};
use chrono::{DateTime, Duration, Utc};
use configs::AdminConfig;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header as JwtHeader, Validation};
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use super::domain::{AdminCredentials, LoginInput, SessionContext, SessionToken};
use super::errors::AuthError;

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    iat: usize,
    exp: usize,
}

/// Whether the caller may mutate articles. Pure function of the request context.
pub fn is_authorized(ctx: &SessionContext) -> bool {
    ctx.subject().is_some()
}

/// Hash a password into an Argon2 PHC string suitable for `admin.password_hash`.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| AuthError::HashError(e.to_string()))
}

/// Credential check plus session token issue/resolve, independent of web framework.
pub struct AccessGate {
    credentials: AdminCredentials,
    secret: String,
    ttl: Duration,
}

impl AccessGate {
    pub fn new(credentials: AdminCredentials, secret: impl Into<String>, ttl: Duration) -> Self {
        Self { credentials, secret: secret.into(), ttl }
    }

    pub fn from_config(cfg: &AdminConfig) -> Result<Self, AuthError> {
        let ttl = Duration::try_hours(cfg.session_ttl_hours)
            .filter(|d| *d > Duration::zero())
            .ok_or_else(|| AuthError::Config(format!("session ttl {}h out of range", cfg.session_ttl_hours)))?;
        let credentials = AdminCredentials {
            username: cfg.username.clone(),
            password: cfg.password.clone(),
            password_hash: cfg.password_hash.clone().filter(|h| !h.trim().is_empty()),
        };
        Ok(Self::new(credentials, cfg.session_secret.clone(), ttl))
    }

    /// Compare supplied credentials with the configured operator.
    pub fn verify_credentials(&self, input: &LoginInput) -> Result<(), AuthError> {
        if input.username != self.credentials.username {
            return Err(AuthError::Unauthorized);
        }
        if let Some(hash) = &self.credentials.password_hash {
            let parsed = PasswordHash::new(hash).map_err(|e| AuthError::HashError(e.to_string()))?;
            return Argon2::default()
                .verify_password(input.password.as_bytes(), &parsed)
                .map_err(|_| AuthError::Unauthorized);
        }
        match &self.credentials.password {
            Some(expected) if *expected == input.password => Ok(()),
            _ => Err(AuthError::Unauthorized),
        }
    }

    /// Verify credentials and issue a session token.
    #[instrument(skip(self, input), fields(username = %input.username))]
    pub fn login(&self, input: &LoginInput) -> Result<SessionToken, AuthError> {
        if let Err(e) = self.verify_credentials(input) {
            warn!(code = e.code(), "login rejected");
            return Err(e);
        }
        let session = self.issue_at(Utc::now())?;
        info!(expires_at = %session.expires_at, "admin_logged_in");
        Ok(session)
    }

    fn issue_at(&self, now: DateTime<Utc>) -> Result<SessionToken, AuthError> {
        let expires_at = now + self.ttl;
        let claims = Claims {
            sub: self.credentials.username.clone(),
            iat: now.timestamp().max(0) as usize,
            exp: expires_at.timestamp().max(0) as usize,
        };
        let token = encode(&JwtHeader::default(), &claims, &EncodingKey::from_secret(self.secret.as_bytes()))
            .map_err(|e| AuthError::TokenError(e.to_string()))?;
        Ok(SessionToken { token, expires_at })
    }

    /// Resolve a session token into a request context. Anything that is not a
    /// valid, unexpired token for the configured operator is anonymous.
    pub fn resolve(&self, token: Option<&str>) -> SessionContext {
        let Some(token) = token.filter(|t| !t.is_empty()) else {
            return SessionContext::anonymous();
        };
        let key = DecodingKey::from_secret(self.secret.as_bytes());
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 0;

        match decode::<Claims>(token, &key, &validation) {
            Ok(data) if data.claims.sub == self.credentials.username => SessionContext::authenticated(data.claims.sub),
            Ok(data) => {
                debug!(sub = %data.claims.sub, "session token for unknown subject");
                SessionContext::anonymous()
            }
            Err(e) => {
                debug!(err = %e, "session token rejected");
                SessionContext::anonymous()
            }
        }
    }
}
