// src/services/identity.rs

use async_trait::async_trait;
use bcrypt::{hash, verify};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use sqlx::PgPool;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{SessionRepository, UserRepository},
    models::auth::{AuthSession, Claims, Role, Session, SessionUser, SignUpMetadata, User},
};

const AUTH_CODE_TTL_MINUTES: i64 = 30;

// ---
// Session events
// ---

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    SignedIn { user_id: Uuid, role: Role },
    SignedOut { user_id: Uuid },
    CodeExchanged { user_id: Uuid },
}

/// Fan-out of sign-in/sign-out events to whoever subscribed.
#[derive(Clone)]
pub struct SessionNotifier {
    sender: broadcast::Sender<SessionEvent>,
}

impl SessionNotifier {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.sender.subscribe()
    }

    pub fn notify(&self, event: SessionEvent) {
        // No subscribers is fine.
        let _ = self.sender.send(event);
    }
}

impl Default for SessionNotifier {
    fn default() -> Self {
        Self::new(64)
    }
}

// ---
// Provider contract
// ---

/// Authentication backend. Every failure is reported as an `AppError` whose
/// client message is shown to the user as-is.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, AppError>;

    async fn sign_up(&self, email: &str, password: &str, metadata: SignUpMetadata) -> Result<AuthSession, AppError>;

    /// `None` when the token does not belong to a live session.
    async fn get_session(&self, token: &str) -> Result<Option<SessionUser>, AppError>;

    async fn sign_out(&self, token: &str) -> Result<(), AppError>;

    async fn exchange_code_for_session(&self, code: &str) -> Result<AuthSession, AppError>;
}

pub fn encode_claims(secret: &str, claims: &Claims) -> Result<String, AppError> {
    Ok(encode(
        &Header::new(Algorithm::HS256),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?)
}

pub fn decode_claims(secret: &str, token: &str) -> Result<Claims, AppError> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::new(Algorithm::HS256),
    )
    .map_err(|_| AppError::InvalidToken)?;
    Ok(data.claims)
}

// ---
// Local implementation: bcrypt passwords, HS256 tokens, revocable sessions
// ---

#[derive(Clone)]
pub struct LocalIdentityProvider {
    pool: PgPool,
    users: UserRepository,
    sessions: SessionRepository,
    jwt_secret: String,
    session_ttl: Duration,
    notifier: SessionNotifier,
}

impl LocalIdentityProvider {
    pub fn new(
        pool: PgPool,
        users: UserRepository,
        sessions: SessionRepository,
        jwt_secret: String,
        session_ttl: Duration,
        notifier: SessionNotifier,
    ) -> Self {
        Self { pool, users, sessions, jwt_secret, session_ttl, notifier }
    }

    fn issue_token(&self, user: User, session: &Session) -> Result<AuthSession, AppError> {
        let claims = Claims {
            sub: user.id,
            sid: session.id,
            role: user.role,
            exp: session.expires_at.timestamp().max(0) as usize,
            iat: session.created_at.timestamp().max(0) as usize,
        };
        Ok(AuthSession {
            access_token: encode_claims(&self.jwt_secret, &claims)?,
            expires_at: session.expires_at,
            user: user.into(),
        })
    }

    fn session_expiry(&self) -> DateTime<Utc> {
        Utc::now() + self.session_ttl
    }

    async fn open_session(&self, user: User) -> Result<AuthSession, AppError> {
        let session = self.sessions.create(&self.pool, user.id, self.session_expiry()).await?;
        self.issue_token(user, &session)
    }
}

#[async_trait]
impl IdentityProvider for LocalIdentityProvider {
    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, AppError> {
        let user = self
            .users
            .find_by_email(email.trim())
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        let password = password.to_owned();
        let password_hash = user.password_hash.clone();
        let is_valid = tokio::task::spawn_blocking(move || verify(&password, &password_hash))
            .await
            .map_err(|e| anyhow::anyhow!("password verification task failed: {e}"))??;

        if !is_valid {
            tracing::warn!(user_id = %user.id, "rejected sign-in");
            return Err(AppError::InvalidCredentials);
        }

        let (user_id, role) = (user.id, user.role);
        let session = self.open_session(user).await?;
        self.notifier.notify(SessionEvent::SignedIn { user_id, role });
        tracing::info!(%user_id, %role, "user signed in");
        Ok(session)
    }

    async fn sign_up(&self, email: &str, password: &str, metadata: SignUpMetadata) -> Result<AuthSession, AppError> {
        if metadata.role == Role::Admin {
            return Err(AppError::Forbidden(metadata.role.to_string()));
        }

        let password = password.to_owned();
        let password_hash = tokio::task::spawn_blocking(move || hash(&password, bcrypt::DEFAULT_COST))
            .await
            .map_err(|e| anyhow::anyhow!("password hashing task failed: {e}"))??;

        let mut tx = self.pool.begin().await?;

        let user = self
            .users
            .create_user(&mut *tx, email.trim(), &password_hash, metadata.name.trim(), metadata.role)
            .await?;
        let session = self.sessions.create(&mut *tx, user.id, self.session_expiry()).await?;

        // Stands in for the confirmation email: the link lands on /callback.
        let code = Uuid::new_v4().simple().to_string();
        let code_expiry = Utc::now() + Duration::minutes(AUTH_CODE_TTL_MINUTES);
        self.sessions.create_auth_code(&mut *tx, &code, user.id, code_expiry).await?;

        tx.commit().await?;

        tracing::info!(user_id = %user.id, role = %user.role, "account created");
        tracing::debug!(user_id = %user.id, link = %format!("/callback?code={code}"), "confirmation link issued");

        let (user_id, role) = (user.id, user.role);
        let session = self.issue_token(user, &session)?;
        self.notifier.notify(SessionEvent::SignedIn { user_id, role });
        Ok(session)
    }

    async fn get_session(&self, token: &str) -> Result<Option<SessionUser>, AppError> {
        let Ok(claims) = decode_claims(&self.jwt_secret, token) else {
            return Ok(None);
        };
        let Some(session) = self.sessions.find_active(claims.sid).await? else {
            return Ok(None);
        };
        if session.user_id != claims.sub {
            return Ok(None);
        }
        Ok(self.users.find_by_id(session.user_id).await?.map(SessionUser::from))
    }

    async fn sign_out(&self, token: &str) -> Result<(), AppError> {
        let claims = decode_claims(&self.jwt_secret, token)?;
        if self.sessions.delete(claims.sid).await? {
            self.notifier.notify(SessionEvent::SignedOut { user_id: claims.sub });
            tracing::info!(user_id = %claims.sub, "user signed out");
        }
        Ok(())
    }

    async fn exchange_code_for_session(&self, code: &str) -> Result<AuthSession, AppError> {
        let user_id = self
            .sessions
            .consume_auth_code(code.trim())
            .await?
            .ok_or(AppError::InvalidAuthCode)?;
        let user = self.users.find_by_id(user_id).await?.ok_or(AppError::UserNotFound)?;

        let session = self.open_session(user).await?;
        self.notifier.notify(SessionEvent::CodeExchanged { user_id });
        Ok(session)
    }
}
