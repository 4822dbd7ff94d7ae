use crate::database::store::UserStore;
use crate::dto::auth_dto::{AuthResponse, LoginPayload, RegisterPayload, UserSummary};
use crate::error::{Error, Result};
use crate::models::user::{User, UserRole};
use crate::utils::crypto::{hash_password, verify_password};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

/// Bearer token payload, inserted into request extensions by the auth middleware.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub email: String,
    pub role: UserRole,
    pub exp: usize,
}

#[derive(Debug, Clone)]
pub struct AuthSettings {
    pub jwt_secret: String,
    pub expiry_hours: i64,
}

#[derive(Clone)]
pub struct AuthService {
    store: Arc<dyn UserStore>,
    settings: Arc<AuthSettings>,
}

impl AuthService {
    pub fn new(store: Arc<dyn UserStore>, settings: AuthSettings) -> Self {
        Self {
            store,
            settings: Arc::new(settings),
        }
    }

    /// Self-registration always yields a `candidate` account.
    pub async fn register(&self, payload: RegisterPayload) -> Result<AuthResponse> {
        let email = payload.email.trim().to_lowercase();
        let username = payload.username.trim().to_string();
        if self.store.user_exists(&email, &username).await? {
            return Err(Error::Conflict("User already exists".to_string()));
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            email,
            username,
            password_hash: hash_password(&payload.password)?,
            first_name: payload.first_name.trim().to_string(),
            last_name: payload.last_name.trim().to_string(),
            role: UserRole::Candidate,
            phone: payload.phone,
            is_active: true,
            last_login_at: None,
            created_at: now,
            updated_at: now,
        };
        let user = self.store.insert_user(&user).await?;
        tracing::info!(user_id = %user.id, "user registered");

        self.respond(&user)
    }

    pub async fn login(&self, payload: LoginPayload) -> Result<AuthResponse> {
        let email = payload.email.trim().to_lowercase();
        let Some(mut user) = self.store.find_user_by_email(&email).await? else {
            return Err(invalid_credentials());
        };
        if !verify_password(&payload.password, &user.password_hash)? {
            tracing::debug!(user_id = %user.id, "password mismatch");
            return Err(invalid_credentials());
        }
        if !user.is_active {
            return Err(Error::Unauthorized("Account deactivated".to_string()));
        }

        let now = Utc::now();
        self.store.touch_last_login(user.id, now).await?;
        user.last_login_at = Some(now);
        tracing::info!(user_id = %user.id, role = user.role.as_str(), "user logged in");

        self.respond(&user)
    }

    pub async fn profile(&self, user_id: Uuid) -> Result<User> {
        self.store
            .find_user(user_id)
            .await?
            .ok_or_else(|| Error::NotFound("User not found".to_string()))
    }

    /// Creates the configured admin once. Returns `false` when one already exists.
    pub async fn bootstrap_admin(&self, email: &str, password: &str) -> Result<bool> {
        let email = email.trim().to_lowercase();
        if self.store.find_user_by_email(&email).await?.is_some() {
            return Ok(false);
        }

        let now = Utc::now();
        let admin = User {
            id: Uuid::new_v4(),
            username: email.split('@').next().unwrap_or("admin").to_string(),
            email,
            password_hash: hash_password(password)?,
            first_name: "System".to_string(),
            last_name: "Administrator".to_string(),
            role: UserRole::Admin,
            phone: None,
            is_active: true,
            last_login_at: None,
            created_at: now,
            updated_at: now,
        };
        let admin = self.store.insert_user(&admin).await?;
        tracing::info!(user_id = %admin.id, email = %admin.email, "admin account bootstrapped");
        Ok(true)
    }

    pub fn issue_token(&self, user: &User) -> Result<String> {
        let exp = Utc::now() + Duration::hours(self.settings.expiry_hours);
        let claims = Claims {
            sub: user.id,
            email: user.email.clone(),
            role: user.role,
            exp: exp.timestamp() as usize,
        };
        Ok(encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.settings.jwt_secret.as_bytes()),
        )?)
    }

    pub fn decode_token(&self, token: &str) -> Result<Claims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        let data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.settings.jwt_secret.as_bytes()),
            &validation,
        )?;
        Ok(data.claims)
    }

    fn respond(&self, user: &User) -> Result<AuthResponse> {
        Ok(AuthResponse {
            access_token: self.issue_token(user)?,
            user: UserSummary::from(user),
        })
    }
}

fn invalid_credentials() -> Error {
    Error::Unauthorized("Invalid credentials".to_string())
}
