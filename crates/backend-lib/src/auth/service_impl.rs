use async_trait::async_trait;
use chrono::Duration;
use metrics::counter;
use tracing::{error, info, warn};

use authgate_common::{LoginRequest, LoginResponse, RegisterRequest, User};

use crate::auth::{password, token, AuthService};
use crate::config::AuthSettings;
use crate::error::AppError;
use crate::metrics as keys;
use crate::storage::{DirectoryError, NewUser, UserDirectory};

/// Stateless orchestrator over a user directory: each call is one
/// linear flow, all state lives behind the directory.
pub struct DefaultAuth<D> {
    directory: D,
    jwt_secret: String,
    jwt_ttl: Duration,
    bcrypt_cost: u32,
}

impl<D: UserDirectory> DefaultAuth<D> {
    pub fn new(directory: D, settings: &AuthSettings) -> Self {
        Self {
            directory,
            jwt_secret: settings.jwt_secret.clone(),
            jwt_ttl: Duration::seconds(settings.jwt_ttl_secs as i64),
            bcrypt_cost: settings.bcrypt_cost,
        }
    }
}

#[async_trait]
impl<D: UserDirectory> AuthService for DefaultAuth<D> {
    async fn register(&self, req: RegisterRequest) -> Result<User, AppError> {
        let RegisterRequest {
            username,
            email,
            password: mut plain,
        } = req;

        // fast-path check; the directory's create-time constraint below
        // stays the authority if a duplicate races in between
        let (username_exists, email_exists) = self
            .directory
            .check_uniqueness(&username, &email)
            .await
            .map_err(|e| {
                error!("failed to check uniqueness: {e}");
                AppError::Internal(e.to_string())
            })?;

        if username_exists {
            warn!("registration attempted with existing username");
            counter!(keys::REGISTER_CONFLICT).increment(1);
            return Err(AppError::Conflict { field: "username" });
        }
        if email_exists {
            warn!("registration attempted with existing email");
            counter!(keys::REGISTER_CONFLICT).increment(1);
            return Err(AppError::Conflict { field: "email" });
        }

        let password_hash =
            password::hash_password_secure(&mut plain, self.bcrypt_cost).map_err(|e| {
                error!("failed to hash password: {e}");
                AppError::Internal(e.to_string())
            })?;

        let created = self
            .directory
            .create_with_password(NewUser { username, email }, &password_hash)
            .await
            .map_err(|e| {
                if matches!(e, DirectoryError::Conflict { .. }) {
                    counter!(keys::REGISTER_CONFLICT).increment(1);
                } else {
                    error!("failed to create user: {e}");
                }
                AppError::from(e)
            })?;

        counter!(keys::REGISTER_SUCCESS).increment(1);
        info!("user registered: {}", created.username);
        Ok(created)
    }

    async fn login(&self, req: LoginRequest) -> Result<LoginResponse, AppError> {
        let found = self
            .directory
            .find_by_username_with_password(&req.username)
            .await
            .map_err(|e| {
                error!("failed to look up user: {e}");
                AppError::Internal(e.to_string())
            })?;

        // unknown user and wrong password are deliberately the same error
        let Some((user, password_hash)) = found else {
            warn!("login attempted with non-existent username");
            counter!(keys::LOGIN_REJECTED).increment(1);
            return Err(AppError::Unauthorized);
        };

        if !password::verify_password(&password_hash, &req.password) {
            warn!("login attempted with invalid password");
            counter!(keys::LOGIN_REJECTED).increment(1);
            return Err(AppError::Unauthorized);
        }

        let issued = token::issue(&user, &self.jwt_secret, self.jwt_ttl).map_err(|e| {
            error!("failed to issue token: {e}");
            AppError::Internal(e.to_string())
        })?;

        counter!(keys::LOGIN_SUCCESS).increment(1);
        info!("user logged in: {}", user.username);
        Ok(LoginResponse {
            token: issued.token,
            user,
            expires_at: issued.expires_at,
        })
    }
}
