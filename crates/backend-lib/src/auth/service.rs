use async_trait::async_trait;
use authgate_common::{LoginRequest, LoginResponse, RegisterRequest, User};

use crate::error::AppError;

/// Register/login orchestration consumed by the HTTP surface.
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Create an account. Inputs are assumed structurally valid.
    async fn register(&self, req: RegisterRequest) -> Result<User, AppError>;

    /// Verify credentials and mint a session token.
    async fn login(&self, req: LoginRequest) -> Result<LoginResponse, AppError>;
}
