/// Authentication Routes
///
/// Registration, login, and the caller's own account.

use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};

use crate::domain::{Account, AccountId};
use crate::error::AppError;
use crate::middleware::AuthenticatedUser;
use crate::service::AccountService;
use crate::validators::{is_valid_email, is_valid_name, is_valid_password};

/// Account registration request
#[derive(Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Login request
#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Outward view of an account. Never carries the password hash.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct AccountResponse {
    pub id: String,
    pub name: String,
    pub email: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<&Account> for AccountResponse {
    fn from(account: &Account) -> Self {
        Self {
            id: account.id.to_string(),
            name: account.name.clone(),
            email: account.email.clone(),
            created_at: account.created_at.to_rfc3339(),
            updated_at: account.updated_at.to_rfc3339(),
        }
    }
}

/// Successful login
#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub user: AccountResponse,
}

/// POST /auth/register
///
/// # Validation
/// - Name: 2-50 characters, no control characters
/// - Email: valid format, not already registered
/// - Password: 6-72 characters
///
/// # Errors
/// - 400: Validation errors or malformed body
/// - 409: Email already registered
/// - 500: Directory unavailable or hashing failure
pub async fn register(
    form: web::Json<RegisterRequest>,
    accounts: web::Data<AccountService>,
) -> Result<HttpResponse, AppError> {
    let name = is_valid_name(&form.name)?;
    let email = is_valid_email(&form.email)?;
    is_valid_password(&form.password)?;

    let account = accounts.register(&name, &email, &form.password).await?;

    Ok(HttpResponse::Created().json(AccountResponse::from(&account)))
}

/// POST /auth/login
///
/// # Errors
/// - 400: Malformed body
/// - 401: Invalid credentials (unknown email and wrong password look the same)
/// - 500: Directory unavailable
pub async fn login(
    form: web::Json<LoginRequest>,
    accounts: web::Data<AccountService>,
) -> Result<HttpResponse, AppError> {
    let (token, account) = accounts.login(form.email.trim(), &form.password).await?;

    Ok(HttpResponse::Ok().json(LoginResponse {
        token,
        token_type: "Bearer".to_string(),
        expires_in: accounts.tokens().lifetime_seconds(),
        user: AccountResponse::from(&account),
    }))
}

/// GET /auth/me
///
/// **Requires** `Authorization: Bearer <token>`; identity is injected by `AuthGate`.
///
/// # Errors
/// - 401: Missing or invalid token (handled by the gate)
/// - 404: The account was deleted after the token was issued
pub async fn current_user(
    user: web::ReqData<AuthenticatedUser>,
    accounts: web::Data<AccountService>,
) -> Result<HttpResponse, AppError> {
    let id = AccountId::from(user.user_id.as_str());
    let account = accounts
        .get_by_id(&id)
        .await?
        .ok_or_else(|| AppError::NotFound("User".to_string()))?;

    Ok(HttpResponse::Ok().json(AccountResponse::from(&account)))
}
