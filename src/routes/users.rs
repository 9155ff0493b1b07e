/// Account management routes. All of them sit behind `AuthGate`.

use actix_web::{web, HttpResponse};
use serde::Deserialize;

use crate::domain::AccountId;
use crate::error::AppError;
use crate::middleware::AuthenticatedUser;
use crate::routes::AccountResponse;
use crate::service::AccountService;
use crate::validators::{is_valid_email, is_valid_name};

/// Partial profile update. Absent or empty fields keep their current value.
#[derive(Deserialize)]
pub struct UpdateRequest {
    pub name: Option<String>,
    pub email: Option<String>,
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

/// GET /users
pub async fn list_users(accounts: web::Data<AccountService>) -> Result<HttpResponse, AppError> {
    let users: Vec<AccountResponse> = accounts
        .get_all()
        .await?
        .iter()
        .map(AccountResponse::from)
        .collect();
    let count = accounts.count().await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "users": users,
        "count": count,
    })))
}

/// GET /users/{id}
pub async fn get_user(
    path: web::Path<String>,
    accounts: web::Data<AccountService>,
) -> Result<HttpResponse, AppError> {
    let id = AccountId::from(path.into_inner());
    let account = accounts
        .get_by_id(&id)
        .await?
        .ok_or_else(|| AppError::NotFound("User".to_string()))?;

    Ok(HttpResponse::Ok().json(AccountResponse::from(&account)))
}

/// PUT /users/{id}
///
/// # Errors
/// - 400: Invalid name or email
/// - 404: No such account
/// - 409: Email owned by another account
pub async fn update_user(
    path: web::Path<String>,
    form: web::Json<UpdateRequest>,
    caller: web::ReqData<AuthenticatedUser>,
    accounts: web::Data<AccountService>,
) -> Result<HttpResponse, AppError> {
    let id = AccountId::from(path.into_inner());

    let name = non_empty(&form.name).map(is_valid_name).transpose()?;
    let email = non_empty(&form.email).map(is_valid_email).transpose()?;

    let account = accounts.update_profile(&id, name, email).await?;

    tracing::info!(user_id = %account.id, caller = %caller.user_id, "Profile updated");

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "User updated successfully",
        "user": AccountResponse::from(&account),
    })))
}

/// DELETE /users/{id}
pub async fn delete_user(
    path: web::Path<String>,
    caller: web::ReqData<AuthenticatedUser>,
    accounts: web::Data<AccountService>,
) -> Result<HttpResponse, AppError> {
    let id = AccountId::from(path.into_inner());

    if !accounts.delete(&id).await? {
        return Err(AppError::NotFound("User".to_string()));
    }

    tracing::info!(user_id = %id, caller = %caller.user_id, "User deleted");

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "User deleted successfully",
    })))
}
