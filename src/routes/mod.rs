mod auth;
mod health_check;
mod users;

pub use auth::{current_user, login, register, AccountResponse, LoginResponse};
pub use health_check::health_check;
pub use users::{delete_user, get_user, list_users, update_user};
