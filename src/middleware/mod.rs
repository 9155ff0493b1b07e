/// Middleware module
///
/// Request gating for protected routes.

mod auth_gate;

pub use auth_gate::{authorize, AuthGate, AuthenticatedUser, Rejection, BEARER_PREFIX};
