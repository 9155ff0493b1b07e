/// Authentication module
///
/// Handles password hashing, session token issuance/validation,
/// and the clock both of them read time from.

mod claims;
mod clock;
mod jwt;
mod password;

pub use claims::Claims;
pub use clock::{Clock, FixedClock, SystemClock};
pub use jwt::{TokenService, DEFAULT_ISSUER, DEFAULT_TOKEN_LIFETIME_SECONDS};
pub use password::CredentialHasher;
