pub mod jwt;
pub mod roster;

pub use jwt::{create_token, validate_token};
pub use roster::find_student;

use uuid::Uuid;

/// Generate the per-device session token for one login attempt.
///
/// Each attempt gets a fresh token so every device occupies its own
/// tracker slot and maps back to a single `remove` call at sign-out.
pub fn new_session_token() -> String {
    Uuid::new_v4().to_string()
}
