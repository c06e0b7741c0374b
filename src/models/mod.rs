pub mod roster;
pub mod user;

pub use roster::{AppConfig, TrackerSettings};
pub use user::{Claims, LoginRequest, LoginResponse, Student, StudentInfo};
