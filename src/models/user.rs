use serde::{Deserialize, Serialize};

/// One student allowed to sign in, as listed in the roster config.
///
/// Credentials are compared in plain text; the roster file is trusted
/// input for a small private deployment, not a hardened user store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Student {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password: String,
    /// Cohort label displayed in the dashboard
    pub year: String,
    /// Short initials shown in the avatar badge
    pub avatar: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // Student ID
    pub name: String,
    pub email: String,
    /// Per-device session token; maps this login to its tracker slot
    pub sid: String,
    pub exp: usize, // Expiration time
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub student: StudentInfo,
}

/// Public view of a student, without the password
#[derive(Debug, Serialize)]
pub struct StudentInfo {
    pub id: String,
    pub name: String,
    pub email: String,
    pub year: String,
    pub avatar: String,
}

impl From<&Student> for StudentInfo {
    fn from(student: &Student) -> Self {
        Self {
            id: student.id.clone(),
            name: student.name.clone(),
            email: student.email.clone(),
            year: student.year.clone(),
            avatar: student.avatar.clone(),
        }
    }
}
