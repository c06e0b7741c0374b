// Roster-backed credential verification

use crate::models::Student;

/// Returns the matching student, or None if the credentials don't match
/// any roster entry. Email matching is case-insensitive and ignores
/// surrounding whitespace; the password must match exactly.
pub fn find_student<'a>(
    students: &'a [Student],
    email: &str,
    password: &str,
) -> Option<&'a Student> {
    let lower = email.trim().to_lowercase();
    students
        .iter()
        .find(|s| s.email.to_lowercase() == lower && s.password == password)
}
