use axum::{extract::State, http::StatusCode, Extension, Json};
use serde_json::{json, Value};

use crate::middleware::auth::AuthUser;
use crate::models::StudentInfo;
use crate::state::AppState;

pub async fn get_profile(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> Result<(StatusCode, Json<StudentInfo>), (StatusCode, Json<Value>)> {
    // The roster can change between restarts; a valid token for a removed
    // student no longer resolves to a profile.
    let student = state
        .config
        .get_student(&auth_user.claims.sub)
        .ok_or_else(|| {
            (
                StatusCode::NOT_FOUND,
                Json(json!({
                    "error": "unknown_student"
                })),
            )
        })?;

    Ok((StatusCode::OK, Json(StudentInfo::from(student))))
}
