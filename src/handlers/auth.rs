use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    Extension, Json,
};
use chrono::Utc;
use serde_json::{json, Value};

use crate::auth::{create_token, find_student, new_session_token};
use crate::middleware::auth::AuthUser;
use crate::models::{Claims, LoginRequest, LoginResponse, StudentInfo};
use crate::session::Admission;
use crate::state::AppState;

pub async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<LoginRequest>,
) -> Result<(StatusCode, Json<LoginResponse>), (StatusCode, Json<Value>)> {
    // Validate input
    if payload.email.is_empty() || payload.password.is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "Email and password are required"
            })),
        ));
    }

    // Verify credentials against the roster
    let student = find_student(&state.config.students, &payload.email, &payload.password)
        .ok_or_else(|| {
            (
                StatusCode::UNAUTHORIZED,
                Json(json!({
                    "error": "invalid_credentials"
                })),
            )
        })?;

    // Device-limit check. A fresh token per login attempt gives each
    // device its own slot in the tracker.
    let session_token = new_session_token();
    let user_agent = headers
        .get(header::USER_AGENT)
        .and_then(|h| h.to_str().ok());

    if state.tracker.register(&student.id, &session_token, user_agent)
        == Admission::LimitReached
    {
        // Distinct from a credential failure so the client can tell the
        // student why they were denied.
        return Err((
            StatusCode::CONFLICT,
            Json(json!({
                "error": "device_limit_reached",
                "message": "This account is already signed in on the maximum number of devices. Sign out on another device and try again."
            })),
        ));
    }

    // Create the JWT carrying the per-device session token
    let claims = Claims {
        sub: student.id.clone(),
        name: student.name.clone(),
        email: student.email.clone(),
        sid: session_token.clone(),
        exp: (Utc::now() + chrono::Duration::seconds(state.config.token_lifetime_secs))
            .timestamp() as usize,
    };

    let token = create_token(&claims).map_err(|_| {
        // The slot was taken above; give it back so a failed token issue
        // doesn't leak a device slot.
        state.tracker.remove(&student.id, &session_token);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({
                "error": "Failed to create token"
            })),
        )
    })?;

    Ok((
        StatusCode::OK,
        Json(LoginResponse {
            token,
            student: StudentInfo::from(student),
        }),
    ))
}

/// Free the caller's device slot. Safe to call repeatedly: removing an
/// unknown token is a silent no-op.
pub async fn logout(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> StatusCode {
    state
        .tracker
        .remove(&auth_user.claims.sub, &auth_user.claims.sid);
    StatusCode::NO_CONTENT
}

/// How many devices the caller currently has signed in
pub async fn sessions(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> (StatusCode, Json<Value>) {
    let active = state.tracker.active_count(&auth_user.claims.sub);
    (
        StatusCode::OK,
        Json(json!({
            "active_devices": active,
            "max_devices": state.config.tracker.max_devices
        })),
    )
}
