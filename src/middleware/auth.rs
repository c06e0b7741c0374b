use axum::{
    extract::Request,
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};

use crate::auth::jwt::validate_token;
use crate::models::Claims;

// Extension to store claims in request
#[derive(Clone)]
pub struct AuthUser {
    pub claims: Claims,
}

pub async fn auth_middleware(
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    // Extract the Authorization header
    let auth_header = headers
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .ok_or(StatusCode::UNAUTHORIZED)?;

    // Check if it starts with "Bearer "
    if !auth_header.starts_with("Bearer ") {
        return Err(StatusCode::UNAUTHORIZED);
    }

    // Extract the token
    let token = &auth_header[7..];

    // Validate the token
    let claims = validate_token(token).map_err(|_| StatusCode::UNAUTHORIZED)?;

    // Add the claims to the request extensions
    request.extensions_mut().insert(AuthUser { claims });

    Ok(next.run(request).await)
}
