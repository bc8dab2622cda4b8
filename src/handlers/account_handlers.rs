//! Registration, login and logout, plus the `CurrentOwner` extractor that
//! every record handler uses to learn who is calling.

use crate::{
    errors::AppError,
    services::{
        bucket_list_service::BucketListService,
        session_registry::{SESSION_COOKIE, session_id_from_cookie_header},
    },
};
use axum::{
    Json,
    extract::{FromRequestParts, State},
    http::{header, request::Parts},
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

/// Body of `POST /register` and `POST /login`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CredentialsReq {
    pub email: String,
    pub password: String,
}

/// The account behind the request's session cookie.
///
/// Rejects with 401 when the cookie is missing, malformed or expired.
#[derive(Debug, Clone)]
pub struct CurrentOwner {
    pub owner: String,
    pub session: Uuid,
}

impl FromRequestParts<BucketListService> for CurrentOwner {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        service: &BucketListService,
    ) -> Result<Self, Self::Rejection> {
        let session = parts
            .headers
            .get_all(header::COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .find_map(session_id_from_cookie_header)
            .ok_or_else(AppError::unauthenticated)?;

        let owner = service
            .owner_for_session(&session)
            .ok_or_else(AppError::unauthenticated)?;

        Ok(Self { owner, session })
    }
}

fn session_cookie(session: Uuid) -> String {
    format!("{SESSION_COOKIE}={session}; Path=/; HttpOnly; SameSite=Lax")
}

/// `POST /register`: create an account and log it in.
pub async fn register(
    State(service): State<BucketListService>,
    Json(req): Json<CredentialsReq>,
) -> Result<impl IntoResponse, AppError> {
    let (_, session) = service.register(&req.email, &req.password).await?;
    Ok((
        [(header::SET_COOKIE, session_cookie(session))],
        Json(json!({ "success": "Account created successfully" })),
    ))
}

/// `POST /login`
pub async fn login(
    State(service): State<BucketListService>,
    Json(req): Json<CredentialsReq>,
) -> Result<impl IntoResponse, AppError> {
    let (owner, session) = service.login(&req.email, &req.password)?;
    tracing::debug!(owner = %owner, "Authenticated");
    Ok((
        [(header::SET_COOKIE, session_cookie(session))],
        Json(json!({ "success": "Authenticated successfully" })),
    ))
}

/// `POST /logout`: forget the session and expire the cookie.
pub async fn logout(
    State(service): State<BucketListService>,
    current: CurrentOwner,
) -> impl IntoResponse {
    service.logout(&current.session);
    (
        [(
            header::SET_COOKIE,
            format!("{SESSION_COOKIE}=; Path=/; Max-Age=0"),
        )],
        Json(json!({ "success": "Logged out successfully" })),
    )
}
