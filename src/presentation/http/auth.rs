use axum::{
    Json, Router,
    extract::{FromRequestParts, State},
    http::request::Parts,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::application::error::{AppError, AppResult};
use crate::application::ports::user_repository::UserRow;
use crate::application::use_cases::auth::login::{Login as LoginUc, LoginRequest as LoginDto};
use crate::application::use_cases::auth::me::GetMe;
use crate::application::use_cases::auth::refresh::RefreshAccess;
use crate::application::use_cases::auth::register::{
    Register as RegisterUc, RegisterRequest as RegisterDto,
};
use crate::application::use_cases::auth::verify_access::VerifyAccess;
use crate::bootstrap::app_context::AppContext;
use crate::presentation::http::extract::JsonBody;

#[derive(Debug, Deserialize, ToSchema)]
pub struct RegisterRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RegisterResponse {
    pub username: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TokenPairResponse {
    pub access: String,
    pub refresh: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct RefreshRequest {
    pub refresh: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AccessTokenResponse {
    pub access: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MeResponse {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    pub user_profile_picture: Option<Option<String>>,
}

pub fn routes(ctx: AppContext) -> Router {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/refresh", post(refresh))
        .route("/me", get(me))
        .with_state(ctx)
}

fn required(value: Option<String>, field: &'static str) -> AppResult<String> {
    value.ok_or(AppError::MissingField(field))
}

#[utoipa::path(post, path = "/api/register", tag = "Auth", request_body = RegisterRequest, security(()), responses(
    (status = 200, body = RegisterResponse),
    (status = 400, body = crate::presentation::http::error::ErrorBody)
))]
pub async fn register(
    State(ctx): State<AppContext>,
    JsonBody(req): JsonBody<RegisterRequest>,
) -> AppResult<Json<RegisterResponse>> {
    let dto = RegisterDto {
        username: required(req.username, "username")?,
        email: required(req.email, "email")?,
        password: required(req.password, "password")?,
    };
    let repo = ctx.user_repo();
    let uc = RegisterUc {
        repo: repo.as_ref(),
    };
    let user = uc.execute(&dto).await?;
    Ok(Json(RegisterResponse {
        username: user.username,
    }))
}

#[utoipa::path(post, path = "/api/login", tag = "Auth", request_body = LoginRequest, security(()), responses(
    (status = 200, body = TokenPairResponse),
    (status = 400, body = crate::presentation::http::error::ErrorBody)
))]
pub async fn login(
    State(ctx): State<AppContext>,
    JsonBody(req): JsonBody<LoginRequest>,
) -> AppResult<Json<TokenPairResponse>> {
    let dto = LoginDto {
        username: required(req.username, "username")?,
        password: required(req.password, "password")?,
    };
    let repo = ctx.user_repo();
    let uc = LoginUc {
        repo: repo.as_ref(),
        tokens: ctx.tokens(),
        media: ctx.media(),
    };
    let (user, pair) = uc.execute(&dto).await?;
    tracing::debug!(user_id = %user.id, "login_succeeded");
    Ok(Json(TokenPairResponse {
        access: pair.access,
        refresh: pair.refresh,
    }))
}

#[utoipa::path(post, path = "/api/refresh", tag = "Auth", request_body = RefreshRequest, security(()), responses(
    (status = 200, body = AccessTokenResponse),
    (status = 400, body = crate::presentation::http::error::ErrorBody)
))]
pub async fn refresh(
    State(ctx): State<AppContext>,
    JsonBody(req): JsonBody<RefreshRequest>,
) -> AppResult<Json<AccessTokenResponse>> {
    let token = required(req.refresh, "refresh")?;
    let repo = ctx.user_repo();
    let uc = RefreshAccess {
        repo: repo.as_ref(),
        tokens: ctx.tokens(),
        media: ctx.media(),
    };
    let access = uc.execute(token.trim()).await?;
    Ok(Json(AccessTokenResponse { access }))
}

#[utoipa::path(get, path = "/api/me", tag = "Auth", responses(
    (status = 200, body = MeResponse),
    (status = 401, body = crate::presentation::http::error::ErrorBody)
))]
pub async fn me(
    State(ctx): State<AppContext>,
    CurrentUser(user): CurrentUser,
) -> AppResult<Json<MeResponse>> {
    let repo = ctx.user_repo();
    let uc = GetMe {
        repo: repo.as_ref(),
    };
    let row = uc.execute(user.id).await?.ok_or(AppError::Unauthorized)?;
    Ok(Json(MeResponse {
        user_profile_picture: ctx.media().avatar_field(row.profile_picture.as_deref()),
        id: row.id,
        username: row.username,
        email: row.email,
    }))
}

// --- Bearer extractor & current user ---

pub struct Bearer(pub String);

#[axum::async_trait]
impl<S> FromRequestParts<S> for Bearer
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or(AppError::Unauthorized)?;
        let (scheme, token) = header.split_once(' ').ok_or(AppError::Unauthorized)?;
        let token = token.trim();
        if !scheme.eq_ignore_ascii_case("bearer") || token.is_empty() {
            return Err(AppError::Unauthorized);
        }
        Ok(Bearer(token.to_string()))
    }
}

/// The authenticated caller, resolved from a valid access token.
pub struct CurrentUser(pub UserRow);

#[axum::async_trait]
impl FromRequestParts<AppContext> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        ctx: &AppContext,
    ) -> Result<Self, Self::Rejection> {
        let Bearer(token) = Bearer::from_request_parts(parts, ctx).await?;
        let repo = ctx.user_repo();
        let uc = VerifyAccess {
            repo: repo.as_ref(),
            tokens: ctx.tokens(),
        };
        let user = uc.execute(&token).await?;
        Ok(CurrentUser(user))
    }
}
