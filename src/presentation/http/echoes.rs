use axum::{
    Json, Router,
    extract::{Path, Query, State, rejection::PathRejection},
    http::StatusCode,
    routing::{get, post},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::application::error::{AppError, AppResult};
use crate::application::services::media::MediaUrls;
use crate::application::use_cases::echoes::create_comment::CreateComment;
use crate::application::use_cases::echoes::create_echo::CreateEcho;
use crate::application::use_cases::echoes::list_echoes::ListEchoes;
use crate::application::use_cases::echoes::toggle_like::ToggleLike;
use crate::bootstrap::app_context::AppContext;
use crate::domain::echoes::echo::{Comment, EchoThread};
use crate::presentation::http::auth::CurrentUser;
use crate::presentation::http::extract::JsonBody;

#[derive(Debug, Serialize, ToSchema)]
pub struct CommentResponse {
    pub id: i64,
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    pub user_profile_picture: Option<Option<String>>,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct EchoResponse {
    pub id: i64,
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    pub user_profile_picture: Option<Option<String>>,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub likes: i64,
    pub is_liked: bool,
    /// Newest first, at most 20.
    pub comments: Vec<CommentResponse>,
}

impl CommentResponse {
    fn from_comment(c: Comment, media: &MediaUrls) -> Self {
        Self {
            id: c.id,
            user_profile_picture: media.avatar_field(c.author.profile_picture.as_deref()),
            username: c.author.username,
            content: c.content,
            created_at: c.created_at,
        }
    }
}

impl EchoResponse {
    pub fn from_thread(thread: EchoThread, media: &MediaUrls) -> Self {
        let EchoThread { echo, comments } = thread;
        Self {
            id: echo.id,
            user_profile_picture: media.avatar_field(echo.author.profile_picture.as_deref()),
            username: echo.author.username,
            content: echo.content,
            created_at: echo.created_at,
            likes: echo.like_count,
            is_liked: echo.liked_by_viewer,
            comments: comments
                .into_iter()
                .map(|c| CommentResponse::from_comment(c, media))
                .collect(),
        }
    }
}

fn feed(threads: Vec<EchoThread>, media: &MediaUrls) -> Vec<EchoResponse> {
    threads
        .into_iter()
        .map(|t| EchoResponse::from_thread(t, media))
        .collect()
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateEchoRequest {
    pub content: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateCommentRequest {
    pub echo_id: Option<i64>,
    pub content: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct ListEchoesQuery {
    /// Page size, clamped to 1..=20.
    pub limit: Option<i64>,
}

pub fn routes(ctx: AppContext) -> Router {
    let mut router = Router::new()
        .route("/create-echo", post(create_echo))
        .route("/create-comment", post(create_comment))
        .route("/like-echo/:echo_id", post(like_echo))
        .route("/list-echoes", get(list_echoes))
        .route("/list-echoes-no-auth", get(list_echoes_no_auth));
    if ctx.cfg.liked_echoes_enabled {
        router = router.route("/list-liked-echoes", get(list_liked_echoes));
    }
    router.with_state(ctx)
}

#[utoipa::path(post, path = "/api/create-echo", tag = "Echoes", request_body = CreateEchoRequest, responses(
    (status = 201, body = EchoResponse),
    (status = 400, body = crate::presentation::http::error::ErrorBody),
    (status = 401, body = crate::presentation::http::error::ErrorBody)
))]
pub async fn create_echo(
    State(ctx): State<AppContext>,
    CurrentUser(user): CurrentUser,
    JsonBody(req): JsonBody<CreateEchoRequest>,
) -> AppResult<(StatusCode, Json<EchoResponse>)> {
    let repo = ctx.echo_repo();
    let uc = CreateEcho {
        repo: repo.as_ref(),
    };
    let thread = uc.execute(user.id, req.content.as_deref()).await?;
    tracing::info!(user_id = %user.id, echo_id = thread.echo.id, "echo_created");
    Ok((
        StatusCode::CREATED,
        Json(EchoResponse::from_thread(thread, ctx.media())),
    ))
}

#[utoipa::path(post, path = "/api/create-comment", tag = "Echoes", request_body = CreateCommentRequest, responses(
    (status = 201, body = EchoResponse),
    (status = 400, body = crate::presentation::http::error::ErrorBody),
    (status = 404, body = crate::presentation::http::error::ErrorBody)
))]
pub async fn create_comment(
    State(ctx): State<AppContext>,
    CurrentUser(user): CurrentUser,
    JsonBody(req): JsonBody<CreateCommentRequest>,
) -> AppResult<(StatusCode, Json<EchoResponse>)> {
    let repo = ctx.echo_repo();
    let uc = CreateComment {
        repo: repo.as_ref(),
    };
    let created = uc
        .execute(user.id, req.echo_id, req.content.as_deref())
        .await?;
    tracing::info!(
        user_id = %user.id,
        echo_id = created.thread.echo.id,
        comment_id = created.comment_id,
        "comment_created"
    );
    Ok((
        StatusCode::CREATED,
        Json(EchoResponse::from_thread(created.thread, ctx.media())),
    ))
}

#[utoipa::path(post, path = "/api/like-echo/{echo_id}", tag = "Echoes",
    params(("echo_id" = i64, Path, description = "Echo ID")),
    responses(
        (status = 200, body = EchoResponse),
        (status = 404, body = crate::presentation::http::error::ErrorBody)
    )
)]
pub async fn like_echo(
    State(ctx): State<AppContext>,
    CurrentUser(user): CurrentUser,
    echo_id: Result<Path<i64>, PathRejection>,
) -> AppResult<Json<EchoResponse>> {
    // Non-numeric ids cannot name an echo.
    let Path(echo_id) = echo_id.map_err(|_| AppError::NotFound("Echo"))?;
    let repo = ctx.echo_repo();
    let uc = ToggleLike {
        repo: repo.as_ref(),
    };
    let (thread, liked) = uc.execute(user.id, echo_id).await?;
    tracing::debug!(user_id = %user.id, echo_id, liked, "like_toggled");
    Ok(Json(EchoResponse::from_thread(thread, ctx.media())))
}

#[utoipa::path(get, path = "/api/list-echoes", tag = "Echoes", params(ListEchoesQuery), responses(
    (status = 200, body = [EchoResponse]),
    (status = 401, body = crate::presentation::http::error::ErrorBody)
))]
pub async fn list_echoes(
    State(ctx): State<AppContext>,
    CurrentUser(user): CurrentUser,
    q: Option<Query<ListEchoesQuery>>,
) -> AppResult<Json<Vec<EchoResponse>>> {
    let limit = q.and_then(|Query(q)| q.limit);
    let repo = ctx.echo_repo();
    let uc = ListEchoes {
        repo: repo.as_ref(),
    };
    let threads = uc.execute(Some(user.id), None, limit).await?;
    Ok(Json(feed(threads, ctx.media())))
}

#[utoipa::path(get, path = "/api/list-liked-echoes", tag = "Echoes", params(ListEchoesQuery), responses(
    (status = 200, body = [EchoResponse]),
    (status = 401, body = crate::presentation::http::error::ErrorBody)
))]
pub async fn list_liked_echoes(
    State(ctx): State<AppContext>,
    CurrentUser(user): CurrentUser,
    q: Option<Query<ListEchoesQuery>>,
) -> AppResult<Json<Vec<EchoResponse>>> {
    let limit = q.and_then(|Query(q)| q.limit);
    let repo = ctx.echo_repo();
    let uc = ListEchoes {
        repo: repo.as_ref(),
    };
    let threads = uc.execute(Some(user.id), Some(user.id), limit).await?;
    Ok(Json(feed(threads, ctx.media())))
}

#[utoipa::path(get, path = "/api/list-echoes-no-auth", tag = "Echoes", params(ListEchoesQuery), security(()), responses(
    (status = 200, body = [EchoResponse])
))]
pub async fn list_echoes_no_auth(
    State(ctx): State<AppContext>,
    q: Option<Query<ListEchoesQuery>>,
) -> AppResult<Json<Vec<EchoResponse>>> {
    let limit = q.and_then(|Query(q)| q.limit);
    let repo = ctx.echo_repo();
    let uc = ListEchoes {
        repo: repo.as_ref(),
    };
    let threads = uc.execute(None, None, limit).await?;
    Ok(Json(feed(threads, ctx.media())))
}
