use axum::Router;
use axum::extract::DefaultBodyLimit;
use tower_http::services::ServeDir;

use crate::bootstrap::app_context::AppContext;

pub mod auth;
pub mod echoes;
pub mod error;
pub mod extract;
pub mod health;
pub mod profile;

/// Room for multipart framing on top of the file itself.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// Every `/api` route that only needs the application context. Health and
/// docs are mounted separately because they depend on the pool and the
/// OpenAPI document.
pub fn router(ctx: AppContext) -> Router {
    let mut api = Router::new()
        .merge(auth::routes(ctx.clone()))
        .merge(echoes::routes(ctx.clone()));
    if ctx.cfg.profile_pictures_enabled {
        api = api.merge(profile::routes(ctx.clone()));
    }
    let api = api
        .nest_service("/uploads", ServeDir::new(&ctx.cfg.storage_root))
        .layer(DefaultBodyLimit::max(
            ctx.cfg.upload_max_bytes + MULTIPART_OVERHEAD,
        ));
    Router::new().nest("/api", api)
}
