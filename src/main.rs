use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::extract::MatchedPath;
use dotenvy::dotenv;
use http::HeaderValue;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use echoes::application::ports::echo_repository::EchoRepository;
use echoes::application::ports::storage_port::StoragePort;
use echoes::application::ports::user_repository::UserRepository;
use echoes::bootstrap::app_context::{AppContext, AppServices};
use echoes::bootstrap::config::Config;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
        paths(
            echoes::presentation::http::auth::register,
            echoes::presentation::http::auth::login,
            echoes::presentation::http::auth::refresh,
            echoes::presentation::http::auth::me,
            echoes::presentation::http::echoes::create_echo,
            echoes::presentation::http::echoes::create_comment,
            echoes::presentation::http::echoes::like_echo,
            echoes::presentation::http::echoes::list_echoes,
            echoes::presentation::http::echoes::list_liked_echoes,
            echoes::presentation::http::echoes::list_echoes_no_auth,
            echoes::presentation::http::profile::upload_profile_pic,
            echoes::presentation::http::health::health,
        ),
        components(schemas(
            echoes::presentation::http::auth::RegisterRequest,
            echoes::presentation::http::auth::RegisterResponse,
            echoes::presentation::http::auth::LoginRequest,
            echoes::presentation::http::auth::TokenPairResponse,
            echoes::presentation::http::auth::RefreshRequest,
            echoes::presentation::http::auth::AccessTokenResponse,
            echoes::presentation::http::auth::MeResponse,
            echoes::presentation::http::echoes::EchoResponse,
            echoes::presentation::http::echoes::CommentResponse,
            echoes::presentation::http::echoes::CreateEchoRequest,
            echoes::presentation::http::echoes::CreateCommentRequest,
            echoes::presentation::http::profile::UploadProfilePictureResponse,
            echoes::presentation::http::profile::UploadProfilePictureMultipart,
            echoes::presentation::http::error::ErrorBody,
            echoes::presentation::http::health::HealthResp,
        )),
        tags(
            (name = "Auth", description = "Registration and JWT tokens"),
            (name = "Echoes", description = "Posts, comments and likes"),
            (name = "Profile", description = "Profile pictures"),
            (name = "Health", description = "System health checks")
        )
    )]
struct ApiDoc;

fn cors_layer(cfg: &Config) -> CorsLayer {
    let base = CorsLayer::new()
        .allow_methods([
            http::Method::GET,
            http::Method::POST,
            http::Method::OPTIONS,
        ])
        .allow_headers([http::header::CONTENT_TYPE, http::header::AUTHORIZATION]);
    match cfg.frontend_url.as_deref().map(HeaderValue::from_str) {
        Some(Ok(origin)) => base.allow_origin(origin).allow_credentials(true),
        // Unparseable FRONTEND_URL or no FRONTEND_URL in production: deny all
        Some(Err(_)) | None if cfg.is_production => base.allow_origin(AllowOrigin::exact(
            HeaderValue::from_static("http://invalid"),
        )),
        _ => base
            .allow_origin(AllowOrigin::mirror_request())
            .allow_credentials(true),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "echoes=debug,axum=info,tower_http=info".into()),
        )
        .init();

    let cfg = Config::from_env()?;
    info!(
        port = cfg.api_port,
        storage_root = %cfg.storage_root,
        profile_pictures = cfg.profile_pictures_enabled,
        liked_echoes = cfg.liked_echoes_enabled,
        production = cfg.is_production,
        "Starting Echoes backend"
    );

    // Database
    let pool = echoes::infrastructure::db::connect_pool(&cfg.database_url).await?;
    echoes::infrastructure::db::migrate(&pool).await?;

    let user_repo: Arc<dyn UserRepository> = Arc::new(
        echoes::infrastructure::db::repositories::user_repository_sqlx::SqlxUserRepository::new(
            pool.clone(),
        ),
    );
    let echo_repo: Arc<dyn EchoRepository> = Arc::new(
        echoes::infrastructure::db::repositories::echo_repository_sqlx::SqlxEchoRepository::new(
            pool.clone(),
        ),
    );
    let storage_port: Arc<dyn StoragePort> =
        Arc::new(echoes::infrastructure::storage::port_impl::FsStoragePort {
            uploads_root: std::path::PathBuf::from(&cfg.storage_root),
        });

    let services = AppServices::new(&cfg, user_repo, echo_repo, storage_port);
    let ctx = AppContext::new(cfg.clone(), services);

    // Ensure uploads dir exists
    if let Err(e) = tokio::fs::create_dir_all(&cfg.storage_root).await {
        tracing::warn!(error = ?e, dir = %cfg.storage_root, "Failed to create uploads dir");
    }

    let app = Router::new()
        .nest(
            "/api",
            echoes::presentation::http::health::routes(pool.clone()),
        )
        .merge(echoes::presentation::http::router(ctx))
        .merge(SwaggerUi::new("/api/docs").url("/api/openapi.json", ApiDoc::openapi()))
        .layer(cors_layer(&cfg))
        .layer(
            TraceLayer::new_for_http().make_span_with(|req: &http::Request<_>| {
                let method = req.method().clone();
                let uri = req.uri().clone();
                let matched = req
                    .extensions()
                    .get::<MatchedPath>()
                    .map(|p| p.as_str().to_string())
                    .unwrap_or_default();
                tracing::info_span!("http", %method, %uri, matched_path = %matched)
            }),
        );

    let api_addr = SocketAddr::from(([0, 0, 0, 0], cfg.api_port));
    info!(%api_addr, "HTTP API listening");
    let listener = tokio::net::TcpListener::bind(api_addr).await?;

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!(?e, "API server failed");
        return Err(e.into());
    }
    info!("HTTP API stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(?e, "Failed to listen for shutdown signal");
    }
}
