use std::sync::Arc;

use crate::application::ports::echo_repository::EchoRepository;
use crate::application::ports::storage_port::StoragePort;
use crate::application::ports::user_repository::UserRepository;
use crate::application::services::media::MediaUrls;
use crate::application::services::tokens::TokenService;
use crate::bootstrap::config::Config;

#[derive(Clone)]
pub struct AppContext {
    pub cfg: Config,
    services: Arc<AppServices>,
}

#[derive(Clone)]
pub struct AppServices {
    user_repo: Arc<dyn UserRepository>,
    echo_repo: Arc<dyn EchoRepository>,
    storage_port: Arc<dyn StoragePort>,
    tokens: TokenService,
    media: MediaUrls,
}

impl AppServices {
    pub fn new(
        cfg: &Config,
        user_repo: Arc<dyn UserRepository>,
        echo_repo: Arc<dyn EchoRepository>,
        storage_port: Arc<dyn StoragePort>,
    ) -> Self {
        Self {
            user_repo,
            echo_repo,
            storage_port,
            tokens: TokenService::new(
                cfg.jwt_secret_pem.clone(),
                cfg.jwt_access_expires_secs,
                cfg.jwt_refresh_expires_secs,
            ),
            media: MediaUrls::new(&cfg.public_origin(), cfg.profile_pictures_enabled),
        }
    }
}

impl AppContext {
    pub fn new(cfg: Config, services: AppServices) -> Self {
        Self {
            cfg,
            services: Arc::new(services),
        }
    }

    pub fn user_repo(&self) -> Arc<dyn UserRepository> {
        self.services.user_repo.clone()
    }

    pub fn echo_repo(&self) -> Arc<dyn EchoRepository> {
        self.services.echo_repo.clone()
    }

    pub fn storage_port(&self) -> Arc<dyn StoragePort> {
        self.services.storage_port.clone()
    }

    pub fn tokens(&self) -> &TokenService {
        &self.services.tokens
    }

    pub fn media(&self) -> &MediaUrls {
        &self.services.media
    }
}
