pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod services;

pub use db::DbPool;

use auth::TokenService;
use config::Config;

pub struct AppState {
    pub config: Config,
    pub db: DbPool,
    pub tokens: TokenService,
}

impl AppState {
    pub fn new(config: Config, db: DbPool) -> Self {
        let tokens = TokenService::from_config(&config.auth);
        Self { config, db, tokens }
    }
}
