// Route exports
pub mod accounts;
pub mod health;
pub mod recommendations;

use actix_web::web;
use std::sync::Arc;

use crate::services::{AccountService, Recommender};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub recommender: Arc<Recommender>,
    pub accounts: AccountService,
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .configure(health::configure)
            .configure(accounts::configure)
            .configure(recommendations::configure),
    );
}
