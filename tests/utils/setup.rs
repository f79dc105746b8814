use axum::Router;
use std::sync::Arc;

use boardgame_league::{
    auth::TokenConfig,
    build_router,
    catalog::repository::InMemoryCatalogRepository,
    directory::repository::InMemoryDirectoryRepository,
    sessions::repository::InMemorySessionRepository,
    AppState, PointsScheme, SessionScorer,
};

// ============================================================================
// Test Setup Infrastructure
// ============================================================================

/// A registered user as seen by the tests
#[derive(Debug, Clone)]
pub struct TestUser {
    pub id: String,
    pub token: String,
}

pub struct TestSetup {
    pub app: Router,
    pub sessions: Arc<InMemorySessionRepository>,
}

pub struct TestSetupBuilder {
    points_scheme: PointsScheme,
}

impl TestSetupBuilder {
    pub fn new() -> Self {
        Self {
            points_scheme: PointsScheme::default(),
        }
    }

    pub fn with_points_scheme(mut self, points_scheme: PointsScheme) -> Self {
        self.points_scheme = points_scheme;
        self
    }

    pub fn build(self) -> TestSetup {
        let sessions = Arc::new(InMemorySessionRepository::new());
        let state = AppState::new(
            Arc::new(InMemoryDirectoryRepository::new()),
            Arc::new(InMemoryCatalogRepository::new()),
            sessions.clone(),
            TokenConfig::new("integration-secret".to_string(), 1),
            SessionScorer::new(self.points_scheme.policy()),
        );

        TestSetup {
            app: build_router(state),
            sessions,
        }
    }
}
