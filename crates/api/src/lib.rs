//! HTTP API layer with Axum routes and middleware.
//!
//! This crate provides:
//! - REST API routes under `/api`
//! - Bearer token middleware and the per-request [`RequestContext`]
//! - Validated JSON extraction
//! - The JSON error envelope

pub mod error;
pub mod extractors;
pub mod middleware;
pub mod routes;

pub use error::{ApiError, ApiResult};
pub use middleware::RequestContext;

use axum::Router;
use chrono_tz::Tz;
use holdco_db::{
    ActivityLogRepository, AllocationRuleRepository, BusinessUnitRepository, CategoryRepository,
    EmployeeRepository, PartnerRepository, PaymentMethodRepository, TransactionRepository,
    UserRepository,
};
use holdco_shared::JwtService;
use holdco_shared::config::{ServerConfig, UploadsConfig};
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub db: Arc<DatabaseConnection>,
    /// JWT service for token operations.
    pub jwt_service: Arc<JwtService>,
    /// Where attachment files are served from.
    pub uploads: Arc<UploadsConfig>,
    /// Business timezone for defaulting transaction dates.
    pub timezone: Tz,
}

impl AppState {
    /// Creates the state from its parts.
    #[must_use]
    pub fn new(db: DatabaseConnection, jwt_service: JwtService, uploads: UploadsConfig) -> Self {
        Self {
            db: Arc::new(db),
            jwt_service: Arc::new(jwt_service),
            uploads: Arc::new(uploads),
            timezone: ServerConfig::default().timezone,
        }
    }

    /// Overrides the business timezone.
    #[must_use]
    pub fn with_timezone(mut self, timezone: Tz) -> Self {
        self.timezone = timezone;
        self
    }

    fn conn(&self) -> DatabaseConnection {
        (*self.db).clone()
    }

    pub(crate) fn users(&self) -> UserRepository {
        UserRepository::new(self.conn())
    }

    pub(crate) fn business_units(&self) -> BusinessUnitRepository {
        BusinessUnitRepository::new(self.conn())
    }

    pub(crate) fn categories(&self) -> CategoryRepository {
        CategoryRepository::new(self.conn())
    }

    pub(crate) fn payment_methods(&self) -> PaymentMethodRepository {
        PaymentMethodRepository::new(self.conn())
    }

    pub(crate) fn partners(&self) -> PartnerRepository {
        PartnerRepository::new(self.conn())
    }

    pub(crate) fn employees(&self) -> EmployeeRepository {
        EmployeeRepository::new(self.conn())
    }

    pub(crate) fn allocation_rules(&self) -> AllocationRuleRepository {
        AllocationRuleRepository::new(self.conn())
    }

    pub(crate) fn transactions(&self) -> TransactionRepository {
        TransactionRepository::new(self.conn())
    }

    pub(crate) fn activity_logs(&self) -> ActivityLogRepository {
        ActivityLogRepository::new(self.conn())
    }
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    let uploads = ServeDir::new(&state.uploads.dir);
    let uploads_path = state.uploads.public_path.clone();

    Router::new()
        .nest("/api", routes::api_routes_with_state(state.clone()))
        .nest_service(&uploads_path, uploads)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
