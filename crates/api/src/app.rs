use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post, put},
    Router,
};
use domain::models::OtpPolicy;
use domain::services::{
    AccountAdmin, AccountStore, AdminPolicy, DemandStore, IngestionEngine, OtpGate, OtpNotifier,
    ResourceStore,
};
use shared::jwt::{JwtError, SessionTokens};
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::Config;
use crate::middleware::{metrics_handler, metrics_middleware, trace_id, OtpRateLimiter};
use crate::routes::{admin_users, auth, demands, health};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    /// Absent when running against in-memory stores.
    pub pool: Option<PgPool>,
    pub accounts: Arc<dyn AccountStore>,
    pub demands: Arc<dyn DemandStore>,
    pub resources: Arc<dyn ResourceStore>,
    pub otp_gate: OtpGate,
    pub account_admin: AccountAdmin,
    pub ingestion: IngestionEngine,
    pub sessions: Arc<SessionTokens>,
    pub otp_limiter: Option<Arc<OtpRateLimiter>>,
}

/// Storage backends the application runs on.
#[derive(Clone)]
pub struct Stores {
    pub accounts: Arc<dyn AccountStore>,
    pub demands: Arc<dyn DemandStore>,
    pub resources: Arc<dyn ResourceStore>,
}

impl AppState {
    pub fn new(
        config: Config,
        pool: Option<PgPool>,
        stores: Stores,
        notifier: Arc<dyn OtpNotifier>,
    ) -> Result<Self, JwtError> {
        let config = Arc::new(config);
        let auth = &config.auth;

        let policy = OtpPolicy::new(auth.allowed_email_domains.clone())
            .with_ttl_secs(auth.otp_ttl_secs)
            .with_max_attempts(auth.otp_max_attempts);
        let otp_gate = OtpGate::new(stores.accounts.clone(), notifier, policy);

        let account_admin = AccountAdmin::new(
            stores.accounts.clone(),
            AdminPolicy {
                allowed_domains: auth.allowed_email_domains.clone(),
                super_admin_email: auth.super_admin_email.clone(),
            },
        );

        let sessions = Arc::new(SessionTokens::new(
            &auth.session_secret,
            auth.session_expiry_secs,
        )?);

        let otp_limiter = OtpRateLimiter::new(config.security.otp_requests_per_hour).map(Arc::new);

        Ok(Self {
            ingestion: IngestionEngine::new(stores.resources.clone()),
            accounts: stores.accounts,
            demands: stores.demands,
            resources: stores.resources,
            config,
            pool,
            otp_gate,
            account_admin,
            sessions,
            otp_limiter,
        })
    }
}

pub fn create_app(state: AppState) -> Router {
    let config = state.config.clone();

    // Build CORS layer based on configuration
    let cors = if config.security.cors_origins.is_empty() {
        // Default: allow any origin (for development)
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        // Production: only allow specified origins
        use tower_http::cors::AllowOrigin;
        let origins: Vec<_> = config
            .security
            .cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any)
    };

    // Login flow (no session required)
    let auth_routes = Router::new()
        .route("/api/v1/auth/register", post(auth::register))
        .route("/api/v1/auth/otp/request", post(auth::request_otp))
        .route("/api/v1/auth/otp/resend", post(auth::resend_otp))
        .route("/api/v1/auth/otp/verify", post(auth::verify_otp))
        .route("/api/v1/auth/logout", post(auth::logout))
        .route("/api/v1/auth/me", get(auth::me));

    // Account administration (admin session checked per handler)
    let admin_routes = Router::new()
        .route(
            "/api/v1/admin/users/pending",
            get(admin_users::list_pending),
        )
        .route("/api/v1/admin/users", post(admin_users::create_user))
        .route(
            "/api/v1/admin/users/:id/approve",
            post(admin_users::approve_user),
        )
        .route(
            "/api/v1/admin/users/:id/activate",
            post(admin_users::activate_user),
        )
        .route(
            "/api/v1/admin/users/:id/deactivate",
            post(admin_users::deactivate_user),
        )
        .route("/api/v1/admin/users/:id/role", put(admin_users::change_role));

    // Demands and resource uploads (PMO)
    let demand_routes = Router::new()
        .route("/api/v1/demands", post(demands::create_demand))
        .route(
            "/api/v1/demands/:id/resources",
            get(demands::list_resources),
        )
        .route(
            "/api/v1/demands/:id/resources/upload",
            post(demands::upload_resources),
        );

    // Public routes (no authentication required)
    let public_routes = Router::new()
        .route("/api/health", get(health::health_check))
        .route("/api/health/live", get(health::live))
        .route("/metrics", get(metrics_handler));

    // Merge all routes
    Router::new()
        .merge(public_routes)
        .merge(auth_routes)
        .merge(admin_routes)
        .merge(demand_routes)
        // Global middleware (order matters: bottom layers run first)
        .layer(DefaultBodyLimit::max(config.server.max_upload_bytes))
        .layer(RequestBodyLimitLayer::new(config.server.max_upload_bytes))
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(middleware::from_fn(metrics_middleware)) // Prometheus metrics
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(trace_id)) // Request ID and logging
        .layer(cors)
        .with_state(state)
}
