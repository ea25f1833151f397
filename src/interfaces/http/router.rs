//! API Router with Swagger UI

use std::sync::Arc;
use std::time::Instant;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::openapi::security::{Http, HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use crate::application::{FleetService, IdentityService};
use crate::domain::RepositoryProvider;
use crate::infrastructure::crypto::jwt::JwtConfig;
use crate::interfaces::http::common::ApiResponse;
use crate::interfaces::http::middleware::{auth_middleware, AuthState};
use crate::interfaces::http::modules::{
    auth, health, metrics, request_id::request_id_middleware, scooters, users,
};

/// Security scheme modifier for OpenAPI
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "basic_auth",
                SecurityScheme::Http(Http::new(HttpAuthScheme::Basic)),
            );
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("Token from POST /login"))
                        .build(),
                ),
            );
        }
    }
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        auth::login,
        scooters::list_scooters,
        scooters::get_scooter,
        scooters::update_scooter,
        users::get_user,
    ),
    components(
        schemas(
            ApiResponse<String>,
            health::HealthResponse,
            health::ComponentHealth,
            auth::LoginResponse,
            scooters::ScooterDto,
            scooters::LocationDto,
            scooters::ReservationDto,
            scooters::UpdateScooterRequest,
            users::UserDto,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Service health check"),
        (name = "Authentication", description = "Exchange Basic credentials for a JWT"),
        (name = "Scooters", description = "Fleet listing, battery/location updates, reserve and release"),
        (name = "Users", description = "Caller's own profile"),
    ),
    info(
        title = "Scooter Fleet API",
        version = "1.0.0",
        description = "REST API for tracking and reserving scooters",
        license(name = "MIT")
    )
)]
pub struct ApiDoc;

/// Create the API router with all routes.
///
/// `/metrics` is mounted only when a Prometheus handle is supplied.
pub fn create_api_router(
    repos: Arc<dyn RepositoryProvider>,
    jwt_config: JwtConfig,
    metrics_handle: Option<PrometheusHandle>,
) -> Router {
    let fleet = Arc::new(FleetService::new(repos.clone()));
    let identity = Arc::new(IdentityService::new(repos.clone(), jwt_config));

    let auth_state = AuthState {
        identity: identity.clone(),
    };

    // ── Protected routes ────────────────────────────────────────

    let scooter_routes = Router::new()
        .route("/scooter", get(scooters::list_scooters))
        .route(
            "/scooter/{id}",
            get(scooters::get_scooter).patch(scooters::update_scooter),
        )
        .with_state(scooters::ScooterAppState { fleet });

    let user_routes = Router::new()
        .route("/user/{id}", get(users::get_user))
        .with_state(users::UserHandlerState {
            identity: identity.clone(),
        });

    let protected_routes = scooter_routes
        .merge(user_routes)
        .layer(middleware::from_fn_with_state(auth_state, auth_middleware));

    // ── Public routes ───────────────────────────────────────────

    let auth_routes = Router::new()
        .route("/login", post(auth::login))
        .with_state(auth::AuthHandlerState { identity });

    let health_routes = Router::new()
        .route("/health", get(health::health_check))
        .with_state(health::HealthState {
            repos,
            started_at: Arc::new(Instant::now()),
        });

    let mut app = Router::new()
        .merge(protected_routes)
        .merge(auth_routes)
        .merge(health_routes);

    if let Some(handle) = metrics_handle {
        app = app.merge(
            Router::new()
                .route("/metrics", get(metrics::prometheus_metrics))
                .with_state(metrics::MetricsState { handle }),
        );
    }

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    app.route_layer(middleware::from_fn(metrics::http_metrics_middleware))
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(request_id_middleware))
        .layer(cors)
}
