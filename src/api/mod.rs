// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    auth::Role,
    models::{LoginRequest, LoginResponse, TransferRequest, TransferResponse, UserView},
    state::AppState,
};

pub mod health;
pub mod payments;
pub mod session;
pub mod users;

pub fn router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/", get(health::root))
        .route("/health", get(health::health))
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness))
        .route("/login", post(session::login))
        .route("/user/{id}", get(users::get_user))
        .route("/payments/transfer", post(payments::transfer))
        .with_state(state);

    // Layers run outermost-last: the request id is set before tracing sees
    // the request and copied onto the response on the way out.
    Router::new()
        .merge(api_routes)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::root,
        health::health,
        health::liveness,
        health::readiness,
        session::login,
        users::get_user,
        payments::transfer
    ),
    components(
        schemas(
            LoginRequest,
            LoginResponse,
            UserView,
            Role,
            TransferRequest,
            TransferResponse,
            health::RootResponse,
            health::HealthResponse,
            health::ReadyResponse,
            health::HealthChecks
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Liveness and readiness"),
        (name = "Session", description = "Password login"),
        (name = "Users", description = "Identity lookup"),
        (name = "Payments", description = "Ledger transfers")
    )
)]
struct ApiDoc;

/// Registers the `bearer` security scheme referenced by protected paths.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}
