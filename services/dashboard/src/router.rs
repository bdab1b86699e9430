use anyhow::Context as _;
use axum::http::{HeaderValue, Method, StatusCode, header};
use axum::middleware::from_fn_with_state;
use axum::routing::{MethodRouter, get, patch, post, put};
use axum::Router;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::timeout::TimeoutLayer;

use havenz_auth_types::permission::Operation;
use havenz_core::health::{healthz, readyz};
use havenz_core::middleware::{propagate_request_id_layer, request_id_layer, trace_layer};

use crate::config::DashboardConfig;
use crate::handlers::{
    me::{get_me, update_me},
    shop::{create_shop, get_shop, get_shop_by_code, list_shops, update_shop},
    user::{
        create_user, deactivate_user, get_user, list_users, reactivate_user,
        resend_password_link, revoke_sessions, update_user,
    },
    workorder::{create_work_order, get_work_order, list_work_orders},
};
use crate::middleware::{authenticate, require_permission};
use crate::state::AppState;

/// Attach the permission-table gate for `operation` to a single route.
pub fn gated<S>(route: MethodRouter<S>, operation: Operation) -> MethodRouter<S>
where
    S: Clone + Send + Sync + 'static,
{
    route.route_layer(from_fn_with_state(operation, require_permission))
}

/// Authenticated API routes. Every route resolves the caller first, then checks
/// the permission table before the handler runs.
pub fn api_routes(state: AppState) -> Router<AppState> {
    Router::new()
        // Users
        .route(
            "/users",
            gated(post(create_user), Operation::UsersCreate)
                .merge(gated(get(list_users), Operation::UsersList)),
        )
        .route(
            "/users/{id}",
            gated(get(get_user), Operation::UsersGet)
                .merge(gated(put(update_user), Operation::UsersUpdate)),
        )
        .route(
            "/users/{id}/deactivate",
            gated(put(deactivate_user), Operation::UsersDeactivate),
        )
        .route(
            "/users/{id}/reactivate",
            gated(put(reactivate_user), Operation::UsersReactivate),
        )
        .route(
            "/users/{id}/resend-password-link",
            gated(post(resend_password_link), Operation::UsersResendSetupLink),
        )
        .route(
            "/users/{id}/revoke-sessions",
            gated(post(revoke_sessions), Operation::UsersRevokeSessions),
        )
        // Shops
        .route(
            "/shops",
            gated(post(create_shop), Operation::ShopsCreate)
                .merge(gated(get(list_shops), Operation::ShopsList)),
        )
        .route(
            "/shops/{id}",
            gated(get(get_shop), Operation::ShopsGet)
                .merge(gated(put(update_shop), Operation::ShopsUpdate)),
        )
        .route(
            "/shops/by-code/{code}",
            gated(get(get_shop_by_code), Operation::ShopsGet),
        )
        // Me
        .route(
            "/me",
            gated(get(get_me), Operation::MeGet).merge(gated(patch(update_me), Operation::MeUpdate)),
        )
        // Work orders
        .route(
            "/workorders",
            gated(get(list_work_orders), Operation::WorkOrdersList)
                .merge(gated(post(create_work_order), Operation::WorkOrdersCreate)),
        )
        .route(
            "/workorders/{code}",
            gated(get(get_work_order), Operation::WorkOrdersGetById),
        )
        .route_layer(from_fn_with_state(state, authenticate))
}

pub fn cors_layer(config: &DashboardConfig) -> anyhow::Result<CorsLayer> {
    let origins = config
        .cors_origins()
        .iter()
        .map(|o| {
            o.parse::<HeaderValue>()
                .with_context(|| format!("invalid CORS origin {o:?}"))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true))
}

pub fn build_router(state: AppState, config: &DashboardConfig) -> anyhow::Result<Router> {
    let router = Router::new()
        // Health
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .merge(api_routes(state.clone()))
        .layer(cors_layer(config)?)
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            config.request_timeout(),
        ))
        .layer(propagate_request_id_layer())
        .layer(trace_layer())
        .layer(request_id_layer())
        .with_state(state);
    Ok(router)
}
