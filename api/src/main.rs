mod admin;
mod auth;
mod clubs;
mod error;
mod settings;
mod sqlite;
mod users;

use error::AppResult;
use settings::Settings;
use sqlite::Database;

use anyhow::Result;
use tokio::{net::TcpListener, time::Instant};

use axum::{
    routing::{delete, get, post, put},
    serve, Router,
};
use tokio::signal;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Clone)]
struct AppState {
    db: Database,
    auth: auth::Settings,
}

async fn create_app(settings: &Settings) -> Result<Router> {
    let db = sqlite::create_pool(&settings.sqlite).await?;
    let app_state = AppState {
        db,
        auth: settings.auth.clone(),
    };

    let app = Router::new()
        .route("/hi", get(|| async { "Hello, World!" }))
        .nest("/auth", auth::router())
        .nest("/admin", admin::router())
        .route("/users/create", post(users::create_user))
        .route("/users/list", get(users::get_users))
        .route("/users/search", get(users::find_users))
        .route("/users/{id}", get(users::get_user_by_id))
        .route("/users/{id}", put(users::update_user))
        .route("/users/{id}", delete(users::delete_user))
        .route(
            "/users/{id}/memberships",
            get(clubs::memberships::get_user_memberships),
        )
        .route("/clubs", post(clubs::create_club))
        .route("/clubs/list", get(clubs::get_clubs))
        .route("/clubs/{id}", get(clubs::get_club_by_id))
        .route("/clubs/{id}", put(clubs::update_club))
        .route("/clubs/{id}", delete(clubs::delete_club))
        .route(
            "/subscriptions",
            get(clubs::subscriptions::get_subscriptions),
        )
        .route(
            "/clubs/{id}/subscription",
            post(clubs::subscriptions::subscribe_to_club)
                .delete(clubs::subscriptions::unsubscribe_from_club),
        )
        .route(
            "/clubs/{id}/subscription/preferences",
            put(clubs::subscriptions::update_subscription_preferences),
        )
        .route(
            "/clubs/{id}/subscribers/count",
            get(clubs::subscriptions::get_club_subscription_count),
        )
        .route(
            "/clubs/{id}/applications",
            post(clubs::applications::apply_to_club)
                .get(clubs::applications::get_club_applications),
        )
        .route(
            "/applications/mine",
            get(clubs::applications::get_my_applications),
        )
        .route(
            "/applications/{id}/approve",
            post(clubs::applications::approve_application),
        )
        .route(
            "/applications/{id}/reject",
            post(clubs::applications::reject_application),
        )
        .route(
            "/applications/{id}/withdraw",
            post(clubs::applications::withdraw_application),
        )
        .route("/memberships", post(clubs::memberships::create_membership))
        .route("/memberships", get(clubs::memberships::get_memberships))
        .route(
            "/memberships/{id}",
            get(clubs::memberships::get_membership_by_id),
        )
        .route(
            "/memberships/{id}",
            delete(clubs::memberships::delete_membership),
        )
        .with_state(app_state);

    Ok(app)
}

#[tokio::main]
async fn main() -> AppResult<()> {
    dotenv::dotenv().ok();
    dotenv::from_path("./api/.env").ok();

    let start = Instant::now();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let settings = Settings::load()?;
    let app = create_app(&settings).await?;

    let listener = TcpListener::bind(format!("0.0.0.0:{}", settings.server.port)).await?;
    info!("Listening on {}", listener.local_addr()?);

    // Create a shutdown signal handler
    let shutdown = async move {
        #[cfg(unix)]
        let terminate = async {
            match signal::unix::signal(signal::unix::SignalKind::terminate()) {
                Ok(mut sig) => {
                    sig.recv().await;
                }
                Err(e) => {
                    tracing::warn!("failed to install SIGTERM handler: {}", e);
                    std::future::pending::<()>().await;
                }
            }
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            _ = signal::ctrl_c() => {},
            _ = terminate => {},
        }
        let duration = start.elapsed();
        info!("Shutting down gracefully... in {:?}", duration);
    };

    // Start the server with graceful shutdown
    let server = serve(listener, app).with_graceful_shutdown(shutdown);

    if let Err(e) = server.await {
        tracing::error!("Server error: {}", e);
    }

    Ok(())
}
