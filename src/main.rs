use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::info;

use dealroom_server::bridge::events::room_activity_handler;
use dealroom_server::bridge::manager::BridgeManager;
use dealroom_server::bridge::matrix::{MatrixChatTransport, MatrixConfig};
use dealroom_server::config::AppConfig;
use dealroom_server::database::client::{Database, DbConfig};
use dealroom_server::init;
use dealroom_server::middleware::error::AppResult;
use dealroom_server::state::create_app_state;

#[tokio::main]
async fn main() -> AppResult<()> {
    let config = AppConfig::from_env();

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let _sentry_guard = config.sentry_project_link.as_ref().map(|link| {
        sentry::init((
            link.as_str(),
            sentry::ClientOptions {
                release: sentry::release_name!(),
                ..Default::default()
            },
        ))
    });

    let db = Database::connect(DbConfig {
        url: &config.db_url,
        database: &config.db_database,
        namespace: &config.db_namespace,
        username: config.db_username.as_deref(),
        password: config.db_password.as_deref(),
    })
    .await;
    db.run_migrations().await?;

    let (event_sender, event_receiver) = mpsc::channel(256);
    let transport = Arc::new(MatrixChatTransport::new(
        MatrixConfig {
            url: config.matrix_url.clone(),
            server_name: config.matrix_server_name.clone(),
            access_token: config.matrix_access_token.clone(),
            request_timeout: Duration::from_secs(config.matrix_request_timeout_secs),
        },
        event_sender,
    ));
    let bridge = Arc::new(BridgeManager::new(transport));
    bridge.startup().await;

    let ctx_state = create_app_state(db, bridge.clone());
    let _events_task = room_activity_handler(&ctx_state, event_receiver);

    let routes_all = init::main_router(&ctx_state);

    let addr = SocketAddr::from((Ipv4Addr::UNSPECIFIED, 8080));
    info!("->> LISTENING on {addr}");
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind listener");

    axum::serve(listener, routes_all.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("server error");

    bridge.shutdown().await;
    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}
