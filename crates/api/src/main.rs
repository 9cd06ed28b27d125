use coursedesk_api::app::{AppConfig, build_app};

#[tokio::main]
async fn main() {
    let config = AppConfig::from_env();
    coursedesk_observability::init(config.development);

    if config.jwt_secret == AppConfig::DEV_SECRET {
        tracing::warn!("JWT_SECRET not set; using insecure dev default");
    }

    let app = build_app(config);

    let listener = tokio::net::TcpListener::bind("0.0.0.0:8080")
        .await
        .expect("failed to bind 0.0.0.0:8080");

    tracing::info!("listening on {}", listener.local_addr().unwrap());

    axum::serve(listener, app).await.unwrap();
}
