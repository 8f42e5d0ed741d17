//! Readiness endpoint

use axum::{extract::State, response::IntoResponse, routing::get, Router};
use axum_helpers::{run_health_checks, HealthCheckFuture};
use mongodb::Client;

/// `GET /ready`: 200 when MongoDB answers a ping, 503 otherwise
async fn ready(State(client): State<Client>) -> impl IntoResponse {
    let checks: Vec<(&str, HealthCheckFuture)> = vec![(
        "mongodb",
        Box::pin(async move {
            database::mongodb::check_health(&client)
                .await
                .map_err(|e| e.to_string())
        }),
    )];

    match run_health_checks(checks).await {
        Ok(ok) => ok,
        Err(unavailable) => unavailable,
    }
}

pub fn router(client: Client) -> Router {
    Router::new().route("/ready", get(ready)).with_state(client)
}
