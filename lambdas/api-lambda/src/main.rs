use coursedesk_shared::{AppState, Config};
use lambda_http::{run, service_fn, tracing, Error, Request};
use std::sync::Arc;

mod http_handler;
use http_handler::function_handler;

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing::init_default_subscriber();

    let config = Config::from_env()?;

    // STORE_BACKEND=memory runs against process-local stores, for local testing.
    if std::env::var("STORE_BACKEND").is_ok_and(|b| b == "memory") {
        tracing::warn!("Running with in-memory stores; data is lost on restart");
        let state = Arc::new(AppState::in_memory(config));
        return run(service_fn(move |event: Request| function_handler(event, state.clone()))).await;
    }

    let state = Arc::new(AppState::from_aws(config).await);
    run(service_fn(move |event: Request| function_handler(event, state.clone()))).await
}
