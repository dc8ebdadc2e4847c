//! AWS Lambda entry point for the stock monitor
//!
//! Deploy with `cargo lambda build --release --features lambda`
//! and trigger on a schedule (EventBridge).

use lambda_runtime::{Error as LambdaError, service_fn};

use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), LambdaError> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    info!("Stock monitor Lambda starting...");
    lambda_runtime::run(service_fn(stock_monitor::lambda::handler)).await
}
