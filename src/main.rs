use std::error::Error;

use ai_llm_service::telemetry;
use tracing::warn;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Load environment variables from .env file if present.
    let dotenv = dotenvy::dotenv();

    telemetry::init("info")?;

    if let Err(e) = dotenv {
        warn!(error = %e, "no .env loaded; using process environment");
    }

    api::start().await?;

    Ok(())
}
