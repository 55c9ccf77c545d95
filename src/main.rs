use dreamnest_backend::app::App;
use dreamnest_backend::util::logger::Logger;
use dotenv::dotenv;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() {
    // .env first so LOG_DIR and RUST_LOG apply to the logger
    let dotenv_result = dotenv();

    let _logger = match Logger::new() {
        Ok(logger) => logger,
        Err(e) => {
            eprintln!("Failed to initialize logging: {e}");
            std::process::exit(1);
        }
    };

    match dotenv_result {
        Ok(path) => info!("Loaded environment from {}", path.display()),
        Err(e) => warn!("No .env file loaded ({e}), using system env vars"),
    }

    info!("Starting DreamNest backend");
    let app = match App::new().await {
        Ok(app) => app,
        Err(e) => {
            error!("Startup failed: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = app.start().await {
        error!("Server error: {e}");
        std::process::exit(1);
    }
}
