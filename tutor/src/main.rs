//! Language tutor terminal front end.
//!
//! Reads one command per line from stdin and prints results. State is
//! loaded before every command and saved right after every change.
//!
//! ```bash
//! TUTOR_DATA_DIR=./my-data cargo run -p tutor
//! ```

mod headless;

use tutor_core::TutorConfig;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .init();

    let args: Vec<String> = std::env::args().collect();
    if args.iter().any(|a| a == "--help" || a == "-h") {
        headless::print_help();
        return Ok(());
    }

    let config = TutorConfig::from_env();
    headless::run_headless(config).await?;
    Ok(())
}
