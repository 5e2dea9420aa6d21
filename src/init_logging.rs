//! Logging initialization for the binary

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

pub fn init_logging() {
    // Logs go to STDERR so they never mix with chat output.
    // Uses RUST_LOG env var for filtering, defaults to "warn" if not set
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_file(true)
        .with_line_number(true)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    // load dotenv file
    match dotenvy::dotenv() {
        Ok(path) => info!("Read dotenv file from: {}", path.display()),
        Err(dotenvy::Error::Io(io_error)) => {
            if matches!(io_error.kind(), std::io::ErrorKind::NotFound) {
                info!("Couldn't find a dotenv file");
            } else {
                warn!("Io error when reading dot env file: {io_error}");
            }
        }
        Err(err) => warn!("Error reading dotenv file: {err}"),
    }
}
