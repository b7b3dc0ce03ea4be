use actix_web::cookie::Key;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use slot_signups::web;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args: Vec<String> = std::env::args().collect();
    let port = args
        .get(1)
        .and_then(|p| p.parse::<u16>().ok())
        .unwrap_or(8080);

    let password = match std::env::var("ADMIN_PASSWORD") {
        Ok(password) => password,
        Err(_) => {
            warn!("ADMIN_PASSWORD not set, using the default password");
            "admin123".to_string()
        }
    };

    let session_key = match std::env::var("SESSION_SECRET") {
        Ok(secret) if secret.len() >= 64 => Key::from(secret.as_bytes()),
        _ => {
            // A throwaway key stops verifying cookies after a restart, which
            // resets every device's signup tracking
            warn!("SESSION_SECRET not set or shorter than 64 bytes, generating a one-off key");
            let bytes: [u8; 64] = rand::random();
            Key::from(&bytes)
        }
    };

    info!("starting server at http://localhost:{}", port);
    web::start_server(port, password, session_key).await
}
