use std::env;
use tracing::warn;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_address: String,
    pub bind_port: u16,
    pub jwt_secret: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let config = Self {
            bind_address: env::var("CARECONNECT_BIND_ADDRESS")
                .unwrap_or_else(|_| "0.0.0.0".to_string()),
            bind_port: env::var("CARECONNECT_BIND_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            jwt_secret: env::var("CARECONNECT_JWT_SECRET")
                .unwrap_or_else(|_| {
                    warn!("CARECONNECT_JWT_SECRET not set, using empty value");
                    String::new()
                }),
        };

        if !config.is_configured() {
            warn!("Application not fully configured - missing environment variables");
        }

        config
    }

    pub fn is_configured(&self) -> bool {
        !self.jwt_secret.is_empty()
    }
}
