use std::env;
use tracing::warn;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub portal_api_url: String,
    pub portal_api_key: String,
    pub doctor_display_name: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let config = Self {
            portal_api_url: env::var("PORTAL_API_URL")
                .unwrap_or_else(|_| {
                    warn!("PORTAL_API_URL not set, using empty value");
                    String::new()
                }),
            portal_api_key: env::var("PORTAL_API_KEY")
                .unwrap_or_else(|_| {
                    warn!("PORTAL_API_KEY not set, using empty value");
                    String::new()
                }),
            doctor_display_name: env::var("DOCTOR_DISPLAY_NAME")
                .unwrap_or_else(|_| {
                    warn!("DOCTOR_DISPLAY_NAME not set, using empty value");
                    String::new()
                }),
        };

        if !config.is_configured() {
            warn!("Application not fully configured - missing environment variables");
        }

        config
    }

    pub fn is_configured(&self) -> bool {
        !self.portal_api_url.is_empty()
            && !self.portal_api_key.is_empty()
            && !self.doctor_display_name.is_empty()
    }
}
