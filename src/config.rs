use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub jwt_expiry_seconds: u64,
    pub host: String,
    pub port: u16,
    /// Public base URL of this API, used to build the voice-webhook URL
    /// handed to the telephony provider.
    pub app_base_url: String,
    // SignalWire (optional — reminder sends fail gracefully when unset)
    pub signalwire_project_id: Option<String>,
    pub signalwire_token: Option<String>,
    pub signalwire_space: Option<String>,
    pub signalwire_from_number: Option<String>,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite://zen_cable.db".into()),
            jwt_secret: required("JWT_SECRET")?,
            jwt_expiry_seconds: env::var("JWT_EXPIRY_SECONDS")
                .unwrap_or_else(|_| "900".into())
                .parse()?,
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".into())
                .parse()?,
            app_base_url: env::var("APP_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:8080".into()),
            signalwire_project_id: env::var("SIGNALWIRE_PROJECT_ID")
                .ok()
                .filter(|s| !s.is_empty()),
            signalwire_token: env::var("SIGNALWIRE_TOKEN").ok().filter(|s| !s.is_empty()),
            signalwire_space: env::var("SIGNALWIRE_SPACE").ok().filter(|s| !s.is_empty()),
            signalwire_from_number: env::var("SIGNALWIRE_FROM_NUMBER")
                .ok()
                .filter(|s| !s.is_empty()),
        })
    }

    /// True when every SignalWire credential is present.
    pub fn signalwire_configured(&self) -> bool {
        self.signalwire_project_id.is_some()
            && self.signalwire_token.is_some()
            && self.signalwire_space.is_some()
            && self.signalwire_from_number.is_some()
    }
}

fn required(key: &str) -> anyhow::Result<String> {
    env::var(key).map_err(|_| anyhow::anyhow!("Missing required env var: {}", key))
}
