use crate::services::jolpica::{DEFAULT_SCHEDULE_URL, DEFAULT_USER_AGENT};

/// Application configuration, parsed from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    /// Upstream schedule feed URL.
    pub schedule_url: String,
    pub schedule_user_agent: String,
    /// Whether 502 responses include the underlying error message.
    pub expose_error_details: bool,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .expect("PORT must be a valid u16"),
            schedule_url: std::env::var("SCHEDULE_API_URL")
                .unwrap_or_else(|_| DEFAULT_SCHEDULE_URL.to_string()),
            schedule_user_agent: std::env::var("SCHEDULE_USER_AGENT")
                .unwrap_or_else(|_| DEFAULT_USER_AGENT.to_string()),
            expose_error_details: std::env::var("APP_ENV")
                .map(|env| env != "production")
                .unwrap_or(true),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        // set_var/remove_var race with other tests reading the environment;
        // no other test in this binary touches these variables.
        unsafe {
            std::env::remove_var("PORT");
            std::env::remove_var("SCHEDULE_API_URL");
            std::env::remove_var("SCHEDULE_USER_AGENT");
            std::env::set_var("APP_ENV", "production");
        }

        let config = AppConfig::from_env();

        assert_eq!(config.port, 3000);
        assert_eq!(config.schedule_url, DEFAULT_SCHEDULE_URL);
        assert_eq!(config.schedule_user_agent, "f1-monitor/1.0");
        assert!(!config.expose_error_details);

        unsafe {
            std::env::remove_var("APP_ENV");
        }
        assert!(AppConfig::from_env().expose_error_details);
    }
}
