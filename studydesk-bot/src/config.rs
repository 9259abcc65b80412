//! Bot configuration

/// Runtime configuration, read from the environment
#[derive(Debug, Clone)]
pub struct Config {
    /// Channel user id of the administrator
    pub admin_id: u64,

    /// Payment address shown to users in upgrade prompts
    pub payment_address: String,

    /// Path to the SQLite database file
    pub db_path: String,

    /// Address the status HTTP server listens on
    pub http_addr: String,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            admin_id: std::env::var("STUDYDESK_ADMIN_ID")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(0),
            payment_address: std::env::var("STUDYDESK_PAYMENT_ADDRESS")
                .unwrap_or_else(|_| "studydesk@upi".to_string()),
            db_path: std::env::var("STUDYDESK_DB").unwrap_or_else(|_| "studydesk.db".to_string()),
            http_addr: std::env::var("STUDYDESK_HTTP_ADDR")
                .unwrap_or_else(|_| "0.0.0.0:3000".to_string()),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            admin_id: 0,
            payment_address: "studydesk@upi".to_string(),
            db_path: "studydesk.db".to_string(),
            http_addr: "0.0.0.0:3000".to_string(),
        }
    }
}
