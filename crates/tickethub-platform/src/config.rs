use anyhow::Result;

#[derive(Clone, Debug)]
pub struct ServiceConfig {
    pub http_addr: String,
    pub audit_log_path: String,
}

impl ServiceConfig {
    pub fn from_env(default_http_addr: &str) -> Result<Self> {
        let http_addr =
            std::env::var("HTTP_ADDR").unwrap_or_else(|_| default_http_addr.to_string());
        let audit_log_path = std::env::var("AUDIT_LOG_PATH")
            .unwrap_or_else(|_| "logs/events.log.json".to_string());

        Ok(Self {
            http_addr,
            audit_log_path,
        })
    }
}
