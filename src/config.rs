use anyhow::{Context, Result};

#[derive(Debug, Clone)]
pub struct Config {
    // Server
    pub port: u16,

    // Document store
    pub database_path: String,

    // Admin auth
    pub admin_token: String,

    // Object storage
    pub storage_url: String,
    pub storage_public_url: String,
    pub storage_token: Option<String>,

    // Mail relay
    pub mail_api_url: String,
    pub mail_api_token: String,
    pub mail_from: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let storage_url = std::env::var("STORAGE_URL").context("STORAGE_URL not set")?;

        Ok(Self {
            // Server
            port: std::env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3001),

            // Document store
            database_path: std::env::var("DATABASE_PATH")
                .unwrap_or_else(|_| "visualizer.db".to_string()),

            // Admin auth
            admin_token: std::env::var("ADMIN_TOKEN").context("ADMIN_TOKEN not set")?,

            // Object storage - public URL defaults to the upload endpoint
            storage_public_url: std::env::var("STORAGE_PUBLIC_URL")
                .unwrap_or_else(|_| storage_url.clone()),
            storage_token: std::env::var("STORAGE_TOKEN").ok(),
            storage_url,

            // Mail relay
            mail_api_url: std::env::var("MAIL_API_URL").context("MAIL_API_URL not set")?,
            mail_api_token: std::env::var("MAIL_API_TOKEN").context("MAIL_API_TOKEN not set")?,
            mail_from: std::env::var("MAIL_FROM")
                .unwrap_or_else(|_| "\"Visualiser\" <visualiser@fasiding.com.ua>".to_string()),
        })
    }
}
