/// Runtime configuration, read once at cold start.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub table_name: String,
    pub bucket_name: String,
    pub region: String,
    /// CDN base in front of the bucket, if any.
    pub public_asset_base_url: Option<String>,
    /// `*` or an explicit list of origins.
    pub cors_allowed_origins: Vec<String>,
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let bucket_name = var("S3_BUCKET_NAME").ok_or(ConfigError::Missing("S3_BUCKET_NAME"))?;

        let mut cors_allowed_origins: Vec<String> = var("CORS_ALLOWED_ORIGINS")
            .unwrap_or_else(|| "*".to_string())
            .split(',')
            .map(|o| o.trim().trim_end_matches('/').to_string())
            .filter(|o| !o.is_empty())
            .collect();
        if cors_allowed_origins.is_empty() {
            cors_allowed_origins.push("*".to_string());
        }

        Ok(Config {
            table_name: var("TABLE_NAME").unwrap_or_else(|| "courses".to_string()),
            bucket_name,
            region: var("AWS_REGION").unwrap_or_else(|| "us-east-1".to_string()),
            public_asset_base_url: var("PUBLIC_ASSET_BASE_URL"),
            cors_allowed_origins,
        })
    }
}
