use anyhow::Context;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub mongodb_uri: String,
    pub database: String,
    pub collection: String,
    /// Upper bound on a buffered request body, in bytes.
    pub max_body_bytes: usize,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup. Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let var = |key: &str, default: &str| {
            lookup(key)
                .filter(|value| !value.trim().is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        Ok(Self {
            host: var("HOST", "0.0.0.0"),
            port: var("PORT", "8080")
                .trim()
                .parse()
                .context("PORT must be a valid number")?,
            mongodb_uri: var("MONGODB_URI", "mongodb://localhost:27017"),
            database: var("MONGODB_DATABASE", "chocolateshop"),
            collection: var("MONGODB_COLLECTION", "inventory"),
            max_body_bytes: var("MAX_BODY_BYTES", "1048576")
                .trim()
                .parse()
                .context("MAX_BODY_BYTES must be a valid number of bytes")?,
        })
    }
}
