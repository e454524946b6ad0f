use serde::{Deserialize, Serialize};
use shopify_token_oauth::auth::{ExchangeRoute, DEFAULT_RELAY_URL};
use shopify_token_oauth::types::default_scopes;
use shopify_token_oauth::OAuthConfig;
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub shopify: ShopifyConfig,
    pub exchange: ExchangeConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ShopifyConfig {
    pub client_id: String,
    pub client_secret: String,
    pub shop: String,
    pub scopes: Vec<String>,
    pub redirect_port: u16,
    /// Overrides the redirect URI sent to Shopify. Defaults to `http://localhost:<redirect_port>`.
    pub redirect_uri: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExchangeConfig {
    pub use_relay: bool,
    pub relay_url: String,
}

impl Default for ShopifyConfig {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: String::new(),
            shop: String::new(),
            scopes: default_scopes(),
            redirect_port: 3000,
            redirect_uri: None,
        }
    }
}

impl Default for ExchangeConfig {
    fn default() -> Self {
        Self {
            use_relay: false,
            relay_url: DEFAULT_RELAY_URL.to_string(),
        }
    }
}

impl Config {
    pub fn load(path: &PathBuf) -> Result<Self, Box<dyn std::error::Error>> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn load_or_default(path: &PathBuf) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                if path.exists() {
                    tracing::warn!("Ignoring unreadable config {}: {}", path.display(), e);
                }
                Self::default()
            }
        }
    }

    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        if let Some(client_id) = non_empty("SHOPIFY_CLIENT_ID") {
            self.shopify.client_id = client_id;
        }
        if let Some(client_secret) = non_empty("SHOPIFY_CLIENT_SECRET") {
            self.shopify.client_secret = client_secret;
        }
        if let Some(shop) = non_empty("SHOPIFY_SHOP") {
            self.shopify.shop = shop;
        }
    }

    pub fn redirect_uri(&self) -> String {
        self.shopify
            .redirect_uri
            .clone()
            .filter(|uri| !uri.trim().is_empty())
            .unwrap_or_else(|| format!("http://localhost:{}", self.shopify.redirect_port))
    }

    /// The callback listener only helps when Shopify redirects back to this machine.
    pub fn listens_locally(&self) -> bool {
        let uri = self.redirect_uri();
        uri.starts_with("http://localhost") || uri.starts_with("http://127.0.0.1")
    }

    pub fn oauth_config(&self) -> OAuthConfig {
        let mut config = OAuthConfig {
            client_id: self.shopify.client_id.clone(),
            client_secret: self.shopify.client_secret.clone(),
            shop: self.shopify.shop.clone(),
            scopes: Vec::new(),
        };
        config.set_scopes(self.shopify.scopes.iter().cloned());
        if config.scopes.is_empty() {
            config.scopes = default_scopes();
        }
        config
    }

    pub fn exchange_route(&self) -> ExchangeRoute {
        if self.exchange.use_relay {
            ExchangeRoute::Relay(self.exchange.relay_url.clone())
        } else {
            ExchangeRoute::Direct
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_falls_back_to_defaults() {
        let config: Config = toml::from_str(
            r#"
            [shopify]
            client_id = "abc"
            scopes = ["read_orders", "read_orders", "write_orders"]

            [exchange]
            use_relay = true
            "#,
        )
        .expect("parse");

        assert_eq!(config.shopify.client_id, "abc");
        assert_eq!(config.shopify.redirect_port, 3000);
        assert_eq!(config.redirect_uri(), "http://localhost:3000");
        assert_eq!(config.oauth_config().scopes, vec!["read_orders", "write_orders"]);
        assert_eq!(
            config.exchange_route(),
            ExchangeRoute::Relay(DEFAULT_RELAY_URL.to_string())
        );
    }

    #[test]
    fn explicit_redirect_uri_wins() {
        let mut config = Config::default();
        config.shopify.redirect_uri = Some("https://auth.example.com/callback".to_string());
        assert_eq!(config.redirect_uri(), "https://auth.example.com/callback");
        assert!(!config.listens_locally());
        assert!(Config::default().listens_locally());
        assert_eq!(config.exchange_route(), ExchangeRoute::Direct);
    }

    #[test]
    fn env_overrides_replace_only_non_empty_values() {
        let mut config = Config::default();
        config.shopify.shop = "from-file".to_string();
        config.apply_overrides(|key| match key {
            "SHOPIFY_CLIENT_ID" => Some("env-id".to_string()),
            "SHOPIFY_SHOP" => Some("  ".to_string()),
            _ => None,
        });

        assert_eq!(config.shopify.client_id, "env-id");
        assert_eq!(config.shopify.shop, "from-file");
        assert!(config.shopify.client_secret.is_empty());
    }

    #[test]
    fn missing_file_loads_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = Config::load_or_default(&dir.path().join("config.toml"));
        assert_eq!(config.oauth_config(), OAuthConfig::default());
    }
}
