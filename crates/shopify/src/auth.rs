use crate::error::{OAuthError, OAuthResult};
use crate::types::{AccessToken, OAuthConfig, TokenResponse, SHOP_DOMAIN_SUFFIX};
use reqwest::Client;
use url::Url;

pub const DEFAULT_RELAY_URL: &str = "https://corsproxy.io/?";

/// Reduces whatever the user typed (`my-shop`, `https://my-shop.myshopify.com/admin`)
/// to the bare `<name>.myshopify.com` host.
pub fn normalize_shop_domain(input: &str) -> String {
    let trimmed = input.trim();
    let without_scheme = trimmed
        .strip_prefix("https://")
        .or_else(|| trimmed.strip_prefix("http://"))
        .unwrap_or(trimmed);
    let host = without_scheme
        .split(['/', '?', '#'])
        .next()
        .unwrap_or_default()
        .to_ascii_lowercase();

    if host.is_empty() || host.ends_with(SHOP_DOMAIN_SUFFIX) {
        host
    } else {
        format!("{host}{SHOP_DOMAIN_SUFFIX}")
    }
}

pub fn build_authorization_url(config: &OAuthConfig, redirect_uri: &str) -> OAuthResult<String> {
    let client_id = required(&config.client_id, "client_id")?;
    let shop = normalize_shop_domain(&config.shop);
    if shop.is_empty() {
        return Err(OAuthError::MissingField("shop"));
    }

    let scope = config.scopes_joined();
    let url = Url::parse_with_params(
        &format!("https://{shop}/admin/oauth/authorize"),
        &[
            ("client_id", client_id),
            ("scope", scope.as_str()),
            ("redirect_uri", redirect_uri),
        ],
    )?;
    Ok(url.to_string())
}

fn required<'a>(value: &'a str, field: &'static str) -> OAuthResult<&'a str> {
    let value = value.trim();
    if value.is_empty() {
        Err(OAuthError::MissingField(field))
    } else {
        Ok(value)
    }
}

/// How the token POST reaches the shop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExchangeRoute {
    Direct,
    /// Pass-through relay; the encoded target URL is appended to the prefix.
    Relay(String),
}

pub struct OAuthClient {
    client: Client,
    route: ExchangeRoute,
    endpoint_base: Option<String>,
}

impl OAuthClient {
    pub fn new(route: ExchangeRoute) -> Self {
        let client = Client::builder()
            .user_agent(concat!("shopify-token/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_else(|_| Client::new());
        Self {
            client,
            route,
            endpoint_base: None,
        }
    }

    /// Sends the token POST to `base` instead of `https://<shop>`.
    pub fn with_endpoint_base(mut self, base: impl Into<String>) -> Self {
        self.endpoint_base = Some(base.into());
        self
    }

    pub fn token_endpoint(&self, shop: &str) -> String {
        match self.endpoint_base {
            Some(ref base) => format!("{}/admin/oauth/access_token", base.trim_end_matches('/')),
            None => format!("https://{shop}/admin/oauth/access_token"),
        }
    }

    fn request_url(&self, shop: &str) -> String {
        let target = self.token_endpoint(shop);
        match self.route {
            ExchangeRoute::Direct => target,
            ExchangeRoute::Relay(ref prefix) => {
                let encoded: String = url::form_urlencoded::byte_serialize(target.as_bytes()).collect();
                format!("{prefix}{encoded}")
            }
        }
    }

    /// Single POST, no retries. The code is single-use on Shopify's side, so a
    /// failed attempt is surfaced to the user as-is.
    pub async fn exchange_code_for_token(
        &self,
        config: &OAuthConfig,
        code: &str,
    ) -> OAuthResult<AccessToken> {
        let client_id = required(&config.client_id, "client_id")?;
        let client_secret = required(&config.client_secret, "client_secret")?;
        let shop = normalize_shop_domain(&config.shop);
        if shop.is_empty() {
            return Err(OAuthError::MissingField("shop"));
        }
        let code = required(code, "code")?;

        tracing::info!(
            shop = %shop,
            relayed = matches!(self.route, ExchangeRoute::Relay(_)),
            "Exchanging authorization code"
        );

        let response = self
            .client
            .post(self.request_url(&shop))
            .json(&serde_json::json!({
                "client_id": client_id,
                "client_secret": client_secret,
                "code": code,
            }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(status = status.as_u16(), "Token exchange rejected");
            return Err(OAuthError::Http {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.text().await?;
        let data: TokenResponse =
            serde_json::from_str(&body).map_err(|_| OAuthError::MalformedResponse)?;

        match data.access_token {
            Some(token) if !token.is_empty() => {
                tracing::info!(shop = %shop, "Access token received");
                Ok(AccessToken {
                    token,
                    scope: data.scope,
                })
            }
            _ => Err(OAuthError::MalformedResponse),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn sample_config() -> OAuthConfig {
        OAuthConfig {
            client_id: "client-123".to_string(),
            client_secret: "secret-456".to_string(),
            shop: "foo".to_string(),
            scopes: vec!["read_orders".to_string(), "write_products".to_string()],
        }
    }

    #[test]
    fn normalize_appends_suffix_exactly_once() {
        assert_eq!(normalize_shop_domain("foo"), "foo.myshopify.com");
        assert_eq!(normalize_shop_domain("foo.myshopify.com"), "foo.myshopify.com");
        let once = normalize_shop_domain("foo");
        assert_eq!(normalize_shop_domain(&once), once);
    }

    #[test]
    fn normalize_strips_scheme_path_and_whitespace() {
        assert_eq!(
            normalize_shop_domain("  https://Foo.myshopify.com/admin/apps  "),
            "foo.myshopify.com"
        );
        assert_eq!(normalize_shop_domain("http://bar/"), "bar.myshopify.com");
        assert_eq!(normalize_shop_domain("   "), "");
    }

    #[test]
    fn authorization_url_requires_client_id_and_shop() {
        let mut config = sample_config();
        config.client_id.clear();
        assert!(matches!(
            build_authorization_url(&config, "http://localhost:3000"),
            Err(OAuthError::MissingField("client_id"))
        ));

        let mut config = sample_config();
        config.shop = " ".to_string();
        assert!(matches!(
            build_authorization_url(&config, "http://localhost:3000"),
            Err(OAuthError::MissingField("shop"))
        ));
    }

    #[test]
    fn authorization_url_round_trips_scopes_and_redirect() {
        let config = sample_config();
        let redirect = "http://localhost:3000/callback?x=1";
        let raw = build_authorization_url(&config, redirect).expect("url");
        let url = Url::parse(&raw).expect("parse");

        assert_eq!(url.scheme(), "https");
        assert_eq!(url.host_str(), Some("foo.myshopify.com"));
        assert_eq!(url.path(), "/admin/oauth/authorize");

        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        let get = |key: &str| {
            pairs
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.clone())
                .expect(key)
        };
        assert_eq!(get("client_id"), "client-123");
        assert_eq!(get("redirect_uri"), redirect);
        let scopes: Vec<String> = get("scope").split(',').map(str::to_string).collect();
        assert_eq!(scopes, config.scopes);
        assert!(!raw.contains("localhost:3000/callback"));
    }

    #[tokio::test]
    async fn exchange_maps_401_to_http_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/admin/oauth/access_token"))
            .respond_with(ResponseTemplate::new(401).set_body_string("invalid_client"))
            .mount(&server)
            .await;

        let client = OAuthClient::new(ExchangeRoute::Direct).with_endpoint_base(server.uri());
        let err = client
            .exchange_code_for_token(&sample_config(), "abc")
            .await
            .unwrap_err();

        match err {
            OAuthError::Http { status, body } => {
                assert_eq!(status, 401);
                assert_eq!(body, "invalid_client");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn exchange_without_access_token_is_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/admin/oauth/access_token"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({ "scope": "read_orders" })),
            )
            .mount(&server)
            .await;

        let client = OAuthClient::new(ExchangeRoute::Direct).with_endpoint_base(server.uri());
        let err = client
            .exchange_code_for_token(&sample_config(), "abc")
            .await
            .unwrap_err();
        assert!(matches!(err, OAuthError::MalformedResponse));
    }

    #[tokio::test]
    async fn exchange_with_non_json_body_is_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>login</html>"))
            .mount(&server)
            .await;

        let client = OAuthClient::new(ExchangeRoute::Direct).with_endpoint_base(server.uri());
        let err = client
            .exchange_code_for_token(&sample_config(), "abc")
            .await
            .unwrap_err();
        assert!(matches!(err, OAuthError::MalformedResponse));
    }

    #[tokio::test]
    async fn exchange_posts_credentials_and_returns_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/admin/oauth/access_token"))
            .and(body_json(serde_json::json!({
                "client_id": "client-123",
                "client_secret": "secret-456",
                "code": "abc",
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "shpat_test",
                "scope": "read_orders,write_products",
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = OAuthClient::new(ExchangeRoute::Direct).with_endpoint_base(server.uri());
        let token = client
            .exchange_code_for_token(&sample_config(), "abc")
            .await
            .expect("token");
        assert_eq!(token.token, "shpat_test");
        assert_eq!(token.scope.as_deref(), Some("read_orders,write_products"));
    }

    #[tokio::test]
    async fn relay_route_forwards_encoded_target() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/relay"))
            .and(query_param(
                "url",
                "https://foo.myshopify.com/admin/oauth/access_token",
            ))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "shpat_relayed",
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = OAuthClient::new(ExchangeRoute::Relay(format!("{}/relay?url=", server.uri())));
        let token = client
            .exchange_code_for_token(&sample_config(), "abc")
            .await
            .expect("token");
        assert_eq!(token.token, "shpat_relayed");
        assert_eq!(token.scope, None);
    }

    #[tokio::test]
    async fn exchange_with_empty_field_sends_nothing() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let client = OAuthClient::new(ExchangeRoute::Direct).with_endpoint_base(server.uri());
        let mut config = sample_config();
        config.client_secret.clear();

        let err = client.exchange_code_for_token(&config, "abc").await.unwrap_err();
        assert!(matches!(err, OAuthError::MissingField("client_secret")));

        let err = client
            .exchange_code_for_token(&sample_config(), "  ")
            .await
            .unwrap_err();
        assert!(matches!(err, OAuthError::MissingField("code")));
    }
}
