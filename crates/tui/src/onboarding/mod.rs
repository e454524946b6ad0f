mod credentials;

pub use credentials::Field;

use shopify_token_oauth::auth::{build_authorization_url, normalize_shop_domain};
use shopify_token_oauth::callback::parse_callback;
use shopify_token_oauth::types::{default_scopes, scopes_from_str};
use shopify_token_oauth::{AccessToken, CallbackParams, OAuthConfig, OAuthError, OAuthResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardStep {
    Configure,
    Authorize,
    Exchange,
    Complete,
}

impl WizardStep {
    pub const ALL: [WizardStep; 4] = [
        WizardStep::Configure,
        WizardStep::Authorize,
        WizardStep::Exchange,
        WizardStep::Complete,
    ];

    pub fn number(self) -> usize {
        match self {
            WizardStep::Configure => 1,
            WizardStep::Authorize => 2,
            WizardStep::Exchange => 3,
            WizardStep::Complete => 4,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            WizardStep::Configure => "Configure",
            WizardStep::Authorize => "Authorize",
            WizardStep::Exchange => "Exchange",
            WizardStep::Complete => "Complete",
        }
    }
}

/// Wizard state for one OAuth run. Everything here lives in memory only;
/// persistence across the redirect is the caller's job.
pub struct OAuthFlow {
    pub step: WizardStep,
    pub config: OAuthConfig,
    pub scopes_input: String,
    pub selected_field: Field,
    pub redirect_uri: String,
    pub auth_url: Option<String>,
    pub code: String,
    pub access_token: Option<AccessToken>,
    pub error_message: Option<String>,
    pub exchanging: bool,
}

impl OAuthFlow {
    pub fn new(redirect_uri: impl Into<String>) -> Self {
        Self::with_config(OAuthConfig::default(), redirect_uri)
    }

    pub fn with_config(config: OAuthConfig, redirect_uri: impl Into<String>) -> Self {
        let scopes_input = config.scopes_joined();
        Self {
            step: WizardStep::Configure,
            config,
            scopes_input,
            selected_field: Field::default(),
            redirect_uri: redirect_uri.into(),
            auth_url: None,
            code: String::new(),
            access_token: None,
            error_message: None,
            exchanging: false,
        }
    }

    pub fn field_value(&self, field: Field) -> &str {
        match field {
            Field::ClientId => &self.config.client_id,
            Field::ClientSecret => &self.config.client_secret,
            Field::Shop => &self.config.shop,
            Field::Scopes => &self.scopes_input,
        }
    }

    pub fn current_field_value(&mut self) -> &mut String {
        match self.selected_field {
            Field::ClientId => &mut self.config.client_id,
            Field::ClientSecret => &mut self.config.client_secret,
            Field::Shop => &mut self.config.shop,
            Field::Scopes => &mut self.scopes_input,
        }
    }

    pub fn restore_default_scopes(&mut self) {
        self.config.scopes = default_scopes();
        self.scopes_input = self.config.scopes_joined();
    }

    pub fn can_continue(&self) -> bool {
        !self.config.client_id.trim().is_empty() && !self.config.shop.trim().is_empty()
    }

    /// Builds the authorization URL from the current config and caches it for display.
    pub fn authorization_url(&mut self) -> OAuthResult<String> {
        let url = build_authorization_url(&self.config, &self.redirect_uri)?;
        self.auth_url = Some(url.clone());
        Ok(url)
    }

    /// Forward transitions for steps 1 to 3. Complete is only reachable through
    /// a successful exchange.
    pub fn next_step(&mut self) -> OAuthResult<()> {
        match self.step {
            WizardStep::Configure => {
                self.commit_form();
                if let Err(e) = self.authorization_url() {
                    self.error_message = Some(e.to_string());
                    return Err(e);
                }
                self.error_message = None;
                self.step = WizardStep::Authorize;
            }
            WizardStep::Authorize => {
                self.error_message = None;
                self.step = WizardStep::Exchange;
            }
            WizardStep::Exchange | WizardStep::Complete => {}
        }
        Ok(())
    }

    pub fn previous_step(&mut self) {
        if self.exchanging {
            return;
        }
        self.step = match self.step {
            WizardStep::Configure => WizardStep::Configure,
            WizardStep::Authorize => WizardStep::Configure,
            WizardStep::Exchange => WizardStep::Authorize,
            WizardStep::Complete => WizardStep::Complete,
        };
        self.error_message = None;
    }

    fn commit_form(&mut self) {
        self.config.scopes = scopes_from_str(&self.scopes_input);
        self.scopes_input = self.config.scopes_joined();
        self.config.client_id = self.config.client_id.trim().to_string();
        self.config.client_secret = self.config.client_secret.trim().to_string();
        self.config.shop = normalize_shop_domain(&self.config.shop);
    }

    /// Reads `code` and `shop` from a redirect query. When a code is present the
    /// saved config is restored, the query's shop wins over it, and the wizard
    /// jumps to the exchange step. Returns `None` if nothing was captured.
    pub fn capture_callback(
        &mut self,
        query: &str,
        saved: Option<OAuthConfig>,
    ) -> Option<CallbackParams> {
        let params = parse_callback(query)?;
        self.apply_callback(params.clone(), saved).then_some(params)
    }

    /// Returns `false` when the redirect was ignored because an exchange is
    /// running or already finished.
    pub fn apply_callback(&mut self, params: CallbackParams, saved: Option<OAuthConfig>) -> bool {
        if self.exchanging || self.step == WizardStep::Complete {
            tracing::warn!("Ignoring OAuth redirect while {:?}", self.step);
            return false;
        }

        if let Some(config) = saved {
            self.config = config;
        }
        if let Some(ref shop) = params.shop {
            self.config.shop = normalize_shop_domain(shop);
        }
        self.scopes_input = self.config.scopes_joined();
        self.code = params.code;
        self.error_message = None;
        if let Err(e) = self.authorization_url() {
            tracing::debug!("Authorization URL unavailable after redirect: {}", e);
            self.auth_url = None;
        }
        self.step = WizardStep::Exchange;
        tracing::info!(shop = %self.config.shop, "Authorization code captured");
        true
    }

    /// Validates and locks the wizard for a token exchange. Returns the inputs
    /// the caller needs to run the request.
    pub fn begin_exchange(&mut self) -> OAuthResult<(OAuthConfig, String)> {
        if self.exchanging {
            return Err(OAuthError::ExchangeInProgress);
        }

        let code = self.code.trim().to_string();
        let missing = [
            ("client_id", self.config.client_id.trim()),
            ("client_secret", self.config.client_secret.trim()),
            ("shop", self.config.shop.trim()),
            ("code", code.as_str()),
        ]
        .into_iter()
        .find(|(_, value)| value.is_empty())
        .map(|(name, _)| name);

        if let Some(field) = missing {
            let err = OAuthError::MissingField(field);
            self.error_message = Some(err.to_string());
            return Err(err);
        }

        self.exchanging = true;
        self.error_message = None;
        Ok((self.config.clone(), code))
    }

    /// Applies the exchange outcome. Failures keep the wizard on the exchange
    /// step so the user can fix the input and retry.
    pub fn finish_exchange(&mut self, result: OAuthResult<AccessToken>) {
        self.exchanging = false;
        match result {
            Ok(token) => {
                self.access_token = Some(token);
                self.error_message = None;
                self.step = WizardStep::Complete;
            }
            Err(e) => {
                self.error_message = Some(format!("{} ({})", e.user_message(), e));
            }
        }
    }

    pub fn reset(&mut self) {
        let redirect_uri = std::mem::take(&mut self.redirect_uri);
        *self = Self::new(redirect_uri);
    }
}
