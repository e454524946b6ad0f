use shopify_token_oauth::{AccessToken, CallbackParams, OAuthResult};

pub enum AppAsyncEvent {
    TokenExchanged {
        result: OAuthResult<AccessToken>,
    },
    CallbackReceived {
        generation: u64,
        params: Option<CallbackParams>,
        error: Option<String>,
    },
}
