use super::*;

pub struct App {
    pub should_quit: bool,
    pub config: Config,
    pub flow: OAuthFlow,
    pub store: Option<ConfigStore>,
    pub oauth_client: Arc<OAuthClient>,
    pub layout: LayoutState,
    pub keybinds: Keybinds,
    pub show_help: bool,
    pub app_async_tx: Option<mpsc::UnboundedSender<AppAsyncEvent>>,
    pub app_async_rx: Option<mpsc::UnboundedReceiver<AppAsyncEvent>>,
    pub callback_cancel: Option<CancellationToken>,
    /// Bumped for every listener so events from a cancelled one can be told apart.
    pub callback_generation: u64,
    pub listening_port: Option<u16>,
    pub last_error: Option<String>,
    pub show_error_details: bool,
}

impl Default for App {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl App {
    pub fn new(config: Config) -> Self {
        let (app_async_tx, app_async_rx) = mpsc::unbounded_channel();
        let flow = OAuthFlow::with_config(config.oauth_config(), config.redirect_uri());
        let oauth_client = Arc::new(OAuthClient::new(config.exchange_route()));

        Self {
            should_quit: false,
            config,
            flow,
            store: None,
            oauth_client,
            layout: LayoutState::default(),
            keybinds: Keybinds,
            show_help: false,
            app_async_tx: Some(app_async_tx),
            app_async_rx: Some(app_async_rx),
            callback_cancel: None,
            callback_generation: 0,
            listening_port: None,
            last_error: None,
            show_error_details: false,
        }
    }

    pub fn with_store(mut self, store: ConfigStore) -> Self {
        self.store = Some(store);
        self
    }

    pub fn with_oauth_client(mut self, client: OAuthClient) -> Self {
        self.oauth_client = Arc::new(client);
        self
    }
}
