use super::*;

impl App {
    /// Startup capture. A redirect URL (or its query string) given on the command
    /// line is handled the same way as one received by the listener.
    pub fn init(&mut self, callback: Option<&str>) {
        let Some(input) = callback else {
            return;
        };

        let saved = self.saved_config();
        if self.flow.capture_callback(input, saved).is_none() {
            self.report_error("Ignoring startup argument", "no authorization code found");
        }
    }

    /// Saves the config so it survives the redirect, starts listening for the
    /// callback and moves on to the exchange step.
    pub(super) fn start_authorization(&mut self) {
        let url = match self.flow.authorization_url() {
            Ok(url) => url,
            Err(e) => {
                self.flow.error_message = Some(e.to_string());
                self.report_error("Cannot build authorization URL", e);
                return;
            }
        };

        let saved = self.store.as_ref().map(|store| store.save(&self.flow.config));
        if let Some(Err(e)) = saved {
            self.report_error("Failed to save OAuth config", e);
        }

        if self.config.listens_locally() {
            self.start_callback_listener();
        }

        tracing::info!(
            shop = %self.flow.config.shop,
            "Authorization URL ready ({} chars)",
            url.len()
        );
        if let Err(e) = self.flow.next_step() {
            self.report_error("Cannot continue", e);
        }
    }

    fn start_callback_listener(&mut self) {
        self.stop_callback_listener();

        let cancel = CancellationToken::new();
        let port = self.config.shopify.redirect_port;
        self.callback_generation += 1;
        let generation = self.callback_generation;
        self.callback_cancel = Some(cancel.clone());
        self.listening_port = Some(port);

        self.spawn_app_task(async move {
            let result = match CallbackListener::bind(port).await {
                Ok(listener) => listener.wait(cancel).await,
                Err(e) => Err(e),
            };

            match result {
                Ok(params) => AppAsyncEvent::CallbackReceived {
                    generation,
                    params,
                    error: None,
                },
                Err(e) => AppAsyncEvent::CallbackReceived {
                    generation,
                    params: None,
                    error: Some(e.to_string()),
                },
            }
        });
    }

    pub fn stop_callback_listener(&mut self) {
        if let Some(cancel) = self.callback_cancel.take() {
            cancel.cancel();
        }
        self.listening_port = None;
    }

    pub(super) fn start_exchange(&mut self) {
        // A pasted redirect URL carries the code and shop; unpack it first.
        if self.flow.code.contains("code=") {
            let input = self.flow.code.clone();
            let saved = self.saved_config();
            self.flow.capture_callback(&input, saved);
        }

        let (config, code) = match self.flow.begin_exchange() {
            Ok(inputs) => inputs,
            Err(e) => {
                self.report_error("Cannot exchange code", e);
                return;
            }
        };

        let client = Arc::clone(&self.oauth_client);
        self.spawn_app_task(async move {
            let result = client.exchange_code_for_token(&config, &code).await;
            AppAsyncEvent::TokenExchanged { result }
        });
    }

    pub fn reset(&mut self) {
        self.stop_callback_listener();
        self.flow.reset();

        let cleared = self.store.as_ref().map(|store| store.clear());
        if let Some(Err(e)) = cleared {
            self.report_error("Failed to clear saved OAuth config", e);
        } else {
            self.clear_error();
        }
        tracing::info!("Wizard reset");
    }

    pub fn shutdown(&mut self) {
        self.stop_callback_listener();
    }

    pub fn process_async_events(&mut self) {
        let mut async_events = Vec::new();
        if let Some(ref mut rx) = self.app_async_rx {
            while let Ok(event) = rx.try_recv() {
                async_events.push(event);
            }
        }

        for event in async_events {
            match event {
                AppAsyncEvent::TokenExchanged { result } => {
                    match result {
                        Ok(_) => {
                            self.stop_callback_listener();
                            self.clear_error();
                        }
                        Err(ref e) => self.report_error("Token exchange failed", e),
                    }
                    self.flow.finish_exchange(result);
                }
                AppAsyncEvent::CallbackReceived {
                    generation,
                    params,
                    error,
                } => {
                    if generation != self.callback_generation {
                        tracing::debug!("Dropping event from replaced callback listener");
                        continue;
                    }
                    if let Some(err) = error {
                        self.callback_cancel = None;
                        self.listening_port = None;
                        self.report_error("OAuth redirect listener failed", err);
                        if self.flow.code.is_empty() {
                            self.flow.error_message = Some(
                                "Redirect listener unavailable. Paste the code or redirect URL."
                                    .to_string(),
                            );
                        }
                    } else if let Some(params) = params {
                        self.callback_cancel = None;
                        self.listening_port = None;
                        let saved = self.saved_config();
                        if self.flow.apply_callback(params, saved) {
                            self.clear_error();
                        }
                    }
                }
            }
        }
    }
}
