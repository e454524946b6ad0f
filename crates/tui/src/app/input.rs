use super::*;

impl App {
    pub fn handle_event(&mut self, event: Event) -> Result<bool> {
        match event {
            Event::Key(key) => self.handle_key_event(key),
            Event::Paste(text) => {
                self.handle_paste(&text);
                Ok(false)
            }
            _ => Ok(false),
        }
    }

    fn handle_key_event(&mut self, key: KeyEvent) -> Result<bool> {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        if key.code == KeyCode::Char('q') && ctrl {
            return Ok(true);
        }

        if key.code == KeyCode::F(1) || key.code == KeyCode::Char('h') && ctrl {
            self.show_help = !self.show_help;
            return Ok(false);
        }

        if self.show_help {
            if key.code == KeyCode::Esc {
                self.show_help = false;
            }
            return Ok(false);
        }

        if key.code == KeyCode::Char('e') && ctrl {
            self.show_error_details = !self.show_error_details;
            return Ok(false);
        }

        if self.show_error_details {
            if matches!(key.code, KeyCode::Esc | KeyCode::Enter) {
                self.show_error_details = false;
            }
            return Ok(false);
        }

        match self.flow.step {
            WizardStep::Configure => self.handle_configure_key(key),
            WizardStep::Authorize => match key.code {
                KeyCode::Enter => self.start_authorization(),
                KeyCode::Esc => self.flow.previous_step(),
                _ => {}
            },
            WizardStep::Exchange => match key.code {
                KeyCode::Enter => self.start_exchange(),
                KeyCode::Esc => {
                    if !self.flow.exchanging {
                        self.stop_callback_listener();
                    }
                    self.flow.previous_step();
                }
                KeyCode::Char('u') if ctrl => self.flow.code.clear(),
                KeyCode::Char(c) if !ctrl && !self.flow.exchanging => self.flow.code.push(c),
                KeyCode::Backspace if !self.flow.exchanging => {
                    self.flow.code.pop();
                }
                _ => {}
            },
            WizardStep::Complete => match key.code {
                KeyCode::Enter => self.reset(),
                KeyCode::Esc => self.should_quit = true,
                _ => {}
            },
        }

        Ok(false)
    }

    fn handle_configure_key(&mut self, key: KeyEvent) {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Enter => {
                if let Err(e) = self.flow.next_step() {
                    self.report_error("Cannot continue", e);
                } else {
                    self.clear_error();
                }
            }
            KeyCode::Esc => self.should_quit = true,
            KeyCode::Tab | KeyCode::Down => {
                self.flow.selected_field = self.flow.selected_field.next();
            }
            KeyCode::BackTab | KeyCode::Up => {
                self.flow.selected_field = self.flow.selected_field.previous();
            }
            KeyCode::Char('u') if ctrl => self.flow.current_field_value().clear(),
            KeyCode::Char('r') if ctrl => self.flow.restore_default_scopes(),
            KeyCode::Char(c) if !ctrl => self.flow.current_field_value().push(c),
            KeyCode::Backspace => {
                self.flow.current_field_value().pop();
            }
            _ => {}
        }
    }

    fn handle_paste(&mut self, text: &str) {
        let text = text.trim();
        match self.flow.step {
            WizardStep::Configure => self.flow.current_field_value().push_str(text),
            WizardStep::Exchange if !self.flow.exchanging => {
                self.flow.code.clear();
                self.flow.code.push_str(text);
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(app: &mut App, code: KeyCode) {
        app.handle_event(Event::Key(KeyEvent::new(code, KeyModifiers::NONE)))
            .expect("handle key");
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    #[test]
    fn typing_fills_the_selected_field() {
        let mut app = App::default();
        type_text(&mut app, "client-1");
        press(&mut app, KeyCode::Tab);
        type_text(&mut app, "s3cret");
        press(&mut app, KeyCode::Backspace);
        press(&mut app, KeyCode::Tab);
        type_text(&mut app, "foo");

        assert_eq!(app.flow.config.client_id, "client-1");
        assert_eq!(app.flow.config.client_secret, "s3cre");
        assert_eq!(app.flow.config.shop, "foo");
        assert_eq!(app.flow.selected_field, Field::Shop);
    }

    #[test]
    fn enter_without_required_fields_stays_on_configure() {
        let mut app = App::default();
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.flow.step, WizardStep::Configure);
        assert!(app.last_error.is_some());
    }

    #[tokio::test]
    async fn authorize_step_saves_config_and_moves_to_exchange() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = ConfigStore::at(dir.path().join("shopify_oauth_config.json"));
        let mut config = Config::default();
        config.shopify.redirect_uri = Some("https://auth.example.com/".to_string());
        let mut app = App::new(config).with_store(store);

        type_text(&mut app, "client-1");
        press(&mut app, KeyCode::Tab);
        type_text(&mut app, "secret");
        press(&mut app, KeyCode::Tab);
        type_text(&mut app, "foo");
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.flow.step, WizardStep::Authorize);

        press(&mut app, KeyCode::Enter);
        assert_eq!(app.flow.step, WizardStep::Exchange);
        assert!(app.callback_cancel.is_none());

        let saved = app
            .store
            .as_ref()
            .expect("store")
            .load()
            .expect("load")
            .expect("config saved");
        assert_eq!(saved.client_id, "client-1");
        assert_eq!(saved.shop, "foo.myshopify.com");
    }

    #[test]
    fn pasted_redirect_replaces_the_code_field() {
        let mut app = App::default();
        app.flow.step = WizardStep::Exchange;
        type_text(&mut app, "junk");
        app.handle_event(Event::Paste("  http://localhost:3000/?code=abc&shop=foo ".to_string()))
            .expect("paste");
        assert_eq!(app.flow.code, "http://localhost:3000/?code=abc&shop=foo");
    }

    #[test]
    fn complete_step_enter_resets() {
        let mut app = App::default();
        app.flow.step = WizardStep::Complete;
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.flow.step, WizardStep::Configure);
        press(&mut app, KeyCode::Esc);
        assert!(app.should_quit);
    }
}
