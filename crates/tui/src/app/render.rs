use super::*;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

impl App {
    pub fn render(&mut self, frame: &mut Frame) {
        let area = frame.area();

        if self.show_help {
            self.render_help(frame, area);
            return;
        }

        self.layout.calculate_layout(area);

        let panels = self.layout.get_panels().to_vec();

        for panel in panels {
            match panel.panel_type {
                PanelType::Progress => self.render_progress(frame, panel.rect),
                PanelType::Wizard => self.render_wizard(frame, panel.rect),
                PanelType::StatusBar => self.render_status_bar(frame, panel.rect),
            }
        }

        if self.show_error_details {
            self.render_error_details(frame, area);
        }
    }

    fn render_progress(&self, frame: &mut Frame, area: Rect) {
        use ratatui::widgets::{Block, Borders, Paragraph};

        let current = self.flow.step.number();
        let mut spans = Vec::new();
        for (idx, step) in WizardStep::ALL.iter().enumerate() {
            if idx > 0 {
                let style = if step.number() <= current {
                    Style::default().fg(Color::Green)
                } else {
                    Style::default().fg(Color::DarkGray)
                };
                spans.push(Span::styled(" ── ", style));
            }
            let style = if step.number() == current {
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::Green)
                    .add_modifier(Modifier::BOLD)
            } else if step.number() < current {
                Style::default().fg(Color::Green)
            } else {
                Style::default().fg(Color::DarkGray)
            };
            spans.push(Span::styled(
                format!(" {} {} ", step.number(), step.title()),
                style,
            ));
        }

        let paragraph = Paragraph::new(Line::from(spans))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(" Shopify OAuth Token Generator "),
            )
            .centered();
        frame.render_widget(paragraph, area);
    }

    fn render_wizard(&self, frame: &mut Frame, area: Rect) {
        use ratatui::widgets::{Block, Borders, Paragraph, Wrap};

        let flow = &self.flow;
        let lines: Vec<Line> = match flow.step {
            WizardStep::Configure => {
                let mut lines = vec![
                    Line::from(""),
                    Line::from("  Enter your Shopify app credentials:"),
                    Line::from(""),
                ];
                for field in Field::ALL {
                    let value = flow.field_value(field);
                    let display = if value.is_empty() {
                        "[not set]".to_string()
                    } else if field.is_secret() {
                        "*".repeat(value.chars().count().min(24))
                    } else if field == Field::Scopes {
                        format!("{} scopes", flow.scopes_input.split(',').filter(|s| !s.trim().is_empty()).count())
                    } else {
                        value.to_string()
                    };
                    let selected = field == flow.selected_field;
                    let marker = if selected { "›" } else { " " };
                    let style = if selected {
                        Style::default().add_modifier(Modifier::BOLD)
                    } else {
                        Style::default()
                    };
                    lines.push(Line::styled(
                        format!("  {marker} {:<14} {display}", format!("{}:", field.label())),
                        style,
                    ));
                }
                if flow.selected_field == Field::Scopes {
                    lines.push(Line::from(""));
                    lines.push(Line::from(format!("  {}", flow.scopes_input)));
                }
                lines
            }
            WizardStep::Authorize => {
                let url = flow.auth_url.as_deref().unwrap_or("[unavailable]");
                let mut lines = vec![
                    Line::from(""),
                    Line::from("  Open this URL in a browser and approve the app:"),
                    Line::from(""),
                    Line::styled(format!("  {url}"), Style::default().fg(Color::Cyan)),
                    Line::from(""),
                    Line::from(format!("  Redirect URI: {}", flow.redirect_uri)),
                ];
                if !self.config.listens_locally() {
                    lines.push(Line::from(
                        "  The redirect goes elsewhere; copy the code from it by hand.",
                    ));
                }
                lines
            }
            WizardStep::Exchange => {
                let mut lines = vec![Line::from("")];
                if let Some(port) = self.listening_port {
                    lines.push(Line::from(format!(
                        "  Waiting for the redirect on http://localhost:{port} ..."
                    )));
                    lines.push(Line::from(""));
                }
                let code = if flow.code.is_empty() {
                    "[paste the code or the full redirect URL]"
                } else {
                    flow.code.as_str()
                };
                lines.push(Line::from(format!("  Shop: {}", flow.config.shop)));
                lines.push(Line::from(format!("  Code: {code}")));
                lines.push(Line::from(""));
                if flow.exchanging {
                    lines.push(Line::styled(
                        "  Exchanging code for a token...",
                        Style::default().fg(Color::Yellow),
                    ));
                }
                lines
            }
            WizardStep::Complete => {
                let token = flow
                    .access_token
                    .as_ref()
                    .map(|t| t.token.as_str())
                    .unwrap_or_default();
                let mut lines = vec![
                    Line::from(""),
                    Line::from("  Access token generated:"),
                    Line::from(""),
                    Line::styled(
                        format!("  {token}"),
                        Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
                    ),
                ];
                if let Some(scope) = flow.access_token.as_ref().and_then(|t| t.scope.as_deref()) {
                    lines.push(Line::from(""));
                    lines.push(Line::from(format!("  Granted scopes: {scope}")));
                }
                lines.push(Line::from(""));
                lines.push(Line::styled(
                    "  Keep this token secret. It is printed again when you quit.",
                    Style::default().fg(Color::Yellow),
                ));
                lines
            }
        };

        let paragraph = Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(format!(" Step {} - {} ", flow.step.number(), flow.step.title())),
            );
        frame.render_widget(paragraph, area);
    }

    fn render_status_bar(&self, frame: &mut Frame, area: Rect) {
        use ratatui::widgets::{Block, Borders, Paragraph};

        let (text, style) = if let Some(ref message) = self.flow.error_message {
            (format!("{message}  [Ctrl+E] details"), Style::default().fg(Color::Red))
        } else {
            let hint = match self.flow.step {
                WizardStep::Configure if self.flow.can_continue() => {
                    "[Tab] next field  [Enter] continue  [Esc] quit  [F1] help"
                }
                WizardStep::Configure => "Client ID and Shop are required  [Tab] next field  [F1] help",
                WizardStep::Authorize => "[Enter] I opened the URL  [Esc] back",
                WizardStep::Exchange => "[Enter] get token  [Ctrl+U] clear  [Esc] back",
                WizardStep::Complete => "[Enter] new token  [Esc] quit",
            };
            (hint.to_string(), Style::default().fg(Color::DarkGray))
        };

        frame.render_widget(
            Paragraph::new(Line::styled(text, style)).block(Block::default().borders(Borders::ALL)),
            area,
        );
    }

    fn render_help(&self, frame: &mut Frame, area: Rect) {
        use ratatui::widgets::{Block, Borders, Clear, Paragraph};
        let help_text = self.keybinds.help_text();
        let popup_area = self.centered_rect(60, 70, area);

        frame.render_widget(Clear, popup_area);
        frame.render_widget(
            Paragraph::new(help_text).block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(" Help - Press Esc to close "),
            ),
            popup_area,
        );
    }

    fn render_error_details(&self, frame: &mut Frame, area: Rect) {
        use ratatui::widgets::{Block, Borders, Clear, Paragraph};

        let popup_area = self.centered_rect(60, 30, area);
        let details = self
            .last_error
            .as_deref()
            .unwrap_or("No error details available.");
        let content_width = popup_area.width.saturating_sub(2) as usize;
        let content_lines = popup_area.height.saturating_sub(4) as usize;
        let wrapped_details = Self::wrap_and_truncate_text(details, content_width, content_lines);
        let text = format!("{}\n\n[Esc] or [Enter] to close", wrapped_details);

        frame.render_widget(Clear, popup_area);
        frame.render_widget(
            Paragraph::new(text).block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(" Error Details "),
            ),
            popup_area,
        );
    }

    fn wrap_and_truncate_text(input: &str, width: usize, max_lines: usize) -> String {
        if width == 0 || max_lines == 0 {
            return "... (truncated)".to_string();
        }

        let mut out = Vec::new();
        let mut truncated = false;

        'lines: for raw_line in input.lines() {
            let mut current = String::new();
            for ch in raw_line.chars() {
                if current.chars().count() == width {
                    if out.len() >= max_lines {
                        truncated = true;
                        break 'lines;
                    }
                    out.push(std::mem::take(&mut current));
                }
                current.push(ch);
            }

            if out.len() >= max_lines {
                truncated = true;
                break;
            }
            out.push(current);
        }

        if truncated {
            out.truncate(max_lines.saturating_sub(1));
            out.push("... (truncated)".to_string());
        }

        out.join("\n")
    }

    fn centered_rect(&self, percent_x: u16, percent_y: u16, r: Rect) -> Rect {
        let popup_layout = ratatui::layout::Layout::default()
            .direction(ratatui::layout::Direction::Vertical)
            .constraints([
                ratatui::layout::Constraint::Percentage((100 - percent_y) / 2),
                ratatui::layout::Constraint::Percentage(percent_y),
                ratatui::layout::Constraint::Percentage((100 - percent_y) / 2),
            ])
            .split(r);

        ratatui::layout::Layout::default()
            .direction(ratatui::layout::Direction::Horizontal)
            .constraints([
                ratatui::layout::Constraint::Percentage((100 - percent_x) / 2),
                ratatui::layout::Constraint::Percentage(percent_x),
                ratatui::layout::Constraint::Percentage((100 - percent_x) / 2),
            ])
            .split(popup_layout[1])[1]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    fn rendered_text(app: &mut App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).expect("terminal");
        terminal.draw(|frame| app.render(frame)).expect("draw");
        let buffer = terminal.backend().buffer().clone();
        buffer
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect::<String>()
    }

    #[test]
    fn wraps_long_error_lines_and_truncates() {
        let text = App::wrap_and_truncate_text("abcdefghij\nxyz", 4, 10);
        assert_eq!(text, "abcd\nefgh\nij\nxyz");

        let text = App::wrap_and_truncate_text("abcdefghijkl", 4, 2);
        assert_eq!(text, "abcd\n... (truncated)");
    }

    #[test]
    fn configure_screen_masks_the_secret() {
        let mut app = App::default();
        app.flow.config.client_secret = "hunter2".to_string();
        let text = rendered_text(&mut app);
        assert!(text.contains("Client Secret"));
        assert!(text.contains("*******"));
        assert!(!text.contains("hunter2"));
    }

    #[test]
    fn complete_screen_shows_the_token() {
        let mut app = App::default();
        app.flow.step = WizardStep::Complete;
        app.flow.access_token = Some(shopify_token_oauth::AccessToken {
            token: "shpat_visible".to_string(),
            scope: None,
        });
        let text = rendered_text(&mut app);
        assert!(text.contains("shpat_visible"));
        assert!(text.contains("4 Complete"));
    }
}
