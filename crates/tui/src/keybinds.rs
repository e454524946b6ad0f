pub struct Keybinds;

impl Default for Keybinds {
    fn default() -> Self {
        Self
    }
}

impl Keybinds {
    pub fn help_text(&self) -> String {
        r#"Keyboard Shortcuts:

Configure:
  Tab / Shift+Tab  Next / previous field
  Ctrl + U         Clear the selected field
  Ctrl + R         Restore the default scopes
  Enter            Continue to authorization

Authorize:
  Enter            Save config and wait for the redirect
  Esc              Back to configuration

Exchange:
  type / paste     Authorization code or full redirect URL
  Enter            Exchange the code for a token
  Esc              Back to authorization

Complete:
  Enter            Start over with a new token
  Esc              Quit

General:
  F1 / Ctrl + H    Toggle this help
  Ctrl + E         Show latest error details
  Ctrl + Q         Quit
"#
        .to_string()
    }
}
