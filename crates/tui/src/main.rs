use directories::ProjectDirs;
use ratatui::crossterm::event::{
    self, DisableBracketedPaste, EnableBracketedPaste, Event, KeyCode, KeyModifiers,
};
use ratatui::crossterm::terminal::{self, EnterAlternateScreen, LeaveAlternateScreen};
use shopify_token::app::App;
use shopify_token::Config;
use shopify_token_oauth::store::ConfigStore;
use shopify_token_oauth::AccessToken;
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "shopify-token", "shopify-token")
}

fn get_config_path() -> PathBuf {
    if let Some(proj_dirs) = project_dirs() {
        proj_dirs.config_dir().join("config.toml")
    } else {
        PathBuf::from("config/default.toml")
    }
}

/// The terminal belongs to ratatui, so logs go to a file in the data dir.
fn init_logging() {
    let Some(proj_dirs) = project_dirs() else {
        return;
    };
    let log_dir = proj_dirs.data_dir();
    if std::fs::create_dir_all(log_dir).is_err() {
        return;
    }
    let Ok(file) = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_dir.join("shopify-token.log"))
    else {
        return;
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init();
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _ = dotenvy::dotenv();
    init_logging();

    terminal::enable_raw_mode()?;
    let mut terminal = ratatui::init();
    ratatui::crossterm::execute!(io::stdout(), EnterAlternateScreen, EnableBracketedPaste)?;

    let result = run(&mut terminal);

    let _ = ratatui::crossterm::execute!(io::stdout(), DisableBracketedPaste, LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();
    ratatui::restore();

    if let Some(token) = result? {
        println!("{}", token.token);
    }
    Ok(())
}

fn run(
    terminal: &mut ratatui::Terminal<ratatui::backend::CrosstermBackend<io::Stdout>>,
) -> Result<Option<AccessToken>, Box<dyn std::error::Error>> {
    let config_path = get_config_path();
    let mut config = Config::load_or_default(&config_path);
    config.apply_env_overrides();

    let rt = tokio::runtime::Runtime::new()?;
    let _guard = rt.enter();

    let mut app = App::new(config);
    match ConfigStore::open_default() {
        Ok(store) => app = app.with_store(store),
        Err(e) => tracing::warn!("Config persistence disabled: {}", e),
    }

    let callback_arg = std::env::args().nth(1);
    app.init(callback_arg.as_deref());

    loop {
        terminal.draw(|frame| app.render(frame))?;

        if event::poll(Duration::from_millis(50))? {
            let event = event::read()?;

            if let Event::Key(key) = &event {
                if key.code == KeyCode::Char('q') && key.modifiers.contains(KeyModifiers::CONTROL) {
                    break;
                }
            }

            if let Ok(should_quit) = app.handle_event(event) {
                if should_quit {
                    break;
                }
            }
        }

        app.process_async_events();

        if app.should_quit {
            break;
        }
    }

    app.shutdown();
    Ok(app.flow.access_token.take())
}
