use ratatui::layout::{Constraint, Direction, Layout, Rect};

use super::panel::{Panel, PanelType};

const PROGRESS_HEIGHT: u16 = 3;
const STATUS_HEIGHT: u16 = 3;

#[derive(Default)]
pub struct LayoutState {
    cached_panels: Vec<Panel>,
}

impl LayoutState {
    pub fn calculate_layout(&mut self, area: Rect) -> &[Panel] {
        let main_layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(PROGRESS_HEIGHT),
                Constraint::Min(1),
                Constraint::Length(STATUS_HEIGHT),
            ])
            .split(area);

        self.cached_panels = vec![
            Panel {
                panel_type: PanelType::Progress,
                rect: main_layout[0],
            },
            Panel {
                panel_type: PanelType::Wizard,
                rect: main_layout[1],
            },
            Panel {
                panel_type: PanelType::StatusBar,
                rect: main_layout[2],
            },
        ];

        &self.cached_panels
    }

    pub fn get_panels(&self) -> &[Panel] {
        &self.cached_panels
    }
}
