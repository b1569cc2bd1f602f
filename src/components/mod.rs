pub mod action_form;
pub mod activity;
pub mod header;
pub mod help;
pub mod history;
pub mod pool_panel;
pub mod status_bar;
pub mod token_panel;

use crossterm::event::KeyEvent;
use ratatui::Frame;
use ratatui::layout::Rect;

use crate::events::AppEvent;

/// Trait for the interactive UI components
pub trait Component {
    /// Handle a key event, optionally returning an AppEvent
    fn handle_key(&mut self, key: KeyEvent) -> Option<AppEvent>;

    /// Render the component into the given area
    fn render(&mut self, frame: &mut Frame, area: Rect);
}
