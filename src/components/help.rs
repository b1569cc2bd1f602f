use crossterm::event::KeyEvent;
use ratatui::prelude::*;
use ratatui::widgets::*;

use crate::theme::THEME;

const SECTIONS: &[(&str, &[(&str, &str)])] = &[
    (
        "Views",
        &[
            ("1", "Token: info, balance, allowance, token actions"),
            ("2", "Swap: pool balances, rate, swap actions"),
            ("3", "History: recent transfers"),
        ],
    ),
    (
        "Action form",
        &[
            ("\u{2190}/\u{2192}", "Choose action"),
            ("Enter", "Start editing / Submit"),
            ("Tab", "Next field"),
            ("Shift+Tab", "Previous field"),
            ("Esc", "Stop editing"),
        ],
    ),
    (
        "History",
        &[
            ("\u{2191}/k \u{2193}/j", "Move selection"),
            ("r", "Reload history"),
            ("e", "Export to CSV"),
            ("E", "Export to JSON"),
        ],
    ),
    (
        "Other",
        &[
            ("r", "Refresh token and pool reads"),
            ("?", "Toggle this help"),
            ("q", "Quit"),
        ],
    ),
];

pub struct HelpOverlay {
    pub visible: bool,
}

impl HelpOverlay {
    pub fn new() -> Self {
        Self { visible: false }
    }

    pub fn toggle(&mut self) {
        self.visible = !self.visible;
    }

    /// Returns true if it consumed the event
    pub fn handle_key(&mut self, _key: KeyEvent) -> bool {
        if self.visible {
            self.visible = false;
            true
        } else {
            false
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        if !self.visible {
            return;
        }

        let popup_width = area.width * 60 / 100;
        let popup_height = area.height * 70 / 100;
        let x = area.x + (area.width - popup_width) / 2;
        let y = area.y + (area.height - popup_height) / 2;
        let popup_area = Rect::new(x, y, popup_width, popup_height);

        // Clear the area behind the popup
        frame.render_widget(Clear, popup_area);

        let block = Block::default()
            .title(" Keyboard Shortcuts ")
            .borders(Borders::ALL)
            .border_style(THEME.border_focused_style())
            .style(Style::default().bg(THEME.surface));

        let mut help_text = Vec::new();
        for (i, (title, keys)) in SECTIONS.iter().enumerate() {
            if i > 0 {
                help_text.push(Line::from(""));
            }
            help_text.push(Line::from(Span::styled(
                *title,
                Style::default()
                    .fg(THEME.text_accent)
                    .add_modifier(Modifier::BOLD),
            )));
            for (key, action) in keys.iter() {
                help_text.push(Line::from(vec![
                    Span::styled(
                        format!("  {key:<13}"),
                        Style::default().fg(THEME.text_accent),
                    ),
                    Span::styled(*action, Style::default().fg(THEME.text)),
                ]));
            }
        }

        let paragraph = Paragraph::new(help_text)
            .block(block)
            .wrap(Wrap { trim: false });

        frame.render_widget(paragraph, popup_area);
    }
}
