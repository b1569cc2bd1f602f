use ratatui::prelude::*;
use ratatui::widgets::*;

use crate::theme::THEME;

pub struct StatusBar {
    pub connected: bool,
    pub can_sign: bool,
    pub refreshing: bool,
    pub error_message: Option<String>,
    pub info_message: Option<String>,
}

impl StatusBar {
    pub fn new() -> Self {
        Self {
            connected: false,
            can_sign: false,
            refreshing: false,
            error_message: None,
            info_message: None,
        }
    }

    /// Drop whatever message is showing.
    pub fn clear_message(&mut self) {
        self.error_message = None;
        self.info_message = None;
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let bg = Block::default().style(THEME.header_style());
        frame.render_widget(bg, area);

        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(0), Constraint::Length(36)])
            .split(area);

        // --- Left side: message or key hints ---
        let left_content = if let Some(ref err) = self.error_message {
            Line::from(vec![
                Span::styled(
                    " ! ",
                    Style::default()
                        .fg(THEME.error)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled(err.as_str(), Style::default().fg(THEME.warning)),
            ])
        } else if let Some(ref info) = self.info_message {
            Line::from(Span::styled(format!(" {info}"), THEME.success_style()))
        } else {
            let hint = |key: &'static str, label: &'static str| {
                [
                    Span::styled(key, Style::default().fg(THEME.text_accent)),
                    Span::styled(label, Style::default().fg(THEME.text_muted)),
                ]
            };
            let mut spans = vec![Span::raw(" ")];
            spans.extend(hint("\u{2190}\u{2192}", ":Action  "));
            spans.extend(hint("Enter", ":Edit/Submit  "));
            spans.extend(hint("Esc", ":Cancel  "));
            spans.extend(hint("r", ":Refresh  "));
            spans.extend(hint("?", ":Help  "));
            spans.extend(hint("q", ":Quit"));
            Line::from(spans)
        };

        let left = Paragraph::new(left_content).style(THEME.header_style());
        frame.render_widget(left, chunks[0]);

        // --- Right side: refresh, signer and connection status ---
        let (dot_color, status_text) = if self.connected {
            (THEME.success, "Connected")
        } else {
            (THEME.error, "Disconnected")
        };
        let (signer_style, signer_text) = if self.can_sign {
            (THEME.success_style(), "Signer")
        } else {
            (THEME.warning_style(), "Read-only")
        };

        let mut spans = Vec::new();
        if self.refreshing {
            spans.push(Span::styled("Refreshing", THEME.accent_style()));
            spans.push(Span::styled(" | ", THEME.muted_style()));
        }
        spans.extend([
            Span::styled(signer_text, signer_style),
            Span::styled(" | ", THEME.muted_style()),
            Span::styled("\u{25cf} ", Style::default().fg(dot_color)),
            Span::styled(format!("{status_text} "), Style::default().fg(dot_color)),
        ]);

        let right = Paragraph::new(Line::from(spans))
            .alignment(Alignment::Right)
            .style(THEME.header_style());
        frame.render_widget(right, chunks[1]);
    }
}
