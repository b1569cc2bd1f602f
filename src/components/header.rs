use alloy::primitives::Address;
use ratatui::prelude::*;
use ratatui::widgets::*;

use crate::events::View;
use crate::theme::THEME;
use crate::utils;

pub struct Header {
    pub chain_id: u64,
    pub latest_block: u64,
    pub current_view: View,
    pub chain_name: String,
    pub account: Option<Address>,
}

impl Header {
    pub fn new() -> Self {
        Self {
            chain_id: 0,
            latest_block: 0,
            current_view: View::Token,
            chain_name: String::new(),
            account: None,
        }
    }

    fn display_chain_name(&self) -> String {
        if self.chain_name.is_empty() {
            format!("Chain {}", self.chain_id)
        } else {
            self.chain_name.clone()
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        // Background for the entire header bar
        let header_block = Block::default().style(THEME.header_style());
        frame.render_widget(header_block, area);

        // Left (title), center (tabs), right (network and account)
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Length(13),
                Constraint::Min(0),
                Constraint::Length(44),
            ])
            .split(area);

        let title = Paragraph::new(Span::styled(
            " token-desk",
            Style::default()
                .fg(THEME.text_accent)
                .add_modifier(Modifier::BOLD),
        ))
        .style(THEME.header_style());
        frame.render_widget(title, chunks[0]);

        let tab_titles: Vec<Line> = View::ALL
            .iter()
            .enumerate()
            .map(|(i, view)| Line::from(format!("{} [{}]", view.title(), i + 1)))
            .collect();
        let tabs = Tabs::new(tab_titles)
            .select(self.current_view.index())
            .style(THEME.muted_style())
            .highlight_style(THEME.accent_style().add_modifier(Modifier::BOLD))
            .divider(Span::raw(" | "));
        frame.render_widget(tabs, chunks[1]);

        let account = match &self.account {
            Some(addr) => Span::styled(utils::truncate_address(addr), THEME.address_style()),
            None => Span::styled("no account", THEME.muted_style()),
        };
        let network_info = Line::from(vec![
            account,
            Span::styled(" | ", THEME.muted_style()),
            Span::styled(self.display_chain_name(), Style::default().fg(THEME.text)),
            Span::styled(" | ", THEME.muted_style()),
            Span::styled(
                format!("#{} ", utils::format_number(self.latest_block)),
                THEME.accent_style(),
            ),
        ]);
        let network_paragraph = Paragraph::new(network_info)
            .alignment(Alignment::Right)
            .style(THEME.header_style());
        frame.render_widget(network_paragraph, chunks[2]);
    }
}
