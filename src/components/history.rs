use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::*;

use crate::components::Component;
use crate::data::history::HistoryOutcome;
use crate::data::types::{Direction as TransferDirection, TransferEvent};
use crate::events::{AppEvent, ExportFormat};
use crate::theme::THEME;
use crate::utils;

pub struct HistoryView {
    pub outcome: Option<HistoryOutcome>,
    pub loading: bool,
    pub error: Option<String>,
    pub symbol: String,
    table_state: TableState,
}

impl HistoryView {
    pub fn new() -> Self {
        Self {
            outcome: None,
            loading: false,
            error: None,
            symbol: "tokens".to_string(),
            table_state: TableState::default(),
        }
    }

    fn entries(&self) -> &[TransferEvent] {
        self.outcome.as_ref().map(HistoryOutcome::entries).unwrap_or(&[])
    }

    pub fn set_outcome(&mut self, outcome: HistoryOutcome) {
        self.outcome = Some(outcome);
        self.loading = false;
        self.error = None;
        let len = self.entries().len();
        match self.table_state.selected() {
            _ if len == 0 => self.table_state.select(None),
            Some(i) if i >= len => self.table_state.select(Some(len - 1)),
            None => self.table_state.select(Some(0)),
            Some(_) => {}
        }
    }

    /// Text shown instead of the table. A failed reload keeps the previous entries.
    fn placeholder(&self) -> Option<Span<'static>> {
        if !self.entries().is_empty() {
            return None;
        }
        if let Some(ref err) = self.error {
            Some(Span::styled(format!("  Failed to load history: {err}"), THEME.error_style()))
        } else if self.outcome.is_none() || self.loading {
            Some(Span::styled("  Loading transfers...", THEME.muted_style()))
        } else {
            Some(Span::styled("  No transfers found for this account", THEME.muted_style()))
        }
    }

    fn select_next(&mut self) {
        let len = self.entries().len();
        if len == 0 {
            return;
        }
        let current = self.table_state.selected().unwrap_or(0);
        let next = if current + 1 >= len { current } else { current + 1 };
        self.table_state.select(Some(next));
    }

    fn select_prev(&mut self) {
        if self.entries().is_empty() {
            return;
        }
        let current = self.table_state.selected().unwrap_or(0);
        self.table_state.select(Some(current.saturating_sub(1)));
    }
}

fn build_rows(entries: &[TransferEvent], symbol: &str) -> Vec<Row<'static>> {
    entries
        .iter()
        .map(|t| {
            let sent = t.direction == TransferDirection::Sent;
            let date = match t.timestamp {
                Some(ts) => Cell::from(utils::format_timestamp(ts)).style(THEME.muted_style()),
                None => Cell::from("pending").style(THEME.warning_style()),
            };
            Row::new(vec![
                Cell::from(t.direction.to_string()).style(THEME.direction_style(sent)),
                Cell::from(utils::truncate_address(&t.counterparty())).style(THEME.address_style()),
                Cell::from(utils::format_amount(t.value, symbol)).style(THEME.amount_style()),
                Cell::from(utils::format_number(t.block_number)).style(THEME.accent_style()),
                date,
                Cell::from(utils::truncate_hash(&t.tx_hash)).style(THEME.hash_style()),
            ])
        })
        .collect()
}

impl Component for HistoryView {
    fn handle_key(&mut self, key: KeyEvent) -> Option<AppEvent> {
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => {
                self.select_next();
                None
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.select_prev();
                None
            }
            KeyCode::Char('r') => {
                self.loading = true;
                Some(AppEvent::RefreshHistory)
            }
            KeyCode::Char('e') => Some(AppEvent::ExportHistory(ExportFormat::Csv)),
            KeyCode::Char('E') => Some(AppEvent::ExportHistory(ExportFormat::Json)),
            _ => None,
        }
    }

    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let title = match &self.outcome {
            Some(HistoryOutcome::Transfers { entries, total }) => {
                format!(" Transfer History ({} of {total}) ", entries.len())
            }
            _ => " Transfer History ".to_string(),
        };
        let mut outer_block = Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(THEME.border_focused_style());

        if let Some(message) = self.placeholder() {
            frame.render_widget(Paragraph::new(message).block(outer_block), area);
            return;
        }
        if let Some(ref err) = self.error {
            outer_block = outer_block.title_bottom(Line::styled(
                format!(" stale: {err} "),
                THEME.error_style(),
            ));
        }

        let header = Row::new(vec![
            Cell::from("Type"),
            Cell::from("Counterparty"),
            Cell::from("Amount"),
            Cell::from("Block"),
            Cell::from("Date"),
            Cell::from("Tx Hash"),
        ])
        .style(THEME.table_header_style());

        let rows = build_rows(self.entries(), &self.symbol);
        let widths = [
            Constraint::Length(9),
            Constraint::Length(16),
            Constraint::Length(24),
            Constraint::Length(12),
            Constraint::Length(26),
            Constraint::Min(16),
        ];

        let table = Table::new(rows, widths)
            .header(header)
            .block(outer_block)
            .row_highlight_style(THEME.selected_style())
            .highlight_symbol(" > ");

        frame.render_stateful_widget(table, area, &mut self.table_state);
    }
}
