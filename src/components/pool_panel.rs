use alloy::primitives::{Address, U256};
use ratatui::prelude::*;
use ratatui::widgets::*;

use crate::components::token_panel::uint_cell;
use crate::data::poller::SnapshotState;
use crate::data::types::ReadKey;
use crate::theme::THEME;
use crate::utils;

/// Balances and rate of the swap pool.
pub struct PoolPanel {
    pub swap: Option<Address>,
    pub state: SnapshotState,
    pub native_symbol: String,
}

impl PoolPanel {
    pub fn new(swap: Option<Address>) -> Self {
        Self {
            swap,
            state: SnapshotState::default(),
            native_symbol: "ETH".to_string(),
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect, token_symbol: &str) {
        let block = Block::default()
            .title(" Swap Pool ")
            .borders(Borders::ALL)
            .border_style(THEME.border_style());

        let Some(swap) = self.swap else {
            let message = Paragraph::new(vec![
                Line::from(""),
                Line::from(Span::styled(
                    "  No swap contract configured.",
                    THEME.warning_style(),
                )),
                Line::from(Span::styled(
                    "  Pass --swap or set TOKEN_SWAP_ADDRESS to enable this page.",
                    THEME.muted_style(),
                )),
            ])
            .block(block);
            frame.render_widget(message, area);
            return;
        };

        let native = |v: U256| utils::format_amount(v, &self.native_symbol);
        let tokens = |v: U256| utils::format_amount(v, token_symbol);
        let rate = |v: U256| format!("1 {} = {v} {token_symbol}", self.native_symbol);

        let mut rows = vec![
            Row::new(vec![
                Cell::from("Contract").style(THEME.muted_style()),
                Cell::from(swap.to_string()).style(THEME.address_style()),
            ]),
            Row::new(vec![
                Cell::from(format!("Pool {}", self.native_symbol)).style(THEME.muted_style()),
                uint_cell(&self.state, ReadKey::PoolNativeBalance, native),
            ]),
            Row::new(vec![
                Cell::from("Pool Tokens").style(THEME.muted_style()),
                uint_cell(&self.state, ReadKey::PoolTokenBalance, tokens),
            ]),
            Row::new(vec![
                Cell::from("Your Balance").style(THEME.muted_style()),
                uint_cell(&self.state, ReadKey::Balance, tokens),
            ]),
            Row::new(vec![
                Cell::from("Swap Rate").style(THEME.muted_style()),
                uint_cell(&self.state, ReadKey::Rate, rate),
            ]),
        ];

        if let Some(ref err) = self.state.error {
            rows.push(Row::new(vec![
                Cell::from("Pool read").style(THEME.muted_style()),
                Cell::from(format!("stale: {err}")).style(THEME.error_style()),
            ]));
        }

        let table = Table::new(rows, [Constraint::Length(16), Constraint::Min(0)]).block(block);
        frame.render_widget(table, area);
    }
}
