use alloy::primitives::{Address, U256};
use ratatui::prelude::*;
use ratatui::widgets::*;

use crate::data::poller::SnapshotState;
use crate::data::types::ReadKey;
use crate::theme::THEME;
use crate::utils;

/// Token name, symbol, balance and allowance for the current account.
pub struct TokenPanel {
    pub token: Address,
    pub account: Option<Address>,
    pub spender: Option<Address>,
    pub info: SnapshotState,
    pub allowance: SnapshotState,
}

impl TokenPanel {
    pub fn new(token: Address, account: Option<Address>) -> Self {
        Self {
            token,
            account,
            spender: None,
            info: SnapshotState::default(),
            allowance: SnapshotState::default(),
        }
    }

    /// Symbol from the last snapshot, "tokens" until it is known.
    pub fn symbol(&self) -> String {
        self.info
            .snapshot
            .as_ref()
            .and_then(|s| s.text(ReadKey::TokenSymbol))
            .unwrap_or("tokens")
            .to_string()
    }

    pub fn has_allowance(&self) -> bool {
        self.allowance
            .snapshot
            .as_ref()
            .and_then(|s| s.uint(ReadKey::Allowance))
            .is_some_and(|value| !value.is_zero())
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .title(" Token ")
            .borders(Borders::ALL)
            .border_style(THEME.border_style());

        let symbol = self.symbol();
        let amount = |v: U256| utils::format_amount(v, &symbol);

        let mut rows = vec![
            Row::new(vec![
                Cell::from("Contract").style(THEME.muted_style()),
                Cell::from(self.token.to_string()).style(THEME.address_style()),
            ]),
            Row::new(vec![
                Cell::from("Name").style(THEME.muted_style()),
                text_cell(&self.info, ReadKey::TokenName),
            ]),
            Row::new(vec![
                Cell::from("Symbol").style(THEME.muted_style()),
                text_cell(&self.info, ReadKey::TokenSymbol),
            ]),
        ];

        match self.account {
            Some(_) => {
                rows.push(Row::new(vec![
                    Cell::from("Balance").style(THEME.muted_style()),
                    uint_cell(&self.info, ReadKey::Balance, amount),
                ]));
                let spender = match self.spender {
                    Some(addr) => format!("Allowance to {}", utils::truncate_address(&addr)),
                    None => "Allowance (self)".to_string(),
                };
                rows.push(Row::new(vec![
                    Cell::from(spender).style(THEME.muted_style()),
                    uint_cell(&self.allowance, ReadKey::Allowance, amount),
                ]));
            }
            None => rows.push(Row::new(vec![
                Cell::from("Balance").style(THEME.muted_style()),
                Cell::from("no account, pass --account or --private-key")
                    .style(THEME.warning_style()),
            ])),
        }

        if let Some(ref snapshot) = self.info.snapshot {
            rows.push(Row::new(vec![
                Cell::from("Updated").style(THEME.muted_style()),
                Cell::from(utils::format_time_ago(snapshot.fetched_at)).style(THEME.muted_style()),
            ]));
        }

        for (label, state) in [("Token", &self.info), ("Allowance", &self.allowance)] {
            if let Some(ref err) = state.error {
                rows.push(Row::new(vec![
                    Cell::from(format!("{label} read")).style(THEME.muted_style()),
                    Cell::from(format!("stale: {err}")).style(THEME.error_style()),
                ]));
            }
        }

        let table = Table::new(rows, [Constraint::Length(24), Constraint::Min(0)]).block(block);
        frame.render_widget(table, area);
    }
}

pub(crate) fn text_cell(state: &SnapshotState, key: ReadKey) -> Cell<'static> {
    match state.snapshot.as_ref().and_then(|s| s.text(key)) {
        Some(text) => Cell::from(text.to_string()).style(THEME.accent_style()),
        None => placeholder_cell(state),
    }
}

pub(crate) fn uint_cell(
    state: &SnapshotState,
    key: ReadKey,
    format: impl Fn(U256) -> String,
) -> Cell<'static> {
    match state.snapshot.as_ref().and_then(|s| s.uint(key)) {
        Some(value) => Cell::from(format(value)).style(THEME.amount_style()),
        None => placeholder_cell(state),
    }
}

fn placeholder_cell(state: &SnapshotState) -> Cell<'static> {
    if state.error.is_some() {
        Cell::from("unavailable").style(THEME.error_style())
    } else {
        Cell::from("loading...").style(THEME.muted_style())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::poller::Snapshot;
    use crate::data::types::ReadValue;

    fn state(values: &[(ReadKey, ReadValue)]) -> SnapshotState {
        SnapshotState {
            snapshot: Some(Snapshot {
                values: values.iter().cloned().collect(),
                fetched_at: 1,
            }),
            error: None,
        }
    }

    #[test]
    fn test_symbol_fallback() {
        let mut panel = TokenPanel::new(Address::repeat_byte(1), None);
        assert_eq!(panel.symbol(), "tokens");
        panel.info = state(&[(ReadKey::TokenSymbol, ReadValue::Text("MEM".into()))]);
        assert_eq!(panel.symbol(), "MEM");
    }

    #[test]
    fn test_has_allowance() {
        let mut panel = TokenPanel::new(Address::repeat_byte(1), Some(Address::repeat_byte(2)));
        assert!(!panel.has_allowance());
        panel.allowance = state(&[(ReadKey::Allowance, ReadValue::Uint(U256::ZERO))]);
        assert!(!panel.has_allowance());
        panel.allowance = state(&[(ReadKey::Allowance, ReadValue::Uint(U256::from(5)))]);
        assert!(panel.has_allowance());
    }

    #[test]
    fn test_stale_snapshot_keeps_value() {
        let mut panel = TokenPanel::new(Address::repeat_byte(1), Some(Address::repeat_byte(2)));
        panel.allowance = state(&[(ReadKey::Allowance, ReadValue::Uint(U256::from(5)))]);
        panel.allowance.error = Some("allowance: RPC error".into());
        assert!(panel.has_allowance());
    }
}
