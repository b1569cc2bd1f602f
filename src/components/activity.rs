use std::collections::BTreeMap;

use ratatui::prelude::*;
use ratatui::widgets::*;

use crate::data::chains;
use crate::data::types::ChainConfig;
use crate::data::workflow::{TxWorkflow, WorkflowId, WorkflowState};
use crate::theme::THEME;
use crate::utils;

const MAX_ENTRIES: usize = 20;

/// Latest state of every write started in this session, newest first.
pub struct ActivityLog {
    workflows: BTreeMap<WorkflowId, TxWorkflow>,
    pub chain: Option<ChainConfig>,
}

impl ActivityLog {
    pub fn new() -> Self {
        Self {
            workflows: BTreeMap::new(),
            chain: None,
        }
    }

    pub fn update(&mut self, workflow: TxWorkflow) {
        self.workflows.insert(workflow.id, workflow);
        while self.workflows.len() > MAX_ENTRIES {
            self.workflows.pop_first();
        }
    }

    fn newest_first(&self) -> impl Iterator<Item = &TxWorkflow> {
        self.workflows.values().rev()
    }

    fn detail(&self, workflow: &TxWorkflow) -> (String, Style) {
        match &workflow.state {
            WorkflowState::Failed(err) => (
                format!("{}: {err}", err.kind()),
                THEME.failure_style(err.kind()),
            ),
            WorkflowState::Succeeded(summary) => {
                let link = self
                    .chain
                    .as_ref()
                    .and_then(|chain| chains::tx_url(chain, &summary.tx_hash));
                match (link, summary.block_number) {
                    (Some(link), _) => (link, THEME.accent_style()),
                    (None, Some(block)) => (
                        format!(
                            "block #{} gas {}",
                            utils::format_number(block),
                            utils::format_number(summary.gas_used)
                        ),
                        THEME.success_style(),
                    ),
                    (None, None) => (String::new(), THEME.muted_style()),
                }
            }
            WorkflowState::AwaitingConfirmation(handle) => (
                format!("submitted {}", utils::format_time_ago(handle.submitted_at)),
                THEME.muted_style(),
            ),
            WorkflowState::Idle | WorkflowState::Submitting => {
                (String::new(), THEME.muted_style())
            }
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .title(" Activity ")
            .borders(Borders::ALL)
            .border_style(THEME.border_style());

        if self.workflows.is_empty() {
            let empty = Paragraph::new(Span::styled(
                "  No transactions sent yet",
                THEME.muted_style(),
            ))
            .block(block);
            frame.render_widget(empty, area);
            return;
        }

        let header = Row::new(vec![
            Cell::from("#"),
            Cell::from("Action"),
            Cell::from("Arguments"),
            Cell::from("Status"),
            Cell::from("Tx Hash"),
            Cell::from("Detail"),
        ])
        .style(THEME.table_header_style());

        let rows: Vec<Row> = self
            .newest_first()
            .map(|wf| {
                let args = wf
                    .call
                    .args
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(", ");
                let status_style = match wf.state {
                    WorkflowState::Succeeded(_) => THEME.success_style(),
                    WorkflowState::Failed(ref err) => THEME.failure_style(err.kind()),
                    _ => THEME.accent_style(),
                };
                let hash = wf
                    .state
                    .tx_hash()
                    .map(|h| utils::truncate_hash(&h))
                    .unwrap_or_else(|| "-".to_string());
                let (detail, detail_style) = self.detail(wf);
                Row::new(vec![
                    Cell::from(wf.id.to_string()).style(THEME.muted_style()),
                    Cell::from(wf.kind.label()),
                    Cell::from(args),
                    Cell::from(wf.state.label()).style(status_style),
                    Cell::from(hash).style(THEME.hash_style()),
                    Cell::from(detail).style(detail_style),
                ])
            })
            .collect();

        let widths = [
            Constraint::Length(4),
            Constraint::Length(20),
            Constraint::Length(34),
            Constraint::Length(11),
            Constraint::Length(16),
            Constraint::Min(10),
        ];
        let table = Table::new(rows, widths).header(header).block(block);
        frame.render_widget(table, area);
    }
}
