use std::sync::Arc;
use std::time::Duration;

use crossterm::event::{Event, EventStream, KeyCode, KeyEventKind, KeyModifiers};
use futures::StreamExt;
use ratatui::prelude::*;
use ratatui::widgets::*;
use tokio::sync::mpsc;
use tracing::debug;

use crate::components::Component;
use crate::components::action_form::ActionForm;
use crate::components::activity::ActivityLog;
use crate::components::header::Header;
use crate::components::help::HelpOverlay;
use crate::components::history::HistoryView;
use crate::components::pool_panel::PoolPanel;
use crate::components::status_bar::StatusBar;
use crate::components::token_panel::TokenPanel;
use crate::data::DataService;
use crate::data::calls::ActionKind;
use crate::data::poller::SnapshotState;
use crate::data::types::{ChainConfig, ReadGroup};
use crate::data::workflow::WorkflowState;
use crate::events::{AppEvent, View};
use crate::theme::THEME;

/// How often the header's block number is refreshed.
const BLOCK_REFRESH: Duration = Duration::from_secs(12);

pub struct App {
    current_view: View,

    // Components
    header: Header,
    token_panel: TokenPanel,
    pool_panel: PoolPanel,
    token_form: ActionForm,
    swap_form: ActionForm,
    activity: ActivityLog,
    history: HistoryView,
    status_bar: StatusBar,
    help: HelpOverlay,

    // Data
    data_service: Arc<DataService>,
    event_rx: mpsc::UnboundedReceiver<AppEvent>,

    // State
    should_quit: bool,
    tick_rate: Duration,
}

impl App {
    pub fn with_service(
        data_service: Arc<DataService>,
        event_rx: mpsc::UnboundedReceiver<AppEvent>,
        tick_rate_ms: u64,
    ) -> Self {
        let contracts = data_service.contracts();
        let account = data_service.account();

        let mut header = Header::new();
        header.account = account;
        let mut status_bar = StatusBar::new();
        status_bar.can_sign = data_service.can_sign();

        Self {
            current_view: View::Token,
            header,
            token_panel: TokenPanel::new(contracts.token, account),
            pool_panel: PoolPanel::new(contracts.swap),
            token_form: ActionForm::new("Token Actions", &ActionKind::TOKEN_ACTIONS),
            swap_form: ActionForm::new("Swap Actions", &ActionKind::SWAP_ACTIONS),
            activity: ActivityLog::new(),
            history: HistoryView::new(),
            status_bar,
            help: HelpOverlay::new(),
            data_service,
            event_rx,
            should_quit: false,
            tick_rate: Duration::from_millis(tick_rate_ms),
        }
    }

    pub fn set_chain_info(&mut self, chain: ChainConfig) {
        self.header.chain_name = chain.name.clone();
        self.pool_panel.native_symbol = chain.symbol.clone();
        self.activity.chain = Some(chain);
    }

    pub async fn run(&mut self, mut terminal: ratatui::DefaultTerminal) -> color_eyre::Result<()> {
        // Initial data load
        self.data_service.refresh_all();
        if self.data_service.account().is_some() {
            self.history.loading = true;
        } else {
            self.history.error = Some("no account configured".to_string());
        }

        let mut interval = tokio::time::interval(self.tick_rate);
        let mut block_interval = tokio::time::interval(BLOCK_REFRESH);
        let mut events = EventStream::new();

        while !self.should_quit {
            tokio::select! {
                _ = interval.tick() => {
                    self.status_bar.refreshing = self.data_service.is_refreshing();
                    terminal.draw(|frame| self.render(frame))?;
                }
                _ = block_interval.tick() => {
                    self.data_service.fetch_latest_block_number();
                }
                Some(Ok(event)) = events.next() => {
                    self.handle_terminal_event(event);
                }
                Some(app_event) = self.event_rx.recv() => {
                    self.handle_app_event(app_event);
                }
            }
        }

        Ok(())
    }

    fn render(&mut self, frame: &mut Frame) {
        let area = frame.area();

        frame.render_widget(Block::default().style(Style::default().bg(THEME.bg)), area);

        // Layout: header (1) | content (fill) | status bar (1)
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Min(0),
                Constraint::Length(1),
            ])
            .split(area);

        self.header.render(frame, chunks[0]);

        match self.current_view {
            View::Token | View::Swap => {
                let rows = Layout::default()
                    .direction(Direction::Vertical)
                    .constraints([Constraint::Length(10), Constraint::Min(0)])
                    .split(chunks[1]);
                let top = Layout::default()
                    .direction(Direction::Horizontal)
                    .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
                    .split(rows[0]);

                if self.current_view == View::Token {
                    self.token_panel.render(frame, top[0]);
                    self.token_form.render(frame, top[1]);
                } else {
                    let symbol = self.token_panel.symbol();
                    self.pool_panel.render(frame, top[0], &symbol);
                    self.swap_form.render(frame, top[1]);
                }
                self.activity.render(frame, rows[1]);
            }
            View::History => self.history.render(frame, chunks[1]),
        }

        self.status_bar.render(frame, chunks[2]);

        // Overlays (rendered on top)
        self.help.render(frame, area);
    }

    fn active_form(&mut self) -> Option<&mut ActionForm> {
        match self.current_view {
            View::Token => Some(&mut self.token_form),
            View::Swap => Some(&mut self.swap_form),
            View::History => None,
        }
    }

    fn handle_terminal_event(&mut self, event: Event) {
        let Event::Key(key) = event else {
            return;
        };
        // Only handle key press events (not release/repeat) for cross-platform compat
        if key.kind != KeyEventKind::Press {
            return;
        }

        // Help overlay consumes all keys when visible
        if self.help.handle_key(key) {
            return;
        }

        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return;
        }

        // A form being edited takes every other key
        let editing = self.active_form().is_some_and(|form| form.editing);

        if !editing {
            match key.code {
                KeyCode::Char('q') => {
                    self.should_quit = true;
                    return;
                }
                KeyCode::Char('?') => {
                    self.help.toggle();
                    return;
                }
                KeyCode::Char(c @ '1'..='3') => {
                    if let Some(view) = View::from_key(c) {
                        self.handle_app_event(AppEvent::Navigate(view));
                    }
                    return;
                }
                KeyCode::Char('r') if self.current_view != View::History => {
                    self.status_bar.clear_message();
                    self.data_service.refresh_all();
                    return;
                }
                _ => {}
            }
        }

        // Delegate to current view's component
        let app_event = match self.current_view {
            View::Token => self.token_form.handle_key(key),
            View::Swap => self.swap_form.handle_key(key),
            View::History => self.history.handle_key(key),
        };
        self.sync_spender();

        if let Some(event) = app_event {
            self.handle_app_event(event);
        }
    }

    /// Aim the allowance read at the spender typed into the approve form.
    fn sync_spender(&mut self) {
        let hint = self.token_form.spender_hint();
        if hint == self.token_panel.spender {
            return;
        }
        debug!(spender = ?hint, "allowance spender changed");
        self.token_panel.spender = hint;
        self.token_panel.allowance = SnapshotState::default();
        self.token_form.has_allowance = false;
        self.data_service.set_spender(hint);
    }

    fn handle_app_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::Connected(chain_id) => {
                self.header.chain_id = chain_id;
                self.status_bar.connected = true;
                self.data_service.fetch_latest_block_number();
            }
            AppEvent::LatestBlockNumber(number) => {
                self.header.latest_block = number;
                self.status_bar.connected = true;
            }
            AppEvent::SnapshotUpdated { group, state } => match group {
                ReadGroup::Token => {
                    self.token_panel.info = state;
                    self.history.symbol = self.token_panel.symbol();
                }
                ReadGroup::Allowance => {
                    self.token_panel.allowance = state;
                    self.token_form.has_allowance = self.token_panel.has_allowance();
                }
                ReadGroup::Pool => self.pool_panel.state = state,
                ReadGroup::History => {}
            },
            AppEvent::HistoryLoaded(outcome) => {
                self.history.set_outcome(outcome);
            }
            AppEvent::HistoryFailed(msg) => {
                self.history.loading = false;
                self.history.error = Some(msg);
            }
            AppEvent::SubmitAction(request) => {
                let form = if ActionKind::TOKEN_ACTIONS.contains(&request.kind()) {
                    &mut self.token_form
                } else {
                    &mut self.swap_form
                };
                match self.data_service.submit_action(&request) {
                    Ok(id) => form.start(id),
                    Err(err) => form.reject(&err),
                }
            }
            AppEvent::WorkflowUpdated(workflow) => {
                self.token_form.on_workflow(&workflow);
                self.swap_form.on_workflow(&workflow);
                match &workflow.state {
                    WorkflowState::Succeeded(_) => {
                        self.status_bar.error_message = None;
                        self.status_bar.info_message =
                            Some(format!("#{} {} confirmed", workflow.id, workflow.kind));
                    }
                    WorkflowState::Failed(err) => {
                        self.status_bar.info_message = None;
                        self.status_bar.error_message =
                            Some(format!("#{} {} failed: {err}", workflow.id, workflow.kind));
                    }
                    _ => {}
                }
                self.activity.update(workflow);
            }
            AppEvent::ExportHistory(format) => {
                self.data_service.export_history(format);
            }
            AppEvent::ExportComplete(msg) => {
                self.status_bar.error_message = None;
                self.status_bar.info_message = Some(msg);
            }
            AppEvent::Navigate(view) => {
                self.navigate_to(view);
            }
            AppEvent::RefreshHistory => {
                if self.data_service.account().is_some() {
                    self.history.error = None;
                    self.data_service.refresh_history();
                } else {
                    self.history.loading = false;
                }
            }
            AppEvent::Error(msg) => {
                self.status_bar.info_message = None;
                self.status_bar.error_message = Some(msg);
            }
        }
    }

    fn navigate_to(&mut self, view: View) {
        self.current_view = view;
        self.header.current_view = view;

        // Clear messages on navigation
        self.status_bar.clear_message();
    }
}
