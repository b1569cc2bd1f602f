use alloy::primitives::Address;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::prelude::*;
use ratatui::widgets::*;

use crate::components::Component;
use crate::data::calls::{self, ActionKind, ActionRequest};
use crate::data::error::InputError;
use crate::data::workflow::{TxWorkflow, WorkflowId, WorkflowState};
use crate::events::AppEvent;
use crate::theme::THEME;

/// Form for one family of write actions. Left/Right picks the action,
/// Enter starts editing and Enter again submits.
pub struct ActionForm {
    title: &'static str,
    kinds: &'static [ActionKind],
    selected: usize,
    values: Vec<String>,
    focus: usize,
    pub editing: bool,
    in_flight: Option<WorkflowId>,
    pub error: Option<String>,
    pub has_allowance: bool,
}

impl ActionForm {
    pub fn new(title: &'static str, kinds: &'static [ActionKind]) -> Self {
        let mut form = Self {
            title,
            kinds,
            selected: 0,
            values: Vec::new(),
            focus: 0,
            editing: false,
            in_flight: None,
            error: None,
            has_allowance: false,
        };
        form.reset_fields();
        form
    }

    pub fn kind(&self) -> ActionKind {
        self.kinds[self.selected]
    }

    /// Whether a workflow started from this form is still running.
    pub fn is_busy(&self) -> bool {
        self.in_flight.is_some()
    }

    fn reset_fields(&mut self) {
        self.values = vec![String::new(); self.kind().fields().len()];
        self.focus = 0;
        self.error = None;
    }

    fn cycle(&mut self, forward: bool) {
        let len = self.kinds.len();
        self.selected = if forward {
            (self.selected + 1) % len
        } else {
            (self.selected + len - 1) % len
        };
        self.reset_fields();
    }

    fn label(&self, kind: ActionKind) -> &'static str {
        if kind == ActionKind::Approve && self.has_allowance {
            "Update Allowance"
        } else {
            kind.label()
        }
    }

    /// The spender typed into an approve form, used to aim the allowance read.
    pub fn spender_hint(&self) -> Option<Address> {
        if self.kind() != ActionKind::Approve {
            return None;
        }
        let input = self.values.first()?;
        calls::parse_address("spender", input).ok()
    }

    /// The request was accepted and now runs as workflow `id`.
    pub fn start(&mut self, id: WorkflowId) {
        self.in_flight = Some(id);
        self.error = None;
    }

    /// Validation failed. Reopen the form on the offending field.
    pub fn reject(&mut self, error: &InputError) {
        if let Some(i) = self.kind().fields().iter().position(|f| f.name == error.field) {
            self.focus = i;
        }
        self.error = Some(error.to_string());
        self.editing = true;
    }

    /// Release the form once its workflow is terminal. A success clears the inputs.
    pub fn on_workflow(&mut self, workflow: &TxWorkflow) {
        if self.in_flight != Some(workflow.id) || !workflow.state.is_terminal() {
            return;
        }
        self.in_flight = None;
        if let WorkflowState::Succeeded(_) = workflow.state {
            self.reset_fields();
        }
    }

    fn submit(&mut self) -> AppEvent {
        self.editing = false;
        AppEvent::SubmitAction(ActionRequest::from_fields(self.kind(), &self.values))
    }

    fn handle_editing_key(&mut self, key: KeyEvent) -> Option<AppEvent> {
        let len = self.values.len();
        match key.code {
            KeyCode::Esc => {
                self.editing = false;
                None
            }
            KeyCode::Enter => Some(self.submit()),
            KeyCode::Tab | KeyCode::Down => {
                self.focus = (self.focus + 1) % len;
                None
            }
            KeyCode::BackTab | KeyCode::Up => {
                self.focus = (self.focus + len - 1) % len;
                None
            }
            KeyCode::Backspace => {
                if let Some(value) = self.values.get_mut(self.focus) {
                    value.pop();
                }
                self.error = None;
                None
            }
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                if let Some(value) = self.values.get_mut(self.focus) {
                    value.push(c);
                }
                self.error = None;
                None
            }
            _ => None,
        }
    }
}

impl Component for ActionForm {
    fn handle_key(&mut self, key: KeyEvent) -> Option<AppEvent> {
        if self.editing {
            return self.handle_editing_key(key);
        }
        match key.code {
            KeyCode::Left | KeyCode::Char('h') if !self.is_busy() => {
                self.cycle(false);
                None
            }
            KeyCode::Right | KeyCode::Char('l') if !self.is_busy() => {
                self.cycle(true);
                None
            }
            KeyCode::Enter | KeyCode::Char('i') => {
                match self.in_flight {
                    Some(id) => self.error = Some(format!("Waiting for transaction #{id}")),
                    None => self.editing = true,
                }
                None
            }
            _ => None,
        }
    }

    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .title(format!(" {} ", self.title))
            .borders(Borders::ALL)
            .border_style(if self.editing {
                THEME.border_focused_style()
            } else {
                THEME.border_style()
            });

        let mut tabs = vec![Span::raw(" ")];
        for (i, kind) in self.kinds.iter().enumerate() {
            let style = if i == self.selected {
                THEME.selected_style()
            } else {
                THEME.muted_style()
            };
            tabs.push(Span::styled(format!(" {} ", self.label(*kind)), style));
            tabs.push(Span::raw(" "));
        }

        let mut lines = vec![Line::from(tabs), Line::from("")];
        for (i, (field, value)) in self.kind().fields().iter().zip(&self.values).enumerate() {
            let focused = self.editing && i == self.focus;
            let marker = if focused { " > " } else { "   " };
            let value_span = if value.is_empty() && !focused {
                Span::styled(field.placeholder, THEME.muted_style())
            } else if focused {
                Span::styled(format!("{value}_"), Style::default().fg(THEME.text))
            } else {
                Span::styled(value.clone(), Style::default().fg(THEME.text))
            };
            lines.push(Line::from(vec![
                Span::styled(marker, THEME.accent_style()),
                Span::styled(format!("{:<20}", field.label), THEME.muted_style()),
                value_span,
            ]));
        }
        lines.push(Line::from(""));

        let status = if let Some(id) = self.in_flight {
            Span::styled(
                format!("   Transaction #{id} in progress..."),
                THEME.accent_style(),
            )
        } else if let Some(ref err) = self.error {
            Span::styled(format!("   {err}"), THEME.warning_style())
        } else if self.editing {
            Span::styled(
                format!("   Enter: {}   Tab: next field   Esc: cancel", self.label(self.kind())),
                THEME.muted_style(),
            )
        } else {
            Span::styled("   Enter to fill in the form", THEME.muted_style())
        };
        lines.push(Line::from(status));

        frame.render_widget(Paragraph::new(lines).block(block), area);
    }
}
