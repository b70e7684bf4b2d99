use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc;

use crate::api::{ApiError, CancelToken, EquipmentService};
use crate::config::AppConfig;
use crate::form::{EquipmentForm, FormField};
use crate::model::EquipmentRecord;
use crate::notify::{DesktopNotifier, Notification, Notifier, ToastQueue};
use crate::page::{Effect, PageEvent, PageState, PageView};
use crate::theme::Theme;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Form,
    Listing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Popup {
    None,
    Help,
}

/// Result of a service call, tagged with the token it ran under
#[derive(Debug)]
pub enum Outcome {
    Fetched {
        activation: CancelToken,
        result: Result<Vec<EquipmentRecord>, ApiError>,
    },
    /// Submissions run under the page token, which only teardown cancels
    Submitted {
        page: CancelToken,
        result: Result<Option<EquipmentRecord>, ApiError>,
    },
}

pub struct App {
    pub focus: Focus,
    pub popup: Popup,

    // Equipment page
    pub page: PageState,
    pub selected: usize,
    pub form: EquipmentForm,
    pub submitting: bool,

    // Notifications
    pub toasts: ToastQueue,
    desktop: Option<DesktopNotifier>,

    // Presentation
    pub currency: String,
    pub theme: Theme,

    // Service plumbing
    service: Arc<dyn EquipmentService>,
    activation: CancelToken,
    page_scope: CancelToken,
    outcome_tx: mpsc::UnboundedSender<Outcome>,
    outcome_rx: mpsc::UnboundedReceiver<Outcome>,
}

impl App {
    pub fn new(config: &AppConfig, service: Arc<dyn EquipmentService>) -> Self {
        let (outcome_tx, outcome_rx) = mpsc::unbounded_channel();

        Self {
            focus: Focus::Form,
            popup: Popup::None,

            page: PageState::new(),
            selected: 0,
            form: EquipmentForm::new(),
            submitting: false,

            toasts: ToastQueue::new(),
            desktop: config.desktop_notifications.then_some(DesktopNotifier),

            currency: config.currency_symbol.clone(),
            theme: Theme::load(&config.theme),

            service,
            activation: CancelToken::new(),
            page_scope: CancelToken::new(),
            outcome_tx,
            outcome_rx,
        }
    }

    /// Mount the page: start the one listing fetch for this activation.
    /// Calling it again abandons the previous fetch; submissions keep running.
    pub fn activate(&mut self) {
        self.activation.cancel();
        self.activation = CancelToken::new();

        let effects = self.page.apply(PageEvent::FetchStarted);
        self.perform(effects);

        tracing::info!("Fetching equipment listings");
        let service = Arc::clone(&self.service);
        let activation = self.activation.clone();
        let tx = self.outcome_tx.clone();
        tokio::spawn(async move {
            let result = service.get_equipment(&activation).await;
            if matches!(result, Err(ApiError::Cancelled)) {
                return;
            }
            let _ = tx.send(Outcome::Fetched { activation, result });
        });
    }

    /// Tear the page down; late results are discarded
    pub fn teardown(&mut self) {
        self.activation.cancel();
        self.page_scope.cancel();
    }

    /// Validate the form and hand it to the listing service
    pub fn submit_form(&mut self) {
        if self.submitting {
            return;
        }
        let data = match self.form.submit() {
            Ok(data) => data,
            Err(e) => {
                tracing::debug!("Form rejected: {}", e);
                return;
            }
        };

        tracing::info!("Submitting equipment {}", data.name);
        self.submitting = true;
        let service = Arc::clone(&self.service);
        let page = self.page_scope.clone();
        let tx = self.outcome_tx.clone();
        tokio::spawn(async move {
            let result = service.add_equipment(data, &page).await;
            if matches!(result, Err(ApiError::Cancelled)) {
                return;
            }
            let _ = tx.send(Outcome::Submitted { page, result });
        });
    }

    /// Apply one finished service call, unless its token was cancelled
    fn apply_outcome(&mut self, outcome: Outcome) {
        let (token, event) = match outcome {
            Outcome::Fetched { activation, result } => (activation, PageEvent::Fetched(result)),
            Outcome::Submitted { page, result } => (page, PageEvent::Submitted(result)),
        };

        if token.is_cancelled() {
            tracing::debug!("Dropping result for a torn-down page");
            return;
        }
        if matches!(event, PageEvent::Submitted(_)) {
            self.submitting = false;
        }

        let effects = self.page.apply(event);
        self.perform(effects);
        self.clamp_selection();
    }

    /// Apply every outcome that has already arrived
    pub fn drain_outcomes(&mut self) {
        while let Ok(outcome) = self.outcome_rx.try_recv() {
            self.apply_outcome(outcome);
        }
    }

    /// Wait for the next outcome and apply it
    #[cfg(test)]
    pub async fn next_outcome(&mut self) {
        if let Some(outcome) = self.outcome_rx.recv().await {
            self.apply_outcome(outcome);
        }
    }

    fn perform(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::Notify(notification) => self.notify(&notification),
                Effect::ClearForm => self.form.clear(),
            }
        }
    }

    fn barter_selected(&mut self) {
        let effects = self.page.apply(PageEvent::BarterRequested(self.selected));
        self.perform(effects);
    }

    fn row_count(&self) -> usize {
        match self.page.view(&self.currency) {
            PageView::List(rows) => rows.len(),
            _ => 0,
        }
    }

    fn clamp_selection(&mut self) {
        let rows = self.row_count();
        if rows == 0 {
            self.selected = 0;
        } else if self.selected >= rows {
            self.selected = rows - 1;
        }
    }

    pub fn tick(&mut self) {
        self.drain_outcomes();
        self.toasts.prune_at(Instant::now());
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if self.popup == Popup::Help {
            if matches!(key.code, KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('h') | KeyCode::Enter | KeyCode::Char('q') | KeyCode::F(1)) {
                self.popup = Popup::None;
            }
            return;
        }

        match key.code {
            KeyCode::F(1) => self.popup = Popup::Help,
            KeyCode::Tab => {
                self.focus = match self.focus {
                    Focus::Form => Focus::Listing,
                    Focus::Listing => Focus::Form,
                };
            }
            _ => match self.focus {
                Focus::Form => self.handle_form_key(key),
                Focus::Listing => self.handle_listing_key(key),
            },
        }
    }

    fn handle_form_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::F(2) => self.submit_form(),
            KeyCode::Char('s') if key.modifiers.contains(KeyModifiers::CONTROL) => self.submit_form(),
            KeyCode::Esc => self.focus = Focus::Listing,
            KeyCode::Down | KeyCode::Enter => {
                // Enter on the last field submits
                if key.code == KeyCode::Enter && self.form.focus() == FormField::Owner {
                    self.submit_form();
                } else {
                    self.form.focus_next();
                }
            }
            KeyCode::Up | KeyCode::BackTab => self.form.focus_prev(),
            KeyCode::Left if self.form.focus() == FormField::Condition => self.form.cycle_condition(false),
            KeyCode::Right if self.form.focus() == FormField::Condition => self.form.cycle_condition(true),
            KeyCode::Backspace => self.form.backspace(),
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => self.form.input(c),
            _ => {}
        }
    }

    fn handle_listing_key(&mut self, key: KeyEvent) {
        let rows = self.row_count();
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => {
                if rows > 0 {
                    self.selected = (self.selected + 1) % rows;
                }
            }
            KeyCode::Char('k') | KeyCode::Up => {
                if rows > 0 {
                    self.selected = self.selected.checked_sub(1).unwrap_or(rows - 1);
                }
            }
            KeyCode::Char(' ') | KeyCode::Enter | KeyCode::Char('b') => {
                if rows > 0 {
                    self.barter_selected();
                }
            }
            KeyCode::Char('R') => self.activate(),
            KeyCode::Char('n') | KeyCode::BackTab => self.focus = Focus::Form,
            KeyCode::Char('?') | KeyCode::Char('h') => self.popup = Popup::Help,
            _ => {}
        }
    }

    /// Whether `q` should quit rather than be typed into the form
    pub fn accepts_quit(&self) -> bool {
        self.popup == Popup::None && self.focus == Focus::Listing
    }
}

impl Notifier for App {
    fn notify(&mut self, notification: &Notification) {
        self.toasts.notify(notification);
        if let Some(desktop) = self.desktop.as_mut() {
            desktop.notify(notification);
        }
    }
}
