//! Per-ticket session state.
//!
//! One explicit object instead of ambient globals: the current wizard step,
//! the active view, the session client number, and the ticket once the
//! pipeline has produced one.

use chrono::Local;
use rand::Rng;

use crate::models::Ticket;

/// Which surface the operator currently sees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    #[default]
    Form,
    FinalActions,
}

#[derive(Debug, Default)]
pub struct Session {
    /// 1-based index of the step currently marked visible. Mutated only by
    /// the wizard transitions; exactly one step (and its progress marker)
    /// is active at any time by construction.
    pub current_step: usize,
    pub view: View,
    /// Session-scoped `RC…` identifier; not guaranteed globally unique.
    pub client_number: String,
    pub current_ticket: Option<Ticket>,
    scroll_requested: bool,
}

impl Session {
    /// Start a fresh session on step 1 with a newly generated client number.
    pub fn new() -> Self {
        Self {
            current_step: 1,
            view: View::Form,
            client_number: generate_client_number(),
            current_ticket: None,
            scroll_requested: false,
        }
    }

    /// New-ticket reset: back to step 1 and the form view, ticket dropped,
    /// client number regenerated.
    pub fn reset(&mut self) {
        self.current_step = 1;
        self.view = View::Form;
        self.client_number = generate_client_number();
        self.current_ticket = None;
        self.scroll_requested = false;
        tracing::debug!(client_number = %self.client_number, "session reset");
    }

    pub fn regenerate_client_number(&mut self) {
        self.client_number = generate_client_number();
    }

    pub fn request_scroll(&mut self) {
        self.scroll_requested = true;
    }

    /// Consume the pending scroll-to-top signal, if any.
    pub fn take_scroll_request(&mut self) -> bool {
        std::mem::take(&mut self.scroll_requested)
    }
}

/// `RC` + yymmdd + 3-digit random suffix. Collisions within a day are
/// possible and tolerated by the consuming system.
pub fn generate_client_number() -> String {
    let date = Local::now().format("%y%m%d");
    let suffix: u32 = rand::thread_rng().gen_range(0..1000);
    format!("RC{date}{suffix:03}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_number_shape() {
        let n = generate_client_number();
        assert_eq!(n.len(), 11);
        assert!(n.starts_with("RC"));
        assert!(n[2..].chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn test_new_session_starts_on_step_one() {
        let session = Session::new();
        assert_eq!(session.current_step, 1);
        assert_eq!(session.view, View::Form);
        assert!(session.current_ticket.is_none());
    }

    #[test]
    fn test_reset_regenerates_and_returns_to_form() {
        let mut session = Session::new();
        session.current_step = 3;
        session.view = View::FinalActions;

        session.reset();

        assert_eq!(session.current_step, 1);
        assert_eq!(session.view, View::Form);
        assert!(session.current_ticket.is_none());
        assert!(session.client_number.starts_with("RC"));
    }

    #[test]
    fn test_scroll_request_is_consumed_once() {
        let mut session = Session::new();
        session.request_scroll();
        assert!(session.take_scroll_request());
        assert!(!session.take_scroll_request());
    }
}
