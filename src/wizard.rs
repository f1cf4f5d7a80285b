//! Step navigation for the intake wizard.
//!
//! Forward movement is gated on the current step's validation; backward
//! movement never is. Transitions update the session's single step index,
//! which doubles as the progress-indicator position, and raise the
//! scroll-to-top signal for the host view.

use crate::form::{MemoryForm, STEP_COUNT};
use crate::notifications::NotificationService;
use crate::session::Session;
use crate::validation::validate_step;

/// Keyboard intents, as mapped from the host's key events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyInput {
    /// Ctrl+Enter: advance, or submit on the last step.
    Confirm,
    /// Escape: retreat one step.
    Cancel,
}

impl KeyInput {
    /// Map a raw key event to an intent. Unbound keys return `None`.
    pub fn from_key(key: &str, ctrl: bool) -> Option<Self> {
        match (key, ctrl) {
            ("Enter", true) => Some(Self::Confirm),
            ("Escape", _) => Some(Self::Cancel),
            _ => None,
        }
    }
}

/// What a key intent resolved to. `SubmitRequested` is handed back to the
/// caller because submission is asynchronous and lives in the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Advanced,
    Retreated,
    SubmitRequested,
    Ignored,
}

/// Move forward to `target`, permitted only if the current step validates.
/// Returns whether the transition happened.
pub fn advance(
    session: &mut Session,
    form: &mut MemoryForm,
    notifier: &NotificationService,
    target: usize,
) -> bool {
    if !validate_step(form, notifier, session.current_step) {
        return false;
    }
    show_step(session, target);
    true
}

/// Move backward to `target`. Always permitted, regardless of field state.
pub fn retreat(session: &mut Session, target: usize) {
    show_step(session, target);
}

fn show_step(session: &mut Session, target: usize) {
    tracing::debug!(from = session.current_step, to = target, "step transition");
    session.current_step = target;
    session.request_scroll();
}

/// Resolve a keyboard intent against the current step.
pub fn handle_key(
    session: &mut Session,
    form: &mut MemoryForm,
    notifier: &NotificationService,
    key: KeyInput,
) -> KeyAction {
    match key {
        KeyInput::Confirm => {
            if session.current_step < STEP_COUNT {
                let target = session.current_step + 1;
                if advance(session, form, notifier, target) {
                    KeyAction::Advanced
                } else {
                    KeyAction::Ignored
                }
            } else {
                KeyAction::SubmitRequested
            }
        }
        KeyInput::Cancel => {
            if session.current_step > 1 {
                retreat(session, session.current_step - 1);
                KeyAction::Retreated
            } else {
                KeyAction::Ignored
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::fields::*;
    use crate::form::FormDataProvider;

    fn filled_step1_form() -> MemoryForm {
        let mut form = MemoryForm::new();
        form.set_field(CLIENT_NAME, "Jean Martin");
        form.set_field(CLIENT_PHONE, "0612345678");
        form
    }

    #[test]
    fn test_advance_blocked_by_failed_validation() {
        let mut session = Session::new();
        let mut form = MemoryForm::new();
        let ok = advance(&mut session, &mut form, &NotificationService::new(), 2);
        assert!(!ok);
        assert_eq!(session.current_step, 1);
    }

    #[test]
    fn test_advance_moves_and_requests_scroll() {
        let mut session = Session::new();
        let mut form = filled_step1_form();
        assert!(advance(&mut session, &mut form, &NotificationService::new(), 2));
        assert_eq!(session.current_step, 2);
        assert!(session.take_scroll_request());
    }

    #[test]
    fn test_retreat_is_unconditional() {
        let mut session = Session::new();
        session.current_step = 3;
        // Empty form: validation would fail, retreat must not care.
        retreat(&mut session, 2);
        assert_eq!(session.current_step, 2);
    }

    #[test]
    fn test_confirm_advances_before_last_step() {
        let mut session = Session::new();
        let mut form = filled_step1_form();
        let action = handle_key(&mut session, &mut form, &NotificationService::new(), KeyInput::Confirm);
        assert_eq!(action, KeyAction::Advanced);
        assert_eq!(session.current_step, 2);
    }

    #[test]
    fn test_confirm_on_last_step_requests_submission() {
        let mut session = Session::new();
        session.current_step = STEP_COUNT;
        let mut form = MemoryForm::new();
        let action = handle_key(&mut session, &mut form, &NotificationService::new(), KeyInput::Confirm);
        assert_eq!(action, KeyAction::SubmitRequested);
        assert_eq!(session.current_step, STEP_COUNT);
    }

    #[test]
    fn test_cancel_ignored_on_first_step() {
        let mut session = Session::new();
        let mut form = MemoryForm::new();
        let action = handle_key(&mut session, &mut form, &NotificationService::new(), KeyInput::Cancel);
        assert_eq!(action, KeyAction::Ignored);
        assert_eq!(session.current_step, 1);
    }

    #[test]
    fn test_cancel_retreats_one_step() {
        let mut session = Session::new();
        session.current_step = 2;
        let mut form = MemoryForm::new();
        let action = handle_key(&mut session, &mut form, &NotificationService::new(), KeyInput::Cancel);
        assert_eq!(action, KeyAction::Retreated);
        assert_eq!(session.current_step, 1);
    }

    #[test]
    fn test_key_mapping() {
        assert_eq!(KeyInput::from_key("Enter", true), Some(KeyInput::Confirm));
        assert_eq!(KeyInput::from_key("Enter", false), None);
        assert_eq!(KeyInput::from_key("Escape", false), Some(KeyInput::Cancel));
        assert_eq!(KeyInput::from_key("a", true), None);
    }
}
