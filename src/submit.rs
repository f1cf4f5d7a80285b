//! The submission pipeline.
//!
//! Runs only from the final step: re-validate, require a signature,
//! assemble and cross-check the records, then save: remotely when a
//! service is reachable, locally otherwise. Every failure past the
//! validation gates converges on the local fallback, so an operator who
//! got this far always ends up in the final-actions view with a ticket.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

use chrono::{Local, Utc};

use crate::assemble::{collect_client, collect_device, collect_repair};
use crate::canvas::StrokeCanvas;
use crate::error::AppError;
use crate::form::MemoryForm;
use crate::models::Ticket;
use crate::notifications::{NotificationService, Severity};
use crate::remote::{RemoteService, TicketPayload};
use crate::session::{Session, View};
use crate::validation::{validate_step, validate_ticket_data};

/// In-flight guard: a submission attempted while another is running is
/// rejected up front and performs no side effects.
#[derive(Debug, Default)]
pub struct SubmissionGuard {
    in_flight: AtomicBool,
}

impl SubmissionGuard {
    pub fn new() -> Self {
        Self::default()
    }

    fn try_begin(&self) -> bool {
        self.in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    fn finish(&self) {
        self.in_flight.store(false, Ordering::Release);
    }
}

/// Local fallback ticket number: `MRP` + the last 6 digits of a millisecond
/// timestamp.
pub fn local_ticket_number(now_millis: i64) -> String {
    let digits = now_millis.to_string();
    let tail = &digits[digits.len().saturating_sub(6)..];
    format!("MRP{tail}")
}

fn created_at_stamp() -> String {
    Local::now().format("%d/%m/%Y %H:%M:%S").to_string()
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|e| e.into_inner())
}

/// Run the full submission protocol. Returns `Ok(None)` when a validation
/// gate stopped it (the operator has already been notified), `Ok(Some)`
/// with the finished ticket otherwise.
///
/// `remote: None` is the designed offline fallback, not an error: callers
/// pass `None` when no service is configured or the environment reports
/// itself offline.
pub async fn generate_ticket(
    form: &Mutex<MemoryForm>,
    canvas: &Mutex<StrokeCanvas>,
    session: &Mutex<Session>,
    notifier: &NotificationService,
    remote: Option<&dyn RemoteService>,
    guard: &SubmissionGuard,
) -> Result<Option<Ticket>, AppError> {
    if !guard.try_begin() {
        notifier.notify("A submission is already in progress.", Severity::Warning);
        return Ok(None);
    }
    let result = run_pipeline(form, canvas, session, notifier, remote).await;
    guard.finish();
    result
}

async fn run_pipeline(
    form: &Mutex<MemoryForm>,
    canvas: &Mutex<StrokeCanvas>,
    session: &Mutex<Session>,
    notifier: &NotificationService,
    remote: Option<&dyn RemoteService>,
) -> Result<Option<Ticket>, AppError> {
    // Phase 1: gates and assembly, all under lock, nothing awaited.
    let prepared = {
        let mut form = lock(form);
        let mut session = lock(session);
        let canvas = lock(canvas);

        if !validate_step(&mut form, notifier, session.current_step) {
            return Ok(None);
        }

        if canvas.is_empty() {
            notifier.notify(AppError::SignatureMissing.to_string(), Severity::Error);
            return Ok(None);
        }

        let client = collect_client(&form);
        let device = collect_device(&form);
        let repair = collect_repair(&form);
        if !validate_ticket_data(&client, &device, &repair, notifier) {
            return Ok(None);
        }

        session.regenerate_client_number();
        notifier.notify_blocking("Saving in progress...");

        match canvas.to_data_url() {
            Ok(signature) => (TicketPayload { client, device, repair, signature }, None),
            // An unencodable signature takes the same recovery path as a
            // failed save: local ticket plus diagnostic.
            Err(e) => (
                TicketPayload { client, device, repair, signature: String::new() },
                Some(e),
            ),
        }
    };
    let (payload, encode_failure) = prepared;

    // Phase 2: the save attempt. `Ok(None)` is the offline branch.
    let attempt: Result<Option<String>, AppError> = match (encode_failure, remote) {
        (Some(e), _) => Err(e),
        (None, None) => Ok(None),
        (None, Some(remote)) => remote.save_repair(&payload).await.map(Some),
    };

    // Phase 3: ticket construction and outcome reporting.
    let ticket = match attempt {
        Ok(Some(ticket_number)) => {
            tracing::info!(%ticket_number, "ticket saved remotely");
            notifier.dismiss_blocking();
            notifier.notify("Ticket saved successfully!", Severity::Success);
            build_ticket(payload, ticket_number, None)
        }
        Ok(None) => {
            let ticket_number = local_ticket_number(Utc::now().timestamp_millis());
            tracing::info!(%ticket_number, "offline mode, ticket created locally");
            notifier.dismiss_blocking();
            notifier.notify(
                format!("Ticket created in offline mode: {ticket_number}"),
                Severity::Success,
            );
            build_ticket(payload, ticket_number, None)
        }
        Err(e) => {
            let ticket_number = local_ticket_number(Utc::now().timestamp_millis());
            tracing::warn!(%ticket_number, error = %e, "save failed, falling back to local ticket");
            notifier.dismiss_blocking();
            let mut message = format!("Connection failed. Ticket saved locally: {ticket_number}");
            if e.to_string().contains("HTTP") {
                message.push_str(&format!("\nServer error: {e}"));
            }
            notifier.notify(message, Severity::Warning);
            build_ticket(payload, ticket_number, Some(e.to_string()))
        }
    };

    let mut session = lock(session);
    session.current_ticket = Some(ticket.clone());
    session.view = View::FinalActions;

    Ok(Some(ticket))
}

fn build_ticket(payload: TicketPayload, ticket_number: String, error_info: Option<String>) -> Ticket {
    Ticket {
        client: payload.client,
        device: payload.device,
        repair: payload.repair,
        signature: payload.signature,
        ticket_number,
        created_at: created_at_stamp(),
        error_info,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_ticket_number_uses_last_six_digits() {
        assert_eq!(local_ticket_number(1754560000123), "MRP000123");
        assert_eq!(local_ticket_number(999), "MRP999");
    }

    #[test]
    fn test_guard_rejects_second_entry() {
        let guard = SubmissionGuard::new();
        assert!(guard.try_begin());
        assert!(!guard.try_begin());
        guard.finish();
        assert!(guard.try_begin());
    }
}
