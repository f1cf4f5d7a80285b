//! Required-field and cross-record validation.
//!
//! A step validation is deliberately side-effecting: it re-marks every
//! required field of the step, valid and invalid alike, so the operator
//! always sees the current truth.

use crate::form::{required_fields, FormDataProvider, Marker, MemoryForm};
use crate::models::{ClientRecord, DeviceRecord, RepairRecord};
use crate::notifications::{NotificationService, Severity};

fn is_filled(form: &MemoryForm, id: &str) -> bool {
    !form.get_field(id).trim().is_empty()
}

/// Validate one step's required fields. Marks every required field of the
/// step, raises a single aggregate notice on failure, and returns the
/// overall verdict.
pub fn validate_step(form: &mut MemoryForm, notifier: &NotificationService, step: usize) -> bool {
    let mut ok = true;
    for id in required_fields(step) {
        let valid = is_filled(form, id);
        form.set_marker(id, if valid { Marker::Valid } else { Marker::Invalid });
        if !valid {
            ok = false;
        }
    }

    if !ok {
        notifier.notify("Please fill in all required fields.", Severity::Error);
    }

    ok
}

/// Passive re-validation on loss of focus: marks that field only.
pub fn field_blurred(form: &mut MemoryForm, id: &str) {
    let marker = if is_filled(form, id) { Marker::Valid } else { Marker::Invalid };
    form.set_marker(id, marker);
}

/// Relaxation on edit: a field marked invalid is promoted back to valid as
/// soon as a non-empty value is typed, without waiting for blur.
pub fn field_edited(form: &mut MemoryForm, id: &str) {
    if form.marker(id) == Marker::Invalid && is_filled(form, id) {
        form.set_marker(id, Marker::Valid);
    }
}

/// Cross-record checks run just before submission. Returns every failure,
/// not only the first.
pub fn check_ticket_data(
    client: &ClientRecord,
    device: &DeviceRecord,
    repair: &RepairRecord,
) -> Vec<String> {
    let mut errors = Vec::new();

    if client.last_name.is_empty() || client.first_name.is_empty() {
        errors.push("Client first and last name are required".to_string());
    }
    if client.phone.is_empty() {
        errors.push("Client phone number is required".to_string());
    }

    if device.device_type.is_empty() {
        errors.push("Device type is required".to_string());
    }
    if device.brand.is_empty() {
        errors.push("Device brand is required".to_string());
    }
    if device.model.is_empty() {
        errors.push("Device model is required".to_string());
    }

    if repair.problem_description.is_empty() {
        errors.push("Problem description is required".to_string());
    }
    if repair.repair_type.is_empty() {
        errors.push("Repair type is required".to_string());
    }
    if repair.estimated_price <= 0.0 {
        errors.push("Estimated price is required and must be greater than 0".to_string());
    }

    errors
}

/// Run the cross-record checks, aggregating all failure messages into one
/// notice. Returns true when the records are submittable.
pub fn validate_ticket_data(
    client: &ClientRecord,
    device: &DeviceRecord,
    repair: &RepairRecord,
    notifier: &NotificationService,
) -> bool {
    let errors = check_ticket_data(client, device, repair);
    if errors.is_empty() {
        return true;
    }
    notifier.notify(
        format!("Validation errors:\n{}", errors.join("\n")),
        Severity::Error,
    );
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::fields::*;

    fn valid_records() -> (ClientRecord, DeviceRecord, RepairRecord) {
        (
            ClientRecord {
                last_name: "Martin".into(),
                first_name: "Jean".into(),
                phone: "0612345678".into(),
                email: String::new(),
                address: String::new(),
            },
            DeviceRecord {
                device_type: "smartphone".into(),
                brand: "Acme".into(),
                model: "X1".into(),
                color: String::new(),
                imei_or_serial: "123456789012345".into(),
                condition: String::new(),
                accessories: vec![],
            },
            RepairRecord {
                problem_description: "screen cracked".into(),
                repair_type: "screen".into(),
                urgency: "normal".into(),
                estimated_price: 89.0,
                estimated_duration: String::new(),
                notes: String::new(),
            },
        )
    }

    #[test]
    fn test_validate_step_marks_every_required_field() {
        let mut form = MemoryForm::new();
        form.set_field(CLIENT_NAME, "Jean Martin");
        // phone left empty

        let ok = validate_step(&mut form, &NotificationService::new(), 1);

        assert!(!ok);
        assert_eq!(form.marker(CLIENT_NAME), Marker::Valid);
        assert_eq!(form.marker(CLIENT_PHONE), Marker::Invalid);
    }

    #[test]
    fn test_validate_step_rejects_whitespace_only() {
        let mut form = MemoryForm::new();
        form.set_field(CLIENT_NAME, "   ");
        form.set_field(CLIENT_PHONE, "0612345678");
        assert!(!validate_step(&mut form, &NotificationService::new(), 1));
        assert_eq!(form.marker(CLIENT_NAME), Marker::Invalid);
    }

    #[test]
    fn test_validate_step_passes_and_raises_no_notice() {
        let mut form = MemoryForm::new();
        form.set_field(CLIENT_NAME, "Jean Martin");
        form.set_field(CLIENT_PHONE, "0612345678");
        let notifier = NotificationService::new();
        assert!(validate_step(&mut form, &notifier, 1));
        assert!(notifier.notices().is_empty());
    }

    #[test]
    fn test_failed_validation_raises_single_aggregate_notice() {
        let mut form = MemoryForm::new();
        let notifier = NotificationService::new();
        validate_step(&mut form, &notifier, 2);
        assert_eq!(notifier.notices().len(), 1);
    }

    #[test]
    fn test_blur_marks_only_that_field() {
        let mut form = MemoryForm::new();
        field_blurred(&mut form, CLIENT_PHONE);
        assert_eq!(form.marker(CLIENT_PHONE), Marker::Invalid);
        assert_eq!(form.marker(CLIENT_NAME), Marker::Neutral);
    }

    #[test]
    fn test_edit_relaxes_invalid_marker_immediately() {
        let mut form = MemoryForm::new();
        field_blurred(&mut form, CLIENT_PHONE);
        assert_eq!(form.marker(CLIENT_PHONE), Marker::Invalid);

        form.set_field(CLIENT_PHONE, "0612345678");
        field_edited(&mut form, CLIENT_PHONE);
        assert_eq!(form.marker(CLIENT_PHONE), Marker::Valid);
    }

    #[test]
    fn test_edit_does_not_promote_still_empty_field() {
        let mut form = MemoryForm::new();
        field_blurred(&mut form, CLIENT_PHONE);
        field_edited(&mut form, CLIENT_PHONE);
        assert_eq!(form.marker(CLIENT_PHONE), Marker::Invalid);
    }

    #[test]
    fn test_edit_leaves_neutral_field_neutral() {
        let mut form = MemoryForm::new();
        form.set_field(CLIENT_NAME, "Jean");
        field_edited(&mut form, CLIENT_NAME);
        assert_eq!(form.marker(CLIENT_NAME), Marker::Neutral);
    }

    #[test]
    fn test_check_ticket_data_accepts_valid_records() {
        let (c, d, r) = valid_records();
        assert!(check_ticket_data(&c, &d, &r).is_empty());
    }

    #[test]
    fn test_price_zero_fails_with_dedicated_message() {
        let (c, d, mut r) = valid_records();
        r.estimated_price = 0.0;
        let errors = check_ticket_data(&c, &d, &r);
        assert_eq!(
            errors,
            vec!["Estimated price is required and must be greater than 0".to_string()]
        );
    }

    #[test]
    fn test_all_failures_are_aggregated() {
        let (_, d, r) = valid_records();
        let empty_client = ClientRecord {
            last_name: String::new(),
            first_name: String::new(),
            phone: String::new(),
            email: String::new(),
            address: String::new(),
        };
        let errors = check_ticket_data(&empty_client, &d, &r);
        assert_eq!(errors.len(), 2);

        let notifier = NotificationService::new();
        assert!(!validate_ticket_data(&empty_client, &d, &r, &notifier));
        assert_eq!(notifier.notices().len(), 1);
        assert!(notifier.notices()[0].message.contains("phone"));
    }
}
