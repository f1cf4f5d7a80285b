//! Field-level form state behind a provider seam, so validation and
//! assembly never need a rendering environment.

use std::collections::{BTreeMap, BTreeSet};

use rand::Rng;

/// Field identifiers, one per input of the intake form.
pub mod fields {
    pub const CLIENT_NAME: &str = "clientName";
    pub const CLIENT_PHONE: &str = "clientPhone";
    pub const CLIENT_EMAIL: &str = "clientEmail";
    pub const CLIENT_ADDRESS: &str = "clientAddress";

    pub const DEVICE_TYPE: &str = "deviceType";
    pub const DEVICE_BRAND: &str = "deviceBrand";
    pub const DEVICE_MODEL: &str = "deviceModel";
    pub const DEVICE_COLOR: &str = "deviceColor";
    pub const IMEI_NUMBER: &str = "imeiNumber";
    pub const SERIAL_NUMBER: &str = "serialNumber";
    pub const DEVICE_CONDITION: &str = "deviceCondition";

    pub const PROBLEM_DESCRIPTION: &str = "problemDescription";
    pub const REPAIR_TYPE: &str = "repairType";
    pub const URGENCY: &str = "urgency";
    pub const ESTIMATED_PRICE: &str = "estimatedPrice";
    pub const ESTIMATED_DURATION: &str = "estimatedDuration";
    pub const ADDITIONAL_NOTES: &str = "additionalNotes";
}

/// Number of wizard steps: client, device, repair + signature.
pub const STEP_COUNT: usize = 3;

/// Required fields per step. Steps are 1-based; an out-of-range step has
/// no requirements.
pub fn required_fields(step: usize) -> &'static [&'static str] {
    match step {
        1 => &[fields::CLIENT_NAME, fields::CLIENT_PHONE],
        2 => &[fields::DEVICE_TYPE, fields::DEVICE_BRAND, fields::DEVICE_MODEL],
        3 => &[
            fields::PROBLEM_DESCRIPTION,
            fields::REPAIR_TYPE,
            fields::ESTIMATED_PRICE,
        ],
        _ => &[],
    }
}

/// Visual validity state of a field. `Neutral` until a validation pass or a
/// blur touches the field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Marker {
    #[default]
    Neutral,
    Valid,
    Invalid,
}

/// Read/write surface over the form fields.
pub trait FormDataProvider {
    fn get_field(&self, id: &str) -> String;
    fn set_field(&mut self, id: &str, value: &str);
}

/// In-memory form: field values, per-field validity markers, and the
/// accessory check-set.
#[derive(Debug, Default)]
pub struct MemoryForm {
    values: BTreeMap<String, String>,
    markers: BTreeMap<String, Marker>,
    accessories: BTreeSet<String>,
}

impl MemoryForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn marker(&self, id: &str) -> Marker {
        self.markers.get(id).copied().unwrap_or_default()
    }

    pub fn set_marker(&mut self, id: &str, marker: Marker) {
        self.markers.insert(id.to_string(), marker);
    }

    pub fn set_accessory(&mut self, name: &str, checked: bool) {
        if checked {
            self.accessories.insert(name.to_string());
        } else {
            self.accessories.remove(name);
        }
    }

    pub fn accessories(&self) -> Vec<String> {
        self.accessories.iter().cloned().collect()
    }

    pub fn set_accessories(&mut self, names: &[String]) {
        self.accessories = names.iter().cloned().collect();
    }

    /// Full reset: values, markers, and accessories. Used on new-ticket.
    pub fn reset(&mut self) {
        self.values.clear();
        self.markers.clear();
        self.accessories.clear();
    }
}

impl FormDataProvider for MemoryForm {
    fn get_field(&self, id: &str) -> String {
        self.values.get(id).cloned().unwrap_or_default()
    }

    fn set_field(&mut self, id: &str, value: &str) {
        self.values.insert(id.to_string(), value.to_string());
    }
}

/// Generate a 15-digit stand-in IMEI. The real scanner integration lives in
/// the host shell; this is the demo code path.
pub fn random_imei() -> String {
    let mut rng = rand::thread_rng();
    (0..15).map(|_| char::from(b'0' + rng.gen_range(0..10))).collect()
}

/// Simulated IMEI scan: writes a generated IMEI into the IMEI field and
/// marks it valid, exactly as a successful scan would.
pub fn scan_imei(form: &mut MemoryForm) -> String {
    let imei = random_imei();
    form.set_field(fields::IMEI_NUMBER, &imei);
    form.set_marker(fields::IMEI_NUMBER, Marker::Valid);
    imei
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unset_field_reads_empty() {
        let form = MemoryForm::new();
        assert_eq!(form.get_field(fields::CLIENT_NAME), "");
        assert_eq!(form.marker(fields::CLIENT_NAME), Marker::Neutral);
    }

    #[test]
    fn test_reset_clears_values_markers_and_accessories() {
        let mut form = MemoryForm::new();
        form.set_field(fields::CLIENT_NAME, "Jean Martin");
        form.set_marker(fields::CLIENT_NAME, Marker::Valid);
        form.set_accessory("charger", true);

        form.reset();

        assert_eq!(form.get_field(fields::CLIENT_NAME), "");
        assert_eq!(form.marker(fields::CLIENT_NAME), Marker::Neutral);
        assert!(form.accessories().is_empty());
    }

    #[test]
    fn test_accessory_toggle() {
        let mut form = MemoryForm::new();
        form.set_accessory("charger", true);
        form.set_accessory("case", true);
        form.set_accessory("charger", false);
        assert_eq!(form.accessories(), vec!["case".to_string()]);
    }

    #[test]
    fn test_required_fields_cover_all_steps() {
        for step in 1..=STEP_COUNT {
            assert!(!required_fields(step).is_empty());
        }
        assert!(required_fields(0).is_empty());
        assert!(required_fields(4).is_empty());
    }

    #[test]
    fn test_scan_imei_fills_and_marks_field() {
        let mut form = MemoryForm::new();
        let imei = scan_imei(&mut form);
        assert_eq!(imei.len(), 15);
        assert!(imei.chars().all(|c| c.is_ascii_digit()));
        assert_eq!(form.get_field(fields::IMEI_NUMBER), imei);
        assert_eq!(form.marker(fields::IMEI_NUMBER), Marker::Valid);
    }
}
