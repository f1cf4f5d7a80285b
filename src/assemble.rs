//! Ticket assembly: a pure read of the current field state into the
//! domain records. No validation happens here; that is a separate,
//! prerequisite step.

use chrono::Local;

use crate::form::{fields, FormDataProvider, MemoryForm};
use crate::models::{
    ClientRecord, DeviceRecord, FormSnapshot, RepairRecord, SnapshotClient, SnapshotDevice,
    SnapshotRepair,
};

/// Split a full name on whitespace: first token is the first name, the
/// remainder the last name. A single token is used as both.
pub fn split_full_name(full: &str) -> (String, String) {
    let mut parts = full.split_whitespace();
    let first = parts.next().unwrap_or("").to_string();
    let rest: Vec<&str> = parts.collect();
    let last = if rest.is_empty() { first.clone() } else { rest.join(" ") };
    (first, last)
}

/// `parseFloat`-style price read: longest numeric prefix, or 0 when the
/// input has no leading number at all.
pub fn parse_price(raw: &str) -> f64 {
    let s = raw.trim();
    let mut end = 0;
    let mut seen_digit = false;
    let mut seen_dot = false;
    for (i, b) in s.bytes().enumerate() {
        match b {
            b'+' | b'-' if i == 0 => {}
            b'.' if !seen_dot => seen_dot = true,
            b'0'..=b'9' => seen_digit = true,
            _ => break,
        }
        end = i + 1;
    }
    if !seen_digit {
        return 0.0;
    }
    s[..end].parse().unwrap_or(0.0)
}

pub fn collect_client(form: &MemoryForm) -> ClientRecord {
    let full_name = form.get_field(fields::CLIENT_NAME).trim().to_string();
    let (first_name, last_name) = split_full_name(&full_name);
    ClientRecord {
        last_name,
        first_name,
        phone: form.get_field(fields::CLIENT_PHONE).trim().to_string(),
        email: form.get_field(fields::CLIENT_EMAIL).trim().to_string(),
        address: form.get_field(fields::CLIENT_ADDRESS).trim().to_string(),
    }
}

pub fn collect_device(form: &MemoryForm) -> DeviceRecord {
    let imei = form.get_field(fields::IMEI_NUMBER).trim().to_string();
    let serial = form.get_field(fields::SERIAL_NUMBER).trim().to_string();
    DeviceRecord {
        device_type: form.get_field(fields::DEVICE_TYPE).trim().to_string(),
        brand: form.get_field(fields::DEVICE_BRAND).trim().to_string(),
        model: form.get_field(fields::DEVICE_MODEL).trim().to_string(),
        color: form.get_field(fields::DEVICE_COLOR).trim().to_string(),
        imei_or_serial: if imei.is_empty() { serial } else { imei },
        condition: form.get_field(fields::DEVICE_CONDITION).trim().to_string(),
        accessories: form.accessories(),
    }
}

pub fn collect_repair(form: &MemoryForm) -> RepairRecord {
    RepairRecord {
        problem_description: form.get_field(fields::PROBLEM_DESCRIPTION).trim().to_string(),
        repair_type: form.get_field(fields::REPAIR_TYPE).trim().to_string(),
        urgency: form.get_field(fields::URGENCY).trim().to_string(),
        estimated_price: parse_price(&form.get_field(fields::ESTIMATED_PRICE)),
        estimated_duration: form.get_field(fields::ESTIMATED_DURATION).trim().to_string(),
        notes: form.get_field(fields::ADDITIONAL_NOTES).trim().to_string(),
    }
}

/// Raw snapshot of everything the form holds, for auto-save and the
/// export views. Field values are taken verbatim so a restore is lossless.
pub fn collect_form_data(form: &MemoryForm, client_number: &str) -> FormSnapshot {
    let now = Local::now();
    FormSnapshot {
        client: SnapshotClient {
            name: form.get_field(fields::CLIENT_NAME),
            phone: form.get_field(fields::CLIENT_PHONE),
            email: form.get_field(fields::CLIENT_EMAIL),
            address: form.get_field(fields::CLIENT_ADDRESS),
        },
        device: SnapshotDevice {
            device_type: form.get_field(fields::DEVICE_TYPE),
            brand: form.get_field(fields::DEVICE_BRAND),
            model: form.get_field(fields::DEVICE_MODEL),
            color: form.get_field(fields::DEVICE_COLOR),
            imei: form.get_field(fields::IMEI_NUMBER),
            serial: form.get_field(fields::SERIAL_NUMBER),
            condition: form.get_field(fields::DEVICE_CONDITION),
        },
        repair: SnapshotRepair {
            problem: form.get_field(fields::PROBLEM_DESCRIPTION),
            repair_type: form.get_field(fields::REPAIR_TYPE),
            urgency: form.get_field(fields::URGENCY),
            price: form.get_field(fields::ESTIMATED_PRICE),
            duration: form.get_field(fields::ESTIMATED_DURATION),
            accessories: form.accessories(),
            notes: form.get_field(fields::ADDITIONAL_NOTES),
        },
        client_number: client_number.to_string(),
        date: now.format("%d/%m/%Y").to_string(),
        time: now.format("%H:%M:%S").to_string(),
    }
}

/// Write a snapshot back into the form. The explicit, manual counterpart
/// of auto-save, never invoked automatically at startup.
pub fn restore_form_data(form: &mut MemoryForm, snapshot: &FormSnapshot) {
    form.set_field(fields::CLIENT_NAME, &snapshot.client.name);
    form.set_field(fields::CLIENT_PHONE, &snapshot.client.phone);
    form.set_field(fields::CLIENT_EMAIL, &snapshot.client.email);
    form.set_field(fields::CLIENT_ADDRESS, &snapshot.client.address);

    form.set_field(fields::DEVICE_TYPE, &snapshot.device.device_type);
    form.set_field(fields::DEVICE_BRAND, &snapshot.device.brand);
    form.set_field(fields::DEVICE_MODEL, &snapshot.device.model);
    form.set_field(fields::DEVICE_COLOR, &snapshot.device.color);
    form.set_field(fields::IMEI_NUMBER, &snapshot.device.imei);
    form.set_field(fields::SERIAL_NUMBER, &snapshot.device.serial);
    form.set_field(fields::DEVICE_CONDITION, &snapshot.device.condition);

    form.set_field(fields::PROBLEM_DESCRIPTION, &snapshot.repair.problem);
    form.set_field(fields::REPAIR_TYPE, &snapshot.repair.repair_type);
    form.set_field(fields::URGENCY, &snapshot.repair.urgency);
    form.set_field(fields::ESTIMATED_PRICE, &snapshot.repair.price);
    form.set_field(fields::ESTIMATED_DURATION, &snapshot.repair.duration);
    form.set_field(fields::ADDITIONAL_NOTES, &snapshot.repair.notes);
    form.set_accessories(&snapshot.repair.accessories);
}
