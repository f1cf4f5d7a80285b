//! Consumers of a finished intake: the printable label, the pre-filled
//! email draft, and the ticket-search flow that loads an existing record
//! back into the form.

use crate::error::AppError;
use crate::form::{fields, FormDataProvider, MemoryForm};
use crate::models::FormSnapshot;
use crate::notifications::{NotificationService, Severity};
use crate::remote::{RemoteService, RepairLookup};
use crate::session::Session;

fn or_placeholder(value: &str) -> &str {
    if value.is_empty() { "Not provided" } else { value }
}

/// Plain-text label for the thermal printer view.
pub fn label_text(data: &FormSnapshot) -> String {
    format!(
        "REPAIR INTAKE\n\
         {number}\n\
         Client:  {name}\n\
         Device:  {brand} {model}\n\
         IMEI:    {imei}\n\
         Repair:  {repair_type}\n\
         Date:    {date}\n\
         Price: {price} EUR\n",
        number = data.client_number,
        name = data.client.name,
        brand = data.device.brand,
        model = data.device.model,
        imei = data.device.imei,
        repair_type = data.repair.repair_type,
        date = data.date,
        price = data.repair.price,
    )
}

#[derive(Debug, Clone, PartialEq)]
pub struct EmailDraft {
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Build the recapitulative email for the client. Fails when no email
/// address is on file.
pub fn email_draft(data: &FormSnapshot) -> Result<EmailDraft, AppError> {
    if data.client.email.trim().is_empty() {
        return Err(AppError::Validation(
            "No client email address on file.".to_string(),
        ));
    }

    let accessories = if data.repair.accessories.is_empty() {
        "None".to_string()
    } else {
        data.repair.accessories.join(", ")
    };

    let body = format!(
        "Hello {name},\n\
         \n\
         Here is the summary of your repair intake:\n\
         \n\
         FILE NUMBER: {number}\n\
         DATE: {date} at {time}\n\
         \n\
         === CLIENT ===\n\
         Name: {name}\n\
         Phone: {phone}\n\
         Email: {email}\n\
         Address: {address}\n\
         \n\
         === DEVICE ===\n\
         Type: {device_type}\n\
         Brand: {brand}\n\
         Model: {model}\n\
         Color: {color}\n\
         IMEI/Serial: {imei}\n\
         Condition: {condition}\n\
         \n\
         === REPAIR ===\n\
         Problem: {problem}\n\
         Repair type: {repair_type}\n\
         Urgency: {urgency}\n\
         Estimated price: {price} EUR\n\
         Estimated duration: {duration}\n\
         Accessories: {accessories}\n\
         Notes: {notes}\n\
         \n\
         We will keep you informed of the repair's progress.\n\
         \n\
         Best regards,\n\
         The repair team\n",
        name = data.client.name,
        number = data.client_number,
        date = data.date,
        time = data.time,
        phone = data.client.phone,
        email = data.client.email,
        address = or_placeholder(&data.client.address),
        device_type = data.device.device_type,
        brand = data.device.brand,
        model = data.device.model,
        color = or_placeholder(&data.device.color),
        imei = data.device.imei,
        condition = or_placeholder(&data.device.condition),
        problem = data.repair.problem,
        repair_type = data.repair.repair_type,
        urgency = data.repair.urgency,
        price = data.repair.price,
        duration = data.repair.duration,
        accessories = accessories,
        notes = or_placeholder(&data.repair.notes),
    );

    Ok(EmailDraft {
        to: data.client.email.clone(),
        subject: format!("Repair intake {} - {}", data.client_number, data.client.name),
        body,
    })
}

/// Write a looked-up record back into the form fields.
pub fn fill_form(form: &mut MemoryForm, data: &RepairLookup) {
    form.set_field(fields::CLIENT_NAME, &data.client_name);
    form.set_field(fields::CLIENT_PHONE, &data.client_phone);
    form.set_field(fields::CLIENT_EMAIL, &data.client_email);
    form.set_field(fields::CLIENT_ADDRESS, &data.client_address);

    form.set_field(fields::DEVICE_TYPE, &data.device_type);
    form.set_field(fields::DEVICE_BRAND, &data.device_brand);
    form.set_field(fields::DEVICE_MODEL, &data.device_model);
    form.set_field(fields::IMEI_NUMBER, &data.device_imei);
    form.set_field(fields::DEVICE_COLOR, &data.device_color);

    form.set_field(fields::PROBLEM_DESCRIPTION, &data.repair_problem);
    form.set_field(fields::REPAIR_TYPE, &data.repair_type);
    form.set_field(fields::ESTIMATED_PRICE, &data.repair_price);
    form.set_field(fields::ESTIMATED_DURATION, &data.repair_duration);
}

/// Look up a ticket and load it into the form, returning to step 1.
/// Lookup failures are reported through the notifier, never propagated.
pub async fn search_ticket(
    remote: &dyn RemoteService,
    notifier: &NotificationService,
    form: &std::sync::Mutex<MemoryForm>,
    session: &std::sync::Mutex<Session>,
    ticket_number: &str,
) -> bool {
    notifier.notify_blocking("Searching...");

    match remote.get_repair(ticket_number).await {
        Ok(data) => {
            {
                let mut form = form.lock().unwrap_or_else(|e| e.into_inner());
                let mut session = session.lock().unwrap_or_else(|e| e.into_inner());
                fill_form(&mut form, &data);
                session.current_step = 1;
                session.request_scroll();
            }
            notifier.dismiss_blocking();
            notifier.notify("Ticket found and loaded!", Severity::Success);
            true
        }
        Err(e) => {
            notifier.dismiss_blocking();
            notifier.notify(format!("Error: {e}"), Severity::Error);
            false
        }
    }
}
