use std::fmt::Write;

use chrono::NaiveDate;

use crate::core::consultation::Consultation;
use crate::core::due::due_status;
use crate::core::response::{ResponseDraft, YesNo};

fn due_date_line(c: &Consultation, today: NaiveDate) -> String {
    let badge = due_status(&c.due_date, today).label();
    let date = if c.due_date.is_empty() { "—" } else { c.due_date.as_str() };
    format!("due {date} [{badge}]")
}

pub fn list_item(c: &Consultation, today: NaiveDate) -> String {
    format!(
        "  {:<6} {:<12} {:<24} {}",
        c.id,
        c.impulse_id,
        c.display_name(),
        due_date_line(c, today),
    )
}

pub fn list_view(items: &[Consultation], today: NaiveDate) -> String {
    let mut out = String::new();
    writeln!(out, "== Outstanding Consultations ==").unwrap();
    writeln!(
        out,
        "Select a consultation to respond. Your response will be submitted to SENAR."
    )
    .unwrap();
    writeln!(out).unwrap();

    if items.is_empty() {
        writeln!(out, "No outstanding consultations found.").unwrap();
    } else {
        for c in items {
            writeln!(out, "{}", list_item(c, today)).unwrap();
        }
    }
    writeln!(out).unwrap();
    writeln!(out, "Commands: open <id> | home | phase | reviews | logout | quit").unwrap();
    out
}

fn answer(choice: Option<YesNo>) -> &'static str {
    choice.map(|c| c.as_str()).unwrap_or("<unanswered>")
}

fn text_or_placeholder(value: &str) -> &str {
    if value.trim().is_empty() { "<blank>" } else { value }
}

pub fn form_view(
    consultation: &Consultation,
    draft: &ResponseDraft,
    submit_message: &str,
    submitting: bool,
    token_mode: bool,
) -> String {
    let mut out = String::new();
    writeln!(
        out,
        "== Responding for {} ==",
        consultation.display_name()
    )
    .unwrap();
    write!(out, "Impulse ID: {}", consultation.impulse_id).unwrap();
    if !consultation.id_consult.is_empty() {
        write!(out, " • Consultation ID: {}", consultation.id_consult).unwrap();
    }
    if consultation.is_phase_transfer() {
        write!(out, " • Phase: {}", consultation.phase()).unwrap();
    }
    writeln!(out).unwrap();
    writeln!(out).unwrap();

    writeln!(
        out,
        "1. Is your setting suitable for the child/young person?  {}",
        answer(draft.suitable_setting)
    )
    .unwrap();
    if draft.suitable_setting == Some(YesNo::No) {
        writeln!(
            out,
            "   Reasoning (required): {}",
            text_or_placeholder(&draft.suitable_reasoning)
        )
        .unwrap();
    }

    writeln!(
        out,
        "2. Would attendance be incompatible with efficient education of others?  {}",
        answer(draft.attendance_incompatible)
    )
    .unwrap();
    if draft.attendance_incompatible == Some(YesNo::Yes) {
        writeln!(
            out,
            "   Reasoning (required): {}",
            text_or_placeholder(&draft.attendance_reasoning)
        )
        .unwrap();
    }

    if draft.suitable_setting == Some(YesNo::Yes)
        && draft.attendance_incompatible == Some(YesNo::No)
    {
        writeln!(out, "3. Placement details").unwrap();
        writeln!(
            out,
            "   Proposed start date:        {}",
            text_or_placeholder(&draft.proposed_start_date)
        )
        .unwrap();
        writeln!(
            out,
            "   Banding / funding requested: {}",
            text_or_placeholder(&draft.banding_or_funding)
        )
        .unwrap();
        writeln!(
            out,
            "   Additional info:            {}",
            text_or_placeholder(&draft.additional_info)
        )
        .unwrap();
    }

    writeln!(
        out,
        "Responder: {} ({})",
        text_or_placeholder(&draft.responder_name),
        text_or_placeholder(&draft.responder_role)
    )
    .unwrap();

    if !submit_message.is_empty() {
        writeln!(out).unwrap();
        writeln!(out, "Submission error: {}", submit_message).unwrap();
    }
    writeln!(out).unwrap();
    if submitting {
        writeln!(out, "Submitting…").unwrap();
    } else {
        writeln!(
            out,
            "Commands: suitable yes|no | attendance yes|no | suitable-reason <text> | attendance-reason <text>"
        )
        .unwrap();
        writeln!(
            out,
            "          start <date> | banding <text> | info <text> | name <text> | role <text>"
        )
        .unwrap();
        let back = if token_mode { "" } else { " | back" };
        writeln!(out, "          submit | clear{back} | quit").unwrap();
    }
    out
}
