use std::fmt::Write;

use crate::core::review::{Recommendation, ReviewDraft};

fn text_or_placeholder(value: &str) -> &str {
    if value.trim().is_empty() { "<blank>" } else { value }
}

pub fn view(draft: &ReviewDraft, submit_message: &str, submitting: bool) -> String {
    let mut out = String::new();
    writeln!(out, "== Annual Review Submission ==").unwrap();
    writeln!(
        out,
        "Upload the review documentation and submit in one go (multi-file supported)."
    )
    .unwrap();
    writeln!(out).unwrap();

    writeln!(out, "  Impulse ID:            {}", text_or_placeholder(&draft.impulse_id)).unwrap();
    writeln!(out, "  Date of birth:         {}", text_or_placeholder(&draft.dob)).unwrap();
    writeln!(out, "  Date of annual review: {}", text_or_placeholder(&draft.review_date)).unwrap();
    writeln!(
        out,
        "  Recommendation:        {}",
        draft
            .recommendation
            .map(|r| r.as_str())
            .unwrap_or("<not selected>")
    )
    .unwrap();

    writeln!(out).unwrap();
    if draft.attachments.is_empty() {
        writeln!(out, "  Attachments: none (at least one required)").unwrap();
    } else {
        writeln!(out, "  Attachments:").unwrap();
        for (i, a) in draft.attachments.iter().enumerate() {
            writeln!(out, "    [{}] {} ({} bytes, {})", i, a.name, a.size, a.content_type)
                .unwrap();
        }
    }

    if !submit_message.is_empty() {
        writeln!(out).unwrap();
        writeln!(out, "Submission error: {}", submit_message).unwrap();
    }
    writeln!(out).unwrap();
    if submitting {
        writeln!(out, "Submitting…").unwrap();
    } else {
        let options = Recommendation::ALL
            .iter()
            .map(|r| r.as_str())
            .collect::<Vec<_>>()
            .join(" | ");
        writeln!(out, "Recommendation options: {}", options).unwrap();
        writeln!(
            out,
            "Commands: impulse <id> | dob <date> | review-date <date> | recommendation <option>"
        )
        .unwrap();
        writeln!(out, "          attach <path> | remove <index> | submit | home | quit").unwrap();
    }
    out
}
