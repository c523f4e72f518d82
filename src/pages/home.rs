use std::fmt::Write;

use chrono::NaiveDate;

use crate::core::consultation::ConsultationStats;

pub fn view(setting_name: &str, stats: &ConsultationStats, today: NaiveDate) -> String {
    let mut out = String::new();
    writeln!(out, "== Welcome to the SENAR Portal ==").unwrap();
    if !setting_name.is_empty() {
        writeln!(out, "{}", setting_name).unwrap();
    }
    writeln!(out, "Today: {}", today.format("%-d %b %Y")).unwrap();
    writeln!(out).unwrap();

    if stats.total == 0 {
        writeln!(
            out,
            "There are currently no outstanding consultations for your school."
        )
        .unwrap();
    } else {
        writeln!(out, "Consultations").unwrap();
        writeln!(out, "  Total:               {}", stats.total).unwrap();
        writeln!(out, "  Due in next 7 days:  {}", stats.due_soon).unwrap();
        writeln!(out, "  Overdue:             {}", stats.overdue).unwrap();
    }
    out
}
