use std::fmt::Write;

use chrono::NaiveDate;

use crate::core::consultation::PhaseGroup;

use super::consultations::list_item;

pub fn view(groups: &[PhaseGroup], today: NaiveDate) -> String {
    let mut out = String::new();
    writeln!(out, "== Phase Transfer Consultations ==").unwrap();
    writeln!(out).unwrap();

    if groups.is_empty() {
        writeln!(
            out,
            "No outstanding phase transfer consultations found."
        )
        .unwrap();
    } else {
        for group in groups {
            writeln!(out, "{}", group.phase).unwrap();
            for c in &group.consultations {
                writeln!(out, "{}", list_item(c, today)).unwrap();
            }
            writeln!(out).unwrap();
        }
    }
    writeln!(out, "Commands: open <id> | home | consultations | reviews | logout | quit").unwrap();
    out
}
