use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::due::{as_string, parse_due_date};

/// Phase-transfer groups in display order. Phases outside this set form
/// ad hoc groups after the known ones, in first-seen order.
pub const PHASE_ORDER: &[&str] = &["Reception", "Infants", "Juniors", "Secondary", "Post-16"];

/// An outstanding consultation issued to the school.
///
/// Every field is a plain string: absent upstream values normalize to the
/// empty string so rendering and payload code never deal with options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Consultation {
    pub id: String,
    pub impulse_id: String,
    pub forename: String,
    pub surname: String,
    pub setting_name: String,
    pub id_consult: String,
    pub phase_id: String,
    pub due_date: String,
}

impl Consultation {
    /// Build a consultation from one raw response object, normalizing every
    /// field. `id` is assigned by the caller (synthesized in list mode,
    /// token-derived in prefill mode).
    pub fn from_value(v: &serde_json::Value, id: String) -> Self {
        let field = |name: &str| as_string(v.get(name).unwrap_or(&serde_json::Value::Null));
        let id_consult = {
            let primary = field("idConsult");
            if primary.is_empty() { field("idConsultation") } else { primary }
        };
        Self {
            id,
            impulse_id: field("impulseId"),
            forename: field("forename"),
            surname: field("surname"),
            setting_name: field("settingName"),
            id_consult,
            phase_id: field("phaseId"),
            due_date: field("dueDate"),
        }
    }

    /// A blank phase id (after trimming) marks a standard consultation;
    /// anything else is a phase-transfer consultation.
    pub fn is_phase_transfer(&self) -> bool {
        !self.phase_id.trim().is_empty()
    }

    pub fn phase(&self) -> &str {
        self.phase_id.trim()
    }

    pub fn display_name(&self) -> String {
        format!("{} {}", self.forename, self.surname).trim().to_string()
    }
}

/// Phase-transfer consultations sharing one phase name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhaseGroup {
    pub phase: String,
    pub consultations: Vec<Consultation>,
}

/// The standard (non-phase-transfer) subset, in fetch order.
pub fn standard(items: &[Consultation]) -> Vec<Consultation> {
    items
        .iter()
        .filter(|c| !c.is_phase_transfer())
        .cloned()
        .collect()
}

/// Group phase-transfer consultations by trimmed phase name: known phases
/// first in `PHASE_ORDER`, then unrecognized phases in first-seen order.
pub fn phase_transfer_groups(items: &[Consultation]) -> Vec<PhaseGroup> {
    let transfers: Vec<&Consultation> = items.iter().filter(|c| c.is_phase_transfer()).collect();

    let mut groups: Vec<PhaseGroup> = Vec::new();
    let mut push_phase = |phase: &str| {
        let members: Vec<Consultation> = transfers
            .iter()
            .filter(|c| c.phase() == phase)
            .map(|c| (*c).clone())
            .collect();
        if !members.is_empty() {
            groups.push(PhaseGroup {
                phase: phase.to_string(),
                consultations: members,
            });
        }
    };

    for phase in PHASE_ORDER.iter().copied() {
        push_phase(phase);
    }
    let mut seen_ad_hoc: Vec<&str> = Vec::new();
    for c in &transfers {
        let phase = c.phase();
        if !PHASE_ORDER.contains(&phase) && !seen_ad_hoc.contains(&phase) {
            seen_ad_hoc.push(phase);
        }
    }
    for phase in seen_ad_hoc {
        push_phase(phase);
    }

    groups
}

/// Headline counts shown on the home screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ConsultationStats {
    pub total: usize,
    pub overdue: usize,
    pub due_soon: usize,
}

/// Aggregate counts over a consultation set.
///
/// `due_soon` spans `[today, today + 7 days]` inclusive, so an item due
/// today counts here as well as wearing the "Due today" badge.
pub fn stats(items: &[Consultation], today: NaiveDate) -> ConsultationStats {
    let week_out = today + chrono::Duration::days(7);
    let mut out = ConsultationStats {
        total: items.len(),
        ..ConsultationStats::default()
    };
    for c in items {
        let Some(due) = parse_due_date(&c.due_date) else {
            continue;
        };
        if due < today {
            out.overdue += 1;
        } else if due <= week_out {
            out.due_soon += 1;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn consultation(id: &str, phase_id: &str, due_date: &str) -> Consultation {
        Consultation {
            id: id.to_string(),
            impulse_id: format!("IMP-{}", id),
            forename: "Sam".to_string(),
            surname: "Taylor".to_string(),
            setting_name: "Hillcrest".to_string(),
            id_consult: String::new(),
            phase_id: phase_id.to_string(),
            due_date: due_date.to_string(),
        }
    }

    #[test]
    fn from_value_normalizes_missing_fields() {
        let c = Consultation::from_value(&json!({"impulseId": "IMP1"}), "c1".to_string());
        assert_eq!(c.id, "c1");
        assert_eq!(c.impulse_id, "IMP1");
        assert_eq!(c.forename, "");
        assert_eq!(c.phase_id, "");
        assert_eq!(c.due_date, "");
        assert!(!c.is_phase_transfer());
    }

    #[test]
    fn from_value_falls_back_to_id_consultation() {
        let c = Consultation::from_value(&json!({"idConsultation": 42}), "c1".to_string());
        assert_eq!(c.id_consult, "42");

        let both = json!({"idConsult": "A", "idConsultation": "B"});
        assert_eq!(Consultation::from_value(&both, "c2".to_string()).id_consult, "A");
    }

    #[test]
    fn blank_phase_is_standard() {
        assert!(!consultation("c1", "", "").is_phase_transfer());
        assert!(!consultation("c2", "   ", "").is_phase_transfer());
        assert!(consultation("c3", "Juniors", "").is_phase_transfer());
    }

    #[test]
    fn standard_subset_keeps_fetch_order() {
        let items = vec![
            consultation("c1", "", "2024-01-01"),
            consultation("c2", "Juniors", ""),
            consultation("c3", "", ""),
        ];
        let std_items = standard(&items);
        assert_eq!(std_items.len(), 2);
        assert_eq!(std_items[0].id, "c1");
        assert_eq!(std_items[1].id, "c3");
    }

    #[test]
    fn phase_groups_follow_fixed_order_then_ad_hoc() {
        let items = vec![
            consultation("c1", "Yr9 Entry", ""),
            consultation("c2", "Secondary", ""),
            consultation("c3", "Reception", ""),
            consultation("c4", " Reception ", ""),
            consultation("c5", "", ""),
        ];
        let groups = phase_transfer_groups(&items);
        let names: Vec<&str> = groups.iter().map(|g| g.phase.as_str()).collect();
        assert_eq!(names, vec!["Reception", "Secondary", "Yr9 Entry"]);
        assert_eq!(groups[0].consultations.len(), 2);
    }

    #[test]
    fn stats_count_overdue_and_due_soon() {
        let today = day(2024, 6, 1);
        let items = vec![
            consultation("c1", "", "2024-01-01"),
            consultation("c2", "", "2024-06-01"),
            consultation("c3", "", "2024-06-08"),
            consultation("c4", "", "2024-06-09"),
            consultation("c5", "", "not a date"),
        ];
        let s = stats(&items, today);
        assert_eq!(s.total, 5);
        assert_eq!(s.overdue, 1);
        // Day 0 and day 7 both count as due soon; day 8 and unparseable do not.
        assert_eq!(s.due_soon, 2);
    }

    #[test]
    fn overdue_standard_scenario() {
        let today = day(2024, 6, 1);
        let c = Consultation::from_value(
            &json!({"impulseId": "IMP1", "dueDate": "2024-01-01", "phaseId": ""}),
            "c1".to_string(),
        );
        assert!(!c.is_phase_transfer());
        assert_eq!(
            super::super::due::due_status(&c.due_date, today),
            super::super::due::DueStatus::Overdue
        );
    }

    #[test]
    fn due_soon_phase_transfer_scenario() {
        let today = day(2024, 6, 1);
        let c = Consultation::from_value(
            &json!({"impulseId": "IMP2", "phaseId": "Juniors", "dueDate": "2024-06-04"}),
            "c1".to_string(),
        );
        assert!(c.is_phase_transfer());
        let groups = phase_transfer_groups(std::slice::from_ref(&c));
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].phase, "Juniors");
        assert_eq!(
            super::super::due::due_status(&c.due_date, today),
            super::super::due::DueStatus::DueSoon
        );
    }
}
