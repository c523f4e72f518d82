use serde::Serialize;

use super::consultation::Consultation;

/// A required binary answer on the response form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum YesNo {
    Yes,
    No,
}

impl YesNo {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Yes => "Yes",
            Self::No => "No",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "Yes" => Some(Self::Yes),
            "No" => Some(Self::No),
            _ => None,
        }
    }
}

/// Fields of the consultation response form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseField {
    SuitableSetting,
    SuitableReasoning,
    AttendanceIncompatible,
    AttendanceReasoning,
    ProposedStartDate,
    BandingOrFunding,
    AdditionalInfo,
    ResponderName,
    ResponderRole,
}

impl ResponseField {
    pub fn label(&self) -> &'static str {
        match self {
            Self::SuitableSetting => "Is your setting suitable",
            Self::SuitableReasoning => "Reasoning (setting not suitable)",
            Self::AttendanceIncompatible => "Attendance incompatible",
            Self::AttendanceReasoning => "Reasoning (attendance incompatible)",
            Self::ProposedStartDate => "Proposed start date",
            Self::BandingOrFunding => "Banding / funding requested",
            Self::AdditionalInfo => "Additional info",
            Self::ResponderName => "Your name",
            Self::ResponderRole => "Your role",
        }
    }
}

/// Transient state of the consultation response form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResponseDraft {
    pub suitable_setting: Option<YesNo>,
    pub suitable_reasoning: String,
    pub attendance_incompatible: Option<YesNo>,
    pub attendance_reasoning: String,
    pub proposed_start_date: String,
    pub banding_or_funding: String,
    pub additional_info: String,
    pub responder_name: String,
    pub responder_role: String,
}

fn always(_: &ResponseDraft) -> bool {
    true
}

fn setting_unsuitable(d: &ResponseDraft) -> bool {
    d.suitable_setting == Some(YesNo::No)
}

fn attendance_flagged(d: &ResponseDraft) -> bool {
    d.attendance_incompatible == Some(YesNo::Yes)
}

fn placement_offered(d: &ResponseDraft) -> bool {
    d.suitable_setting == Some(YesNo::Yes) && d.attendance_incompatible == Some(YesNo::No)
}

/// Conditional requirements as (guard, required fields) pairs. A field is
/// required whenever its guard holds for the current draft.
static REQUIRED_FIELD_RULES: &[(fn(&ResponseDraft) -> bool, &[ResponseField])] = &[
    (
        always,
        &[
            ResponseField::SuitableSetting,
            ResponseField::AttendanceIncompatible,
            ResponseField::ResponderName,
            ResponseField::ResponderRole,
        ],
    ),
    (setting_unsuitable, &[ResponseField::SuitableReasoning]),
    (attendance_flagged, &[ResponseField::AttendanceReasoning]),
    (
        placement_offered,
        &[
            ResponseField::ProposedStartDate,
            ResponseField::BandingOrFunding,
            ResponseField::AdditionalInfo,
        ],
    ),
];

impl ResponseDraft {
    /// Current text of a field; unset binary choices read as blank.
    fn field_text(&self, field: ResponseField) -> &str {
        match field {
            ResponseField::SuitableSetting => {
                self.suitable_setting.map(|c| c.as_str()).unwrap_or("")
            }
            ResponseField::AttendanceIncompatible => {
                self.attendance_incompatible.map(|c| c.as_str()).unwrap_or("")
            }
            ResponseField::SuitableReasoning => &self.suitable_reasoning,
            ResponseField::AttendanceReasoning => &self.attendance_reasoning,
            ResponseField::ProposedStartDate => &self.proposed_start_date,
            ResponseField::BandingOrFunding => &self.banding_or_funding,
            ResponseField::AdditionalInfo => &self.additional_info,
            ResponseField::ResponderName => &self.responder_name,
            ResponseField::ResponderRole => &self.responder_role,
        }
    }

    /// Required fields currently blank, in rule order.
    pub fn missing_fields(&self) -> Vec<ResponseField> {
        let mut missing = Vec::new();
        for (guard, fields) in REQUIRED_FIELD_RULES {
            if !guard(self) {
                continue;
            }
            for &field in *fields {
                if self.field_text(field).trim().is_empty() && !missing.contains(&field) {
                    missing.push(field);
                }
            }
        }
        missing
    }

    pub fn is_complete(&self) -> bool {
        self.missing_fields().is_empty()
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Assemble the flow payload. Conditional fields are carried only when
    /// their guard holds; everything blank becomes an explicit null.
    pub fn build_payload(&self, consultation: &Consultation) -> ResponsePayload {
        let gated = |on: bool, value: &str| {
            if on { opt_string(value) } else { None }
        };
        ResponsePayload {
            suitable_setting: self.suitable_setting.map(|c| c.as_str().to_string()),
            suitable_reasoning: gated(setting_unsuitable(self), &self.suitable_reasoning),
            attendance_incompatible: self.attendance_incompatible.map(|c| c.as_str().to_string()),
            attendance_reasoning: gated(attendance_flagged(self), &self.attendance_reasoning),
            proposed_start_date: gated(placement_offered(self), &self.proposed_start_date),
            banding_or_funding: gated(placement_offered(self), &self.banding_or_funding),
            additional_info: gated(placement_offered(self), &self.additional_info),
            responder_name: opt_string(&self.responder_name),
            responder_role: opt_string(&self.responder_role),
            consultation: Some(ConsultationSnapshot::from(consultation)),
        }
    }
}

fn opt_string(s: &str) -> Option<String> {
    if s.is_empty() { None } else { Some(s.to_string()) }
}

/// `CONSULTATION_RESPONSE` envelope body.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponsePayload {
    pub suitable_setting: Option<String>,
    pub suitable_reasoning: Option<String>,
    pub attendance_incompatible: Option<String>,
    pub attendance_reasoning: Option<String>,
    pub proposed_start_date: Option<String>,
    pub banding_or_funding: Option<String>,
    pub additional_info: Option<String>,
    pub responder_name: Option<String>,
    pub responder_role: Option<String>,
    pub consultation: Option<ConsultationSnapshot>,
}

/// Snapshot of the consultation the response concerns, embedded in the
/// payload so the flow needs no lookup.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsultationSnapshot {
    pub id: Option<String>,
    pub impulse_id: Option<String>,
    pub forename: Option<String>,
    pub surname: Option<String>,
    pub setting_name: Option<String>,
    pub id_consult: Option<String>,
    pub phase_id: Option<String>,
    pub due_date: Option<String>,
}

impl From<&Consultation> for ConsultationSnapshot {
    fn from(c: &Consultation) -> Self {
        Self {
            id: opt_string(&c.id),
            impulse_id: opt_string(&c.impulse_id),
            forename: opt_string(&c.forename),
            surname: opt_string(&c.surname),
            setting_name: opt_string(&c.setting_name),
            id_consult: opt_string(&c.id_consult),
            phase_id: opt_string(&c.phase_id),
            due_date: opt_string(&c.due_date),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled_identity(draft: &mut ResponseDraft) {
        draft.responder_name = "A. Head".to_string();
        draft.responder_role = "SENCO".to_string();
    }

    fn consultation() -> Consultation {
        Consultation {
            id: "c1".to_string(),
            impulse_id: "IMP1".to_string(),
            forename: "Sam".to_string(),
            surname: "Taylor".to_string(),
            setting_name: "Hillcrest".to_string(),
            id_consult: "900".to_string(),
            phase_id: String::new(),
            due_date: "2024-06-01".to_string(),
        }
    }

    #[test]
    fn empty_draft_is_incomplete() {
        assert!(!ResponseDraft::default().is_complete());
    }

    #[test]
    fn unset_choice_invalidates_regardless_of_other_fields() {
        let mut draft = ResponseDraft::default();
        filled_identity(&mut draft);
        draft.attendance_incompatible = Some(YesNo::No);
        assert!(!draft.is_complete());
        assert!(draft.missing_fields().contains(&ResponseField::SuitableSetting));
    }

    #[test]
    fn unsuitable_setting_requires_reasoning() {
        let mut draft = ResponseDraft::default();
        filled_identity(&mut draft);
        draft.suitable_setting = Some(YesNo::No);
        draft.attendance_incompatible = Some(YesNo::No);
        assert!(!draft.is_complete());

        draft.suitable_reasoning = "No capacity in year group".to_string();
        assert!(draft.is_complete());
    }

    #[test]
    fn incompatible_attendance_requires_reasoning() {
        let mut draft = ResponseDraft::default();
        filled_identity(&mut draft);
        draft.suitable_setting = Some(YesNo::No);
        draft.suitable_reasoning = "x".to_string();
        draft.attendance_incompatible = Some(YesNo::Yes);
        assert!(!draft.is_complete());

        draft.attendance_reasoning = "Disruption to existing class".to_string();
        assert!(draft.is_complete());
    }

    #[test]
    fn placement_branch_requires_all_three_fields() {
        let mut draft = ResponseDraft::default();
        filled_identity(&mut draft);
        draft.suitable_setting = Some(YesNo::Yes);
        draft.attendance_incompatible = Some(YesNo::No);
        draft.proposed_start_date = "2024-09-01".to_string();
        draft.banding_or_funding = "Band C".to_string();
        assert!(!draft.is_complete());

        draft.additional_info = "Part-time start agreed".to_string();
        assert!(draft.is_complete());
    }

    #[test]
    fn whitespace_only_fields_count_as_blank() {
        let mut draft = ResponseDraft::default();
        draft.suitable_setting = Some(YesNo::Yes);
        draft.attendance_incompatible = Some(YesNo::Yes);
        draft.attendance_reasoning = "reason".to_string();
        draft.responder_name = "   ".to_string();
        draft.responder_role = "SENCO".to_string();
        assert!(draft.missing_fields().contains(&ResponseField::ResponderName));
    }

    #[test]
    fn payload_gates_conditional_fields() {
        let mut draft = ResponseDraft::default();
        filled_identity(&mut draft);
        draft.suitable_setting = Some(YesNo::Yes);
        draft.attendance_incompatible = Some(YesNo::No);
        draft.proposed_start_date = "2024-09-01".to_string();
        draft.banding_or_funding = "Band C".to_string();
        draft.additional_info = "AM sessions only".to_string();
        // Entered but not required in this branch: must not be sent.
        draft.suitable_reasoning = "stale text".to_string();

        let payload = draft.build_payload(&consultation());
        assert_eq!(payload.suitable_setting.as_deref(), Some("Yes"));
        assert_eq!(payload.suitable_reasoning, None);
        assert_eq!(payload.attendance_reasoning, None);
        assert_eq!(payload.proposed_start_date.as_deref(), Some("2024-09-01"));
        assert_eq!(payload.banding_or_funding.as_deref(), Some("Band C"));
        assert_eq!(payload.additional_info.as_deref(), Some("AM sessions only"));
        let snapshot = payload.consultation.unwrap();
        assert_eq!(snapshot.impulse_id.as_deref(), Some("IMP1"));
        assert_eq!(snapshot.phase_id, None);
    }

    #[test]
    fn payload_omits_placement_outside_offer_branch() {
        let mut draft = ResponseDraft::default();
        filled_identity(&mut draft);
        draft.suitable_setting = Some(YesNo::No);
        draft.suitable_reasoning = "Full".to_string();
        draft.attendance_incompatible = Some(YesNo::No);
        draft.proposed_start_date = "2024-09-01".to_string();

        let payload = draft.build_payload(&consultation());
        assert_eq!(payload.suitable_reasoning.as_deref(), Some("Full"));
        assert_eq!(payload.proposed_start_date, None);
        assert_eq!(payload.banding_or_funding, None);
        assert_eq!(payload.additional_info, None);
    }
}
