use chrono::NaiveDate;

/// Coerce a JSON value to a plain string.
///
/// Null becomes the empty string so downstream code never branches on
/// missing fields; everything else takes its usual string form.
pub fn as_string(v: &serde_json::Value) -> String {
    match v {
        serde_json::Value::Null => String::new(),
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Bool(b) => b.to_string(),
        serde_json::Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

/// Parse a due-date string down to a calendar day.
///
/// Accepts `YYYY-MM-DD` as well as datetime forms with a leading date
/// component (e.g. RFC 3339). Returns `None` for anything unparseable.
pub fn parse_due_date(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(d) = s.parse::<NaiveDate>() {
        return Some(d);
    }
    // Datetime forms: truncate to the date component.
    if let Some(prefix) = s.get(..10) {
        if let Ok(d) = prefix.parse::<NaiveDate>() {
            return Some(d);
        }
    }
    None
}

/// Status bucket for a consultation's due date, in badge precedence order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DueStatus {
    NoDueDate,
    Overdue,
    DueToday,
    DueSoon,
    AwaitingResponse,
}

impl DueStatus {
    pub fn label(&self) -> &'static str {
        match self {
            Self::NoDueDate => "No due date",
            Self::Overdue => "Overdue",
            Self::DueToday => "Due today",
            Self::DueSoon => "Due soon",
            Self::AwaitingResponse => "Awaiting response",
        }
    }
}

/// Classify a due date against `today` on whole calendar days.
pub fn due_status(due_date: &str, today: NaiveDate) -> DueStatus {
    let Some(due) = parse_due_date(due_date) else {
        return DueStatus::NoDueDate;
    };
    let diff = (due - today).num_days();
    if diff < 0 {
        DueStatus::Overdue
    } else if diff == 0 {
        DueStatus::DueToday
    } else if diff <= 7 {
        DueStatus::DueSoon
    } else {
        DueStatus::AwaitingResponse
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn as_string_null_is_empty() {
        assert_eq!(as_string(&serde_json::Value::Null), "");
    }

    #[test]
    fn as_string_passes_strings_through() {
        assert_eq!(as_string(&json!("IMP123")), "IMP123");
        assert_eq!(as_string(&json!("")), "");
    }

    #[test]
    fn as_string_converts_scalars() {
        assert_eq!(as_string(&json!(3301000)), "3301000");
        assert_eq!(as_string(&json!(2.5)), "2.5");
        assert_eq!(as_string(&json!(true)), "true");
    }

    #[test]
    fn parse_due_date_accepts_plain_and_datetime() {
        assert_eq!(parse_due_date("2024-06-01"), Some(day(2024, 6, 1)));
        assert_eq!(parse_due_date("2024-06-01T14:30:00Z"), Some(day(2024, 6, 1)));
        assert_eq!(parse_due_date(" 2024-06-01 "), Some(day(2024, 6, 1)));
    }

    #[test]
    fn parse_due_date_rejects_garbage() {
        assert_eq!(parse_due_date(""), None);
        assert_eq!(parse_due_date("soon"), None);
        assert_eq!(parse_due_date("01/06/2024"), None);
    }

    #[test]
    fn due_status_buckets_by_day_difference() {
        let today = day(2024, 6, 1);
        assert_eq!(due_status("2024-05-31", today), DueStatus::Overdue);
        assert_eq!(due_status("2024-01-01", today), DueStatus::Overdue);
        assert_eq!(due_status("2024-06-01", today), DueStatus::DueToday);
        assert_eq!(due_status("2024-06-02", today), DueStatus::DueSoon);
        assert_eq!(due_status("2024-06-08", today), DueStatus::DueSoon);
        assert_eq!(due_status("2024-06-09", today), DueStatus::AwaitingResponse);
        assert_eq!(due_status("nonsense", today), DueStatus::NoDueDate);
    }

    #[test]
    fn due_status_labels() {
        let today = day(2024, 6, 1);
        assert_eq!(due_status("2024-05-01", today).label(), "Overdue");
        assert_eq!(due_status("", today).label(), "No due date");
    }
}
