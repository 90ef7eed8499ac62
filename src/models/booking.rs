use std::sync::LazyLock;

use chrono::{DateTime, Datelike, NaiveDate, SubsecRound, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::api::FieldError;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\S+@\S+\.\S+$").expect("email pattern compiles"));
static TIME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([01]\d|2[0-3]):([0-5]\d)$").expect("time pattern compiles"));

pub const NAME_MIN_CHARS: usize = 2;
pub const NAME_MAX_CHARS: usize = 50;
pub const NOTES_MAX_CHARS: usize = 500;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub email: String,
    pub date: DateTime<Utc>,
    pub time: String,
    pub service_type: ServiceType,
    #[serde(default)]
    pub notes: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceType {
    Consultation,
    Meeting,
    Support,
    Training,
}

impl ServiceType {
    pub const ALL: [ServiceType; 4] = [
        ServiceType::Consultation,
        ServiceType::Meeting,
        ServiceType::Support,
        ServiceType::Training,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceType::Consultation => "consultation",
            ServiceType::Meeting => "meeting",
            ServiceType::Support => "support",
            ServiceType::Training => "training",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == s)
    }
}

impl std::fmt::Display for ServiceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw request body for `POST /api/bookings`.
///
/// Every field is optional so that a missing field is reported as a
/// validation failure instead of a deserialization rejection.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingInput {
    pub name: Option<String>,
    pub email: Option<String>,
    pub date: Option<String>,
    pub time: Option<String>,
    pub service_type: Option<String>,
    pub notes: Option<String>,
}

/// Typed request body sent by the client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBooking {
    pub name: String,
    pub email: String,
    pub date: String,
    pub time: String,
    pub service_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// A booking that passed schema validation and may be persisted.
///
/// Only [`BookingInput::validate`] constructs one.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidBooking {
    pub(crate) name: String,
    pub(crate) email: String,
    pub(crate) date: DateTime<Utc>,
    pub(crate) time: String,
    pub(crate) service_type: ServiceType,
    pub(crate) notes: String,
}

impl BookingInput {
    /// Required fields that are absent or empty, in declaration order.
    pub fn missing_fields(&self) -> Vec<FieldError> {
        [
            ("name", &self.name),
            ("email", &self.email),
            ("date", &self.date),
            ("time", &self.time),
            ("serviceType", &self.service_type),
        ]
        .into_iter()
        .filter(|(_, value)| value.as_deref().map_or(true, str::is_empty))
        .map(|(field, _)| FieldError::new(field, format!("{field} is required")))
        .collect()
    }

    /// Checks every field and collects one error per failing field.
    pub fn validate(&self, now: DateTime<Utc>) -> Result<ValidBooking, Vec<FieldError>> {
        let mut errors = Vec::new();

        let name = self.name.as_deref().unwrap_or("").trim().to_string();
        let name_len = name.chars().count();
        if name.is_empty() {
            errors.push(FieldError::new("name", "Name is required"));
        } else if name_len < NAME_MIN_CHARS {
            errors.push(FieldError::new(
                "name",
                "Name must be at least 2 characters long",
            ));
        } else if name_len > NAME_MAX_CHARS {
            errors.push(FieldError::new("name", "Name cannot exceed 50 characters"));
        }

        let email = self
            .email
            .as_deref()
            .unwrap_or("")
            .trim()
            .to_lowercase();
        if email.is_empty() {
            errors.push(FieldError::new("email", "Email is required"));
        } else if !EMAIL_RE.is_match(&email) {
            errors.push(FieldError::new(
                "email",
                "Please enter a valid email address",
            ));
        }

        let date = match self.date.as_deref().map(str::trim).filter(|d| !d.is_empty()) {
            None => {
                errors.push(FieldError::new("date", "Date is required"));
                None
            }
            Some(raw) => match parse_date(raw) {
                None => {
                    errors.push(FieldError::new("date", "Date must be a valid date"));
                    None
                }
                Some(date) if date < now => {
                    errors.push(FieldError::new("date", "Date cannot be in the past"));
                    None
                }
                Some(date) => Some(date),
            },
        };

        let time = self.time.clone().unwrap_or_default();
        if time.is_empty() {
            errors.push(FieldError::new("time", "Time is required"));
        } else if !TIME_RE.is_match(&time) {
            errors.push(FieldError::new(
                "time",
                "Time must be in HH:MM format (24-hour)",
            ));
        }

        let service_type = match self.service_type.as_deref().unwrap_or("") {
            "" => {
                errors.push(FieldError::new("serviceType", "Service type is required"));
                None
            }
            raw => {
                let parsed = ServiceType::parse(raw);
                if parsed.is_none() {
                    errors.push(FieldError::new(
                        "serviceType",
                        "Service type must be one of: consultation, meeting, support, training",
                    ));
                }
                parsed
            }
        };

        let notes = self.notes.clone().unwrap_or_default();
        if notes.chars().count() > NOTES_MAX_CHARS {
            errors.push(FieldError::new(
                "notes",
                "Notes cannot exceed 500 characters",
            ));
        }

        match (date, service_type) {
            (Some(date), Some(service_type)) if errors.is_empty() => Ok(ValidBooking {
                name,
                email,
                date,
                time,
                service_type,
                notes,
            }),
            _ => Err(errors),
        }
    }
}

/// Accepts a calendar date (`YYYY-MM-DD`, midnight UTC) or an RFC 3339 timestamp.
/// The UTC year must fit the four-digit stored form.
pub fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    let parsed = match DateTime::parse_from_rfc3339(raw) {
        Ok(dt) => Some(dt.with_timezone(&Utc).trunc_subsecs(3)),
        Err(_) => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|dt| dt.and_utc()),
    };
    parsed.filter(|dt| (0..=9999).contains(&dt.year()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 10, 9, 0, 0).unwrap()
    }

    fn valid_input() -> BookingInput {
        BookingInput {
            name: Some("Ana Lee".to_string()),
            email: Some("ana@example.com".to_string()),
            date: Some("2026-03-11".to_string()),
            time: Some("14:30".to_string()),
            service_type: Some("meeting".to_string()),
            notes: None,
        }
    }

    fn failing_fields(input: &BookingInput) -> Vec<String> {
        input
            .validate(now())
            .unwrap_err()
            .into_iter()
            .map(|e| e.field)
            .collect()
    }

    #[test]
    fn test_valid_input_accepted() {
        let booking = valid_input().validate(now()).unwrap();
        assert_eq!(booking.name, "Ana Lee");
        assert_eq!(booking.email, "ana@example.com");
        assert_eq!(booking.date, Utc.with_ymd_and_hms(2026, 3, 11, 0, 0, 0).unwrap());
        assert_eq!(booking.time, "14:30");
        assert_eq!(booking.service_type, ServiceType::Meeting);
        assert_eq!(booking.notes, "");
    }

    #[test]
    fn test_name_and_email_normalized() {
        let mut input = valid_input();
        input.name = Some("  Ana Lee  ".to_string());
        input.email = Some(" Ana@Example.COM ".to_string());
        let booking = input.validate(now()).unwrap();
        assert_eq!(booking.name, "Ana Lee");
        assert_eq!(booking.email, "ana@example.com");
    }

    #[test]
    fn test_name_length_bounds() {
        let mut input = valid_input();
        input.name = Some("A".to_string());
        assert_eq!(failing_fields(&input), vec!["name"]);

        input.name = Some("x".repeat(51));
        assert_eq!(failing_fields(&input), vec!["name"]);

        input.name = Some("x".repeat(50));
        assert!(input.validate(now()).is_ok());
    }

    #[test]
    fn test_whitespace_name_is_required_error() {
        let mut input = valid_input();
        input.name = Some("   ".to_string());
        let errors = input.validate(now()).unwrap_err();
        assert_eq!(errors[0].message, "Name is required");
    }

    #[test]
    fn test_invalid_email_rejected() {
        for bad in ["ana", "ana@example", "ana @example.com", "@.", "ana@.com x"] {
            let mut input = valid_input();
            input.email = Some(bad.to_string());
            assert_eq!(failing_fields(&input), vec!["email"], "accepted {bad:?}");
        }
    }

    #[test]
    fn test_past_date_rejected() {
        let mut input = valid_input();
        input.date = Some("2026-03-09".to_string());
        let errors = input.validate(now()).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "date");
        assert_eq!(errors[0].message, "Date cannot be in the past");
    }

    #[test]
    fn test_rfc3339_date_accepted() {
        let mut input = valid_input();
        input.date = Some("2026-03-10T09:30:00Z".to_string());
        let booking = input.validate(now()).unwrap();
        assert_eq!(booking.date, Utc.with_ymd_and_hms(2026, 3, 10, 9, 30, 0).unwrap());
    }

    #[test]
    fn test_unparsable_date_rejected() {
        let mut input = valid_input();
        input.date = Some("next tuesday".to_string());
        let errors = input.validate(now()).unwrap_err();
        assert_eq!(errors[0].field, "date");
        assert_eq!(errors[0].message, "Date must be a valid date");
    }

    #[test]
    fn test_date_past_year_9999_rejected() {
        // Local 9999-12-31 23:00 at -05:00 is already year 10000 in UTC.
        for raw in ["9999-12-31T23:00:00-05:00", "+10000-01-01"] {
            let mut input = valid_input();
            input.date = Some(raw.to_string());
            let errors = input.validate(now()).unwrap_err();
            assert_eq!(errors.len(), 1, "accepted {raw:?}");
            assert_eq!(errors[0].field, "date");
            assert_eq!(errors[0].message, "Date must be a valid date");
        }

        let mut input = valid_input();
        input.date = Some("9999-12-31".to_string());
        assert!(input.validate(now()).is_ok());
    }

    #[test]
    fn test_time_format() {
        for bad in ["24:00", "9:30", "12:60", "12-30", "12:30:00", " 12:30"] {
            let mut input = valid_input();
            input.time = Some(bad.to_string());
            assert_eq!(failing_fields(&input), vec!["time"], "accepted {bad:?}");
        }
        for good in ["00:00", "09:05", "19:59", "23:59"] {
            let mut input = valid_input();
            input.time = Some(good.to_string());
            assert!(input.validate(now()).is_ok(), "rejected {good:?}");
        }
    }

    #[test]
    fn test_unknown_service_type_lists_allowed_values() {
        let mut input = valid_input();
        input.service_type = Some("golf".to_string());
        let errors = input.validate(now()).unwrap_err();
        assert_eq!(errors[0].field, "serviceType");
        for allowed in ["consultation", "meeting", "support", "training"] {
            assert!(errors[0].message.contains(allowed));
        }
    }

    #[test]
    fn test_notes_length_bound() {
        let mut input = valid_input();
        input.notes = Some("n".repeat(500));
        assert_eq!(input.validate(now()).unwrap().notes.len(), 500);

        input.notes = Some("n".repeat(501));
        assert_eq!(failing_fields(&input), vec!["notes"]);
    }

    #[test]
    fn test_all_failures_reported() {
        let input = BookingInput {
            name: Some("A".to_string()),
            email: Some("nope".to_string()),
            date: Some("2020-01-01".to_string()),
            time: Some("99:99".to_string()),
            service_type: Some("golf".to_string()),
            notes: Some("n".repeat(600)),
        };
        assert_eq!(
            failing_fields(&input),
            vec!["name", "email", "date", "time", "serviceType", "notes"]
        );
    }

    #[test]
    fn test_missing_fields() {
        let input = BookingInput {
            name: Some("Ana Lee".to_string()),
            email: Some(String::new()),
            ..Default::default()
        };
        let missing: Vec<_> = input.missing_fields().into_iter().map(|e| e.field).collect();
        assert_eq!(missing, vec!["email", "date", "time", "serviceType"]);
        assert!(valid_input().missing_fields().is_empty());
    }

    #[test]
    fn test_booking_wire_format() {
        let booking = Booking {
            id: "b-1".to_string(),
            name: "Ana Lee".to_string(),
            email: "ana@example.com".to_string(),
            date: Utc.with_ymd_and_hms(2026, 3, 11, 0, 0, 0).unwrap(),
            time: "14:30".to_string(),
            service_type: ServiceType::Training,
            notes: String::new(),
            created_at: now(),
            updated_at: now(),
        };
        let json = serde_json::to_value(&booking).unwrap();
        assert_eq!(json["_id"], "b-1");
        assert_eq!(json["serviceType"], "training");
        assert!(json.get("createdAt").is_some());
        assert!(json.get("updatedAt").is_some());
    }
}
