use chrono::{DateTime, Utc};

use crate::errors::AppError;
use crate::models::{Booking, BookingInput};
use crate::state::AppState;

/// Validates `input` and stores it.
///
/// Missing required fields are rejected before the schema or the store is
/// touched. `now` is the instant the booking date must not precede.
pub async fn create_booking(
    state: &AppState,
    input: BookingInput,
    now: DateTime<Utc>,
) -> Result<Booking, AppError> {
    let missing = input.missing_fields();
    if !missing.is_empty() {
        tracing::debug!(?missing, "booking rejected: missing fields");
        return Err(AppError::MissingFields(missing));
    }

    let valid = input.validate(now).map_err(|errors| {
        tracing::debug!(?errors, "booking rejected: validation failed");
        AppError::Validation(errors)
    })?;

    let booking = state.store.insert(valid).await.map_err(|e| {
        tracing::error!(error = %e, "error creating booking");
        AppError::Internal(e)
    })?;

    tracing::info!(booking_id = %booking.id, service_type = %booking.service_type, "booking created");
    Ok(booking)
}

pub async fn list_bookings(state: &AppState) -> Result<Vec<Booking>, AppError> {
    state.store.find_all().await.map_err(|e| {
        tracing::error!(error = %e, "error fetching bookings");
        AppError::Internal(e)
    })
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use async_trait::async_trait;
    use chrono::TimeZone;

    use super::*;
    use crate::config::{AppConfig, Environment};
    use crate::db::{self, BookingStore, DbStatus};
    use crate::models::ValidBooking;

    /// Counts inserts and always fails them.
    struct CountingStore {
        inserts: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl BookingStore for CountingStore {
        async fn insert(&self, _booking: ValidBooking) -> anyhow::Result<Booking> {
            self.inserts.fetch_add(1, Ordering::SeqCst);
            anyhow::bail!("disk full")
        }

        async fn find_all(&self) -> anyhow::Result<Vec<Booking>> {
            anyhow::bail!("connection reset")
        }

        async fn status(&self) -> DbStatus {
            DbStatus::Disconnected
        }
    }

    fn config() -> AppConfig {
        AppConfig {
            port: 3000,
            database_url: ":memory:".to_string(),
            environment: Environment::Development,
            cors_origins: vec![],
        }
    }

    fn counting_state() -> (AppState, Arc<AtomicUsize>) {
        let inserts = Arc::new(AtomicUsize::new(0));
        let state = AppState {
            store: Box::new(CountingStore {
                inserts: Arc::clone(&inserts),
            }),
            config: config(),
        };
        (state, inserts)
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 6, 1, 12, 0, 0).unwrap()
    }

    fn input() -> BookingInput {
        BookingInput {
            name: Some("Ana Lee".to_string()),
            email: Some("ana@example.com".to_string()),
            date: Some("2026-06-02".to_string()),
            time: Some("14:30".to_string()),
            service_type: Some("meeting".to_string()),
            notes: Some("first visit".to_string()),
        }
    }

    #[tokio::test]
    async fn test_create_returns_stored_record() {
        let state = AppState {
            store: Box::new(db::connect(":memory:").unwrap()),
            config: config(),
        };

        let booking = create_booking(&state, input(), now()).await.unwrap();
        assert!(!booking.id.is_empty());
        assert_eq!(booking.name, "Ana Lee");
        assert_eq!(booking.email, "ana@example.com");
        assert_eq!(booking.time, "14:30");
        assert_eq!(booking.notes, "first visit");

        let listed = list_bookings(&state).await.unwrap();
        assert_eq!(listed, vec![booking]);
    }

    #[tokio::test]
    async fn test_missing_field_never_reaches_store() {
        let (state, inserts) = counting_state();
        for strip in 0..5 {
            let mut input = input();
            match strip {
                0 => input.name = None,
                1 => input.email = Some(String::new()),
                2 => input.date = None,
                3 => input.time = None,
                _ => input.service_type = None,
            }
            let err = create_booking(&state, input, now()).await.unwrap_err();
            assert!(matches!(err, AppError::MissingFields(ref f) if f.len() == 1));
        }
        assert_eq!(inserts.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_invalid_input_never_reaches_store() {
        let (state, inserts) = counting_state();
        let mut input = input();
        input.email = Some("not-an-email".to_string());

        let err = create_booking(&state, input, now()).await.unwrap_err();
        match err {
            AppError::Validation(errors) => assert_eq!(errors[0].field, "email"),
            other => panic!("expected validation error, got {other:?}"),
        }
        assert_eq!(inserts.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_store_failure_is_internal() {
        let (state, inserts) = counting_state();
        let err = create_booking(&state, input(), now()).await.unwrap_err();
        assert!(matches!(err, AppError::Internal(_)));
        assert_eq!(inserts.load(Ordering::SeqCst), 1);

        let err = list_bookings(&state).await.unwrap_err();
        assert!(matches!(err, AppError::Internal(_)));
    }
}
