pub mod api;
pub mod booking;

pub use api::{ApiResponse, DbStatusReport, FieldError, HealthReport};
pub use booking::{Booking, BookingInput, NewBooking, ServiceType, ValidBooking};
