pub mod bookings;
pub mod fallback;
pub mod health;
