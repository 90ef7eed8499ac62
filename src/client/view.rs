//! Terminal rendering of bookings.
//!
//! Pure string building; the `bookings` binary decides where output goes.

use std::fmt::Write;

use chrono::{DateTime, Utc};
use colored::{Color, ColoredString, Colorize};

use crate::models::{Booking, FieldError, ServiceType};

/// Badge color for a service type.
pub fn service_color(service_type: ServiceType) -> Color {
    match service_type {
        ServiceType::Consultation => Color::Blue,
        ServiceType::Meeting => Color::Green,
        ServiceType::Support => Color::Yellow,
        ServiceType::Training => Color::Magenta,
    }
}

/// `October 08, 2026`
pub fn format_date(date: &DateTime<Utc>) -> String {
    date.format("%B %d, %Y").to_string()
}

/// `Oct 08, 2026 14:30`
pub fn format_created(ts: &DateTime<Utc>) -> String {
    ts.format("%b %d, %Y %H:%M").to_string()
}

pub struct Renderer {
    color: bool,
}

impl Renderer {
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    fn paint(&self, text: &str, style: fn(&str) -> ColoredString) -> String {
        if self.color {
            style(text).to_string()
        } else {
            text.to_string()
        }
    }

    pub fn booking_list(&self, bookings: &[Booking]) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{}", self.paint("Bookings", |t| t.bold()));
        let _ = writeln!(out, "Manage all your appointments and meetings");
        let _ = writeln!(out);

        if bookings.is_empty() {
            let _ = writeln!(out, "{}", self.paint("No bookings yet", |t| t.bold()));
            let _ = writeln!(
                out,
                "Get started by creating your first booking with `bookings create`."
            );
            return out;
        }

        for booking in bookings {
            out.push_str(&self.booking_card(booking));
            out.push('\n');
        }
        let _ = writeln!(out, "{} booking(s)", bookings.len());
        out
    }

    pub fn booking_card(&self, booking: &Booking) -> String {
        let mut out = String::new();
        let badge = format!("[{}]", booking.service_type);
        let badge = if self.color {
            badge.color(service_color(booking.service_type)).to_string()
        } else {
            badge
        };
        let _ = writeln!(out, "{} {badge}", self.paint(&booking.name, |t| t.bold()));
        let _ = writeln!(out, "  {}", booking.email);
        let _ = writeln!(out, "  {}  {}", format_date(&booking.date), booking.time);
        if !booking.notes.is_empty() {
            let _ = writeln!(out, "  {}", booking.notes);
        }
        let _ = writeln!(
            out,
            "  {}",
            self.paint(
                &format!("Created: {}", format_created(&booking.created_at)),
                |t| t.dimmed()
            )
        );
        out
    }

    pub fn created(&self, booking: &Booking) -> String {
        format!(
            "Booking created successfully\n\n{}",
            self.booking_card(booking)
        )
    }

    pub fn error_state(&self, message: &str) -> String {
        self.paint(message, |t| t.red())
    }

    pub fn field_errors(&self, message: &str, errors: &[FieldError]) -> String {
        let mut out = self.error_state(message);
        for err in errors {
            let _ = write!(out, "\n  - {}: {}", err.field, err.message);
        }
        out
    }
}
