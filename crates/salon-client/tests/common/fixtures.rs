//! Test fixtures and sample data

use serde_json::{Value, json};

/// Appointment payloads shaped like the backend's responses
pub struct AppointmentFixtures;

impl AppointmentFixtures {
    /// A booked appointment on `date` at `time`, created at `created_at`
    pub fn booked(id: i64, date: &str, time: &str, created_at: &str) -> Value {
        Self::with_status(id, "booked", date, time, created_at)
    }

    /// An appointment with an explicit status
    pub fn with_status(id: i64, status: &str, date: &str, time: &str, created_at: &str) -> Value {
        json!({
            "id": id,
            "client_name": format!("Client {id}"),
            "client_email": format!("client{id}@example.com"),
            "client_phone": "+1 555 0100",
            "service": 3,
            "service_details": {
                "id": 3,
                "name": "Gel Manicure",
                "description": "Classic gel manicure",
                "price": "45.00",
                "duration_minutes": 60,
                "category": "nails",
                "deposit_amount": "10.00",
                "requires_deposit": true
            },
            "stylist": null,
            "appointment_date": date,
            "appointment_time": time,
            "notes": null,
            "status": status,
            "payment_status": "pending",
            "created_at": created_at,
            "updated_at": created_at,
            "duration_minutes": 60,
            "total_amount": "45.00",
            "deposit_amount": "10.00",
            "can_cancel": true,
            "is_past_due": false
        })
    }

    /// A list page wrapping `results`
    pub fn page(results: Vec<Value>, count: u64, next: Option<String>) -> Value {
        json!({
            "count": count,
            "next": next,
            "previous": null,
            "results": results
        })
    }

    /// A single-page list holding every entry of `results`
    pub fn single_page(results: Vec<Value>) -> Value {
        let count = results.len() as u64;
        Self::page(results, count, None)
    }
}
