use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use tickethub_core::{Booking, Event, EventPatch};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateEventRequest {
    pub title: String,
    pub date: DateTime<Utc>,
    pub available_tickets: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateEventRequest {
    pub title: Option<String>,
    pub date: Option<DateTime<Utc>>,
    pub available_tickets: Option<u32>,
}

impl UpdateEventRequest {
    pub fn into_patch(self) -> EventPatch {
        EventPatch {
            title: self.title,
            date: self.date,
            available_tickets: self.available_tickets,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventUpdatedResponse {
    pub message: String,
    pub event: Event,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookEventResponse {
    pub message: String,
    pub booking: Booking,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingCancelledResponse {
    pub message: String,
}
