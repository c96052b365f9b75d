use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::Booking;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DomainEventKind {
    #[serde(rename = "booking.created")]
    BookingCreated,
    #[serde(rename = "booking.cancelled")]
    BookingCancelled,
    #[serde(rename = "event.updated")]
    EventUpdated,
}

impl DomainEventKind {
    pub const ALL: [DomainEventKind; 3] = [
        DomainEventKind::BookingCreated,
        DomainEventKind::BookingCancelled,
        DomainEventKind::EventUpdated,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DomainEventKind::BookingCreated => "booking.created",
            DomainEventKind::BookingCancelled => "booking.cancelled",
            DomainEventKind::EventUpdated => "event.updated",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainEvent {
    pub id: Uuid,
    pub kind: DomainEventKind,
    pub occurred_at: DateTime<Utc>,
    pub payload: serde_json::Value,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct EventUpdatedPayload {
    pub event_id: u64,
}

impl DomainEvent {
    fn new(kind: DomainEventKind, payload: serde_json::Value) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            occurred_at: Utc::now(),
            payload,
        }
    }

    pub fn booking_created(booking: &Booking) -> Self {
        Self::new(
            DomainEventKind::BookingCreated,
            serde_json::json!(booking),
        )
    }

    pub fn booking_cancelled(booking: &Booking) -> Self {
        Self::new(
            DomainEventKind::BookingCancelled,
            serde_json::json!(booking),
        )
    }

    pub fn event_updated(event_id: u64) -> Self {
        Self::new(
            DomainEventKind::EventUpdated,
            serde_json::json!(EventUpdatedPayload { event_id }),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_serializes_to_wire_names() {
        let json = serde_json::to_string(&DomainEventKind::BookingCreated).unwrap();
        assert_eq!(json, "\"booking.created\"");

        let kind: DomainEventKind = serde_json::from_str("\"event.updated\"").unwrap();
        assert_eq!(kind, DomainEventKind::EventUpdated);
    }

    #[test]
    fn booking_payload_round_trips() {
        let booking = Booking {
            id: 7,
            event_id: 3,
            customer_id: 12,
        };

        let event = DomainEvent::booking_created(&booking);
        assert_eq!(event.kind, DomainEventKind::BookingCreated);

        let decoded: Booking = serde_json::from_value(event.payload).unwrap();
        assert_eq!(decoded, booking);
    }

    #[test]
    fn event_updated_carries_event_id() {
        let event = DomainEvent::event_updated(42);
        let payload: EventUpdatedPayload = serde_json::from_value(event.payload).unwrap();
        assert_eq!(payload.event_id, 42);
    }
}
