use async_trait::async_trait;

use crate::models::{Booking, Event, EventPatch, NewEvent, User};

/// Entity tables backing the booking engine. Implementations hand out
/// snapshots; cross-call atomicity is owned by the engine's per-event lock.
#[async_trait]
pub trait EntityStore: Send + Sync {
    async fn insert_event(&self, event: NewEvent) -> Event;
    async fn event(&self, id: u64) -> Option<Event>;
    async fn events(&self) -> Vec<Event>;
    async fn update_event(&self, id: u64, patch: EventPatch) -> Option<Event>;

    async fn insert_booking(&self, event_id: u64, customer_id: u64) -> Booking;
    async fn booking(&self, id: u64) -> Option<Booking>;
    async fn remove_booking(&self, id: u64) -> Option<Booking>;
    async fn bookings(&self) -> Vec<Booking>;
    async fn bookings_for_event(&self, event_id: u64) -> Vec<Booking>;

    async fn user(&self, id: u64) -> Option<User>;
    async fn upsert_user(&self, user: User);
}
