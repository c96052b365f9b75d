use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use tickethub_core::{Booking, EntityStore, Event, EventPatch, NewEvent, User};

/// Ordered, ID-indexed in-memory tables. IDs come from dedicated counters so
/// they are never reused after a deletion.
#[derive(Default)]
pub struct InMemoryStore {
    events: RwLock<BTreeMap<u64, Event>>,
    bookings: RwLock<BTreeMap<u64, Booking>>,
    users: RwLock<BTreeMap<u64, User>>,
    next_event_id: AtomicU64,
    next_booking_id: AtomicU64,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_event_id(&self) -> u64 {
        self.next_event_id.fetch_add(1, Ordering::Relaxed) + 1
    }

    fn next_booking_id(&self) -> u64 {
        self.next_booking_id.fetch_add(1, Ordering::Relaxed) + 1
    }
}

#[async_trait]
impl EntityStore for InMemoryStore {
    async fn insert_event(&self, event: NewEvent) -> Event {
        let event = Event {
            id: self.next_event_id(),
            title: event.title,
            date: event.date,
            available_tickets: event.available_tickets,
        };

        let mut events = self.events.write().await;
        events.insert(event.id, event.clone());
        event
    }

    async fn event(&self, id: u64) -> Option<Event> {
        let events = self.events.read().await;
        events.get(&id).cloned()
    }

    async fn events(&self) -> Vec<Event> {
        let events = self.events.read().await;
        events.values().cloned().collect()
    }

    async fn update_event(&self, id: u64, patch: EventPatch) -> Option<Event> {
        let mut events = self.events.write().await;
        let event = events.get_mut(&id)?;
        patch.apply(event);
        Some(event.clone())
    }

    async fn insert_booking(&self, event_id: u64, customer_id: u64) -> Booking {
        let booking = Booking {
            id: self.next_booking_id(),
            event_id,
            customer_id,
        };

        let mut bookings = self.bookings.write().await;
        bookings.insert(booking.id, booking.clone());
        booking
    }

    async fn booking(&self, id: u64) -> Option<Booking> {
        let bookings = self.bookings.read().await;
        bookings.get(&id).cloned()
    }

    async fn remove_booking(&self, id: u64) -> Option<Booking> {
        let mut bookings = self.bookings.write().await;
        bookings.remove(&id)
    }

    async fn bookings(&self) -> Vec<Booking> {
        let bookings = self.bookings.read().await;
        bookings.values().cloned().collect()
    }

    async fn bookings_for_event(&self, event_id: u64) -> Vec<Booking> {
        let bookings = self.bookings.read().await;
        bookings
            .values()
            .filter(|booking| booking.event_id == event_id)
            .cloned()
            .collect()
    }

    async fn user(&self, id: u64) -> Option<User> {
        let users = self.users.read().await;
        users.get(&id).copied()
    }

    async fn upsert_user(&self, user: User) {
        let mut users = self.users.write().await;
        users.insert(user.id, user);
    }
}
