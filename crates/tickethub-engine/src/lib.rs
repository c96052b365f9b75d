use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use tracing::info;

use tickethub_bus::NotificationBus;
use tickethub_core::{
    Booking, BookingError, DomainEvent, EntityStore, Event, EventPatch, NewEvent,
};

/// The only writer of `Event.available_tickets` and `Booking` rows. All
/// check-then-mutate sequences for one event run under that event's mutex,
/// so a sold-out check can never interleave with another decrement.
pub struct BookingEngine {
    store: Arc<dyn EntityStore>,
    bus: Arc<NotificationBus>,
    event_locks: Mutex<HashMap<u64, Arc<Mutex<()>>>>,
}

impl BookingEngine {
    pub fn new(store: Arc<dyn EntityStore>, bus: Arc<NotificationBus>) -> Self {
        Self {
            store,
            bus,
            event_locks: Mutex::new(HashMap::new()),
        }
    }

    pub async fn create_event(
        &self,
        title: &str,
        date: DateTime<Utc>,
        available_tickets: u32,
    ) -> Result<Event, BookingError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(BookingError::validation("title is required"));
        }
        if available_tickets == 0 {
            return Err(BookingError::validation(
                "available_tickets must be positive",
            ));
        }

        let event = self
            .store
            .insert_event(NewEvent {
                title: title.to_string(),
                date,
                available_tickets,
            })
            .await;

        info!(event = event.id, tickets = available_tickets, "event created");
        Ok(event)
    }

    pub async fn update_event(&self, id: u64, patch: EventPatch) -> Result<Event, BookingError> {
        if let Some(title) = &patch.title {
            if title.trim().is_empty() {
                return Err(BookingError::validation("title must not be blank"));
            }
        }

        let lock = self.event_lock(id).await;
        let _guard = lock.lock().await;

        let event = self
            .store
            .update_event(id, patch)
            .await
            .ok_or(BookingError::event_not_found(id))?;

        self.bus.publish(DomainEvent::event_updated(event.id));
        info!(event = event.id, "event updated");
        Ok(event)
    }

    pub async fn list_events(&self) -> Vec<Event> {
        self.store.events().await
    }

    pub async fn book_event(
        &self,
        event_id: u64,
        customer_id: u64,
    ) -> Result<Booking, BookingError> {
        let lock = self.event_lock(event_id).await;
        let _guard = lock.lock().await;

        let event = self
            .store
            .event(event_id)
            .await
            .ok_or(BookingError::event_not_found(event_id))?;

        if event.available_tickets == 0 {
            return Err(BookingError::SoldOut { event_id });
        }

        self.store
            .update_event(
                event_id,
                EventPatch {
                    available_tickets: Some(event.available_tickets - 1),
                    ..EventPatch::default()
                },
            )
            .await;
        let booking = self.store.insert_booking(event_id, customer_id).await;

        self.bus.publish(DomainEvent::booking_created(&booking));
        info!(
            booking = booking.id,
            event = event_id,
            customer = customer_id,
            "booking created"
        );
        Ok(booking)
    }

    pub async fn cancel_booking(&self, booking_id: u64) -> Result<Booking, BookingError> {
        let booking = self
            .store
            .booking(booking_id)
            .await
            .ok_or(BookingError::booking_not_found(booking_id))?;

        let lock = self.event_lock(booking.event_id).await;
        let _guard = lock.lock().await;

        // re-check under the lock: a concurrent cancel may have won
        let booking = self
            .store
            .remove_booking(booking_id)
            .await
            .ok_or(BookingError::booking_not_found(booking_id))?;

        if let Some(event) = self.store.event(booking.event_id).await {
            self.store
                .update_event(
                    booking.event_id,
                    EventPatch {
                        available_tickets: Some(event.available_tickets + 1),
                        ..EventPatch::default()
                    },
                )
                .await;
        }

        self.bus.publish(DomainEvent::booking_cancelled(&booking));
        info!(booking = booking.id, event = booking.event_id, "booking cancelled");
        Ok(booking)
    }

    async fn event_lock(&self, event_id: u64) -> Arc<Mutex<()>> {
        let mut locks = self.event_locks.lock().await;
        Arc::clone(locks.entry(event_id).or_default())
    }
}
