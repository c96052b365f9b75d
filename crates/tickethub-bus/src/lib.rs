use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use tracing::error;

use tickethub_core::{DomainEvent, DomainEventKind};

pub trait EventListener: Send + Sync {
    fn name(&self) -> &str;
    fn on_event(&self, event: &DomainEvent) -> anyhow::Result<()>;
}

/// In-process publish/subscribe. Listeners run synchronously on the
/// publishing context, in registration order; a failing listener is logged
/// and skipped so the rest still run. Listeners must hand slow work to the
/// background dispatcher instead of blocking here.
#[derive(Default)]
pub struct NotificationBus {
    listeners: RwLock<HashMap<DomainEventKind, Vec<Arc<dyn EventListener>>>>,
}

impl NotificationBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, kind: DomainEventKind, listener: Arc<dyn EventListener>) {
        let mut listeners = self.listeners.write().expect("listener table poisoned");
        listeners.entry(kind).or_default().push(listener);
    }

    pub fn subscribe_all(&self, listener: Arc<dyn EventListener>) {
        for kind in DomainEventKind::ALL {
            self.subscribe(kind, Arc::clone(&listener));
        }
    }

    pub fn publish(&self, event: DomainEvent) {
        let listeners = {
            let table = self.listeners.read().expect("listener table poisoned");
            table.get(&event.kind).cloned().unwrap_or_default()
        };

        for listener in listeners {
            if let Err(err) = listener.on_event(&event) {
                error!(
                    listener = listener.name(),
                    kind = event.kind.as_str(),
                    "listener failed: {err:#}"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use tickethub_core::Booking;

    struct Recording {
        label: &'static str,
        seen: Arc<Mutex<Vec<&'static str>>>,
        fail: bool,
    }

    impl EventListener for Recording {
        fn name(&self) -> &str {
            self.label
        }

        fn on_event(&self, _event: &DomainEvent) -> anyhow::Result<()> {
            self.seen.lock().unwrap().push(self.label);
            if self.fail {
                anyhow::bail!("boom");
            }
            Ok(())
        }
    }

    fn booking_created() -> DomainEvent {
        DomainEvent::booking_created(&Booking {
            id: 1,
            event_id: 1,
            customer_id: 1,
        })
    }

    #[test]
    fn fans_out_in_registration_order() {
        let bus = NotificationBus::new();
        let seen = Arc::new(Mutex::new(Vec::new()));

        for label in ["first", "second", "third"] {
            bus.subscribe(
                DomainEventKind::BookingCreated,
                Arc::new(Recording {
                    label,
                    seen: Arc::clone(&seen),
                    fail: false,
                }),
            );
        }

        bus.publish(booking_created());
        assert_eq!(*seen.lock().unwrap(), vec!["first", "second", "third"]);
    }

    #[test]
    fn failing_listener_does_not_stop_the_rest() {
        let bus = NotificationBus::new();
        let seen = Arc::new(Mutex::new(Vec::new()));

        bus.subscribe(
            DomainEventKind::BookingCreated,
            Arc::new(Recording {
                label: "failing",
                seen: Arc::clone(&seen),
                fail: true,
            }),
        );
        bus.subscribe(
            DomainEventKind::BookingCreated,
            Arc::new(Recording {
                label: "surviving",
                seen: Arc::clone(&seen),
                fail: false,
            }),
        );

        bus.publish(booking_created());
        assert_eq!(*seen.lock().unwrap(), vec!["failing", "surviving"]);
    }

    #[test]
    fn delivers_only_to_matching_kind() {
        let bus = NotificationBus::new();
        let seen = Arc::new(Mutex::new(Vec::new()));

        bus.subscribe(
            DomainEventKind::EventUpdated,
            Arc::new(Recording {
                label: "updates-only",
                seen: Arc::clone(&seen),
                fail: false,
            }),
        );

        bus.publish(booking_created());
        assert!(seen.lock().unwrap().is_empty());

        bus.publish(DomainEvent::event_updated(1));
        assert_eq!(*seen.lock().unwrap(), vec!["updates-only"]);
    }

    #[test]
    fn subscribe_all_sees_every_kind() {
        let bus = NotificationBus::new();
        let seen = Arc::new(Mutex::new(Vec::new()));

        bus.subscribe_all(Arc::new(Recording {
            label: "audit",
            seen: Arc::clone(&seen),
            fail: false,
        }));

        let booking = Booking {
            id: 1,
            event_id: 1,
            customer_id: 1,
        };
        bus.publish(DomainEvent::booking_created(&booking));
        bus.publish(DomainEvent::booking_cancelled(&booking));
        bus.publish(DomainEvent::event_updated(1));

        assert_eq!(seen.lock().unwrap().len(), 3);
    }
}
