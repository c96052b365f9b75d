pub mod error;
pub mod events;
pub mod models;
pub mod storage;

pub use error::BookingError;
pub use events::{DomainEvent, DomainEventKind, EventUpdatedPayload};
pub use models::{Booking, Event, EventPatch, NewEvent, Role, User};
pub use storage::EntityStore;
