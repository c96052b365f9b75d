use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BookingError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: u64 },

    #[error("event {event_id} is sold out")]
    SoldOut { event_id: u64 },
}

impl BookingError {
    pub fn validation(message: impl Into<String>) -> Self {
        BookingError::Validation(message.into())
    }

    pub fn event_not_found(id: u64) -> Self {
        BookingError::NotFound { entity: "event", id }
    }

    pub fn booking_not_found(id: u64) -> Self {
        BookingError::NotFound {
            entity: "booking",
            id,
        }
    }
}
