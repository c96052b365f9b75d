pub mod config;
pub mod contracts;

pub use config::ServiceConfig;
pub use contracts::{
    BookEventResponse, BookingCancelledResponse, CreateEventRequest, EventUpdatedResponse,
    HealthResponse, UpdateEventRequest,
};
