use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tracing::{error, info};

use tickethub_bus::EventListener;
use tickethub_core::{Booking, DomainEvent, DomainEventKind, EntityStore, EventUpdatedPayload};

pub trait Notifier: Send + Sync {
    fn notify(&self, customer_id: u64, message: &str) -> anyhow::Result<()>;
}

/// Stand-in for the mail/push collaborator: notifications land in the log.
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, customer_id: u64, message: &str) -> anyhow::Result<()> {
        info!(customer = customer_id, "{message}");
        Ok(())
    }
}

enum Job {
    BookingConfirmation { booking: Booking },
    EventUpdateBroadcast { event_id: u64 },
    Flush(oneshot::Sender<()>),
}

/// Deferred work queue. Jobs are enqueued without blocking the caller and
/// drained FIFO by a single worker task, so jobs for the same booking or
/// event run in enqueue order. Failures are logged, never retried.
#[derive(Clone)]
pub struct BackgroundDispatcher {
    queue: mpsc::UnboundedSender<Job>,
}

impl BackgroundDispatcher {
    pub fn spawn(store: Arc<dyn EntityStore>, notifier: Arc<dyn Notifier>) -> Self {
        let (queue, jobs) = mpsc::unbounded_channel();
        tokio::spawn(run_worker(jobs, store, notifier));
        Self { queue }
    }

    pub fn schedule_booking_confirmation(&self, booking: Booking) {
        self.enqueue(Job::BookingConfirmation { booking });
    }

    pub fn schedule_event_update_broadcast(&self, event_id: u64) {
        self.enqueue(Job::EventUpdateBroadcast { event_id });
    }

    /// Resolves once every job enqueued before this call has run.
    pub async fn flush(&self) {
        let (ack, done) = oneshot::channel();
        self.enqueue(Job::Flush(ack));
        let _ = done.await;
    }

    fn enqueue(&self, job: Job) {
        if self.queue.send(job).is_err() {
            error!("dispatcher worker is gone, dropping job");
        }
    }
}

async fn run_worker(
    mut jobs: mpsc::UnboundedReceiver<Job>,
    store: Arc<dyn EntityStore>,
    notifier: Arc<dyn Notifier>,
) {
    while let Some(job) = jobs.recv().await {
        match job {
            Job::BookingConfirmation { booking } => {
                let message = format!(
                    "booking {} confirmed for event {}",
                    booking.id, booking.event_id
                );
                if let Err(err) = notifier.notify(booking.customer_id, &message) {
                    error!(booking = booking.id, "confirmation failed: {err:#}");
                }
            }
            Job::EventUpdateBroadcast { event_id } => {
                for booking in store.bookings_for_event(event_id).await {
                    let message = format!("event {event_id} was updated");
                    if let Err(err) = notifier.notify(booking.customer_id, &message) {
                        error!(
                            customer = booking.customer_id,
                            event = event_id,
                            "update notification failed: {err:#}"
                        );
                    }
                }
            }
            Job::Flush(ack) => {
                let _ = ack.send(());
            }
        }
    }
}

/// Bridges bus events onto the job queue so publishers never wait on
/// notification work.
pub struct DispatchListener {
    dispatcher: BackgroundDispatcher,
}

impl DispatchListener {
    pub fn new(dispatcher: BackgroundDispatcher) -> Self {
        Self { dispatcher }
    }
}

impl EventListener for DispatchListener {
    fn name(&self) -> &str {
        "background-dispatch"
    }

    fn on_event(&self, event: &DomainEvent) -> anyhow::Result<()> {
        match event.kind {
            DomainEventKind::BookingCreated => {
                let booking: Booking = serde_json::from_value(event.payload.clone())?;
                self.dispatcher.schedule_booking_confirmation(booking);
            }
            DomainEventKind::EventUpdated => {
                let payload: EventUpdatedPayload = serde_json::from_value(event.payload.clone())?;
                self.dispatcher
                    .schedule_event_update_broadcast(payload.event_id);
            }
            DomainEventKind::BookingCancelled => {}
        }

        Ok(())
    }
}
