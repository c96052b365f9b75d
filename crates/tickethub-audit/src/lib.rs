use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::error;

use tickethub_bus::EventListener;
use tickethub_core::{DomainEvent, DomainEventKind};

pub trait LogSink: Send + Sync {
    fn write(&self, line: &str) -> anyhow::Result<()>;
}

pub struct FileSink {
    file: Mutex<File>,
}

impl FileSink {
    pub fn open(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }
}

impl LogSink for FileSink {
    fn write(&self, line: &str) -> anyhow::Result<()> {
        let mut file = self.file.lock().expect("audit file poisoned");
        file.write_all(line.as_bytes())?;
        file.write_all(b"\n")?;
        Ok(())
    }
}

/// One self-contained JSON record per domain event. This is the durable form
/// of the otherwise ephemeral bus traffic.
#[derive(Debug, Serialize, Deserialize)]
pub struct AuditRecord {
    pub event: DomainEventKind,
    pub timestamp: DateTime<Utc>,
    pub data: serde_json::Value,
}

pub struct AuditLogger {
    sink: Arc<dyn LogSink>,
}

impl AuditLogger {
    pub fn new(sink: Arc<dyn LogSink>) -> Self {
        Self { sink }
    }
}

impl EventListener for AuditLogger {
    fn name(&self) -> &str {
        "audit-log"
    }

    fn on_event(&self, event: &DomainEvent) -> anyhow::Result<()> {
        let record = AuditRecord {
            event: event.kind,
            timestamp: event.occurred_at,
            data: event.payload.clone(),
        };

        let line = serde_json::to_string(&record)?;
        if let Err(err) = self.sink.write(&line) {
            // sink failures are logged, never propagated
            error!(kind = event.kind.as_str(), "audit write failed: {err:#}");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use tickethub_core::Booking;

    #[derive(Default)]
    struct MemorySink {
        lines: Mutex<Vec<String>>,
    }

    impl LogSink for MemorySink {
        fn write(&self, line: &str) -> anyhow::Result<()> {
            self.lines.lock().unwrap().push(line.to_string());
            Ok(())
        }
    }

    struct BrokenSink;

    impl LogSink for BrokenSink {
        fn write(&self, _line: &str) -> anyhow::Result<()> {
            anyhow::bail!("disk full")
        }
    }

    fn sample_booking() -> Booking {
        Booking {
            id: 3,
            event_id: 1,
            customer_id: 9,
        }
    }

    #[test]
    fn appends_one_json_record_per_event() {
        let sink = Arc::new(MemorySink::default());
        let logger = AuditLogger::new(sink.clone());

        let booking = sample_booking();
        logger
            .on_event(&DomainEvent::booking_created(&booking))
            .unwrap();
        logger
            .on_event(&DomainEvent::booking_cancelled(&booking))
            .unwrap();

        let lines = sink.lines.lock().unwrap();
        assert_eq!(lines.len(), 2);

        let record: AuditRecord = serde_json::from_str(&lines[0]).unwrap();
        assert_eq!(record.event, DomainEventKind::BookingCreated);
        let data: Booking = serde_json::from_value(record.data).unwrap();
        assert_eq!(data, booking);
    }

    #[test]
    fn sink_failure_is_swallowed() {
        let logger = AuditLogger::new(Arc::new(BrokenSink));
        let outcome = logger.on_event(&DomainEvent::event_updated(5));
        assert!(outcome.is_ok());
    }

    #[test]
    fn file_sink_appends_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs").join("events.log.json");

        let sink = FileSink::open(&path).unwrap();
        sink.write("{\"event\":\"booking.created\"}").unwrap();
        sink.write("{\"event\":\"booking.cancelled\"}").unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("booking.created"));
    }

    #[test]
    fn reopening_the_sink_keeps_existing_records() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.log.json");

        FileSink::open(&path)
            .unwrap()
            .write("{\"event\":\"event.updated\"}")
            .unwrap();
        FileSink::open(&path)
            .unwrap()
            .write("{\"event\":\"booking.created\"}")
            .unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents.lines().count(), 2);
    }
}
