//! Reporting of pipeline outcomes.

use tracing::{error, info};

use super::{MirrorError, Mirrored, SkipReason};

/// Identifies the event an outcome belongs to.
#[derive(Debug, Clone, Copy)]
pub struct EventRef<'a> {
    pub event_id: &'a str,
    pub channel: Option<&'a str>,
    pub ts: &'a str,
}

/// Receives one semantic outcome per processed event.
pub trait MirrorReporter: Send + Sync {
    fn mirrored(&self, event: EventRef<'_>, mirrored: &Mirrored);

    fn skipped(&self, event: EventRef<'_>, reason: SkipReason);

    fn failed(&self, event: EventRef<'_>, error: &MirrorError);
}

/// Emits outcomes as structured `tracing` events.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReporter;

impl MirrorReporter for TracingReporter {
    fn mirrored(&self, event: EventRef<'_>, mirrored: &Mirrored) {
        info!(
            event_id = event.event_id,
            channel = event.channel,
            ts = event.ts,
            operation = mirrored.target.operation(),
            target = mirrored.target.id(),
            destination_id = %mirrored.destination_id,
            "Mirrored message"
        );
    }

    fn skipped(&self, event: EventRef<'_>, reason: SkipReason) {
        info!(
            event_id = event.event_id,
            channel = event.channel,
            ts = event.ts,
            reason = reason.as_str(),
            "Skipped message"
        );
    }

    fn failed(&self, event: EventRef<'_>, err: &MirrorError) {
        error!(
            event_id = event.event_id,
            channel = event.channel,
            ts = event.ts,
            error_kind = err.kind(),
            error = %err,
            "Failed to mirror message"
        );
    }
}
