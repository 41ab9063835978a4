use time::OffsetDateTime;

/// Output port for publishing domain events to connected clients.
pub trait EventPublisher<E>: Send + Sync + 'static {
    fn publish(&self, event: &E);
}

/// Timestamps are kept at whole-second precision. SQLite stores them as RFC 3339
/// text, which only orders correctly when every value has the same width.
#[must_use]
pub fn to_stored_precision(at: OffsetDateTime) -> OffsetDateTime {
    at.replace_nanosecond(0).unwrap_or(at)
}

/// Source of "now". Injected so date rules and the reminder window are testable.
pub trait Clock: Send + Sync + 'static {
    fn now(&self) -> OffsetDateTime;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> OffsetDateTime {
        to_stored_precision(OffsetDateTime::now_utc())
    }
}

/// Clock pinned to a single instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub OffsetDateTime);

impl Clock for FixedClock {
    fn now(&self) -> OffsetDateTime {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn stored_precision_drops_fractional_seconds() {
        assert_eq!(
            to_stored_precision(datetime!(2030-01-16 00:00:00.25 UTC)),
            datetime!(2030-01-16 00:00 UTC)
        );
        assert_eq!(
            to_stored_precision(datetime!(2030-01-16 23:59:59.999 UTC)),
            datetime!(2030-01-16 23:59:59 UTC)
        );
    }

    #[test]
    fn system_clock_reports_whole_seconds() {
        assert_eq!(SystemClock.now().nanosecond(), 0);
    }
}
