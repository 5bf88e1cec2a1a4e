//! Monotonic id sequencing for catalog records.

use crate::errors::{Error, Result};
use crate::platforms::{Platform, PLATFORM_ID_PREFIX};
use crate::services::{Service, SERVICE_ID_PREFIX};

/// Numeric suffix of `id` after `prefix`, if it has one.
pub(crate) fn numeric_suffix(id: &str, prefix: &str) -> Option<u64> {
    id.strip_prefix(prefix)?.parse().ok()
}

pub(crate) fn platform_id(n: u64) -> String {
    format!("{}{}", PLATFORM_ID_PREFIX, n)
}

pub(crate) fn service_id(n: u64) -> String {
    format!("{}{}", SERVICE_ID_PREFIX, n)
}

/// The number `offset` places after `first`, failing once ids run out.
pub(crate) fn nth_after(first: u64, offset: usize, prefix: &str) -> Result<u64> {
    u64::try_from(offset)
        .ok()
        .and_then(|offset| first.checked_add(offset))
        .ok_or_else(|| exhausted(prefix))
}

fn exhausted(prefix: &str) -> Error {
    Error::invalid_input(format!("No '{}' ids left to issue", prefix))
}

/// Remembers the highest id issued by this repository instance.
///
/// The next id is always above both the stored maximum and the issued
/// maximum, so ids stay unique across deletes and process restarts.
#[derive(Debug, Default)]
pub(crate) struct IdSequencer {
    last_platform: u64,
    last_service: u64,
}

impl IdSequencer {
    /// Next platform number. Platform ids still referenced by services count
    /// as taken even when the platform record itself is gone.
    pub fn next_platform(&self, platforms: &[Platform], services: &[Service]) -> Result<u64> {
        let stored = platforms
            .iter()
            .filter_map(|p| numeric_suffix(&p.id, PLATFORM_ID_PREFIX))
            .chain(
                services
                    .iter()
                    .filter_map(|s| numeric_suffix(&s.platform_id, PLATFORM_ID_PREFIX)),
            )
            .max()
            .unwrap_or(0);
        nth_after(stored.max(self.last_platform), 1, PLATFORM_ID_PREFIX)
    }

    pub fn next_service(&self, services: &[Service]) -> Result<u64> {
        let stored = services
            .iter()
            .filter_map(|s| numeric_suffix(&s.id, SERVICE_ID_PREFIX))
            .max()
            .unwrap_or(0);
        nth_after(stored.max(self.last_service), 1, SERVICE_ID_PREFIX)
    }

    /// Marks every platform number up to `n` as issued.
    pub fn record_platform(&mut self, n: u64) {
        self.last_platform = self.last_platform.max(n);
    }

    pub fn record_service(&mut self, n: u64) {
        self.last_service = self.last_service.max(n);
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platforms::NewPlatform;
    use crate::services::NewService;
    use chrono::Utc;
    use rust_decimal_macros::dec;

    fn platform(id: &str) -> Platform {
        NewPlatform::new(id).into_platform(id.to_string(), Utc::now())
    }

    fn service(id: &str, platform_id: &str) -> Service {
        NewService::new("s", platform_id, dec!(1)).into_service(id.to_string(), Utc::now())
    }

    #[test]
    fn test_numeric_suffix() {
        assert_eq!(numeric_suffix("platform-12", PLATFORM_ID_PREFIX), Some(12));
        assert_eq!(numeric_suffix("platform-x", PLATFORM_ID_PREFIX), None);
        assert_eq!(numeric_suffix("instagram", PLATFORM_ID_PREFIX), None);
        assert_eq!(numeric_suffix("service-3", PLATFORM_ID_PREFIX), None);
    }

    #[test]
    fn test_first_ids_start_at_one() {
        let ids = IdSequencer::default();
        assert_eq!(ids.next_platform(&[], &[]).unwrap(), 1);
        assert_eq!(ids.next_service(&[]).unwrap(), 1);
    }

    #[test]
    fn test_next_id_follows_stored_maximum() {
        let ids = IdSequencer::default();
        let platforms = vec![platform("platform-3"), platform("instagram"), platform("platform-1")];
        assert_eq!(ids.next_platform(&platforms, &[]).unwrap(), 4);

        let services = vec![service("service-9", "platform-1"), service("service-2", "platform-1")];
        assert_eq!(ids.next_service(&services).unwrap(), 10);
    }

    #[test]
    fn test_referenced_platform_ids_are_taken() {
        let ids = IdSequencer::default();
        let services = vec![service("service-1", "platform-7")];
        assert_eq!(ids.next_platform(&[platform("platform-2")], &services).unwrap(), 8);
    }

    #[test]
    fn test_issued_ids_are_not_reused_after_delete() {
        let mut ids = IdSequencer::default();
        ids.record_platform(5);
        ids.record_service(11);
        assert_eq!(ids.next_platform(&[platform("platform-1")], &[]).unwrap(), 6);
        assert_eq!(ids.next_service(&[]).unwrap(), 12);

        ids.reset();
        assert_eq!(ids.next_platform(&[], &[]).unwrap(), 1);
    }
}
