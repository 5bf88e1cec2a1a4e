//! Tests for the catalog repository.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use rust_decimal_macros::dec;

use super::*;
use crate::errors::{Error, StorageError};
use crate::events::{ChangeBus, EntityKind, MockDomainEventSink};
use crate::platforms::{NewPlatform, Platform, PlatformType, PlatformUpdate};
use crate::pricing::PriceUnit;
use crate::services::{NewService, Service, ServiceUpdate};
use crate::settings::CatalogSettings;
use crate::storage::{KeyValueStore, MemoryKeyValueStore, PLATFORMS_KEY, SERVICES_KEY};
use crate::utils::time_utils::now_utc;

struct Fixture {
    store: Arc<MemoryKeyValueStore>,
    sink: Arc<MockDomainEventSink>,
    repo: CatalogRepository,
}

fn fixture() -> Fixture {
    fixture_with_store(MemoryKeyValueStore::new())
}

fn fixture_with_store(store: MemoryKeyValueStore) -> Fixture {
    let store = Arc::new(store);
    let sink = Arc::new(MockDomainEventSink::new());
    let repo = CatalogRepository::new(store.clone(), sink.clone());
    Fixture { store, sink, repo }
}

fn instagram() -> NewPlatform {
    NewPlatform {
        icon: Some("instagram".to_string()),
        color: Some("#E1306C".to_string()),
        active: Some(true),
        ..NewPlatform::new("Instagram")
    }
}

fn followers(platform_id: &str) -> NewService {
    NewService::new("Followers", platform_id, dec!(5.00)).with_quantities(100, 10_000)
}

fn raw(store: &MemoryKeyValueStore, key: &str) -> Option<String> {
    store.get(key).unwrap()
}

/// Memory store whose next `failing_reads` reads fail.
#[derive(Default)]
struct FlakyStore {
    inner: MemoryKeyValueStore,
    failing_reads: AtomicUsize,
}

impl FlakyStore {
    fn fail_next_reads(&self, count: usize) {
        self.failing_reads.store(count, Ordering::SeqCst);
    }
}

impl KeyValueStore for FlakyStore {
    fn get(&self, key: &str) -> std::result::Result<Option<String>, StorageError> {
        let failing = self
            .failing_reads
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failing {
            return Err(StorageError::Unavailable("database is locked".to_string()));
        }
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &str) -> std::result::Result<(), StorageError> {
        self.inner.set(key, value)
    }

    fn remove(&self, key: &str) -> std::result::Result<(), StorageError> {
        self.inner.remove(key)
    }

    fn set_many(&self, entries: &[(&str, String)]) -> std::result::Result<(), StorageError> {
        self.inner.set_many(entries)
    }
}

fn flaky_fixture() -> (Arc<FlakyStore>, Arc<MockDomainEventSink>, CatalogRepository) {
    let store = Arc::new(FlakyStore::default());
    let sink = Arc::new(MockDomainEventSink::new());
    let repo = CatalogRepository::new(store.clone(), sink.clone());
    (store, sink, repo)
}

// ==================== Scenarios ====================

#[test]
fn test_create_platform_then_service_scenario() {
    let f = fixture();

    let platform = f.repo.create_platform(instagram()).unwrap();
    assert_eq!(platform.id, "platform-1");
    assert_eq!(platform.slug, "instagram");
    assert_eq!(platform.platform_type, PlatformType::Social);

    let service = f.repo.create_service(followers("platform-1")).unwrap();
    assert_eq!(service.id, "service-1");
    assert!(service.active);

    let listed = f.repo.get_platform_services("platform-1");
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, "service-1");
}

#[test]
fn test_update_service_min_above_max_is_rejected() {
    let f = fixture();
    f.repo.create_platform(instagram()).unwrap();
    let before = f.repo.create_service(followers("platform-1")).unwrap();
    f.sink.clear();

    let update = ServiceUpdate {
        min_quantity: Some(20_000),
        ..Default::default()
    };
    let err = f.repo.update_service("service-1", update).unwrap_err();

    assert!(err.is_invalid_input());
    assert_eq!(f.repo.get_service("service-1"), Some(before));
    assert!(f.sink.is_empty());
}

#[test]
fn test_delete_platform_cascades_to_services() {
    let f = fixture();
    f.repo.create_platform(instagram()).unwrap();
    f.repo.create_service(followers("platform-1")).unwrap();

    let deletion = f.repo.delete_platform("platform-1").unwrap();

    assert_eq!(
        deletion,
        PlatformDeletion {
            removed_platform: 1,
            removed_services: 1
        }
    );
    assert!(f.repo.get_service("service-1").is_none());
    assert!(f
        .repo
        .list_services()
        .iter()
        .all(|s| s.platform_id != "platform-1"));
}

#[test]
fn test_duplicate_name_differs_only_in_case() {
    let f = fixture();
    f.repo.create_platform(NewPlatform::new("Instagram")).unwrap();

    let err = f
        .repo
        .create_platform(NewPlatform::new("instagram"))
        .unwrap_err();

    assert!(matches!(err, Error::DuplicateName(_)));
    assert_eq!(f.repo.list_platforms().len(), 1);
}

// ==================== Platforms ====================

#[test]
fn test_create_platform_with_empty_name_fails() {
    let f = fixture();
    let err = f.repo.create_platform(NewPlatform::new("   ")).unwrap_err();
    assert!(err.is_invalid_input());
    assert!(raw(&f.store, PLATFORMS_KEY).is_none());
    assert!(f.sink.is_empty());
}

#[test]
fn test_create_platform_fills_defaults() {
    let f = fixture();
    let mut input = NewPlatform::new("  My Network ");
    input.color = Some("not-a-color".to_string());

    let platform = f.repo.create_platform(input).unwrap();

    assert_eq!(platform.name, "My Network");
    assert_eq!(platform.slug, "my-network");
    assert_eq!(platform.icon, "globe");
    assert_eq!(platform.color, "#3b82f6");
    assert!(platform.active);
    assert_eq!(platform.created_at, platform.updated_at);
    assert_eq!(f.repo.get_platform(&platform.id), Some(platform));
}

#[test]
fn test_update_platform_merges_and_keeps_id() {
    let f = fixture();
    let created = f.repo.create_platform(instagram()).unwrap();

    let update = PlatformUpdate {
        active: Some(false),
        website: Some(Some("https://instagram.com".to_string())),
        ..Default::default()
    };
    let updated = f.repo.update_platform("platform-1", update).unwrap();

    assert_eq!(updated.id, created.id);
    assert_eq!(updated.name, "Instagram");
    assert_eq!(updated.color, "#E1306C");
    assert!(!updated.active);
    assert_eq!(updated.website.as_deref(), Some("https://instagram.com"));
    assert_eq!(updated.created_at, created.created_at);
    assert!(updated.updated_at >= created.updated_at);
    assert_eq!(f.repo.get_platform("platform-1"), Some(updated));
}

#[test]
fn test_update_platform_not_found() {
    let f = fixture();
    let err = f
        .repo
        .update_platform("platform-9", PlatformUpdate::default())
        .unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
    assert!(f.sink.is_empty());
}

#[test]
fn test_rename_checks_other_platforms_only() {
    let f = fixture();
    f.repo.create_platform(NewPlatform::new("Instagram")).unwrap();
    f.repo.create_platform(NewPlatform::new("Facebook")).unwrap();

    let clash = PlatformUpdate {
        name: Some("INSTAGRAM".to_string()),
        ..Default::default()
    };
    let err = f.repo.update_platform("platform-2", clash).unwrap_err();
    assert!(matches!(err, Error::DuplicateName(_)));

    let recase = PlatformUpdate {
        name: Some("INSTAGRAM".to_string()),
        ..Default::default()
    };
    let renamed = f.repo.update_platform("platform-1", recase).unwrap();
    assert_eq!(renamed.name, "INSTAGRAM");
}

#[test]
fn test_delete_platform_not_found() {
    let f = fixture();
    let err = f.repo.delete_platform("platform-1").unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
}

#[test]
fn test_delete_platform_without_services() {
    let f = fixture();
    f.repo.create_platform(instagram()).unwrap();
    let deletion = f.repo.delete_platform("platform-1").unwrap();
    assert_eq!(deletion.removed_services, 0);
    assert!(f.repo.list_platforms().is_empty());
}

// ==================== Services ====================

#[test]
fn test_create_service_with_unknown_platform_fails() {
    let f = fixture();
    f.repo.create_platform(instagram()).unwrap();
    let platforms_before = raw(&f.store, PLATFORMS_KEY);
    f.sink.clear();

    let err = f.repo.create_service(followers("platform-7")).unwrap_err();

    assert!(matches!(err, Error::InvalidPlatform(ref id) if id == "platform-7"));
    assert!(raw(&f.store, SERVICES_KEY).is_none());
    assert_eq!(raw(&f.store, PLATFORMS_KEY), platforms_before);
    assert!(f.sink.is_empty());
}

#[test]
fn test_create_service_with_empty_platform_id_fails() {
    let f = fixture();
    f.repo.create_platform(instagram()).unwrap();
    let err = f.repo.create_service(followers("")).unwrap_err();
    assert!(matches!(err, Error::InvalidPlatform(_)));
}

#[test]
fn test_create_service_validates_before_platform_lookup() {
    let f = fixture();
    let negative = NewService::new("Likes", "platform-1", dec!(-1));
    let err = f.repo.create_service(negative).unwrap_err();
    assert!(err.is_invalid_input());

    let inverted = NewService::new("Likes", "platform-1", dec!(1)).with_quantities(500, 100);
    assert!(f.repo.create_service(inverted).unwrap_err().is_invalid_input());
}

#[test]
fn test_create_service_defaults_quantities() {
    let f = fixture();
    f.repo.create_platform(instagram()).unwrap();
    let service = f
        .repo
        .create_service(NewService::new("Likes", "platform-1", dec!(3.5)))
        .unwrap();
    assert_eq!(service.min_quantity, 100);
    assert_eq!(service.max_quantity, 10_000);
}

#[test]
fn test_update_service_moves_to_existing_platform_only() {
    let f = fixture();
    f.repo.create_platform(instagram()).unwrap();
    f.repo.create_platform(NewPlatform::new("TikTok")).unwrap();
    f.repo.create_service(followers("platform-1")).unwrap();

    let to_missing = ServiceUpdate {
        platform_id: Some("platform-42".to_string()),
        ..Default::default()
    };
    let err = f.repo.update_service("service-1", to_missing).unwrap_err();
    assert!(matches!(err, Error::InvalidPlatform(_)));
    assert_eq!(f.repo.get_service("service-1").unwrap().platform_id, "platform-1");

    let to_tiktok = ServiceUpdate {
        platform_id: Some("platform-2".to_string()),
        price: Some(dec!(6.25)),
        description: Some(Some("Grow".to_string())),
        ..Default::default()
    };
    let moved = f.repo.update_service("service-1", to_tiktok).unwrap();
    assert_eq!(moved.platform_id, "platform-2");
    assert_eq!(moved.price, dec!(6.25));
    assert_eq!(moved.name, "Followers");
    assert_eq!(f.repo.list_services_for_platform("platform-2"), vec![moved]);
}

#[test]
fn test_update_and_delete_missing_service() {
    let f = fixture();
    let err = f
        .repo
        .update_service("service-1", ServiceUpdate::default())
        .unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
    assert!(matches!(
        f.repo.delete_service("service-1").unwrap_err(),
        Error::NotFound(_)
    ));
}

#[test]
fn test_delete_service_removes_only_that_service() {
    let f = fixture();
    f.repo.create_platform(instagram()).unwrap();
    f.repo.create_service(followers("platform-1")).unwrap();
    f.repo
        .create_service(NewService::new("Likes", "platform-1", dec!(3.5)))
        .unwrap();

    f.repo.delete_service("service-1").unwrap();

    let remaining: Vec<String> = f.repo.list_services().into_iter().map(|s| s.id).collect();
    assert_eq!(remaining, vec!["service-2"]);
    assert!(f.repo.get_platform("platform-1").is_some());
}

// ==================== Ids ====================

#[test]
fn test_ids_are_not_reused_after_delete() {
    let f = fixture();
    f.repo.create_platform(NewPlatform::new("A")).unwrap();
    f.repo.create_platform(NewPlatform::new("B")).unwrap();
    f.repo.delete_platform("platform-2").unwrap();

    let c = f.repo.create_platform(NewPlatform::new("C")).unwrap();
    assert_eq!(c.id, "platform-3");
}

#[test]
fn test_ids_continue_across_instances() {
    let f = fixture();
    f.repo.create_platform(instagram()).unwrap();
    f.repo.create_service(followers("platform-1")).unwrap();

    let reopened = CatalogRepository::new(f.store.clone(), f.sink.clone());
    let platform = reopened
        .create_platform(NewPlatform::new("Facebook"))
        .unwrap();
    let service = reopened
        .create_service(followers(&platform.id))
        .unwrap();

    assert_eq!(platform.id, "platform-2");
    assert_eq!(service.id, "service-2");
}

#[test]
fn test_platform_ids_referenced_by_services_are_skipped() {
    let f = fixture();
    f.store
        .set(
            SERVICES_KEY,
            r#"[{"id":"service-4","name":"Orphan","platformId":"platform-9","price":1.0,"minQuantity":1,"maxQuantity":2}]"#,
        )
        .unwrap();

    let platform = f.repo.create_platform(instagram()).unwrap();
    assert_eq!(platform.id, "platform-10");
}

#[test]
fn test_exhausted_platform_ids_fail_without_panicking() {
    let f = fixture();
    let last = NewPlatform::new("Last")
        .into_platform(format!("platform-{}", u64::MAX), now_utc());
    f.repo.save_platforms(&[last]).unwrap();
    let before = raw(&f.store, PLATFORMS_KEY);

    let err = f.repo.create_platform(NewPlatform::new("Next")).unwrap_err();

    assert!(err.is_invalid_input());
    assert_eq!(raw(&f.store, PLATFORMS_KEY), before);
}

#[test]
fn test_exhausted_service_ids_fail_without_panicking() {
    let f = fixture();
    f.repo.create_platform(instagram()).unwrap();
    let last = followers("platform-1")
        .into_service(format!("service-{}", u64::MAX), now_utc());
    f.repo.save_services(&[last]).unwrap();

    let err = f.repo.create_service(followers("platform-1")).unwrap_err();

    assert!(err.is_invalid_input());
    assert_eq!(f.repo.list_services().len(), 1);
}

// ==================== Projections ====================

#[test]
fn test_display_services_ignore_corrupted_storage() {
    let f = fixture();
    f.repo.create_platform(instagram()).unwrap();
    let hidden = f.repo.create_platform(NewPlatform::new("Hidden")).unwrap();
    f.repo
        .update_platform(
            &hidden.id,
            PlatformUpdate {
                active: Some(false),
                ..Default::default()
            },
        )
        .unwrap();
    f.repo.create_service(followers("platform-1")).unwrap();
    f.repo.create_service(followers(&hidden.id)).unwrap();

    // Inject a service whose platform does not exist.
    let mut services = f.repo.list_services();
    let mut orphan = services[0].clone();
    orphan.id = "service-99".to_string();
    orphan.platform_id = "platform-404".to_string();
    services.push(orphan);
    f.store
        .set(SERVICES_KEY, &serde_json::to_string(&services).unwrap())
        .unwrap();

    assert_eq!(f.repo.list_services().len(), 3);
    let shown: Vec<String> = f
        .repo
        .get_display_services()
        .into_iter()
        .map(|s| s.id)
        .collect();
    assert_eq!(shown, vec!["service-1"]);
    assert!(f.repo.get_platform_services(&hidden.id).is_empty());
    assert_eq!(f.repo.get_display_platforms().len(), 1);

    let catalog = f.repo.display_catalog();
    assert_eq!(catalog.platforms.len(), 1);
    assert_eq!(catalog.service_count(), 1);
}

#[test]
fn test_malformed_storage_reads_as_empty() {
    let f = fixture();
    f.store.set(PLATFORMS_KEY, "{not json").unwrap();
    f.store.set(SERVICES_KEY, "42").unwrap();

    assert!(f.repo.list_platforms().is_empty());
    assert!(f.repo.list_services().is_empty());
    assert!(f.repo.get_display_services().is_empty());

    let platform = f.repo.create_platform(instagram()).unwrap();
    assert_eq!(platform.id, "platform-1");
}

// ==================== Seeding ====================

#[test]
fn test_ensure_seeded_populates_empty_store() {
    let f = fixture();

    let outcome = f.repo.ensure_seeded().unwrap();

    assert_eq!(
        outcome,
        SeedOutcome {
            platforms_added: 5,
            services_added: 12
        }
    );
    let platforms = f.repo.list_platforms();
    assert_eq!(platforms[0].id, "platform-1");
    assert_eq!(platforms[0].name, "Instagram");
    assert_eq!(platforms[3].platform_type, PlatformType::Video);
    assert_eq!(f.repo.list_services_for_platform("platform-1").len(), 3);
    assert_eq!(f.repo.get_display_services().len(), 12);

    let events = f.sink.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].kind, EntityKind::Platforms);
}

#[test]
fn test_ensure_seeded_is_idempotent() {
    let f = fixture();
    f.repo.ensure_seeded().unwrap();
    let platforms = raw(&f.store, PLATFORMS_KEY);
    let services = raw(&f.store, SERVICES_KEY);
    f.sink.clear();

    let outcome = f.repo.ensure_seeded().unwrap();

    assert!(outcome.is_noop());
    assert_eq!(raw(&f.store, PLATFORMS_KEY), platforms);
    assert_eq!(raw(&f.store, SERVICES_KEY), services);
    assert!(f.sink.is_empty());
}

#[test]
fn test_ensure_seeded_attaches_services_by_slug() {
    let f = fixture();
    let youtube = NewPlatform {
        slug: Some("youtube".to_string()),
        ..NewPlatform::new("My Tube")
    };
    f.repo.create_platform(youtube).unwrap();
    f.sink.clear();

    let outcome = f.repo.ensure_seeded().unwrap();

    assert_eq!(outcome.platforms_added, 0);
    assert_eq!(outcome.services_added, 2);
    assert!(f
        .repo
        .list_services()
        .iter()
        .all(|s| s.platform_id == "platform-1"));
    assert_eq!(f.sink.events()[0].kind, EntityKind::Services);
}

#[test]
fn test_open_seeds_only_when_enabled() {
    let store = Arc::new(MemoryKeyValueStore::new());
    let sink = Arc::new(MockDomainEventSink::new());
    let manual = CatalogSettings {
        auto_seed: false,
        ..Default::default()
    };
    let repo = CatalogRepository::open(store.clone(), sink.clone(), manual);
    assert!(repo.list_platforms().is_empty());

    let repo = CatalogRepository::open(store, sink, CatalogSettings::default());
    assert_eq!(repo.list_platforms().len(), 5);
}

#[test]
fn test_open_survives_unavailable_store() {
    let store = Arc::new(MemoryKeyValueStore::new());
    store.set_unavailable(true);
    let sink = Arc::new(MockDomainEventSink::new());

    let repo = CatalogRepository::open(store, sink.clone(), CatalogSettings::default());

    assert!(repo.list_platforms().is_empty());
    assert!(repo.get_display_services().is_empty());
    assert!(sink.is_empty());
}

#[test]
fn test_reset_to_defaults_replaces_catalog() {
    let f = fixture();
    f.repo.create_platform(NewPlatform::new("Custom")).unwrap();
    f.repo.create_platform(NewPlatform::new("Other")).unwrap();
    f.sink.clear();

    let outcome = f.repo.reset_to_defaults().unwrap();

    assert_eq!(outcome.platforms_added, 5);
    let names: Vec<String> = f.repo.list_platforms().into_iter().map(|p| p.name).collect();
    assert_eq!(
        names,
        vec!["Instagram", "Facebook", "Twitter", "YouTube", "TikTok"]
    );
    assert_eq!(f.repo.list_platforms()[0].id, "platform-1");
    assert_eq!(f.sink.len(), 1);
}

#[test]
fn test_clear_all_empties_both_collections() {
    let f = fixture();
    f.repo.ensure_seeded().unwrap();
    f.sink.clear();

    f.repo.clear_all().unwrap();

    assert!(f.repo.list_platforms().is_empty());
    assert!(f.repo.list_services().is_empty());
    assert_eq!(f.sink.len(), 1);
    assert_eq!(f.sink.events()[0].ids.len(), 5);

    let platform = f.repo.create_platform(instagram()).unwrap();
    assert_eq!(platform.id, "platform-1");
}

// ==================== Bulk saves ====================

#[test]
fn test_save_platforms_round_trip() {
    let f = fixture();
    f.repo.ensure_seeded().unwrap();
    let before = f.repo.list_platforms();

    f.repo.save_platforms(&f.repo.list_platforms()).unwrap();

    assert_eq!(f.repo.list_platforms(), before);
}

#[test]
fn test_save_platforms_round_trip_with_store_edited_color() {
    let f = fixture();
    f.repo.create_platform(instagram()).unwrap();
    let edited = raw(&f.store, PLATFORMS_KEY)
        .unwrap()
        .replace("#E1306C", "red");
    f.store.set(PLATFORMS_KEY, &edited).unwrap();

    let listed = f.repo.list_platforms();
    assert_eq!(listed[0].color, "#3b82f6");

    f.repo.save_platforms(&listed).unwrap();
    assert_eq!(f.repo.list_platforms(), listed);
}

#[test]
fn test_save_platforms_rejects_dropping_referenced_platform() {
    let f = fixture();
    f.repo.ensure_seeded().unwrap();
    let without_instagram: Vec<Platform> = f
        .repo
        .list_platforms()
        .into_iter()
        .filter(|p| p.id != "platform-1")
        .collect();
    f.sink.clear();

    let err = f.repo.save_platforms(&without_instagram).unwrap_err();

    assert!(matches!(err, Error::InvalidPlatform(ref id) if id == "platform-1"));
    assert_eq!(f.repo.list_platforms().len(), 5);
    assert!(f.sink.is_empty());
}

#[test]
fn test_save_platforms_rejects_duplicates() {
    let f = fixture();
    let platform = f.repo.create_platform(instagram()).unwrap();

    let same_id = vec![platform.clone(), platform.clone()];
    assert!(f.repo.save_platforms(&same_id).unwrap_err().is_invalid_input());

    let mut twin = platform.clone();
    twin.id = "platform-2".to_string();
    twin.name = "instagram".to_string();
    let err = f.repo.save_platforms(&[platform, twin]).unwrap_err();
    assert!(matches!(err, Error::DuplicateName(_)));
}

#[test]
fn test_save_services_requires_known_platforms() {
    let f = fixture();
    f.repo.create_platform(instagram()).unwrap();
    let mut service = f.repo.create_service(followers("platform-1")).unwrap();
    let saved_before = raw(&f.store, SERVICES_KEY);

    service.platform_id = "platform-5".to_string();
    let err = f.repo.save_services(&[service]).unwrap_err();

    assert!(matches!(err, Error::InvalidPlatform(_)));
    assert_eq!(raw(&f.store, SERVICES_KEY), saved_before);
}

#[test]
fn test_save_services_round_trip() {
    let f = fixture();
    f.repo.ensure_seeded().unwrap();
    let mut services = f.repo.list_services();
    services.reverse();

    f.repo.save_services(&services).unwrap();

    assert_eq!(f.repo.list_services(), services);
}

// ==================== Orphans ====================

#[test]
fn test_prune_orphan_services() {
    let f = fixture();
    f.repo.create_platform(instagram()).unwrap();
    f.repo.create_service(followers("platform-1")).unwrap();
    let mut services: Vec<Service> = f.repo.list_services();
    let mut orphan = services[0].clone();
    orphan.id = "service-2".to_string();
    orphan.platform_id = "platform-3".to_string();
    services.push(orphan);
    f.store
        .set(SERVICES_KEY, &serde_json::to_string(&services).unwrap())
        .unwrap();
    f.sink.clear();

    assert_eq!(f.repo.prune_orphan_services().unwrap(), 1);
    assert_eq!(f.repo.list_services().len(), 1);
    assert_eq!(f.sink.events()[0].ids, vec!["service-2".to_string()]);

    assert_eq!(f.repo.prune_orphan_services().unwrap(), 0);
    assert_eq!(f.sink.len(), 1);
}

// ==================== Pricing ====================

#[test]
fn test_quote_uses_configured_unit() {
    let store = Arc::new(MemoryKeyValueStore::new());
    let sink = Arc::new(MockDomainEventSink::new());
    let repo = CatalogRepository::open(store.clone(), sink.clone(), CatalogSettings::default());

    let quote = repo.quote("service-1", 1_000).unwrap();
    assert_eq!(quote.total, dec!(5.00));
    assert_eq!(quote.price_unit, PriceUnit::PerThousand);

    let per_unit = CatalogSettings {
        price_unit: PriceUnit::PerUnit,
        auto_seed: false,
    };
    let repo = CatalogRepository::with_settings(store, sink, per_unit);
    assert_eq!(repo.quote("service-2", 50).unwrap().total, dec!(175.00));
}

#[test]
fn test_quote_rejects_hidden_services_and_bad_quantities() {
    let f = fixture();
    f.repo.ensure_seeded().unwrap();

    assert!(f.repo.quote("service-1", 99).unwrap_err().is_invalid_input());
    assert!(matches!(
        f.repo.quote("service-404", 100).unwrap_err(),
        Error::NotFound(_)
    ));

    f.repo
        .update_platform(
            "platform-1",
            PlatformUpdate {
                active: Some(false),
                ..Default::default()
            },
        )
        .unwrap();
    assert!(matches!(
        f.repo.quote("service-1", 100).unwrap_err(),
        Error::NotFound(_)
    ));
}

// ==================== Storage failures ====================

#[test]
fn test_write_to_unavailable_store_is_surfaced() {
    let f = fixture();
    f.store.set_unavailable(true);

    let err = f.repo.create_platform(instagram()).unwrap_err();

    assert!(matches!(
        err,
        Error::StorageUnavailable(StorageError::Unavailable(_))
    ));
    assert!(f.sink.is_empty());

    f.store.set_unavailable(false);
    assert!(f.repo.list_platforms().is_empty());
    let platform = f.repo.create_platform(instagram()).unwrap();
    assert_eq!(platform.id, "platform-1");
}

#[test]
fn test_quota_failure_leaves_store_unchanged() {
    let f = fixture_with_store(MemoryKeyValueStore::with_quota(2_048));
    f.repo.create_platform(instagram()).unwrap();
    f.repo.create_service(followers("platform-1")).unwrap();
    f.sink.clear();

    let big = NewPlatform {
        description: Some("x".repeat(4_096)),
        ..NewPlatform::new("Huge")
    };
    let err = f.repo.create_platform(big).unwrap_err();
    assert!(matches!(
        err,
        Error::StorageUnavailable(StorageError::QuotaExceeded(_))
    ));
    assert_eq!(f.repo.list_platforms().len(), 1);
    assert!(f.sink.is_empty());
}

#[test]
fn test_failed_read_aborts_create_without_overwriting() {
    let (store, sink, repo) = flaky_fixture();
    repo.ensure_seeded().unwrap();
    let platforms_before = store.get(PLATFORMS_KEY).unwrap();
    sink.clear();

    store.fail_next_reads(1);
    let err = repo.create_platform(NewPlatform::new("Telegram")).unwrap_err();

    assert!(matches!(
        err,
        Error::StorageUnavailable(StorageError::Unavailable(_))
    ));
    assert_eq!(store.get(PLATFORMS_KEY).unwrap(), platforms_before);
    assert_eq!(repo.list_platforms().len(), 5);
    assert!(sink.is_empty());

    let telegram = repo.create_platform(NewPlatform::new("Telegram")).unwrap();
    assert_eq!(telegram.id, "platform-6");
    assert_eq!(repo.list_platforms().len(), 6);
}

#[test]
fn test_failed_read_aborts_service_mutations() {
    let (store, sink, repo) = flaky_fixture();
    repo.ensure_seeded().unwrap();
    let services_before = store.get(SERVICES_KEY).unwrap();
    sink.clear();

    store.fail_next_reads(1);
    assert!(repo.create_service(followers("platform-1")).is_err());
    store.fail_next_reads(1);
    assert!(repo.delete_service("service-1").is_err());
    store.fail_next_reads(1);
    assert!(repo.prune_orphan_services().is_err());

    assert_eq!(store.get(SERVICES_KEY).unwrap(), services_before);
    assert_eq!(repo.list_services().len(), 12);
    assert!(sink.is_empty());
}

#[test]
fn test_failed_read_does_not_reseed_populated_store() {
    let (store, sink, repo) = flaky_fixture();
    repo.create_platform(instagram()).unwrap();
    repo.create_service(followers("platform-1")).unwrap();
    let platforms_before = store.get(PLATFORMS_KEY).unwrap();
    let services_before = store.get(SERVICES_KEY).unwrap();
    sink.clear();

    store.fail_next_reads(1);
    assert!(repo.ensure_seeded().is_err());

    assert_eq!(store.get(PLATFORMS_KEY).unwrap(), platforms_before);
    assert_eq!(store.get(SERVICES_KEY).unwrap(), services_before);
    assert!(sink.is_empty());
}

#[test]
fn test_undecodable_service_does_not_drop_the_rest() {
    let f = fixture();
    f.repo.ensure_seeded().unwrap();
    let mut stored: Vec<serde_json::Value> =
        serde_json::from_str(&raw(&f.store, SERVICES_KEY).unwrap()).unwrap();
    stored[0]
        .as_object_mut()
        .unwrap()
        .remove("maxQuantity");
    f.store
        .set(SERVICES_KEY, &serde_json::to_string(&stored).unwrap())
        .unwrap();

    assert_eq!(f.repo.list_services().len(), 11);
    let created = f.repo.create_service(followers("platform-1")).unwrap();

    assert_eq!(created.id, "service-13");
    let services = f.repo.list_services();
    assert_eq!(services.len(), 12);
    assert!(services.iter().any(|s| s.id == "service-12"));
}

// ==================== Events ====================

#[test]
fn test_each_mutation_emits_one_event() {
    let f = fixture();

    f.repo.create_platform(instagram()).unwrap();
    f.repo.create_service(followers("platform-1")).unwrap();
    f.repo
        .update_service(
            "service-1",
            ServiceUpdate {
                active: Some(false),
                ..Default::default()
            },
        )
        .unwrap();
    f.repo.delete_platform("platform-1").unwrap();

    let kinds: Vec<EntityKind> = f.sink.events().iter().map(|e| e.kind).collect();
    assert_eq!(
        kinds,
        vec![
            EntityKind::Platforms,
            EntityKind::Services,
            EntityKind::Services,
            EntityKind::Platforms,
        ]
    );
    let cascade = &f.sink.events()[3];
    assert_eq!(cascade.ids, vec!["platform-1", "service-1"]);
}

#[test]
fn test_subscribers_can_read_back_after_publish() {
    let store = Arc::new(MemoryKeyValueStore::new());
    let bus = Arc::new(ChangeBus::new());
    let repo = Arc::new(CatalogRepository::new(store, bus.clone()));
    let seen = Arc::new(Mutex::new(Vec::new()));

    let weak = Arc::downgrade(&repo);
    let seen_in_handler = seen.clone();
    let _subscription = bus.subscribe(move |event| {
        if let Some(repo) = weak.upgrade() {
            let names: Vec<String> = repo
                .get_display_platforms()
                .into_iter()
                .map(|p| p.name)
                .collect();
            seen_in_handler.lock().unwrap().push((event.kind, names));
        }
    });

    repo.create_platform(instagram()).unwrap();
    repo.create_platform(NewPlatform::new("TikTok")).unwrap();

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 2);
    assert_eq!(seen[1].1, vec!["Instagram", "TikTok"]);
}

#[test]
fn test_panicking_subscriber_does_not_undo_write() {
    let store = Arc::new(MemoryKeyValueStore::new());
    let bus = Arc::new(ChangeBus::new());
    let repo = CatalogRepository::new(store, bus.clone());
    let _boom = bus.subscribe(|_| panic!("widget failed"));

    let platform = repo.create_platform(instagram()).unwrap();

    assert_eq!(repo.get_platform(&platform.id), Some(platform));
}
