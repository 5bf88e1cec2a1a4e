use log::{debug, error, info, warn};
use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};

use super::catalog_ids::{nth_after, numeric_suffix, platform_id, service_id, IdSequencer};
use super::catalog_model::{DisplayCatalog, PlatformDeletion, SeedOutcome};
use super::catalog_projections::{
    display_platforms, display_services, platform_services, services_for_platform,
};
use super::catalog_seed::{default_platforms, default_services};
use super::catalog_traits::CatalogRepositoryTrait;
use crate::errors::{Error, Result, StorageError};
use crate::events::{CatalogEvent, DomainEventSink};
use crate::platforms::{NewPlatform, Platform, PlatformUpdate, PLATFORM_ID_PREFIX};
use crate::pricing::{quote_price, PriceQuote};
use crate::services::{NewService, Service, ServiceUpdate, SERVICE_ID_PREFIX};
use crate::settings::CatalogSettings;
use crate::storage::{
    load_collection, to_json, try_load_collection, KeyValueStore, PLATFORMS_KEY, SERVICES_KEY,
};
use crate::utils::text_utils::name_key;
use crate::utils::time_utils::now_utc;

/// Repository owning the platform and service collections.
///
/// Every mutation runs under one lock and re-reads both collections from the
/// store before writing, so call sites never write back stale copies. If that
/// read fails the mutation fails and nothing is written. The change event is
/// emitted after the lock is released.
pub struct CatalogRepository {
    store: Arc<dyn KeyValueStore>,
    sink: Arc<dyn DomainEventSink>,
    settings: CatalogSettings,
    ids: Mutex<IdSequencer>,
}

/// Records produced by one seeding pass, not yet written.
struct SeedBatch {
    platform_ids: Vec<String>,
    service_ids: Vec<String>,
    last_platform: u64,
    last_service: u64,
}

impl SeedBatch {
    fn outcome(&self) -> SeedOutcome {
        SeedOutcome {
            platforms_added: self.platform_ids.len(),
            services_added: self.service_ids.len(),
        }
    }
}

impl CatalogRepository {
    /// Creates a repository over `store` without seeding it.
    pub fn new(store: Arc<dyn KeyValueStore>, sink: Arc<dyn DomainEventSink>) -> Self {
        Self::with_settings(store, sink, CatalogSettings::default())
    }

    pub fn with_settings(
        store: Arc<dyn KeyValueStore>,
        sink: Arc<dyn DomainEventSink>,
        settings: CatalogSettings,
    ) -> Self {
        Self {
            store,
            sink,
            settings,
            ids: Mutex::new(IdSequencer::default()),
        }
    }

    /// Creates a repository and, when `settings.auto_seed` is on, seeds the
    /// default catalog into empty collections.
    ///
    /// A seeding failure is logged and the repository is returned anyway; it
    /// then serves whatever the store holds.
    pub fn open(
        store: Arc<dyn KeyValueStore>,
        sink: Arc<dyn DomainEventSink>,
        settings: CatalogSettings,
    ) -> Self {
        let repository = Self::with_settings(store, sink, settings);
        if repository.settings.auto_seed {
            if let Err(e) = repository.ensure_seeded() {
                warn!("Seeding the default catalog failed: {}", e);
            }
        }
        repository
    }

    pub fn settings(&self) -> &CatalogSettings {
        &self.settings
    }

    fn load_platforms(&self) -> Vec<Platform> {
        load_collection(self.store.as_ref(), PLATFORMS_KEY)
    }

    fn load_services(&self) -> Vec<Service> {
        load_collection(self.store.as_ref(), SERVICES_KEY)
    }

    /// Reads the platforms a mutation is about to rewrite. Unlike
    /// [`Self::load_platforms`], an unreadable store is an error.
    fn fetch_platforms(&self) -> Result<Vec<Platform>> {
        try_load_collection(self.store.as_ref(), PLATFORMS_KEY)
            .map_err(|e| read_failed(PLATFORMS_KEY, e))
    }

    fn fetch_services(&self) -> Result<Vec<Service>> {
        try_load_collection(self.store.as_ref(), SERVICES_KEY)
            .map_err(|e| read_failed(SERVICES_KEY, e))
    }

    fn write_platforms(&self, platforms: &[Platform]) -> Result<()> {
        let json = to_json(platforms)?;
        self.store
            .set(PLATFORMS_KEY, &json)
            .map_err(|e| write_failed(PLATFORMS_KEY, e))
    }

    fn write_services(&self, services: &[Service]) -> Result<()> {
        let json = to_json(services)?;
        self.store
            .set(SERVICES_KEY, &json)
            .map_err(|e| write_failed(SERVICES_KEY, e))
    }

    /// Writes both collections as one logical operation.
    fn write_both(&self, platforms: &[Platform], services: &[Service]) -> Result<()> {
        let entries = [
            (PLATFORMS_KEY, to_json(platforms)?),
            (SERVICES_KEY, to_json(services)?),
        ];
        self.store
            .set_many(&entries)
            .map_err(|e| write_failed("catalog", e))
    }

    /// Runs `op` under the write lock, then emits its event, if any.
    fn mutate<T, F>(&self, op: F) -> Result<T>
    where
        F: FnOnce(&mut IdSequencer) -> Result<(T, Option<CatalogEvent>)>,
    {
        let (value, event) = {
            let mut ids = self.ids.lock().unwrap_or_else(PoisonError::into_inner);
            op(&mut ids)?
        };
        if let Some(event) = event {
            debug!(
                "Emitting {:?} change for {} record(s)",
                event.kind,
                event.ids.len()
            );
            self.sink.emit(event);
        }
        Ok(value)
    }

    /// Appends the default catalog to whichever collections are empty.
    fn seed_into(
        &self,
        ids: &IdSequencer,
        platforms: &mut Vec<Platform>,
        services: &mut Vec<Service>,
    ) -> Result<SeedBatch> {
        let now = now_utc();
        let mut batch = SeedBatch {
            platform_ids: Vec::new(),
            service_ids: Vec::new(),
            last_platform: 0,
            last_service: 0,
        };

        if platforms.is_empty() {
            let first = ids.next_platform(platforms, services)?;
            for new_platform in default_platforms() {
                let n = nth_after(first, batch.platform_ids.len(), PLATFORM_ID_PREFIX)?;
                let platform = new_platform.into_platform(platform_id(n), now);
                batch.platform_ids.push(platform.id.clone());
                batch.last_platform = n;
                platforms.push(platform);
            }
        }

        if services.is_empty() && !platforms.is_empty() {
            let first = ids.next_service(services)?;
            for default in default_services() {
                let Some(owner) = platforms.iter().find(|p| p.slug == default.platform_slug)
                else {
                    continue;
                };
                let n = nth_after(first, batch.service_ids.len(), SERVICE_ID_PREFIX)?;
                let mut new_service = default.service;
                new_service.platform_id = owner.id.clone();
                let service = new_service.into_service(service_id(n), now);
                batch.service_ids.push(service.id.clone());
                batch.last_service = n;
                services.push(service);
            }
        }

        Ok(batch)
    }
}

fn read_failed(key: &str, err: StorageError) -> Error {
    error!("Reading '{}' before a write failed, nothing written: {}", key, err);
    Error::StorageUnavailable(err)
}

fn write_failed(key: &str, err: StorageError) -> Error {
    error!("Writing '{}' failed: {}", key, err);
    Error::StorageUnavailable(err)
}

fn ensure_unique_name(platforms: &[Platform], name: &str, except_id: Option<&str>) -> Result<()> {
    let key = name_key(name);
    let taken = platforms
        .iter()
        .any(|p| Some(p.id.as_str()) != except_id && name_key(&p.name) == key);
    if taken {
        return Err(Error::DuplicateName(name.trim().to_string()));
    }
    Ok(())
}

fn ensure_platform_exists(platforms: &[Platform], platform_id: &str) -> Result<()> {
    if platforms.iter().any(|p| p.id == platform_id) {
        Ok(())
    } else {
        Err(Error::InvalidPlatform(platform_id.to_string()))
    }
}

fn max_suffix<'a>(ids: impl Iterator<Item = &'a str>, prefix: &str) -> u64 {
    ids.filter_map(|id| numeric_suffix(id, prefix))
        .max()
        .unwrap_or(0)
}

impl CatalogRepositoryTrait for CatalogRepository {
    fn list_platforms(&self) -> Vec<Platform> {
        self.load_platforms()
    }

    fn get_platform(&self, platform_id: &str) -> Option<Platform> {
        self.load_platforms()
            .into_iter()
            .find(|p| p.id == platform_id)
    }

    fn create_platform(&self, new_platform: NewPlatform) -> Result<Platform> {
        new_platform.validate()?;
        self.mutate(|ids| {
            let mut platforms = self.fetch_platforms()?;
            ensure_unique_name(&platforms, &new_platform.name, None)?;

            let services = self.fetch_services()?;
            let n = ids.next_platform(&platforms, &services)?;
            let platform = new_platform.into_platform(platform_id(n), now_utc());
            platforms.push(platform.clone());
            self.write_platforms(&platforms)?;
            ids.record_platform(n);

            debug!("Created platform {} ({})", platform.id, platform.name);
            let event = CatalogEvent::platforms_changed(vec![platform.id.clone()]);
            Ok((platform, Some(event)))
        })
    }

    fn update_platform(&self, platform_id: &str, update: PlatformUpdate) -> Result<Platform> {
        update.validate()?;
        self.mutate(|_| {
            let mut platforms = self.fetch_platforms()?;
            let index = platforms
                .iter()
                .position(|p| p.id == platform_id)
                .ok_or_else(|| Error::platform_not_found(platform_id))?;
            if let Some(name) = &update.name {
                ensure_unique_name(&platforms, name, Some(platform_id))?;
            }

            let mut updated = platforms[index].clone();
            update.apply_to(&mut updated, now_utc());
            updated.validate()?;
            platforms[index] = updated.clone();
            self.write_platforms(&platforms)?;

            debug!("Updated platform {}", updated.id);
            let event = CatalogEvent::platforms_changed(vec![updated.id.clone()]);
            Ok((updated, Some(event)))
        })
    }

    fn delete_platform(&self, platform_id: &str) -> Result<PlatformDeletion> {
        self.mutate(|_| {
            let mut platforms = self.fetch_platforms()?;
            let index = platforms
                .iter()
                .position(|p| p.id == platform_id)
                .ok_or_else(|| Error::platform_not_found(platform_id))?;
            platforms.remove(index);

            let services = self.fetch_services()?;
            let (removed, kept): (Vec<Service>, Vec<Service>) = services
                .into_iter()
                .partition(|s| s.platform_id == platform_id);

            if removed.is_empty() {
                self.write_platforms(&platforms)?;
            } else {
                self.write_both(&platforms, &kept)?;
            }

            debug!(
                "Deleted platform {} and {} dependent service(s)",
                platform_id,
                removed.len()
            );
            let mut changed = vec![platform_id.to_string()];
            changed.extend(removed.iter().map(|s| s.id.clone()));
            let deletion = PlatformDeletion {
                removed_platform: 1,
                removed_services: removed.len(),
            };
            Ok((deletion, Some(CatalogEvent::platforms_changed(changed))))
        })
    }

    fn save_platforms(&self, platforms: &[Platform]) -> Result<()> {
        let mut seen_ids = HashSet::new();
        let mut seen_names = HashSet::new();
        for platform in platforms {
            platform.validate()?;
            if !seen_ids.insert(platform.id.as_str()) {
                return Err(Error::invalid_input(format!(
                    "Duplicate platform id '{}'",
                    platform.id
                )));
            }
            if !seen_names.insert(name_key(&platform.name)) {
                return Err(Error::DuplicateName(platform.name.trim().to_string()));
            }
        }

        self.mutate(|ids| {
            let current = self.fetch_platforms()?;
            let services = self.fetch_services()?;
            // Platforms being dropped must not leave services behind.
            let dropped: HashSet<&str> = current
                .iter()
                .map(|p| p.id.as_str())
                .filter(|id| !seen_ids.contains(id))
                .collect();
            if let Some(orphan) = services
                .iter()
                .find(|s| dropped.contains(s.platform_id.as_str()))
            {
                return Err(Error::InvalidPlatform(orphan.platform_id.clone()));
            }

            self.write_platforms(platforms)?;
            ids.record_platform(max_suffix(
                current
                    .iter()
                    .chain(platforms.iter())
                    .map(|p| p.id.as_str()),
                PLATFORM_ID_PREFIX,
            ));

            debug!("Saved {} platform(s)", platforms.len());
            let changed = platforms.iter().map(|p| p.id.clone()).collect();
            Ok(((), Some(CatalogEvent::platforms_changed(changed))))
        })
    }

    fn list_services(&self) -> Vec<Service> {
        self.load_services()
    }

    fn get_service(&self, service_id: &str) -> Option<Service> {
        self.load_services().into_iter().find(|s| s.id == service_id)
    }

    fn list_services_for_platform(&self, platform_id: &str) -> Vec<Service> {
        services_for_platform(&self.load_services(), platform_id)
    }

    fn create_service(&self, new_service: NewService) -> Result<Service> {
        new_service.validate()?;
        self.mutate(|ids| {
            let platforms = self.fetch_platforms()?;
            ensure_platform_exists(&platforms, &new_service.platform_id)?;

            let mut services = self.fetch_services()?;
            let n = ids.next_service(&services)?;
            let service = new_service.into_service(service_id(n), now_utc());
            services.push(service.clone());
            self.write_services(&services)?;
            ids.record_service(n);

            debug!(
                "Created service {} ({}) on {}",
                service.id, service.name, service.platform_id
            );
            let event = CatalogEvent::services_changed(vec![service.id.clone()]);
            Ok((service, Some(event)))
        })
    }

    fn update_service(&self, service_id: &str, update: ServiceUpdate) -> Result<Service> {
        self.mutate(|_| {
            let mut services = self.fetch_services()?;
            let index = services
                .iter()
                .position(|s| s.id == service_id)
                .ok_or_else(|| Error::service_not_found(service_id))?;

            let mut updated = services[index].clone();
            update.apply_to(&mut updated, now_utc());
            updated.validate()?;
            if update.platform_id.is_some() {
                ensure_platform_exists(&self.fetch_platforms()?, &updated.platform_id)?;
            }

            services[index] = updated.clone();
            self.write_services(&services)?;

            debug!("Updated service {}", updated.id);
            let event = CatalogEvent::services_changed(vec![updated.id.clone()]);
            Ok((updated, Some(event)))
        })
    }

    fn delete_service(&self, service_id: &str) -> Result<()> {
        self.mutate(|_| {
            let mut services = self.fetch_services()?;
            let index = services
                .iter()
                .position(|s| s.id == service_id)
                .ok_or_else(|| Error::service_not_found(service_id))?;
            services.remove(index);
            self.write_services(&services)?;

            debug!("Deleted service {}", service_id);
            let event = CatalogEvent::services_changed(vec![service_id.to_string()]);
            Ok(((), Some(event)))
        })
    }

    fn save_services(&self, services: &[Service]) -> Result<()> {
        let mut seen_ids = HashSet::new();
        for service in services {
            service.validate()?;
            if !seen_ids.insert(service.id.as_str()) {
                return Err(Error::invalid_input(format!(
                    "Duplicate service id '{}'",
                    service.id
                )));
            }
        }

        self.mutate(|ids| {
            let platforms = self.fetch_platforms()?;
            for service in services {
                ensure_platform_exists(&platforms, &service.platform_id)?;
            }

            let current = self.fetch_services()?;
            self.write_services(services)?;
            ids.record_service(max_suffix(
                current
                    .iter()
                    .chain(services.iter())
                    .map(|s| s.id.as_str()),
                SERVICE_ID_PREFIX,
            ));

            debug!("Saved {} service(s)", services.len());
            let changed = services.iter().map(|s| s.id.clone()).collect();
            Ok(((), Some(CatalogEvent::services_changed(changed))))
        })
    }

    fn get_display_platforms(&self) -> Vec<Platform> {
        display_platforms(&self.load_platforms())
    }

    fn get_platform_services(&self, platform_id: &str) -> Vec<Service> {
        platform_services(&self.load_platforms(), &self.load_services(), platform_id)
    }

    fn get_display_services(&self) -> Vec<Service> {
        display_services(&self.load_platforms(), &self.load_services())
    }

    fn display_catalog(&self) -> DisplayCatalog {
        DisplayCatalog::build(&self.load_platforms(), &self.load_services())
    }

    fn quote(&self, service_id: &str, quantity: i64) -> Result<PriceQuote> {
        let service = self
            .get_display_services()
            .into_iter()
            .find(|s| s.id == service_id)
            .ok_or_else(|| Error::service_not_found(service_id))?;
        quote_price(&service, quantity, self.settings.price_unit)
    }

    fn ensure_seeded(&self) -> Result<SeedOutcome> {
        self.mutate(|ids| {
            let mut platforms = self.fetch_platforms()?;
            let mut services = self.fetch_services()?;
            let batch = self.seed_into(ids, &mut platforms, &mut services)?;
            let outcome = batch.outcome();

            match (outcome.platforms_added > 0, outcome.services_added > 0) {
                (false, false) => return Ok((outcome, None)),
                (true, true) => self.write_both(&platforms, &services)?,
                (true, false) => self.write_platforms(&platforms)?,
                (false, true) => self.write_services(&services)?,
            }
            ids.record_platform(batch.last_platform);
            ids.record_service(batch.last_service);

            info!(
                "Seeded {} platform(s) and {} service(s)",
                outcome.platforms_added, outcome.services_added
            );
            let event = if outcome.platforms_added > 0 {
                CatalogEvent::platforms_changed(batch.platform_ids)
            } else {
                CatalogEvent::services_changed(batch.service_ids)
            };
            Ok((outcome, Some(event)))
        })
    }

    fn reset_to_defaults(&self) -> Result<SeedOutcome> {
        self.mutate(|ids| {
            let fresh = IdSequencer::default();
            let mut platforms = Vec::new();
            let mut services = Vec::new();
            let batch = self.seed_into(&fresh, &mut platforms, &mut services)?;
            self.write_both(&platforms, &services)?;

            ids.reset();
            ids.record_platform(batch.last_platform);
            ids.record_service(batch.last_service);

            let outcome = batch.outcome();
            info!(
                "Reset catalog to {} default platform(s) and {} service(s)",
                outcome.platforms_added, outcome.services_added
            );
            let event = CatalogEvent::platforms_changed(batch.platform_ids);
            Ok((outcome, Some(event)))
        })
    }

    fn clear_all(&self) -> Result<()> {
        self.mutate(|ids| {
            let removed: Vec<String> = self
                .fetch_platforms()?
                .into_iter()
                .map(|p| p.id)
                .collect();
            self.write_both(&[], &[])?;
            ids.reset();

            info!("Cleared catalog ({} platform(s))", removed.len());
            Ok(((), Some(CatalogEvent::platforms_changed(removed))))
        })
    }

    fn prune_orphan_services(&self) -> Result<usize> {
        self.mutate(|_| {
            let platforms = self.fetch_platforms()?;
            let known: HashSet<&str> = platforms.iter().map(|p| p.id.as_str()).collect();
            let (kept, orphans): (Vec<Service>, Vec<Service>) = self
                .fetch_services()?
                .into_iter()
                .partition(|s| known.contains(s.platform_id.as_str()));

            if orphans.is_empty() {
                return Ok((0, None));
            }
            self.write_services(&kept)?;

            info!("Pruned {} orphaned service(s)", orphans.len());
            let removed: Vec<String> = orphans.into_iter().map(|s| s.id).collect();
            Ok((removed.len(), Some(CatalogEvent::services_changed(removed))))
        })
    }
}
