//! Concurrent mapping cache.
//!
//! Mappings are built at most once per entity type and shared as
//! `Arc<EntityMapping>`. Lookup order for an uncached type:
//!
//! 1. a map registered directly with [`MappingRegistry::register`]
//! 2. the first [`MappingCatalog`] in [`MappingOptions::catalogs`] holding one
//! 3. the [`DefaultMapper`]

use std::any::TypeId;
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use tracing::debug;

use crate::entity::Entity;

use super::class_mapper::{AutoClassMapper, ClassMap, ClassMapper, DefaultMapper, MappingBuilder};
use super::conventions::MappingConventions;
use super::mapping::EntityMapping;
use super::MapResult;

type BuildFn = Arc<dyn Fn(&MappingConventions) -> MapResult<EntityMapping> + Send + Sync>;

fn build_fn<E, M>(map: M) -> BuildFn
where
    E: Entity,
    M: ClassMap<E> + 'static,
{
    Arc::new(move |conventions: &MappingConventions| {
        let mut mapper = ClassMapper::<E>::new(conventions);
        map.configure(&mut mapper)?;
        mapper.build()
    })
}

/// A named group of class maps, searched in registration order.
#[derive(Clone, Default)]
pub struct MappingCatalog {
    name: String,
    maps: HashMap<TypeId, BuildFn>,
}

impl MappingCatalog {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            maps: HashMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Add a class map for `E`, replacing any earlier one.
    pub fn register<E, M>(&mut self, map: M) -> &mut Self
    where
        E: Entity,
        M: ClassMap<E> + 'static,
    {
        self.maps.insert(TypeId::of::<E>(), build_fn::<E, M>(map));
        self
    }

    pub fn contains<E: Entity>(&self) -> bool {
        self.maps.contains_key(&TypeId::of::<E>())
    }

    pub fn len(&self) -> usize {
        self.maps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.maps.is_empty()
    }

    fn get(&self, entity_type: TypeId) -> Option<&BuildFn> {
        self.maps.get(&entity_type)
    }
}

impl fmt::Debug for MappingCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MappingCatalog")
            .field("name", &self.name)
            .field("maps", &self.maps.len())
            .finish()
    }
}

/// Registry configuration.
#[derive(Clone)]
pub struct MappingOptions {
    pub conventions: MappingConventions,
    pub default_mapper: Arc<dyn DefaultMapper>,
    pub catalogs: Vec<MappingCatalog>,
}

impl Default for MappingOptions {
    fn default() -> Self {
        Self {
            conventions: MappingConventions::default(),
            default_mapper: Arc::new(AutoClassMapper),
            catalogs: Vec::new(),
        }
    }
}

impl MappingOptions {
    pub fn with_conventions(mut self, conventions: MappingConventions) -> Self {
        self.conventions = conventions;
        self
    }

    pub fn with_default_mapper(mut self, mapper: impl DefaultMapper + 'static) -> Self {
        self.default_mapper = Arc::new(mapper);
        self
    }

    pub fn with_catalog(mut self, catalog: MappingCatalog) -> Self {
        self.catalogs.push(catalog);
        self
    }
}

impl fmt::Debug for MappingOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MappingOptions")
            .field("conventions", &self.conventions)
            .field("catalogs", &self.catalogs)
            .finish_non_exhaustive()
    }
}

/// Thread-safe cache of entity mappings.
///
/// Concurrent first requests for the same type may each build a mapping;
/// the first one stored wins and every caller receives that same `Arc`.
/// A mapping whose build overlapped an invalidation is never left cached.
#[derive(Default)]
pub struct MappingRegistry {
    options: MappingOptions,
    registrations: DashMap<TypeId, BuildFn>,
    cache: DashMap<TypeId, Arc<EntityMapping>>,
    /// Bumped by every invalidation.
    generation: AtomicU64,
}

impl MappingRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: MappingOptions) -> Self {
        Self {
            options,
            registrations: DashMap::new(),
            cache: DashMap::new(),
            generation: AtomicU64::new(0),
        }
    }

    pub fn options(&self) -> &MappingOptions {
        &self.options
    }

    pub fn conventions(&self) -> &MappingConventions {
        &self.options.conventions
    }

    /// Replace the options and drop every cached mapping.
    pub fn configure(&mut self, options: MappingOptions) {
        debug!(catalogs = options.catalogs.len(), "Reconfiguring mapping registry");
        self.options = options;
        self.invalidate();
    }

    /// Register a class map for `E` and drop every cached mapping.
    pub fn register<E, M>(&self, map: M)
    where
        E: Entity,
        M: ClassMap<E> + 'static,
    {
        debug!(entity = E::type_name(), "Registering class map");
        self.registrations
            .insert(TypeId::of::<E>(), build_fn::<E, M>(map));
        self.invalidate();
    }

    /// Mapping for `E`, built on first request.
    pub fn get_mapping<E: Entity>(&self) -> MapResult<Arc<EntityMapping>> {
        let entity_type = TypeId::of::<E>();
        loop {
            if let Some(mapping) = self.cache.get(&entity_type) {
                return Ok(Arc::clone(mapping.value()));
            }

            let generation = self.generation.load(Ordering::SeqCst);
            let mapping = Arc::new(self.build::<E>()?);
            let stored = Arc::clone(self.cache.entry(entity_type).or_insert(mapping).value());

            if self.generation.load(Ordering::SeqCst) == generation {
                debug!(
                    entity = E::type_name(),
                    table = stored.table_name(),
                    properties = stored.properties().len(),
                    "Built entity mapping"
                );
                return Ok(stored);
            }

            // Invalidated mid-build: the stored mapping may predate a registration.
            debug!(entity = E::type_name(), "Mapping cache invalidated during build, rebuilding");
            self.cache
                .remove_if(&entity_type, |_, cached| Arc::ptr_eq(cached, &stored));
        }
    }

    pub fn is_cached<E: Entity>(&self) -> bool {
        self.cache.contains_key(&TypeId::of::<E>())
    }

    pub fn cached_len(&self) -> usize {
        self.cache.len()
    }

    /// Drop every cached mapping.
    pub fn invalidate(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        if !self.cache.is_empty() {
            debug!(cached = self.cache.len(), "Invalidating mapping cache");
        }
        self.cache.clear();
    }

    /// Same as [`invalidate`](Self::invalidate).
    pub fn clear_cache(&self) {
        self.invalidate();
    }

    fn build<E: Entity>(&self) -> MapResult<EntityMapping> {
        let entity_type = TypeId::of::<E>();
        let conventions = &self.options.conventions;

        let registered = self
            .registrations
            .get(&entity_type)
            .map(|r| Arc::clone(r.value()));
        if let Some(build) = registered {
            return build(conventions);
        }

        for catalog in &self.options.catalogs {
            if let Some(build) = catalog.get(entity_type) {
                debug!(entity = E::type_name(), catalog = catalog.name(), "Using catalog class map");
                return build(conventions);
            }
        }

        let mut builder = MappingBuilder::for_entity::<E>(conventions);
        self.options.default_mapper.configure(&mut builder)?;
        builder.build()
    }
}

impl fmt::Debug for MappingRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MappingRegistry")
            .field("options", &self.options)
            .field("registrations", &self.registrations.len())
            .field("cached", &self.cache.len())
            .finish()
    }
}
