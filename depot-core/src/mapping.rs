use crate::{RepositoryError, Result};
use std::{
    any::{Any, TypeId},
    collections::HashMap,
    sync::{Arc, LazyLock, PoisonError, RwLock},
};

/// Fluent per-property metadata, the registry-side alternative to explicit
/// [`crate::Marker`]s. Only consulted for columns with no explicit markers,
/// except for the key flag which backs up a missing key marker.
#[derive(Debug, Clone, Copy, Default)]
pub struct PropertyMap {
    pub key: bool,
    pub identity: bool,
    pub ignored: bool,
}

impl PropertyMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn key(mut self) -> Self {
        self.key = true;
        self
    }

    pub fn identity(mut self) -> Self {
        self.identity = true;
        self
    }

    pub fn ignored(mut self) -> Self {
        self.ignored = true;
        self
    }
}

/// Fluent mapping for one entity type: an optional table name and
/// per-property flags. Property names are matched case-insensitively.
#[derive(Debug, Clone, Default)]
pub struct EntityMap {
    table: Option<String>,
    properties: Vec<(String, PropertyMap)>,
}

impl EntityMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn table(mut self, name: impl Into<String>) -> Self {
        self.table = Some(name.into());
        self
    }

    pub fn property(
        mut self,
        name: impl Into<String>,
        build: impl FnOnce(PropertyMap) -> PropertyMap,
    ) -> Self {
        self.properties.push((name.into(), build(PropertyMap::new())));
        self
    }

    pub fn table_name(&self) -> Option<&str> {
        self.table.as_deref()
    }

    pub fn property_map(&self, name: &str) -> Option<&PropertyMap> {
        self.properties
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, map)| map)
    }
}

type RegisteredMap = Arc<dyn Any + Send + Sync>;

static ENTITY_MAPS: LazyLock<RwLock<HashMap<TypeId, RegisteredMap>>> =
    LazyLock::new(|| RwLock::new(HashMap::new()));

/// Collects mappings during [`Mapper::initialize`].
#[derive(Default)]
pub struct MapperConfiguration {
    entries: Vec<(TypeId, RegisteredMap)>,
}

impl MapperConfiguration {
    pub fn add_map<E: 'static>(&mut self, map: EntityMap) {
        self.entries.push((TypeId::of::<E>(), Arc::new(map)));
    }

    /// Registers a type-erased mapping produced by an external mapping
    /// integration. Resolution fails with
    /// [`RepositoryError::MappingConfiguration`] unless the entry is an
    /// [`EntityMap`].
    pub fn add_raw<E: 'static>(&mut self, map: RegisteredMap) {
        self.entries.push((TypeId::of::<E>(), map));
    }
}

/// The process-wide fluent mapping registry, keyed by entity type identity.
pub struct Mapper;

impl Mapper {
    /// Registers mappings. May be called more than once; later registrations
    /// for the same type replace earlier ones.
    pub fn initialize(configure: impl FnOnce(&mut MapperConfiguration)) {
        let mut configuration = MapperConfiguration::default();
        configure(&mut configuration);
        let mut maps = ENTITY_MAPS
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        for (type_id, map) in configuration.entries {
            maps.insert(type_id, map);
        }
    }

    pub fn is_empty() -> bool {
        ENTITY_MAPS
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_empty()
    }

    /// Looks up the fluent mapping for `type_id`, downcasting to
    /// [`EntityMap`]. A registered entry of any other kind is a
    /// configuration error naming the entity.
    pub fn entity_map(type_id: TypeId, entity: &'static str) -> Result<Option<Arc<EntityMap>>> {
        let maps = ENTITY_MAPS.read().unwrap_or_else(PoisonError::into_inner);
        match maps.get(&type_id) {
            None => Ok(None),
            Some(map) => map
                .clone()
                .downcast::<EntityMap>()
                .map(Some)
                .map_err(|_| RepositoryError::MappingConfiguration { entity }),
        }
    }
}
