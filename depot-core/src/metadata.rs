use crate::{
    ColumnSpec, Engine, Entity, EntityMap, Mapper, Marker, PropertyMap, RepositoryError, Result,
};
use std::{any::TypeId, sync::Arc};

/// Resolved mapping facts for one entity type against one engine.
///
/// Derived per call from the entity's declarative markers with the fluent
/// registry as fallback; never cached, never persisted.
#[derive(Debug, Clone)]
pub struct EntityMetadata {
    pub entity_name: &'static str,
    /// Dialect-adjusted, ready to appear in SQL text.
    pub table_name: String,
    /// Declaration order.
    pub primary_keys: Vec<&'static str>,
    pub identity: Option<&'static str>,
    pub ignored: Vec<&'static str>,
}

impl EntityMetadata {
    pub fn resolve<E: Entity>(engine: Engine) -> Result<Self> {
        let descriptor = E::descriptor();
        let fluent = Mapper::entity_map(TypeId::of::<E>(), descriptor.entity_name)?;

        let raw_table = descriptor
            .table
            .map(str::to_string)
            .or_else(|| {
                fluent
                    .as_ref()
                    .and_then(|map| map.table_name())
                    .filter(|name| !name.trim().is_empty())
                    .map(str::to_string)
            })
            .unwrap_or_else(|| descriptor.entity_name.to_string());

        let mut primary_keys = Vec::new();
        let mut identity = None;
        let mut ignored = Vec::new();
        for column in descriptor.columns {
            if is_primary_key(column, &fluent) {
                primary_keys.push(column.name);
            }
            if identity.is_none() && is_identity(column, &fluent) {
                identity = Some(column.name);
            }
            if is_ignored(column, &fluent) {
                ignored.push(column.name);
            }
        }

        Ok(Self {
            entity_name: descriptor.entity_name,
            table_name: engine.table_name(&raw_table),
            primary_keys,
            identity,
            ignored,
        })
    }

    pub fn is_ignored(&self, column: &str) -> bool {
        self.ignored.contains(&column)
    }

    pub fn is_primary_key(&self, column: &str) -> bool {
        self.primary_keys.contains(&column)
    }

    /// The single key column required by `delete` and `get_by_id`; those
    /// operations do not support composite keys.
    pub fn single_primary_key(&self, operation: &'static str) -> Result<&'static str> {
        match self.primary_keys.as_slice() {
            [] => Err(RepositoryError::MissingPrimaryKey {
                entity: self.entity_name,
            }),
            [key] => Ok(key),
            _ => Err(RepositoryError::CompositeKeyUnsupported {
                entity: self.entity_name,
                operation,
            }),
        }
    }
}

fn fluent_property<'a>(
    column: &ColumnSpec,
    fluent: &'a Option<Arc<EntityMap>>,
) -> Option<&'a PropertyMap> {
    fluent.as_ref().and_then(|map| map.property_map(column.name))
}

// The explicit marker wins; the fluent flag is only a fallback for columns
// that do not carry the marker.
fn is_primary_key(column: &ColumnSpec, fluent: &Option<Arc<EntityMap>>) -> bool {
    column.has_marker(Marker::PrimaryKey)
        || fluent_property(column, fluent).is_some_and(|map| map.key)
}

fn is_identity(column: &ColumnSpec, fluent: &Option<Arc<EntityMap>>) -> bool {
    column.has_marker(Marker::Identity)
        || fluent_property(column, fluent).is_some_and(|map| map.identity)
}

// The fluent flags only apply to columns with no explicit markers at all.
fn is_ignored(column: &ColumnSpec, fluent: &Option<Arc<EntityMap>>) -> bool {
    if !column.markers.is_empty() {
        column.has_marker(Marker::Ignore) || column.has_marker(Marker::Identity)
    } else {
        fluent_property(column, fluent).is_some_and(|map| map.ignored || map.identity)
    }
}
