use crate::{Result, Row, Value};

/// Explicit per-column marker, the declarative analog of a mapping
/// attribute. A column with no markers at all falls back to the fluent
/// mapping registered for its entity, see [`crate::Mapper`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    /// Part of the primary key.
    PrimaryKey,
    /// Engine-generated on insert; implies ignored for writes.
    Identity,
    /// Never written by insert/update.
    Ignore,
}

/// One column of an entity, in declaration order.
#[derive(Debug, Clone, Copy)]
pub struct ColumnSpec {
    pub name: &'static str,
    pub markers: &'static [Marker],
}

impl ColumnSpec {
    pub const fn new(name: &'static str, markers: &'static [Marker]) -> Self {
        Self { name, markers }
    }

    pub fn has_marker(&self, marker: Marker) -> bool {
        self.markers.contains(&marker)
    }
}

/// Static description of an entity type: its name, an optional explicit
/// table override and the declared columns.
#[derive(Debug, Clone, Copy)]
pub struct EntityDescriptor {
    pub entity_name: &'static str,
    pub table: Option<&'static str>,
    pub columns: &'static [ColumnSpec],
}

impl EntityDescriptor {
    pub fn column(&self, name: &str) -> Option<&ColumnSpec> {
        self.columns.iter().find(|c| c.name == name)
    }
}

/// A record type mapped to a table.
///
/// Implemented once per type (by hand or by a companion descriptor), this is
/// the registry the resolver consults instead of runtime reflection.
pub trait Entity: Sized + Send + 'static {
    fn descriptor() -> &'static EntityDescriptor;

    /// The entity's column values in declaration order, every column
    /// included. The statement writer filters ignored columns itself.
    fn values(&self) -> Vec<(&'static str, Value)>;

    /// Materializes an entity from a result row. Columns missing from the
    /// row must map to their null/default representation.
    fn from_row(row: &Row) -> Result<Self>;
}
