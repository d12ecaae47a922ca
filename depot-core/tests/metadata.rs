use depot_core::{
    ColumnSpec, Engine, Entity, EntityDescriptor, EntityMap, EntityMetadata, Mapper, Marker,
    RepositoryError, Result, Row, Value,
};
use std::sync::Arc;

macro_rules! descriptor_entity {
    ($type:ident, $name:literal, $table:expr, [$(($column:literal, [$($marker:expr),*])),* $(,)?]) => {
        struct $type;
        impl Entity for $type {
            fn descriptor() -> &'static EntityDescriptor {
                static DESCRIPTOR: EntityDescriptor = EntityDescriptor {
                    entity_name: $name,
                    table: $table,
                    columns: &[$(ColumnSpec::new($column, &[$($marker),*])),*],
                };
                &DESCRIPTOR
            }
            fn values(&self) -> Vec<(&'static str, Value)> {
                Vec::new()
            }
            fn from_row(_: &Row) -> Result<Self> {
                unreachable!("not materialized in metadata tests")
            }
        }
    };
}

#[test]
fn table_name_explicit_override() {
    descriptor_entity!(Invoice, "Invoice", Some("Billing_Invoices"), [("Id", [Marker::PrimaryKey])]);
    let metadata = EntityMetadata::resolve::<Invoice>(Engine::SqlServer).unwrap();
    assert_eq!(metadata.table_name, "[Billing_Invoices]");
}

#[test]
fn table_name_fluent_fallback() {
    descriptor_entity!(Receipt, "Receipt", None, [("Id", [Marker::PrimaryKey])]);
    Mapper::initialize(|cfg| {
        cfg.add_map::<Receipt>(EntityMap::new().table("ReceiptArchive"));
    });
    let metadata = EntityMetadata::resolve::<Receipt>(Engine::SqlServer).unwrap();
    assert_eq!(metadata.table_name, "[ReceiptArchive]");
}

#[test]
fn table_name_blank_fluent_is_skipped() {
    descriptor_entity!(Voucher, "Voucher", None, [("Id", [Marker::PrimaryKey])]);
    Mapper::initialize(|cfg| {
        cfg.add_map::<Voucher>(EntityMap::new().table("  "));
    });
    let metadata = EntityMetadata::resolve::<Voucher>(Engine::SqlServer).unwrap();
    assert_eq!(metadata.table_name, "[Voucher]");
}

#[test]
fn table_name_dialects() {
    descriptor_entity!(LineItem, "LineItem", None, [("Id", [Marker::PrimaryKey])]);
    assert_eq!(
        EntityMetadata::resolve::<LineItem>(Engine::SqlServer).unwrap().table_name,
        "[LineItem]"
    );
    assert_eq!(
        EntityMetadata::resolve::<LineItem>(Engine::Postgres).unwrap().table_name,
        "lineitem"
    );
    assert_eq!(
        EntityMetadata::resolve::<LineItem>(Engine::Oracle).unwrap().table_name,
        "LineItem"
    );
}

// The explicit key marker wins over conflicting fluent metadata.
#[test]
fn primary_key_marker_beats_fluent() {
    descriptor_entity!(Account, "Account", None, [
        ("Code", [Marker::PrimaryKey]),
        ("Name", []),
    ]);
    Mapper::initialize(|cfg| {
        cfg.add_map::<Account>(EntityMap::new().property("Code", |p| p));
    });
    let metadata = EntityMetadata::resolve::<Account>(Engine::SqlServer).unwrap();
    assert_eq!(metadata.primary_keys, vec!["Code"]);
}

#[test]
fn primary_key_from_fluent_only() {
    descriptor_entity!(Region, "Region", None, [("Code", []), ("Name", [])]);
    Mapper::initialize(|cfg| {
        cfg.add_map::<Region>(EntityMap::new().property("code", |p| p.key()));
    });
    let metadata = EntityMetadata::resolve::<Region>(Engine::SqlServer).unwrap();
    // Fluent property lookup is case-insensitive.
    assert_eq!(metadata.primary_keys, vec!["Code"]);
}

#[test]
fn composite_key_declaration_order() {
    descriptor_entity!(Membership, "Membership", None, [
        ("UserId", [Marker::PrimaryKey]),
        ("GroupId", [Marker::PrimaryKey]),
        ("Role", []),
    ]);
    let metadata = EntityMetadata::resolve::<Membership>(Engine::SqlServer).unwrap();
    assert_eq!(metadata.primary_keys, vec!["UserId", "GroupId"]);
    assert!(matches!(
        metadata.single_primary_key("delete"),
        Err(RepositoryError::CompositeKeyUnsupported { operation: "delete", .. })
    ));
}

#[test]
fn no_primary_key_resolves_empty() {
    descriptor_entity!(AuditEvent, "AuditEvent", None, [("Payload", [])]);
    let metadata = EntityMetadata::resolve::<AuditEvent>(Engine::SqlServer).unwrap();
    assert!(metadata.primary_keys.is_empty());
    assert!(matches!(
        metadata.single_primary_key("get_by_id"),
        Err(RepositoryError::MissingPrimaryKey { entity: "AuditEvent" })
    ));
}

// A single pass in declaration order: the first column that qualifies by
// either route wins, even when a later column carries the explicit marker.
#[test]
fn identity_first_match_wins() {
    descriptor_entity!(Ticket, "Ticket", None, [
        ("Serial", []),
        ("Id", [Marker::Identity]),
    ]);
    Mapper::initialize(|cfg| {
        cfg.add_map::<Ticket>(EntityMap::new().property("Serial", |p| p.identity()));
    });
    let metadata = EntityMetadata::resolve::<Ticket>(Engine::SqlServer).unwrap();
    assert_eq!(metadata.identity, Some("Serial"));
}

#[test]
fn identity_marker_implies_ignored() {
    descriptor_entity!(Order, "Order", None, [
        ("Id", [Marker::PrimaryKey, Marker::Identity]),
        ("Total", []),
    ]);
    let metadata = EntityMetadata::resolve::<Order>(Engine::SqlServer).unwrap();
    assert_eq!(metadata.identity, Some("Id"));
    assert!(metadata.is_ignored("Id"));
    assert!(!metadata.is_ignored("Total"));
}

// Any explicit marker on a column shuts the fluent ignored/identity flags
// out for that column.
#[test]
fn explicit_markers_gate_fluent_ignore() {
    descriptor_entity!(Shipment, "Shipment", None, [
        ("Id", [Marker::PrimaryKey]),
        ("Notes", []),
    ]);
    Mapper::initialize(|cfg| {
        cfg.add_map::<Shipment>(
            EntityMap::new()
                .property("Id", |p| p.ignored())
                .property("Notes", |p| p.ignored()),
        );
    });
    let metadata = EntityMetadata::resolve::<Shipment>(Engine::SqlServer).unwrap();
    assert!(!metadata.is_ignored("Id"));
    assert!(metadata.is_ignored("Notes"));
}

#[test]
fn fluent_identity_is_ignored_for_writes() {
    descriptor_entity!(Batch, "Batch", None, [("Id", []), ("Label", [])]);
    Mapper::initialize(|cfg| {
        cfg.add_map::<Batch>(EntityMap::new().property("Id", |p| p.key().identity()));
    });
    let metadata = EntityMetadata::resolve::<Batch>(Engine::SqlServer).unwrap();
    assert_eq!(metadata.primary_keys, vec!["Id"]);
    assert_eq!(metadata.identity, Some("Id"));
    assert!(metadata.is_ignored("Id"));
}

#[test]
fn wrong_mapping_kind_fails_resolution() {
    descriptor_entity!(Legacy, "Legacy", None, [("Id", [Marker::PrimaryKey])]);
    Mapper::initialize(|cfg| {
        cfg.add_raw::<Legacy>(Arc::new("not an entity map".to_string()));
    });
    let error = EntityMetadata::resolve::<Legacy>(Engine::SqlServer).unwrap_err();
    assert!(matches!(
        error,
        RepositoryError::MappingConfiguration { entity: "Legacy" }
    ));
    assert_eq!(
        error.to_string(),
        "`Legacy` mapping must be registered as an `EntityMap`"
    );
}

#[test]
fn mapper_reports_registrations() {
    descriptor_entity!(Probe, "Probe", None, [("Id", [Marker::PrimaryKey])]);
    Mapper::initialize(|cfg| {
        cfg.add_map::<Probe>(EntityMap::new());
    });
    assert!(!Mapper::is_empty());
}
