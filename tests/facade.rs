use depot::{
    ColumnSpec, Engine, Entity, EntityDescriptor, EntityMetadata, Marker, Result, Row,
    StatementWriter, Value,
};

struct Device {
    serial: String,
    label: String,
}

impl Entity for Device {
    fn descriptor() -> &'static EntityDescriptor {
        static DESCRIPTOR: EntityDescriptor = EntityDescriptor {
            entity_name: "Device",
            table: Some("Devices"),
            columns: &[
                ColumnSpec::new("Serial", &[Marker::PrimaryKey]),
                ColumnSpec::new("Label", &[]),
            ],
        };
        &DESCRIPTOR
    }

    fn values(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("Serial", self.serial.clone().into()),
            ("Label", self.label.clone().into()),
        ]
    }

    fn from_row(row: &Row) -> Result<Self> {
        Ok(Self {
            serial: row
                .get("Serial")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            label: row
                .get("Label")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
        })
    }
}

// The root crate re-exports the whole core surface.
#[test]
fn facade_exposes_the_core_surface() {
    let metadata = EntityMetadata::resolve::<Device>(Engine::SqlServer).unwrap();
    assert_eq!(metadata.table_name, "[Devices]");
    assert_eq!(metadata.primary_keys, vec!["Serial"]);

    let writer = StatementWriter::new(Engine::SqlServer);
    let device = Device {
        serial: "X1".into(),
        label: "gateway".into(),
    };
    let statement = writer.update(&device, &metadata).unwrap();
    assert_eq!(
        statement.sql,
        "UPDATE [Devices] SET [Label] = @Label WHERE [Serial] = @Serial;"
    );
    assert_eq!(Value::from(Some(3_i64)), Value::Int64(3));
    assert!(Value::from(None::<i64>).is_null());
}
