use depot_core::{
    ColumnSpec, Entity, EntityDescriptor, Marker, RepositoryError, Result, Row, Value,
};
use time::OffsetDateTime;

/// The entity shared by the scenarios: a server-generated key, two plain
/// columns and one column excluded from writes.
#[derive(Debug, Clone, PartialEq)]
pub struct Customer {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub last_login: Option<OffsetDateTime>,
}

impl Customer {
    pub fn new(name: &str, email: &str) -> Self {
        Self {
            id: 0,
            name: name.into(),
            email: email.into(),
            last_login: None,
        }
    }
}

impl Entity for Customer {
    fn descriptor() -> &'static EntityDescriptor {
        static DESCRIPTOR: EntityDescriptor = EntityDescriptor {
            entity_name: "Customer",
            table: None,
            columns: &[
                ColumnSpec::new("Id", &[Marker::PrimaryKey, Marker::Identity]),
                ColumnSpec::new("Name", &[]),
                ColumnSpec::new("Email", &[]),
                ColumnSpec::new("LastLogin", &[Marker::Ignore]),
            ],
        };
        &DESCRIPTOR
    }

    fn values(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("Id", self.id.into()),
            ("Name", self.name.clone().into()),
            ("Email", self.email.clone().into()),
            ("LastLogin", self.last_login.into()),
        ]
    }

    fn from_row(row: &Row) -> Result<Self> {
        Ok(Self {
            id: row
                .get("Id")
                .and_then(Value::as_i64)
                .ok_or_else(|| RepositoryError::data_access("Customer row is missing `Id`"))?,
            name: row
                .get("Name")
                .and_then(Value::as_str)
                .ok_or_else(|| RepositoryError::data_access("Customer row is missing `Name`"))?
                .to_string(),
            email: row
                .get("Email")
                .and_then(Value::as_str)
                .ok_or_else(|| RepositoryError::data_access("Customer row is missing `Email`"))?
                .to_string(),
            last_login: row.get("LastLogin").and_then(Value::as_timestamp),
        })
    }
}
