use depot_core::{
    ColumnSpec, Engine, Entity, EntityDescriptor, EntityMetadata, Marker, Parameter,
    RepositoryError, Result, Row, StatementWriter, Value,
};
use indoc::indoc;

struct Customer {
    id: i64,
    name: String,
    email: String,
    last_login: Option<String>,
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
            ("LastLogin", self.last_login.clone().into()),
        ]
    }

    fn from_row(_: &Row) -> Result<Self> {
        unreachable!("not materialized in statement tests")
    }
}

struct Enrollment {
    student_id: i64,
    course_id: i64,
    grade: String,
}

impl Entity for Enrollment {
    fn descriptor() -> &'static EntityDescriptor {
        static DESCRIPTOR: EntityDescriptor = EntityDescriptor {
            entity_name: "Enrollment",
            table: None,
            columns: &[
                ColumnSpec::new("StudentId", &[Marker::PrimaryKey]),
                ColumnSpec::new("CourseId", &[Marker::PrimaryKey]),
                ColumnSpec::new("Grade", &[]),
            ],
        };
        &DESCRIPTOR
    }

    fn values(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("StudentId", self.student_id.into()),
            ("CourseId", self.course_id.into()),
            ("Grade", self.grade.clone().into()),
        ]
    }

    fn from_row(_: &Row) -> Result<Self> {
        unreachable!("not materialized in statement tests")
    }
}

struct Keyless {
    payload: String,
}

impl Entity for Keyless {
    fn descriptor() -> &'static EntityDescriptor {
        static DESCRIPTOR: EntityDescriptor = EntityDescriptor {
            entity_name: "Keyless",
            table: None,
            columns: &[ColumnSpec::new("Payload", &[])],
        };
        &DESCRIPTOR
    }

    fn values(&self) -> Vec<(&'static str, Value)> {
        vec![("Payload", self.payload.clone().into())]
    }

    fn from_row(_: &Row) -> Result<Self> {
        unreachable!("not materialized in statement tests")
    }
}

fn customer() -> Customer {
    Customer {
        id: 7,
        name: "Ann".into(),
        email: "a@x.com".into(),
        last_login: None,
    }
}

fn metadata<E: Entity>(engine: Engine) -> EntityMetadata {
    EntityMetadata::resolve::<E>(engine).unwrap()
}

fn names(parameters: &[Parameter]) -> Vec<&str> {
    parameters.iter().map(|p| p.name.as_str()).collect()
}

// Identity and ignored columns stay out of the column and placeholder
// lists; the parameters follow declaration order.
#[test]
fn insert_excludes_ignored_and_identity() {
    let writer = StatementWriter::new(Engine::SqlServer);
    let statement = writer
        .insert(&customer(), &metadata::<Customer>(Engine::SqlServer), false)
        .unwrap();
    assert_eq!(
        statement.sql,
        "INSERT INTO [Customer] ([Name], [Email]) VALUES (@Name, @Email);"
    );
    assert_eq!(names(&statement.parameters), vec!["Name", "Email"]);
    assert_eq!(statement.parameters[0].value, Value::Text("Ann".into()));
}

#[test]
fn insert_with_identity_appends_retrieval() {
    let writer = StatementWriter::new(Engine::SqlServer);
    let statement = writer
        .insert(&customer(), &metadata::<Customer>(Engine::SqlServer), true)
        .unwrap();
    assert_eq!(
        statement.sql,
        indoc! {"
            INSERT INTO [Customer] ([Name], [Email]) VALUES (@Name, @Email);
            SELECT CAST(SCOPE_IDENTITY() AS INT);"}
    );
}

#[test]
fn insert_identity_requires_engine_support() {
    let writer = StatementWriter::new(Engine::Oracle);
    let error = writer
        .insert(&customer(), &metadata::<Customer>(Engine::Oracle), true)
        .unwrap_err();
    assert!(matches!(
        error,
        RepositoryError::UnsupportedEngine { engine: Engine::Oracle, .. }
    ));
}

// The key column is excluded from SET but still bound, even though its
// identity marker also makes it ignored for writes.
#[test]
fn update_binds_key_outside_set() {
    let writer = StatementWriter::new(Engine::SqlServer);
    let statement = writer
        .update(&customer(), &metadata::<Customer>(Engine::SqlServer))
        .unwrap();
    assert_eq!(
        statement.sql,
        "UPDATE [Customer] SET [Name] = @Name, [Email] = @Email WHERE [Id] = @Id;"
    );
    assert_eq!(names(&statement.parameters), vec!["Id", "Name", "Email"]);
    assert_eq!(statement.parameters[0].value, Value::Int64(7));
}

#[test]
fn update_conjoins_composite_keys() {
    let writer = StatementWriter::new(Engine::SqlServer);
    let entity = Enrollment {
        student_id: 1,
        course_id: 2,
        grade: "A".into(),
    };
    let statement = writer
        .update(&entity, &metadata::<Enrollment>(Engine::SqlServer))
        .unwrap();
    assert_eq!(
        statement.sql,
        "UPDATE [Enrollment] SET [Grade] = @Grade \
         WHERE [StudentId] = @StudentId AND [CourseId] = @CourseId;"
    );
    assert_eq!(
        names(&statement.parameters),
        vec!["StudentId", "CourseId", "Grade"]
    );
}

#[test]
fn update_requires_a_primary_key() {
    let writer = StatementWriter::new(Engine::SqlServer);
    let entity = Keyless {
        payload: "x".into(),
    };
    assert!(matches!(
        writer.update(&entity, &metadata::<Keyless>(Engine::SqlServer)),
        Err(RepositoryError::MissingPrimaryKey { entity: "Keyless" })
    ));
}

#[test]
fn delete_requires_a_single_key() {
    let writer = StatementWriter::new(Engine::SqlServer);
    let statement = writer
        .delete(&metadata::<Customer>(Engine::SqlServer), Value::Int64(7))
        .unwrap();
    assert_eq!(statement.sql, "DELETE FROM [Customer] WHERE [Id] = @ID;");
    assert_eq!(names(&statement.parameters), vec!["ID"]);

    assert!(matches!(
        writer.delete(&metadata::<Enrollment>(Engine::SqlServer), Value::Int64(1)),
        Err(RepositoryError::CompositeKeyUnsupported { operation: "delete", .. })
    ));
    assert!(matches!(
        writer.delete(&metadata::<Keyless>(Engine::SqlServer), Value::Int64(1)),
        Err(RepositoryError::MissingPrimaryKey { .. })
    ));
}

#[test]
fn select_by_id_requires_a_single_key() {
    let writer = StatementWriter::new(Engine::SqlServer);
    let statement = writer
        .select_by_id(&metadata::<Customer>(Engine::SqlServer), Value::Int64(7))
        .unwrap();
    assert_eq!(statement.sql, "SELECT * FROM [Customer] WHERE [Id] = @ID;");

    assert!(matches!(
        writer.select_by_id(&metadata::<Enrollment>(Engine::SqlServer), Value::Int64(1)),
        Err(RepositoryError::CompositeKeyUnsupported { operation: "get_by_id", .. })
    ));
}

#[test]
fn select_all_is_unconditional() {
    let writer = StatementWriter::new(Engine::SqlServer);
    let statement = writer.select_all(&metadata::<Customer>(Engine::SqlServer));
    assert_eq!(statement.sql, "SELECT * FROM [Customer];");
    assert!(statement.parameters.is_empty());
}

#[test]
fn oracle_dialect_uses_colon_placeholders() {
    let writer = StatementWriter::new(Engine::Oracle);
    let statement = writer
        .select_by_id(&metadata::<Customer>(Engine::Oracle), Value::Int64(7))
        .unwrap();
    assert_eq!(statement.sql, "SELECT * FROM Customer WHERE Id = :ID;");
}

#[test]
fn oracle_identity_sequence_query() {
    assert_eq!(
        Engine::Oracle.sequence_identity_query("CUSTOMER_SEQ"),
        "SELECT CUSTOMER_SEQ.CURRVAL FROM DUAL"
    );
}
