//! An in-memory client emulating enough of a SQL engine to run the
//! statement shapes the statement writer and the scenario suite emit:
//! `SELECT * FROM`, `SELECT COUNT(*) FROM`, `INSERT INTO`, `UPDATE`,
//! `DELETE FROM`, scope-identity retrieval and snapshot-based transactions.

use anyhow::{Result, anyhow, bail};
use depot_core::{
    Client, ClientFactory, ColumnNames, CommandKind, DataTable, Engine, IsolationLevel, Parameter,
    Statement, Value,
};
use futures::future::BoxFuture;
use std::{
    collections::{BTreeMap, HashMap},
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::Duration,
};

type MemoryRow = BTreeMap<String, Value>;
type Tables = HashMap<String, MemoryTable>;

#[derive(Debug, Clone, Default)]
struct MemoryTable {
    rows: Vec<MemoryRow>,
    identity: Option<String>,
    next_identity: i64,
}

#[derive(Debug, Default)]
struct Shared {
    tables: Tables,
    last_identity: Option<i64>,
    opened_connections: usize,
    last_timeout: Option<Duration>,
}

/// The backing store shared by every client the factory hands out, so that
/// independent repository calls observe each other's writes like they would
/// against a real server. Emulates the SqlServer dialect only.
#[derive(Clone, Default)]
pub struct MemoryServer {
    shared: Arc<Mutex<Shared>>,
}

impl MemoryServer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a table, optionally naming the column the server generates
    /// on insert when the statement leaves it out.
    pub fn create_table(&self, name: &str, identity: Option<&str>) {
        let mut shared = self.lock();
        shared.tables.insert(
            name.to_string(),
            MemoryTable {
                identity: identity.map(str::to_string),
                ..Default::default()
            },
        );
    }

    /// How many connections have been opened since the server was created.
    pub fn opened_connections(&self) -> usize {
        self.lock().opened_connections
    }

    /// The command timeout attached to the most recent statement.
    pub fn last_timeout(&self) -> Option<Duration> {
        self.lock().last_timeout
    }

    pub fn row_count(&self, table: &str) -> usize {
        self.lock().tables.get(table).map_or(0, |t| t.rows.len())
    }

    fn lock(&self) -> MutexGuard<'_, Shared> {
        self.shared.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ClientFactory for MemoryServer {
    fn client(&self, engine: Engine, _connection_string: &str) -> Option<Box<dyn Client>> {
        matches!(engine, Engine::SqlServer).then(|| {
            Box::new(MemoryClient {
                shared: self.shared.clone(),
                open: false,
                snapshot: None,
            }) as Box<dyn Client>
        })
    }
}

pub struct MemoryClient {
    shared: Arc<Mutex<Shared>>,
    open: bool,
    snapshot: Option<Tables>,
}

enum Outcome {
    Rows(DataTable),
    Affected(u64),
}

impl MemoryClient {
    fn lock(&self) -> MutexGuard<'_, Shared> {
        self.shared.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn run(&mut self, statement: &Statement, timeout: Option<Duration>) -> Result<Vec<Outcome>> {
        if !self.open {
            bail!("the connection is not open");
        }
        self.lock().last_timeout = timeout;
        if statement.kind == CommandKind::Procedure {
            bail!(
                "procedure `{}` is not defined in the memory backend",
                statement.sql
            );
        }
        statement
            .sql
            .split([';', '\n'])
            .map(str::trim)
            .filter(|segment| !segment.is_empty())
            .map(|segment| self.run_segment(segment, &statement.parameters))
            .collect()
    }

    fn run_segment(&mut self, sql: &str, parameters: &[Parameter]) -> Result<Outcome> {
        let upper = sql.to_uppercase();
        let mut shared = self.lock();

        if upper.contains("SCOPE_IDENTITY") {
            let identity = shared
                .last_identity
                .ok_or_else(|| anyhow!("no identity value in scope"))?;
            return Ok(Outcome::Rows(single_cell(Value::Int64(identity))));
        }

        if let Some(rest) = strip_prefix(sql, &upper, "SELECT COUNT(*) FROM ") {
            let (head, conditions) = split_on_where(rest);
            let table = lookup(&shared.tables, &unquote(head))?;
            let count = filtered(&table.rows, conditions, parameters)?.len();
            return Ok(Outcome::Rows(single_cell(Value::Int64(count as i64))));
        }

        if let Some(rest) = strip_prefix(sql, &upper, "SELECT * FROM ") {
            let (head, conditions) = split_on_where(rest);
            let table = lookup(&shared.tables, &unquote(head))?;
            let rows = filtered(&table.rows, conditions, parameters)?;
            return Ok(Outcome::Rows(materialize(rows)));
        }

        if let Some(rest) = strip_prefix(sql, &upper, "INSERT INTO ") {
            let table_name = unquote(first_token(rest));
            let mut row: MemoryRow = parameters
                .iter()
                .map(|p| (p.name.clone(), p.value.clone()))
                .collect();
            let generated = {
                let table = lookup_mut(&mut shared.tables, &table_name)?;
                match table.identity.clone() {
                    Some(identity) if !row.contains_key(&identity) => {
                        table.next_identity += 1;
                        row.insert(identity, Value::Int64(table.next_identity));
                        Some(table.next_identity)
                    }
                    _ => None,
                }
            };
            if generated.is_some() {
                shared.last_identity = generated;
            }
            lookup_mut(&mut shared.tables, &table_name)?.rows.push(row);
            return Ok(Outcome::Affected(1));
        }

        if strip_prefix(sql, &upper, "UPDATE ").is_some() {
            let table_name = unquote(first_token(&sql["UPDATE ".len()..]));
            let set_start = upper
                .find(" SET ")
                .ok_or_else(|| anyhow!("UPDATE without SET"))?;
            let (set_part, conditions) = split_on_where(&sql[set_start + " SET ".len()..]);
            let assignments = parse_pairs(set_part, ", ")?;
            let conditions = parse_pairs(conditions.unwrap_or(""), " AND ")?;
            let table = lookup_mut(&mut shared.tables, &table_name)?;
            let mut affected = 0;
            for row in &mut table.rows {
                if row_matches(row, &conditions, parameters)? {
                    for (column, parameter) in &assignments {
                        row.insert(column.clone(), value_of(parameters, parameter)?);
                    }
                    affected += 1;
                }
            }
            return Ok(Outcome::Affected(affected));
        }

        if let Some(rest) = strip_prefix(sql, &upper, "DELETE FROM ") {
            let (head, conditions) = split_on_where(rest);
            let conditions = parse_pairs(conditions.unwrap_or(""), " AND ")?;
            let table = lookup_mut(&mut shared.tables, &unquote(head))?;
            let before = table.rows.len();
            let mut kept = Vec::with_capacity(before);
            for row in table.rows.drain(..) {
                if !row_matches(&row, &conditions, parameters)? {
                    kept.push(row);
                }
            }
            let affected = (before - kept.len()) as u64;
            table.rows = kept;
            return Ok(Outcome::Affected(affected));
        }

        bail!("unsupported statement: {sql}")
    }
}

impl Client for MemoryClient {
    fn open(&mut self) -> BoxFuture<'_, Result<()>> {
        Box::pin(async move {
            if !self.open {
                self.open = true;
                self.lock().opened_connections += 1;
            }
            Ok(())
        })
    }

    fn close(&mut self) -> BoxFuture<'_, Result<()>> {
        Box::pin(async move {
            self.open = false;
            Ok(())
        })
    }

    fn execute<'a>(
        &'a mut self,
        statement: &'a Statement,
        timeout: Option<Duration>,
    ) -> BoxFuture<'a, Result<u64>> {
        Box::pin(async move {
            let total = self
                .run(statement, timeout)?
                .into_iter()
                .map(|outcome| match outcome {
                    Outcome::Affected(n) => n,
                    Outcome::Rows(_) => 0,
                })
                .sum();
            Ok(total)
        })
    }

    fn fetch<'a>(
        &'a mut self,
        statement: &'a Statement,
        timeout: Option<Duration>,
    ) -> BoxFuture<'a, Result<DataTable>> {
        Box::pin(async move {
            let rows = self
                .run(statement, timeout)?
                .into_iter()
                .filter_map(|outcome| match outcome {
                    Outcome::Rows(table) => Some(table),
                    Outcome::Affected(_) => None,
                })
                .next_back();
            Ok(rows.unwrap_or_default())
        })
    }

    fn fetch_scalar<'a>(
        &'a mut self,
        statement: &'a Statement,
        timeout: Option<Duration>,
    ) -> BoxFuture<'a, Result<Option<Value>>> {
        Box::pin(async move {
            let table = self.fetch(statement, timeout).await?;
            Ok(table.scalar().cloned())
        })
    }

    fn begin(&mut self, _isolation: IsolationLevel) -> BoxFuture<'_, Result<()>> {
        Box::pin(async move {
            if self.snapshot.is_some() {
                bail!("a transaction is already active on this connection");
            }
            let tables = self.lock().tables.clone();
            self.snapshot = Some(tables);
            Ok(())
        })
    }

    fn commit(&mut self) -> BoxFuture<'_, Result<()>> {
        Box::pin(async move {
            if self.snapshot.take().is_none() {
                bail!("no transaction to commit");
            }
            Ok(())
        })
    }

    fn rollback(&mut self) -> BoxFuture<'_, Result<()>> {
        Box::pin(async move {
            let snapshot = self
                .snapshot
                .take()
                .ok_or_else(|| anyhow!("no transaction to roll back"))?;
            self.lock().tables = snapshot;
            Ok(())
        })
    }
}

fn lookup<'a>(tables: &'a Tables, name: &str) -> Result<&'a MemoryTable> {
    tables
        .get(name)
        .ok_or_else(|| anyhow!("table `{name}` does not exist"))
}

fn lookup_mut<'a>(tables: &'a mut Tables, name: &str) -> Result<&'a mut MemoryTable> {
    tables
        .get_mut(name)
        .ok_or_else(|| anyhow!("table `{name}` does not exist"))
}

fn strip_prefix<'a>(sql: &'a str, upper: &str, prefix: &str) -> Option<&'a str> {
    upper.starts_with(prefix).then(|| &sql[prefix.len()..])
}

fn first_token(input: &str) -> &str {
    input.split_whitespace().next().unwrap_or("")
}

fn unquote(token: &str) -> String {
    token
        .trim()
        .trim_matches(|c| c == '[' || c == ']' || c == '"')
        .to_string()
}

/// Splits `<head> [WHERE <conditions>]` on the keyword, byte positions being
/// stable because the emulated dialect is pure ASCII.
fn split_on_where(rest: &str) -> (&str, Option<&str>) {
    match rest.to_uppercase().find(" WHERE ") {
        Some(position) => (
            rest[..position].trim(),
            Some(rest[position + " WHERE ".len()..].trim()),
        ),
        None => (rest.trim(), None),
    }
}

/// Parses `col = @param` pairs separated by `separator` into
/// `(column, parameter name)` tuples.
fn parse_pairs(input: &str, separator: &str) -> Result<Vec<(String, String)>> {
    let input = input.trim();
    if input.is_empty() {
        return Ok(Vec::new());
    }
    input
        .split(separator)
        .map(|pair| {
            let (column, placeholder) = pair
                .split_once('=')
                .ok_or_else(|| anyhow!("malformed condition: {pair}"))?;
            let parameter = placeholder.trim().trim_start_matches(['@', ':']);
            Ok((unquote(column), parameter.to_string()))
        })
        .collect()
}

fn value_of(parameters: &[Parameter], name: &str) -> Result<Value> {
    parameters
        .iter()
        .find(|p| p.name.eq_ignore_ascii_case(name))
        .map(|p| p.value.clone())
        .ok_or_else(|| anyhow!("parameter `{name}` was not supplied"))
}

// Integers compare numerically regardless of width, the way an engine
// evaluates `Id = 1` against a BIGINT column.
fn values_equal(left: &Value, right: &Value) -> bool {
    match (left.as_i64(), right.as_i64()) {
        (Some(left), Some(right)) => left == right,
        _ => left == right,
    }
}

fn row_matches(
    row: &MemoryRow,
    conditions: &[(String, String)],
    parameters: &[Parameter],
) -> Result<bool> {
    for (column, parameter) in conditions {
        let expected = value_of(parameters, parameter)?;
        match row.get(column) {
            Some(stored) if values_equal(stored, &expected) => {}
            _ => return Ok(false),
        }
    }
    Ok(true)
}

fn filtered(
    rows: &[MemoryRow],
    conditions: Option<&str>,
    parameters: &[Parameter],
) -> Result<Vec<MemoryRow>> {
    let conditions = parse_pairs(conditions.unwrap_or(""), " AND ")?;
    let mut result = Vec::new();
    for row in rows {
        if row_matches(row, &conditions, parameters)? {
            result.push(row.clone());
        }
    }
    Ok(result)
}

fn materialize(rows: Vec<MemoryRow>) -> DataTable {
    let Some(first) = rows.first() else {
        return DataTable::default();
    };
    let columns: ColumnNames = first.keys().cloned().collect::<Vec<_>>().into();
    let rows = rows
        .into_iter()
        .map(|row| row.into_values().collect())
        .collect();
    DataTable { columns, rows }
}

fn single_cell(value: Value) -> DataTable {
    DataTable {
        columns: vec!["Value".to_string()].into(),
        rows: vec![vec![value].into_boxed_slice()],
    }
}
