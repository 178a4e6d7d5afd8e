//! SQLite connector built on rusqlite.
//!
//! Every call opens its own connection. A running query lives on a worker
//! thread that owns the connection and the statement; rows cross to the
//! caller over a rendezvous channel, so the cursor only advances when the
//! caller asks for the next row. Dropping the receiving side unblocks the
//! worker, and the iterator's release guard joins it.

use std::sync::mpsc::{self, SyncSender};
use std::thread;

use rusqlite::types::{ToSqlOutput, ValueRef};
use rusqlite::{Connection, Statement, ToSql};

use super::introspect::{collect_schema, CatalogSession, SourceColumn, TableName};
use super::record::{RecordIterator, ReleaseGuard};
use super::registry::SQLITE;
use super::{Column, Connector, ConnectorError, ConnectorResult, Row, TableColumnMetadata, Value};
use crate::config::BackendKind;

/// Schema name reported for every SQLite table.
const SCHEMA: &str = "main";

/// Connector for a local SQLite database file.
#[derive(Debug, Clone)]
pub struct SqliteConnector {
    path: String,
    catalog: String,
}

impl SqliteConnector {
    /// `path` may be `:memory:`, in which case every call sees a fresh,
    /// empty database.
    pub fn new(path: impl Into<String>, catalog: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            catalog: catalog.into(),
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    fn connect(&self, operation: &'static str) -> ConnectorResult<Connection> {
        open_connection(&self.path).map_err(backend(operation))
    }
}

impl Connector for SqliteConnector {
    fn kind(&self) -> BackendKind {
        BackendKind::Sqlite
    }

    fn get_schema(&self) -> ConnectorResult<Vec<TableColumnMetadata>> {
        let conn = self.connect("get_schema")?;
        let mut session = SqliteSession {
            conn: &conn,
            catalog: &self.catalog,
        };
        let rows = collect_schema(&mut session)?;
        tracing::debug!(path = %self.path, columns = rows.len(), "sqlite schema loaded");
        Ok(rows)
    }

    fn describe(&self, sql: &str, params: &[Value]) -> ConnectorResult<Vec<Column>> {
        tracing::debug!(sql, params = params.len(), "sqlite describe");
        let conn = self.connect("describe")?;
        let mut stmt = conn.prepare(sql).map_err(backend("describe"))?;
        bind(&mut stmt, params).map_err(backend("describe"))?;
        result_columns(&stmt)
    }

    fn query(&self, sql: &str, params: &[Value]) -> ConnectorResult<RecordIterator> {
        tracing::debug!(sql, params = params.len(), "sqlite query");
        let path = self.path.clone();
        let sql = sql.to_string();
        let params = params.to_vec();

        let (columns_tx, columns_rx) = mpsc::sync_channel(1);
        let (rows_tx, rows_rx) = mpsc::sync_channel(0);
        let worker = thread::Builder::new()
            .name("strata-sqlite-cursor".into())
            .spawn(move || run_cursor(&path, &sql, &params, columns_tx, rows_tx))
            .map_err(|e| ConnectorError::backend("query", e))?;

        let mut guard = ReleaseGuard::new(move || {
            if worker.join().is_err() {
                tracing::error!("sqlite cursor worker panicked");
            }
        });

        match columns_rx.recv() {
            Ok(Ok(columns)) => Ok(RecordIterator::new(
                columns,
                Box::new(rows_rx.into_iter()),
                guard,
            )),
            Ok(Err(e)) => {
                drop(rows_rx);
                guard.release();
                Err(e)
            }
            Err(_) => {
                drop(rows_rx);
                guard.release();
                Err(ConnectorError::backend(
                    "query",
                    "cursor worker exited before reporting columns",
                ))
            }
        }
    }

    fn execute(&self, sql: &str) -> ConnectorResult<()> {
        tracing::debug!(sql, "sqlite execute");
        let conn = self.connect("execute")?;
        conn.execute_batch(sql).map_err(backend("execute"))
    }
}

fn backend(operation: &'static str) -> impl Fn(rusqlite::Error) -> ConnectorError {
    move |e| ConnectorError::backend(operation, e)
}

fn open_connection(path: &str) -> rusqlite::Result<Connection> {
    if path == ":memory:" {
        Connection::open_in_memory()
    } else {
        Connection::open(path)
    }
}

/// Bind 1-based positional parameters without stepping the statement.
fn bind(stmt: &mut Statement<'_>, params: &[Value]) -> rusqlite::Result<()> {
    let expected = stmt.parameter_count();
    if expected != params.len() {
        return Err(rusqlite::Error::InvalidParameterCount(params.len(), expected));
    }
    for (i, param) in params.iter().enumerate() {
        stmt.raw_bind_parameter(i + 1, param)?;
    }
    Ok(())
}

/// Columns from declared types. Expressions have no declared type and map
/// through BLOB affinity.
fn result_columns(stmt: &Statement<'_>) -> ConnectorResult<Vec<Column>> {
    stmt.columns()
        .iter()
        .map(|c| Ok(Column::new(c.name(), SQLITE.canonical(c.decl_type().unwrap_or(""))?)))
        .collect()
}

fn prepare_cursor<'c>(
    conn: &'c Connection,
    sql: &str,
    params: &[Value],
) -> ConnectorResult<(Statement<'c>, Vec<Column>)> {
    let mut stmt = conn.prepare(sql).map_err(backend("query"))?;
    bind(&mut stmt, params).map_err(backend("query"))?;
    let columns = result_columns(&stmt)?;
    Ok((stmt, columns))
}

fn run_cursor(
    path: &str,
    sql: &str,
    params: &[Value],
    columns_tx: SyncSender<ConnectorResult<Vec<Column>>>,
    rows_tx: SyncSender<ConnectorResult<Row>>,
) {
    let conn = match open_connection(path) {
        Ok(conn) => conn,
        Err(e) => {
            let _ = columns_tx.send(Err(ConnectorError::backend("query", e)));
            return;
        }
    };
    let (mut stmt, columns) = match prepare_cursor(&conn, sql, params) {
        Ok(prepared) => prepared,
        Err(e) => {
            let _ = columns_tx.send(Err(e));
            return;
        }
    };
    let width = columns.len();
    if columns_tx.send(Ok(columns)).is_err() {
        return;
    }

    let mut rows = stmt.raw_query();
    let mut sent = 0usize;
    loop {
        let next = match rows.next() {
            Ok(Some(row)) => read_row(row, width).map_err(backend("query")),
            Ok(None) => break,
            Err(e) => Err(ConnectorError::backend("query", e)),
        };
        let failed = next.is_err();
        // A send error means the caller closed the iterator.
        if rows_tx.send(next).is_err() || failed {
            break;
        }
        sent += 1;
    }
    tracing::debug!(rows = sent, "sqlite cursor finished");
}

fn read_row(row: &rusqlite::Row<'_>, width: usize) -> rusqlite::Result<Row> {
    (0..width)
        .map(|i| row.get_ref(i).map(value_from_ref))
        .collect()
}

fn value_from_ref(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(n) => Value::Int(n),
        ValueRef::Real(f) => Value::Float(f),
        ValueRef::Text(t) => Value::Text(String::from_utf8_lossy(t).into_owned()),
        ValueRef::Blob(b) => Value::Bytes(b.to_vec()),
    }
}

impl ToSql for Value {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            Value::Null => ToSqlOutput::Owned(rusqlite::types::Value::Null),
            Value::Bool(b) => ToSqlOutput::from(*b),
            Value::Int(n) => ToSqlOutput::from(*n),
            Value::Float(f) => ToSqlOutput::from(*f),
            Value::Text(s) => ToSqlOutput::Borrowed(ValueRef::Text(s.as_bytes())),
            Value::Bytes(b) => ToSqlOutput::Borrowed(ValueRef::Blob(b)),
        })
    }
}

struct SqliteSession<'a> {
    conn: &'a Connection,
    catalog: &'a str,
}

impl CatalogSession for SqliteSession<'_> {
    fn reset_schema_cache(&mut self) -> ConnectorResult<()> {
        self.conn.flush_prepared_statement_cache();
        Ok(())
    }

    fn tables(&mut self) -> ConnectorResult<Vec<TableName>> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT name FROM sqlite_master \
                 WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
            )
            .map_err(backend("get_schema"))?;
        let names = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .and_then(|rows| rows.collect::<rusqlite::Result<Vec<_>>>())
            .map_err(backend("get_schema"))?;

        Ok(names
            .into_iter()
            .map(|name| TableName {
                catalog: self.catalog.to_string(),
                schema: SCHEMA.to_string(),
                name,
            })
            .collect())
    }

    fn columns(&mut self, table: &TableName) -> ConnectorResult<Vec<SourceColumn>> {
        let mut stmt = self
            .conn
            .prepare("SELECT cid, name, type, \"notnull\" FROM pragma_table_info(?1) ORDER BY cid")
            .map_err(backend("get_schema"))?;
        stmt.query_map([&table.name], |row| {
            Ok(SourceColumn {
                ordinal: row.get::<_, u32>(0)? + 1,
                name: row.get(1)?,
                data_type: row.get(2)?,
                nullable: row.get::<_, i64>(3)? == 0,
            })
        })
        .and_then(|rows| rows.collect::<rusqlite::Result<Vec<_>>>())
        .map_err(backend("get_schema"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sql::CanonicalType;
    use std::path::PathBuf;

    struct TempDb {
        path: PathBuf,
        connector: SqliteConnector,
    }

    impl TempDb {
        fn new(name: &str) -> Self {
            let path = std::env::temp_dir().join(format!(
                "strata-sqlite-{}-{}.db",
                name,
                std::process::id()
            ));
            let _ = std::fs::remove_file(&path);
            let connector = SqliteConnector::new(path.to_string_lossy(), "warehouse");
            connector
                .execute(
                    "CREATE TABLE orders (id INTEGER NOT NULL, note VARCHAR(20), total REAL);
                     INSERT INTO orders VALUES (1, 'a', 1.5), (2, NULL, 2.5), (3, 'c', 3.5);",
                )
                .unwrap();
            Self { path, connector }
        }

        fn count(&self) -> i64 {
            let mut rows = self
                .connector
                .query("SELECT count(*) FROM orders", &[])
                .unwrap();
            match rows.next().unwrap().unwrap()[0] {
                Value::Int(n) => n,
                ref other => panic!("unexpected {other:?}"),
            }
        }
    }

    impl Drop for TempDb {
        fn drop(&mut self) {
            let _ = std::fs::remove_file(&self.path);
        }
    }

    #[test]
    fn test_get_schema() {
        let db = TempDb::new("schema");
        let schema = db.connector.get_schema().unwrap();
        assert_eq!(schema.len(), 3);
        assert_eq!(schema[0].table_catalog, "\"warehouse\"");
        assert_eq!(schema[0].table_schema, "\"main\"");
        assert_eq!(schema[0].table_name, "\"orders\"");
        assert_eq!(schema[0].column_name, "id");
        assert_eq!(schema[0].ordinal_position, 1);
        assert!(!schema[0].is_nullable);
        assert_eq!(schema[1].data_type, "VARCHAR(20)");
        assert!(schema[1].is_nullable);
        assert_eq!(schema[2].ordinal_position, 3);
    }

    #[test]
    fn test_describe_maps_declared_types() {
        let db = TempDb::new("describe");
        let columns = db
            .connector
            .describe(
                "SELECT id, note, total, id + 1 AS next FROM orders WHERE id = ?",
                &[Value::Int(1)],
            )
            .unwrap();
        assert_eq!(
            columns,
            vec![
                Column::new("id", CanonicalType::Int64),
                Column::new("note", CanonicalType::Varchar),
                Column::new("total", CanonicalType::Float64),
                Column::new("next", CanonicalType::Varbinary),
            ]
        );
    }

    #[test]
    fn test_describe_never_executes() {
        let db = TempDb::new("describe-noexec");
        let columns = db
            .connector
            .describe("INSERT INTO orders (id) VALUES (?1)", &[Value::Int(9)])
            .unwrap();
        assert!(columns.is_empty());
        assert_eq!(db.count(), 3);
    }

    #[test]
    fn test_describe_parameter_count_mismatch() {
        let db = TempDb::new("describe-params");
        let err = db
            .connector
            .describe("SELECT id FROM orders WHERE id = ?", &[])
            .unwrap_err();
        assert!(matches!(err, ConnectorError::Backend { operation: "describe", .. }));
    }

    #[test]
    fn test_query_streams_rows() {
        let db = TempDb::new("query");
        let rows = db
            .connector
            .query(
                "SELECT id, note FROM orders WHERE id >= ? ORDER BY id",
                &[Value::Int(2)],
            )
            .unwrap();
        assert_eq!(rows.columns()[1], Column::new("note", CanonicalType::Varchar));
        let rows: Vec<Row> = rows.collect::<ConnectorResult<_>>().unwrap();
        assert_eq!(
            rows,
            vec![
                vec![Value::Int(2), Value::Null],
                vec![Value::Int(3), Value::Text("c".into())],
            ]
        );
    }

    #[test]
    fn test_query_closed_early_releases_worker() {
        let db = TempDb::new("query-close");
        let mut rows = db.connector.query("SELECT id FROM orders", &[]).unwrap();
        assert!(rows.next().is_some());
        rows.close();
        assert!(rows.is_closed());
        assert!(rows.next().is_none());

        let rows = db.connector.query("SELECT id FROM orders", &[]).unwrap();
        drop(rows);

        db.connector.execute("DROP TABLE orders").unwrap();
    }

    #[test]
    fn test_query_invalid_sql() {
        let db = TempDb::new("query-invalid");
        let err = db.connector.query("SELECT nope FROM orders", &[]).unwrap_err();
        assert!(matches!(err, ConnectorError::Backend { operation: "query", .. }));
    }
}
