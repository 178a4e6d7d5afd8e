//! Integration tests for backend connectors and type registries.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use strata::compile::Compiler;
use strata::config::{BackendKind, Settings};
use strata::connector::{
    BuiltinConnectors, Connector, ConnectorError, ConnectorFactory, ConnectorResult, Row, Value,
};
use strata::manifest::Manifest;
use strata::sql::CanonicalType;

struct Warehouse {
    path: PathBuf,
    connector: Arc<dyn Connector>,
}

impl Warehouse {
    fn open(name: &str) -> Self {
        let path = std::env::temp_dir().join(format!(
            "strata-connector-test-{}-{}.db",
            name,
            std::process::id()
        ));
        let _ = std::fs::remove_file(&path);
        let settings = Settings::from_toml(&format!(
            "backend = \"sqlite\"\n[sqlite]\npath = '{}'\ncatalog = \"warehouse\"\n",
            path.display()
        ))
        .unwrap();
        let connector = BuiltinConnectors
            .create(settings.backend, &settings)
            .unwrap()
            .unwrap();
        connector
            .execute(
                "CREATE TABLE customers (id INTEGER NOT NULL, name TEXT);
                 CREATE TABLE orders (id INTEGER NOT NULL, customer_id INTEGER, note TEXT);
                 INSERT INTO customers VALUES (1, 'ada'), (2, 'grace');
                 INSERT INTO orders VALUES (10, 1, NULL), (11, 1, 'gift'), (12, 2, NULL);",
            )
            .unwrap();
        Self { path, connector }
    }
}

impl Drop for Warehouse {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
    }
}

// ============================================================================
// Type registries
// ============================================================================

#[test]
fn test_registry_per_backend() {
    let pg = BackendKind::Postgres.type_registry();
    assert_eq!(pg.to_canonical("int8"), Some(CanonicalType::Int64));
    assert_eq!(pg.to_canonical(" text "), Some(CanonicalType::Varchar));

    let cb = BackendKind::Couchbase.type_registry();
    assert_eq!(cb.to_canonical("BIGINT"), Some(CanonicalType::Decimal));
    assert_eq!(cb.to_native(CanonicalType::Decimal), Some("BIGINT"));

    let err = BackendKind::BigQuery
        .type_registry()
        .canonical("GEOGRAPHY")
        .unwrap_err();
    assert!(matches!(err, ConnectorError::UnsupportedType { .. }));
}

#[test]
fn test_sqlite_registry_uses_affinity() {
    let sqlite = BackendKind::Sqlite.type_registry();
    assert_eq!(sqlite.to_canonical("VARCHAR(255)"), Some(CanonicalType::Varchar));
    assert_eq!(sqlite.to_canonical("UNSIGNED BIG INT"), Some(CanonicalType::Int64));
    assert_eq!(sqlite.to_canonical("DOUBLE"), Some(CanonicalType::Float64));
}

// ============================================================================
// Factory
// ============================================================================

#[test]
fn test_builtin_factory_only_builds_sqlite() {
    let settings = Settings::default();
    for kind in BackendKind::ALL {
        let connector = BuiltinConnectors.create(kind, &settings).unwrap();
        assert_eq!(connector.is_some(), kind == BackendKind::Sqlite, "{kind}");
    }
}

/// A factory the way a separate Postgres connector crate would plug in.
#[derive(Default)]
struct PostgresFactory {
    dsns: Mutex<Vec<String>>,
}

impl ConnectorFactory for PostgresFactory {
    fn create(
        &self,
        kind: BackendKind,
        settings: &Settings,
    ) -> ConnectorResult<Option<Arc<dyn Connector>>> {
        if kind != BackendKind::Postgres {
            return BuiltinConnectors.create(kind, settings);
        }
        let url = settings
            .postgres
            .url
            .as_deref()
            .ok_or_else(|| ConnectorError::backend("connect", "postgres.url is not set"))?;
        let password = settings
            .postgres
            .resolved_password()
            .map_err(|e| ConnectorError::backend("connect", e))?;
        self.dsns.lock().unwrap().push(format!(
            "{url} user={} password={}",
            settings.postgres.user.as_deref().unwrap_or(""),
            password.unwrap_or_default()
        ));
        Ok(None)
    }
}

#[test]
fn test_external_factory_reads_its_backend_section() {
    std::env::set_var("STRATA_CONNECTOR_TEST_PG_PASSWORD", "pw");
    let settings = Settings::from_toml(
        "backend = \"postgres\"\n[postgres]\nurl = \"postgres://db/analytics\"\n\
         user = \"strata\"\npassword = \"${STRATA_CONNECTOR_TEST_PG_PASSWORD}\"\n",
    )
    .unwrap();
    let factory = PostgresFactory::default();
    assert!(factory.create(settings.backend, &settings).unwrap().is_none());
    assert_eq!(
        *factory.dsns.lock().unwrap(),
        vec!["postgres://db/analytics user=strata password=pw".to_string()]
    );
    assert!(factory
        .create(BackendKind::Sqlite, &settings)
        .unwrap()
        .is_some());

    let missing = Settings::from_toml("backend = \"postgres\"").unwrap();
    assert!(matches!(
        factory.create(missing.backend, &missing),
        Err(ConnectorError::Backend { operation: "connect", .. })
    ));
    std::env::remove_var("STRATA_CONNECTOR_TEST_PG_PASSWORD");
}

// ============================================================================
// SQLite end to end
// ============================================================================

#[test]
fn test_schema_lists_tables_in_order() {
    let wh = Warehouse::open("schema");
    let schema = wh.connector.get_schema().unwrap();
    let names: Vec<_> = schema
        .iter()
        .map(|c| format!("{}.{}", c.table_name, c.column_name))
        .collect();
    assert_eq!(
        names,
        vec![
            "\"customers\".id",
            "\"customers\".name",
            "\"orders\".id",
            "\"orders\".customer_id",
            "\"orders\".note",
        ]
    );
    assert!(schema.iter().all(|c| c.table_catalog == "\"warehouse\""));
}

#[test]
fn test_compiled_query_runs_on_backend() {
    let wh = Warehouse::open("compile");
    let compiler = Compiler::new(Arc::new(Manifest::default()), BackendKind::Sqlite);
    let compiled = compiler
        .compile(
            "SELECT o.id, coalesce(o.note, '-') AS note FROM orders AS o \
             WHERE EXISTS (SELECT 1 FROM customers AS c WHERE c.id = o.customer_id AND c.name = 'ada') \
             ORDER BY o.id",
        )
        .unwrap();

    let columns = wh.connector.describe(&compiled.sql, &[]).unwrap();
    assert_eq!(columns[0].name, "id");
    assert_eq!(columns[0].ty, CanonicalType::Int64);

    let rows: Vec<Row> = wh
        .connector
        .query(&compiled.sql, &[])
        .unwrap()
        .collect::<ConnectorResult<_>>()
        .unwrap();
    assert_eq!(
        rows,
        vec![
            vec![Value::Int(10), Value::Text("-".into())],
            vec![Value::Int(11), Value::Text("gift".into())],
        ]
    );
}

#[test]
fn test_single_value_yields_null_unless_exactly_one_row() {
    let wh = Warehouse::open("single-value");
    let compiler = Compiler::new(Arc::new(Manifest::default()), BackendKind::Sqlite);
    for (filter, expected) in [
        ("customer_id = 3", Value::Null),
        ("customer_id = 2", Value::Int(12)),
        ("customer_id = 1", Value::Null),
    ] {
        let compiled = compiler
            .compile(&format!("SELECT SINGLE_VALUE(id) FROM orders WHERE {filter}"))
            .unwrap();
        assert!(compiled.sql.contains("MAX(\"id\")"), "{}", compiled.sql);
        let rows: Vec<Row> = wh
            .connector
            .query(&compiled.sql, &[])
            .unwrap()
            .collect::<ConnectorResult<_>>()
            .unwrap();
        assert_eq!(rows, vec![vec![expected]], "{filter}");
    }
}

#[test]
fn test_query_with_parameters() {
    let wh = Warehouse::open("params");
    let mut rows = wh
        .connector
        .query("SELECT name FROM customers WHERE id = ?", &[Value::Int(2)])
        .unwrap();
    assert_eq!(rows.next().unwrap().unwrap(), vec![Value::Text("grace".into())]);
    assert!(rows.next().is_none());
    assert!(rows.is_closed());
}
