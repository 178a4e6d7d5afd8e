//! Integration tests for the dialect rewrite pipeline.

use insta::assert_snapshot;
use strata::manifest::Manifest;
use strata::rewrite::{
    Pipeline, RemoveCatalogSchemaPrefix, RemoveColumnAliasInAliasRelation,
    ReplaceColumnAliasInUnnest, RewriteContext, RewritePass, TransformCorrelatedJoinToJoin,
};
use strata::sql::{parse_query, Dialect, Query};

fn bigquery(sql: &str) -> String {
    let manifest = Manifest::default();
    let ctx = RewriteContext::new(&manifest, Dialect::BigQuery);
    let query = parse_query(sql, Dialect::Postgres).unwrap();
    let once = Pipeline::for_dialect(Dialect::BigQuery).apply(&query, &ctx);
    once.to_sql(Dialect::BigQuery).unwrap()
}

// ============================================================================
// BigQuery pipeline
// ============================================================================

#[test]
fn test_catalog_prefix_removed() {
    assert_snapshot!(
        bigquery("SELECT proj.ds.t.a, ds.t.b FROM proj.ds.t"),
        @"SELECT `t`.`a`, `t`.`b` FROM `proj`.`ds`.`t`"
    );
}

#[test]
fn test_derived_table_column_aliases() {
    assert_snapshot!(
        bigquery("SELECT s.x FROM (SELECT a, b AS bb FROM t) AS s(x, y)"),
        @"SELECT `s`.`x` FROM (SELECT `a` AS `x`, `b` AS `y` FROM `t`) AS `s`"
    );
}

#[test]
fn test_exists_decorrelated() {
    assert_snapshot!(
        bigquery(
            "SELECT o.id FROM orders AS o WHERE o.total > 10 AND EXISTS \
             (SELECT 1 FROM items AS i WHERE i.order_id = o.id AND i.qty > 1)"
        ),
        @"SELECT `o`.`id` FROM `orders` AS `o` INNER JOIN (SELECT DISTINCT `i`.`order_id` AS `__corr_0` FROM `items` AS `i` WHERE `i`.`qty` > 1) AS `__exists_0` ON `o`.`id` = `__exists_0`.`__corr_0` WHERE `o`.`total` > 10"
    );
}

const IDEMPOTENCE_CORPUS: &[&str] = &[
    "SELECT proj.ds.t.a FROM proj.ds.t",
    "SELECT t.rec.field FROM t",
    "SELECT s.x FROM (SELECT a FROM t) AS s(x)",
    "SELECT u.x FROM tbl CROSS JOIN UNNEST(tbl.arr) AS u(x) ORDER BY u.x",
    "SELECT a.x FROM a WHERE EXISTS (SELECT 1 FROM b WHERE b.k = a.k)",
    "SELECT a.x FROM a WHERE NOT EXISTS (SELECT 1 FROM b WHERE b.k = a.k)",
    // Nested EXISTS, each correlated to its own parent.
    "SELECT a.x FROM a WHERE EXISTS (SELECT 1 FROM b WHERE b.k = a.k AND \
     EXISTS (SELECT 1 FROM c WHERE c.j = b.j))",
    // Nested EXISTS reaching past its parent.
    "SELECT a.x FROM a WHERE EXISTS (SELECT 1 FROM b WHERE \
     EXISTS (SELECT 1 FROM c WHERE c.j = b.j AND c.k = a.k))",
    // UNNEST inside subqueries.
    "SELECT s.v FROM (SELECT u.x AS v FROM tbl CROSS JOIN UNNEST(tbl.arr) AS u(x)) AS s(v)",
    "SELECT a.x FROM a WHERE EXISTS \
     (SELECT 1 FROM tbl CROSS JOIN UNNEST(tbl.arr) AS u(x) WHERE u.x = a.x)",
    // CTE feeding a derived table with a column alias list.
    "WITH c AS (SELECT a, b FROM proj.ds.t) \
     SELECT s.x FROM (SELECT a, b FROM c) AS s(x, y) WHERE s.y > 1",
    "WITH c AS (SELECT ds.t.a FROM ds.t) SELECT s.a FROM c AS s WHERE EXISTS \
     (SELECT 1 FROM (SELECT k FROM b) AS d(kk) WHERE d.kk = s.a)",
];

#[test]
fn test_each_pass_is_idempotent() {
    let manifest = Manifest::default();
    let ctx = RewriteContext::new(&manifest, Dialect::BigQuery);
    let passes: Vec<Box<dyn RewritePass>> = vec![
        Box::new(RemoveCatalogSchemaPrefix),
        Box::new(RemoveColumnAliasInAliasRelation),
        Box::new(ReplaceColumnAliasInUnnest),
        Box::new(TransformCorrelatedJoinToJoin),
    ];
    for sql in IDEMPOTENCE_CORPUS {
        let query = parse_query(sql, Dialect::Postgres).unwrap();
        for pass in &passes {
            let once = pass.apply(&query, &ctx);
            assert_eq!(pass.apply(&once, &ctx), once, "{} on {sql}", pass.name());
        }
    }
}

#[test]
fn test_pipeline_is_idempotent() {
    let manifest = Manifest::default();
    let ctx = RewriteContext::new(&manifest, Dialect::BigQuery);
    let pipeline = Pipeline::for_dialect(Dialect::BigQuery);
    for sql in IDEMPOTENCE_CORPUS {
        let query = parse_query(sql, Dialect::Postgres).unwrap();
        let once = pipeline.apply(&query, &ctx);
        assert_eq!(pipeline.apply(&once, &ctx), once, "{sql}");
        assert!(once.to_sql(Dialect::BigQuery).is_ok(), "{sql}");
    }
}

#[test]
fn test_grand_outer_reference_stays_correlated() {
    assert_snapshot!(
        bigquery(
            "SELECT a.x FROM a WHERE EXISTS (SELECT 1 FROM b WHERE \
             EXISTS (SELECT 1 FROM c WHERE c.j = b.j AND c.k = a.k))"
        ),
        @"SELECT `a`.`x` FROM `a` WHERE EXISTS (SELECT 1 FROM `b` WHERE EXISTS (SELECT 1 FROM `c` WHERE `c`.`j` = `b`.`j` AND `c`.`k` = `a`.`k`))"
    );
}

#[test]
fn test_other_dialects_leave_query_untouched() {
    let manifest = Manifest::default();
    let query = parse_query("SELECT proj.ds.t.a FROM proj.ds.t", Dialect::Postgres).unwrap();
    for dialect in [Dialect::Postgres, Dialect::DuckDb, Dialect::Snowflake, Dialect::Sqlite] {
        let ctx = RewriteContext::new(&manifest, dialect);
        assert_eq!(Pipeline::for_dialect(dialect).apply(&query, &ctx), query);
    }
}

// ============================================================================
// Custom passes
// ============================================================================

#[derive(Debug)]
struct DropLimit;

impl RewritePass for DropLimit {
    fn name(&self) -> &'static str {
        "drop_limit"
    }

    fn apply(&self, query: &Query, _ctx: &RewriteContext<'_>) -> Query {
        let mut query = query.clone();
        query.limit = None;
        query
    }
}

#[test]
fn test_custom_pass_runs_after_builtin_passes() {
    let manifest = Manifest::default();
    let ctx = RewriteContext::new(&manifest, Dialect::BigQuery);
    let mut pipeline = Pipeline::for_dialect(Dialect::BigQuery);
    pipeline.add_pass(Box::new(DropLimit));
    assert_eq!(pipeline.pass_names().last(), Some(&"drop_limit"));

    let query = parse_query("SELECT ds.t.a FROM ds.t LIMIT 10", Dialect::Postgres).unwrap();
    let rewritten = pipeline.apply(&query, &ctx);
    assert_snapshot!(
        rewritten.to_sql(Dialect::BigQuery).unwrap(),
        @"SELECT `t`.`a` FROM `ds`.`t`"
    );
}
