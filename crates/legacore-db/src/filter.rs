//! Rendering of [`ListQuery`] predicates into SurrealQL.
//!
//! Field names come from the static allow-lists in `legacore_core::query`
//! and are embedded verbatim; every request-derived value travels as a
//! numbered bind parameter (`$p0`, `$p1`, ...).

use legacore_core::query::{Condition, Direction, Filter, FilterValue, ListQuery, Scope, SortKey};
use surrealdb::method::Query;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;

use crate::error::DbError;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum BindValue {
    Text(String),
    Number(f64),
}

/// A rendered `WHERE` clause (possibly empty) plus its parameters.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct Predicate {
    pub clause: String,
    pub binds: Vec<(String, BindValue)>,
}

impl Predicate {
    fn push(&mut self, value: BindValue) -> String {
        let name = format!("p{}", self.binds.len());
        let placeholder = format!("${name}");
        self.binds.push((name, value));
        placeholder
    }

    fn render(&mut self, condition: &Condition) -> String {
        match condition {
            Condition::Eq { field, value } => {
                let value = match value {
                    FilterValue::Text(t) => BindValue::Text(t.clone()),
                    FilterValue::Number(n) => BindValue::Number(*n),
                };
                let p = self.push(value);
                format!("{field} = {p}")
            }
            Condition::ContainsIgnoreCase { field, needle } => {
                let p = self.push(BindValue::Text(needle.clone()));
                format!("string::contains(string::lowercase({field} ?? ''), {p})")
            }
            Condition::Gte { field, value } => {
                let p = self.push(BindValue::Number(*value));
                format!("{field} >= {p}")
            }
            Condition::AnyOf(any) => {
                let parts: Vec<String> = any.iter().map(|c| self.render(c)).collect();
                format!("({})", parts.join(" OR "))
            }
        }
    }
}

pub(crate) fn predicate(filter: &Filter) -> Predicate {
    let mut predicate = Predicate::default();
    let mut parts = Vec::new();

    if let Scope::Tenant(id) = filter.scope {
        let p = predicate.push(BindValue::Text(id.to_string()));
        parts.push(format!("company_id = {p}"));
    }
    for condition in &filter.conditions {
        parts.push(predicate.render(condition));
    }

    if !parts.is_empty() {
        predicate.clause = format!(" WHERE {}", parts.join(" AND "));
    }
    predicate
}

pub(crate) fn order_by(order: &[SortKey]) -> String {
    if order.is_empty() {
        return String::new();
    }
    let keys: Vec<String> = order
        .iter()
        .map(|k| {
            let dir = match k.direction {
                Direction::Asc => "ASC",
                Direction::Desc => "DESC",
            };
            format!("{} {dir}", k.field)
        })
        .collect();
    format!(" ORDER BY {}", keys.join(", "))
}

pub(crate) fn bind_all<'r, C: Connection>(
    mut builder: Query<'r, C>,
    binds: &[(String, BindValue)],
) -> Query<'r, C> {
    for (name, value) in binds {
        builder = match value {
            BindValue::Text(t) => builder.bind((name.clone(), t.clone())),
            BindValue::Number(n) => builder.bind((name.clone(), *n)),
        };
    }
    builder
}

/// Row struct for count queries.
#[derive(Debug, SurrealValue)]
pub(crate) struct CountRow {
    pub total: u64,
}

/// Run the count and the page fetch for `query` against `table`
/// concurrently. Returns the page rows and the total under the filter.
pub(crate) async fn fetch_page<C, R>(
    db: &Surreal<C>,
    table: &str,
    query: &ListQuery,
) -> Result<(Vec<R>, u64), DbError>
where
    C: Connection,
    R: SurrealValue,
{
    let predicate = predicate(&query.filter);

    let count_sql = format!(
        "SELECT count() AS total FROM {table}{} GROUP ALL",
        predicate.clause
    );
    let page_sql = format!(
        "SELECT meta::id(id) AS record_id, * FROM {table}{}{} LIMIT $limit START $offset",
        predicate.clause,
        order_by(query.order)
    );

    let count = async {
        let mut result = bind_all(db.query(count_sql), &predicate.binds).await?;
        let rows: Vec<CountRow> = result.take(0)?;
        Ok::<_, DbError>(rows.first().map(|r| r.total).unwrap_or(0))
    };
    let page = async {
        let mut result = bind_all(db.query(page_sql), &predicate.binds)
            .bind(("limit", query.page.limit))
            .bind(("offset", query.page.offset()))
            .await?;
        let rows: Vec<R> = result.take(0)?;
        Ok::<_, DbError>(rows)
    };

    let (total, rows) = tokio::try_join!(count, page)?;
    Ok((rows, total))
}

/// Every row of `table` owned by `company_id`, newest first.
pub(crate) async fn fetch_all_for_tenant<C, R>(
    db: &Surreal<C>,
    table: &str,
    company_id: uuid::Uuid,
) -> Result<Vec<R>, DbError>
where
    C: Connection,
    R: SurrealValue,
{
    let sql = format!(
        "SELECT meta::id(id) AS record_id, * FROM {table} \
         WHERE company_id = $company_id ORDER BY created_at DESC"
    );
    let mut result = db
        .query(sql)
        .bind(("company_id", company_id.to_string()))
        .await?;
    Ok(result.take(0)?)
}

/// Number of rows in `table` owned by `company_id`.
pub(crate) async fn count_for_tenant<C: Connection>(
    db: &Surreal<C>,
    table: &str,
    company_id: uuid::Uuid,
) -> Result<u64, DbError> {
    let sql = format!("SELECT count() AS total FROM {table} WHERE company_id = $company_id GROUP ALL");
    let mut result = db
        .query(sql)
        .bind(("company_id", company_id.to_string()))
        .await?;
    let rows: Vec<CountRow> = result.take(0)?;
    Ok(rows.first().map(|r| r.total).unwrap_or(0))
}
