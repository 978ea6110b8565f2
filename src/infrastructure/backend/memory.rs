use std::{
    cmp::Ordering as CmpOrdering,
    collections::HashMap,
    sync::atomic::{AtomicI64, Ordering},
};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::{
    auth::jwt::JwtService,
    backend::{
        query::{Expansion, Filter, Query, Table},
        store::TableStore,
    },
    errors::BackendError,
};

/// In-process row store with the same contract as the hosted one, including
/// its row-level rules: anonymous callers only see published posts, cannot
/// read contact submissions, and may only insert into `contacts`.
pub struct MemoryTableStore {
    tables: RwLock<HashMap<Table, Vec<Value>>>,
    next_id: AtomicI64,
    tokens: JwtService,
}

impl MemoryTableStore {
    pub fn new(tokens: JwtService) -> Self {
        MemoryTableStore {
            tables: RwLock::new(HashMap::new()),
            next_id: AtomicI64::new(1),
            tokens,
        }
    }

    /// Loads rows directly, bypassing row-level rules and defaults.
    pub fn seed(&self, table: Table, rows: Vec<Value>) {
        self.tables.write().entry(table).or_default().extend(rows);
    }

    fn is_operator(&self, query: &Query) -> bool {
        query
            .bearer
            .as_deref()
            .is_some_and(|token| self.tokens.decode(token).is_ok())
    }

    fn visible(&self, query: &Query, row: &Value) -> bool {
        if self.is_operator(query) {
            return true;
        }
        match query.table {
            Table::Posts => row.get("published") == Some(&Value::Bool(true)),
            Table::Contacts => false,
            _ => true,
        }
    }

    fn with_defaults(&self, table: Table, row: Value) -> Result<Value, BackendError> {
        let Value::Object(mut map) = row else {
            return Err(BackendError::Rejected {
                status: 400,
                message: format!("rows for {} must be JSON objects", table),
            });
        };
        let now = Value::String(Utc::now().to_rfc3339());

        match table {
            Table::Posts | Table::Projects => {
                if map.get("id").is_none_or(Value::is_null) {
                    map.insert("id".into(), Value::from(self.next_id.fetch_add(1, Ordering::SeqCst)));
                }
                map.entry("created_at").or_insert_with(|| now.clone());
                map.entry("updated_at").or_insert(now);
            }
            Table::Categories => {
                map.entry("id").or_insert_with(|| Value::String(Uuid::new_v4().to_string()));
            }
            Table::Contacts => {
                map.entry("id").or_insert_with(|| Value::String(Uuid::new_v4().to_string()));
                map.entry("status").or_insert_with(|| Value::String("new".into()));
                map.entry("created_at").or_insert(now);
            }
            Table::PostCategories => {}
        }
        Ok(Value::Object(map))
    }

    fn expand(tables: &HashMap<Table, Vec<Value>>, expansion: &Expansion, row: &mut Value) {
        let id = row.get("id").map(literal);
        let links = tables.get(&expansion.via).map(Vec::as_slice).unwrap_or_default();
        let related = tables.get(&expansion.relation).map(Vec::as_slice).unwrap_or_default();

        let embedded: Vec<Value> = links
            .iter()
            .filter(|link| link.get(expansion.local_key).map(literal) == id)
            .filter_map(|link| link.get(expansion.foreign_key).map(literal))
            .filter_map(|fk| related.iter().find(|r| r.get("id").map(literal).as_ref() == Some(&fk)))
            .map(|r| project_columns(r, expansion.columns))
            .collect();

        if let Value::Object(map) = row {
            map.insert(expansion.relation.as_str().to_string(), Value::Array(embedded));
        }
    }
}

#[async_trait]
impl TableStore for MemoryTableStore {
    async fn select(&self, query: &Query) -> Result<Vec<Value>, BackendError> {
        let tables = self.tables.read();
        let mut rows: Vec<Value> = tables
            .get(&query.table)
            .map(Vec::as_slice)
            .unwrap_or_default()
            .iter()
            .filter(|row| self.visible(query, row) && matches(row, &query.filters))
            .cloned()
            .collect();

        if let Some(order) = query.order {
            if order.ascending {
                rows.sort_by(|a, b| compare(a.get(order.column), b.get(order.column)));
            } else {
                // ties keep the most recently inserted row first
                rows.reverse();
                rows.sort_by(|a, b| compare(b.get(order.column), a.get(order.column)));
            }
        }
        if let Some(limit) = query.limit {
            rows.truncate(limit);
        }
        if let Some(expansion) = &query.expand {
            for row in rows.iter_mut() {
                Self::expand(&tables, expansion, row);
            }
        }
        Ok(rows)
    }

    async fn insert(&self, query: &Query, rows: Vec<Value>) -> Result<Vec<Value>, BackendError> {
        if query.table != Table::Contacts && !self.is_operator(query) {
            return Err(BackendError::Rejected {
                status: 403,
                message: format!("new row violates row-level security policy for table \"{}\"", query.table),
            });
        }

        let prepared = rows
            .into_iter()
            .map(|row| self.with_defaults(query.table, row))
            .collect::<Result<Vec<_>, _>>()?;

        let mut tables = self.tables.write();
        let existing = tables.entry(query.table).or_default();

        for (i, row) in prepared.iter().enumerate() {
            let others = existing.iter().chain(prepared[..i].iter());
            check_unique(query.table, row, others)?;
        }

        existing.extend(prepared.iter().cloned());
        if query.returning {
            Ok(prepared)
        } else {
            Ok(Vec::new())
        }
    }

    async fn update(&self, query: &Query, patch: Value) -> Result<Vec<Value>, BackendError> {
        if !self.is_operator(query) {
            return Ok(Vec::new());
        }
        let Value::Object(patch) = patch else {
            return Err(BackendError::Rejected {
                status: 400,
                message: "update payload must be a JSON object".into(),
            });
        };

        let mut tables = self.tables.write();
        let rows = tables.entry(query.table).or_default();

        let targets: Vec<usize> = rows
            .iter()
            .enumerate()
            .filter(|(_, row)| matches(row, &query.filters))
            .map(|(i, _)| i)
            .collect();

        let mut updated = Vec::with_capacity(targets.len());
        for &i in &targets {
            let mut candidate = rows[i].clone();
            if let Value::Object(map) = &mut candidate {
                for (key, value) in &patch {
                    map.insert(key.clone(), value.clone());
                }
            }
            let others = rows.iter().enumerate().filter(|(j, _)| *j != i).map(|(_, r)| r);
            check_unique(query.table, &candidate, others)?;
            updated.push((i, candidate));
        }

        Ok(updated
            .into_iter()
            .map(|(i, row)| {
                rows[i] = row.clone();
                row
            })
            .collect())
    }

    async fn delete(&self, query: &Query) -> Result<Vec<Value>, BackendError> {
        if !self.is_operator(query) {
            return Ok(Vec::new());
        }

        let mut tables = self.tables.write();
        let rows = tables.entry(query.table).or_default();
        let (removed, kept): (Vec<Value>, Vec<Value>) = rows
            .drain(..)
            .partition(|row| matches(row, &query.filters));
        *rows = kept;

        if query.table == Table::Posts {
            let removed_ids: Vec<String> = removed
                .iter()
                .filter_map(|row| row.get("id").map(literal))
                .collect();
            if let Some(links) = tables.get_mut(&Table::PostCategories) {
                links.retain(|link| {
                    link.get("post_id")
                        .map(literal)
                        .is_none_or(|id| !removed_ids.contains(&id))
                });
            }
        }

        Ok(removed)
    }
}

fn unique_keys(table: Table) -> &'static [&'static [&'static str]] {
    match table {
        Table::Posts => &[&["slug"]],
        Table::Projects => &[&["slug"]],
        Table::Categories => &[&["slug"]],
        Table::PostCategories => &[&["post_id", "category_id"]],
        Table::Contacts => &[&["id"]],
    }
}

fn check_unique<'a>(
    table: Table,
    row: &Value,
    others: impl Iterator<Item = &'a Value> + Clone,
) -> Result<(), BackendError> {
    for columns in unique_keys(table) {
        let key: Vec<Option<String>> = columns.iter().map(|c| row.get(*c).map(literal)).collect();
        let clash = others
            .clone()
            .any(|other| columns.iter().map(|c| other.get(*c).map(literal)).eq(key.iter().cloned()));
        if clash {
            return Err(BackendError::UniqueViolation(format!("{}_{}_key", table, columns.join("_"))));
        }
    }
    Ok(())
}

fn matches(row: &Value, filters: &[Filter]) -> bool {
    filters
        .iter()
        .all(|f| row.get(f.column).map(literal) == Some(literal(&f.value)))
}

/// Text form used for comparisons, mirroring how filter values travel in a
/// query string.
fn literal(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn compare(a: Option<&Value>, b: Option<&Value>) -> CmpOrdering {
    match (a, b) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => {
            x.as_f64().partial_cmp(&y.as_f64()).unwrap_or(CmpOrdering::Equal)
        }
        (Some(Value::String(x)), Some(Value::String(y))) => {
            match (x.parse::<DateTime<Utc>>(), y.parse::<DateTime<Utc>>()) {
                (Ok(dx), Ok(dy)) => dx.cmp(&dy),
                _ => x.cmp(y),
            }
        }
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        (None | Some(Value::Null), None | Some(Value::Null)) => CmpOrdering::Equal,
        (None | Some(Value::Null), _) => CmpOrdering::Less,
        (_, None | Some(Value::Null)) => CmpOrdering::Greater,
        _ => CmpOrdering::Equal,
    }
}

fn project_columns(row: &Value, columns: &[&str]) -> Value {
    let mut out = Map::new();
    for column in columns {
        if let Some(value) = row.get(*column) {
            out.insert((*column).to_string(), value.clone());
        }
    }
    Value::Object(out)
}
