use std::fmt;

use serde_json::Value;

/// Tables exposed by the remote backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    Posts,
    Categories,
    PostCategories,
    Projects,
    Contacts,
}

impl Table {
    pub fn as_str(self) -> &'static str {
        match self {
            Table::Posts => "posts",
            Table::Categories => "categories",
            Table::PostCategories => "post_categories",
            Table::Projects => "projects",
            Table::Contacts => "contacts",
        }
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub column: &'static str,
    pub value: Value,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ordering {
    pub column: &'static str,
    pub ascending: bool,
}

/// A related table embedded in the selected rows through a join table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Expansion {
    pub relation: Table,
    pub via: Table,
    pub local_key: &'static str,
    pub foreign_key: &'static str,
    pub columns: &'static [&'static str],
}

/// Post → categories through `post_categories`.
pub const POST_CATEGORIES: Expansion = Expansion {
    relation: Table::Categories,
    via: Table::PostCategories,
    local_key: "post_id",
    foreign_key: "category_id",
    columns: &["id", "name", "slug"],
};

/// A single table operation: equality filters, one ordering, an optional
/// limit and expansion, plus the bearer token the backend evaluates its
/// row-level rules against.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub table: Table,
    pub filters: Vec<Filter>,
    pub order: Option<Ordering>,
    pub limit: Option<usize>,
    pub expand: Option<Expansion>,
    pub bearer: Option<String>,
    /// Whether mutations hand the affected rows back.
    pub returning: bool,
}

impl Query {
    pub fn from(table: Table) -> Self {
        Query {
            table,
            filters: Vec::new(),
            order: None,
            limit: None,
            expand: None,
            bearer: None,
            returning: true,
        }
    }

    pub fn eq(mut self, column: &'static str, value: impl Into<Value>) -> Self {
        self.filters.push(Filter { column, value: value.into() });
        self
    }

    pub fn order(mut self, column: &'static str, ascending: bool) -> Self {
        self.order = Some(Ordering { column, ascending });
        self
    }

    pub fn newest_first(self) -> Self {
        self.order("created_at", false)
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn expand(mut self, expansion: Expansion) -> Self {
        self.expand = Some(expansion);
        self
    }

    pub fn bearer(mut self, token: Option<&str>) -> Self {
        self.bearer = token.map(str::to_string);
        self
    }

    /// Mutations skip reading rows back, for callers that may write but not
    /// read the table.
    pub fn without_returning(mut self) -> Self {
        self.returning = false;
        self
    }

    /// PostgREST `select` parameter.
    pub fn select_clause(&self) -> String {
        match &self.expand {
            Some(expansion) => format!(
                "*,{}({})",
                expansion.relation.as_str(),
                expansion.columns.join(",")
            ),
            None => "*".to_string(),
        }
    }

    /// PostgREST query string pairs (without `select`).
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs: Vec<(String, String)> = self
            .filters
            .iter()
            .map(|f| (f.column.to_string(), format!("eq.{}", filter_literal(&f.value))))
            .collect();

        if let Some(order) = self.order {
            let direction = if order.ascending { "asc" } else { "desc" };
            pairs.push(("order".into(), format!("{}.{}", order.column, direction)));
        }
        if let Some(limit) = self.limit {
            pairs.push(("limit".into(), limit.to_string()));
        }
        pairs
    }
}

fn filter_literal(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "null".to_string(),
        other => other.to_string(),
    }
}
