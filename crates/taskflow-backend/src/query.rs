use std::fmt::Display;

use reqwest::Method;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Select,
    Insert,
    Update,
    Delete,
}

/// One request against a backend table: equality filters, an optional
/// ordering, and whether the affected rows should be echoed back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableQuery {
    table: String,
    operation: Operation,
    columns: Option<String>,
    filters: Vec<(String, String)>,
    order: Option<(String, bool)>,
    returning: bool,
}

impl TableQuery {
    fn new(table: &str, operation: Operation) -> Self {
        Self {
            table: table.to_string(),
            operation,
            columns: None,
            filters: Vec::new(),
            order: None,
            returning: false,
        }
    }

    pub fn select(table: &str, columns: &str) -> Self {
        let mut query = Self::new(table, Operation::Select);
        query.columns = Some(columns.to_string());
        query
    }

    pub fn insert(table: &str) -> Self {
        Self::new(table, Operation::Insert)
    }

    pub fn update(table: &str) -> Self {
        Self::new(table, Operation::Update)
    }

    pub fn delete(table: &str) -> Self {
        Self::new(table, Operation::Delete)
    }

    pub fn eq(mut self, column: &str, value: impl Display) -> Self {
        self.filters.push((column.to_string(), format!("eq.{value}")));
        self
    }

    pub fn order(mut self, column: &str, ascending: bool) -> Self {
        self.order = Some((column.to_string(), ascending));
        self
    }

    /// Ask the backend to return the rows the write touched.
    pub fn returning(mut self) -> Self {
        self.returning = true;
        self
    }

    pub fn operation(&self) -> Operation {
        self.operation
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn method(&self) -> Method {
        match self.operation {
            Operation::Select => Method::GET,
            Operation::Insert => Method::POST,
            Operation::Update => Method::PATCH,
            Operation::Delete => Method::DELETE,
        }
    }

    pub fn path(&self) -> String {
        format!("rest/v1/{}", self.table)
    }

    pub fn params(&self) -> Vec<(String, String)> {
        let mut params = Vec::new();
        if let Some(columns) = &self.columns {
            params.push(("select".to_string(), columns.clone()));
        }
        params.extend(self.filters.iter().cloned());
        if let Some((column, ascending)) = &self.order {
            let direction = if *ascending { "asc" } else { "desc" };
            params.push(("order".to_string(), format!("{column}.{direction}")));
        }
        params
    }

    pub fn prefer(&self) -> Option<&'static str> {
        if self.returning && self.operation != Operation::Select {
            Some("return=representation")
        } else {
            None
        }
    }
}
