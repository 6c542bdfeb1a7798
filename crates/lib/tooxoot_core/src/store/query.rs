//! Equality/range filters and projections over entity properties.

use std::cmp::Ordering;
use std::fmt;

use serde_json::{Map, Number, Value};

use super::Entity;

/// Comparison applied by a filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Equal,
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
}

impl Operator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Equal => "=",
            Self::LessThan => "<",
            Self::LessThanOrEqual => "<=",
            Self::GreaterThan => ">",
            Self::GreaterThanOrEqual => ">=",
        }
    }

    /// Whether `actual <op> expected` holds.
    ///
    /// Numbers compare numerically and strings lexicographically; any other
    /// values only support `=`.
    pub fn matches(&self, actual: &Value, expected: &Value) -> bool {
        match (self, compare(actual, expected)) {
            (Self::Equal, Some(ordering)) => ordering == Ordering::Equal,
            (Self::Equal, None) => actual == expected,
            (Self::LessThan, Some(ordering)) => ordering == Ordering::Less,
            (Self::LessThanOrEqual, Some(ordering)) => ordering != Ordering::Greater,
            (Self::GreaterThan, Some(ordering)) => ordering == Ordering::Greater,
            (Self::GreaterThanOrEqual, Some(ordering)) => ordering != Ordering::Less,
            (_, None) => false,
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn compare(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => match (integer(x), integer(y)) {
            (Some(x), Some(y)) => Some(x.cmp(&y)),
            _ => x.as_f64()?.partial_cmp(&y.as_f64()?),
        },
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        _ => None,
    }
}

/// Integers compare exactly; `f64` loses precision past 2^53.
fn integer(n: &Number) -> Option<i128> {
    n.as_i64()
        .map(i128::from)
        .or_else(|| n.as_u64().map(i128::from))
}

/// A single property filter.
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub field: String,
    pub op: Operator,
    pub value: Value,
}

/// Query over entities of one kind.
///
/// Displays as a GQL-like statement, e.g.
/// `SELECT id, token FROM USER WHERE id = "ID1"`.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    kind: String,
    filters: Vec<Filter>,
    projection: Vec<String>,
}

impl Query {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            filters: Vec::new(),
            projection: Vec::new(),
        }
    }

    /// Add a filter; all filters must hold for an entity to match.
    pub fn filter(
        mut self,
        field: impl Into<String>,
        op: Operator,
        value: impl Into<Value>,
    ) -> Self {
        self.filters.push(Filter {
            field: field.into(),
            op,
            value: value.into(),
        });
        self
    }

    /// Restrict returned properties to `fields`.
    pub fn project<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.projection.extend(fields.into_iter().map(Into::into));
        self
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn filters(&self) -> &[Filter] {
        &self.filters
    }

    pub fn projection(&self) -> &[String] {
        &self.projection
    }

    /// Whether `entity` satisfies every filter. Kind is not checked.
    pub fn matches(&self, entity: &Entity) -> bool {
        self.filters.iter().all(|f| {
            entity
                .get(&f.field)
                .is_some_and(|actual| f.op.matches(actual, &f.value))
        })
    }

    /// Copy of `entity` reduced to the projected properties.
    pub fn apply_projection(&self, entity: &Entity) -> Entity {
        if self.projection.is_empty() {
            return entity.clone();
        }

        let properties: Map<String, Value> = self
            .projection
            .iter()
            .filter_map(|field| {
                entity
                    .get(field)
                    .map(|value| (field.clone(), value.clone()))
            })
            .collect();

        Entity {
            key: entity.key.clone(),
            properties,
        }
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.projection.is_empty() {
            write!(f, "SELECT * FROM {}", self.kind)?;
        } else {
            write!(f, "SELECT {} FROM {}", self.projection.join(", "), self.kind)?;
        }

        for (i, filter) in self.filters.iter().enumerate() {
            let joiner = if i == 0 { "WHERE" } else { "AND" };
            write!(f, " {joiner} {} {} {}", filter.field, filter.op, filter.value)?;
        }

        Ok(())
    }
}
