//! Declarative document queries.
//!
//! A [`Query`] is an ordered list of `(field, operator, value)` constraints,
//! at most one sort key, an optional page size and an optional continuation
//! [`Cursor`]. Backends evaluate the same query with the same semantics:
//!
//! - Range operators only match values of the same JSON type.
//! - Documents missing the sort field are excluded from ordered queries.
//! - Ties on the sort field are broken by ascending document ID.

use std::cmp::Ordering;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{RawDocument, StoreError};

/// Comparison operator of a constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Operator {
    Eq,
    NotEq,
    Lt,
    Lte,
    Gt,
    Gte,
    /// The field is an array containing the value.
    ArrayContains,
    /// The field equals one of the values in an array.
    In,
}

impl Operator {
    /// Operator as written in query logs.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Eq => "==",
            Self::NotEq => "!=",
            Self::Lt => "<",
            Self::Lte => "<=",
            Self::Gt => ">",
            Self::Gte => ">=",
            Self::ArrayContains => "array-contains",
            Self::In => "in",
        }
    }

    /// Whether the operator only needs an equality index.
    #[must_use]
    pub const fn is_equality(self) -> bool {
        matches!(self, Self::Eq | Self::ArrayContains | Self::In)
    }
}

/// One `(field, operator, value)` filter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Constraint {
    /// Dotted field path, e.g. `status` or `seo.title`.
    pub field: String,
    pub op: Operator,
    pub value: Value,
}

impl Constraint {
    /// Build a constraint.
    #[must_use]
    pub fn new(field: impl Into<String>, op: Operator, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            op,
            value: value.into(),
        }
    }

    /// `field == value`.
    #[must_use]
    pub fn equals(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(field, Operator::Eq, value)
    }

    /// Whether a document's data satisfies this constraint.
    #[must_use]
    pub fn matches(&self, data: &Value) -> bool {
        let Some(actual) = lookup(data, &self.field) else {
            return false;
        };
        match self.op {
            Operator::Eq => actual == &self.value,
            Operator::NotEq => actual != &self.value,
            Operator::Lt => same_type_cmp(actual, &self.value) == Some(Ordering::Less),
            Operator::Lte => matches!(
                same_type_cmp(actual, &self.value),
                Some(Ordering::Less | Ordering::Equal)
            ),
            Operator::Gt => same_type_cmp(actual, &self.value) == Some(Ordering::Greater),
            Operator::Gte => matches!(
                same_type_cmp(actual, &self.value),
                Some(Ordering::Greater | Ordering::Equal)
            ),
            Operator::ArrayContains => actual
                .as_array()
                .is_some_and(|items| items.contains(&self.value)),
            Operator::In => self
                .value
                .as_array()
                .is_some_and(|options| options.contains(actual)),
        }
    }
}

impl std::fmt::Display for Constraint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} {}", self.field, self.op.symbol(), self.value)
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

/// The single sort key of a query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortKey {
    pub field: String,
    pub direction: Direction,
}

impl SortKey {
    #[must_use]
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: Direction::Asc,
        }
    }

    #[must_use]
    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: Direction::Desc,
        }
    }
}

impl std::fmt::Display for SortKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let dir = match self.direction {
            Direction::Asc => "asc",
            Direction::Desc => "desc",
        };
        write!(f, "{} {dir}", self.field)
    }
}

/// Reference to the last document of a page, used to continue the query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cursor {
    /// Document ID of the last record returned.
    pub id: String,
    /// Value of the sort field on that record; `None` for unordered queries.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_value: Option<Value>,
}

impl Cursor {
    /// Build the cursor pointing after `doc` for a query ordered by `order_by`.
    #[must_use]
    pub fn after(doc: &RawDocument, order_by: Option<&SortKey>) -> Self {
        Self {
            id: doc.id.clone(),
            sort_value: order_by.and_then(|key| lookup(&doc.data, &key.field).cloned()),
        }
    }

    /// Encode as an opaque URL-safe token.
    #[must_use]
    pub fn encode(&self) -> String {
        // Serializing a struct of a String and a Value cannot fail.
        let json = serde_json::to_vec(self).unwrap_or_default();
        URL_SAFE_NO_PAD.encode(json)
    }

    /// Decode a token produced by [`Cursor::encode`].
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidCursor`] if the token is not valid
    /// base64 or does not contain a cursor.
    pub fn decode(token: &str) -> Result<Self, StoreError> {
        let bytes = URL_SAFE_NO_PAD
            .decode(token.trim())
            .map_err(|e| StoreError::InvalidCursor(e.to_string()))?;
        serde_json::from_slice(&bytes).map_err(|e| StoreError::InvalidCursor(e.to_string()))
    }
}

/// A declarative query against one collection.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    collection: String,
    constraints: Vec<Constraint>,
    order_by: Option<SortKey>,
    limit: Option<usize>,
    start_after: Option<Cursor>,
}

impl Query {
    /// Query every document of a collection.
    #[must_use]
    pub fn new(collection: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            constraints: Vec::new(),
            order_by: None,
            limit: None,
            start_after: None,
        }
    }

    /// Add a constraint.
    #[must_use]
    pub fn filter(mut self, constraint: Constraint) -> Self {
        self.constraints.push(constraint);
        self
    }

    /// Add `field == value`.
    #[must_use]
    pub fn where_eq(self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filter(Constraint::equals(field, value))
    }

    /// Set the sort key, replacing any previous one.
    #[must_use]
    pub fn order_by(mut self, key: SortKey) -> Self {
        self.order_by = Some(key);
        self
    }

    /// Limit the number of returned documents.
    #[must_use]
    pub const fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Continue after the given cursor.
    #[must_use]
    pub fn start_after(mut self, cursor: Cursor) -> Self {
        self.start_after = Some(cursor);
        self
    }

    /// The same query without a sort key.
    #[must_use]
    pub fn unordered(&self) -> Self {
        Self {
            order_by: None,
            ..self.clone()
        }
    }

    /// The same query from the first page.
    #[must_use]
    pub fn first_page(&self) -> Self {
        Self {
            start_after: None,
            ..self.clone()
        }
    }

    #[must_use]
    pub fn collection(&self) -> &str {
        &self.collection
    }

    #[must_use]
    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    #[must_use]
    pub const fn sort_key(&self) -> Option<&SortKey> {
        self.order_by.as_ref()
    }

    #[must_use]
    pub const fn page_size(&self) -> Option<usize> {
        self.limit
    }

    #[must_use]
    pub const fn cursor(&self) -> Option<&Cursor> {
        self.start_after.as_ref()
    }

    /// Whether a document's data satisfies every constraint.
    #[must_use]
    pub fn matches(&self, data: &Value) -> bool {
        self.constraints.iter().all(|c| c.matches(data))
    }

    /// Distinct constraint fields, in first-seen order.
    #[must_use]
    pub fn filter_fields(&self) -> Vec<&str> {
        let mut fields: Vec<&str> = Vec::new();
        for c in &self.constraints {
            if !fields.contains(&c.field.as_str()) {
                fields.push(&c.field);
            }
        }
        fields
    }
}

impl std::fmt::Display for Query {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.collection)?;
        for c in &self.constraints {
            write!(f, " where {c}")?;
        }
        if let Some(key) = &self.order_by {
            write!(f, " order by {key}")?;
        }
        if let Some(limit) = self.limit {
            write!(f, " limit {limit}")?;
        }
        Ok(())
    }
}

/// Resolve a dotted field path inside a JSON document.
#[must_use]
pub fn lookup<'a>(data: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.')
        .try_fold(data, |current, segment| current.get(segment))
        .filter(|v| !v.is_null())
}

/// Compare two values of the same JSON type; `None` across types.
#[must_use]
pub fn same_type_cmp(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64()?.partial_cmp(&y.as_f64()?),
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        (Value::Bool(x), Value::Bool(y)) => Some(x.cmp(y)),
        _ => None,
    }
}

/// Total order used for sorting: null < bool < number < string < array < object.
#[must_use]
pub fn total_cmp(a: &Value, b: &Value) -> Ordering {
    const fn rank(v: &Value) -> u8 {
        match v {
            Value::Null => 0,
            Value::Bool(_) => 1,
            Value::Number(_) => 2,
            Value::String(_) => 3,
            Value::Array(_) => 4,
            Value::Object(_) => 5,
        }
    }
    same_type_cmp(a, b).unwrap_or_else(|| rank(a).cmp(&rank(b)))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_constraint_operators() {
        let doc = json!({
            "status": "published",
            "price": 4500,
            "colors": ["Red", "Blue"],
            "seo": { "title": "Linen Dress" }
        });

        assert!(Constraint::equals("status", "published").matches(&doc));
        assert!(!Constraint::new("status", Operator::NotEq, "published").matches(&doc));
        assert!(Constraint::new("price", Operator::Lte, 4500).matches(&doc));
        assert!(Constraint::new("price", Operator::Gt, 1000).matches(&doc));
        assert!(!Constraint::new("price", Operator::Lt, "5000").matches(&doc));
        assert!(Constraint::new("colors", Operator::ArrayContains, "Red").matches(&doc));
        assert!(Constraint::new("status", Operator::In, json!(["draft", "published"])).matches(&doc));
        assert!(Constraint::equals("seo.title", "Linen Dress").matches(&doc));
        assert!(!Constraint::equals("missing", "x").matches(&doc));
    }

    #[test]
    fn test_cursor_token_roundtrip() {
        let cursor = Cursor {
            id: "p-12".to_string(),
            sort_value: Some(json!(4500)),
        };
        let token = cursor.encode();
        assert!(!token.contains('='));
        assert_eq!(Cursor::decode(&token).unwrap(), cursor);
    }

    #[test]
    fn test_cursor_decode_rejects_garbage() {
        assert!(matches!(
            Cursor::decode("%%%"),
            Err(StoreError::InvalidCursor(_))
        ));
        assert!(matches!(
            Cursor::decode(&URL_SAFE_NO_PAD.encode(b"[1,2]")),
            Err(StoreError::InvalidCursor(_))
        ));
    }

    #[test]
    fn test_query_display() {
        let query = Query::new("products")
            .where_eq("status", "published")
            .order_by(SortKey::desc("createdAt"))
            .limit(12);
        assert_eq!(
            query.to_string(),
            "products where status == \"published\" order by createdAt desc limit 12"
        );
        assert!(query.unordered().sort_key().is_none());
    }

    #[test]
    fn test_total_cmp_orders_types() {
        assert_eq!(total_cmp(&json!(null), &json!(false)), Ordering::Less);
        assert_eq!(total_cmp(&json!(10), &json!(9.5)), Ordering::Greater);
        assert_eq!(total_cmp(&json!(10), &json!("a")), Ordering::Less);
    }
}
