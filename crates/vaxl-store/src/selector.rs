//! JSON document selectors for rich queries.
//!
//! A query is a JSON object with a mandatory `selector` member and an
//! optional non-negative `limit`:
//!
//! ```json
//! {"selector": {"id": "1", "scheme": {"$eq": "sch1"}}, "limit": 10}
//! ```
//!
//! Supported conditions:
//!
//! - `"field": <literal>`: equality against a string, number, bool or null
//! - `"field": {"$eq": <literal>}`: explicit equality
//! - `"$and": [<selector>, ...]`: every nested selector must match
//!
//! Sibling members are combined with an implicit AND. Dotted field names
//! (`"a.b"`) address nested objects. Anything else is rejected as malformed.

use serde_json::{Map, Value};

use crate::error::{StoreError, StoreResult};

#[derive(Clone, Debug, PartialEq)]
enum Condition {
    Eq { path: Vec<String>, value: Value },
    And(Vec<Condition>),
}

/// A parsed selector query.
#[derive(Clone, Debug, PartialEq)]
pub struct Selector {
    conditions: Vec<Condition>,
    limit: Option<usize>,
}

impl Selector {
    /// Parse a query string.
    pub fn parse(query: &str) -> StoreResult<Self> {
        let document: Value = serde_json::from_str(query)
            .map_err(|e| StoreError::MalformedQuery(e.to_string()))?;
        let Value::Object(top) = document else {
            return Err(malformed("query must be a JSON object"));
        };

        let mut conditions = None;
        let mut limit = None;
        for (name, member) in top {
            match name.as_str() {
                "selector" => {
                    let Value::Object(fields) = member else {
                        return Err(malformed("`selector` must be a JSON object"));
                    };
                    conditions = Some(parse_fields(fields)?);
                }
                "limit" => {
                    let n = member
                        .as_u64()
                        .ok_or_else(|| malformed("`limit` must be a non-negative integer"))?;
                    limit = Some(n as usize);
                }
                other => return Err(malformed(&format!("unsupported query member `{other}`"))),
            }
        }

        let conditions = conditions.ok_or_else(|| malformed("missing `selector`"))?;
        Ok(Self { conditions, limit })
    }

    /// Maximum number of documents the query may return.
    pub fn limit(&self) -> Option<usize> {
        self.limit
    }

    /// Returns `true` if `document` satisfies every condition.
    pub fn matches(&self, document: &Value) -> bool {
        self.conditions.iter().all(|c| c.matches(document))
    }

    /// Decode `bytes` as JSON and test it. Non-JSON values never match.
    pub fn matches_bytes(&self, bytes: &[u8]) -> bool {
        serde_json::from_slice::<Value>(bytes)
            .map(|doc| self.matches(&doc))
            .unwrap_or(false)
    }
}

impl Condition {
    fn matches(&self, document: &Value) -> bool {
        match self {
            Self::Eq { path, value } => lookup(document, path) == Some(value),
            Self::And(all) => all.iter().all(|c| c.matches(document)),
        }
    }
}

fn parse_fields(fields: Map<String, Value>) -> StoreResult<Vec<Condition>> {
    fields
        .into_iter()
        .map(|(name, value)| parse_member(name, value))
        .collect()
}

fn parse_member(name: String, value: Value) -> StoreResult<Condition> {
    if name == "$and" {
        let Value::Array(items) = value else {
            return Err(malformed("`$and` takes an array of selectors"));
        };
        let mut nested = Vec::new();
        for item in items {
            let Value::Object(fields) = item else {
                return Err(malformed("`$and` members must be JSON objects"));
            };
            nested.extend(parse_fields(fields)?);
        }
        return Ok(Condition::And(nested));
    }
    if name.starts_with('$') {
        return Err(malformed(&format!("unsupported operator `{name}`")));
    }
    if name.is_empty() || name.split('.').any(str::is_empty) {
        return Err(malformed(&format!("invalid field name `{name}`")));
    }

    let path = name.split('.').map(str::to_string).collect();
    let value = match value {
        Value::Object(mut ops) => {
            if ops.len() != 1 {
                return Err(malformed(&format!("field `{name}` takes exactly one operator")));
            }
            match ops.remove("$eq") {
                Some(operand) => literal(&name, operand)?,
                None => return Err(malformed(&format!("unsupported operator on `{name}`"))),
            }
        }
        other => literal(&name, other)?,
    };
    Ok(Condition::Eq { path, value })
}

fn literal(field: &str, value: Value) -> StoreResult<Value> {
    match value {
        Value::Array(_) | Value::Object(_) => Err(malformed(&format!(
            "field `{field}` must be compared against a scalar"
        ))),
        scalar => Ok(scalar),
    }
}

fn lookup<'a>(document: &'a Value, path: &[String]) -> Option<&'a Value> {
    path.iter().try_fold(document, |node, segment| node.get(segment))
}

fn malformed(reason: &str) -> StoreError {
    StoreError::MalformedQuery(reason.to_string())
}
