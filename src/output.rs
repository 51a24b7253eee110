use std::io::Write;

use serde_json::{Map, Value};

use crate::error::{QueryError, UsageError};
use crate::query::Query;

/// Writes `metrics` as one JSON line, or each value produced by `query` on its
/// own line. Values already written stay written when a later one fails.
pub fn output_metrics<W: Write>(
    w: &mut W,
    metrics: &Map<String, Value>,
    query: Option<&str>,
) -> Result<(), UsageError> {
    let query = match query.filter(|query| !query.is_empty()) {
        Some(query) => Query::parse(query)?,
        None => {
            serde_json::to_writer(&mut *w, metrics)?;
            writeln!(w)?;
            return Ok(());
        }
    };

    for output in query.run(Value::Object(metrics.clone())) {
        let value = output?;
        if value.is_null() {
            return Err(QueryError::NotFound(query.source().to_string()).into());
        }
        serde_json::to_writer(&mut *w, &value)?;
        writeln!(w)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Map, Value};

    use crate::error::{QueryError, UsageError};
    use crate::output::output_metrics;

    fn metrics() -> Map<String, Value> {
        match json!({"max": 3, "avg": 2, "min": 4, "90pt": 1, "routers": []}) {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    fn fleet() -> Map<String, Value> {
        match json!({
            "max": 5, "avg": 3.5, "min": 2,
            "routers": [{"name": "a", "avg": 2}, {"name": "b", "avg": 5}],
        }) {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    fn output(
        metrics: &Map<String, Value>,
        query: Option<&str>,
    ) -> (String, Result<(), UsageError>) {
        let mut w = Vec::new();
        let result = output_metrics(&mut w, metrics, query);
        (String::from_utf8(w).unwrap(), result)
    }

    #[test]
    fn test_without_query() {
        let (written, result) = output(&metrics(), None);
        assert!(result.is_ok());
        assert_eq!(written, "{\"90pt\":1,\"avg\":2,\"max\":3,\"min\":4,\"routers\":[]}\n");
    }

    #[test]
    fn test_empty_query_is_no_query() {
        let (written, result) = output(&metrics(), Some(""));
        assert!(result.is_ok());
        assert!(written.starts_with("{\"90pt\":1"));
    }

    #[test]
    fn test_with_query() {
        let (written, result) = output(&metrics(), Some(".avg"));
        assert!(result.is_ok());
        assert_eq!(written, "2\n");
    }

    #[test]
    fn test_query_with_many_values() {
        let (written, result) = output(&metrics(), Some(".max, .min"));
        assert!(result.is_ok());
        assert_eq!(written, "3\n4\n");
    }

    #[test]
    fn test_invalid_query() {
        let (written, result) = output(&metrics(), Some("invalid-query"));
        assert!(matches!(result, Err(UsageError::Query(QueryError::Parse(_)))));
        assert_eq!(written, "");
    }

    #[test]
    fn test_query_returns_no_value() {
        let (written, result) = output(&metrics(), Some(".not_exists"));
        match result {
            Err(UsageError::Query(QueryError::NotFound(query))) => {
                assert_eq!(query, ".not_exists")
            }
            other => panic!("unexpected result: {:?}", other),
        }
        assert_eq!(written, "");
    }

    #[test]
    fn test_query_produces_nothing() {
        let (written, result) = output(&metrics(), Some(".routers[]"));
        assert!(result.is_ok());
        assert_eq!(written, "");
    }

    #[test]
    fn test_error_after_partial_output() {
        let (written, result) = output(&metrics(), Some(".avg, .avg.value, .max"));
        assert!(matches!(result, Err(UsageError::Query(QueryError::Runtime(_)))));
        assert_eq!(written, "2\n");
    }

    #[test]
    fn test_null_after_partial_output() {
        let (written, result) = output(&metrics(), Some(".max, .missing"));
        assert!(matches!(result, Err(UsageError::Query(QueryError::NotFound(_)))));
        assert_eq!(written, "3\n");
    }

    #[test]
    fn test_query_with_select() {
        let (written, result) = output(&fleet(), Some(".routers[] | select(.avg > 3) | .name"));
        assert!(result.is_ok());
        assert_eq!(written, "\"b\"\n");
    }

    #[test]
    fn test_query_with_map() {
        let (written, result) = output(&fleet(), Some(".routers | map(.avg)"));
        assert!(result.is_ok());
        assert_eq!(written, "[2,5]\n");
    }

    #[test]
    fn test_query_with_subtraction() {
        let (written, result) = output(&fleet(), Some(".max - .min"));
        assert!(result.is_ok());
        assert_eq!(written, "3\n");
    }

    #[test]
    fn test_query_with_array_construction() {
        let (written, result) = output(&fleet(), Some("[.routers[].name]"));
        assert!(result.is_ok());
        assert_eq!(written, "[\"a\",\"b\"]\n");
    }
}
