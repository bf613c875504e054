use crate::Result;
use crate::error::OsqlError;
use crate::query::Query;
use dashmap::DashMap;
use glob::glob;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::{Arc, OnceLock};

/// Registry of named queries: query name -> compiled query.
pub type QueryStore = DashMap<String, Arc<Query>>;

/// Global singleton store
static QUERIES: OnceLock<QueryStore> = OnceLock::new();

/// One `-- @query <name>` unit of a source file.
struct Unit<'a> {
    name: &'a str,
    sql: &'a str,
}

/// Splits `source` into named queries and compiles each one.
///
/// Each query starts with a header line `-- @query <name>` and runs until the
/// next header or the end of the input. Text before the first header is
/// ignored.
///
/// ```ignore
/// let queries = osql::loader::parse(
///     "-- @query get_user
///      SELECT * FROM users WHERE id = @id
///
///      -- @query delete_user
///      DELETE FROM users WHERE id = @id",
/// )?;
/// ```
///
/// # Errors
/// `EmptyUnit` if a query has no SQL, `DuplicateName` if two queries share a
/// name, `Syntax` if a query fails to compile.
pub fn parse(source: &str) -> Result<HashMap<String, Query>> {
    let mut out = HashMap::new();
    for unit in split_units(source) {
        if unit.sql.is_empty() {
            return Err(OsqlError::EmptyUnit(unit.name.to_string()));
        }
        if out.contains_key(unit.name) {
            return Err(OsqlError::DuplicateName(unit.name.to_string()));
        }
        out.insert(unit.name.to_string(), Query::new(unit.sql)?);
    }
    Ok(out)
}

/// Loads every query file matching a glob pattern into the registry.
///
/// # Arguments
/// * `pattern` - File path pattern, e.g. "resources/queries/**/*.sql"
pub fn load(pattern: &str) -> Result<()> {
    let paths = glob(pattern)
        .map_err(|e| OsqlError::LoadError(format!("Invalid glob pattern '{}': {}", pattern, e)))?;
    for entry in paths {
        let path = entry
            .map_err(|e| OsqlError::LoadError(format!("Failed to read path: {}", e)))?;
        if path.is_file() {
            load_file(&path)?;
        }
    }
    Ok(())
}

/// Registers embedded query sources, as `(source name, content)` pairs.
/// `query_assets!` calls this at startup.
pub fn load_assets(assets: Vec<(&str, &str)>) -> Result<()> {
    for (source, content) in assets {
        if let Err(e) = parse_and_register(content, source) {
            log::error!("Failed to register queries from {}: {}", source, e);
            return Err(e);
        }
    }
    Ok(())
}

/// Looks up a registered query by name.
pub fn find_query(name: &str) -> Option<Arc<Query>> {
    QUERIES.get()?.get(name).map(|q| q.value().clone())
}

/// Removes every registered query (mainly for resetting state in tests).
pub fn clear() {
    if let Some(store) = QUERIES.get() {
        store.clear();
    }
}

// --- internals ---

fn load_file(path: &Path) -> Result<()> {
    let content = fs::read_to_string(path).map_err(|e| {
        OsqlError::LoadError(format!("Failed to read {}: {}", path.display(), e))
    })?;
    parse_and_register(&content, &path.display().to_string())
}

fn parse_and_register(content: &str, source: &str) -> Result<()> {
    let queries = parse(content)?;
    let store = QUERIES.get_or_init(DashMap::new);

    // Check everything first so a failed file registers nothing.
    if let Some(name) = queries.keys().find(|name| store.contains_key(name.as_str())) {
        return Err(OsqlError::DuplicateName(format!(
            "{} (Source: {})",
            name, source
        )));
    }

    let count = queries.len();
    for (name, query) in queries {
        log::debug!("Registered query '{}' from {}", name, source);
        store.insert(name, Arc::new(query));
    }
    log::info!("Loaded {} queries from {}", count, source);
    Ok(())
}

fn split_units(source: &str) -> Vec<Unit<'_>> {
    // (header line start, body start, name)
    let mut headers: Vec<(usize, usize, &str)> = Vec::new();
    let mut offset = 0;
    for line in source.split_inclusive('\n') {
        if let Some((name, name_end)) = parse_header(line) {
            headers.push((offset, offset + name_end, name));
        }
        offset += line.len();
    }

    headers
        .iter()
        .enumerate()
        .map(|(i, &(_, start, name))| {
            let end = headers.get(i + 1).map_or(source.len(), |next| next.0);
            Unit {
                name,
                sql: source[start..end].trim(),
            }
        })
        .collect()
}

/// Matches `-- @query <name>`, returning the name and the offset just past it.
fn parse_header(line: &str) -> Option<(&str, usize)> {
    let rest = line.trim_start().strip_prefix("--")?.trim_start();
    let rest = rest.strip_prefix("@query")?;
    if !rest.starts_with(|c: char| c.is_whitespace()) {
        return None;
    }
    let rest = rest.trim_start();
    let name_len = rest
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .unwrap_or(rest.len());
    if name_len == 0 {
        return None;
    }
    let name_start = line.len() - rest.len();
    Some((&rest[..name_len], name_start + name_len))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_two_queries() {
        let sql = "
            -- @query query1
            SELECT * FROM users;;

            -- @query query2
            SELECT * FROM users
            WHERE id = @id

            ";
        let queries = parse(sql).unwrap();
        assert_eq!(queries.len(), 2);
        assert_eq!(
            queries["query1"].generate(&()).unwrap().text,
            "SELECT * FROM users;"
        );
        assert_eq!(
            queries["query2"].text(),
            Some("SELECT * FROM users\n            WHERE id = $1")
        );
    }

    #[test]
    fn test_text_before_first_header_is_ignored() {
        let queries = parse("SELECT 0\n-- @query one\nSELECT 1").unwrap();
        assert_eq!(queries.len(), 1);
        assert_eq!(queries["one"].text(), Some("SELECT 1"));
    }

    #[test]
    fn test_no_headers_is_empty() {
        assert!(parse("SELECT 1").unwrap().is_empty());
    }

    #[test]
    fn test_empty_unit() {
        let err = parse("-- @query a\n\n-- @query b\nSELECT 1").unwrap_err();
        assert!(matches!(err, OsqlError::EmptyUnit(ref name) if name == "a"));
    }

    #[test]
    fn test_duplicate_name() {
        let err = parse("-- @query a\nSELECT 1\n-- @query a\nSELECT 2").unwrap_err();
        assert!(matches!(err, OsqlError::DuplicateName(ref name) if name == "a"));
    }

    #[test]
    fn test_syntax_error_in_unit() {
        let err = parse("-- @query a\nSELECT @x?{").unwrap_err();
        assert!(matches!(err, OsqlError::Syntax(_)));
    }

    #[test]
    fn test_header_rest_of_line_belongs_to_query() {
        let queries = parse("-- @query a SELECT 1").unwrap();
        assert_eq!(queries["a"].text(), Some("SELECT 1"));
    }

    #[test]
    fn test_plain_comment_is_not_a_header() {
        assert!(parse_header("-- a normal comment\n").is_none());
        assert!(parse_header("-- @queryx a\n").is_none());
        assert_eq!(parse_header("  --@query  get_user\n"), Some(("get_user", 20)));
    }
}
