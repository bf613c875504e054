use crate::Result;
use crate::tpl::ast::FragmentList;
use crate::tpl::condense::condense;
use crate::tpl::parser::parse_template;
use crate::tpl::render::{self, RenderBuffer};
use crate::tpl::render_context::Context;
use crate::value::{ToValue, Value};
use std::str::FromStr;

/// A rendered statement: SQL text with `$n` placeholders and the values bound
/// to them, in placeholder order.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub text: String,
    pub values: Vec<Value>,
}

impl Statement {
    pub fn into_parts(self) -> (String, Vec<Value>) {
        (self.text, self.values)
    }
}

/// A compiled template, ready to be rendered any number of times.
///
/// Compile once and keep it around, the way a prepared statement would be.
/// A `Query` is immutable, so it can be shared between threads freely.
#[derive(Debug, Clone)]
pub struct Query {
    source: String,
    root: FragmentList,
    is_static: bool,
    keys: Vec<String>,
    /// Rendered once at compile time for static queries.
    text: Option<String>,
}

impl Query {
    /// Compiles `template`: scan, parse, condense and, for static templates,
    /// render the text once.
    ///
    /// # Errors
    /// Returns `OsqlError::Syntax` on any grammar violation.
    pub fn new(template: &str) -> Result<Self> {
        let (root, analysis) = condense(parse_template(template)?);
        let mut query = Self {
            source: template.to_string(),
            root,
            is_static: analysis.is_static,
            keys: analysis.keys,
            text: None,
        };

        if query.is_static {
            let buf = query.render_tree(&Value::Null)?;
            query.text = Some(buf.sql);
        }

        log::debug!(
            "Compiled query (static: {}, keys: {:?})",
            query.is_static,
            query.keys
        );
        Ok(query)
    }

    /// Whether the rendered text is the same for every value-mapping.
    pub fn is_static(&self) -> bool {
        self.is_static
    }

    /// Every name the template references, in first-encounter order.
    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    /// The cached text of a static query; `None` for dynamic ones.
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    /// The template text this query was compiled from.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Renders the query against `args`.
    ///
    /// `args` is usually a struct deriving `Param`, a `HashMap`, or a
    /// `Value::Map`. Names missing from it (or bound to `Null`) are absent.
    ///
    /// A `Null` value is therefore indistinguishable from a missing one:
    /// `@name?{...}` takes its else branch and `@name??fallback` writes the
    /// fallback text. An explicit SQL `NULL` can only be bound through a plain
    /// `@name`, which binds `Value::Null` for absent names.
    ///
    /// # Errors
    /// Returns `OsqlError::TypeMismatch` when a spread insertion's value is
    /// not a list.
    pub fn generate<T: ToValue + ?Sized>(&self, args: &T) -> Result<Statement> {
        let value = args.to_value();

        if let Some(text) = &self.text {
            let ctx = Context::new(&value);
            return Ok(Statement {
                text: text.clone(),
                values: self.keys.iter().map(|k| ctx.value_of(k)).collect(),
            });
        }

        let buf = self.render_tree(&value)?;
        log::trace!("Rendered query with {} bound values", buf.params.len());
        Ok(Statement {
            text: buf.sql,
            values: buf.params,
        })
    }

    fn render_tree(&self, value: &Value) -> Result<RenderBuffer> {
        let ctx = Context::new(value);
        let mut buf = RenderBuffer::with_capacity(self.source.len());
        render::render(&self.root, &ctx, &mut buf)?;
        Ok(buf)
    }
}

impl FromStr for Query {
    type Err = crate::error::OsqlError;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::OsqlError;
    use std::collections::HashMap;

    fn args(entries: &[(&str, Value)]) -> HashMap<String, Value> {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_static_values_follow_keys() {
        let q = Query::new("SELECT @b, @a, @b").unwrap();
        assert!(q.is_static());
        assert_eq!(q.text(), Some("SELECT $1, $2, $1"));

        let stmt = q
            .generate(&args(&[("a", Value::I64(1)), ("b", Value::I64(2))]))
            .unwrap();
        assert_eq!(stmt.text, "SELECT $1, $2, $1");
        assert_eq!(stmt.values, vec![Value::I64(2), Value::I64(1)]);
    }

    #[test]
    fn test_static_absent_key_is_null() {
        let q = Query::new("WHERE id = @id").unwrap();
        let stmt = q.generate(&()).unwrap();
        assert_eq!(stmt.values, vec![Value::Null]);
    }

    #[test]
    fn test_null_is_absent_for_conditionals_and_fallbacks() {
        let q = Query::new("SET a = @a??a @b?{, b = @b}:{, b = DEFAULT} WHERE c = @c").unwrap();
        let stmt = q
            .generate(&args(&[
                ("a", Value::Null),
                ("b", Value::Null),
                ("c", Value::Null),
            ]))
            .unwrap();
        assert_eq!(stmt.text, "SET a = a , b = DEFAULT WHERE c = $1");
        assert_eq!(stmt.values, vec![Value::Null]);
    }

    #[test]
    fn test_dynamic_query_has_no_cached_text() {
        let q = Query::new("SELECT 1 @x?{ + 1 }").unwrap();
        assert!(!q.is_static());
        assert_eq!(q.text(), None);
    }

    #[test]
    fn test_from_str() {
        let q: Query = "SELECT 1".parse().unwrap();
        assert_eq!(q.source(), "SELECT 1");
        assert!(matches!(
            "SELECT @x?{".parse::<Query>(),
            Err(OsqlError::Syntax(_))
        ));
    }
}
