use crate::value::Value;

/// Name lookup over the value-mapping of one render call.
pub(crate) struct Context<'a> {
    root: &'a Value,
}

impl<'a> Context<'a> {
    pub(crate) fn new(root: &'a Value) -> Self {
        Self { root }
    }

    /// The value bound to `key`, or `None` when it is absent.
    ///
    /// A name is absent when the mapping has no entry for it or holds
    /// `Value::Null`; a mapping that is not a `Value::Map` has no entries.
    pub(crate) fn lookup(&self, key: &str) -> Option<&'a Value> {
        match self.root {
            Value::Map(m) => m.get(key).filter(|v| !v.is_null()),
            _ => None,
        }
    }

    /// Like [`lookup`](Self::lookup), but absent values come back as `Value::Null`
    /// so they can still be bound to a placeholder.
    pub(crate) fn value_of(&self, key: &str) -> Value {
        self.lookup(key).cloned().unwrap_or(Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_lookup_simple() {
        let mut map = HashMap::new();
        map.insert("a".to_string(), Value::I64(1));
        map.insert("n".to_string(), Value::Null);
        let root = Value::Map(map);
        let ctx = Context::new(&root);

        assert_eq!(ctx.lookup("a"), Some(&Value::I64(1)));
        assert_eq!(ctx.lookup("b"), None);
        assert_eq!(ctx.lookup("n"), None);
        assert_eq!(ctx.value_of("b"), Value::Null);
    }

    #[test]
    fn test_non_map_root_has_no_entries() {
        let root = Value::I64(5);
        let ctx = Context::new(&root);
        assert_eq!(ctx.lookup("a"), None);
    }
}
