use crate::Result;
use crate::error::OsqlError;
use crate::tpl::ast::{AstNode, Delimiter, FragmentList};
use crate::tpl::render_context::Context;
use crate::value::Value;
use std::collections::HashMap;

/// Output and bookkeeping of a single render call.
pub(crate) struct RenderBuffer {
    pub sql: String,
    pub params: Vec<Value>,
    /// Placeholder text already assigned to a name during this call.
    bound: HashMap<String, String>,
}

impl RenderBuffer {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            sql: String::with_capacity(capacity),
            params: Vec::new(),
            bound: HashMap::new(),
        }
    }

    /// Appends a value and returns its 1-based placeholder.
    fn push_param(&mut self, value: Value) -> String {
        self.params.push(value);
        format!("${}", self.params.len())
    }

    fn insert_variable(&mut self, name: &str, ctx: &Context) {
        if let Some(placeholder) = self.bound.get(name) {
            self.sql.push_str(placeholder);
            return;
        }
        let placeholder = self.push_param(ctx.value_of(name));
        self.sql.push_str(&placeholder);
        self.bound.insert(name.to_string(), placeholder);
    }

    fn insert_spread(&mut self, name: &str, delimiter: Delimiter, ctx: &Context) -> Result<()> {
        let items = match ctx.lookup(name) {
            Some(Value::List(items)) => items,
            other => {
                return Err(OsqlError::TypeMismatch(format!(
                    "Expected key '{}' to be a list, got {}",
                    name,
                    other.map_or("nothing", Value::type_name)
                )));
            }
        };

        if let Some(joined) = self.bound.get(name) {
            self.sql.push_str(joined);
            return Ok(());
        }

        let joined = items
            .iter()
            .map(|v| self.push_param(v.clone()))
            .collect::<Vec<_>>()
            .join(delimiter.as_str());
        self.sql.push_str(&joined);
        self.bound.insert(name.to_string(), joined);
        Ok(())
    }
}

pub(crate) fn render(list: &FragmentList, ctx: &Context, buf: &mut RenderBuffer) -> Result<()> {
    for node in &list.children {
        match node {
            AstNode::RawSql(text) => buf.sql.push_str(text),
            AstNode::Variable(name) => buf.insert_variable(name, ctx),
            AstNode::Fallback { name, fallback } => {
                if ctx.lookup(name).is_none() {
                    buf.sql.push_str(fallback);
                } else {
                    buf.insert_variable(name, ctx);
                }
            }
            AstNode::Conditional {
                name,
                success,
                failure,
            } => {
                if ctx.lookup(name).is_some() {
                    render(success, ctx, buf)?;
                } else if let Some(failure) = failure {
                    render(failure, ctx, buf)?;
                }
            }
            AstNode::Spread { name, delimiter } => buf.insert_spread(name, *delimiter, ctx)?,
            AstNode::DelimitedList { delimiter, items } => {
                let mut wrote_any = false;
                for item in items {
                    let mark = buf.sql.len();
                    if wrote_any {
                        buf.sql.push_str(delimiter.as_str());
                    }
                    let start = buf.sql.len();
                    render(item, ctx, buf)?;

                    // Items that render to nothing take their delimiter with them.
                    if buf.sql.len() == start {
                        buf.sql.truncate(mark);
                    } else {
                        wrote_any = true;
                    }
                }
            }
        }
    }
    Ok(())
}
