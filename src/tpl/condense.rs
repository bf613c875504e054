use crate::tpl::ast::{AstNode, Delimiter, FragmentList};

/// What the condensing walk learns about a whole template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Analysis {
    /// The rendered text never depends on the values supplied.
    pub is_static: bool,
    /// Every referenced name, first encounter first, without duplicates.
    pub keys: Vec<String>,
}

impl Analysis {
    fn new() -> Self {
        Self {
            is_static: true,
            keys: Vec::new(),
        }
    }

    fn record(&mut self, name: &str) {
        if !self.keys.iter().any(|k| k == name) {
            self.keys.push(name.to_string());
        }
    }
}

/// Shrinks a parsed template to its minimal equivalent tree.
///
/// Adjacent literal fragments are fused, fragments that can never render
/// anything are dropped, and delimited lists made only of literal text are
/// folded into a single literal.
pub(crate) fn condense(root: FragmentList) -> (FragmentList, Analysis) {
    let mut analysis = Analysis::new();
    let root = condense_list(root, &mut analysis).unwrap_or_default();
    (root, analysis)
}

/// Returns `None` when the list is dead (renders to nothing).
fn condense_list(list: FragmentList, analysis: &mut Analysis) -> Option<FragmentList> {
    let mut children: Vec<AstNode> = Vec::with_capacity(list.children.len());
    for child in list.children {
        let Some(child) = condense_node(child, analysis) else {
            continue;
        };
        if let AstNode::RawSql(text) = &child
            && let Some(AstNode::RawSql(prev)) = children.last_mut()
        {
            prev.push_str(text);
            continue;
        }
        children.push(child);
    }

    if children.is_empty() {
        None
    } else {
        Some(FragmentList::new(children))
    }
}

/// Returns `None` when the node is dead.
fn condense_node(node: AstNode, analysis: &mut Analysis) -> Option<AstNode> {
    match node {
        AstNode::RawSql(_) => Some(node),
        AstNode::Variable(ref name) => {
            analysis.record(name);
            Some(node)
        }
        AstNode::Fallback { ref name, .. } | AstNode::Spread { ref name, .. } => {
            analysis.is_static = false;
            analysis.record(name);
            Some(node)
        }
        AstNode::Conditional {
            name,
            success,
            failure,
        } => {
            let success = condense_list(success, analysis);
            let failure = failure.and_then(|f| condense_list(f, analysis));
            if success.is_none() && failure.is_none() {
                return None;
            }
            // Presence is only known at render time, whatever the branches hold.
            analysis.is_static = false;
            analysis.record(&name);
            Some(AstNode::Conditional {
                name,
                success: success.unwrap_or_default(),
                failure,
            })
        }
        AstNode::DelimitedList { delimiter, items } => {
            condense_delimited(delimiter, items, analysis)
        }
    }
}

fn condense_delimited(
    delimiter: Delimiter,
    items: Vec<FragmentList>,
    analysis: &mut Analysis,
) -> Option<AstNode> {
    let mut kept: Vec<FragmentList> = Vec::with_capacity(items.len());
    for item in items {
        let Some(item) = condense_list(item, analysis).and_then(trim_item) else {
            continue;
        };
        if let Some(text) = item.as_literal()
            && let Some(prev) = kept.last_mut().and_then(literal_mut)
        {
            prev.push_str(delimiter.as_str());
            prev.push_str(text);
            continue;
        }
        kept.push(item);
    }

    if kept.is_empty() {
        return None;
    }
    if let [only] = kept.as_slice()
        && let Some(text) = only.as_literal()
    {
        return Some(AstNode::RawSql(text.to_string()));
    }
    Some(AstNode::DelimitedList {
        delimiter,
        items: kept,
    })
}

/// Strips whitespace at the outer edges of a list item so it never sits next
/// to the list's own delimiter. Returns `None` if nothing is left.
fn trim_item(mut item: FragmentList) -> Option<FragmentList> {
    if let Some(AstNode::RawSql(text)) = item.children.first_mut() {
        let trimmed = text.trim_start();
        if trimmed.is_empty() {
            item.children.remove(0);
        } else if trimmed.len() != text.len() {
            *text = trimmed.to_string();
        }
    }

    if let Some(AstNode::RawSql(text)) = item.children.last_mut() {
        let trimmed = text.trim_end();
        if trimmed.is_empty() {
            item.children.pop();
        } else if trimmed.len() != text.len() {
            *text = trimmed.to_string();
        }
    }

    if item.is_empty() { None } else { Some(item) }
}

fn literal_mut(list: &mut FragmentList) -> Option<&mut String> {
    match list.children.as_mut_slice() {
        [AstNode::RawSql(text)] => Some(text),
        _ => None,
    }
}
