/// The separator a delimited list (or spread) joins its items with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delimiter {
    /// `(&)[ ... ]`
    And,
    /// `(|)[ ... ]`
    Or,
    /// `(,)[ ... ]`
    Comma,
}

impl Delimiter {
    pub fn as_str(&self) -> &'static str {
        match self {
            Delimiter::And => " AND ",
            Delimiter::Or => " OR ",
            Delimiter::Comma => ", ",
        }
    }
}

/// An ordered run of fragments: the template body, a conditional branch or
/// one item of a delimited list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FragmentList {
    pub children: Vec<AstNode>,
}

impl FragmentList {
    pub fn new(children: Vec<AstNode>) -> Self {
        Self { children }
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// The text of this list when it is exactly one literal fragment.
    pub fn as_literal(&self) -> Option<&str> {
        match self.children.as_slice() {
            [AstNode::RawSql(text)] => Some(text),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AstNode {
    /// Literal SQL, already unescaped.
    RawSql(String),
    /// `@name`
    Variable(String),
    /// `@name??fallback`
    Fallback { name: String, fallback: String },
    /// `@name?{ success }` with an optional `:{ failure }`
    Conditional {
        name: String,
        success: FragmentList,
        failure: Option<FragmentList>,
    },
    /// `(,)[ ...@name ]`
    Spread { name: String, delimiter: Delimiter },
    /// `(,)[ item; item; ... ]`
    DelimitedList {
        delimiter: Delimiter,
        items: Vec<FragmentList>,
    },
}
