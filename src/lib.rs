//! Compiles SQL text with an embedded templating language into parameterized
//! statements: text with positional `$n` placeholders plus the ordered list
//! of values bound to them.
//!
//! ```ignore
//! let query = osql::compile("SELECT * FROM users @id?{WHERE id = @id}")?;
//! let stmt = query.generate(&args)?;
//! ```

pub mod error;
pub mod loader;
pub mod query;
pub(crate) mod tpl;
pub mod value;

#[doc(hidden)]
pub use ctor;
pub use osql_macros::{Param, query_assets};

pub use error::{OsqlError, SyntaxError};
pub use query::{Query, Statement};
pub use tpl::token::TokenKind;
pub use value::{ToValue, Value};

pub type Result<T> = std::result::Result<T, OsqlError>;

/// Compiles a template. Same as [`Query::new`].
pub fn compile(template: &str) -> Result<Query> {
    Query::new(template)
}

/// Renders a compiled template against a value-mapping. Same as
/// [`Query::generate`].
pub fn render<T: ToValue + ?Sized>(query: &Query, args: &T) -> Result<Statement> {
    query.generate(args)
}
