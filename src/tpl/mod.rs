pub(crate) mod ast;
pub(crate) mod condense;
pub(crate) mod parser;
pub(crate) mod render;
pub(crate) mod render_context;
pub(crate) mod scanner;
pub mod token;
