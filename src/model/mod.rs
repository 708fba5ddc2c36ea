//! User model functions.
//!
//! Responsibilities:
//!
//! - represent the two calling conventions behind one tagged type (`ModelFunction`)
//! - parse model-definition text (`params:` header + expression) into an evaluable AST
//! - convert every loading failure into a model-shape error at the boundary

pub mod ast;
pub mod function;
pub mod loader;
pub mod parser;

pub use ast::*;
pub use function::*;
pub use loader::*;
pub use parser::*;
