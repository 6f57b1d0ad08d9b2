// plotwire script DSL parser module

pub mod ast;
pub mod command;
pub mod lexer;
pub mod pipeline;

// Public API re-exports
pub use ast::{Script, Step};
pub use pipeline::parse_script;
