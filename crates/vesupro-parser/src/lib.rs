//! vesupro parser: converts a Go token stream into a declaration AST.

mod parse_decl;
mod parse_type;
mod parser;

pub use parser::{parse, ParseResult, Parser};
