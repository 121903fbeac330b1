//! Lox syntax trees.
//!
//! The `expr` and `stmt` modules are generated at build time by
//! `lox-astgen` from its canonical grammars. Each provides a closed enum,
//! one record per variant, and a `Visitor<T>` trait with one method per
//! variant; a new tree pass is a new `Visitor` implementation.

pub mod token;

pub mod expr {
    //! Expression nodes.
    include!(concat!(env!("OUT_DIR"), "/expr.rs"));
}

pub mod stmt {
    //! Statement nodes.
    include!(concat!(env!("OUT_DIR"), "/stmt.rs"));
}

pub mod printer;

pub use expr::Expr;
pub use printer::AstPrinter;
pub use stmt::Stmt;
pub use token::{Token, TokenType, Value};
