//! Schema-driven generator for Lox AST node types and their visitors.
//!
//! A [`GrammarSpec`] lists the variants of one tree family (`Expr`, `Stmt`)
//! with their ordered, typed fields. [`codegen::generate_grammar`] turns it
//! into a Rust module holding a closed `enum`, one record per variant and a
//! `Visitor<T>` trait with exactly one method per variant. [`generate`]
//! renders a batch of grammars and writes them out.
//!
//! ```
//! use lox_astgen::{codegen, GrammarSpec};
//!
//! let grammar = GrammarSpec::builder("Expr")
//!     .uses("crate::token::{Token, Value}")
//!     .variant("Binary", "Expr left, Token operator, Expr right")
//!     .variant("Literal", "Value value")
//!     .build()?;
//!
//! let code = codegen::generate_grammar(&grammar)?;
//! assert!(code.contains("fn visit_binary(&mut self, binary: &Binary) -> T;"));
//! assert!(code.contains("fn visit_literal(&mut self, literal: &Literal) -> T;"));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod validation;
pub mod codegen;
pub mod emit;
pub mod grammars;
pub mod schema;

pub use emit::EmitError;
pub use schema::{
    load_grammar, FieldSpec, GrammarBuilder, GrammarFile, GrammarSpec, LoadError, NodeSpec,
    TypeRef,
};
pub use validation::SchemaError;

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

/// Errors that can occur while generating a batch of grammars.
#[derive(Debug, Error)]
pub enum GenerateError {
    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error("rendering failed: {0}")]
    Render(#[from] std::fmt::Error),

    #[error(transparent)]
    Emit(#[from] EmitError),
}

/// A grammar rendered in memory, not yet written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    /// Base type name of the grammar
    pub base: String,
    /// Generated Rust source
    pub source: String,
}

/// Render every grammar in memory.
///
/// Fails if two grammars would be written to the same file.
pub fn render_all(grammars: &[GrammarSpec]) -> Result<Vec<Rendered>, GenerateError> {
    let mut files = HashSet::new();
    let mut rendered = Vec::with_capacity(grammars.len());

    for grammar in grammars {
        if !files.insert(emit::file_name(grammar.base())) {
            return Err(SchemaError::DuplicateGrammar {
                grammar: grammar.base().to_string(),
            }
            .into());
        }
        rendered.push(Rendered {
            base: grammar.base().to_string(),
            source: codegen::generate_grammar(grammar)?,
        });
    }

    Ok(rendered)
}

/// Render every grammar, then write each one to `out_dir`.
///
/// Nothing is written unless every grammar renders. Returns the written
/// paths in input order.
pub fn generate(grammars: &[GrammarSpec], out_dir: &Path) -> Result<Vec<PathBuf>, GenerateError> {
    let rendered = render_all(grammars)?;
    emit::ensure_dir(out_dir)?;

    let mut written = Vec::with_capacity(rendered.len());
    for unit in &rendered {
        written.push(emit::emit(out_dir, &unit.base, &unit.source)?);
    }

    info!(
        grammars = written.len(),
        out_dir = %out_dir.display(),
        "generated AST modules"
    );

    Ok(written)
}

/// Returns the paths under `out_dir` whose contents differ from a fresh render.
pub fn stale(grammars: &[GrammarSpec], out_dir: &Path) -> Result<Vec<PathBuf>, GenerateError> {
    let mut stale = Vec::new();
    for unit in render_all(grammars)? {
        if !emit::is_current(out_dir, &unit.base, &unit.source)? {
            stale.push(emit::output_path(out_dir, &unit.base));
        }
    }
    Ok(stale)
}
