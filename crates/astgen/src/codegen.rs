//! Code generation from grammar schema.
//!
//! Each grammar becomes one Rust module containing:
//! - a `Visitor<T>` trait with one `visit_*` method per variant,
//! - a closed `enum` named after the base type, whose `accept` dispatches
//!   to the visitor method matching the variant,
//! - one record struct per variant with a positional `new` constructor and
//!   its own `accept`.
//!
//! Output depends only on the grammar, so regenerating is byte-for-byte
//! reproducible.

use crate::schema::{GrammarSpec, NodeSpec, TypeRef};
use crate::validation::escape_ident;
use std::fmt::Write as FmtWrite;
use tracing::debug;

/// Constructors with more parameters than this trip `clippy::too_many_arguments`.
const CLIPPY_MAX_ARGS: usize = 7;

/// Generate the Rust module for a grammar.
pub fn generate_grammar(grammar: &GrammarSpec) -> Result<String, std::fmt::Error> {
    let mut output = String::new();
    let base = grammar.base();

    // Module header
    writeln!(&mut output, "// @generated by lox-astgen from the `{}` grammar.", base)?;
    writeln!(&mut output, "// Do not edit manually; change the grammar and regenerate.")?;
    writeln!(&mut output)?;

    if !grammar.uses().is_empty() {
        for path in grammar.uses() {
            writeln!(&mut output, "use {};", path)?;
        }
        writeln!(&mut output)?;
    }

    generate_visitor(&mut output, grammar)?;
    writeln!(&mut output)?;
    generate_base(&mut output, grammar)?;

    for node in grammar.variants() {
        writeln!(&mut output)?;
        generate_record(&mut output, grammar, node)?;
    }

    debug!(
        grammar = base,
        variants = grammar.variants().len(),
        bytes = output.len(),
        "rendered grammar"
    );

    Ok(output)
}

/// Generate the visitor trait: exactly one method per variant, in order.
fn generate_visitor(output: &mut String, grammar: &GrammarSpec) -> Result<(), std::fmt::Error> {
    writeln!(output, "/// Operation over every `{}` variant.", grammar.base())?;
    writeln!(output, "///")?;
    writeln!(
        output,
        "/// Implement once per tree pass; `{}::accept` calls the method matching the node.",
        grammar.base()
    )?;
    writeln!(output, "pub trait Visitor<T> {{")?;

    for node in grammar.variants() {
        writeln!(
            output,
            "    fn {}(&mut self, {}: &{}) -> T;",
            node.visit_method(),
            escape_ident(&node.snake_name()),
            node.name
        )?;
    }

    writeln!(output, "}}")?;

    Ok(())
}

/// Generate the closed enum, its constructors, and its dispatching `accept`.
fn generate_base(output: &mut String, grammar: &GrammarSpec) -> Result<(), std::fmt::Error> {
    let base = grammar.base();

    writeln!(output, "/// Closed set of `{}` nodes.", base)?;
    write_derives(output, grammar)?;
    writeln!(output, "pub enum {} {{", base)?;
    for node in grammar.variants() {
        writeln!(output, "    {}({}),", node.name, node.name)?;
    }
    writeln!(output, "}}")?;
    writeln!(output)?;

    writeln!(output, "impl {} {{", base)?;

    for node in grammar.variants() {
        writeln!(output, "    /// Builds a `{}::{}` node.", base, node.name)?;
        if node.fields.len() > CLIPPY_MAX_ARGS {
            writeln!(output, "    #[allow(clippy::too_many_arguments)]")?;
        }
        writeln!(
            output,
            "    pub fn {}({}) -> Self {{",
            escape_ident(&node.snake_name()),
            param_list(grammar, node)
        )?;
        writeln!(output, "        {}::new({}).into()", node.name, arg_list(node))?;
        writeln!(output, "    }}")?;
        writeln!(output)?;
    }

    writeln!(output, "    /// Calls the `Visitor` method matching this variant.")?;
    writeln!(
        output,
        "    pub fn accept<T, V: Visitor<T> + ?Sized>(&self, visitor: &mut V) -> T {{"
    )?;
    writeln!(output, "        match self {{")?;
    for node in grammar.variants() {
        writeln!(
            output,
            "            {}::{}(node) => node.accept(visitor),",
            base, node.name
        )?;
    }
    writeln!(output, "        }}")?;
    writeln!(output, "    }}")?;
    writeln!(output, "}}")?;

    Ok(())
}

/// Generate the record for one variant.
fn generate_record(
    output: &mut String,
    grammar: &GrammarSpec,
    node: &NodeSpec,
) -> Result<(), std::fmt::Error> {
    let base = grammar.base();

    writeln!(output, "/// Fields of a `{}::{}` node.", base, node.name)?;
    write_derives(output, grammar)?;
    writeln!(output, "pub struct {} {{", node.name)?;
    for field in &node.fields {
        writeln!(
            output,
            "    pub {}: {},",
            escape_ident(&field.rust_name()),
            storage_type(grammar, &field.ty)
        )?;
    }
    writeln!(output, "}}")?;
    writeln!(output)?;

    writeln!(output, "impl {} {{", node.name)?;

    // Positional constructor, arguments in declaration order
    if node.fields.len() > CLIPPY_MAX_ARGS {
        writeln!(output, "    #[allow(clippy::too_many_arguments)]")?;
    }
    writeln!(output, "    pub fn new({}) -> Self {{", param_list(grammar, node))?;
    writeln!(output, "        Self {{")?;
    for field in &node.fields {
        let ident = escape_ident(&field.rust_name());
        match init_expr(&field.ty, &ident) {
            Some(init) => writeln!(output, "            {}: {},", ident, init)?,
            None => writeln!(output, "            {},", ident)?,
        }
    }
    writeln!(output, "        }}")?;
    writeln!(output, "    }}")?;
    writeln!(output)?;

    // Double dispatch
    writeln!(output, "    /// Calls `Visitor::{}` with this node.", node.visit_method())?;
    writeln!(
        output,
        "    pub fn accept<T, V: Visitor<T> + ?Sized>(&self, visitor: &mut V) -> T {{"
    )?;
    writeln!(output, "        visitor.{}(self)", node.visit_method())?;
    writeln!(output, "    }}")?;
    writeln!(output, "}}")?;
    writeln!(output)?;

    writeln!(output, "impl From<{}> for {} {{", node.name, base)?;
    writeln!(output, "    fn from(node: {}) -> Self {{", node.name)?;
    writeln!(output, "        {}::{}(node)", base, node.name)?;
    writeln!(output, "    }}")?;
    writeln!(output, "}}")?;

    Ok(())
}

fn write_derives(output: &mut String, grammar: &GrammarSpec) -> Result<(), std::fmt::Error> {
    if !grammar.derives().is_empty() {
        writeln!(output, "#[derive({})]", grammar.derives().join(", "))?;
    }
    Ok(())
}

/// Constructor parameters: `left: Expr, operator: Token, right: Expr`.
fn param_list(grammar: &GrammarSpec, node: &NodeSpec) -> String {
    node.fields
        .iter()
        .map(|field| {
            format!(
                "{}: {}",
                escape_ident(&field.rust_name()),
                value_type(grammar, &field.ty)
            )
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// Constructor arguments forwarded in declaration order: `left, operator, right`.
fn arg_list(node: &NodeSpec) -> String {
    node.fields
        .iter()
        .map(|field| escape_ident(&field.rust_name()))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Convert a field type to the type stored in its record.
///
/// Node references held directly are boxed; lists already provide the
/// indirection a recursive type needs.
fn storage_type(grammar: &GrammarSpec, ty: &TypeRef) -> String {
    match ty {
        TypeRef::Optional(inner) if inner.is_node() => {
            format!("Option<Box<{}>>", value_type(grammar, inner))
        }
        ty if ty.is_node() => format!("Box<{}>", value_type(grammar, ty)),
        ty => value_type(grammar, ty),
    }
}

/// Convert a field type to the type taken by constructors.
fn value_type(grammar: &GrammarSpec, ty: &TypeRef) -> String {
    match ty {
        TypeRef::Scalar(name) | TypeRef::Variant(name) | TypeRef::Extern(name) => name.clone(),
        TypeRef::Base => grammar.base().to_string(),
        TypeRef::List(inner) => format!("Vec<{}>", value_type(grammar, inner)),
        TypeRef::Optional(inner) => format!("Option<{}>", value_type(grammar, inner)),
    }
}

/// Expression converting a constructor argument to its stored form, if
/// the two differ.
fn init_expr(ty: &TypeRef, ident: &str) -> Option<String> {
    match ty {
        TypeRef::Optional(inner) if inner.is_node() => Some(format!("{}.map(Box::new)", ident)),
        ty if ty.is_node() => Some(format!("Box::new({})", ident)),
        _ => None,
    }
}
