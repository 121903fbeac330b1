//! Grammar schema definitions for AST generation.
//!
//! A grammar describes one closed family of tree nodes (`Expr`, `Stmt`, ...)
//! as an ordered list of variants, each carrying an ordered list of typed
//! fields. Both orders are significant: variant order fixes the order of the
//! generated visitor methods, field order fixes every constructor's
//! positional arguments.
//!
//! Fields are usually written in the compact notation of hand-written node
//! declarations:
//!
//! ```text
//! Binary   : "Expr left, Token operator, Expr right"
//! Call     : "Expr callee, Token rightParen, List<Expr> arguments"
//! ```
//!
//! Type names are resolved once every variant is known: the grammar's own
//! base name becomes [`TypeRef::Base`], a sibling variant becomes
//! [`TypeRef::Variant`], a declared external grammar becomes
//! [`TypeRef::Extern`], anything else stays a [`TypeRef::Scalar`].

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::validation::{self, SchemaError};

/// Derives applied to generated types unless a grammar overrides them.
pub const DEFAULT_DERIVES: &[&str] = &["Debug", "Clone"];

/// Type of a single field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeRef {
    /// Leaf type, rendered verbatim (e.g. `Token`)
    Scalar(String),
    /// The owning grammar's base type
    Base,
    /// Another variant record of the same grammar
    Variant(String),
    /// Base type of another grammar, never resolved against its schema
    Extern(String),
    /// Ordered sequence
    List(Box<TypeRef>),
    /// Possibly absent value
    Optional(Box<TypeRef>),
}

impl TypeRef {
    /// Returns true if the type names a tree node.
    pub fn is_node(&self) -> bool {
        matches!(self, TypeRef::Base | TypeRef::Variant(_) | TypeRef::Extern(_))
    }

    /// Parse a type written in field notation.
    ///
    /// Every name comes back as a `Scalar`; resolution happens when the
    /// grammar is built.
    pub fn parse(text: &str) -> Result<Self, String> {
        let text = text.trim();

        if let Some(open) = text.find('<') {
            let inner = text[open + 1..]
                .strip_suffix('>')
                .ok_or_else(|| format!("unclosed `<` in `{}`", text))?;
            let inner = Box::new(TypeRef::parse(inner)?);
            return match text[..open].trim() {
                "List" | "Vec" => Ok(TypeRef::List(inner)),
                "Option" => Ok(TypeRef::Optional(inner)),
                other => Err(format!("unknown type constructor `{}`", other)),
            };
        }

        if validation::is_type_path(text) {
            Ok(TypeRef::Scalar(text.to_string()))
        } else {
            Err(format!("`{}` is not a type name", text))
        }
    }

    fn check(&self) -> Result<(), String> {
        match self {
            TypeRef::Scalar(name) | TypeRef::Variant(name) | TypeRef::Extern(name) => {
                if validation::is_type_path(name) {
                    Ok(())
                } else {
                    Err(format!("`{}` is not a type name", name))
                }
            }
            TypeRef::Base => Ok(()),
            TypeRef::List(inner) | TypeRef::Optional(inner) => inner.check(),
        }
    }

    fn resolve(self, base: &str, variants: &HashSet<&str>, externs: &[String]) -> Self {
        match self {
            TypeRef::Scalar(name) if name == base => TypeRef::Base,
            TypeRef::Scalar(name) if variants.contains(name.as_str()) => TypeRef::Variant(name),
            TypeRef::Scalar(name) if externs.contains(&name) => TypeRef::Extern(name),
            TypeRef::List(inner) => TypeRef::List(Box::new(inner.resolve(base, variants, externs))),
            TypeRef::Optional(inner) => {
                TypeRef::Optional(Box::new(inner.resolve(base, variants, externs)))
            }
            other => other,
        }
    }
}

/// A named, typed field of a variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    /// Field name as declared (may be camelCase)
    pub name: String,
    /// Field type
    pub ty: TypeRef,
}

impl FieldSpec {
    pub fn new(name: impl Into<String>, ty: TypeRef) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }

    /// Returns the snake_case name used in generated code (unescaped).
    pub fn rust_name(&self) -> String {
        validation::to_snake_case(&self.name)
    }
}

/// One variant of a grammar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeSpec {
    /// Variant name, also the name of its generated record
    pub name: String,
    /// Fields in declaration order
    pub fields: Vec<FieldSpec>,
}

impl NodeSpec {
    pub fn new(name: impl Into<String>, fields: Vec<FieldSpec>) -> Self {
        Self {
            name: name.into(),
            fields,
        }
    }

    /// Returns the snake_case form of the variant name (e.g. "anonymous_fun").
    pub fn snake_name(&self) -> String {
        validation::to_snake_case(&self.name)
    }

    /// Returns the visitor method dispatching this variant (e.g. "visit_binary").
    pub fn visit_method(&self) -> String {
        format!("visit_{}", self.snake_name())
    }
}

/// A validated grammar: base type name plus its variants in declaration order.
///
/// Only [`GrammarBuilder::build`] produces values of this type, so every
/// instance satisfies the schema invariants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrammarSpec {
    base: String,
    uses: Vec<String>,
    externs: Vec<String>,
    derives: Vec<String>,
    variants: Vec<NodeSpec>,
}

impl GrammarSpec {
    /// Start describing a grammar whose base type is `base`.
    pub fn builder(base: impl Into<String>) -> GrammarBuilder {
        GrammarBuilder::new(base)
    }

    /// Returns the base type name (e.g. "Expr").
    pub fn base(&self) -> &str {
        &self.base
    }

    /// Returns the `use` paths emitted at the top of the generated unit.
    pub fn uses(&self) -> &[String] {
        &self.uses
    }

    /// Returns the base type names of other grammars referenced by this one.
    pub fn externs(&self) -> &[String] {
        &self.externs
    }

    /// Returns the derives applied to the generated enum and records.
    pub fn derives(&self) -> &[String] {
        &self.derives
    }

    /// Returns the variants in declaration order.
    pub fn variants(&self) -> &[NodeSpec] {
        &self.variants
    }

    /// Find a variant by name.
    pub fn find(&self, name: &str) -> Option<&NodeSpec> {
        self.variants.iter().find(|node| node.name == name)
    }

    /// Returns the visitor method names in declaration order.
    pub fn visitor_methods(&self) -> Vec<String> {
        self.variants.iter().map(NodeSpec::visit_method).collect()
    }
}

#[derive(Debug, Clone)]
enum VariantDecl {
    Notation { name: String, fields: String },
    Node(NodeSpec),
}

impl VariantDecl {
    fn name(&self) -> &str {
        match self {
            VariantDecl::Notation { name, .. } => name,
            VariantDecl::Node(node) => &node.name,
        }
    }
}

/// Collects a grammar description and validates it on [`build`](Self::build).
#[derive(Debug, Clone)]
pub struct GrammarBuilder {
    base: String,
    uses: Vec<String>,
    externs: Vec<String>,
    derives: Vec<String>,
    variants: Vec<VariantDecl>,
}

impl GrammarBuilder {
    pub fn new(base: impl Into<String>) -> Self {
        Self {
            base: base.into(),
            uses: Vec::new(),
            externs: Vec::new(),
            derives: DEFAULT_DERIVES.iter().map(|d| d.to_string()).collect(),
            variants: Vec::new(),
        }
    }

    /// Add a `use` path to the generated unit (e.g. "crate::token::Token").
    pub fn uses(mut self, path: impl Into<String>) -> Self {
        self.uses.push(path.into());
        self
    }

    /// Declare the base type of another grammar referenced by this one.
    pub fn external(mut self, base: impl Into<String>) -> Self {
        self.externs.push(base.into());
        self
    }

    /// Replace the derive list of the generated types.
    pub fn derives<I, S>(mut self, derives: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.derives = derives.into_iter().map(Into::into).collect();
        self
    }

    /// Add a variant whose fields are given in field notation.
    pub fn variant(mut self, name: impl Into<String>, fields: impl Into<String>) -> Self {
        self.variants.push(VariantDecl::Notation {
            name: name.into(),
            fields: fields.into(),
        });
        self
    }

    /// Add a variant with explicitly typed fields.
    pub fn node(mut self, node: NodeSpec) -> Self {
        self.variants.push(VariantDecl::Node(node));
        self
    }

    /// Validate the description and produce an immutable grammar.
    pub fn build(self) -> Result<GrammarSpec, SchemaError> {
        let grammar = self.base.clone();
        let invalid_name = |name: &str| SchemaError::InvalidName {
            grammar: grammar.clone(),
            name: name.to_string(),
        };

        if !validation::is_type_name(&self.base) {
            return Err(invalid_name(self.base.as_str()));
        }
        // Names in scope of the generated module besides its own types,
        // paired with where they come from.
        let mut imports: Vec<(&str, &str)> = Vec::new();
        for name in self.externs.iter().chain(&self.derives) {
            if !validation::is_type_path(name) {
                return Err(invalid_name(name.as_str()));
            }
            if let Some(last) = name.rsplit("::").next() {
                imports.push((last, name.as_str()));
            }
        }
        for path in &self.uses {
            let names =
                validation::imported_names(path).ok_or_else(|| invalid_name(path.as_str()))?;
            imports.extend(names.into_iter().map(|name| (name, path.as_str())));
        }

        let mut names = HashSet::new();
        let mut methods = HashSet::new();
        for decl in &self.variants {
            let name = decl.name();
            let snake = validation::to_snake_case(name);
            // `accept` is taken by the dispatch method on the base enum.
            if !validation::is_type_name(name) || snake == "accept" {
                return Err(invalid_name(name));
            }
            if name == self.base {
                return Err(SchemaError::VariantShadowsBase {
                    grammar: grammar.clone(),
                });
            }
            if let Some(&(_, import)) = imports.iter().find(|(imported, _)| *imported == name) {
                return Err(SchemaError::VariantShadowsImport {
                    grammar: grammar.clone(),
                    variant: name.to_string(),
                    import: import.to_string(),
                });
            }
            // Distinct names can still share a visitor method (`HTTPCall`, `HttpCall`).
            if !names.insert(name) || !methods.insert(snake) {
                return Err(SchemaError::DuplicateVariant {
                    grammar: grammar.clone(),
                    variant: name.to_string(),
                });
            }
        }

        let mut variants = Vec::with_capacity(self.variants.len());
        for decl in &self.variants {
            let variant = decl.name().to_string();
            let fields = match decl {
                VariantDecl::Notation { fields, .. } => {
                    parse_fields(fields).map_err(|(field, reason)| SchemaError::InvalidField {
                        grammar: grammar.clone(),
                        variant: variant.clone(),
                        field,
                        reason,
                    })?
                }
                VariantDecl::Node(node) => node.fields.clone(),
            };

            if fields.is_empty() {
                return Err(SchemaError::EmptyVariant {
                    grammar: grammar.clone(),
                    variant,
                });
            }

            let mut seen = HashSet::new();
            let mut resolved = Vec::with_capacity(fields.len());
            for field in fields {
                let rust_name = field.rust_name();
                if !validation::is_field_name(&rust_name) {
                    return Err(invalid_name(field.name.as_str()));
                }
                if !seen.insert(rust_name) {
                    return Err(SchemaError::DuplicateField {
                        grammar: grammar.clone(),
                        variant,
                        field: field.name,
                    });
                }
                if let Err(reason) = field.ty.check() {
                    return Err(SchemaError::InvalidField {
                        grammar: grammar.clone(),
                        variant,
                        field: field.name,
                        reason,
                    });
                }
                let ty = field.ty.resolve(&self.base, &names, &self.externs);
                resolved.push(FieldSpec::new(field.name, ty));
            }

            variants.push(NodeSpec::new(variant, resolved));
        }

        Ok(GrammarSpec {
            base: self.base.clone(),
            uses: self.uses.clone(),
            externs: self.externs.clone(),
            derives: self.derives.clone(),
            variants,
        })
    }
}

/// Split field notation on top-level commas and parse each entry.
///
/// On failure returns the offending entry and the reason.
fn parse_fields(notation: &str) -> Result<Vec<FieldSpec>, (String, String)> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;

    for (idx, c) in notation.char_indices() {
        match c {
            '<' => depth += 1,
            '>' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                parts.push(&notation[start..idx]);
                start = idx + 1;
            }
            _ => {}
        }
    }
    parts.push(&notation[start..]);

    parts
        .into_iter()
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| parse_field(part).map_err(|reason| (part.to_string(), reason)))
        .collect()
}

fn parse_field(entry: &str) -> Result<FieldSpec, String> {
    let (ty, name) = entry
        .rsplit_once(char::is_whitespace)
        .ok_or_else(|| "expected `<type> <name>`".to_string())?;
    let name = name.trim();
    if !validation::is_identifier(name) {
        return Err(format!("`{}` is not a field name", name));
    }
    Ok(FieldSpec::new(name, TypeRef::parse(ty)?))
}

/// Errors that can occur while loading a grammar file.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid TOML grammar: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("invalid JSON grammar: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unsupported grammar file {}: expected .toml or .json", .0.display())]
    UnsupportedFormat(PathBuf),

    #[error(transparent)]
    Schema(#[from] SchemaError),
}

/// Variant entry of a grammar file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VariantEntry {
    /// Variant name
    pub name: String,
    /// Fields in field notation
    pub fields: String,
}

/// On-disk form of a grammar (TOML or JSON).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GrammarFile {
    /// Base type name
    pub base: String,
    /// `use` paths for the generated unit
    #[serde(default)]
    pub uses: Vec<String>,
    /// Other grammars referenced opaquely
    #[serde(default)]
    pub externs: Vec<String>,
    /// Derive list; defaults to `DEFAULT_DERIVES`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub derives: Option<Vec<String>>,
    /// Variants in declaration order
    #[serde(default, rename = "variant")]
    pub variants: Vec<VariantEntry>,
}

impl GrammarFile {
    /// Load a grammar file, choosing the format from its extension.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| LoadError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Self::from_toml_str(&contents),
            Some("json") => Self::from_json_str(&contents),
            _ => Err(LoadError::UnsupportedFormat(path.to_path_buf())),
        }
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, LoadError> {
        Ok(toml::from_str(contents)?)
    }

    pub fn from_json_str(contents: &str) -> Result<Self, LoadError> {
        Ok(serde_json::from_str(contents)?)
    }

    /// Validate the file contents into a grammar.
    pub fn into_spec(self) -> Result<GrammarSpec, SchemaError> {
        let mut builder = GrammarBuilder::new(self.base);
        for path in self.uses {
            builder = builder.uses(path);
        }
        for external in self.externs {
            builder = builder.external(external);
        }
        if let Some(derives) = self.derives {
            builder = builder.derives(derives);
        }
        for entry in self.variants {
            builder = builder.variant(entry.name, entry.fields);
        }
        builder.build()
    }
}

/// Load and validate a grammar file.
pub fn load_grammar<P: AsRef<Path>>(path: P) -> Result<GrammarSpec, LoadError> {
    Ok(GrammarFile::from_file(path)?.into_spec()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_type() {
        assert_eq!(TypeRef::parse("Token"), Ok(TypeRef::Scalar("Token".into())));
        assert_eq!(
            TypeRef::parse("List<Stmt>"),
            Ok(TypeRef::List(Box::new(TypeRef::Scalar("Stmt".into()))))
        );
        assert_eq!(
            TypeRef::parse(" Option< Vec<Expr> > "),
            Ok(TypeRef::Optional(Box::new(TypeRef::List(Box::new(
                TypeRef::Scalar("Expr".into())
            )))))
        );
        assert_eq!(
            TypeRef::parse("crate::token::Token"),
            Ok(TypeRef::Scalar("crate::token::Token".into()))
        );
        assert!(TypeRef::parse("List<Expr").is_err());
        assert!(TypeRef::parse("Map<Expr>").is_err());
        assert!(TypeRef::parse("").is_err());
    }

    #[test]
    fn test_parse_fields_keeps_order() {
        let fields = parse_fields("Expr callee, Token rightParen, List<Expr> arguments").unwrap();
        let names: Vec<_> = fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["callee", "rightParen", "arguments"]);
        assert_eq!(fields[1].rust_name(), "right_paren");
    }

    #[test]
    fn test_parse_fields_rejects_missing_name() {
        let err = parse_fields("Expr left, Token").unwrap_err();
        assert_eq!(err.0, "Token");
    }

    #[test]
    fn test_resolution() {
        let grammar = GrammarSpec::builder("Stmt")
            .external("Expr")
            .variant("Block", "List<Stmt> body")
            .variant("Function", "Token name, List<Stmt> body")
            .variant("Class", "Token name, Option<Token> superclass, List<Function> methods")
            .variant("Print", "Expr expression")
            .build()
            .unwrap();

        let class = grammar.find("Class").unwrap();
        assert_eq!(class.fields[0].ty, TypeRef::Scalar("Token".into()));
        assert_eq!(
            class.fields[1].ty,
            TypeRef::Optional(Box::new(TypeRef::Scalar("Token".into())))
        );
        assert_eq!(
            class.fields[2].ty,
            TypeRef::List(Box::new(TypeRef::Variant("Function".into())))
        );

        let block = grammar.find("Block").unwrap();
        assert_eq!(block.fields[0].ty, TypeRef::List(Box::new(TypeRef::Base)));

        let print = grammar.find("Print").unwrap();
        assert_eq!(print.fields[0].ty, TypeRef::Extern("Expr".into()));
    }

    #[test]
    fn test_explicit_nodes_are_resolved() {
        let grammar = GrammarSpec::builder("Expr")
            .node(NodeSpec::new(
                "Grouping",
                vec![FieldSpec::new("expression", TypeRef::Scalar("Expr".into()))],
            ))
            .build()
            .unwrap();

        assert_eq!(grammar.variants()[0].fields[0].ty, TypeRef::Base);
    }

    #[test]
    fn test_visitor_method_names() {
        let grammar = GrammarSpec::builder("Expr")
            .variant("Binary", "Expr left, Token operator, Expr right")
            .variant("AnonymousFun", "List<Token> parameters")
            .build()
            .unwrap();

        assert_eq!(
            grammar.visitor_methods(),
            ["visit_binary", "visit_anonymous_fun"]
        );
    }

    #[test]
    fn test_default_derives() {
        let grammar = GrammarSpec::builder("Expr")
            .variant("Literal", "Value value")
            .build()
            .unwrap();
        assert_eq!(grammar.derives(), ["Debug", "Clone"]);
    }

    #[test]
    fn test_grammar_file_from_toml() {
        let file = GrammarFile::from_toml_str(
            r#"
            base = "Expr"
            uses = ["crate::token::Token"]
            derives = ["Debug"]

            [[variant]]
            name = "Unary"
            fields = "Token operator, Expr expression"

            [[variant]]
            name = "Variable"
            fields = "Token name"
            "#,
        )
        .unwrap();

        let grammar = file.into_spec().unwrap();
        assert_eq!(grammar.base(), "Expr");
        assert_eq!(grammar.uses(), ["crate::token::Token"]);
        assert_eq!(grammar.derives(), ["Debug"]);
        let names: Vec<_> = grammar.variants().iter().map(|v| v.name.as_str()).collect();
        assert_eq!(names, ["Unary", "Variable"]);
    }

    #[test]
    fn test_grammar_file_from_json() {
        let file = GrammarFile::from_json_str(
            r#"{"base": "Stmt", "variant": [{"name": "Print", "fields": "Expr expression"}]}"#,
        )
        .unwrap();
        let grammar = file.into_spec().unwrap();
        assert_eq!(grammar.find("Print").unwrap().fields[0].name, "expression");
    }

    #[test]
    fn test_grammar_file_rejects_unknown_keys() {
        let result = GrammarFile::from_toml_str("base = \"Expr\"\nvisitor = \"Visit\"\n");
        assert!(matches!(result, Err(LoadError::Toml(_))));
    }
}
