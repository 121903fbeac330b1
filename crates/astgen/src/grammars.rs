//! Canonical Lox grammars.
//!
//! `lox-ast` is generated from these. Scalar types (`Token`, `Value`) come
//! from `lox_ast::token`; `Expr` and `Stmt` refer to each other opaquely.

use crate::schema::GrammarSpec;
use crate::validation::SchemaError;

const DERIVES: &[&str] = &["Debug", "Clone", "PartialEq"];

/// Expression grammar.
pub fn expr() -> Result<GrammarSpec, SchemaError> {
    GrammarSpec::builder("Expr")
        .uses("crate::stmt::Stmt")
        .uses("crate::token::{Token, Value}")
        .external("Stmt")
        .derives(DERIVES.iter().copied())
        .variant("Binary", "Expr left, Token operator, Expr right")
        .variant("Literal", "Value value")
        .variant("Grouping", "Expr expression")
        .variant("Unary", "Token operator, Expr expression")
        .variant("Variable", "Token name")
        .variant("Assign", "Token name, Expr value")
        .variant("Logical", "Expr left, Token operator, Expr right")
        .variant("Call", "Expr callee, Token rightParen, List<Expr> arguments")
        .variant("AnonymousFun", "List<Token> parameters, List<Stmt> body")
        .variant("Get", "Expr expression, Token property")
        .variant("Set", "Expr expression, Token property, Expr value")
        .variant("ThisExpr", "Token keyword")
        .variant("SuperExpr", "Token keyword, Token identifier")
        .build()
}

/// Statement grammar.
pub fn stmt() -> Result<GrammarSpec, SchemaError> {
    GrammarSpec::builder("Stmt")
        .uses("crate::expr::Expr")
        .uses("crate::token::Token")
        .external("Expr")
        .derives(DERIVES.iter().copied())
        .variant("Expression", "Expr expression")
        .variant("Print", "Expr expression")
        .variant("Var", "Token name, Option<Expr> initializer")
        .variant("Block", "List<Stmt> body")
        .variant("IfStmt", "Expr condition, Stmt body, Option<Stmt> elseStmt")
        .variant("WhileStmt", "Expr condition, Stmt body")
        .variant("FunctionDecl", "Token name, List<Token> parameters, List<Stmt> body")
        .variant("ReturnStmt", "Token keyword, Option<Expr> value")
        .variant("ClassDecl", "Token name, Option<Token> superClass, List<FunctionDecl> methods")
        .build()
}

/// Both grammars, in emission order.
pub fn lox() -> Result<Vec<GrammarSpec>, SchemaError> {
    Ok(vec![expr()?, stmt()?])
}
