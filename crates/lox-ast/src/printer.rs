//! Parenthesized prefix rendering of syntax trees.
//!
//! `1 + 2 * 3` prints as `(+ 1 (* 2 3))`. Useful for debugging a parser
//! and for asserting on tree shape in tests.

use crate::expr::{self, Expr};
use crate::stmt::{self, Stmt};
use crate::token::{Token, Value};

/// Renders expressions and statements as s-expressions.
#[derive(Debug, Default)]
pub struct AstPrinter;

impl AstPrinter {
    pub fn new() -> Self {
        Self
    }

    pub fn print(&mut self, expr: &Expr) -> String {
        expr.accept(self)
    }

    pub fn print_stmt(&mut self, stmt: &Stmt) -> String {
        stmt.accept(self)
    }

    fn parenthesize(&mut self, name: &str, exprs: &[&Expr]) -> String {
        let mut parts = vec![name.to_string()];
        parts.extend(exprs.iter().map(|expr| expr.accept(self)));
        format!("({})", parts.join(" "))
    }

    fn statements(&mut self, stmts: &[Stmt]) -> Vec<String> {
        stmts.iter().map(|stmt| stmt.accept(self)).collect()
    }

    /// `(fun name (a b) body...)`, with `name` omitted for anonymous functions.
    fn function(&mut self, name: Option<&Token>, parameters: &[Token], body: &[Stmt]) -> String {
        let mut parts = vec!["fun".to_string()];
        if let Some(name) = name {
            parts.push(name.lexeme.clone());
        }
        parts.push(format!("({})", lexemes(parameters)));
        parts.extend(self.statements(body));
        format!("({})", parts.join(" "))
    }
}

fn lexemes(tokens: &[Token]) -> String {
    tokens
        .iter()
        .map(|token| token.lexeme.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

impl expr::Visitor<String> for AstPrinter {
    fn visit_binary(&mut self, binary: &expr::Binary) -> String {
        self.parenthesize(&binary.operator.lexeme, &[binary.left.as_ref(), binary.right.as_ref()])
    }

    fn visit_literal(&mut self, literal: &expr::Literal) -> String {
        match &literal.value {
            Value::Str(s) => format!("{:?}", s),
            value => value.to_string(),
        }
    }

    fn visit_grouping(&mut self, grouping: &expr::Grouping) -> String {
        self.parenthesize("group", &[grouping.expression.as_ref()])
    }

    fn visit_unary(&mut self, unary: &expr::Unary) -> String {
        self.parenthesize(&unary.operator.lexeme, &[unary.expression.as_ref()])
    }

    fn visit_variable(&mut self, variable: &expr::Variable) -> String {
        variable.name.lexeme.clone()
    }

    fn visit_assign(&mut self, assign: &expr::Assign) -> String {
        let name = format!("= {}", assign.name.lexeme);
        self.parenthesize(&name, &[assign.value.as_ref()])
    }

    fn visit_logical(&mut self, logical: &expr::Logical) -> String {
        self.parenthesize(
            &logical.operator.lexeme,
            &[logical.left.as_ref(), logical.right.as_ref()],
        )
    }

    fn visit_call(&mut self, call: &expr::Call) -> String {
        let mut exprs = vec![call.callee.as_ref()];
        exprs.extend(&call.arguments);
        self.parenthesize("call", &exprs)
    }

    fn visit_anonymous_fun(&mut self, anonymous_fun: &expr::AnonymousFun) -> String {
        self.function(None, &anonymous_fun.parameters, &anonymous_fun.body)
    }

    fn visit_get(&mut self, get: &expr::Get) -> String {
        let name = format!(". {}", get.property.lexeme);
        self.parenthesize(&name, &[get.expression.as_ref()])
    }

    fn visit_set(&mut self, set: &expr::Set) -> String {
        let name = format!("set {}", set.property.lexeme);
        self.parenthesize(&name, &[set.expression.as_ref(), set.value.as_ref()])
    }

    fn visit_this_expr(&mut self, this_expr: &expr::ThisExpr) -> String {
        this_expr.keyword.lexeme.clone()
    }

    fn visit_super_expr(&mut self, super_expr: &expr::SuperExpr) -> String {
        format!("(super {})", super_expr.identifier.lexeme)
    }
}

impl stmt::Visitor<String> for AstPrinter {
    fn visit_expression(&mut self, expression: &stmt::Expression) -> String {
        self.parenthesize(";", &[expression.expression.as_ref()])
    }

    fn visit_print(&mut self, print: &stmt::Print) -> String {
        self.parenthesize("print", &[print.expression.as_ref()])
    }

    fn visit_var(&mut self, var: &stmt::Var) -> String {
        match &var.initializer {
            Some(initializer) => {
                let name = format!("var {} =", var.name.lexeme);
                self.parenthesize(&name, &[initializer.as_ref()])
            }
            None => format!("(var {})", var.name.lexeme),
        }
    }

    fn visit_block(&mut self, block: &stmt::Block) -> String {
        let mut parts = vec!["block".to_string()];
        parts.extend(self.statements(&block.body));
        format!("({})", parts.join(" "))
    }

    fn visit_if_stmt(&mut self, if_stmt: &stmt::IfStmt) -> String {
        let condition = if_stmt.condition.accept(self);
        let body = if_stmt.body.accept(self);
        match &if_stmt.else_stmt {
            Some(else_stmt) => {
                let else_stmt = else_stmt.accept(self);
                format!("(if-else {} {} {})", condition, body, else_stmt)
            }
            None => format!("(if {} {})", condition, body),
        }
    }

    fn visit_while_stmt(&mut self, while_stmt: &stmt::WhileStmt) -> String {
        let condition = while_stmt.condition.accept(self);
        let body = while_stmt.body.accept(self);
        format!("(while {} {})", condition, body)
    }

    fn visit_function_decl(&mut self, function_decl: &stmt::FunctionDecl) -> String {
        self.function(
            Some(&function_decl.name),
            &function_decl.parameters,
            &function_decl.body,
        )
    }

    fn visit_return_stmt(&mut self, return_stmt: &stmt::ReturnStmt) -> String {
        match &return_stmt.value {
            Some(value) => self.parenthesize("return", &[value.as_ref()]),
            None => "(return)".to_string(),
        }
    }

    fn visit_class_decl(&mut self, class_decl: &stmt::ClassDecl) -> String {
        let mut parts = vec!["class".to_string(), class_decl.name.lexeme.clone()];
        if let Some(super_class) = &class_decl.super_class {
            parts.push(format!("< {}", super_class.lexeme));
        }
        parts.extend(class_decl.methods.iter().map(|method| method.accept(self)));
        format!("({})", parts.join(" "))
    }
}
