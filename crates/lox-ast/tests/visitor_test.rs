//! Tests driving the generated trees through user-defined visitors.

use lox_ast::expr::{self, Binary, Expr};
use lox_ast::stmt::{self, Stmt};
use lox_ast::{AstPrinter, Token, TokenType, Value};

fn op(kind: TokenType, lexeme: &str) -> Token {
    Token::new(kind, lexeme, 1)
}

fn ident(name: &str) -> Token {
    Token::new(TokenType::Identifier, name, 1)
}

fn number(n: f64) -> Expr {
    Expr::literal(Value::Number(n))
}

/// Evaluates arithmetic; anything else is out of scope for this pass.
struct Arithmetic;

impl expr::Visitor<f64> for Arithmetic {
    fn visit_binary(&mut self, binary: &expr::Binary) -> f64 {
        let left = binary.left.accept(self);
        let right = binary.right.accept(self);
        match binary.operator.kind {
            TokenType::Plus => left + right,
            TokenType::Minus => left - right,
            TokenType::Star => left * right,
            TokenType::Slash => left / right,
            kind => panic!("not arithmetic: {:?}", kind),
        }
    }

    fn visit_literal(&mut self, literal: &expr::Literal) -> f64 {
        match literal.value {
            Value::Number(n) => n,
            ref value => panic!("not a number: {}", value),
        }
    }

    fn visit_grouping(&mut self, grouping: &expr::Grouping) -> f64 {
        grouping.expression.accept(self)
    }

    fn visit_unary(&mut self, unary: &expr::Unary) -> f64 {
        -unary.expression.accept(self)
    }

    fn visit_variable(&mut self, _: &expr::Variable) -> f64 {
        unimplemented!()
    }

    fn visit_assign(&mut self, _: &expr::Assign) -> f64 {
        unimplemented!()
    }

    fn visit_logical(&mut self, _: &expr::Logical) -> f64 {
        unimplemented!()
    }

    fn visit_call(&mut self, _: &expr::Call) -> f64 {
        unimplemented!()
    }

    fn visit_anonymous_fun(&mut self, _: &expr::AnonymousFun) -> f64 {
        unimplemented!()
    }

    fn visit_get(&mut self, _: &expr::Get) -> f64 {
        unimplemented!()
    }

    fn visit_set(&mut self, _: &expr::Set) -> f64 {
        unimplemented!()
    }

    fn visit_this_expr(&mut self, _: &expr::ThisExpr) -> f64 {
        unimplemented!()
    }

    fn visit_super_expr(&mut self, _: &expr::SuperExpr) -> f64 {
        unimplemented!()
    }
}

/// Records which visitor methods ran, in order.
#[derive(Default)]
struct Trace {
    visited: Vec<&'static str>,
}

impl stmt::Visitor<()> for Trace {
    fn visit_expression(&mut self, _: &stmt::Expression) {
        self.visited.push("expression");
    }

    fn visit_print(&mut self, _: &stmt::Print) {
        self.visited.push("print");
    }

    fn visit_var(&mut self, _: &stmt::Var) {
        self.visited.push("var");
    }

    fn visit_block(&mut self, block: &stmt::Block) {
        self.visited.push("block");
        for stmt in &block.body {
            stmt.accept(self);
        }
    }

    fn visit_if_stmt(&mut self, if_stmt: &stmt::IfStmt) {
        self.visited.push("if_stmt");
        if_stmt.body.accept(self);
        if let Some(else_stmt) = &if_stmt.else_stmt {
            else_stmt.accept(self);
        }
    }

    fn visit_while_stmt(&mut self, while_stmt: &stmt::WhileStmt) {
        self.visited.push("while_stmt");
        while_stmt.body.accept(self);
    }

    fn visit_function_decl(&mut self, function_decl: &stmt::FunctionDecl) {
        self.visited.push("function_decl");
        for stmt in &function_decl.body {
            stmt.accept(self);
        }
    }

    fn visit_return_stmt(&mut self, _: &stmt::ReturnStmt) {
        self.visited.push("return_stmt");
    }

    fn visit_class_decl(&mut self, class_decl: &stmt::ClassDecl) {
        self.visited.push("class_decl");
        for method in &class_decl.methods {
            method.accept(self);
        }
    }
}

#[test]
fn test_binary_sum() {
    let expr = Expr::binary(number(1.0), op(TokenType::Plus, "+"), number(2.0));
    assert_eq!(expr.accept(&mut Arithmetic), 3.0);
}

#[test]
fn test_nested_arithmetic() {
    // -(2 * (3 - 1)) / 4
    let expr = Expr::binary(
        Expr::unary(
            op(TokenType::Minus, "-"),
            Expr::grouping(Expr::binary(
                number(2.0),
                op(TokenType::Star, "*"),
                Expr::grouping(Expr::binary(number(3.0), op(TokenType::Minus, "-"), number(1.0))),
            )),
        ),
        op(TokenType::Slash, "/"),
        number(4.0),
    );
    assert_eq!(expr.accept(&mut Arithmetic), -1.0);
}

#[test]
fn test_constructors_agree_with_records() {
    let via_enum = Expr::binary(number(1.0), op(TokenType::Plus, "+"), number(2.0));
    let via_record: Expr = Binary::new(number(1.0), op(TokenType::Plus, "+"), number(2.0)).into();
    assert_eq!(via_enum, via_record);

    let Expr::Binary(binary) = &via_enum else {
        panic!("expected a binary node, got {:?}", via_enum);
    };
    assert_eq!(*binary.left, number(1.0));
    assert_eq!(binary.operator.lexeme, "+");
}

#[test]
fn test_record_accept_without_enum() {
    let binary = Binary::new(number(4.0), op(TokenType::Star, "*"), number(2.5));
    assert_eq!(binary.accept(&mut Arithmetic), 10.0);
}

#[test]
fn test_dyn_visitor() {
    let expr = Expr::grouping(number(7.0));
    let visitor: &mut dyn expr::Visitor<f64> = &mut Arithmetic;
    assert_eq!(expr.accept(visitor), 7.0);
}

#[test]
fn test_dispatch_reaches_matching_method() {
    let program = Stmt::block(vec![
        Stmt::var(ident("i"), Some(number(0.0))),
        Stmt::while_stmt(
            Expr::variable(ident("running")),
            Stmt::if_stmt(
                Expr::variable(ident("done")),
                Stmt::print(number(1.0)),
                Some(Stmt::expression(number(2.0))),
            ),
        ),
        Stmt::class_decl(
            ident("Point"),
            None,
            vec![stmt::FunctionDecl::new(
                ident("init"),
                vec![],
                vec![Stmt::return_stmt(op(TokenType::Return, "return"), None)],
            )],
        ),
    ]);

    let mut trace = Trace::default();
    program.accept(&mut trace);
    assert_eq!(
        trace.visited,
        [
            "block",
            "var",
            "while_stmt",
            "if_stmt",
            "print",
            "expression",
            "class_decl",
            "function_decl",
            "return_stmt",
        ]
    );
}

#[test]
fn test_expressions_and_statements_nest() {
    // fun (a, b) { print a + b; }
    let adder = Expr::anonymous_fun(
        vec![ident("a"), ident("b")],
        vec![Stmt::print(Expr::binary(
            Expr::variable(ident("a")),
            op(TokenType::Plus, "+"),
            Expr::variable(ident("b")),
        ))],
    );
    let program = Stmt::var(ident("add"), Some(adder));

    let stmt::Stmt::Var(var) = &program else {
        panic!("expected a var statement");
    };
    let Some(initializer) = &var.initializer else {
        panic!("initializer should be kept");
    };
    assert!(matches!(**initializer, Expr::AnonymousFun(ref f) if f.body.len() == 1));

    assert_eq!(
        AstPrinter::new().print_stmt(&program),
        "(var add = (fun (a b) (print (+ a b))))"
    );
}

#[test]
fn test_optional_fields() {
    let bare = stmt::Var::new(ident("x"), None);
    assert!(bare.initializer.is_none());

    let branch = stmt::IfStmt::new(
        Expr::literal(Value::Bool(true)),
        Stmt::print(number(1.0)),
        None,
    );
    assert!(branch.else_stmt.is_none());

    let class = stmt::ClassDecl::new(ident("B"), Some(ident("A")), vec![]);
    assert_eq!(class.super_class.map(|t| t.lexeme), Some("A".to_string()));
}

#[test]
fn test_trees_clone_deeply() {
    let original = Expr::logical(
        Expr::variable(ident("a")),
        op(TokenType::Or, "or"),
        Expr::assign(ident("b"), number(1.0)),
    );
    let copy = original.clone();
    assert_eq!(original, copy);
    assert_eq!(AstPrinter::new().print(&copy), "(or a (= b 1))");
}
