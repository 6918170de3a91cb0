use std::cell::RefCell;
use std::collections::HashMap;
use std::io::Write;
use std::mem;
use std::rc::Rc;

use crate::class::Class;
use crate::environment::Environment;
use crate::error::{Error, RuntimeError, Unwind};
use crate::expr::{Expr, ExprVisitor};
use crate::function::{Function, NativeFunction};
use crate::literal::Literal;
use crate::object::{Callable, Object};
use crate::stmt::{Stmt, StmtVisitor};
use crate::token::{Token, Type};

type EvalResult = Result<Object, Unwind>;
type ExecResult = Result<(), Unwind>;

fn runtime_error(token: &Token, message: &str) -> Unwind {
    Unwind::Error(RuntimeError {
        token: token.clone(),
        message: message.to_string(),
    })
}

/// Walks the syntax tree and executes it. Program output is written to the
/// injected writer, runtime errors are reported and stop the current run.
///
/// The interpreter owns the globals environment for its whole lifetime, so
/// state carries over between runs when the driver keeps the interpreter
/// around (which is what makes the prompt useful).
pub struct Interpreter<'a> {
    pub globals: Rc<RefCell<Environment>>,
    environment: Rc<RefCell<Environment>>,
    locals: HashMap<Token, usize>,
    output: &'a mut dyn Write,
}

impl<'a> Interpreter<'a> {
    pub fn new(output: &'a mut dyn Write) -> Self {
        let globals = Rc::new(RefCell::new(Environment::default()));

        for native in NativeFunction::get_globals() {
            let name = native.name.lexeme.clone();
            globals.borrow_mut().define(&name, Object::from(native));
        }

        Interpreter {
            globals: Rc::clone(&globals),
            environment: globals,
            locals: HashMap::new(),
            output,
        }
    }

    /// Executes the statements in order. A runtime error stops execution
    /// and is reported here; statements after it never run.
    pub fn interpret(&mut self, statements: &[Stmt]) {
        for statement in statements {
            if let Err(unwind) = self.execute(statement) {
                // A return never unwinds this far, the resolver rejects
                // top-level returns.
                if let Unwind::Error(error) = unwind {
                    error.throw();
                }
                return;
            }
        }
    }

    /// Records the scope distance of a resolved reference. Called by the
    /// resolver before interpretation starts.
    pub fn resolve(&mut self, name: &Token, distance: usize) {
        self.locals.insert(name.clone(), distance);
    }

    fn execute(&mut self, stmt: &Stmt) -> ExecResult {
        stmt.accept(self)
    }

    fn evaluate(&mut self, expr: &Expr) -> EvalResult {
        expr.accept(self)
    }

    /// Executes the statements in the given environment, restoring the
    /// previous one afterwards no matter how the block exits.
    pub fn execute_block(&mut self, statements: &[Stmt], environment: Rc<RefCell<Environment>>) -> ExecResult {
        let previous = mem::replace(&mut self.environment, environment);

        let result = statements.iter().try_for_each(|statement| self.execute(statement));

        self.environment = previous;
        result
    }

    /// Reads a variable through the resolver's distance table, falling back
    /// to the globals for references no scope claimed.
    fn look_up_variable(&self, name: &Token) -> Result<Object, RuntimeError> {
        match self.locals.get(name) {
            Some(&distance) => self.environment.borrow().get_at(distance, name),
            None => self.globals.borrow().get(name),
        }
    }
}

impl<'a> ExprVisitor<EvalResult> for Interpreter<'a> {
    fn visit_literal_expr(&mut self, expr: &Expr) -> EvalResult {
        let Expr::Literal(literal) = expr else { unreachable!() };

        Ok(Object::from(literal.clone()))
    }

    fn visit_unary_expr(&mut self, expr: &Expr) -> EvalResult {
        let Expr::Unary(unary) = expr else { unreachable!() };

        let right = self.evaluate(&unary.expr)?;

        match unary.operator.r#type {
            Type::Minus => (-right).ok_or_else(|| runtime_error(&unary.operator, "Operand must be a number")),
            Type::Bang => Ok(Object::from(!right.is_truthy())),
            _ => unreachable!(),
        }
    }

    fn visit_binary_expr(&mut self, expr: &Expr) -> EvalResult {
        let Expr::Binary(binary) = expr else { unreachable!() };

        let left = self.evaluate(&binary.left)?;
        let right = self.evaluate(&binary.right)?;

        let operator = &binary.operator;
        match operator.r#type {
            Type::Plus => (left + right)
                .ok_or_else(|| runtime_error(operator, "Operands must be two numbers or two strings")),
            Type::Minus => (left - right)
                .ok_or_else(|| runtime_error(operator, "Operands must be numbers")),
            Type::Slash => (left / right)
                .ok_or_else(|| runtime_error(operator, "Operands must be numbers")),
            Type::Star => (left * right)
                .ok_or_else(|| runtime_error(operator, "Operands must be numbers")),
            Type::Greater | Type::GreaterEqual | Type::Less | Type::LessEqual => {
                let (Object::Literal(Literal::Number(left)), Object::Literal(Literal::Number(right)))
                    = (&left, &right) else {
                    return Err(runtime_error(operator, "Operands must be numbers"));
                };

                Ok(Object::from(match operator.r#type {
                    Type::Greater => left > right,
                    Type::GreaterEqual => left >= right,
                    Type::Less => left < right,
                    Type::LessEqual => left <= right,
                    _ => unreachable!(),
                }))
            },
            Type::EqualEqual => Ok(Object::from(left == right)),
            Type::BangEqual => Ok(Object::from(left != right)),
            _ => unreachable!(),
        }
    }

    fn visit_logical_expr(&mut self, expr: &Expr) -> EvalResult {
        let Expr::Logical(logical) = expr else { unreachable!() };

        let left = self.evaluate(&logical.left)?;

        let short_circuits = match logical.operator.r#type {
            Type::Or => left.is_truthy(),
            Type::And => !left.is_truthy(),
            _ => unreachable!(),
        };

        if short_circuits {
            return Ok(left);
        }

        self.evaluate(&logical.right)
    }

    fn visit_grouping_expr(&mut self, expr: &Expr) -> EvalResult {
        let Expr::Grouping(grouping) = expr else { unreachable!() };

        self.evaluate(&grouping.expr)
    }

    fn visit_variable_expr(&mut self, expr: &Expr) -> EvalResult {
        let Expr::Variable(variable) = expr else { unreachable!() };

        Ok(self.look_up_variable(&variable.name)?)
    }

    fn visit_assign_expr(&mut self, expr: &Expr) -> EvalResult {
        let Expr::Assign(assign) = expr else { unreachable!() };

        let value = self.evaluate(&assign.value)?;

        match self.locals.get(&assign.name) {
            Some(&distance) => {
                self.environment.borrow_mut().assign_at(distance, &assign.name, value.clone());
            },
            None => self.globals.borrow_mut().assign(&assign.name, value.clone())?,
        }

        // An assignment is an expression, its value is the assigned value.
        Ok(value)
    }

    fn visit_call_expr(&mut self, expr: &Expr) -> EvalResult {
        let Expr::Call(call) = expr else { unreachable!() };

        let callee = self.evaluate(&call.callee)?;

        let mut arguments = Vec::with_capacity(call.arguments.len());
        for argument in &call.arguments {
            arguments.push(self.evaluate(argument)?);
        }

        let callable: &dyn Callable = match &callee {
            Object::Function(function) => function,
            Object::NativeFunction(function) => function,
            Object::Class(class) => class,
            _ => return Err(runtime_error(&call.paren, "Can only call functions and classes")),
        };

        if arguments.len() != callable.arity() {
            return Err(runtime_error(
                &call.paren,
                &format!("Expected {} arguments but got {}", callable.arity(), arguments.len()),
            ));
        }

        callable.call(self, arguments)
    }

    fn visit_get_expr(&mut self, expr: &Expr) -> EvalResult {
        let Expr::Get(get) = expr else { unreachable!() };

        let object = self.evaluate(&get.object)?;

        match &object {
            Object::Instance(instance) => Ok(instance.borrow().get(&get.name, &object)?),
            _ => Err(runtime_error(&get.name, "Only instances have properties")),
        }
    }

    fn visit_set_expr(&mut self, expr: &Expr) -> EvalResult {
        let Expr::Set(set) = expr else { unreachable!() };

        let object = self.evaluate(&set.object)?;

        let Object::Instance(instance) = object else {
            return Err(runtime_error(&set.name, "Only instances have fields"));
        };

        let value = self.evaluate(&set.value)?;
        instance.borrow_mut().set(&set.name, value.clone());

        Ok(value)
    }

    fn visit_this_expr(&mut self, expr: &Expr) -> EvalResult {
        let Expr::This(this) = expr else { unreachable!() };

        Ok(self.look_up_variable(&this.keyword)?)
    }

    fn visit_super_expr(&mut self, expr: &Expr) -> EvalResult {
        let Expr::Super(super_expr) = expr else { unreachable!() };

        let Some(&distance) = self.locals.get(&super_expr.keyword) else {
            return Err(runtime_error(&super_expr.keyword, "Cannot use 'super' outside of a class"));
        };

        let superclass = self.environment.borrow().get_at(distance, &Token::from("super"))?;
        let Object::Class(superclass) = superclass else { unreachable!() };

        // 'this' lives in the scope right inside the one holding 'super'.
        let object = self.environment.borrow().get_at(distance - 1, &Token::from("this"))?;

        let Some(method) = superclass.borrow().find_method(&super_expr.method.lexeme) else {
            return Err(runtime_error(
                &super_expr.method,
                &format!("Undefined property '{}'", super_expr.method.lexeme),
            ));
        };

        Ok(Object::from(method.bind(&object)))
    }
}

impl<'a> StmtVisitor<ExecResult> for Interpreter<'a> {
    fn visit_expression_stmt(&mut self, stmt: &Stmt) -> ExecResult {
        let Stmt::Expression(data) = stmt else { unreachable!() };

        self.evaluate(&data.expr)?;
        Ok(())
    }

    fn visit_print_stmt(&mut self, stmt: &Stmt) -> ExecResult {
        let Stmt::Print(data) = stmt else { unreachable!() };

        let value = self.evaluate(&data.expr)?;
        writeln!(self.output, "{value}").expect("output stream to be writable");

        Ok(())
    }

    fn visit_var_stmt(&mut self, stmt: &Stmt) -> ExecResult {
        let Stmt::Var(data) = stmt else { unreachable!() };

        let value = match &data.initializer {
            Some(initializer) => self.evaluate(initializer)?,
            None => Object::from(Literal::Nil),
        };

        self.environment.borrow_mut().define(&data.name.lexeme, value);
        Ok(())
    }

    fn visit_block_stmt(&mut self, stmt: &Stmt) -> ExecResult {
        let Stmt::Block(data) = stmt else { unreachable!() };

        let environment = Environment::new(Some(Rc::clone(&self.environment)));
        self.execute_block(&data.statements, Rc::new(RefCell::new(environment)))
    }

    fn visit_if_stmt(&mut self, stmt: &Stmt) -> ExecResult {
        let Stmt::If(data) = stmt else { unreachable!() };

        if self.evaluate(&data.condition)?.is_truthy() {
            self.execute(&data.then_branch)?;
        } else if let Some(else_branch) = &data.else_branch {
            self.execute(else_branch)?;
        }

        Ok(())
    }

    fn visit_while_stmt(&mut self, stmt: &Stmt) -> ExecResult {
        let Stmt::While(data) = stmt else { unreachable!() };

        while self.evaluate(&data.condition)?.is_truthy() {
            self.execute(&data.body)?;
        }

        Ok(())
    }

    fn visit_function_stmt(&mut self, stmt: &Stmt) -> ExecResult {
        let Stmt::Function(data) = stmt else { unreachable!() };

        let function = Function::new(data, Rc::clone(&self.environment), false);
        self.environment.borrow_mut().define(&data.name.lexeme, Object::from(function));

        Ok(())
    }

    fn visit_return_stmt(&mut self, stmt: &Stmt) -> ExecResult {
        let Stmt::Return(data) = stmt else { unreachable!() };

        let value = match &data.value {
            Some(value) => self.evaluate(value)?,
            None => Object::from(Literal::Nil),
        };

        // Unwinds up to the function call boundary that catches it.
        Err(Unwind::Return(value))
    }

    fn visit_class_stmt(&mut self, stmt: &Stmt) -> ExecResult {
        let Stmt::Class(data) = stmt else { unreachable!() };

        let superclass = match &data.superclass {
            Some(superclass) => {
                let Expr::Variable(variable) = superclass else { unreachable!() };

                match self.evaluate(superclass)? {
                    Object::Class(class) => Some(class),
                    _ => {
                        return Err(runtime_error(&variable.name, "Superclass must be a class"));
                    },
                }
            },
            None => None,
        };

        // The class name is defined before the methods are built so that
        // they can refer to it, and assigned once the class exists.
        self.environment.borrow_mut().define(&data.name.lexeme, Object::from(Literal::Nil));

        // Methods of a subclass close over an extra scope holding 'super'.
        if let Some(superclass) = &superclass {
            let mut environment = Environment::new(Some(Rc::clone(&self.environment)));
            environment.define("super", Object::from(Rc::clone(superclass)));
            self.environment = Rc::new(RefCell::new(environment));
        }

        let mut methods = HashMap::new();
        for method in &data.methods {
            let Stmt::Function(function) = method else { unreachable!() };

            let is_initializer = function.name.lexeme == "init";
            methods.insert(
                function.name.lexeme.clone(),
                Function::new(function, Rc::clone(&self.environment), is_initializer),
            );
        }

        let class = Rc::new(RefCell::new(Class::new(
            data.name.lexeme.clone(),
            superclass.clone(),
            methods,
        )));

        if superclass.is_some() {
            let enclosing = self.environment.borrow().enclosing.clone();
            self.environment = enclosing.expect("super scope to have an enclosing environment");
        }

        self.environment.borrow_mut().assign(&data.name, Object::from(class))?;

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::expr::{BinaryData, GroupingData, LogicalData, UnaryData};
    use crate::token::Location;

    fn op(r#type: Type, lexeme: &str) -> Token {
        Token::new(r#type, lexeme.to_string(), None, Location::new(1, 0))
    }

    fn literal(literal: Literal) -> Box<Expr> {
        Box::new(Expr::Literal(literal))
    }

    fn binary(left: Literal, operator: Token, right: Literal) -> Expr {
        Expr::Binary(BinaryData {
            left: literal(left),
            operator,
            right: literal(right),
        })
    }

    #[test]
    fn evaluate_literal() {
        let mut output = Vec::new();
        let mut interpreter = Interpreter::new(&mut output);

        let expr = Expr::Literal(Literal::Number(12.0));
        assert_eq!(interpreter.evaluate(&expr).unwrap(), Object::from(12.0));
    }

    #[test]
    fn evaluate_unary_minus() {
        let mut output = Vec::new();
        let mut interpreter = Interpreter::new(&mut output);

        let expr = Expr::Unary(UnaryData {
            operator: op(Type::Minus, "-"),
            expr: literal(Literal::Number(12.0)),
        });
        assert_eq!(interpreter.evaluate(&expr).unwrap(), Object::from(-12.0));
    }

    #[test]
    fn evaluate_unary_minus_requires_a_number() {
        let mut output = Vec::new();
        let mut interpreter = Interpreter::new(&mut output);

        let expr = Expr::Unary(UnaryData {
            operator: op(Type::Minus, "-"),
            expr: literal(Literal::from("muffin")),
        });

        let Err(Unwind::Error(error)) = interpreter.evaluate(&expr) else {
            panic!("expected a runtime error");
        };
        assert_eq!(error.message, "Operand must be a number");
    }

    #[test]
    fn evaluate_bang_negates_truthiness() {
        let mut output = Vec::new();
        let mut interpreter = Interpreter::new(&mut output);

        let expr = Expr::Unary(UnaryData {
            operator: op(Type::Bang, "!"),
            expr: literal(Literal::Nil),
        });
        assert_eq!(interpreter.evaluate(&expr).unwrap(), Object::from(true));

        let expr = Expr::Unary(UnaryData {
            operator: op(Type::Bang, "!"),
            expr: literal(Literal::Number(0.0)),
        });
        assert_eq!(interpreter.evaluate(&expr).unwrap(), Object::from(false));
    }

    #[test]
    fn evaluate_arithmetic() {
        let mut output = Vec::new();
        let mut interpreter = Interpreter::new(&mut output);

        let expr = binary(Literal::Number(6.0), op(Type::Star, "*"), Literal::Number(7.0));
        assert_eq!(interpreter.evaluate(&expr).unwrap(), Object::from(42.0));

        let expr = binary(Literal::Number(1.0), op(Type::Slash, "/"), Literal::Number(2.0));
        assert_eq!(interpreter.evaluate(&expr).unwrap(), Object::from(0.5));
    }

    #[test]
    fn evaluate_string_concatenation() {
        let mut output = Vec::new();
        let mut interpreter = Interpreter::new(&mut output);

        let expr = binary(Literal::from("Hello"), op(Type::Plus, "+"), Literal::from("World"));
        assert_eq!(interpreter.evaluate(&expr).unwrap(), Object::from("HelloWorld"));
    }

    #[test]
    fn evaluate_mixed_addition_fails() {
        let mut output = Vec::new();
        let mut interpreter = Interpreter::new(&mut output);

        let expr = binary(Literal::from("a"), op(Type::Plus, "+"), Literal::Number(1.0));

        let Err(Unwind::Error(error)) = interpreter.evaluate(&expr) else {
            panic!("expected a runtime error");
        };
        assert_eq!(error.message, "Operands must be two numbers or two strings");
    }

    #[test]
    fn evaluate_comparison() {
        let mut output = Vec::new();
        let mut interpreter = Interpreter::new(&mut output);

        let expr = binary(Literal::Number(1.0), op(Type::Less, "<"), Literal::Number(2.0));
        assert_eq!(interpreter.evaluate(&expr).unwrap(), Object::from(true));

        let expr = binary(Literal::Number(1.0), op(Type::GreaterEqual, ">="), Literal::Number(2.0));
        assert_eq!(interpreter.evaluate(&expr).unwrap(), Object::from(false));
    }

    #[test]
    fn evaluate_comparison_requires_numbers() {
        let mut output = Vec::new();
        let mut interpreter = Interpreter::new(&mut output);

        let expr = binary(Literal::from("a"), op(Type::Less, "<"), Literal::from("b"));

        let Err(Unwind::Error(error)) = interpreter.evaluate(&expr) else {
            panic!("expected a runtime error");
        };
        assert_eq!(error.message, "Operands must be numbers");
    }

    #[test]
    fn evaluate_equality_has_no_coercion() {
        let mut output = Vec::new();
        let mut interpreter = Interpreter::new(&mut output);

        let expr = binary(Literal::Nil, op(Type::EqualEqual, "=="), Literal::Nil);
        assert_eq!(interpreter.evaluate(&expr).unwrap(), Object::from(true));

        let expr = binary(Literal::Nil, op(Type::EqualEqual, "=="), Literal::Bool(false));
        assert_eq!(interpreter.evaluate(&expr).unwrap(), Object::from(false));

        let expr = binary(Literal::Number(1.0), op(Type::BangEqual, "!="), Literal::from("1"));
        assert_eq!(interpreter.evaluate(&expr).unwrap(), Object::from(true));
    }

    #[test]
    fn logical_operators_return_an_operand() {
        let mut output = Vec::new();
        let mut interpreter = Interpreter::new(&mut output);

        let expr = Expr::Logical(LogicalData {
            left: literal(Literal::from("left")),
            operator: op(Type::Or, "or"),
            right: literal(Literal::from("right")),
        });
        assert_eq!(interpreter.evaluate(&expr).unwrap(), Object::from("left"));

        let expr = Expr::Logical(LogicalData {
            left: literal(Literal::Nil),
            operator: op(Type::And, "and"),
            right: literal(Literal::from("right")),
        });
        assert_eq!(interpreter.evaluate(&expr).unwrap(), Object::from(Literal::Nil));
    }

    #[test]
    fn evaluate_grouping() {
        let mut output = Vec::new();
        let mut interpreter = Interpreter::new(&mut output);

        let expr = Expr::Grouping(GroupingData {
            expr: literal(Literal::Number(12.0)),
        });
        assert_eq!(interpreter.evaluate(&expr).unwrap(), Object::from(12.0));
    }

    #[test]
    fn calling_a_literal_fails() {
        let mut output = Vec::new();
        let mut interpreter = Interpreter::new(&mut output);

        let expr = Expr::Call(crate::expr::CallData {
            callee: literal(Literal::Number(1.0)),
            paren: op(Type::RightParen, ")"),
            arguments: vec![],
        });

        let Err(Unwind::Error(error)) = interpreter.evaluate(&expr) else {
            panic!("expected a runtime error");
        };
        assert_eq!(error.message, "Can only call functions and classes");
    }
}
