//! Tree‑walking evaluator.
//!
//! Statements return a [`Flow`] telling the enclosing construct whether to
//! carry on, unwind a `return`, or leave the nearest loop. Runtime faults are
//! ordinary `Err(LoxError::Runtime { .. })` values propagated with `?` up to
//! [`Interpreter::interpret`].
//!
//! Locals are read through the `(depth, slot)` addresses the resolver records
//! via [`Interpreter::resolve`]; anything the resolver left unresolved is a
//! global, looked up by name.

use std::collections::HashMap;
use std::rc::Rc;

use log::{debug, info};

use crate::environment::{self, Env, Environment, Slot};
use crate::error::{LoxError, Result};
use crate::io::Io;
use crate::parser::{Expr, ExprId, FunctionDecl, FunctionStmt, LiteralValue, Stmt};
use crate::token::{Token, TokenType};
use crate::value::{Class, Function, FunctionKind, Instance, Value};

/// How a statement finished.
#[derive(Debug, Clone)]
pub enum Flow {
    /// Ran to completion. Carries the statement's session result, if any.
    Normal(Option<Value>),

    /// A `return` is unwinding to the nearest call.
    Return(Value),

    /// A `break` is unwinding to the nearest `while`.
    Break,
}

pub struct Interpreter {
    io: Box<dyn Io>,
    globals: HashMap<String, Slot>,
    /// Frame that global functions and classes close over.
    root: Env,
    environment: Env,
    locals: HashMap<ExprId, (usize, usize)>,
}

impl Interpreter {
    /// Creates a new Interpreter and defines the `clock` builtin.
    pub fn new(io: Box<dyn Io>) -> Self {
        info!("Initializing Interpreter");

        let root: Env = Environment::new().into_env();
        let mut globals: HashMap<String, Slot> = HashMap::new();

        debug!("Defining native function 'clock'");

        let clock = Function::native("clock", 0, Rc::clone(&root), native_clock);
        globals.insert(
            "clock".to_string(),
            Slot::Initialised(Value::Function(Rc::new(clock))),
        );

        Self {
            io,
            globals,
            environment: Rc::clone(&root),
            root,
            locals: HashMap::new(),
        }
    }

    /// Resolver callback: `id` refers to slot `index` of the frame `depth`
    /// levels out from where it is evaluated.
    pub fn resolve(&mut self, id: ExprId, depth: usize, index: usize) {
        debug!("Recording {:?} at depth {}, slot {}", id, depth, index);

        self.locals.insert(id, (depth, index));
    }

    /// Interprets a list of statements (a "program").
    ///
    /// Returns the session display of the last statement's result, if it
    /// produced one (`print`, `var`, … produce none).
    pub fn interpret(&mut self, statements: &[Stmt]) -> Result<Option<String>> {
        info!("Interpreting {} statement(s)", statements.len());

        let mut last: Option<Value> = None;

        for stmt in statements {
            last = match self.execute(stmt)? {
                Flow::Normal(value) => value,
                Flow::Return(_) | Flow::Break => None,
            };
        }

        info!("Interpretation completed successfully");

        Ok(last.map(|value| value.repr()))
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Statements
    // ─────────────────────────────────────────────────────────────────────────

    fn execute(&mut self, stmt: &Stmt) -> Result<Flow> {
        match stmt {
            Stmt::Expression(expr) => {
                let value: Value = self.evaluate(expr)?;
                Ok(Flow::Normal(Some(value)))
            }

            Stmt::Print(expr) => {
                let value: Value = self.evaluate(expr)?;
                debug!("print {}", value);
                self.io.print(&value.to_string());
                Ok(Flow::Normal(None))
            }

            Stmt::Var { name, initializer } => {
                debug!("Defining variable '{}'", name.lexeme);

                if self.at_global_scope() {
                    let slot: Slot = match initializer {
                        Some(expr) => Slot::Initialised(self.evaluate(expr)?),
                        None => Slot::Uninitialised,
                    };
                    self.globals.insert(name.lexeme.clone(), slot);
                } else {
                    let index: usize = self.environment.borrow_mut().declare();

                    if let Some(expr) = initializer {
                        let value: Value = self.evaluate(expr)?;
                        self.environment.borrow_mut().set(index, value);
                    }
                }

                Ok(Flow::Normal(None))
            }

            Stmt::Block(statements) => {
                let frame: Env = Environment::with_enclosing(Rc::clone(&self.environment)).into_env();
                self.execute_block(statements, frame)
            }

            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => {
                if self.evaluate(condition)?.is_truthy() {
                    self.execute(then_branch)
                } else if let Some(else_branch) = else_branch {
                    self.execute(else_branch)
                } else {
                    Ok(Flow::Normal(None))
                }
            }

            Stmt::While { condition, body } => {
                debug!("Entering while loop");

                while self.evaluate(condition)?.is_truthy() {
                    match self.execute(body)? {
                        Flow::Normal(_) => {}
                        Flow::Break => break,
                        Flow::Return(value) => return Ok(Flow::Return(value)),
                    }
                }

                debug!("Exited while loop");
                Ok(Flow::Normal(None))
            }

            Stmt::Break { .. } => Ok(Flow::Break),

            Stmt::Function(FunctionStmt { name, decl }) => {
                debug!("Defining function '{}'", name.lexeme);

                let function = Function::lox(
                    &name.lexeme,
                    Rc::clone(decl),
                    Rc::clone(&self.environment),
                    false,
                );
                self.define_variable(name, Value::Function(Rc::new(function)));

                Ok(Flow::Normal(None))
            }

            Stmt::Return { value, .. } => {
                let value: Value = match value {
                    Some(expr) => self.evaluate(expr)?,
                    None => Value::Nil,
                };
                debug!("Returning value: {}", value);
                Ok(Flow::Return(value))
            }

            Stmt::Class {
                name,
                superclass,
                methods,
                class_methods,
            } => self.execute_class(name, superclass.as_ref(), methods, class_methods),
        }
    }

    /// Run `statements` with `frame` as the current environment. The previous
    /// environment is put back on every exit path, errors included.
    pub fn execute_block(&mut self, statements: &[Stmt], frame: Env) -> Result<Flow> {
        debug!("Entering block with {} statement(s)", statements.len());

        let previous: Env = std::mem::replace(&mut self.environment, frame);
        let result: Result<Flow> = self.execute_all(statements);
        self.environment = previous;

        result
    }

    fn execute_all(&mut self, statements: &[Stmt]) -> Result<Flow> {
        let mut last: Option<Value> = None;

        for stmt in statements {
            match self.execute(stmt)? {
                Flow::Normal(value) => last = value,
                unwinding => return Ok(unwinding),
            }
        }

        Ok(Flow::Normal(last))
    }

    fn execute_class(
        &mut self,
        name: &Token,
        superclass: Option<&Expr>,
        methods: &[FunctionStmt],
        class_methods: &[FunctionStmt],
    ) -> Result<Flow> {
        debug!("Declaring class '{}'", name.lexeme);

        // The name is declared first so methods can refer to the class.
        let local_index: Option<usize> = if self.at_global_scope() {
            self.globals
                .insert(name.lexeme.clone(), Slot::Uninitialised);
            None
        } else {
            Some(self.environment.borrow_mut().declare())
        };

        let superclass: Option<Rc<Class>> = match superclass {
            Some(expr) => match self.evaluate(expr)? {
                Value::Class(class) => Some(class),
                _ => {
                    let line: usize = match expr {
                        Expr::Variable { name: superclass, .. } => superclass.line,
                        _ => name.line,
                    };
                    return Err(LoxError::runtime(line, "Superclass must be a class."));
                }
            },
            None => None,
        };

        // Methods of a subclass close over a frame holding `super`.
        let method_env: Env = match &superclass {
            Some(superclass) => {
                let mut frame = Environment::with_enclosing(Rc::clone(&self.environment));
                frame.define(Value::Class(Rc::clone(superclass)));
                frame.into_env()
            }
            None => Rc::clone(&self.environment),
        };

        let build = |functions: &[FunctionStmt], allow_initializer: bool| {
            functions
                .iter()
                .map(|method| {
                    let is_initializer: bool = allow_initializer && method.name.lexeme == "init";
                    let function = Function::lox(
                        &method.name.lexeme,
                        Rc::clone(&method.decl),
                        Rc::clone(&method_env),
                        is_initializer,
                    );
                    (method.name.lexeme.clone(), Rc::new(function))
                })
                .collect::<HashMap<String, Rc<Function>>>()
        };

        let class = Rc::new(Class::new(
            &name.lexeme,
            superclass,
            build(methods, true),
            build(class_methods, false),
        ));

        let value = Value::Class(Rc::clone(&class));

        match local_index {
            Some(index) => {
                self.environment.borrow_mut().set(index, value.clone());
            }
            None => {
                self.globals
                    .insert(name.lexeme.clone(), Slot::Initialised(value.clone()));
            }
        }

        info!("Class '{}' declared", class.name);

        Ok(Flow::Normal(Some(value)))
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Expressions
    // ─────────────────────────────────────────────────────────────────────────

    /// Evaluates an expression and returns a Value.
    pub fn evaluate(&mut self, expr: &Expr) -> Result<Value> {
        match expr {
            Expr::Literal(literal) => Ok(match literal {
                LiteralValue::Number(n) => Value::Number(*n),
                LiteralValue::Str(s) => Value::String(Rc::from(s.as_str())),
                LiteralValue::True => Value::Bool(true),
                LiteralValue::False => Value::Bool(false),
                LiteralValue::Nil => Value::Nil,
            }),

            Expr::Grouping(inner) => self.evaluate(inner),

            Expr::Unary { operator, right } => self.evaluate_unary(operator, right),

            Expr::Binary {
                left,
                operator,
                right,
            } => self.evaluate_binary(left, operator, right),

            Expr::Variable { id, name } => self.lookup_variable(*id, name),

            Expr::Assign { id, name, value } => {
                let value: Value = self.evaluate(value)?;
                self.assign_variable(*id, name, value.clone())?;
                Ok(value)
            }

            Expr::Logical {
                left,
                operator,
                right,
            } => {
                let left: Value = self.evaluate(left)?;

                let short_circuit: bool = match operator.token_type {
                    TokenType::OR => left.is_truthy(),
                    _ => !left.is_truthy(),
                };

                if short_circuit {
                    Ok(left)
                } else {
                    self.evaluate(right)
                }
            }

            Expr::Call {
                callee,
                paren,
                arguments,
            } => {
                let callee: Value = self.evaluate(callee)?;

                let mut args: Vec<Value> = Vec::with_capacity(arguments.len());
                for arg in arguments {
                    args.push(self.evaluate(arg)?);
                }

                self.call_value(callee, args, paren.line)
            }

            Expr::Function(decl) => Ok(self.anonymous_function(decl)),

            Expr::Get { object, name } => match self.evaluate(object)? {
                Value::Instance(instance) => {
                    Instance::get(&instance, &name.lexeme).ok_or_else(|| undefined_property(name))
                }

                Value::Class(class) => class
                    .find_class_method(&name.lexeme)
                    .map(Value::Function)
                    .ok_or_else(|| undefined_property(name)),

                _ => Err(LoxError::runtime(
                    name.line,
                    "Only instances have properties.",
                )),
            },

            Expr::Set {
                object,
                name,
                value,
            } => match self.evaluate(object)? {
                Value::Instance(instance) => {
                    let value: Value = self.evaluate(value)?;
                    instance.set(&name.lexeme, value.clone());
                    Ok(value)
                }

                _ => Err(LoxError::runtime(name.line, "Only instances have fields.")),
            },

            Expr::This { id, keyword } => self.lookup_variable(*id, keyword),

            Expr::Super {
                id,
                keyword,
                method,
            } => self.evaluate_super(*id, keyword, method),
        }
    }

    fn anonymous_function(&self, decl: &Rc<FunctionDecl>) -> Value {
        let function = Function::lox(
            "anonymous",
            Rc::clone(decl),
            Rc::clone(&self.environment),
            false,
        );

        Value::Function(Rc::new(function))
    }

    fn evaluate_unary(&mut self, operator: &Token, right: &Expr) -> Result<Value> {
        let right: Value = self.evaluate(right)?;

        match operator.token_type {
            TokenType::MINUS => Ok(Value::Number(-expect_number(&right, operator)?)),
            _ => Ok(Value::Bool(!right.is_truthy())),
        }
    }

    fn evaluate_binary(&mut self, left: &Expr, operator: &Token, right: &Expr) -> Result<Value> {
        let left: Value = self.evaluate(left)?;
        let right: Value = self.evaluate(right)?;

        debug!("Binary {} on {} and {}", operator.lexeme, left, right);

        match operator.token_type {
            TokenType::PLUS => match (&left, &right) {
                (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a + b)),
                (Value::String(_), _) | (_, Value::String(_)) => {
                    Ok(Value::String(Rc::from(format!("{}{}", left, right))))
                }
                _ => Err(LoxError::runtime(
                    operator.line,
                    "Operand must be a string or a number",
                )),
            },

            TokenType::MINUS => {
                let (a, b) = expect_numbers(&left, &right, operator)?;
                Ok(Value::Number(a - b))
            }

            TokenType::STAR => {
                let (a, b) = expect_numbers(&left, &right, operator)?;
                Ok(Value::Number(a * b))
            }

            TokenType::SLASH => {
                let (a, b) = expect_numbers(&left, &right, operator)?;
                if b == 0.0 {
                    return Err(LoxError::runtime(operator.line, "Division by zero"));
                }
                Ok(Value::Number(a / b))
            }

            TokenType::GREATER => {
                let (a, b) = expect_numbers(&left, &right, operator)?;
                Ok(Value::Bool(a > b))
            }

            TokenType::GREATER_EQUAL => {
                let (a, b) = expect_numbers(&left, &right, operator)?;
                Ok(Value::Bool(a >= b))
            }

            TokenType::LESS => {
                let (a, b) = expect_numbers(&left, &right, operator)?;
                Ok(Value::Bool(a < b))
            }

            TokenType::LESS_EQUAL => {
                let (a, b) = expect_numbers(&left, &right, operator)?;
                Ok(Value::Bool(a <= b))
            }

            TokenType::EQUAL_EQUAL => Ok(Value::Bool(left == right)),

            TokenType::BANG_EQUAL => Ok(Value::Bool(left != right)),

            _ => Err(LoxError::runtime(
                operator.line,
                format!("Invalid binary operator '{}'", operator.lexeme),
            )),
        }
    }

    /// `super.method`: look the method up starting at the superclass stored in
    /// the `super` frame, then bind it to the `this` one frame further in.
    fn evaluate_super(
        &mut self,
        id: ExprId,
        keyword: &Token,
        method: &Token,
    ) -> Result<Value> {
        let (depth, index) = match self.locals.get(&id) {
            Some(&address) => address,
            None => return Err(undefined_variable(keyword)),
        };

        let superclass: Rc<Class> = match environment::get_at(&self.environment, depth, index) {
            Some(Slot::Initialised(Value::Class(class))) => class,
            _ => return Err(undefined_variable(keyword)),
        };

        let instance: Rc<Instance> = match depth
            .checked_sub(1)
            .and_then(|this_depth| environment::get_at(&self.environment, this_depth, 0))
        {
            Some(Slot::Initialised(Value::Instance(instance))) => instance,
            _ => {
                return Err(LoxError::runtime(
                    keyword.line,
                    "Undefined variable `this`.",
                ))
            }
        };

        debug!(
            "super.{} from {} (instance of {})",
            method.lexeme, superclass.name, instance.class.name
        );

        match superclass.find_method(&method.lexeme) {
            Some(found) => Ok(Value::Function(Rc::new(found.bind(instance)))),
            None => Err(undefined_property(method)),
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Calls
    // ─────────────────────────────────────────────────────────────────────────

    /// Invokes a callable (function, bound method or class).
    fn call_value(&mut self, callee: Value, args: Vec<Value>, line: usize) -> Result<Value> {
        match callee {
            Value::Function(function) => {
                check_arity(function.arity, args.len(), line)?;
                self.call_function(&function, args)
            }

            Value::Class(class) => {
                check_arity(class.arity(), args.len(), line)?;

                debug!("Constructing {} instance", class.name);

                let instance = Rc::new(Instance::new(Rc::clone(&class)));

                if let Some(init) = class.find_method("init") {
                    let bound: Function = init.bind(Rc::clone(&instance));
                    self.call_function(&bound, args)?;
                }

                Ok(Value::Instance(instance))
            }

            _ => Err(LoxError::runtime(
                line,
                "Can only call functions and classes.",
            )),
        }
    }

    /// Run a function whose arity has already been checked.
    fn call_function(&mut self, function: &Function, args: Vec<Value>) -> Result<Value> {
        debug!("Calling function '{}'", function.name);

        match &function.kind {
            FunctionKind::Native(func) => {
                let result: Value = func(self.io.as_ref(), &args);
                info!("Native function '{}' returned: {}", function.name, result);
                Ok(result)
            }

            FunctionKind::Lox {
                decl,
                is_initializer,
            } => {
                let mut params = Environment::with_enclosing(Rc::clone(&function.closure));
                for arg in args {
                    params.define(arg);
                }

                // Parameters and body locals live in separate frames, matching
                // the two scopes the resolver opens for a function.
                let body = Environment::with_enclosing(params.into_env()).into_env();

                let flow: Flow = self.execute_block(&decl.body, body)?;

                if *is_initializer {
                    return Ok(match environment::get_at(&function.closure, 0, 0) {
                        Some(Slot::Initialised(this)) => this,
                        _ => Value::Nil,
                    });
                }

                match flow {
                    Flow::Return(value) => Ok(value),
                    Flow::Normal(_) | Flow::Break => Ok(Value::Nil),
                }
            }
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Variables
    // ─────────────────────────────────────────────────────────────────────────

    fn at_global_scope(&self) -> bool {
        Rc::ptr_eq(&self.environment, &self.root)
    }

    /// Bind a new, initialised name in the current scope.
    fn define_variable(&mut self, name: &Token, value: Value) {
        if self.at_global_scope() {
            self.globals
                .insert(name.lexeme.clone(), Slot::Initialised(value));
        } else {
            self.environment.borrow_mut().define(value);
        }
    }

    fn lookup_variable(&self, id: ExprId, name: &Token) -> Result<Value> {
        let slot: Option<Slot> = match self.locals.get(&id) {
            Some(&(depth, index)) => environment::get_at(&self.environment, depth, index),
            None => self.globals.get(&name.lexeme).cloned(),
        };

        match slot {
            Some(Slot::Initialised(value)) => Ok(value),
            Some(Slot::Uninitialised) => Err(LoxError::runtime(
                name.line,
                format!("Uninitialised variable `{}`", name.lexeme),
            )),
            None => Err(undefined_variable(name)),
        }
    }

    fn assign_variable(
        &mut self,
        id: ExprId,
        name: &Token,
        value: Value,
    ) -> Result<()> {
        let assigned: bool = match self.locals.get(&id) {
            Some(&(depth, index)) => environment::assign_at(&self.environment, depth, index, value),
            None => match self.globals.get_mut(&name.lexeme) {
                Some(slot) => {
                    *slot = Slot::Initialised(value);
                    true
                }
                None => false,
            },
        };

        if assigned {
            Ok(())
        } else {
            Err(undefined_variable(name))
        }
    }
}

fn native_clock(io: &dyn Io, _args: &[Value]) -> Value {
    Value::Number(io.current_time())
}

fn check_arity(expected: usize, got: usize, line: usize) -> Result<()> {
    if expected == got {
        return Ok(());
    }

    Err(LoxError::runtime(
        line,
        format!("Expected {} arguments but got {}.", expected, got),
    ))
}

fn expect_number(value: &Value, operator: &Token) -> Result<f64> {
    match value {
        Value::Number(n) => Ok(*n),
        _ => Err(LoxError::runtime(operator.line, "Operand must be a number")),
    }
}

fn expect_numbers(left: &Value, right: &Value, operator: &Token) -> Result<(f64, f64)> {
    Ok((expect_number(left, operator)?, expect_number(right, operator)?))
}

fn undefined_variable(name: &Token) -> LoxError {
    LoxError::runtime(
        name.line,
        format!("Undefined variable `{}`.", name.lexeme),
    )
}

fn undefined_property(name: &Token) -> LoxError {
    LoxError::runtime(
        name.line,
        format!("Undefined property `{}`.", name.lexeme),
    )
}
