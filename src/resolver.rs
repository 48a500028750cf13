//! Static resolver pass for the **Lox** interpreter.
//!
//! This resolver does three things in one AST walk:
//! 1. Build lexical scopes, handing out slot indices in declaration order.
//! 2. Report static errors (redeclaration, read in own initialiser, unused
//!    locals, misplaced `return`/`this`/`super`, self-inheritance).
//! 3. Tell the interpreter, for *each* local occurrence, the `(depth, slot)`
//!    at which it lives. Anything not found in a scope is a global.
//!
//! Scopes opened here mirror the frames the interpreter creates: one per
//! block, two per function (parameters, then body), one holding `super` for a
//! subclass's methods and one holding `this` for instance methods.
//!
//! Errors are collected, so one pass reports every problem it finds.

use std::collections::HashMap;

use log::{debug, info};

use crate::error::LoxError;
use crate::interpreter::Interpreter;
use crate::parser::{Expr, ExprId, FunctionDecl, FunctionStmt, Stmt};
use crate::token::Token;

/// What kind of function body are we in? Used to validate `return`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum FunctionType {
    None,
    Function,
    Method,
    Initializer,
}

/// Are we inside a class body, and does it have a superclass?
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum ClassType {
    None,
    Class,
    Subclass,
}

#[derive(Debug)]
struct Binding {
    index: usize,
    line: usize,
    defined: bool,
    read: bool,
}

#[derive(Debug, Default)]
struct Scope {
    bindings: HashMap<String, Binding>,
    next_slot: usize,
}

/// Resolver: tracks scopes, enforces static rules, and *records* binding
/// addresses by calling back into the interpreter.
pub struct Resolver<'interp> {
    interpreter: &'interp mut Interpreter,
    scopes: Vec<Scope>,
    current_function: FunctionType,
    current_class: ClassType,
    /// Inside a `class` method, including functions nested in one.
    static_context: bool,
    errors: Vec<LoxError>,
}

impl<'interp> Resolver<'interp> {
    /// Create a new resolver bound to the given interpreter.
    pub fn new(interpreter: &'interp mut Interpreter) -> Self {
        info!("Resolver instantiated");

        Resolver {
            interpreter,
            scopes: Vec::new(),
            current_function: FunctionType::None,
            current_class: ClassType::None,
            static_context: false,
            errors: Vec::new(),
        }
    }

    /// Walk all top‑level statements and return every static error found.
    pub fn resolve(&mut self, statements: &[Stmt]) -> Vec<LoxError> {
        info!(
            "Beginning resolve pass over {} statement(s)",
            statements.len()
        );

        for stmt in statements {
            self.resolve_stmt(stmt);
        }

        info!("Resolve pass found {} error(s)", self.errors.len());

        std::mem::take(&mut self.errors)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Statement resolution
    // ─────────────────────────────────────────────────────────────────────────

    fn resolve_stmt(&mut self, stmt: &Stmt) {
        debug!("Resolving stmt: {:?}", stmt);

        match stmt {
            Stmt::Block(statements) => {
                self.begin_scope();
                for s in statements {
                    self.resolve_stmt(s);
                }
                self.end_scope();
            }

            Stmt::Var { name, initializer } => {
                // declare → resolve initializer → define
                self.declare(name);
                if let Some(expr) = initializer {
                    self.resolve_expr(expr);
                }
                self.define(name);
            }

            Stmt::Function(FunctionStmt { name, decl }) => {
                // the name is visible inside its own body
                self.declare(name);
                self.define(name);
                self.resolve_function(decl, FunctionType::Function);
            }

            Stmt::Expression(expr) | Stmt::Print(expr) => self.resolve_expr(expr),

            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => {
                self.resolve_expr(condition);
                self.resolve_stmt(then_branch);
                if let Some(eb) = else_branch.as_deref() {
                    self.resolve_stmt(eb);
                }
            }

            Stmt::While { condition, body } => {
                self.resolve_expr(condition);
                self.resolve_stmt(body);
            }

            Stmt::Break { .. } => {}

            Stmt::Return { keyword, value } => {
                if self.current_function == FunctionType::None {
                    self.error(keyword.line, "return", "Can't return from top-level code.");
                }

                if let Some(expr) = value {
                    if self.current_function == FunctionType::Initializer {
                        self.error(
                            keyword.line,
                            "return",
                            "Can't return a value from an initialiser.",
                        );
                    }
                    self.resolve_expr(expr);
                }
            }

            Stmt::Class {
                name,
                superclass,
                methods,
                class_methods,
            } => self.resolve_class(name, superclass.as_ref(), methods, class_methods),
        }
    }

    fn resolve_class(
        &mut self,
        name: &Token,
        superclass: Option<&Expr>,
        methods: &[FunctionStmt],
        class_methods: &[FunctionStmt],
    ) {
        let enclosing_class: ClassType = self.current_class;
        let enclosing_static: bool = self.static_context;
        self.current_class = ClassType::Class;
        self.static_context = false;

        self.declare(name);
        self.define(name);

        if let Some(superclass) = superclass {
            if let Expr::Variable {
                name: super_name, ..
            } = superclass
            {
                if super_name.lexeme == name.lexeme {
                    self.error(
                        super_name.line,
                        format!("`{}`", super_name.lexeme),
                        "A class can't inherit from itself.",
                    );
                }
            }

            self.current_class = ClassType::Subclass;
            self.resolve_expr(superclass);

            self.begin_scope();
            self.bind_implicit("super", name.line);
        }

        // Static methods see neither `this` nor `super`.
        self.static_context = true;
        for method in class_methods {
            self.resolve_function(&method.decl, FunctionType::Method);
        }
        self.static_context = false;

        self.begin_scope();
        self.bind_implicit("this", name.line);

        for method in methods {
            let kind: FunctionType = if method.name.lexeme == "init" {
                FunctionType::Initializer
            } else {
                FunctionType::Method
            };
            self.resolve_function(&method.decl, kind);
        }

        self.end_scope();

        if superclass.is_some() {
            self.end_scope();
        }

        self.current_class = enclosing_class;
        self.static_context = enclosing_static;
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Expression resolution
    // ─────────────────────────────────────────────────────────────────────────

    fn resolve_expr(&mut self, expr: &Expr) {
        debug!("Resolving expr: {:?}", expr);

        match expr {
            Expr::Literal(_) => {}

            Expr::Grouping(inner) => self.resolve_expr(inner),

            Expr::Unary { right, .. } => self.resolve_expr(right),

            Expr::Binary { left, right, .. } | Expr::Logical { left, right, .. } => {
                self.resolve_expr(left);
                self.resolve_expr(right);
            }

            Expr::Variable { id, name } => {
                let in_own_initializer: bool = self
                    .scopes
                    .last()
                    .and_then(|scope| scope.bindings.get(&name.lexeme))
                    .map_or(false, |binding| !binding.defined);

                if in_own_initializer {
                    self.error(
                        name.line,
                        name.lexeme.clone(),
                        "Can't read local variable in its own initialiser.",
                    );
                }

                self.resolve_local(*id, &name.lexeme);
            }

            Expr::Assign { id, name, value } => {
                // First resolve RHS, then bind LHS
                self.resolve_expr(value);
                self.resolve_local(*id, &name.lexeme);
            }

            Expr::Call {
                callee, arguments, ..
            } => {
                self.resolve_expr(callee);
                for arg in arguments {
                    self.resolve_expr(arg);
                }
            }

            Expr::Function(decl) => self.resolve_function(decl, FunctionType::Function),

            Expr::Get { object, .. } => self.resolve_expr(object),

            Expr::Set { object, value, .. } => {
                self.resolve_expr(object);
                self.resolve_expr(value);
            }

            Expr::This { id, keyword } => {
                if self.current_class == ClassType::None {
                    self.error(keyword.line, "this", "Can't use 'this' outside of a class.");
                } else if self.static_context {
                    self.error(
                        keyword.line,
                        "this",
                        "Can't use 'this' in static class method.",
                    );
                } else {
                    self.resolve_local(*id, "this");
                }
            }

            Expr::Super { id, keyword, .. } => {
                let message: Option<&str> = match self.current_class {
                    ClassType::None => Some("Can't use `super` outside a class."),
                    _ if self.static_context => Some("Can't use `super` in a static class method."),
                    ClassType::Class => Some("Can't use `super` in a class with no superclass."),
                    ClassType::Subclass => None,
                };

                match message {
                    Some(message) => self.error(keyword.line, "`super`", message),
                    None => self.resolve_local(*id, "super"),
                }
            }
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Function helper
    // ─────────────────────────────────────────────────────────────────────────

    /// Parameters get their own scope and the body a second one nested in it.
    fn resolve_function(&mut self, decl: &FunctionDecl, kind: FunctionType) {
        let enclosing: FunctionType = self.current_function;
        self.current_function = kind;

        self.begin_scope();
        for param in &decl.params {
            self.declare(param);
            self.define(param);
            self.mark_read(&param.lexeme);
        }

        self.begin_scope();
        for stmt in &decl.body {
            self.resolve_stmt(stmt);
        }
        self.end_scope();

        self.end_scope();

        self.current_function = enclosing;
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Scope management
    // ─────────────────────────────────────────────────────────────────────────

    #[inline]
    fn begin_scope(&mut self) {
        self.scopes.push(Scope::default());
    }

    /// Pop the innermost scope, reporting locals that were never read in the
    /// order they were declared.
    fn end_scope(&mut self) {
        let Some(scope) = self.scopes.pop() else {
            return;
        };

        let mut unused: Vec<(String, Binding)> = scope
            .bindings
            .into_iter()
            .filter(|(_, binding)| !binding.read)
            .collect();
        unused.sort_by_key(|(_, binding)| binding.index);

        for (name, binding) in unused {
            self.error(binding.line, name, "Variable is never used.");
        }
    }

    fn declare(&mut self, name: &Token) {
        let Some(scope) = self.scopes.last_mut() else {
            return;
        };

        let duplicate: bool = scope.bindings.contains_key(&name.lexeme);

        let index: usize = scope.next_slot;
        scope.next_slot += 1;
        scope.bindings.insert(
            name.lexeme.clone(),
            Binding {
                index,
                line: name.line,
                defined: false,
                read: false,
            },
        );

        if duplicate {
            self.error(
                name.line,
                name.lexeme.clone(),
                "Already a variable with this name in this scope.",
            );
        }
    }

    fn define(&mut self, name: &Token) {
        if let Some(binding) = self
            .scopes
            .last_mut()
            .and_then(|scope| scope.bindings.get_mut(&name.lexeme))
        {
            binding.defined = true;
        }
    }

    /// Bind a name the user never declares (`this`, `super`) at the next slot
    /// of the innermost scope. Such names are exempt from the unused check.
    fn bind_implicit(&mut self, name: &str, line: usize) {
        if let Some(scope) = self.scopes.last_mut() {
            let index: usize = scope.next_slot;
            scope.next_slot += 1;
            scope.bindings.insert(
                name.to_string(),
                Binding {
                    index,
                    line,
                    defined: true,
                    read: true,
                },
            );
        }
    }

    fn mark_read(&mut self, name: &str) {
        if let Some(binding) = self
            .scopes
            .last_mut()
            .and_then(|scope| scope.bindings.get_mut(name))
        {
            binding.read = true;
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Binding‑address helper
    // ─────────────────────────────────────────────────────────────────────────

    /// Record this occurrence as a local at `(depth, slot)`, or leave it as a
    /// global if no scope declares it.
    fn resolve_local(&mut self, id: ExprId, name: &str) {
        for (depth, scope) in self.scopes.iter_mut().rev().enumerate() {
            if let Some(binding) = scope.bindings.get_mut(name) {
                binding.read = true;

                debug!(
                    "Resolved '{}' at depth {}, slot {}",
                    name, depth, binding.index
                );

                self.interpreter.resolve(id, depth, binding.index);
                return;
            }
        }

        debug!("Resolved '{}' as global", name);
    }

    fn error<N: Into<String>>(&mut self, line: usize, name: N, message: &str) {
        self.errors.push(LoxError::resolve(line, name, message));
    }
}
