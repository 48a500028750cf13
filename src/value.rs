//! Runtime values and the callable/object model built on top of them.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use log::debug;

use crate::environment::{Env, Environment};
use crate::io::Io;
use crate::parser::FunctionDecl;

/// Signature of a builtin. Builtins see the host interfaces, never the
/// interpreter's environments.
pub type NativeFn = fn(&dyn Io, &[Value]) -> Value;

#[derive(Debug, Clone)]
pub enum Value {
    Nil,
    Bool(bool),
    Number(f64),
    String(Rc<str>),
    Function(Rc<Function>),
    Class(Rc<Class>),
    Instance(Rc<Instance>),
}

impl Value {
    /// Only `nil` and `false` are falsy.
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Value::Nil | Value::Bool(false))
    }

    /// Session display form: like `Display`, but strings keep their quotes.
    pub fn repr(&self) -> String {
        match self {
            Value::String(s) => format!("\"{}\"", s),
            other => other.to_string(),
        }
    }
}

impl PartialEq for Value {
    /// Strict equality: values of different kinds are never equal and
    /// functions, classes and instances compare by identity.
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Nil, Value::Nil) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Function(a), Value::Function(b)) => Rc::ptr_eq(a, b),
            (Value::Class(a), Value::Class(b)) => Rc::ptr_eq(a, b),
            (Value::Instance(a), Value::Instance(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => write!(f, "nil"),

            Value::Bool(b) => write!(f, "{}", b),

            Value::Number(n) => write!(f, "{}", format_number(*n)),

            Value::String(s) => write!(f, "{}", s),

            Value::Function(function) => write!(f, "fn <{}>", function.name),

            Value::Class(class) => write!(f, "{}", class.name),

            Value::Instance(instance) => write!(f, "{} instance", instance.class.name),
        }
    }
}

/// Render a number the way the session prints it.
///
/// * NaN / infinities: `NaN`, `Infinity`, `-Infinity`.
/// * `1e-3 <= |n| < 1e7` (and zero): shortest round‑trip decimal, no trailing
///   `.0` (`3.0` → `3`).
/// * Anything else: scientific with a mandatory fraction and an uppercase `E`
///   (`1662466230` → `1.66246623E9`, `1e-4` → `1.0E-4`).
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        return "NaN".to_string();
    }

    if n.is_infinite() {
        return if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }

    let magnitude: f64 = n.abs();

    if magnitude == 0.0 || (1e-3..1e7).contains(&magnitude) {
        return format!("{}", n);
    }

    let scientific: String = format!("{:e}", n);

    match scientific.split_once('e') {
        Some((mantissa, exponent)) if mantissa.contains('.') => {
            format!("{}E{}", mantissa, exponent)
        }
        Some((mantissa, exponent)) => format!("{}.0E{}", mantissa, exponent),
        None => scientific,
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Functions
// ─────────────────────────────────────────────────────────────────────────────

pub enum FunctionKind {
    Native(NativeFn),

    Lox {
        decl: Rc<FunctionDecl>,

        /// `init` methods always hand back `this`.
        is_initializer: bool,
    },
}

/// A callable: a builtin, a user function, or a method (bound or not).
pub struct Function {
    pub name: String,
    pub arity: usize,
    /// Frame the body's parameter frame is parented to.
    pub closure: Env,
    pub kind: FunctionKind,
}

impl Function {
    pub fn native(name: &str, arity: usize, closure: Env, func: NativeFn) -> Self {
        Function {
            name: name.to_string(),
            arity,
            closure,
            kind: FunctionKind::Native(func),
        }
    }

    pub fn lox(name: &str, decl: Rc<FunctionDecl>, closure: Env, is_initializer: bool) -> Self {
        Function {
            name: name.to_string(),
            arity: decl.params.len(),
            closure,
            kind: FunctionKind::Lox {
                decl,
                is_initializer,
            },
        }
    }

    /// A copy of this method whose closure has `this` (slot 0 of a new
    /// frame) bound to `instance`.
    pub fn bind(&self, instance: Rc<Instance>) -> Function {
        debug!(
            "Binding method '{}' to {} instance",
            self.name, instance.class.name
        );

        let mut frame = Environment::with_enclosing(Rc::clone(&self.closure));
        frame.define(Value::Instance(instance));

        let kind = match &self.kind {
            FunctionKind::Native(func) => FunctionKind::Native(*func),
            FunctionKind::Lox {
                decl,
                is_initializer,
            } => FunctionKind::Lox {
                decl: Rc::clone(decl),
                is_initializer: *is_initializer,
            },
        };

        Function {
            name: self.name.clone(),
            arity: self.arity,
            closure: frame.into_env(),
            kind,
        }
    }
}

impl fmt::Debug for Function {
    // The closure chain can lead back to this function, so it is not printed.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Function")
            .field("name", &self.name)
            .field("arity", &self.arity)
            .finish_non_exhaustive()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Classes and instances
// ─────────────────────────────────────────────────────────────────────────────

pub struct Class {
    pub name: String,
    pub superclass: Option<Rc<Class>>,
    methods: HashMap<String, Rc<Function>>,
    class_methods: HashMap<String, Rc<Function>>,
}

impl Class {
    pub fn new(
        name: &str,
        superclass: Option<Rc<Class>>,
        methods: HashMap<String, Rc<Function>>,
        class_methods: HashMap<String, Rc<Function>>,
    ) -> Self {
        Class {
            name: name.to_string(),
            superclass,
            methods,
            class_methods,
        }
    }

    /// Instance method lookup: own methods first, then up the superclass chain.
    pub fn find_method(&self, name: &str) -> Option<Rc<Function>> {
        match self.methods.get(name) {
            Some(method) => Some(Rc::clone(method)),
            None => self
                .superclass
                .as_ref()
                .and_then(|superclass| superclass.find_method(name)),
        }
    }

    /// Static (`class`) method lookup, also inherited.
    pub fn find_class_method(&self, name: &str) -> Option<Rc<Function>> {
        match self.class_methods.get(name) {
            Some(method) => Some(Rc::clone(method)),
            None => self
                .superclass
                .as_ref()
                .and_then(|superclass| superclass.find_class_method(name)),
        }
    }

    /// Constructor arity: that of `init`, or zero without one.
    pub fn arity(&self) -> usize {
        self.find_method("init").map_or(0, |init| init.arity)
    }
}

impl fmt::Debug for Class {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Class")
            .field("name", &self.name)
            .field(
                "superclass",
                &self.superclass.as_ref().map(|s| s.name.as_str()),
            )
            .finish_non_exhaustive()
    }
}

pub struct Instance {
    pub class: Rc<Class>,
    fields: RefCell<HashMap<String, Value>>,
}

impl Instance {
    pub fn new(class: Rc<Class>) -> Self {
        Instance {
            class,
            fields: RefCell::new(HashMap::new()),
        }
    }

    /// Property lookup: fields shadow methods; methods come back bound.
    pub fn get(instance: &Rc<Instance>, name: &str) -> Option<Value> {
        if let Some(field) = instance.fields.borrow().get(name) {
            return Some(field.clone());
        }

        instance
            .class
            .find_method(name)
            .map(|method| Value::Function(Rc::new(method.bind(Rc::clone(instance)))))
    }

    pub fn set(&self, name: &str, value: Value) {
        self.fields.borrow_mut().insert(name.to_string(), value);
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} instance", self.class.name)
    }
}
