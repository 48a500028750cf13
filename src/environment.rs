//! Lexical scope frames.
//!
//! Locals are addressed by `(depth, slot)` pairs computed by the resolver, so
//! a frame is just a growable list of slots plus a link to its parent. Slots
//! are appended in declaration order, which is exactly the order in which the
//! resolver hands out indices.

use crate::value::Value;
use log::debug;
use std::cell::RefCell;
use std::rc::Rc;

/// Shared, mutable handle to a frame. Closures keep their defining frame
/// alive through this.
pub type Env = Rc<RefCell<Environment>>;

/// State of one variable.
#[derive(Debug, Clone)]
pub enum Slot {
    /// Declared (`var x;`) but never assigned.
    Uninitialised,
    Initialised(Value),
}

#[derive(Debug, Default)]
pub struct Environment {
    slots: Vec<Slot>,
    enclosing: Option<Env>,
}

impl Environment {
    /// A root frame with no parent.
    pub fn new() -> Self {
        Environment {
            slots: Vec::new(),
            enclosing: None,
        }
    }

    pub fn with_enclosing(enclosing: Env) -> Self {
        Environment {
            slots: Vec::new(),
            enclosing: Some(enclosing),
        }
    }

    /// Wrap in a fresh shared handle.
    pub fn into_env(self) -> Env {
        Rc::new(RefCell::new(self))
    }

    /// Append an uninitialised slot and return its index.
    pub fn declare(&mut self) -> usize {
        self.slots.push(Slot::Uninitialised);
        self.slots.len() - 1
    }

    /// Append an initialised slot and return its index.
    pub fn define(&mut self, value: Value) -> usize {
        self.slots.push(Slot::Initialised(value));
        self.slots.len() - 1
    }

    /// Overwrite slot `index` of this frame. Returns `false` if no such slot.
    pub fn set(&mut self, index: usize, value: Value) -> bool {
        match self.slots.get_mut(index) {
            Some(slot) => {
                *slot = Slot::Initialised(value);
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn enclosing(&self) -> Option<Env> {
        self.enclosing.clone()
    }
}

/// Walk `depth` parents up from `env`.
pub fn ancestor(env: &Env, depth: usize) -> Option<Env> {
    let mut current: Env = Rc::clone(env);

    for _ in 0..depth {
        let parent: Option<Env> = current.borrow().enclosing();
        current = parent?;
    }

    Some(current)
}

/// Read slot `index` of the frame `depth` levels above `env`.
pub fn get_at(env: &Env, depth: usize, index: usize) -> Option<Slot> {
    let frame: Env = ancestor(env, depth)?;
    let slot: Option<Slot> = frame.borrow().slots.get(index).cloned();

    debug!("get_at(depth={}, index={}) -> {:?}", depth, index, slot);

    slot
}

/// Write slot `index` of the frame `depth` levels above `env`.
pub fn assign_at(env: &Env, depth: usize, index: usize, value: Value) -> bool {
    match ancestor(env, depth) {
        Some(frame) => frame.borrow_mut().set(index, value),
        None => false,
    }
}
