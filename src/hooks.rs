//! Ordered extension points.
//!
//! A hook list holds callbacks that observe a computed value together with
//! some context and may rewrite the value in place. Callbacks run
//! synchronously in the order they were registered.

use std::sync::Arc;

/// A callback that may rewrite `V` given context `C`
pub type Hook<C, V> = Arc<dyn Fn(&C, &mut V) + Send + Sync>;

pub struct Hooks<C, V> {
    callbacks: Vec<Hook<C, V>>,
}

impl<C, V> Hooks<C, V> {
    pub fn new() -> Self {
        Self {
            callbacks: Vec::new(),
        }
    }

    /// Append a callback; it runs after every callback registered before it
    pub fn register<F>(&mut self, callback: F)
    where
        F: Fn(&C, &mut V) + Send + Sync + 'static,
    {
        self.callbacks.push(Arc::new(callback));
    }

    /// Run every callback in registration order
    pub fn apply(&self, context: &C, value: &mut V) {
        for callback in &self.callbacks {
            callback(context, value);
        }
    }

    pub fn len(&self) -> usize {
        self.callbacks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.callbacks.is_empty()
    }
}

impl<C, V> Default for Hooks<C, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C, V> Clone for Hooks<C, V> {
    fn clone(&self) -> Self {
        Self {
            callbacks: self.callbacks.clone(),
        }
    }
}

impl<C, V> std::fmt::Debug for Hooks<C, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Hooks")
            .field("callbacks", &self.callbacks.len())
            .finish()
    }
}
