//! Two-tier variable store
//!
//! Keys whose first character is an uppercase ASCII letter live in the
//! session-wide global map; every other key lives in the local scope of the
//! process invocation that is currently running. At the root the local scope
//! *is* the global map. Nested invocations with a capture key push a fresh,
//! empty local scope whose final contents land in the parent scope under that
//! key when the invocation exits.
//!
//! The casing rule is a runtime convention for script authors, not a type
//! distinction. Empty keys are not special-cased and route to the local scope.

use serde_json::Value;

/// A flat variable scope
pub type Vars = serde_json::Map<String, Value>;

/// Returns true when `key` addresses the global scope
pub fn is_global_key(key: &str) -> bool {
    key.chars().next().is_some_and(|c| c.is_ascii_uppercase())
}

#[derive(Debug)]
struct Frame {
    capture_key: String,
    vars: Vars,
}

/// Marker returned by [`VariableStore::enter_scope`]; hand it back to
/// [`VariableStore::exit_scope`] to restore the caller's scope.
#[derive(Debug)]
#[must_use = "the scope must be exited with VariableStore::exit_scope"]
pub struct ScopeToken {
    depth: usize,
    captured: bool,
}

/// Session variables: one global map plus a stack of captured local scopes
#[derive(Debug, Default)]
pub struct VariableStore {
    global: Vars,
    frames: Vec<Frame>,
}

impl VariableStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Write `value` under `key`, routing by the casing rule. Returns the
    /// stored value.
    pub fn set_value(&mut self, key: &str, value: Value) -> Value {
        let scope = if is_global_key(key) {
            &mut self.global
        } else {
            self.local_mut()
        };
        scope.insert(key.to_string(), value.clone());
        value
    }

    /// Read `key`, routing by the casing rule
    pub fn get_value(&self, key: &str) -> Option<&Value> {
        if is_global_key(key) {
            self.global.get(key)
        } else {
            self.local().get(key)
        }
    }

    /// The whole global scope
    pub fn global(&self) -> &Vars {
        &self.global
    }

    /// The whole local scope of the running invocation
    pub fn local(&self) -> &Vars {
        self.frames.last().map_or(&self.global, |f| &f.vars)
    }

    fn local_mut(&mut self) -> &mut Vars {
        match self.frames.last_mut() {
            Some(frame) => &mut frame.vars,
            None => &mut self.global,
        }
    }

    /// Number of captured scopes currently pushed
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Enter the scope for a new invocation. With a capture key a new empty
    /// scope is pushed and an empty object is placed under the key in the
    /// parent scope; without one the invocation shares the current scope.
    pub fn enter_scope(&mut self, capture_key: Option<&str>) -> ScopeToken {
        let Some(key) = capture_key else {
            return ScopeToken {
                depth: self.frames.len(),
                captured: false,
            };
        };

        self.local_mut()
            .insert(key.to_string(), Value::Object(Vars::new()));
        self.frames.push(Frame {
            capture_key: key.to_string(),
            vars: Vars::new(),
        });
        ScopeToken {
            depth: self.frames.len(),
            captured: true,
        }
    }

    /// Leave the scope entered with `token` and return its final contents.
    ///
    /// A captured scope is popped and its contents are written into the
    /// parent scope under the capture key. A shared scope is returned as-is.
    pub fn exit_scope(&mut self, token: ScopeToken) -> Value {
        debug_assert_eq!(
            token.depth,
            self.frames.len(),
            "scopes must be exited in the order they were entered"
        );

        if !token.captured {
            return Value::Object(self.local().clone());
        }

        let Some(frame) = self.frames.pop() else {
            tracing::error!("exit_scope called with no captured scope on the stack");
            return Value::Object(Vars::new());
        };
        let contents = Value::Object(frame.vars);
        self.local_mut().insert(frame.capture_key, contents.clone());
        contents
    }
}
