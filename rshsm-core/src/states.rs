//! State callback registry and the substate tree.

use crate::error::HsmError;
use crate::variant::VariantList;
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

/// Callback invoked after a state became current.
pub type StateChangedCallback = Arc<dyn Fn(&VariantList) + Send + Sync>;

/// Callback asked to admit entry into a state. Returning false rejects the
/// transition and reverts to the previous state.
pub type StateEnterCallback = Arc<dyn Fn(&VariantList) -> bool + Send + Sync>;

/// Callback asked to permit leaving a state. Returning false aborts the
/// transition before any other callback runs.
pub type StateExitCallback = Arc<dyn Fn() -> bool + Send + Sync>;

pub(crate) struct StateCallbacks {
    pub on_changed: Option<StateChangedCallback>,
    pub on_entering: Option<StateEnterCallback>,
    pub on_exiting: Option<StateExitCallback>,
}

/// The static structure of a machine: per-state callbacks, the parent
/// relation, and entry-point designations.
///
/// States participate without being registered; lookups on unknown states
/// simply yield empty callbacks and no parent.
pub(crate) struct StateGraph<S> {
    callbacks: HashMap<S, StateCallbacks>,
    parents: HashMap<S, S>,
    entry_points: HashMap<S, S>,
}

impl<S> StateGraph<S>
where
    S: Clone + Eq + Hash + fmt::Debug,
{
    pub fn new() -> Self {
        Self {
            callbacks: HashMap::new(),
            parents: HashMap::new(),
            entry_points: HashMap::new(),
        }
    }

    /// Installs callbacks for a state. The last registration wins; a call
    /// with no callbacks at all is a no-op.
    pub fn register_state(
        &mut self,
        state: S,
        on_changed: Option<StateChangedCallback>,
        on_entering: Option<StateEnterCallback>,
        on_exiting: Option<StateExitCallback>,
    ) {
        if on_changed.is_none() && on_entering.is_none() && on_exiting.is_none() {
            return;
        }

        self.callbacks.insert(
            state,
            StateCallbacks {
                on_changed,
                on_entering,
                on_exiting,
            },
        );
    }

    /// Attaches `child` under `parent`, optionally as the parent's entry
    /// point.
    ///
    /// With the `safe-structure` feature (default) the full validation runs:
    /// a child may have only one parent, the relation must stay acyclic, a
    /// parent gets exactly one entry point, and the entry point must be
    /// registered before regular substates. Without the feature only the
    /// `parent != child` check remains and the caller is responsible for a
    /// well-formed tree.
    pub fn register_substate(
        &mut self,
        parent: &S,
        child: &S,
        is_entry_point: bool,
    ) -> Result<(), HsmError> {
        if parent == child {
            return Err(HsmError::SelfSubstate {
                state: format!("{:?}", parent),
            });
        }

        #[cfg(feature = "safe-structure")]
        {
            if let Some(existing) = self.parents.get(child) {
                return Err(HsmError::SubstateAlreadyAttached {
                    child: format!("{:?}", child),
                    parent: format!("{:?}", existing),
                });
            }

            // Walk up from the parent; finding the child among its ancestors
            // means the attachment would close a cycle.
            let mut probe = parent;
            while let Some(ancestor) = self.parents.get(probe) {
                if ancestor == child {
                    return Err(HsmError::SubstateCycle {
                        child: format!("{:?}", child),
                        parent: format!("{:?}", parent),
                    });
                }
                probe = ancestor;
            }

            match (is_entry_point, self.entry_points.get(parent)) {
                (false, None) => {
                    return Err(HsmError::MissingEntryPoint {
                        parent: format!("{:?}", parent),
                    });
                }
                (true, Some(entry_point)) => {
                    return Err(HsmError::DuplicateEntryPoint {
                        parent: format!("{:?}", parent),
                        entry_point: format!("{:?}", entry_point),
                    });
                }
                _ => {}
            }
        }

        if is_entry_point {
            self.entry_points.insert(parent.clone(), child.clone());
        }
        self.parents.insert(child.clone(), parent.clone());

        Ok(())
    }

    /// Returns the parent of `child`, if attached.
    pub fn parent(&self, child: &S) -> Option<S> {
        self.parents.get(child).cloned()
    }

    /// Returns the designated entry point of `parent`, if configured.
    pub fn entry_point(&self, parent: &S) -> Option<S> {
        self.entry_points.get(parent).cloned()
    }

    pub fn changed_callback(&self, state: &S) -> Option<StateChangedCallback> {
        self.callbacks
            .get(state)
            .and_then(|cb| cb.on_changed.clone())
    }

    pub fn enter_callback(&self, state: &S) -> Option<StateEnterCallback> {
        self.callbacks
            .get(state)
            .and_then(|cb| cb.on_entering.clone())
    }

    pub fn exit_callback(&self, state: &S) -> Option<StateExitCallback> {
        self.callbacks
            .get(state)
            .and_then(|cb| cb.on_exiting.clone())
    }
}
