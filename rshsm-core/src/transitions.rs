//! Transition table and hierarchical resolution.

use crate::states::StateGraph;
use crate::variant::VariantList;
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

/// Callback run between the exit and enter callbacks of a transition.
pub type TransitionAction = Arc<dyn Fn(&VariantList) + Send + Sync>;

/// Predicate over the event arguments; a transition row is only selected
/// when its guard is absent or returns true.
pub type TransitionGuard = Arc<dyn Fn(&VariantList) -> bool + Send + Sync>;

/// One registered transition row.
pub(crate) struct TransitionRecord<S> {
    pub to: S,
    pub action: Option<TransitionAction>,
    pub guard: Option<TransitionGuard>,
}

impl<S: Clone> Clone for TransitionRecord<S> {
    fn clone(&self) -> Self {
        Self {
            to: self.to.clone(),
            action: self.action.clone(),
            guard: self.guard.clone(),
        }
    }
}

/// Transition rows bucketed by `(from_state, event)`.
///
/// A bucket holds every row registered for its key, in registration order;
/// the first row whose guard passes wins.
pub(crate) struct TransitionTable<S, E> {
    rows: HashMap<(S, E), Vec<TransitionRecord<S>>>,
}

impl<S, E> TransitionTable<S, E>
where
    S: Clone + Eq + Hash + fmt::Debug,
    E: Clone + Eq + Hash + fmt::Debug,
{
    pub fn new() -> Self {
        Self {
            rows: HashMap::new(),
        }
    }

    pub fn register(
        &mut self,
        from: S,
        to: S,
        event: E,
        action: Option<TransitionAction>,
        guard: Option<TransitionGuard>,
    ) {
        self.rows
            .entry((from, event))
            .or_default()
            .push(TransitionRecord { to, action, guard });
    }

    /// Finds the transition a state inherits for an event.
    ///
    /// Starting at `from`, the rows keyed by the probe state and the event
    /// are tried in registration order; the first row whose guard is absent
    /// or passes on `args` is returned. When no row applies the search
    /// climbs to the probe's parent, so children inherit the transitions of
    /// their ancestors unless they override them.
    pub fn resolve(
        &self,
        graph: &StateGraph<S>,
        from: &S,
        event: &E,
        args: &VariantList,
    ) -> Option<TransitionRecord<S>> {
        let mut probe = from.clone();

        loop {
            if let Some(rows) = self.rows.get(&(probe.clone(), event.clone())) {
                for row in rows {
                    let applies = match &row.guard {
                        None => true,
                        Some(guard) => guard(args),
                    };
                    if applies {
                        return Some(row.clone());
                    }
                }
            }

            probe = graph.parent(&probe)?;
        }
    }
}
