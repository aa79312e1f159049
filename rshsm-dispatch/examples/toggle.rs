//! Two-state toggle driven by the thread dispatcher.

use rshsm_core::{args, HierarchicalStateMachine, StateChangedCallback};
use rshsm_dispatch::ThreadDispatcher;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum SwitchState {
    Off,
    On,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum SwitchEvent {
    Toggle,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let machine = HierarchicalStateMachine::new(SwitchState::Off);

    for state in [SwitchState::Off, SwitchState::On] {
        let on_changed: StateChangedCallback = Arc::new(move |_| {
            tracing::info!("light is now {:?}", state);
        });
        machine.register_state(state, Some(on_changed), None, None);
    }

    machine.register_transition(
        SwitchState::Off,
        SwitchState::On,
        SwitchEvent::Toggle,
        None,
        None,
    );
    machine.register_transition(
        SwitchState::On,
        SwitchState::Off,
        SwitchEvent::Toggle,
        None,
        None,
    );

    machine.initialize(Arc::new(ThreadDispatcher::new()))?;

    for _ in 0..4 {
        let committed = machine.transition_sync(SwitchEvent::Toggle, 1000, args![]);
        tracing::info!(committed, state = ?machine.current_state(), "toggled");
    }

    machine.release();
    Ok(())
}
