use crate::state::{Action, State};

/// Represents a single experience or transition in the environment
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Exp {
    /// The state of the environment before taking the action
    pub state: State,
    /// The action taken in the given state
    pub action: Action,
    /// The state of the environment after the action is taken, or if terminal, `None`
    pub next_state: Option<State>,
    /// The reward received after taking the action
    pub reward: f32,
}
