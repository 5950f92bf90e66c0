//! A Q-learning agent that learns to drive a smartcab through a gridded city
//!
//! The agent senses the traffic light and adjacent traffic at its intersection, encodes them
//! together with the route planner's waypoint into a [`State`], and picks an action from a
//! table of learned values. The [`gym`] module, behind the `gym` feature, provides a complete
//! city to train in.

/// Implemented RL algorithms
pub mod algo;

/// Implementations of strategies for time-decaying hyperparameters
pub mod decay;

/// Environment
pub mod env;

mod error;

/// Exploration policies
pub mod exploration;

/// Experience transitions
pub mod memory;

/// Percepts and state encoding
pub mod state;

/// Testing environments
#[cfg(feature = "gym")]
pub mod gym;

mod util;

pub use error::{Error, Result};
pub use state::{Action, Light, Percept, State};
