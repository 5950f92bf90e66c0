use crate::state::Action;

use super::traffic::{Heading, Pos};

/// A greedy route planner that suggests the next waypoint toward a destination
///
/// The planner closes the east-west gap first and then the north-south gap. It ignores traffic
/// and wrap-around, and reverses direction by turning right.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoutePlanner {
    destination: Option<Pos>,
}

impl RoutePlanner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route_to(&mut self, destination: Pos) {
        self.destination = Some(destination);
    }

    pub fn destination(&self) -> Option<Pos> {
        self.destination
    }

    /// Suggest the next action for a car at `location` travelling with `heading`
    ///
    /// **Returns** [`Action::None`] at the destination or when no route is set
    pub fn next_waypoint(&self, location: Pos, heading: Heading) -> Action {
        let Some(destination) = self.destination else {
            return Action::None;
        };
        let (dx, dy) = (destination.0 - location.0, destination.1 - location.1);
        let (hx, hy) = heading.delta();

        if dx != 0 {
            if dx * hx > 0 {
                Action::Forward
            } else if dx * hx < 0 {
                Action::Right
            } else if dx * hy > 0 {
                Action::Left
            } else {
                Action::Right
            }
        } else if dy != 0 {
            if dy * hy > 0 {
                Action::Forward
            } else if dy * hy < 0 {
                Action::Right
            } else if dy * hx > 0 {
                Action::Right
            } else {
                Action::Left
            }
        } else {
            Action::None
        }
    }
}
