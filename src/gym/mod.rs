mod planner;
mod smartcab;
mod traffic;

pub use planner::RoutePlanner;
pub use smartcab::{SmartcabWorld, WorldConfig};
pub use traffic::{is_legal, Heading, Pos, TrafficLight};
