use std::{collections::HashMap, ops::Index};

use crate::state::{Action, Percept};

/// The world a smartcab drives in, as seen by a learning agent
///
/// A trial starts with [`reset`](Environment::reset) and lasts while
/// [`is_active`](Environment::is_active) holds. On every tick the agent senses its
/// intersection, asks the route planner for a waypoint, and commits to one action.
pub trait Environment {
    /// Start a new trial: pick a start and a destination and plan a route between them
    fn reset(&mut self);

    /// Traffic light and adjacent traffic at the agent's intersection
    fn sense(&self) -> Percept;

    /// Steps remaining before the deadline, possibly negative when it is not enforced
    fn deadline(&self) -> i32;

    /// The route planner's suggestion toward the destination, [`Action::None`] when there
    fn next_waypoint(&self) -> Action;

    /// Apply an action for the agent and advance the world by one tick
    ///
    /// **Returns** the scalar reward for the action
    fn act(&mut self, action: Action) -> f32;

    /// Determine if the trial is still running
    fn is_active(&self) -> bool;

    /// Determine if the agent has reached its destination
    fn at_destination(&self) -> bool;
}

/// Named per-trial statistics an environment accumulates for plotting or logging
#[derive(Debug, Clone)]
pub struct Report {
    keys: Vec<&'static str>,
    values: HashMap<&'static str, f32>,
}

impl Report {
    /// Initialize a report with every key set to zero
    pub fn new(keys: Vec<&'static str>) -> Self {
        let values = keys.iter().map(|&k| (k, 0.0)).collect();
        Self { keys, values }
    }

    /// Keys in the order they were registered
    pub fn keys(&self) -> &[&'static str] {
        &self.keys
    }

    /// Mutable access to a registered key's value
    ///
    /// **Panics** if `key` was not registered
    pub fn entry(&mut self, key: &'static str) -> &mut f32 {
        self.values
            .get_mut(key)
            .unwrap_or_else(|| panic!("Report has no key `{key}`"))
    }

    /// Take the current values in key order, resetting every value to zero
    pub fn take(&mut self) -> Vec<(&'static str, f32)> {
        let values = &mut self.values;
        self.keys
            .iter()
            .map(|&k| (k, values.get_mut(k).map(std::mem::take).unwrap_or_default()))
            .collect()
    }
}

impl Index<&str> for Report {
    type Output = f32;

    fn index(&self, key: &str) -> &Self::Output {
        &self.values[key]
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::collections::VecDeque;

    use super::*;
    use crate::state::Light;

    /// A scripted environment: each tick pops the next percept and waypoint, and every action
    /// is rewarded from a fixed table
    pub struct MockEnv {
        script: Vec<(Action, Percept)>,
        remaining: VecDeque<(Action, Percept)>,
        pub taken: Vec<Action>,
        pub resets: u32,
        rewards: fn(Action, Action) -> f32,
    }

    impl MockEnv {
        pub fn new(script: Vec<(Action, Percept)>, rewards: fn(Action, Action) -> f32) -> Self {
            Self {
                remaining: script.clone().into(),
                script,
                taken: Vec::new(),
                resets: 0,
                rewards,
            }
        }

        /// Rewards following the waypoint and penalizes everything else
        pub fn follow_waypoint(waypoint: Action, action: Action) -> f32 {
            if action == waypoint {
                2.0
            } else {
                -0.5
            }
        }

        pub fn green() -> Percept {
            Percept {
                light: Light::Green,
                oncoming: Action::None,
                left: Action::None,
                right: Action::None,
            }
        }
    }

    impl Environment for MockEnv {
        fn reset(&mut self) {
            self.resets += 1;
            self.remaining = self.script.clone().into();
        }

        fn sense(&self) -> Percept {
            self.remaining.front().expect("trial is active").1
        }

        fn deadline(&self) -> i32 {
            self.remaining.len() as i32
        }

        fn next_waypoint(&self) -> Action {
            self.remaining.front().expect("trial is active").0
        }

        fn act(&mut self, action: Action) -> f32 {
            let (waypoint, _) = self.remaining.pop_front().expect("trial is active");
            self.taken.push(action);
            (self.rewards)(waypoint, action)
        }

        fn is_active(&self) -> bool {
            !self.remaining.is_empty()
        }

        fn at_destination(&self) -> bool {
            !self.is_active()
        }
    }

    #[test]
    fn report_functional() {
        let mut report = Report::new(vec!["steps", "reward"]);
        *report.entry("steps") += 1.0;
        *report.entry("reward") -= 0.5;
        assert_eq!(report.keys(), ["steps", "reward"]);
        assert_eq!(report["steps"], 1.0);

        let taken = report.take();
        assert_eq!(taken, vec![("steps", 1.0), ("reward", -0.5)]);
        assert_eq!(report["reward"], 0.0, "Take resets values");
    }

    #[test]
    fn mock_env_replays_script() {
        let script = vec![
            (Action::Forward, MockEnv::green()),
            (Action::Left, MockEnv::green()),
        ];
        let mut env = MockEnv::new(script, MockEnv::follow_waypoint);
        env.reset();
        assert_eq!(env.deadline(), 2);
        assert_eq!(env.act(Action::Forward), 2.0);
        assert_eq!(env.act(Action::Forward), -0.5);
        assert!(!env.is_active());
        env.reset();
        assert!(env.is_active());
        assert_eq!(env.taken, [Action::Forward, Action::Forward]);
    }
}
