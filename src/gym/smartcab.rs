use std::collections::HashMap;

use log::{debug, warn};
use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};
use strum::VariantArray;

use crate::{
    env::{Environment, Report},
    state::{Action, Percept},
    Error, Result,
};

use super::{
    planner::RoutePlanner,
    traffic::{is_legal, Heading, Pos, TrafficLight},
};

/// Index of the learning agent's car among the cars on the grid
const PRIMARY: usize = 0;

/// Configuration for the [`SmartcabWorld`]
#[derive(Debug, Clone, PartialEq)]
pub struct WorldConfig {
    /// Inclusive intersection bounds `(x_min, y_min, x_max, y_max)`
    ///
    /// **Default**: `(1, 1, 8, 6)`
    pub bounds: (i32, i32, i32, i32),
    /// Number of randomly driving cars sharing the roads with the agent
    ///
    /// **Default**: `3`
    pub num_dummies: usize,
    /// End the trial once the deadline reaches zero
    ///
    /// **Default**: `true`
    pub enforce_deadline: bool,
    /// The deadline is the Manhattan distance to the destination times this factor
    ///
    /// **Default**: `5`
    pub deadline_factor: i32,
    /// Minimum Manhattan distance between start and destination
    ///
    /// **Default**: `4`
    pub min_distance: i32,
    /// Deadline at which a trial ends even when the deadline is not enforced
    ///
    /// **Default**: `-100`
    pub hard_time_limit: i32,
    /// Seed for traffic, lights and trip selection, or `None` to seed from entropy
    ///
    /// **Default**: `None`
    pub seed: Option<u64>,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            bounds: (1, 1, 8, 6),
            num_dummies: 3,
            enforce_deadline: true,
            deadline_factor: 5,
            min_distance: 4,
            hard_time_limit: -100,
            seed: None,
        }
    }
}

impl WorldConfig {
    /// Widest and tallest grid, in intersections
    pub const MAX_SIDE: i32 = 1024;

    fn validate(&self) -> Result<()> {
        let (x0, y0, x1, y1) = self.bounds;
        if x0 > x1 || y0 > y1 {
            return Err(Error::InvalidWorld(format!(
                "bounds {:?} are empty",
                self.bounds
            )));
        }
        let span = |lo: i32, hi: i32| hi.checked_sub(lo).filter(|&d| d < Self::MAX_SIDE);
        let (Some(width), Some(height)) = (span(x0, x1), span(y0, y1)) else {
            return Err(Error::InvalidWorld(format!(
                "bounds {:?} exceed {} intersections per side",
                self.bounds,
                Self::MAX_SIDE
            )));
        };
        if self.min_distance < 1 || width + height < self.min_distance {
            return Err(Error::InvalidWorld(format!(
                "no two intersections within {:?} are {} apart",
                self.bounds, self.min_distance
            )));
        }
        if self.deadline_factor < 1 {
            return Err(Error::InvalidWorld(String::from(
                "`deadline_factor` must be at least 1",
            )));
        }
        if (width + height).checked_mul(self.deadline_factor).is_none() {
            return Err(Error::InvalidWorld(format!(
                "`deadline_factor` {} overflows the deadline",
                self.deadline_factor
            )));
        }
        if self.hard_time_limit > 0 || self.hard_time_limit == i32::MIN {
            return Err(Error::InvalidWorld(String::from(
                "`hard_time_limit` must be in (i32::MIN, 0]",
            )));
        }
        Ok(())
    }
}

/// A car on the grid
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Car {
    location: Pos,
    heading: Heading,
    /// What the car intends to do next, as seen by other cars
    waypoint: Action,
}

/// A gridded city where a smartcab must reach its destination before a deadline
///
/// Every intersection has a [`TrafficLight`], and a number of dummy cars drive around at
/// random while obeying the traffic rules. The learning agent controls the primary car:
///
/// - `none` earns 0
/// - an illegal move earns -1 and the car stays put
/// - a legal move earns 2 if it follows the planner's waypoint and -0.5 otherwise
/// - arriving at the destination on time earns a bonus of 10
///
/// Cars leaving the grid wrap around to the opposite edge.
pub struct SmartcabWorld {
    config: WorldConfig,
    rng: StdRng,
    lights: HashMap<Pos, TrafficLight>,
    cars: Vec<Car>,
    planner: RoutePlanner,
    deadline: i32,
    t: u32,
    done: bool,
    reached: bool,
    pub report: Report,
}

impl SmartcabWorld {
    /// Build a world from a configuration
    ///
    /// No trial is running until [`reset`](Environment::reset) is called.
    pub fn new(config: WorldConfig) -> Result<Self> {
        config.validate()?;
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let (x0, y0, x1, y1) = config.bounds;
        let lights = (x0..=x1)
            .flat_map(|x| (y0..=y1).map(move |y| (x, y)))
            .map(|pos| (pos, TrafficLight::random(&mut rng)))
            .collect();

        let mut world = Self {
            rng,
            lights,
            cars: Vec::with_capacity(config.num_dummies + 1),
            planner: RoutePlanner::new(),
            deadline: 0,
            t: 0,
            done: true,
            reached: false,
            report: Report::new(vec!["steps", "reward", "penalties", "success"]),
            config,
        };
        for _ in 0..=world.config.num_dummies {
            let car = world.random_car();
            world.cars.push(car);
        }
        Ok(world)
    }

    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    /// Location of the agent's car
    pub fn location(&self) -> Pos {
        self.cars[PRIMARY].location
    }

    /// Heading of the agent's car
    pub fn heading(&self) -> Heading {
        self.cars[PRIMARY].heading
    }

    pub fn destination(&self) -> Option<Pos> {
        self.planner.destination()
    }

    /// Number of ticks since the trial started
    pub fn time(&self) -> u32 {
        self.t
    }

    fn intersections(&self) -> Vec<Pos> {
        let (x0, y0, x1, y1) = self.config.bounds;
        (x0..=x1)
            .flat_map(|x| (y0..=y1).map(move |y| (x, y)))
            .collect()
    }

    fn random_location(&mut self) -> Pos {
        *self
            .intersections()
            .choose(&mut self.rng)
            .expect("bounds are not empty")
    }

    fn random_heading(&mut self) -> Heading {
        *Heading::VARIANTS
            .choose(&mut self.rng)
            .expect("There is always at least one heading")
    }

    fn random_waypoint(&mut self) -> Action {
        *[Action::Forward, Action::Left, Action::Right]
            .choose(&mut self.rng)
            .expect("There is always at least one waypoint")
    }

    fn random_car(&mut self) -> Car {
        Car {
            location: self.random_location(),
            heading: self.random_heading(),
            waypoint: self.random_waypoint(),
        }
    }

    /// Move one grid step from `location`, wrapping around the edges
    fn advance(&self, location: Pos, heading: Heading) -> Pos {
        let (x0, y0, x1, y1) = self.config.bounds;
        let (dx, dy) = heading.delta();
        (
            (location.0 + dx - x0).rem_euclid(x1 - x0 + 1) + x0,
            (location.1 + dy - y0).rem_euclid(y1 - y0 + 1) + y0,
        )
    }

    /// What the car at index `i` senses at its intersection
    fn sense_for(&self, i: usize) -> Percept {
        let car = &self.cars[i];
        let light = self
            .lights
            .get(&car.location)
            .expect("every location has a traffic light")
            .light_for(car.heading);

        let mut percept = Percept {
            light,
            oncoming: Action::None,
            left: Action::None,
            right: Action::None,
        };
        for (j, other) in self.cars.iter().enumerate() {
            if j == i || other.location != car.location || other.heading == car.heading {
                continue;
            }
            if other.heading == car.heading.opposite() {
                if percept.oncoming != Action::Left {
                    percept.oncoming = other.waypoint;
                }
            } else if other.heading == car.heading.turn_left() {
                if !matches!(percept.right, Action::Forward | Action::Left) {
                    percept.right = other.waypoint;
                }
            } else if percept.left != Action::Forward {
                percept.left = other.waypoint;
            }
        }
        percept
    }

    /// Move the car at index `i` if `action` is legal
    ///
    /// **Returns** whether the action was legal
    fn drive(&mut self, i: usize, action: Action) -> bool {
        let percept = self.sense_for(i);
        if !is_legal(action, &percept) {
            return false;
        }
        let car = self.cars[i];
        if let Some(heading) = car.heading.after(action) {
            let location = self.advance(car.location, heading);
            self.cars[i].heading = heading;
            self.cars[i].location = location;
        }
        true
    }

    /// Each dummy follows its random waypoint if legal, then picks a new one
    fn move_dummies(&mut self) {
        for i in (PRIMARY + 1)..self.cars.len() {
            let waypoint = self.cars[i].waypoint;
            if self.drive(i, waypoint) {
                self.cars[i].waypoint = self.random_waypoint();
            }
        }
    }

    fn sync_primary_waypoint(&mut self) {
        let Car {
            location, heading, ..
        } = self.cars[PRIMARY];
        self.cars[PRIMARY].waypoint = self.planner.next_waypoint(location, heading);
    }
}

impl Environment for SmartcabWorld {
    fn reset(&mut self) {
        let start = self.random_location();
        let mut destination = self.random_location();
        while manhattan(start, destination) < self.config.min_distance {
            destination = self.random_location();
        }

        for light in self.lights.values_mut() {
            light.reset();
        }
        for i in 0..self.cars.len() {
            self.cars[i] = self.random_car();
        }
        self.cars[PRIMARY].location = start;
        self.planner.route_to(destination);
        self.sync_primary_waypoint();

        self.deadline = manhattan(start, destination) * self.config.deadline_factor;
        self.t = 0;
        self.done = false;
        self.reached = false;

        debug!(
            "new trip from {:?} to {:?}, deadline = {}",
            start, destination, self.deadline
        );
    }

    fn sense(&self) -> Percept {
        self.sense_for(PRIMARY)
    }

    fn deadline(&self) -> i32 {
        self.deadline
    }

    fn next_waypoint(&self) -> Action {
        let car = &self.cars[PRIMARY];
        self.planner.next_waypoint(car.location, car.heading)
    }

    fn act(&mut self, action: Action) -> f32 {
        if self.done {
            warn!("action {} ignored, the trial has already ended", action);
            return 0.0;
        }

        let waypoint = self.next_waypoint();
        let mut reward = match action {
            Action::None => 0.0,
            _ if !self.drive(PRIMARY, action) => -1.0,
            _ if action == waypoint => 2.0,
            _ => -0.5,
        };
        self.sync_primary_waypoint();

        if Some(self.location()) == self.planner.destination() {
            if self.deadline >= 0 {
                reward += 10.0;
            }
            self.done = true;
            self.reached = true;
            debug!("reached destination with deadline = {}", self.deadline);
        } else if self.config.enforce_deadline && self.deadline <= 0 {
            self.done = true;
            debug!("could not reach destination within deadline");
        } else if self.deadline <= self.config.hard_time_limit {
            self.done = true;
            debug!("hard time limit reached");
        }

        self.move_dummies();
        self.t = self.t.saturating_add(1);
        let t = self.t;
        for light in self.lights.values_mut() {
            light.update(t);
        }
        self.deadline = self.deadline.saturating_sub(1);

        *self.report.entry("steps") += 1.0;
        *self.report.entry("reward") += reward;
        if reward < 0.0 {
            *self.report.entry("penalties") += 1.0;
        }
        if self.reached {
            *self.report.entry("success") = 1.0;
        }

        reward
    }

    fn is_active(&self) -> bool {
        !self.done
    }

    fn at_destination(&self) -> bool {
        self.reached
    }
}

fn manhattan(a: Pos, b: Pos) -> i32 {
    (a.0 - b.0).abs() + (a.1 - b.1).abs()
}
