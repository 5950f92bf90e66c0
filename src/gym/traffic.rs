use rand::{seq::SliceRandom, Rng};
use strum::{EnumIter, VariantArray};

use crate::state::{Action, Light, Percept};

/// Grid coordinates of an intersection, with `y` growing southwards
pub type Pos = (i32, i32);

/// Direction a car is travelling in
#[derive(EnumIter, VariantArray, Clone, Copy, Debug, Hash, PartialEq, Eq)]
pub enum Heading {
    East,
    North,
    West,
    South,
}

impl Heading {
    /// Unit step on the grid
    pub const fn delta(self) -> Pos {
        match self {
            Heading::East => (1, 0),
            Heading::North => (0, -1),
            Heading::West => (-1, 0),
            Heading::South => (0, 1),
        }
    }

    pub const fn turn_left(self) -> Self {
        match self {
            Heading::East => Heading::North,
            Heading::North => Heading::West,
            Heading::West => Heading::South,
            Heading::South => Heading::East,
        }
    }

    pub const fn turn_right(self) -> Self {
        match self {
            Heading::East => Heading::South,
            Heading::South => Heading::West,
            Heading::West => Heading::North,
            Heading::North => Heading::East,
        }
    }

    pub const fn opposite(self) -> Self {
        self.turn_left().turn_left()
    }

    /// Heading after taking `action`, `None` if the car does not move
    pub const fn after(self, action: Action) -> Option<Self> {
        match action {
            Action::None => None,
            Action::Forward => Some(self),
            Action::Left => Some(self.turn_left()),
            Action::Right => Some(self.turn_right()),
        }
    }

    const fn is_north_south(self) -> bool {
        matches!(self, Heading::North | Heading::South)
    }
}

/// A traffic light that alternates between north-south and east-west green
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrafficLight {
    north_south: bool,
    period: u32,
    last_updated: u32,
}

impl TrafficLight {
    const PERIODS: [u32; 3] = [3, 4, 5];

    /// A light with a random starting orientation and a random period of 3, 4 or 5 ticks
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self {
            north_south: rng.gen(),
            period: *Self::PERIODS
                .choose(rng)
                .expect("There is always at least one period"),
            last_updated: 0,
        }
    }

    pub fn new(north_south: bool, period: u32) -> Self {
        Self {
            north_south,
            period,
            last_updated: 0,
        }
    }

    pub fn reset(&mut self) {
        self.last_updated = 0;
    }

    /// Flip the light if a full period has passed since it last changed
    pub fn update(&mut self, t: u32) {
        if t.saturating_sub(self.last_updated) >= self.period {
            self.north_south = !self.north_south;
            self.last_updated = t;
        }
    }

    /// Color shown to a car travelling with `heading`
    pub fn light_for(&self, heading: Heading) -> Light {
        if self.north_south == heading.is_north_south() {
            Light::Green
        } else {
            Light::Red
        }
    }
}

/// Determine if `action` is allowed under the traffic rules given what the car senses
///
/// - `forward` needs a green light
/// - `left` needs a green light and no oncoming traffic other than another left turn
/// - `right` is always allowed on green, and on red unless traffic from the left goes forward
pub fn is_legal(action: Action, percept: &Percept) -> bool {
    let green = percept.light == Light::Green;
    match action {
        Action::None => true,
        Action::Forward => green,
        Action::Left => green && matches!(percept.oncoming, Action::None | Action::Left),
        Action::Right => green || percept.left != Action::Forward,
    }
}

#[cfg(test)]
mod tests {
    use rand::{rngs::StdRng, SeedableRng};

    use super::*;

    fn percept(light: Light, oncoming: Action, left: Action) -> Percept {
        Percept {
            light,
            oncoming,
            left,
            right: Action::None,
        }
    }

    #[test]
    fn heading_turns() {
        assert_eq!(Heading::East.turn_left(), Heading::North);
        assert_eq!(Heading::East.turn_right(), Heading::South);
        assert_eq!(Heading::North.opposite(), Heading::South);
        for &h in Heading::VARIANTS {
            assert_eq!(h.turn_left().turn_right(), h);
            let (dx, dy) = h.delta();
            let (ox, oy) = h.opposite().delta();
            assert_eq!((dx + ox, dy + oy), (0, 0));
        }
        assert_eq!(Heading::West.after(Action::None), None);
        assert_eq!(Heading::West.after(Action::Left), Some(Heading::South));
    }

    #[test]
    fn light_flips_after_period() {
        let mut light = TrafficLight::new(true, 3);
        assert_eq!(light.light_for(Heading::North), Light::Green);
        assert_eq!(light.light_for(Heading::East), Light::Red);

        light.update(1);
        light.update(2);
        assert_eq!(light.light_for(Heading::South), Light::Green);
        light.update(3);
        assert_eq!(light.light_for(Heading::South), Light::Red);
        assert_eq!(light.light_for(Heading::West), Light::Green);
        light.update(5);
        assert_eq!(light.light_for(Heading::West), Light::Green);
        light.update(6);
        assert_eq!(light.light_for(Heading::West), Light::Red);
    }

    #[test]
    fn random_light_has_valid_period() {
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..20 {
            let light = TrafficLight::random(&mut rng);
            assert!(TrafficLight::PERIODS.contains(&light.period));
        }
    }

    #[test]
    fn traffic_rules() {
        let green = percept(Light::Green, Action::None, Action::None);
        let red = percept(Light::Red, Action::None, Action::None);
        assert!(is_legal(Action::None, &red));
        assert!(is_legal(Action::Forward, &green));
        assert!(!is_legal(Action::Forward, &red));
        assert!(is_legal(Action::Left, &green));
        assert!(!is_legal(Action::Left, &red));
        assert!(is_legal(
            Action::Left,
            &percept(Light::Green, Action::Left, Action::None)
        ));
        assert!(!is_legal(
            Action::Left,
            &percept(Light::Green, Action::Forward, Action::None)
        ));
        assert!(is_legal(Action::Right, &red));
        assert!(!is_legal(
            Action::Right,
            &percept(Light::Red, Action::None, Action::Forward)
        ));
        assert!(is_legal(
            Action::Right,
            &percept(Light::Green, Action::None, Action::Forward)
        ));
    }
}
