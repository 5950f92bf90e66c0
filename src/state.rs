//! Percepts and the discrete states the agent learns over
//!
//! A [`State`] is the intended direction of travel plus everything the car can see at its
//! current intersection. Encoding is pure, so two identical readings always produce equal
//! states and hit the same row of the Q-table.

use std::{fmt, str::FromStr};

use strum::{Display, EnumIter, EnumString, VariantArray};

use crate::{Error, Result};

/// An action a car can take at an intersection
///
/// The same set describes the planner's waypoint and what the traffic around the car intends
/// to do, with [`Action::None`] standing for "no waypoint" or "no car" respectively.
///
/// The declaration order is the fixed enumeration order used for tie-breaking.
#[derive(
    Display, EnumString, EnumIter, VariantArray, Clone, Copy, Debug, Default, Hash, PartialEq, Eq,
)]
#[strum(serialize_all = "lowercase")]
pub enum Action {
    #[default]
    None,
    Forward,
    Left,
    Right,
}

impl Action {
    /// Parse an action from its lowercase name, failing on anything outside the action set
    pub fn parse(s: &str) -> Result<Self> {
        Self::from_str(s).map_err(|_| Error::InvalidAction(s.to_owned()))
    }
}

/// Color of the traffic light facing the car
#[derive(Display, EnumString, EnumIter, VariantArray, Clone, Copy, Debug, Hash, PartialEq, Eq)]
#[strum(serialize_all = "lowercase")]
pub enum Light {
    Red,
    Green,
}

/// What the car senses at its current intersection
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
pub struct Percept {
    pub light: Light,
    pub oncoming: Action,
    pub left: Action,
    pub right: Action,
}

impl Percept {
    /// Build a percept from raw string fields, as a simulator front-end would report them
    ///
    /// Every one of `light`, `oncoming`, `left` and `right` must be present. Unknown keys are
    /// ignored, but an unknown value for a known key is an error.
    pub fn from_fields<'a, I>(fields: I) -> Result<Self>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut light = None;
        let mut oncoming = None;
        let mut left = None;
        let mut right = None;

        for (key, value) in fields {
            match key {
                "light" => light = Some(parse_field("light", value)?),
                "oncoming" => oncoming = Some(parse_field("oncoming", value)?),
                "left" => left = Some(parse_field("left", value)?),
                "right" => right = Some(parse_field("right", value)?),
                _ => {}
            }
        }

        Ok(Self {
            light: light.ok_or(Error::MissingPercept("light"))?,
            oncoming: oncoming.ok_or(Error::MissingPercept("oncoming"))?,
            left: left.ok_or(Error::MissingPercept("left"))?,
            right: right.ok_or(Error::MissingPercept("right"))?,
        })
    }
}

fn parse_field<T: FromStr>(field: &'static str, value: &str) -> Result<T> {
    T::from_str(value).map_err(|_| Error::InvalidPercept {
        field,
        value: value.to_owned(),
    })
}

impl fmt::Display for Percept {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{light: {}, oncoming: {}, left: {}, right: {}}}",
            self.light, self.oncoming, self.left, self.right
        )
    }
}

/// Discrete state key: `(next_waypoint, light, oncoming, left, right)`
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
pub struct State {
    pub waypoint: Action,
    pub light: Light,
    pub oncoming: Action,
    pub left: Action,
    pub right: Action,
}

impl State {
    /// Encode the planner's waypoint and the sensed percept into a state
    pub fn encode(waypoint: Action, percept: &Percept) -> Self {
        let &Percept {
            light,
            oncoming,
            left,
            right,
        } = percept;
        Self {
            waypoint,
            light,
            oncoming,
            left,
            right,
        }
    }

    /// The percept this state was encoded from
    pub fn percept(&self) -> Percept {
        Percept {
            light: self.light,
            oncoming: self.oncoming,
            left: self.left,
            right: self.right,
        }
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({}, {}, {}, {}, {})",
            self.waypoint, self.light, self.oncoming, self.left, self.right
        )
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn fields(light: &'static str) -> Vec<(&'static str, &'static str)> {
        vec![
            ("light", light),
            ("oncoming", "none"),
            ("left", "forward"),
            ("right", "none"),
        ]
    }

    #[test]
    fn action_order_is_fixed() {
        assert_eq!(
            Action::VARIANTS,
            [Action::None, Action::Forward, Action::Left, Action::Right]
        );
    }

    #[test]
    fn action_parse() {
        assert_eq!(Action::parse("forward"), Ok(Action::Forward));
        assert_eq!(Action::parse("none"), Ok(Action::None));
        assert_eq!(Action::Right.to_string(), "right");
        assert_eq!(
            Action::parse("reverse"),
            Err(Error::InvalidAction(String::from("reverse")))
        );
    }

    #[test]
    fn identical_percepts_encode_equal_states() {
        let a = Percept::from_fields(fields("green")).unwrap();
        let b = Percept::from_fields(fields("green")).unwrap();
        let s1 = State::encode(Action::Left, &a);
        let s2 = State::encode(Action::Left, &b);
        assert_eq!(s1, s2);

        let mut table = HashMap::new();
        table.insert(s1, 1.0);
        assert_eq!(table.get(&s2), Some(&1.0), "Equal states share a key");
    }

    #[test]
    fn encoding_distinguishes_features() {
        let green = Percept::from_fields(fields("green")).unwrap();
        let red = Percept::from_fields(fields("red")).unwrap();
        assert_ne!(
            State::encode(Action::Forward, &green),
            State::encode(Action::Forward, &red)
        );
        assert_ne!(
            State::encode(Action::Forward, &green),
            State::encode(Action::Right, &green)
        );
    }

    #[test]
    fn state_round_trips_percept() {
        let percept = Percept::from_fields(fields("red")).unwrap();
        assert_eq!(State::encode(Action::None, &percept).percept(), percept);
    }

    #[test]
    fn missing_percept_field_is_an_error() {
        let mut raw = fields("green");
        raw.retain(|(k, _)| *k != "oncoming");
        assert_eq!(
            Percept::from_fields(raw),
            Err(Error::MissingPercept("oncoming"))
        );
    }

    #[test]
    fn invalid_percept_value_is_an_error() {
        let mut raw = fields("amber");
        raw.push(("deadline", "12"));
        assert_eq!(
            Percept::from_fields(raw),
            Err(Error::InvalidPercept {
                field: "light",
                value: String::from("amber"),
            })
        );

        let raw = vec![
            ("light", "red"),
            ("oncoming", "u-turn"),
            ("left", "none"),
            ("right", "none"),
        ];
        assert!(matches!(
            Percept::from_fields(raw),
            Err(Error::InvalidPercept {
                field: "oncoming",
                ..
            })
        ));
    }

    #[test]
    fn percept_display() {
        let percept = Percept::from_fields(fields("green")).unwrap();
        assert_eq!(
            percept.to_string(),
            "{light: green, oncoming: none, left: forward, right: none}"
        );
    }
}
