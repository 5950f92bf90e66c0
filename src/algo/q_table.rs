use std::collections::HashMap;

use log::{debug, info, warn};
use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};
use strum::VariantArray;

use crate::{
    decay::{self, Decay},
    ensure_half_open, ensure_interval,
    env::Environment,
    exploration::{Choice, EpsilonGreedy},
    memory::Exp,
    state::{Action, State},
    Error, Result,
};

/// Estimated action values, keyed by state-action pair
pub type QTable = HashMap<(State, Action), f32>;

/// Configuration for the [`QTableAgent`]
#[derive(Debug, Clone)]
pub struct QTableAgentConfig<D: Decay> {
    /// Epsilon greedy policy, evaluated at the index of the current trial
    ///
    /// **Default**: [`Exponential`](decay::Exponential) decay from `1.0` to `0.01` at rate `0.05`
    pub exploration: EpsilonGreedy<D>,
    /// Learning rate, in `[0,1]`
    ///
    /// **Default**: `0.2`
    pub alpha: f32,
    /// Discount factor, in `[0,1)`
    ///
    /// **Default**: `0.9`
    pub gamma: f32,
    /// Value given to a state-action pair the first time its state is seen
    ///
    /// **Default**: `1.0`, an optimistic start that pushes the agent to try every action once
    pub initial_value: f32,
    /// Seed for the exploration RNG, or `None` to seed from entropy
    ///
    /// **Default**: `None`
    pub seed: Option<u64>,
}

impl<D: Decay> QTableAgentConfig<D> {
    /// Default learning parameters with a custom exploration policy
    pub fn with_exploration(exploration: EpsilonGreedy<D>) -> Self {
        Self {
            exploration,
            alpha: 0.2,
            gamma: 0.9,
            initial_value: 1.0,
            seed: None,
        }
    }
}

impl Default for QTableAgentConfig<decay::Exponential> {
    fn default() -> Self {
        Self::with_exploration(EpsilonGreedy::new(
            decay::Exponential::new(0.05, 1.0, 0.01).expect("valid decay parameters"),
        ))
    }
}

/// Summary of a single trial run by [`QTableAgent::go`]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Trial {
    /// Number of actions taken
    pub steps: u32,
    /// Sum of all rewards received
    pub total_reward: f32,
    /// Number of actions that were penalized
    pub penalties: u32,
    /// Whether the destination was reached before the trial ended
    pub reached: bool,
}

/// A Q-learning agent that learns to drive from a table of state-action values
///
/// The table is owned by the agent and persists across trials, so learning accumulates over
/// every call to [`go`](Self::go). Entries are created lazily: the first time a state is seen,
/// every action in it receives the configured initial value.
///
/// Actions are chosen epsilon greedily. On exploit steps the agent takes the action with the
/// highest value, with ties going to the first action in [`Action::VARIANTS`] order.
pub struct QTableAgent<D: Decay = decay::Exponential> {
    q_table: QTable,
    exploration: EpsilonGreedy<D>,
    alpha: f32,
    gamma: f32,
    initial_value: f32,
    rng: StdRng,
    trial: u32,
}

impl<D: Decay> QTableAgent<D> {
    /// Initialize a new `QTableAgent` from a configuration
    ///
    /// **Errors** if `alpha` is not in `[0,1]`, `gamma` is not in `[0,1)`, `initial_value` is not
    /// finite, or the exploration schedule starts outside `[0,1]`
    pub fn new(config: QTableAgentConfig<D>) -> Result<Self> {
        let QTableAgentConfig {
            exploration,
            alpha,
            gamma,
            initial_value,
            seed,
        } = config;

        ensure_interval!(alpha, 0.0, 1.0);
        ensure_half_open!(gamma, 0.0, 1.0);
        if !initial_value.is_finite() {
            return Err(Error::OutOfInterval {
                name: "initial_value",
                value: initial_value,
                interval: String::from("(-inf, inf)"),
            });
        }
        exploration.validate()?;

        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Ok(Self {
            q_table: HashMap::new(),
            exploration,
            alpha,
            gamma,
            initial_value,
            rng,
            trial: 0,
        })
    }

    pub fn q_table(&self) -> &QTable {
        &self.q_table
    }

    /// Current estimate for a state-action pair, if its state has been seen
    pub fn value(&self, state: &State, action: Action) -> Option<f32> {
        self.q_table.get(&(*state, action)).copied()
    }

    /// Number of state-action entries in the table
    pub fn len(&self) -> usize {
        self.q_table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.q_table.is_empty()
    }

    /// Number of completed trials
    pub fn trials(&self) -> u32 {
        self.trial
    }

    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    pub fn gamma(&self) -> f32 {
        self.gamma
    }

    pub fn initial_value(&self) -> f32 {
        self.initial_value
    }

    /// Exploration threshold for the current trial
    pub fn epsilon(&self) -> f32 {
        self.exploration.epsilon(self.trial)
    }

    /// Greedy action for a state without touching the table
    ///
    /// **Returns** `None` unless every action in `state` has an entry
    pub fn policy(&self, state: &State) -> Option<Action> {
        best(
            Action::VARIANTS
                .iter()
                .map(|&a| self.value(state, a).map(|v| (a, v))),
        )
        .map(|(a, _)| a)
    }
}

impl<D: Decay> QTableAgent<D> {
    /// Give every action in `state` its initial value, leaving existing entries untouched
    fn init_state(&mut self, state: State) {
        for &action in Action::VARIANTS {
            self.q_table
                .entry((state, action))
                .or_insert(self.initial_value);
        }
    }

    /// Choose the action with the highest value in `state`
    ///
    /// Ties go to the first action in enumeration order. Entries for `state` are initialized
    /// first if it has not been seen before.
    ///
    /// **Returns** `(best_action, best_value)`
    pub fn select_action(&mut self, state: State) -> (Action, f32) {
        self.init_state(state);
        best(
            Action::VARIANTS
                .iter()
                .map(|&a| self.q_table.get(&(state, a)).map(|&v| (a, v))),
        )
        .expect("state was just initialized")
    }

    /// Choose an action based on the current state and exploration policy
    pub fn act(&mut self, state: State) -> Action {
        match self.exploration.choose(self.trial, &mut self.rng) {
            Choice::Explore => {
                self.init_state(state);
                *Action::VARIANTS
                    .choose(&mut self.rng)
                    .expect("There is always at least one action available")
            }
            Choice::Exploit => self.select_action(state).0,
        }
    }

    /// Apply the one-step Q-learning update for taking `action` in `state`
    ///
    /// Q(s,a) ← (1 - α) Q(s,a) + α (r + γ max<sub>a'</sub> Q(s',a'))
    ///
    /// A missing `(state, action)` entry and any missing `next_state` entries are initialized
    /// first. A `next_state` of `None` marks the end of a trial, and the bootstrap term is then
    /// zero.
    ///
    /// **Errors** if `reward` is not finite, in which case the table is left unchanged
    pub fn update(
        &mut self,
        state: State,
        action: Action,
        reward: f32,
        next_state: Option<State>,
    ) -> Result<()> {
        if !reward.is_finite() {
            return Err(Error::NonFiniteReward(reward));
        }

        let max_next_q = match next_state {
            Some(next) => self.select_action(next).1,
            None => 0.0,
        };
        let q_value = *self
            .q_table
            .entry((state, action))
            .or_insert(self.initial_value);
        let new_q_value = reward + self.gamma * max_next_q;
        let weighted_q_value = (1.0 - self.alpha) * q_value + self.alpha * new_q_value;

        self.q_table.insert((state, action), weighted_q_value);
        Ok(())
    }

    /// Learn from a single experience
    pub fn learn(&mut self, experience: Exp) -> Result<()> {
        let Exp {
            state,
            action,
            next_state,
            reward,
        } = experience;
        self.update(state, action, reward, next_state)
    }

    /// Run one full trial in the given environment, learning after every step
    pub fn go<E: Environment>(&mut self, env: &mut E) -> Result<Trial> {
        env.reset();
        let mut trial = Trial::default();

        let mut next_state = env.is_active().then(|| sense(env));
        while let Some(state) = next_state {
            let deadline = env.deadline();
            let action = self.act(state);
            let reward = env.act(action);
            next_state = env.is_active().then(|| sense(env));

            debug!(
                "deadline = {}, inputs = {}, waypoint = {}, action = {}, reward = {}",
                deadline,
                state.percept(),
                state.waypoint,
                action,
                reward
            );

            self.learn(Exp {
                state,
                action,
                next_state,
                reward,
            })?;

            trial.steps += 1;
            trial.total_reward += reward;
            if reward < 0.0 {
                trial.penalties += 1;
            }
        }

        trial.reached = env.at_destination();
        if !trial.reached {
            warn!("trial {} ended before reaching the destination", self.trial);
        }
        info!(
            "trial {} finished: reached = {}, steps = {}, reward = {:.2}, penalties = {}",
            self.trial, trial.reached, trial.steps, trial.total_reward, trial.penalties
        );

        self.trial += 1;
        Ok(trial)
    }
}

/// Encode the agent's current state from the environment
fn sense<E: Environment>(env: &E) -> State {
    State::encode(env.next_waypoint(), &env.sense())
}

/// First `(action, value)` pair with the highest value, or `None` if any entry is missing
fn best(values: impl Iterator<Item = Option<(Action, f32)>>) -> Option<(Action, f32)> {
    let mut best: Option<(Action, f32)> = None;
    for entry in values {
        let (action, value) = entry?;
        if best.map_or(true, |(_, b)| value > b) {
            best = Some((action, value));
        }
    }
    best
}
