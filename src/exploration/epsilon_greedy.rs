use rand::Rng;

use crate::{decay::Decay, Error, Result};

use super::Choice;

/// Epsilon greedy exploration policy with time-decaying epsilon threshold
///
/// The threshold is evaluated at the current trial index, so exploration tapers off as the
/// agent completes more trials.
#[derive(Debug, Clone)]
pub struct EpsilonGreedy<D: Decay> {
    epsilon: D,
}

impl<D: Decay> EpsilonGreedy<D> {
    /// Initialize epsilon greedy policy with a decay strategy
    pub fn new(decay: D) -> Self {
        Self { epsilon: decay }
    }

    /// Epsilon threshold for trial `t`
    pub fn epsilon(&self, t: u32) -> f32 {
        self.epsilon.evaluate(t as f32)
    }

    /// Check that the schedule stays inside `[0,1]` at the start of training
    pub(crate) fn validate(&self) -> Result<()> {
        let epsilon = self.epsilon(0);
        if (0.0..=1.0).contains(&epsilon) {
            Ok(())
        } else {
            Err(Error::OutOfInterval {
                name: "epsilon",
                value: epsilon,
                interval: String::from("[0, 1]"),
            })
        }
    }

    /// Invoke epsilon greedy policy for trial `t`
    pub fn choose<R: Rng + ?Sized>(&self, t: u32, rng: &mut R) -> Choice {
        if rng.gen::<f32>() < self.epsilon(t) {
            Choice::Explore
        } else {
            Choice::Exploit
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::{rngs::StdRng, SeedableRng};

    use super::*;
    use crate::decay;

    #[test]
    fn zero_epsilon_always_exploits() {
        let policy = EpsilonGreedy::new(decay::Constant::new(0.0));
        let mut rng = StdRng::seed_from_u64(7);
        assert!((0..1000).all(|t| policy.choose(t, &mut rng) == Choice::Exploit));
    }

    #[test]
    fn full_epsilon_always_explores() {
        let policy = EpsilonGreedy::new(decay::Constant::new(1.0));
        let mut rng = StdRng::seed_from_u64(7);
        assert!((0..1000).all(|t| policy.choose(t, &mut rng) == Choice::Explore));
    }

    #[test]
    fn decaying_epsilon_explores_less_over_time() {
        let policy = EpsilonGreedy::new(decay::Exponential::new(0.05, 1.0, 0.01).unwrap());
        assert_eq!(policy.epsilon(0), 1.0);
        assert!(policy.epsilon(100) < 0.02);
    }

    #[test]
    fn validate_rejects_epsilon_above_one() {
        let policy = EpsilonGreedy::new(decay::Constant::new(1.5));
        assert!(policy.validate().is_err());
        let policy = EpsilonGreedy::new(decay::Constant::new(0.1));
        assert!(policy.validate().is_ok());
    }
}
