use crate::libs::error::InputError;

/// Symmetric substitution model over the successors of a block end.
///
/// With `n` blocks a block end has `2n - 1` possible neighbours; every change of
/// neighbour happens at the same rate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransitionModel {
    n: f64,
}

impl TransitionModel {
    pub fn new(blocks: usize) -> Result<Self, InputError> {
        if blocks == 0 {
            return Err(InputError::Consistency(
                "transition model needs at least one block".to_string(),
            ));
        }
        Ok(Self { n: blocks as f64 })
    }

    /// Probability of keeping (`same`) or changing the neighbour along a branch of
    /// scaled length `t`.
    ///
    /// ```
    /// use deschrambler::libs::likelihood::TransitionModel;
    ///
    /// let model = TransitionModel::new(3).unwrap();
    /// assert_eq!(model.prob(0.0, true), 1.0);
    /// assert_eq!(model.prob(0.0, false), 0.0);
    /// assert!((model.prob(1e9, true) - 0.2).abs() < 1e-12);
    /// ```
    pub fn prob(&self, t: f64, same: bool) -> f64 {
        let k = 2.0 * self.n - 1.0;
        // exp underflows to 0 for long branches, leaving the stationary 1/k
        let decay = (-k * t).exp();
        let p = if same {
            1.0 / k + (k - 1.0) / k * decay
        } else {
            1.0 / k - decay / k
        };
        p.clamp(0.0, 1.0)
    }
}
