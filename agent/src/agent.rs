use tch::Tensor;

use crate::dataset::Transition;

pub trait Agent {
    fn draw_action(&self, observation: &Tensor) -> i64;
    /// Consumes a batch of transitions. Returns the training loss,
    /// 0.0 while the agent is still warming up.
    fn fit(&mut self, transitions: &[Transition]) -> f64;
}
