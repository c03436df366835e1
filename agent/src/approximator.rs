use tch::Tensor;

/// Network weights keyed by variable name, sorted by name.
pub type Weights = Vec<(String, Tensor)>;

/// A trainable action-value function.
///
/// All tensors cross this trait on the CPU; implementations move them to
/// their own device and bring results back.
pub trait Approximator {
    /// Q-values for a batch of states, one row per state. No gradients flow
    /// out of this call.
    fn predict(&self, states: &Tensor) -> Tensor;
    /// One optimizer step pulling Q(s, a) towards `targets` for the given
    /// batch of states and actions. Returns the loss.
    fn fit(&mut self, states: &Tensor, actions: &Tensor, targets: &Tensor) -> f64;
    fn get_weights(&self) -> Weights;
    fn set_weights(&mut self, weights: &Weights);
}
