use tch::Tensor;

/// Static description of the decision process an environment exposes.
#[derive(Debug, Clone)]
pub struct MdpInfo {
    pub observation_shape: Vec<i64>,
    pub n_actions: i64,
    pub horizon: usize,
    pub gamma: f64,
}

/// The return value for a step.
#[derive(Debug)]
pub struct Step {
    pub observation: Tensor,
    pub reward: f64,
    pub absorbing: bool,
}

/// An environment with a discrete action space, driven by a [`Core`].
///
/// [`Core`]: crate::core::Core
pub trait Environment {
    fn info(&self) -> &MdpInfo;
    /// Starts a new episode, returning the initial observation.
    fn reset(&mut self) -> Tensor;
    fn step(&mut self, action: i64) -> Step;
    fn render(&mut self);
}
