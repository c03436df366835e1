use rand::Rng;
use tch::Tensor;

/// A constant-valued hyperparameter.
#[derive(Debug, Clone, Copy)]
pub struct Parameter {
    value: f64,
}

impl Parameter {
    pub fn new(value: f64) -> Self {
        Parameter { value }
    }

    pub fn get_value(&self) -> f64 {
        self.value
    }
}

/// Epsilon-greedy selection over a vector of action values.
pub struct EpsGreedy {
    epsilon: Parameter,
}

impl EpsGreedy {
    pub fn new(epsilon: Parameter) -> Self {
        EpsGreedy { epsilon }
    }

    /// Draws a uniformly random action with probability epsilon, the argmax
    /// of `q_values` otherwise. `q_values` holds one value per action.
    pub fn draw_action(&self, q_values: &Tensor) -> i64 {
        let mut rng = rand::thread_rng();
        let rand: f64 = rng.gen_range(0.0..1.0);
        if rand < self.epsilon.get_value() {
            rng.gen_range(0..q_values.size()[0])
        } else {
            q_values.max_dim(0, false).1.int64_value(&[])
        }
    }
}
