use tch::Tensor;

/// A single environment transition as recorded by the driver.
pub struct Transition {
    pub observation: Tensor,
    pub action: i64,
    pub reward: f64,
    pub next_observation: Tensor,
    /// The step landed in a terminal state.
    pub absorbing: bool,
    /// The episode ended here, either terminal or cut at the horizon.
    pub last: bool,
}

/// Discounted return of every complete episode in the dataset. A trailing
/// partial episode is dropped; if no episode ran to completion the result
/// is a single zero.
pub fn compute_j(dataset: &[Transition], gamma: f64) -> Vec<f64> {
    let mut js: Vec<f64> = Vec::new();
    let mut j = 0.0;
    let mut discount = 1.0;
    for transition in dataset {
        j += discount * transition.reward;
        discount *= gamma;
        if transition.last {
            js.push(j);
            j = 0.0;
            discount = 1.0;
        }
    }
    if js.is_empty() {
        js.push(0.0);
    }
    js
}
