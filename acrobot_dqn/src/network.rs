use agent::{Approximator, Weights};
use tch::{nn, nn::ModuleT, nn::OptimizerConfig, Device, Tensor};

const RELU_GAIN: f64 = std::f64::consts::SQRT_2;
const LINEAR_GAIN: f64 = 1.0;

/// Xavier-uniform initialization bounds for the given fan and gain.
fn xavier_uniform(fan_in: i64, fan_out: i64, gain: f64) -> nn::Init {
    let bound = gain * (6.0 / (fan_in + fan_out) as f64).sqrt();
    nn::Init::Uniform {
        lo: -bound,
        up: bound,
    }
}

fn linear_config(fan_in: i64, fan_out: i64, gain: f64) -> nn::LinearConfig {
    nn::LinearConfig {
        ws_init: xavier_uniform(fan_in, fan_out, gain),
        ..Default::default()
    }
}

#[derive(Debug)]
pub struct Network {
    h1: nn::Linear,
    h2: nn::Linear,
    h3: nn::Linear,
}

impl Network {
    pub fn new(vs: &nn::Path, input_dims: i64, output_dims: i64, n_features: i64) -> Network {
        Network {
            h1: nn::linear(
                vs / "h1",
                input_dims,
                n_features,
                linear_config(input_dims, n_features, RELU_GAIN),
            ),
            h2: nn::linear(
                vs / "h2",
                n_features,
                n_features,
                linear_config(n_features, n_features, RELU_GAIN),
            ),
            h3: nn::linear(
                vs / "h3",
                n_features,
                output_dims,
                linear_config(n_features, output_dims, LINEAR_GAIN),
            ),
        }
    }
}

impl nn::ModuleT for Network {
    fn forward_t(&self, xs: &Tensor, _train: bool) -> Tensor {
        xs.apply(&self.h1)
            .relu()
            .apply(&self.h2)
            .relu()
            .apply(&self.h3)
    }
}

/// The Q-network together with its Adam optimizer, exposed to the agent
/// through the `Approximator` adapter surface.
pub struct QApproximator {
    vs: nn::VarStore,
    network: Network,
    optimizer: nn::Optimizer,
    device: Device,
}

impl QApproximator {
    pub fn new(
        input_dims: i64,
        output_dims: i64,
        n_features: i64,
        learning_rate: f64,
    ) -> QApproximator {
        let device = Device::cuda_if_available();
        let vs = nn::VarStore::new(device);
        let network = Network::new(&vs.root(), input_dims, output_dims, n_features);
        let optimizer = nn::Adam::default().build(&vs, learning_rate).unwrap();
        QApproximator {
            vs,
            network,
            optimizer,
            device,
        }
    }
}

impl Approximator for QApproximator {
    fn predict(&self, states: &Tensor) -> Tensor {
        tch::no_grad(|| {
            self.network
                .forward_t(&states.to_device(self.device), false)
                .to_device(Device::Cpu)
        })
    }

    fn fit(&mut self, states: &Tensor, actions: &Tensor, targets: &Tensor) -> f64 {
        let q = self.network.forward_t(&states.to_device(self.device), true);
        let q_acted = q
            .gather(1, &actions.to_device(self.device).unsqueeze(-1), false)
            .squeeze();
        let loss = q_acted.smooth_l1_loss(
            &targets.to_device(self.device),
            tch::Reduction::Mean,
            1.0,
        );
        let loss_scalar = loss.double_value(&[]);
        self.optimizer.backward_step(&loss);
        loss_scalar
    }

    fn get_weights(&self) -> Weights {
        let mut weights: Weights = self
            .vs
            .variables()
            .into_iter()
            .map(|(name, tensor)| (name, tensor.detach().copy().to_device(Device::Cpu)))
            .collect();
        weights.sort_by(|a, b| a.0.cmp(&b.0));
        weights
    }

    fn set_weights(&mut self, weights: &Weights) {
        let mut variables = self.vs.variables();
        tch::no_grad(|| {
            for (name, weight) in weights {
                if let Some(variable) = variables.get_mut(name) {
                    variable.copy_(&weight.to_device(self.device));
                }
            }
        });
    }
}
