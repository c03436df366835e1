use agent::{compute_j, Core, Dqn, DqnConfig, Environment, EpsGreedy, Parameter};
use gym::GymEnv;
use structopt::StructOpt;

mod network;
use network::QApproximator;

#[derive(Debug, StructOpt)]
#[structopt(name = "acrobot_dqn", about = "DQN training on the Acrobot-v1 gym environment.")]
struct Opt {
    #[structopt(short = "e", long = "epochs", default_value = "50")]
    epochs: usize,
    #[structopt(short = "s", long = "steps", default_value = "1000")]
    steps: usize,
    #[structopt(short = "t", long = "test-steps", default_value = "1000")]
    test_steps: usize,
    #[structopt(long = "render-episodes", default_value = "5")]
    render_episodes: usize,
    #[structopt(long = "no-render")]
    no_render: bool,
}

const HORIZON: usize = 200;
const GAMMA: f64 = 0.99;
const EPSILON: f64 = 0.01;
const N_FEATURES: i64 = 80;
const LEARNING_RATE: f64 = 1e-4;
const TRAIN_FREQUENCY: usize = 1;

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

fn main() {
    let opt = Opt::from_args();
    let mut env = GymEnv::new("Acrobot-v1", HORIZON, GAMMA).unwrap();
    let input_dims = env.info().observation_shape[0];
    let n_actions = env.info().n_actions;

    let policy = EpsGreedy::new(Parameter::new(EPSILON));
    let config = DqnConfig {
        batch_size: 200,
        initial_replay_size: 100,
        max_replay_size: 5000,
        target_update_frequency: 100,
    };
    let mut agent = Dqn::new(
        || QApproximator::new(input_dims, n_actions, N_FEATURES, LEARNING_RATE),
        policy,
        env.info(),
        config,
    );
    let mut core = Core::new(&mut agent, &mut env);

    let dataset = core.evaluate_steps(opt.test_steps, false);
    println!("J: {}", mean(&compute_j(&dataset, GAMMA)));

    for epoch in 0..opt.epochs {
        println!("Epoch: {}", epoch);
        core.learn(opt.steps, TRAIN_FREQUENCY);
        let dataset = core.evaluate_steps(opt.test_steps, false);
        println!("J: {}", mean(&compute_j(&dataset, GAMMA)));
    }

    if !opt.no_render {
        println!("Press enter to visualize the learned policy");
        let mut line = String::new();
        std::io::stdin().read_line(&mut line).unwrap();
        core.evaluate_episodes(opt.render_episodes, true);
    }
    env.close().unwrap();
}
