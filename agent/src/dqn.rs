use rand::Rng;
use std::collections::vec_deque::VecDeque;
use tch::Tensor;

use crate::agent::Agent;
use crate::approximator::Approximator;
use crate::dataset::Transition;
use crate::environment::MdpInfo;
use crate::policy::EpsGreedy;

#[derive(Debug, Clone)]
pub struct DqnConfig {
    pub batch_size: usize,
    /// Number of replay samples collected before updates start.
    pub initial_replay_size: usize,
    pub max_replay_size: usize,
    /// Target weights are refreshed every this many fits.
    pub target_update_frequency: i64,
}

struct ReplayEntry {
    observation: Tensor,
    action: i64,
    reward: f32,
    next_observation: Tensor,
    absorbing: bool,
}

/// Deep Q-Network agent with a uniform replay memory and a periodically
/// synchronized target approximator.
pub struct Dqn<A: Approximator> {
    approximator: A,
    target_approximator: A,
    policy: EpsGreedy,
    gamma: f64,
    memory: VecDeque<ReplayEntry>,
    config: DqnConfig,
    fit_steps: i64,
}

impl<A: Approximator> Dqn<A> {
    /// Builds the online and target approximators from the same factory and
    /// synchronizes the target to the online weights.
    pub fn new<F>(
        build_approximator: F,
        policy: EpsGreedy,
        mdp_info: &MdpInfo,
        config: DqnConfig,
    ) -> Self
    where
        F: Fn() -> A,
    {
        let approximator = build_approximator();
        let mut target_approximator = build_approximator();
        target_approximator.set_weights(&approximator.get_weights());
        Dqn {
            approximator,
            target_approximator,
            policy,
            gamma: mdp_info.gamma,
            memory: VecDeque::with_capacity(config.max_replay_size),
            config,
            fit_steps: 0,
        }
    }
}

impl<A: Approximator> Agent for Dqn<A> {
    fn draw_action(&self, observation: &Tensor) -> i64 {
        let q_values = self
            .approximator
            .predict(&observation.unsqueeze(0))
            .squeeze();
        self.policy.draw_action(&q_values)
    }

    fn fit(&mut self, transitions: &[Transition]) -> f64 {
        for transition in transitions {
            if self.memory.len() >= self.config.max_replay_size {
                self.memory.pop_front();
            }
            self.memory.push_back(ReplayEntry {
                observation: transition.observation.copy(),
                action: transition.action,
                reward: transition.reward as f32,
                next_observation: transition.next_observation.copy(),
                absorbing: transition.absorbing,
            });
        }
        if self.memory.len() < self.config.initial_replay_size {
            return 0.0;
        }
        // sample memory
        let mut observations = Vec::with_capacity(self.config.batch_size);
        let mut next_observations = Vec::with_capacity(self.config.batch_size);
        let mut actions: Vec<i64> = Vec::with_capacity(self.config.batch_size);
        let mut rewards: Vec<f32> = Vec::with_capacity(self.config.batch_size);
        let mut nonterminal: Vec<f32> = Vec::with_capacity(self.config.batch_size);
        let mut rng = rand::thread_rng();
        for _ in 0..self.config.batch_size {
            let index = rng.gen_range(0..self.memory.len());
            let entry = self.memory.get(index).unwrap();
            observations.push(entry.observation.copy());
            next_observations.push(entry.next_observation.copy());
            actions.push(entry.action);
            rewards.push(entry.reward);
            nonterminal.push(if entry.absorbing { 0.0 } else { 1.0 });
        }
        let states = Tensor::stack(&observations, 0);
        let next_states = Tensor::stack(&next_observations, 0);
        // bootstrapped targets: r + gamma * max_a Q_target(s', a), cut at
        // absorbing states
        let next_values = self
            .target_approximator
            .predict(&next_states)
            .max_dim(1, false)
            .0;
        let targets =
            next_values * Tensor::of_slice(&nonterminal) * self.gamma + Tensor::of_slice(&rewards);
        let actions = Tensor::of_slice(&actions);
        let loss = self.approximator.fit(&states, &actions, &targets);
        self.fit_steps += 1;
        if self.fit_steps % self.config.target_update_frequency == 0 {
            self.target_approximator
                .set_weights(&self.approximator.get_weights());
        }
        loss
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::approximator::Weights;
    use crate::policy::Parameter;
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    struct StubApproximator {
        n_actions: i64,
        loss: f64,
        syncs: Rc<Cell<usize>>,
        targets_seen: Rc<RefCell<Vec<f64>>>,
    }

    impl Approximator for StubApproximator {
        fn predict(&self, states: &Tensor) -> Tensor {
            // the last action always looks best
            let mut row = vec![0.0f32; self.n_actions as usize];
            row[self.n_actions as usize - 1] = 1.0;
            Tensor::of_slice(&row)
                .unsqueeze(0)
                .repeat(&[states.size()[0], 1])
        }

        fn fit(&mut self, _states: &Tensor, _actions: &Tensor, targets: &Tensor) -> f64 {
            let mut seen = Vec::new();
            for i in 0..targets.size()[0] {
                seen.push(targets.double_value(&[i]));
            }
            *self.targets_seen.borrow_mut() = seen;
            self.loss
        }

        fn get_weights(&self) -> Weights {
            Vec::new()
        }

        fn set_weights(&mut self, _weights: &Weights) {
            self.syncs.set(self.syncs.get() + 1);
        }
    }

    struct Probes {
        syncs: Rc<Cell<usize>>,
        targets_seen: Rc<RefCell<Vec<f64>>>,
    }

    impl Probes {
        fn new() -> Probes {
            Probes {
                syncs: Rc::new(Cell::new(0)),
                targets_seen: Rc::new(RefCell::new(Vec::new())),
            }
        }
    }

    fn mdp_info() -> MdpInfo {
        MdpInfo {
            observation_shape: vec![2],
            n_actions: 3,
            horizon: 100,
            gamma: 0.9,
        }
    }

    fn make_agent(config: DqnConfig, probes: &Probes) -> Dqn<StubApproximator> {
        let syncs = probes.syncs.clone();
        let targets_seen = probes.targets_seen.clone();
        Dqn::new(
            move || StubApproximator {
                n_actions: 3,
                loss: 0.5,
                syncs: syncs.clone(),
                targets_seen: targets_seen.clone(),
            },
            EpsGreedy::new(Parameter::new(0.0)),
            &mdp_info(),
            config,
        )
    }

    fn transition(absorbing: bool) -> Transition {
        Transition {
            observation: Tensor::of_slice(&[0.0f32, 1.0]),
            action: 0,
            reward: 1.0,
            next_observation: Tensor::of_slice(&[1.0f32, 0.0]),
            absorbing,
            last: absorbing,
        }
    }

    #[test]
    fn no_update_before_initial_replay_size() {
        let probes = Probes::new();
        let mut agent = make_agent(
            DqnConfig {
                batch_size: 2,
                initial_replay_size: 4,
                max_replay_size: 10,
                target_update_frequency: 100,
            },
            &probes,
        );
        assert_eq!(agent.fit(&[transition(false)]), 0.0);
        assert_eq!(agent.fit(&[transition(false)]), 0.0);
        assert_eq!(agent.fit(&[transition(false)]), 0.0);
        assert_eq!(agent.fit(&[transition(false)]), 0.5);
    }

    #[test]
    fn target_network_sync_cadence() {
        let probes = Probes::new();
        let mut agent = make_agent(
            DqnConfig {
                batch_size: 1,
                initial_replay_size: 1,
                max_replay_size: 10,
                target_update_frequency: 2,
            },
            &probes,
        );
        // one sync at construction
        assert_eq!(probes.syncs.get(), 1);
        for _ in 0..4 {
            agent.fit(&[transition(false)]);
        }
        assert_eq!(probes.syncs.get(), 3);
    }

    #[test]
    fn bootstrap_is_cut_at_absorbing_states() {
        let probes = Probes::new();
        let mut agent = make_agent(
            DqnConfig {
                batch_size: 3,
                initial_replay_size: 1,
                max_replay_size: 10,
                target_update_frequency: 100,
            },
            &probes,
        );
        agent.fit(&[transition(true)]);
        for target in probes.targets_seen.borrow().iter() {
            assert!((target - 1.0).abs() < 1e-6);
        }

        let probes = Probes::new();
        let mut agent = make_agent(
            DqnConfig {
                batch_size: 3,
                initial_replay_size: 1,
                max_replay_size: 10,
                target_update_frequency: 100,
            },
            &probes,
        );
        agent.fit(&[transition(false)]);
        // r + gamma * max Q_target = 1.0 + 0.9 * 1.0
        for target in probes.targets_seen.borrow().iter() {
            assert!((target - 1.9).abs() < 1e-6);
        }
    }

    #[test]
    fn greedy_action_follows_the_approximator() {
        let probes = Probes::new();
        let agent = make_agent(
            DqnConfig {
                batch_size: 1,
                initial_replay_size: 1,
                max_replay_size: 10,
                target_update_frequency: 2,
            },
            &probes,
        );
        assert_eq!(agent.draw_action(&Tensor::of_slice(&[0.0f32, 1.0])), 2);
    }

    #[test]
    fn replay_memory_is_bounded() {
        let probes = Probes::new();
        let mut agent = make_agent(
            DqnConfig {
                batch_size: 1,
                initial_replay_size: 100,
                max_replay_size: 5,
                target_update_frequency: 100,
            },
            &probes,
        );
        for _ in 0..12 {
            agent.fit(&[transition(false)]);
        }
        assert_eq!(agent.memory.len(), 5);
    }
}
