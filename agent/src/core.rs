use tch::Tensor;

use crate::agent::Agent;
use crate::dataset::Transition;
use crate::environment::Environment;

/// Drives an agent against an environment: collects evaluation datasets and
/// feeds the agent transition batches during learning. Episodes end on an
/// absorbing state or at the environment's horizon; each `learn`/`evaluate`
/// call starts a fresh episode.
pub struct Core<'a, T: Agent, E: Environment> {
    agent: &'a mut T,
    env: &'a mut E,
    current_observation: Option<Tensor>,
    episode_steps: usize,
}

impl<'a, T: Agent, E: Environment> Core<'a, T, E> {
    pub fn new(agent: &'a mut T, env: &'a mut E) -> Self {
        Core {
            agent,
            env,
            current_observation: None,
            episode_steps: 0,
        }
    }

    /// Runs `n_steps` environment steps, handing the collected transitions
    /// to the agent every `n_steps_per_fit` steps.
    pub fn learn(&mut self, n_steps: usize, n_steps_per_fit: usize) {
        self.current_observation = None;
        let mut batch = Vec::with_capacity(n_steps_per_fit);
        for _ in 0..n_steps {
            batch.push(self.step(false));
            if batch.len() >= n_steps_per_fit {
                self.agent.fit(&batch);
                batch.clear();
            }
        }
        if !batch.is_empty() {
            self.agent.fit(&batch);
        }
    }

    /// Runs the current policy for `n_steps` steps without fitting.
    pub fn evaluate_steps(&mut self, n_steps: usize, render: bool) -> Vec<Transition> {
        self.current_observation = None;
        (0..n_steps).map(|_| self.step(render)).collect()
    }

    /// Runs the current policy until `n_episodes` episodes have finished.
    pub fn evaluate_episodes(&mut self, n_episodes: usize, render: bool) -> Vec<Transition> {
        self.current_observation = None;
        let mut dataset = Vec::new();
        let mut finished = 0;
        while finished < n_episodes {
            let transition = self.step(render);
            if transition.last {
                finished += 1;
            }
            dataset.push(transition);
        }
        dataset
    }

    fn step(&mut self, render: bool) -> Transition {
        let observation = match self.current_observation.take() {
            Some(observation) => observation,
            None => {
                self.episode_steps = 0;
                self.env.reset()
            }
        };
        let action = self.agent.draw_action(&observation);
        let step = self.env.step(action);
        if render {
            self.env.render();
        }
        self.episode_steps += 1;
        let last = step.absorbing || self.episode_steps >= self.env.info().horizon;
        if !last {
            self.current_observation = Some(step.observation.copy());
        }
        Transition {
            observation,
            action,
            reward: step.reward,
            next_observation: step.observation,
            absorbing: step.absorbing,
            last,
        }
    }
}
