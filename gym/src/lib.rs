//! Wrapper around the Python API of the OpenAI gym.
use cpython::{NoArgs, ObjectProtocol, PyObject, PyResult, Python};
use tch::Tensor;

use agent::{Environment, MdpInfo, Step};

/// A session of the named OpenAI gym environment.
pub struct GymEnv {
    env: PyObject,
    info: MdpInfo,
}

impl GymEnv {
    /// Creates the named gym environment with the given episode horizon and
    /// discount factor.
    pub fn new(name: &str, horizon: usize, gamma: f64) -> PyResult<GymEnv> {
        let gil = Python::acquire_gil();
        let py = gil.python();
        let gym = py.import("gym")?;
        let env = gym.call(py, "make", (name,), None)?;
        let action_space = env.getattr(py, "action_space")?;
        let n_actions = if let Ok(val) = action_space.getattr(py, "n") {
            val.extract(py)?
        } else {
            let shape: Vec<i64> = action_space.getattr(py, "shape")?.extract(py)?;
            shape[0]
        };
        let observation_shape = env
            .getattr(py, "observation_space")?
            .getattr(py, "shape")?
            .extract(py)?;
        Ok(GymEnv {
            env,
            info: MdpInfo {
                observation_shape,
                n_actions,
                horizon,
                gamma,
            },
        })
    }

    fn reset_env(&self) -> PyResult<Tensor> {
        let gil = Python::acquire_gil();
        let py = gil.python();
        let obs = self.env.call_method(py, "reset", NoArgs, None)?;
        Ok(Tensor::of_slice(&obs.extract::<Vec<f32>>(py)?))
    }

    fn step_env(&self, action: i64) -> PyResult<Step> {
        let gil = Python::acquire_gil();
        let py = gil.python();
        let step = self.env.call_method(py, "step", (action,), None)?;
        Ok(Step {
            observation: Tensor::of_slice(&step.get_item(py, 0)?.extract::<Vec<f32>>(py)?),
            reward: step.get_item(py, 1)?.extract(py)?,
            absorbing: step.get_item(py, 2)?.extract(py)?,
        })
    }

    fn render_env(&self) -> PyResult<()> {
        let gil = Python::acquire_gil();
        let py = gil.python();
        self.env.call_method(py, "render", NoArgs, None)?;
        Ok(())
    }

    /// Disposes the environment and any render window.
    pub fn close(&self) -> PyResult<()> {
        let gil = Python::acquire_gil();
        let py = gil.python();
        self.env.call_method(py, "close", NoArgs, None)?;
        Ok(())
    }
}

impl Environment for GymEnv {
    fn info(&self) -> &MdpInfo {
        &self.info
    }

    fn reset(&mut self) -> Tensor {
        self.reset_env().unwrap()
    }

    fn step(&mut self, action: i64) -> Step {
        self.step_env(action).unwrap()
    }

    fn render(&mut self) {
        self.render_env().unwrap()
    }
}
