pub mod agent;
pub mod approximator;
pub mod core;
pub mod dataset;
pub mod dqn;
pub mod environment;
pub mod policy;

pub use self::agent::*;
pub use self::approximator::*;
pub use self::core::*;
pub use self::dataset::*;
pub use self::dqn::*;
pub use self::environment::*;
pub use self::policy::*;
