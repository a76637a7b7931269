pub mod config;
pub mod error;
pub mod field;
pub mod integrator;
pub mod sampler;
pub mod seeds;
pub mod synth;

pub use config::{FieldSource, OutputConfig, RunConfig, SeedConfig, StreamflowConfig};
pub use error::{ConfigError, FieldError};
pub use field::{RawFormat, ValueType, VectorField};
pub use integrator::{Scheme, Streamline, StreamlineIntegrator, Termination};
pub use sampler::{BilinearSampler, VelocitySource};
