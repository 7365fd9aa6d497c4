//! The container runtime abstraction the node agent reconciles against
//! (spec.md §6), plus a `docker`-CLI-backed implementation and an
//! in-memory test double.

pub mod docker;
pub mod error;
pub mod fake;
pub mod runtime;

pub use docker::DockerCliRuntime;
pub use error::RuntimeError;
pub use fake::FakeRuntime;
pub use runtime::{ContainerRuntime, ContainerSpec, Inspection, LogStream, PortMapping};
