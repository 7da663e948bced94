//! Core container implementation for Tarkib DI.

pub mod arguments;
pub mod config;
pub mod container;
pub mod error;
pub mod registry;
pub mod resolve;
pub mod shared;

pub use arguments::{ArgValue, ArgumentSet};
pub use config::{
    ArgumentSpec, ContainerConfig, ScalarValue, TypeConfig, TypeName, VirtualTypeConfig,
    normalize_type_name,
};
pub use container::prelude;
pub use container::{Container, ContainerBuilder};
pub use error::{ContainerError, Result};
pub use registry::{FactoryRegistry, Instance, ParamSpec};
