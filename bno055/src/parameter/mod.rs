//! ROS 2 parameter support for the BNO055 driver node.
//!
//! This module provides the parameter registry the driver reads its
//! configuration from:
//!
//! - **Parameter storage** with typed values and descriptors
//! - **Overrides** from ROS 2 YAML parameter files and `--ros-args` rules
//! - **`ParameterRegistry`**, the capability the loader is written against
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                           Node                               │
//! ├──────────────────────────────────────────────────────────────┤
//! │  store: Arc<RwLock<ParameterStore>>                          │
//! │  ├── declared parameters (value + descriptor)                │
//! │  └── pending overrides                                       │
//! │        ▲                          ▲                          │
//! │        │ yaml::load_parameter_file│ Arguments::parse         │
//! │   --params-file <yaml>       -p name:=value                  │
//! └──────────────────────────────────────────────────────────────┘
//! ```

pub mod arguments;
pub mod registry;
pub mod store;
pub mod types;
pub mod yaml;

pub use arguments::Arguments;
pub use registry::ParameterRegistry;
pub use store::ParameterStore;
pub use types::{
    FloatingPointRange, IntegerRange, Parameter, ParameterDescriptor, ParameterType,
    ParameterValue,
};
