//! # bno055: parameter handling for the BNO055 IMU driver node
//!
//! The driver node reads its configuration from ROS 2 parameters. This crate
//! provides the parameter registry of the node, the ROS 2 parameter file and
//! `--ros-args` sources that override the defaults, and [`NodeParameters`],
//! the typed configuration the rest of the driver consumes.
//!
//! ## Getting started
//!
//! ```rust,ignore
//! use bno055::prelude::*;
//!
//! let node = NodeBuilder::new("bno055")
//!     .with_arguments(["--ros-args", "-p", "uart_baudrate:=57600"])?
//!     .build()?;
//! let params = NodeParameters::load(&node, node.logger());
//! assert_eq!(params.uart_baudrate(), 57600);
//! ```
//!
//! Loading never fails: if a parameter cannot be read, a warning is logged and
//! every field keeps its default. Use [`NodeParameters::try_load`] to get the
//! error instead.

pub mod error;
pub mod logging;
pub mod node;
pub mod parameter;
pub mod params;
pub mod prelude;

pub use error::{ParameterError, ParameterRetrievalError, Result};
pub use params::{ConnectionType, NodeParameters, OperationMode};

/// Builds a configured object, consuming the builder.
///
/// Bring it into scope to call `.build()`:
///
/// ```rust,ignore
/// use bno055::Builder;
/// let node = bno055::node::NodeBuilder::new("bno055").build()?;
/// ```
pub trait Builder {
    type Output;
    fn build(self) -> Result<Self::Output>;
}
