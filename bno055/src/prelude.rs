//! Common imports for driver code.

pub use crate::{
    Builder,
    error::{ParameterError, ParameterRetrievalError},
    logging::{Logger, TracingLogger},
    node::{Node, NodeBuilder},
    parameter::{
        Parameter, ParameterDescriptor, ParameterRegistry, ParameterType, ParameterValue,
    },
    params::{ConnectionType, NodeParameters, OperationMode},
};
