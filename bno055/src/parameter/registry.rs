use crate::error::Result;

use super::types::{ParameterDescriptor, ParameterValue};

/// A node's parameter registry, as seen by code that only declares and reads.
///
/// [`Node`](crate::node::Node) is the in-process implementation; tests and
/// other hosts can provide their own.
pub trait ParameterRegistry {
    /// Declare `name` with a default. Returns the effective initial value,
    /// which is the override if one was supplied for `name`.
    fn declare_parameter(
        &self,
        name: &str,
        default: ParameterValue,
        descriptor: ParameterDescriptor,
    ) -> Result<ParameterValue>;

    /// Current value of a declared parameter.
    fn get_parameter(&self, name: &str) -> Result<ParameterValue>;
}

impl<R: ParameterRegistry + ?Sized> ParameterRegistry for &R {
    fn declare_parameter(
        &self,
        name: &str,
        default: ParameterValue,
        descriptor: ParameterDescriptor,
    ) -> Result<ParameterValue> {
        (**self).declare_parameter(name, default, descriptor)
    }

    fn get_parameter(&self, name: &str) -> Result<ParameterValue> {
        (**self).get_parameter(name)
    }
}
