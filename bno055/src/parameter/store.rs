//! Parameter storage with validation.
//!
//! `ParameterStore` holds all declared parameters for a node. It enforces
//! type constraints, range checks, and read-only restrictions.

use std::collections::HashMap;

use tracing::debug;

use super::types::{
    FloatingPointRange, IntegerRange, Parameter, ParameterDescriptor, ParameterType, ParameterValue,
};
use crate::error::{ParameterError, Result};

/// Internal storage entry for a single parameter.
#[derive(Debug, Clone)]
struct ParameterEntry {
    value: ParameterValue,
    descriptor: ParameterDescriptor,
}

/// Parameter store holding all declared parameters for a node.
#[derive(Debug, Default)]
pub struct ParameterStore {
    parameters: HashMap<String, ParameterEntry>,
    /// Parameter overrides applied at declaration time.
    overrides: HashMap<String, ParameterValue>,
}

impl ParameterStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_overrides(overrides: HashMap<String, ParameterValue>) -> Self {
        Self {
            parameters: HashMap::new(),
            overrides,
        }
    }

    /// Declare a parameter with a default value and descriptor.
    ///
    /// If an override exists for this parameter name, the override value is used
    /// instead of the default. Returns the actual initial value.
    pub fn declare(
        &mut self,
        name: &str,
        default: ParameterValue,
        mut descriptor: ParameterDescriptor,
    ) -> Result<ParameterValue> {
        if self.parameters.contains_key(name) {
            return Err(ParameterError::AlreadyDeclared(name.to_string()));
        }

        // The type comes from the default, never from the override
        if descriptor.type_ == ParameterType::NotSet {
            descriptor.type_ = default.parameter_type();
        }
        descriptor.name = name.to_string();

        let initial_value = match self.overrides.get(name) {
            Some(value) => {
                debug!("[PARAMS] Override: {} = {}", name, value);
                value.clone()
            }
            None => default,
        };

        validate_value(name, &initial_value, &descriptor)?;

        // Consumed only once the declaration is accepted
        self.overrides.remove(name);
        self.parameters.insert(
            name.to_string(),
            ParameterEntry {
                value: initial_value.clone(),
                descriptor,
            },
        );

        Ok(initial_value)
    }

    /// Get the value of a parameter.
    pub fn get(&self, name: &str) -> Option<ParameterValue> {
        self.parameters.get(name).map(|e| e.value.clone())
    }

    /// Get the descriptor of a parameter.
    pub fn describe(&self, name: &str) -> Option<ParameterDescriptor> {
        self.parameters.get(name).map(|e| e.descriptor.clone())
    }

    /// Check if a parameter is declared.
    pub fn has(&self, name: &str) -> bool {
        self.parameters.contains_key(name)
    }

    /// Names of all declared parameters, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.parameters.keys().cloned().collect();
        names.sort();
        names
    }

    /// Validate a parameter change without committing it.
    pub fn validate_set(&self, param: &Parameter) -> Result<()> {
        let entry = self
            .parameters
            .get(&param.name)
            .ok_or_else(|| ParameterError::NotDeclared(param.name.clone()))?;

        if entry.descriptor.read_only {
            return Err(ParameterError::ReadOnly(param.name.clone()));
        }

        validate_value(&param.name, &param.value, &entry.descriptor)
    }

    /// Set a parameter value after validating it. Returns the previous value.
    pub fn set(&mut self, param: &Parameter) -> Result<ParameterValue> {
        self.validate_set(param)?;
        let entry = self
            .parameters
            .get_mut(&param.name)
            .ok_or_else(|| ParameterError::NotDeclared(param.name.clone()))?;
        Ok(std::mem::replace(&mut entry.value, param.value.clone()))
    }

    /// Undeclare a parameter.
    pub fn undeclare(&mut self, name: &str) -> Result<()> {
        if self.parameters.remove(name).is_some() {
            Ok(())
        } else {
            Err(ParameterError::NotDeclared(name.to_string()))
        }
    }
}

/// Validate a value against a parameter descriptor's constraints.
fn validate_value(
    name: &str,
    value: &ParameterValue,
    descriptor: &ParameterDescriptor,
) -> Result<()> {
    // A statically typed parameter never holds NotSet
    if descriptor.type_ != ParameterType::NotSet
        && !descriptor.dynamic_typing
        && value.parameter_type() != descriptor.type_
    {
        return Err(ParameterError::TypeMismatch {
            name: name.to_string(),
            expected: descriptor.type_,
            actual: value.parameter_type(),
        });
    }

    if let (Some(range), ParameterValue::Double(v)) = (&descriptor.floating_point_range, value) {
        validate_float_range(*v, range).map_err(|r| ParameterError::invalid_value(name, r))?;
    }

    if let (Some(range), ParameterValue::Integer(v)) = (&descriptor.integer_range, value) {
        validate_integer_range(*v, range).map_err(|r| ParameterError::invalid_value(name, r))?;
    }

    Ok(())
}

fn validate_float_range(value: f64, range: &FloatingPointRange) -> std::result::Result<(), String> {
    if value < range.from_value || value > range.to_value {
        return Err(format!(
            "value {} out of range [{}, {}]",
            value, range.from_value, range.to_value
        ));
    }

    if range.step != 0.0 {
        let offset = value - range.from_value;
        let remainder = offset % range.step.abs();
        // Allow small floating point errors; the upper bound is always valid
        if remainder > 1e-9
            && (range.step.abs() - remainder) > 1e-9
            && (value - range.to_value).abs() > 1e-9
        {
            return Err(format!(
                "value {} not on step grid (from={}, step={})",
                value, range.from_value, range.step
            ));
        }
    }

    Ok(())
}

fn validate_integer_range(value: i64, range: &IntegerRange) -> std::result::Result<(), String> {
    if value < range.from_value || value > range.to_value {
        return Err(format!(
            "value {} out of range [{}, {}]",
            value, range.from_value, range.to_value
        ));
    }

    if range.step != 0 {
        let offset = (value - range.from_value).unsigned_abs();
        if offset % range.step != 0 && value != range.to_value {
            return Err(format!(
                "value {} not on step grid (from={}, step={})",
                value, range.from_value, range.step
            ));
        }
    }

    Ok(())
}
