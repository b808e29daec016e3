//! ROS 2-style YAML parameter file loading.
//!
//! Supports the standard ROS 2 parameter file format:
//!
//! ```yaml
//! /**:
//!   ros__parameters:
//!     frame_id: "imu_link"
//!
//! bno055:
//!   ros__parameters:
//!     connection_type: "uart"
//!     uart_port: "/dev/ttyUSB0"
//!     acc_offset: [0xFFEC, 0x00A5, 0xFFE8]
//! ```
//!
//! Node selectors are matched against the fully-qualified node name
//! (`/{namespace}/{node_name}`, or `/{node_name}` in the root namespace).
//! `/**` matches every node; a selector without a leading slash is taken
//! relative to the root namespace.

use std::collections::HashMap;
use std::path::Path;

use serde_yaml::Value;

use super::types::ParameterValue;
use crate::error::{ParameterError, Result};

const ROS_PARAMETERS_KEY: &str = "ros__parameters";

/// Load parameter overrides from a YAML file for the given node.
///
/// Returns a map of parameter name → value containing only the parameters
/// applicable to the specified node.
pub fn load_parameter_file(
    path: &Path,
    node_fqn: &str,
) -> Result<HashMap<String, ParameterValue>> {
    let content = std::fs::read_to_string(path).map_err(|source| ParameterError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    load_parameter_string(&content, node_fqn)
}

/// Parse a YAML string and extract parameter overrides for the given node.
pub fn load_parameter_string(
    yaml: &str,
    node_fqn: &str,
) -> Result<HashMap<String, ParameterValue>> {
    let doc: Value = serde_yaml::from_str(yaml)?;

    let mapping = doc
        .as_mapping()
        .ok_or_else(|| ParameterError::MalformedFile("YAML root must be a mapping".into()))?;

    let mut result = HashMap::new();

    for (key, node_val) in mapping {
        let selector = key
            .as_str()
            .ok_or_else(|| ParameterError::MalformedFile("node selectors must be strings".into()))?;

        if !matches_node(selector, node_fqn) {
            continue;
        }

        let node_map = node_val.as_mapping().ok_or_else(|| {
            ParameterError::MalformedFile(format!("value for '{}' must be a mapping", selector))
        })?;

        let params_key = Value::String(ROS_PARAMETERS_KEY.to_string());
        let Some(params) = node_map.get(&params_key) else {
            continue;
        };
        let params_map = params.as_mapping().ok_or_else(|| {
            ParameterError::MalformedFile(format!("{ROS_PARAMETERS_KEY} must be a mapping"))
        })?;

        for (pname, pval) in params_map {
            let name = pname.as_str().ok_or_else(|| {
                ParameterError::MalformedFile("parameter names must be strings".into())
            })?;

            match yaml_value_to_parameter(pval) {
                // Later sections override earlier ones
                Some(value) => {
                    result.insert(name.to_string(), value);
                }
                None => {
                    return Err(ParameterError::invalid_value(
                        name,
                        "unsupported value in parameter file",
                    ));
                }
            }
        }
    }

    Ok(result)
}

/// Parse the right-hand side of a `name:=value` rule the way a parameter file
/// value would be parsed.
pub fn parse_parameter_value(text: &str) -> Result<ParameterValue> {
    let value: Value = serde_yaml::from_str(text)?;
    yaml_value_to_parameter(&value).ok_or_else(|| {
        ParameterError::InvalidArgument(format!("unsupported parameter value '{}'", text))
    })
}

/// Check whether a node selector matches the given fully-qualified node name.
///
/// Selectors:
/// - `/**`: matches any node
/// - `/some_ns/**`: matches any node under `/some_ns/`
/// - `/some_ns/*`: matches nodes directly inside `/some_ns`
/// - `/node_name`, `node_name`: exact match
fn matches_node(selector: &str, node_fqn: &str) -> bool {
    if selector == "/**" || selector == "**" {
        return true;
    }

    let selector = if selector.starts_with('/') {
        selector.to_string()
    } else {
        format!("/{selector}")
    };

    if let Some(prefix) = selector.strip_suffix("/**") {
        return node_fqn
            .strip_prefix(prefix)
            .is_some_and(|rest| rest.starts_with('/'));
    }

    if let Some(prefix) = selector.strip_suffix("/*") {
        return node_fqn
            .strip_prefix(prefix)
            .and_then(|rest| rest.strip_prefix('/'))
            .is_some_and(|rest| !rest.is_empty() && !rest.contains('/'));
    }

    selector == node_fqn
}

/// Convert a YAML value to a ParameterValue.
///
/// Type inference rules:
/// - Integer YAML values → Integer
/// - Float YAML values → Double
/// - Boolean YAML values → Bool
/// - String YAML values → String
/// - Sequence of integers → IntegerArray
/// - Sequence of floats → DoubleArray
/// - Sequence of bools → BoolArray
/// - Sequence of strings → StringArray
fn yaml_value_to_parameter(val: &Value) -> Option<ParameterValue> {
    match val {
        Value::Bool(b) => Some(ParameterValue::Bool(*b)),
        Value::Number(n) => n
            .as_i64()
            .map(ParameterValue::Integer)
            .or_else(|| n.as_f64().map(ParameterValue::Double)),
        Value::String(s) => Some(ParameterValue::String(s.clone())),
        Value::Sequence(seq) => infer_sequence_type(seq),
        Value::Null => Some(ParameterValue::NotSet),
        _ => None,
    }
}

fn infer_sequence_type(seq: &[Value]) -> Option<ParameterValue> {
    // Empty sequence defaults to StringArray
    let Some(first) = seq.first() else {
        return Some(ParameterValue::StringArray(vec![]));
    };

    match first {
        Value::Bool(_) => {
            let bools: Option<Vec<bool>> = seq.iter().map(|v| v.as_bool()).collect();
            bools.map(ParameterValue::BoolArray)
        }
        Value::Number(n) if n.is_i64() || n.is_u64() => {
            // Offset words such as 0xFFEC must stay integers, so no byte-array guessing
            let ints: Option<Vec<i64>> = seq.iter().map(|v| v.as_i64()).collect();
            ints.map(ParameterValue::IntegerArray)
        }
        Value::Number(_) => {
            let floats: Option<Vec<f64>> = seq.iter().map(|v| v.as_f64()).collect();
            floats.map(ParameterValue::DoubleArray)
        }
        Value::String(_) => {
            let strings: Option<Vec<String>> = seq
                .iter()
                .map(|v| v.as_str().map(|s| s.to_string()))
                .collect();
            strings.map(ParameterValue::StringArray)
        }
        _ => None,
    }
}
