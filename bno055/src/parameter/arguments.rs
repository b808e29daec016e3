//! ROS 2 command line argument handling for parameters.
//!
//! Only the parameter related part of the `--ros-args` block is interpreted:
//!
//! ```text
//! bno055_params --ros-args --params-file bno055_params.yaml -p uart_baudrate:=57600 --
//! ```

use std::collections::HashMap;
use std::path::PathBuf;

use tracing::debug;

use super::types::ParameterValue;
use super::yaml;
use crate::error::{ParameterError, Result};

const ROS_ARGS_FLAG: &str = "--ros-args";
const ROS_ARGS_EXPLICIT_END_TOKEN: &str = "--";
const PARAM_FLAG: &str = "--param";
const SHORT_PARAM_FLAG: &str = "-p";
const PARAM_FILE_FLAG: &str = "--params-file";

/// Flags taking one operand that are accepted but not interpreted here.
const IGNORED_FLAGS_WITH_OPERAND: &[&str] = &[
    "--remap",
    "-r",
    "--enclave",
    "-e",
    "--log-level",
    "--log-config-file",
    "--log-file-name",
];

/// Parameter sources collected from a command line.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Arguments {
    /// `--params-file` paths in the order given.
    pub parameter_files: Vec<PathBuf>,
    /// `-p name:=value` rules in the order given.
    pub parameter_rules: Vec<(String, ParameterValue)>,
    /// Arguments outside any `--ros-args` block.
    pub unparsed_args: Vec<String>,
}

impl Arguments {
    /// Parse a full argument list (without the program name).
    pub fn parse<I, S>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let args: Vec<String> = args.into_iter().map(|s| s.as_ref().to_owned()).collect();
        let mut parsed = Arguments::default();
        let mut in_ros_args = false;
        let mut iter = args.iter();

        while let Some(arg) = iter.next() {
            let arg = arg.as_str();
            if !in_ros_args {
                if arg == ROS_ARGS_FLAG {
                    in_ros_args = true;
                } else {
                    parsed.unparsed_args.push(arg.to_owned());
                }
                continue;
            }

            match arg {
                ROS_ARGS_EXPLICIT_END_TOKEN => in_ros_args = false,
                ROS_ARGS_FLAG => {}
                PARAM_FLAG | SHORT_PARAM_FLAG => {
                    let rule = iter.next().ok_or_else(|| missing_operand(arg))?;
                    parsed.parameter_rules.push(parse_param_rule(rule)?);
                }
                PARAM_FILE_FLAG => {
                    let path = iter.next().ok_or_else(|| missing_operand(arg))?;
                    parsed.parameter_files.push(PathBuf::from(path));
                }
                flag if IGNORED_FLAGS_WITH_OPERAND.contains(&flag) => {
                    let operand = iter.next().ok_or_else(|| missing_operand(flag))?;
                    debug!("[ARGS] Ignoring {} {}", flag, operand);
                }
                other => debug!("[ARGS] Ignoring unknown ROS argument: {}", other),
            }
        }

        Ok(parsed)
    }

    /// Resolve all parameter sources into one override map for a node.
    ///
    /// Files are applied in order first, then `-p` rules, so rules given on the
    /// command line win over file contents.
    pub fn parameter_overrides(&self, node_fqn: &str) -> Result<HashMap<String, ParameterValue>> {
        let mut overrides = HashMap::new();
        for path in &self.parameter_files {
            overrides.extend(yaml::load_parameter_file(path, node_fqn)?);
        }
        for (name, value) in &self.parameter_rules {
            overrides.insert(name.clone(), value.clone());
        }
        Ok(overrides)
    }
}

fn missing_operand(flag: &str) -> ParameterError {
    ParameterError::InvalidArgument(format!("{} requires an operand", flag))
}

/// Parse a `name:=value` parameter rule.
fn parse_param_rule(rule: &str) -> Result<(String, ParameterValue)> {
    let (name, value) = rule.split_once(":=").ok_or_else(|| {
        ParameterError::InvalidArgument(format!("'{}' is not a name:=value rule", rule))
    })?;

    if name.is_empty() || name.contains(' ') {
        return Err(ParameterError::InvalidArgument(format!(
            "invalid parameter name in rule '{}'",
            rule
        )));
    }

    Ok((name.to_string(), yaml::parse_parameter_value(value)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_param_rules() {
        let args = Arguments::parse([
            "--ros-args",
            "-p",
            "uart_baudrate:=57600",
            "--param",
            "connection_type:=i2c",
        ])
        .unwrap();
        assert_eq!(
            args.parameter_rules,
            vec![
                ("uart_baudrate".to_string(), ParameterValue::Integer(57600)),
                ("connection_type".to_string(), ParameterValue::from("i2c")),
            ]
        );
        assert!(args.unparsed_args.is_empty());
    }

    #[test]
    fn test_params_file_and_unparsed() {
        let args = Arguments::parse([
            "--verbose",
            "--ros-args",
            "--params-file",
            "/tmp/bno055_params.yaml",
            "-r",
            "imu:=imu_raw",
            "--",
            "trailing",
        ])
        .unwrap();
        assert_eq!(
            args.parameter_files,
            vec![PathBuf::from("/tmp/bno055_params.yaml")]
        );
        assert_eq!(args.unparsed_args, vec!["--verbose", "trailing"]);
    }

    #[test]
    fn test_missing_operand() {
        let err = Arguments::parse(["--ros-args", "-p"]).unwrap_err();
        assert!(matches!(err, ParameterError::InvalidArgument(_)));
    }

    #[test]
    fn test_invalid_rule() {
        assert!(Arguments::parse(["--ros-args", "-p", "uart_baudrate=57600"]).is_err());
        assert!(Arguments::parse(["--ros-args", "-p", ":=1"]).is_err());
    }

    #[test]
    fn test_flags_outside_block_are_not_parsed() {
        let args = Arguments::parse(["-p", "uart_baudrate:=57600"]).unwrap();
        assert!(args.parameter_rules.is_empty());
        assert_eq!(args.unparsed_args.len(), 2);
    }

    #[test]
    fn test_rules_override_files() {
        let path = std::env::temp_dir().join(format!(
            "bno055_args_test_{}.yaml",
            std::process::id()
        ));
        std::fs::write(
            &path,
            "bno055:\n  ros__parameters:\n    uart_baudrate: 9600\n    frame_id: imu\n",
        )
        .unwrap();

        let args = Arguments::parse([
            "--ros-args",
            "--params-file",
            path.to_str().unwrap(),
            "-p",
            "uart_baudrate:=57600",
        ])
        .unwrap();
        let overrides = args.parameter_overrides("/bno055").unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(overrides["uart_baudrate"], ParameterValue::Integer(57600));
        assert_eq!(overrides["frame_id"], ParameterValue::from("imu"));
    }
}
