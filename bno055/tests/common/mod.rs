#![allow(dead_code)]

use std::collections::HashSet;

use bno055::prelude::*;
use parking_lot::Mutex;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogLine {
    Info(String),
    Warn(String),
}

/// Logger that keeps every line for later inspection.
#[derive(Debug, Default)]
pub struct RecordingLogger {
    lines: Mutex<Vec<LogLine>>,
}

impl RecordingLogger {
    pub fn lines(&self) -> Vec<LogLine> {
        self.lines.lock().clone()
    }

    pub fn infos(&self) -> Vec<String> {
        self.lines()
            .into_iter()
            .filter_map(|l| match l {
                LogLine::Info(m) => Some(m),
                LogLine::Warn(_) => None,
            })
            .collect()
    }

    pub fn warnings(&self) -> Vec<String> {
        self.lines()
            .into_iter()
            .filter_map(|l| match l {
                LogLine::Warn(m) => Some(m),
                LogLine::Info(_) => None,
            })
            .collect()
    }
}

impl Logger for RecordingLogger {
    fn info(&self, msg: &str) {
        self.lines.lock().push(LogLine::Info(msg.to_string()));
    }

    fn warn(&self, msg: &str) {
        self.lines.lock().push(LogLine::Warn(msg.to_string()));
    }
}

/// Wraps a node and makes `get_parameter` fail for selected names.
pub struct FailingRegistry {
    pub node: Node,
    pub failing: HashSet<&'static str>,
}

impl FailingRegistry {
    pub fn new(failing: &[&'static str]) -> Self {
        Self {
            node: NodeBuilder::new("bno055").build().expect("node"),
            failing: failing.iter().copied().collect(),
        }
    }
}

impl ParameterRegistry for FailingRegistry {
    fn declare_parameter(
        &self,
        name: &str,
        default: ParameterValue,
        descriptor: ParameterDescriptor,
    ) -> bno055::Result<ParameterValue> {
        self.node.declare_parameter(name, default, descriptor)
    }

    fn get_parameter(&self, name: &str) -> bno055::Result<ParameterValue> {
        if self.failing.contains(name) {
            return Err(ParameterError::invalid_value(name, "simulated registry failure"));
        }
        self.node.get_parameter(name)
    }
}

pub fn node_with_overrides(overrides: &[(&str, ParameterValue)]) -> Node {
    let overrides = overrides
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect();
    NodeBuilder::new("bno055")
        .with_parameter_overrides(overrides)
        .build()
        .expect("node")
}
