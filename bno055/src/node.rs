use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, warn};

use crate::{
    Builder,
    error::{ParameterError, Result},
    logging::TracingLogger,
    parameter::{
        Arguments, Parameter, ParameterDescriptor, ParameterRegistry, ParameterStore,
        ParameterValue, yaml,
    },
};

/// The host node of the driver: a name, a namespace, a parameter registry and
/// a logger.
///
/// ```rust,ignore
/// use bno055::prelude::*;
///
/// let node = NodeBuilder::new("bno055")
///     .with_arguments(std::env::args().skip(1))?
///     .build()?;
/// let params = NodeParameters::load(&node, node.logger());
/// ```
#[derive(Debug, Clone)]
pub struct Node {
    name: String,
    namespace: String,
    store: Arc<RwLock<ParameterStore>>,
    logger: TracingLogger,
}

#[derive(Debug, Clone)]
pub struct NodeBuilder {
    pub name: String,
    pub namespace: String,
    /// Initial parameter overrides applied at declaration time.
    pub parameter_overrides: HashMap<String, ParameterValue>,
}

impl NodeBuilder {
    pub fn new<S: AsRef<str>>(name: S) -> Self {
        Self {
            name: name.as_ref().to_owned(),
            namespace: String::new(),
            parameter_overrides: HashMap::new(),
        }
    }

    pub fn with_namespace<S: AsRef<str>>(mut self, namespace: S) -> Self {
        self.namespace = namespace.as_ref().to_owned();
        self
    }

    /// Set initial parameter overrides for this node.
    ///
    /// When a parameter is declared, if an override exists for its name, the
    /// override value replaces the default. This is equivalent to passing
    /// `--ros-args -p name:=value` on the command line.
    pub fn with_parameter_overrides(mut self, overrides: HashMap<String, ParameterValue>) -> Self {
        self.parameter_overrides = overrides;
        self
    }

    /// Load initial parameter values from a ROS 2-style YAML file.
    ///
    /// Values loaded from file are applied as overrides at declaration time
    /// and replace overrides of the same name set earlier.
    pub fn with_parameter_file(mut self, path: &Path) -> Result<Self> {
        let overrides = yaml::load_parameter_file(path, &self.fully_qualified_name())?;
        self.parameter_overrides.extend(overrides);
        Ok(self)
    }

    /// Apply the parameter part of a ROS command line (`--ros-args ...`).
    pub fn with_arguments<I, S>(mut self, args: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let arguments = Arguments::parse(args)?;
        let overrides = arguments.parameter_overrides(&self.fully_qualified_name())?;
        self.parameter_overrides.extend(overrides);
        Ok(self)
    }

    fn fully_qualified_name(&self) -> String {
        fully_qualified_name(&self.namespace, &self.name)
    }
}

impl Builder for NodeBuilder {
    type Output = Node;

    #[tracing::instrument(name = "node_build", skip(self), fields(
        name = %self.name,
        namespace = %self.namespace,
    ))]
    fn build(self) -> Result<Node> {
        if self.name.is_empty() || !self.name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            return Err(ParameterError::InvalidArgument(format!(
                "invalid node name '{}'",
                self.name
            )));
        }

        debug!(
            "[NOD] Building node with {} parameter overrides",
            self.parameter_overrides.len()
        );
        let logger = TracingLogger::new(self.name.clone());
        Ok(Node {
            store: Arc::new(RwLock::new(ParameterStore::with_overrides(
                self.parameter_overrides,
            ))),
            name: self.name,
            namespace: self.namespace,
            logger,
        })
    }
}

impl Node {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// `/{namespace}/{name}`, or `/{name}` in the root namespace.
    pub fn fully_qualified_name(&self) -> String {
        fully_qualified_name(&self.namespace, &self.name)
    }

    pub fn logger(&self) -> &TracingLogger {
        &self.logger
    }

    /// Set the value of a declared parameter. Returns the previous value.
    pub fn set_parameter(&self, param: Parameter) -> Result<ParameterValue> {
        self.store.write().set(&param).inspect_err(|e| {
            warn!("[PARAMS] Rejected set of '{}': {}", param.name, e);
        })
    }

    pub fn undeclare_parameter(&self, name: &str) -> Result<()> {
        self.store.write().undeclare(name)
    }

    pub fn describe_parameter(&self, name: &str) -> Option<ParameterDescriptor> {
        self.store.read().describe(name)
    }

    pub fn has_parameter(&self, name: &str) -> bool {
        self.store.read().has(name)
    }

    /// Names of all declared parameters, sorted.
    pub fn list_parameters(&self) -> Vec<String> {
        self.store.read().names()
    }
}

impl ParameterRegistry for Node {
    fn declare_parameter(
        &self,
        name: &str,
        default: ParameterValue,
        descriptor: ParameterDescriptor,
    ) -> Result<ParameterValue> {
        debug!("[PARAMS] Declaring '{}' (default {})", name, default);
        self.store.write().declare(name, default, descriptor)
    }

    fn get_parameter(&self, name: &str) -> Result<ParameterValue> {
        self.store
            .read()
            .get(name)
            .ok_or_else(|| ParameterError::NotDeclared(name.to_string()))
    }
}

fn fully_qualified_name(namespace: &str, name: &str) -> String {
    let namespace = namespace.trim_end_matches('/');
    if namespace.is_empty() {
        format!("/{}", name)
    } else if namespace.starts_with('/') {
        format!("{}/{}", namespace, name)
    } else {
        format!("/{}/{}", namespace, name)
    }
}
