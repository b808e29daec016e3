//! Driver node configuration.
//!
//! [`NodeParameters`] declares the BNO055 driver parameters on a node's
//! registry, reads back the effective values and keeps them as typed fields.
//! Loading is all-or-nothing: if any parameter cannot be read, the whole set
//! falls back to the defaults.
//!
//! Start the node with a parameter file to override the defaults:
//!
//! ```text
//! bno055_params --ros-args --params-file bno055/params/bno055_params.yaml
//! ```

use std::collections::HashMap;
use std::time::Duration;

use serde::Serialize;

use crate::{
    error::{ParameterError, ParameterRetrievalError},
    logging::Logger,
    parameter::{ParameterDescriptor, ParameterRegistry, ParameterType, ParameterValue},
};

pub const CONNECTION_TYPE: &str = "connection_type";
pub const UART_PORT: &str = "uart_port";
pub const UART_BAUDRATE: &str = "uart_baudrate";
pub const UART_TIMEOUT: &str = "uart_timeout";
pub const FRAME_ID: &str = "frame_id";
pub const DATA_QUERY_FREQUENCY: &str = "data_query_frequency";
pub const OPERATION_MODE: &str = "operation_mode";
pub const ACC_OFFSET: &str = "acc_offset";
pub const MAG_OFFSET: &str = "mag_offset";
pub const GYR_OFFSET: &str = "gyr_offset";

/// Parameter names in declaration order.
pub const PARAMETER_NAMES: [&str; 10] = [
    CONNECTION_TYPE,
    UART_PORT,
    UART_BAUDRATE,
    UART_TIMEOUT,
    FRAME_ID,
    DATA_QUERY_FREQUENCY,
    OPERATION_MODE,
    ACC_OFFSET,
    MAG_OFFSET,
    GYR_OFFSET,
];

/// How the sensor is attached to the host.
#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    strum::EnumString,
    strum::Display,
    strum::AsRefStr,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ConnectionType {
    #[default]
    Uart,
    I2c,
}

/// BNO055 `OPR_MODE` register values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::FromRepr, strum::Display)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[repr(u8)]
pub enum OperationMode {
    ConfigMode = 0x00,
    AccOnly = 0x01,
    MagOnly = 0x02,
    GyroOnly = 0x03,
    AccMag = 0x04,
    AccGyro = 0x05,
    MagGyro = 0x06,
    Amg = 0x07,
    Imu = 0x08,
    Compass = 0x09,
    M4g = 0x0A,
    NdofFmcOff = 0x0B,
    Ndof = 0x0C,
}

impl OperationMode {
    /// Modes in which the sensor runs its own orientation fusion.
    pub fn is_fusion(self) -> bool {
        matches!(
            self,
            Self::Imu | Self::Compass | Self::M4g | Self::NdofFmcOff | Self::Ndof
        )
    }
}

/// The resolved configuration of one driver node.
///
/// Built once by [`NodeParameters::load`] and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeParameters {
    connection_type: ConnectionType,
    uart_port: String,
    uart_baudrate: u32,
    uart_timeout: f64,
    frame_id: String,
    data_query_frequency: u32,
    operation_mode: u8,
    acc_offset: [i16; 3],
    mag_offset: [i16; 3],
    gyr_offset: [i16; 3],
}

impl Default for NodeParameters {
    fn default() -> Self {
        Self {
            connection_type: ConnectionType::Uart,
            uart_port: "/dev/ttyUSB0".to_string(),
            uart_baudrate: 115200,
            uart_timeout: 0.1,
            frame_id: "bno055".to_string(),
            data_query_frequency: 10,
            operation_mode: OperationMode::Ndof as u8,
            acc_offset: offset_from_words([0xFFEC, 0x00A5, 0xFFE8]),
            mag_offset: offset_from_words([0xFFB4, 0xFE9E, 0x027D]),
            gyr_offset: offset_from_words([0x0002, 0xFFFF, 0xFFFF]),
        }
    }
}

impl NodeParameters {
    /// Declare and read all driver parameters, falling back to the defaults.
    ///
    /// Any failure is logged as a single warning and yields
    /// `NodeParameters::default()` for every field.
    pub fn load<R, L>(registry: &R, logger: &L) -> Self
    where
        R: ParameterRegistry + ?Sized,
        L: Logger + ?Sized,
    {
        Self::try_load(registry, logger).unwrap_or_else(|e| {
            logger.warn(&format!(
                "Could not get parameters...setting variables to default. Error: {}",
                e
            ));
            Self::default()
        })
    }

    /// Declare and read all driver parameters, stopping at the first failure.
    pub fn try_load<R, L>(registry: &R, logger: &L) -> Result<Self, ParameterRetrievalError>
    where
        R: ParameterRegistry + ?Sized,
        L: Logger + ?Sized,
    {
        logger.info("Initializing parameters");
        let declare_failures = declare_all(registry);

        logger.info("Parameters set to:");
        let mut reader = Reader {
            registry,
            logger,
            declare_failures,
        };

        Ok(Self {
            connection_type: reader.read(CONNECTION_TYPE, to_connection_type)?,
            uart_port: reader.read(UART_PORT, to_string)?,
            uart_baudrate: reader.read(UART_BAUDRATE, to_positive_u32)?,
            uart_timeout: reader.read(UART_TIMEOUT, to_positive_seconds)?,
            frame_id: reader.read(FRAME_ID, to_string)?,
            data_query_frequency: reader.read(DATA_QUERY_FREQUENCY, to_positive_u32)?,
            operation_mode: reader.read(OPERATION_MODE, to_operation_mode)?,
            acc_offset: reader.read(ACC_OFFSET, to_offset)?,
            mag_offset: reader.read(MAG_OFFSET, to_offset)?,
            gyr_offset: reader.read(GYR_OFFSET, to_offset)?,
        })
    }

    pub fn connection_type(&self) -> ConnectionType {
        self.connection_type
    }

    pub fn uart_port(&self) -> &str {
        &self.uart_port
    }

    pub fn uart_baudrate(&self) -> u32 {
        self.uart_baudrate
    }

    /// UART read timeout in seconds.
    pub fn uart_timeout(&self) -> f64 {
        self.uart_timeout
    }

    pub fn uart_timeout_duration(&self) -> Duration {
        // Loaded timeouts always fit a Duration
        Duration::from_secs_f64(self.uart_timeout)
    }

    /// tf frame id stamped on published messages.
    pub fn frame_id(&self) -> &str {
        &self.frame_id
    }

    /// How often sensor data is requested, in Hz.
    pub fn data_query_frequency(&self) -> u32 {
        self.data_query_frequency
    }

    /// Interval between two sensor queries.
    pub fn data_query_period(&self) -> Duration {
        Duration::from_secs_f64(1.0 / f64::from(self.data_query_frequency))
    }

    /// Raw `OPR_MODE` code.
    pub fn operation_mode(&self) -> u8 {
        self.operation_mode
    }

    pub fn operation_mode_kind(&self) -> OperationMode {
        // Codes are range-checked when loaded
        OperationMode::from_repr(self.operation_mode).unwrap_or(OperationMode::Ndof)
    }

    /// Accelerometer offset, 1 LSB = 1 mg.
    pub fn acc_offset(&self) -> [i16; 3] {
        self.acc_offset
    }

    /// Magnetometer offset, 1 LSB = 1/16 uT.
    pub fn mag_offset(&self) -> [i16; 3] {
        self.mag_offset
    }

    /// Gyroscope offset, 1 LSB = 1/16 dps.
    pub fn gyr_offset(&self) -> [i16; 3] {
        self.gyr_offset
    }

    /// Render this set as a ROS 2 parameter file for the node `node_fqn`.
    pub fn to_parameter_file(&self, node_fqn: &str) -> Result<String, serde_yaml::Error> {
        #[derive(Serialize)]
        struct Section<'a> {
            #[serde(rename = "ros__parameters")]
            parameters: &'a NodeParameters,
        }

        let mut doc = std::collections::BTreeMap::new();
        doc.insert(node_fqn, Section { parameters: self });
        serde_yaml::to_string(&doc)
    }
}

/// Declare every parameter with its default. Declarations that fail are
/// reported when the parameter is read, so the read loop stays the single
/// point of failure.
fn declare_all<R>(registry: &R) -> HashMap<&'static str, ParameterError>
where
    R: ParameterRegistry + ?Sized,
{
    let mut failures = HashMap::new();
    for (name, default, descriptor) in declarations() {
        match registry.declare_parameter(name, default, descriptor) {
            // Declared by an earlier load; the live value is read below
            Ok(_) | Err(ParameterError::AlreadyDeclared(_)) => {}
            Err(e) => {
                tracing::debug!("[PARAMS] Declaring '{}' failed: {}", name, e);
                failures.insert(name, e);
            }
        }
    }
    failures
}

fn declarations() -> [(&'static str, ParameterValue, ParameterDescriptor); 10] {
    let defaults = NodeParameters::default();
    [
        (
            CONNECTION_TYPE,
            ParameterValue::String(defaults.connection_type.to_string()),
            ParameterDescriptor::new(CONNECTION_TYPE, ParameterType::String)
                .with_description("Type of the sensor connection, either \"uart\" or \"i2c\""),
        ),
        (
            UART_PORT,
            ParameterValue::String(defaults.uart_port),
            ParameterDescriptor::new(UART_PORT, ParameterType::String)
                .with_description("UART port"),
        ),
        (
            UART_BAUDRATE,
            ParameterValue::Integer(defaults.uart_baudrate.into()),
            ParameterDescriptor::new(UART_BAUDRATE, ParameterType::Integer)
                .with_description("UART baud rate")
                .with_integer_range(1, u32::MAX.into()),
        ),
        (
            UART_TIMEOUT,
            ParameterValue::Double(defaults.uart_timeout),
            ParameterDescriptor::new(UART_TIMEOUT, ParameterType::Double)
                .with_description("UART timeout in seconds"),
        ),
        (
            FRAME_ID,
            ParameterValue::String(defaults.frame_id),
            ParameterDescriptor::new(FRAME_ID, ParameterType::String)
                .with_description("tf frame id"),
        ),
        (
            DATA_QUERY_FREQUENCY,
            ParameterValue::Integer(defaults.data_query_frequency.into()),
            ParameterDescriptor::new(DATA_QUERY_FREQUENCY, ParameterType::Integer)
                .with_description("Node timer frequency in Hz, defining how often sensor data is requested")
                .with_integer_range(1, u32::MAX.into()),
        ),
        (
            OPERATION_MODE,
            ParameterValue::Integer(defaults.operation_mode.into()),
            ParameterDescriptor::new(OPERATION_MODE, ParameterType::Integer)
                .with_description("Sensor operation mode")
                .with_integer_range(
                    OperationMode::ConfigMode as i64,
                    OperationMode::Ndof as i64,
                ),
        ),
        (
            ACC_OFFSET,
            ParameterValue::IntegerArray(offset_words(defaults.acc_offset)),
            ParameterDescriptor::new(ACC_OFFSET, ParameterType::IntegerArray)
                .with_description("+/- 2000 units (at max 2G), 1 unit = 1 mg = 0.01 m/s2"),
        ),
        (
            MAG_OFFSET,
            ParameterValue::IntegerArray(offset_words(defaults.mag_offset)),
            ParameterDescriptor::new(MAG_OFFSET, ParameterType::IntegerArray)
                .with_description("+/- 6400 units, 1 unit = 1/16 uT"),
        ),
        (
            GYR_OFFSET,
            ParameterValue::IntegerArray(offset_words(defaults.gyr_offset)),
            ParameterDescriptor::new(GYR_OFFSET, ParameterType::IntegerArray)
                .with_description("+/- 2000 units up to 32000 (dps range dependent), 1 unit = 1/16 dps"),
        ),
    ]
}

/// Reads declared parameters in order, logging each converted value.
struct Reader<'a, R: ?Sized, L: ?Sized> {
    registry: &'a R,
    logger: &'a L,
    declare_failures: HashMap<&'static str, ParameterError>,
}

impl<R, L> Reader<'_, R, L>
where
    R: ParameterRegistry + ?Sized,
    L: Logger + ?Sized,
{
    fn read<T>(
        &mut self,
        name: &'static str,
        convert: fn(&str, &ParameterValue) -> Result<T, ParameterError>,
    ) -> Result<T, ParameterRetrievalError> {
        let value = match self.declare_failures.remove(name) {
            Some(e) => Err(e),
            None => self.registry.get_parameter(name),
        }
        .map_err(|e| ParameterRetrievalError::new(name, e))?;

        let typed = convert(name, &value).map_err(|e| ParameterRetrievalError::new(name, e))?;
        self.logger.info(&format!("{}: {}", name, value));
        Ok(typed)
    }
}

fn type_mismatch(name: &str, expected: ParameterType, value: &ParameterValue) -> ParameterError {
    ParameterError::TypeMismatch {
        name: name.to_string(),
        expected,
        actual: value.parameter_type(),
    }
}

fn to_string(name: &str, value: &ParameterValue) -> Result<String, ParameterError> {
    value
        .as_str()
        .map(str::to_owned)
        .ok_or_else(|| type_mismatch(name, ParameterType::String, value))
}

fn to_connection_type(name: &str, value: &ParameterValue) -> Result<ConnectionType, ParameterError> {
    let text = to_string(name, value)?;
    text.parse().map_err(|_| {
        ParameterError::invalid_value(name, format!("unknown connection type \"{}\"", text))
    })
}

fn to_positive_u32(name: &str, value: &ParameterValue) -> Result<u32, ParameterError> {
    let v = value
        .as_integer()
        .ok_or_else(|| type_mismatch(name, ParameterType::Integer, value))?;
    match u32::try_from(v) {
        Ok(v) if v > 0 => Ok(v),
        _ => Err(ParameterError::invalid_value(
            name,
            format!("{} is not a positive 32-bit integer", v),
        )),
    }
}

fn to_positive_seconds(name: &str, value: &ParameterValue) -> Result<f64, ParameterError> {
    let v = value
        .as_double()
        .ok_or_else(|| type_mismatch(name, ParameterType::Double, value))?;
    if v > 0.0 && Duration::try_from_secs_f64(v).is_ok() {
        Ok(v)
    } else {
        Err(ParameterError::invalid_value(
            name,
            format!("{} is not a positive duration", v),
        ))
    }
}

fn to_operation_mode(name: &str, value: &ParameterValue) -> Result<u8, ParameterError> {
    let v = value
        .as_integer()
        .ok_or_else(|| type_mismatch(name, ParameterType::Integer, value))?;
    u8::try_from(v)
        .ok()
        .and_then(OperationMode::from_repr)
        .map(|mode| mode as u8)
        .ok_or_else(|| {
            ParameterError::invalid_value(name, format!("{:#04x} is not a BNO055 operation mode", v))
        })
}

/// Offsets are given either as raw 16-bit register words (0x0000..=0xFFFF)
/// or as signed values (-0x8000..=0x7FFF).
fn to_offset(name: &str, value: &ParameterValue) -> Result<[i16; 3], ParameterError> {
    let words = value
        .as_integer_array()
        .ok_or_else(|| type_mismatch(name, ParameterType::IntegerArray, value))?;

    let [x, y, z] = words else {
        return Err(ParameterError::invalid_value(
            name,
            format!("expected 3 values, got {}", words.len()),
        ));
    };

    let convert = |w: i64| -> Result<i16, ParameterError> {
        if let Ok(v) = i16::try_from(w) {
            return Ok(v);
        }
        u16::try_from(w)
            .map(|word| word as i16)
            .map_err(|_| ParameterError::invalid_value(name, format!("{} is out of int16 range", w)))
    };

    Ok([convert(*x)?, convert(*y)?, convert(*z)?])
}

const fn offset_from_words(words: [u16; 3]) -> [i16; 3] {
    [words[0] as i16, words[1] as i16, words[2] as i16]
}

fn offset_words(offset: [i16; 3]) -> Vec<i64> {
    offset.iter().map(|&v| i64::from(v as u16)).collect()
}
