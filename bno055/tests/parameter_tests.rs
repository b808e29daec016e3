//! Integration tests for the node parameter registry.

use std::collections::HashMap;

use bno055::prelude::*;

/// Test declare/get/set on a single node.
#[test]
fn test_parameter_local_api() {
    let node = NodeBuilder::new("param_test_node").build().expect("node");

    let desc = ParameterDescriptor::new("my_int", ParameterType::Integer);
    let initial = node
        .declare_parameter("my_int", ParameterValue::Integer(42), desc)
        .expect("declare");
    assert_eq!(initial, ParameterValue::Integer(42));
    assert_eq!(
        node.get_parameter("my_int").unwrap(),
        ParameterValue::Integer(42)
    );

    node.set_parameter(Parameter::new("my_int", ParameterValue::Integer(100)))
        .expect("set should succeed");
    assert_eq!(
        node.get_parameter("my_int").unwrap(),
        ParameterValue::Integer(100)
    );

    // Cannot set wrong type
    let bad = node.set_parameter(Parameter::new("my_int", ParameterValue::Bool(true)));
    assert!(matches!(bad, Err(ParameterError::TypeMismatch { .. })));

    node.undeclare_parameter("my_int").expect("undeclare");
    assert!(matches!(
        node.get_parameter("my_int"),
        Err(ParameterError::NotDeclared(_))
    ));
}

/// Test read-only parameter enforcement.
#[test]
fn test_read_only_parameter() {
    let node = NodeBuilder::new("readonly_test_node").build().expect("node");

    let mut desc = ParameterDescriptor::new("fixed", ParameterType::String);
    desc.read_only = true;
    node.declare_parameter("fixed", ParameterValue::String("immutable".into()), desc)
        .expect("declare");

    let bad = node
        .set_parameter(Parameter::new(
            "fixed",
            ParameterValue::String("changed".into()),
        ))
        .unwrap_err();
    assert!(bad.to_string().contains("read-only"));

    assert_eq!(
        node.get_parameter("fixed").unwrap(),
        ParameterValue::String("immutable".into())
    );
}

/// Test parameter overrides applied at declaration time.
#[test]
fn test_parameter_overrides() {
    let mut overrides = HashMap::new();
    overrides.insert("count".to_string(), ParameterValue::Integer(99));

    let node = NodeBuilder::new("override_test_node")
        .with_parameter_overrides(overrides)
        .build()
        .expect("node");

    let desc = ParameterDescriptor::new("count", ParameterType::Integer);
    let initial = node
        .declare_parameter("count", ParameterValue::Integer(1), desc)
        .expect("declare");

    // Override wins over default
    assert_eq!(initial, ParameterValue::Integer(99));
    assert_eq!(
        node.get_parameter("count").unwrap(),
        ParameterValue::Integer(99)
    );
}

/// Test that a rejected override leaves the parameter undeclared.
#[test]
fn test_rejected_override() {
    let mut overrides = HashMap::new();
    overrides.insert("rate".to_string(), ParameterValue::Integer(500));

    let node = NodeBuilder::new("range_test_node")
        .with_parameter_overrides(overrides)
        .build()
        .expect("node");

    let desc =
        ParameterDescriptor::new("rate", ParameterType::Integer).with_integer_range(1, 100);
    let err = node
        .declare_parameter("rate", ParameterValue::Integer(10), desc)
        .unwrap_err();
    assert!(matches!(err, ParameterError::InvalidValue { .. }));
    assert!(!node.has_parameter("rate"));
}

/// Test the parameter file is matched against the namespaced node name.
#[test]
fn test_namespaced_parameter_file() {
    let path = std::env::temp_dir().join(format!(
        "bno055_namespaced_{}.yaml",
        std::process::id()
    ));
    std::fs::write(
        &path,
        r#"
/robot/**:
  ros__parameters:
    frame_id: "robot_imu"
/bno055:
  ros__parameters:
    frame_id: "root_imu"
"#,
    )
    .unwrap();

    let node = NodeBuilder::new("bno055")
        .with_namespace("/robot")
        .with_parameter_file(&path)
        .expect("parameter file")
        .build()
        .expect("node");
    std::fs::remove_file(&path).unwrap();

    assert_eq!(node.fully_qualified_name(), "/robot/bno055");
    assert_eq!(
        node.declare_parameter(
            "frame_id",
            ParameterValue::from("bno055"),
            ParameterDescriptor::default(),
        )
        .unwrap(),
        ParameterValue::from("robot_imu")
    );
}

#[test]
fn test_missing_parameter_file() {
    let err = NodeBuilder::new("bno055")
        .with_parameter_file(std::path::Path::new("/nonexistent/bno055_params.yaml"))
        .unwrap_err();
    assert!(matches!(err, ParameterError::Io { .. }));
}

/// Test multiple parameter types.
#[test]
fn test_parameter_types() {
    let node = NodeBuilder::new("types_test_node").build().expect("node");

    let cases: Vec<(&str, ParameterType, ParameterValue)> = vec![
        ("b", ParameterType::Bool, ParameterValue::Bool(true)),
        ("i", ParameterType::Integer, ParameterValue::Integer(-10)),
        ("f", ParameterType::Double, ParameterValue::Double(2.5)),
        (
            "s",
            ParameterType::String,
            ParameterValue::String("hello".into()),
        ),
        (
            "ba",
            ParameterType::ByteArray,
            ParameterValue::ByteArray(vec![1, 2, 3]),
        ),
        (
            "ia",
            ParameterType::IntegerArray,
            ParameterValue::IntegerArray(vec![10, 20, 30]),
        ),
        (
            "fa",
            ParameterType::DoubleArray,
            ParameterValue::DoubleArray(vec![1.1, 2.2]),
        ),
        (
            "sa",
            ParameterType::StringArray,
            ParameterValue::StringArray(vec!["x".into(), "y".into()]),
        ),
    ];

    for (name, ty, value) in cases {
        let desc = ParameterDescriptor::new(name, ty);
        node.declare_parameter(name, value.clone(), desc)
            .expect("declare");
        assert_eq!(node.get_parameter(name).unwrap(), value);
        assert_eq!(node.describe_parameter(name).unwrap().type_, ty);
    }

    assert_eq!(node.list_parameters().len(), 8);
}

/// Test a node shared across threads.
#[test]
fn test_concurrent_access() {
    let node = NodeBuilder::new("shared_node").build().expect("node");
    node.declare_parameter(
        "counter",
        ParameterValue::Integer(0),
        ParameterDescriptor::default(),
    )
    .unwrap();

    let handles: Vec<_> = (1..=4)
        .map(|i| {
            let node = node.clone();
            std::thread::spawn(move || {
                node.set_parameter(Parameter::new("counter", ParameterValue::Integer(i)))
                    .expect("set");
                node.get_parameter("counter").expect("get")
            })
        })
        .collect();

    for handle in handles {
        let value = handle.join().expect("thread");
        assert!(matches!(value, ParameterValue::Integer(1..=4)));
    }
}
