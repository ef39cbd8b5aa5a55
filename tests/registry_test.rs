//! Tests for command registry operations.

use serde_json::{json, Value};
use validated_command::{
    BoxError, CanonicalInput, CommandRegistry, ErrorKind, ErrorTree, InputError, KeyPath,
    RegistryError, Schema, ValidatedCommand,
};

type Step = fn(&CanonicalInput, &mut ErrorTree) -> Result<Value, BoxError>;

fn greet(inputs: &CanonicalInput, _: &mut ErrorTree) -> Result<Value, BoxError> {
    let name = inputs.get("name").and_then(Value::as_str).unwrap_or_default();
    Ok(json!(format!("hello {}", name)))
}

fn greeter() -> ValidatedCommand<validated_command::ObjectSchema, Step> {
    ValidatedCommand::new(
        Schema::object().field("name", Schema::string().min_size(1)),
        greet as Step,
    )
}

#[test]
fn test_register_and_contains() {
    let registry = CommandRegistry::new();
    assert!(registry.is_empty());

    registry.register("greet", greeter()).unwrap();

    assert!(registry.contains("greet"));
    assert!(!registry.contains("missing"));
    assert_eq!(registry.len(), 1);
}

#[test]
fn test_duplicate_registration_fails() {
    let registry = CommandRegistry::new();
    registry.register("greet", greeter()).unwrap();

    let result = registry.register("greet", greeter());
    assert!(matches!(result, Err(RegistryError::DuplicateName(name)) if name == "greet"));
}

#[test]
fn test_names_are_sorted() {
    let registry = CommandRegistry::new();
    registry.register("zeta", greeter()).unwrap();
    registry.register("alpha", greeter()).unwrap();

    assert_eq!(registry.names(), vec!["alpha", "zeta"]);
}

#[test]
fn test_call_by_name() {
    let registry = CommandRegistry::new();
    registry.register("greet", greeter()).unwrap();

    let result = registry.call("greet", [json!({"name": "Alice"})]).unwrap();
    assert_eq!(result.into_result().unwrap(), json!("hello Alice"));
}

#[test]
fn test_call_reports_validation_errors() {
    let registry = CommandRegistry::new();
    registry.register("greet", greeter()).unwrap();

    let outcome = registry.run("greet", [json!({"name": ""})]).unwrap();

    let atom = outcome
        .errors()
        .unwrap()
        .atom_at(&KeyPath::from_field("name"))
        .unwrap();
    assert_eq!(atom.kind(), &ErrorKind::MinLength);
}

#[test]
fn test_missing_command() {
    let registry = CommandRegistry::new();

    let result = registry.call("Missing", [json!({})]);
    match result {
        Err(RegistryError::CommandNotFound(name)) => assert_eq!(name, "Missing"),
        _ => panic!("Expected CommandNotFound error"),
    }
}

#[test]
fn test_invalid_fragment_is_an_input_error() {
    let registry = CommandRegistry::new();
    registry.register("greet", greeter()).unwrap();

    let result = registry.run("greet", [json!(42)]);
    assert!(matches!(
        result,
        Err(RegistryError::Input(InputError::InvalidFragmentKind { position: 0, .. }))
    ));
}

#[test]
fn test_clones_share_commands() {
    let registry = CommandRegistry::default();
    let clone = registry.clone();

    clone.register("greet", greeter()).unwrap();

    assert!(registry.contains("greet"));
}

#[test]
fn test_registry_error_messages() {
    assert_eq!(
        RegistryError::DuplicateName("a".into()).to_string(),
        "command 'a' already registered"
    );
    assert_eq!(
        RegistryError::CommandNotFound("b".into()).to_string(),
        "command 'b' not found"
    );
}
