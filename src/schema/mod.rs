//! A small reference schema engine.
//!
//! The schema types here validate JSON values and report every failure in
//! the engine vocabulary (`str?`, `min_size?`, `included_in?`, ...) that the
//! error compiler understands. [`ObjectSchema`] implements
//! [`SchemaEngine`](crate::SchemaEngine), so it can guard a command directly.
//!
//! # Example
//!
//! ```rust
//! use validated_command::{CanonicalInput, Schema, SchemaEngine};
//! use serde_json::json;
//!
//! let schema = Schema::object()
//!     .field("name", Schema::string().min_size(1))
//!     .field("tags", Schema::array(Schema::string()));
//!
//! let input = CanonicalInput::build([json!({"name": "", "tags": ["a", 1]})]).unwrap();
//! let result = schema.apply(&input);
//!
//! assert_eq!(result.failures.leaf_count(), 2);
//! ```

mod array;
mod boolean;
mod numeric;
mod object;
mod string;
mod traits;

pub use array::ArraySchema;
pub use boolean::BooleanSchema;
pub use numeric::IntegerSchema;
pub use object::ObjectSchema;
pub use string::StringSchema;
pub use traits::SchemaLike;

/// Entry point for creating schemas.
pub struct Schema;

impl Schema {
    /// Creates a new string schema (`str?`).
    ///
    /// # Example
    ///
    /// ```rust
    /// use validated_command::{KeyPath, Schema, SchemaLike};
    /// use serde_json::json;
    ///
    /// let schema = Schema::string().min_size(5);
    ///
    /// assert!(schema.validate(&json!("hello"), &KeyPath::root()).is_success());
    /// assert!(schema.validate(&json!("hi"), &KeyPath::root()).is_failure());
    /// ```
    pub fn string() -> StringSchema {
        StringSchema::new()
    }

    /// Creates a new integer schema (`int?`).
    pub fn integer() -> IntegerSchema {
        IntegerSchema::new()
    }

    /// Creates a new boolean schema (`bool?`).
    pub fn boolean() -> BooleanSchema {
        BooleanSchema::new()
    }

    /// Creates a new object schema (`hash?`).
    pub fn object() -> ObjectSchema {
        ObjectSchema::new()
    }

    /// Creates a new array schema (`array?`) with the given item schema.
    pub fn array<S: SchemaLike + 'static>(item_schema: S) -> ArraySchema {
        ArraySchema::new(item_schema)
    }
}
