use thiserror::Error;

#[derive(Debug, Error)]
/// Errors produced while loading or validating a schema.
pub enum SchemaError {
    #[error("YAML parse error: {0}")]
    /// YAML parsing failed.
    Yaml(#[from] serde_yaml::Error),

    #[error("I/O error: {0}")]
    /// Filesystem I/O failed.
    Io(#[from] std::io::Error),

    #[error("missing required field: {0}")]
    /// A required entry was missing or empty in a field definition.
    MissingField(&'static str),

    #[error("duplicate field '{0}'")]
    /// Two fields share a name.
    DuplicateField(String),

    #[error("field '{field}' names unknown parent '{parent}'")]
    /// A `parents` constraint references a field that does not exist.
    UnknownParent {
        /// The field carrying the constraint.
        field: String,
        /// The unresolved parent name.
        parent: String,
    },

    #[error("regex compile error for pattern '{pattern}': {message}")]
    /// A `pattern` constraint failed to compile.
    RegexCompile {
        /// The regex pattern string.
        pattern: String,
        /// The compiler error message.
        message: String,
    },
}
