use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
/// Raw YAML schema definition.
pub struct SchemaDefinition {
    #[serde(default)]
    /// Optional human-readable name.
    pub name: Option<String>,

    #[serde(default)]
    /// Field definitions, in declaration order.
    pub fields: Vec<FieldDefinition>,
}

#[derive(Debug, Clone, Deserialize)]
/// Raw YAML definition of one field.
pub struct FieldDefinition {
    #[serde(default)]
    /// Field name; tags with this name bind to the field.
    pub name: String,

    #[serde(rename = "type", default)]
    /// Content type (defaults to `text`).
    pub field_type: FieldType,

    #[serde(default)]
    /// Optional constraints.
    pub constraints: Constraints,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
/// The kind of content a field holds.
pub enum FieldType {
    /// Free text (may embed `~f[...]` formulas).
    #[default]
    Text,
    /// A decimal number.
    Number,
    /// A Latex formula body.
    Latex,
    /// A container of other fields; its own text is not constrained.
    Group,
    /// A marker element; content is ignored.
    Flag,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
/// Constraints checked by structural validation.
pub struct Constraints {
    #[serde(default)]
    /// At least one occurrence must exist in the document.
    pub required: bool,

    #[serde(default)]
    /// Maximum number of occurrences, if bounded.
    pub max_occurs: Option<usize>,

    #[serde(default)]
    /// Regex the element content must match (whole content).
    pub pattern: Option<String>,

    #[serde(default)]
    /// Allowed parent field names. Empty means "anywhere".
    pub parents: Vec<String>,

    #[serde(default)]
    /// Allowed attribute names. Empty means "any attribute".
    pub attributes: Vec<String>,
}
