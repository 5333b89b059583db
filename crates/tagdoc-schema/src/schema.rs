use crate::definition::{Constraints, FieldType, SchemaDefinition};
use crate::error::SchemaError;
use regex::Regex;
use std::collections::HashMap;
use std::path::Path;

/// Index of a field within its [`Schema`] (declaration order).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FieldId(pub usize);

/// A loaded, validated field.
#[derive(Debug, Clone)]
pub struct Field {
    /// Field name.
    pub name: String,
    /// Content type.
    pub field_type: FieldType,
    /// Declared constraints.
    pub constraints: Constraints,
    pattern: Option<Regex>,
}

impl Field {
    /// Returns `true` if `content` satisfies the field's `pattern` constraint
    /// (always `true` when no pattern is declared).
    pub fn matches_pattern(&self, content: &str) -> bool {
        self.pattern.as_ref().is_none_or(|re| re.is_match(content))
    }

    /// Returns `true` if `parent` (a field name, or `None` for top level) may contain this field.
    pub fn allows_parent(&self, parent: Option<&str>) -> bool {
        let parents = &self.constraints.parents;
        parents.is_empty() || parent.is_some_and(|p| parents.iter().any(|allowed| allowed == p))
    }

    /// Returns `true` if the attribute name is allowed on this field.
    pub fn allows_attribute(&self, name: &str) -> bool {
        let attributes = &self.constraints.attributes;
        attributes.is_empty() || attributes.iter().any(|a| a == name)
    }
}

/// An immutable, ordered set of fields.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    name: Option<String>,
    fields: Vec<Field>,
    by_name: HashMap<String, FieldId>,
}

impl Schema {
    /// An empty schema: no tag binds to a field and nothing is validated.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Parses and validates a YAML schema.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, SchemaError> {
        let definition: SchemaDefinition = serde_yaml::from_str(yaml)?;
        Self::from_definition(definition)
    }

    /// Reads, parses and validates a YAML schema file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, SchemaError> {
        let yaml = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&yaml)
    }

    /// Validates a raw definition and builds the schema.
    pub fn from_definition(definition: SchemaDefinition) -> Result<Self, SchemaError> {
        let mut fields = Vec::with_capacity(definition.fields.len());
        let mut by_name = HashMap::new();

        for raw in definition.fields {
            let name = raw.name.trim().to_string();
            if name.is_empty() {
                return Err(SchemaError::MissingField("name"));
            }
            if by_name.contains_key(&name) {
                return Err(SchemaError::DuplicateField(name));
            }

            let pattern = match raw.constraints.pattern.as_deref() {
                Some(p) => Some(Regex::new(&format!("^(?:{p})$")).map_err(|e| {
                    SchemaError::RegexCompile {
                        pattern: p.to_string(),
                        message: e.to_string(),
                    }
                })?),
                None => None,
            };

            by_name.insert(name.clone(), FieldId(fields.len()));
            fields.push(Field {
                name,
                field_type: raw.field_type,
                constraints: raw.constraints,
                pattern,
            });
        }

        // Parent references are resolved once every name is known.
        for field in &fields {
            if let Some(parent) = field
                .constraints
                .parents
                .iter()
                .find(|p| !by_name.contains_key(p.as_str()))
            {
                return Err(SchemaError::UnknownParent {
                    field: field.name.clone(),
                    parent: parent.clone(),
                });
            }
        }

        Ok(Self {
            name: definition.name,
            fields,
            by_name,
        })
    }

    /// Optional schema name.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Looks up a field by name.
    pub fn field(&self, name: &str) -> Option<(FieldId, &Field)> {
        let id = *self.by_name.get(name)?;
        Some((id, &self.fields[id.0]))
    }

    /// Looks up a field by id.
    pub fn field_by_id(&self, id: FieldId) -> Option<&Field> {
        self.fields.get(id.0)
    }

    /// Fields in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = (FieldId, &Field)> {
        self.fields.iter().enumerate().map(|(i, f)| (FieldId(i), f))
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns `true` if the schema declares no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
