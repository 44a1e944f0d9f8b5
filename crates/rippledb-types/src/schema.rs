use std::collections::HashMap;

use thiserror::Error;

use crate::change::Change;

/// Metadata for one field of an [`EntityDescriptor`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    pub name: String,
    /// Whether an upsert's `patch` must include this field to be considered
    /// well-formed for the entity (not enforced by the merge algebra, which
    /// is schema-agnostic — only by adapters that opt into validation via
    /// [`SchemaRegistry::validate_patch`]).
    pub required: bool,
}

impl FieldDescriptor {
    pub fn new(name: impl Into<String>, required: bool) -> Self {
        Self {
            name: name.into(),
            required,
        }
    }
}

/// Runtime metadata for one entity type (spec §9: "a target implementation
/// should model entities as a closed variant or as a string-keyed map with
/// per-entity validators, not as inheritance"). `rippledb` takes the
/// string-keyed-map route so new entities can be registered without a
/// recompile of the core crates.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EntityDescriptor {
    pub name: String,
    pub fields: Vec<FieldDescriptor>,
}

impl EntityDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    #[must_use]
    pub fn field(mut self, field: FieldDescriptor) -> Self {
        self.fields.push(field);
        self
    }

    fn field_names(&self) -> std::collections::HashSet<&str> {
        self.fields.iter().map(|f| f.name.as_str()).collect()
    }
}

/// Errors raised by [`SchemaRegistry::validate_patch`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SchemaError {
    #[error("entity {0:?} is not registered")]
    UnknownEntity(String),

    #[error("entity {entity:?} has no field {field:?}")]
    UnknownField { entity: String, field: String },

    #[error("entity {entity:?} is missing required field {field:?}")]
    MissingRequiredField { entity: String, field: String },
}

/// A small, append-only, runtime registry of [`EntityDescriptor`]s (spec
/// §9). Adapters query it to validate patches or drive UI form generation;
/// the core merge algebra never consults it — merge is schema-agnostic.
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    entities: HashMap<String, EntityDescriptor>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers (or replaces) the descriptor for one entity. Fluent:
    /// `registry.register(desc_a).register(desc_b)`.
    #[must_use]
    pub fn register(mut self, descriptor: EntityDescriptor) -> Self {
        self.entities.insert(descriptor.name.clone(), descriptor);
        self
    }

    pub fn get(&self, entity: &str) -> Option<&EntityDescriptor> {
        self.entities.get(entity)
    }

    /// Validates a `Change`'s patch against its entity's descriptor: every
    /// patched field must be declared, and every required field must be
    /// present. Unregistered entities are not validated (adapters may
    /// choose to register only the entities they care about).
    pub fn validate_patch(&self, change: &Change) -> Result<(), SchemaError> {
        let Some(descriptor) = self.entities.get(change.entity()) else {
            return Ok(());
        };
        let known = descriptor.field_names();
        for field in change.patch().keys() {
            if !known.contains(field.as_str()) {
                return Err(SchemaError::UnknownField {
                    entity: change.entity().to_string(),
                    field: field.clone(),
                });
            }
        }
        for field in &descriptor.fields {
            if field.required && !change.patch().contains_key(&field.name) {
                return Err(SchemaError::MissingRequiredField {
                    entity: change.entity().to_string(),
                    field: field.name.clone(),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::change::MakeUpsert;
    use rippledb_hlc::Hlc;
    use std::collections::HashMap as Map;

    fn todo_registry() -> SchemaRegistry {
        SchemaRegistry::new().register(
            EntityDescriptor::new("todo")
                .field(FieldDescriptor::new("title", true))
                .field(FieldDescriptor::new("done", false)),
        )
    }

    #[test]
    fn unregistered_entity_is_not_validated() {
        let registry = SchemaRegistry::new();
        let change = Change::make_upsert(MakeUpsert {
            stream: "s".into(),
            entity: "whatever".into(),
            entity_id: "1".into(),
            patch: Map::from([("x".to_string(), serde_json::json!(1))]),
            hlc: Hlc::new(1, 0, "a"),
        });
        assert!(registry.validate_patch(&change).is_ok());
    }

    #[test]
    fn rejects_unknown_field() {
        let registry = todo_registry();
        let change = Change::make_upsert(MakeUpsert {
            stream: "s".into(),
            entity: "todo".into(),
            entity_id: "1".into(),
            patch: Map::from([
                ("title".to_string(), serde_json::json!("hi")),
                ("bogus".to_string(), serde_json::json!(1)),
            ]),
            hlc: Hlc::new(1, 0, "a"),
        });
        assert!(matches!(
            registry.validate_patch(&change),
            Err(SchemaError::UnknownField { .. })
        ));
    }

    #[test]
    fn rejects_missing_required_field() {
        let registry = todo_registry();
        let change = Change::make_upsert(MakeUpsert {
            stream: "s".into(),
            entity: "todo".into(),
            entity_id: "1".into(),
            patch: Map::from([("done".to_string(), serde_json::json!(true))]),
            hlc: Hlc::new(1, 0, "a"),
        });
        assert!(matches!(
            registry.validate_patch(&change),
            Err(SchemaError::MissingRequiredField { .. })
        ));
    }

    #[test]
    fn accepts_well_formed_patch() {
        let registry = todo_registry();
        let change = Change::make_upsert(MakeUpsert {
            stream: "s".into(),
            entity: "todo".into(),
            entity_id: "1".into(),
            patch: Map::from([("title".to_string(), serde_json::json!("hi"))]),
            hlc: Hlc::new(1, 0, "a"),
        });
        assert!(registry.validate_patch(&change).is_ok());
    }
}
