//! Model schemas and the registry that resolves a type name to its schema.
//!
//! A [`ModelSchema`] declares the scalar attributes of a type together with its
//! relationships. Schemas are immutable after construction and are owned by a
//! [`SchemaKeeper`], following the same keeper pattern used elsewhere in the crate:
//! the keeper owns each schema behind an `Arc` and guarantees one schema per name.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::fs;
use std::hash::BuildHasherDefault;
use std::path::Path;
use std::sync::Arc;

use seahash::SeaHasher;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{NormalizeError, Result};

pub type OtherHasher = BuildHasherDefault<SeaHasher>;

// ------------- Relationship -------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RelationshipKind {
    BelongsTo,
    HasMany,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationshipOptions {
    #[serde(default, rename = "async")]
    pub is_async: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationshipDescriptor {
    pub kind: RelationshipKind,
    #[serde(rename = "type")]
    pub related_type: String,
    #[serde(default)]
    pub options: RelationshipOptions,
}

impl RelationshipDescriptor {
    pub fn new(kind: RelationshipKind, related_type: &str, is_async: bool) -> Self {
        Self {
            kind,
            related_type: related_type.to_owned(),
            options: RelationshipOptions { is_async },
        }
    }
}

// ------------- ModelSchema -------------
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelSchema {
    type_name: String,
    attribute_names: Vec<String>,
    relationships: Vec<(String, RelationshipDescriptor)>,
}

impl ModelSchema {
    /// Creates a schema without relationships. Repeated attribute names are kept once,
    /// in the position of their first occurrence.
    pub fn new<I, S>(type_name: &str, attribute_names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut names: Vec<String> = Vec::new();
        for name in attribute_names {
            let name = name.into();
            if !names.contains(&name) {
                names.push(name);
            }
        }
        Self {
            type_name: type_name.to_owned(),
            attribute_names: names,
            relationships: Vec::new(),
        }
    }
    pub fn belongs_to(self, key: &str, related_type: &str, is_async: bool) -> Self {
        self.relationship(key, RelationshipDescriptor::new(RelationshipKind::BelongsTo, related_type, is_async))
    }
    pub fn has_many(self, key: &str, related_type: &str, is_async: bool) -> Self {
        self.relationship(key, RelationshipDescriptor::new(RelationshipKind::HasMany, related_type, is_async))
    }
    /// Declares a relationship; a later declaration for the same key replaces the earlier one.
    pub fn relationship(mut self, key: &str, descriptor: RelationshipDescriptor) -> Self {
        match self.relationships.iter_mut().find(|(k, _)| k == key) {
            Some((_, existing)) => *existing = descriptor,
            None => self.relationships.push((key.to_owned(), descriptor)),
        }
        self
    }
    pub fn type_name(&self) -> &str {
        &self.type_name
    }
    pub fn attribute_names(&self) -> &[String] {
        &self.attribute_names
    }
    pub fn relationships(&self) -> &[(String, RelationshipDescriptor)] {
        &self.relationships
    }
    pub fn relationship_for(&self, key: &str) -> Option<&RelationshipDescriptor> {
        self.relationships.iter().find(|(k, _)| k == key).map(|(_, d)| d)
    }
    /// Name of the root field holding a collection of this type.
    pub fn plural_name(&self) -> String {
        format!("{}s", self.type_name)
    }
}

// Shape of a schema in a schema file. Relationships are written as an object so
// that the file reads naturally; declaration order is kept by serde_json.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SchemaDefinition {
    type_name: String,
    #[serde(default)]
    attributes: Vec<String>,
    #[serde(default)]
    relationships: serde_json::Map<String, Value>,
}

impl SchemaDefinition {
    fn into_schema(self) -> Result<ModelSchema> {
        let mut schema = ModelSchema::new(&self.type_name, self.attributes);
        for (key, descriptor) in self.relationships {
            let descriptor: RelationshipDescriptor = serde_json::from_value(descriptor).map_err(|e| {
                NormalizeError::Config(format!("relationship '{}' of '{}': {}", key, self.type_name, e))
            })?;
            schema = schema.relationship(&key, descriptor);
        }
        Ok(schema)
    }
}

// ------------- Registry -------------
pub trait SchemaRegistry {
    /// Resolves a type name to its schema, failing with `SchemaNotFound` if unknown.
    fn model_for(&self, type_name: &str) -> Result<&ModelSchema>;
}

#[derive(Debug, Default)]
pub struct SchemaKeeper {
    kept: HashMap<String, Arc<ModelSchema>, OtherHasher>,
}

impl SchemaKeeper {
    pub fn new() -> Self {
        Self { kept: HashMap::default() }
    }
    /// Keeps a schema, returning the kept instance and whether one with the same
    /// type name was already kept. A previously kept schema is never replaced.
    pub fn keep(&mut self, schema: ModelSchema) -> (Arc<ModelSchema>, bool) {
        match self.kept.entry(schema.type_name().to_owned()) {
            Entry::Occupied(e) => (Arc::clone(e.get()), true),
            Entry::Vacant(e) => (Arc::clone(e.insert(Arc::new(schema))), false),
        }
    }
    pub fn len(&self) -> usize {
        self.kept.len()
    }
    pub fn is_empty(&self) -> bool {
        self.kept.is_empty()
    }
    /// Reads a JSON array of schema definitions, e.g.
    /// `[{"typeName": "post", "attributes": ["title"], "relationships": {"user": {"kind": "belongsTo", "type": "user"}}}]`.
    pub fn from_json(json: &str) -> Result<Self> {
        let definitions: Vec<SchemaDefinition> = serde_json::from_str(json)?;
        let mut keeper = Self::new();
        for definition in definitions {
            let (schema, previously_kept) = keeper.keep(definition.into_schema()?);
            if previously_kept {
                return Err(NormalizeError::Config(format!("duplicate schema for '{}'", schema.type_name())));
            }
        }
        Ok(keeper)
    }
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }
}

impl SchemaRegistry for SchemaKeeper {
    fn model_for(&self, type_name: &str) -> Result<&ModelSchema> {
        self.kept
            .get(type_name)
            .map(|schema| schema.as_ref())
            .ok_or_else(|| NormalizeError::SchemaNotFound { type_name: type_name.to_owned() })
    }
}

impl FromIterator<ModelSchema> for SchemaKeeper {
    fn from_iter<I: IntoIterator<Item = ModelSchema>>(iter: I) -> Self {
        let mut keeper = Self::new();
        for schema in iter {
            keeper.keep(schema);
        }
        keeper
    }
}
