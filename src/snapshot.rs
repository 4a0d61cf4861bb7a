//! Write snapshots: the state of one record as handed over for an outbound write.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{NormalizeError, Result};
use crate::schema::RelationshipKind;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeValue {
    pub value: Value,
    #[serde(rename = "type")]
    pub declared_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelatedRecord {
    pub id: String,
    pub model_name: String,
}

impl RelatedRecord {
    pub fn new(id: &str, model_name: &str) -> Self {
        Self {
            id: id.to_owned(),
            model_name: model_name.to_owned(),
        }
    }
}

pub trait Snapshot {
    fn model_name(&self) -> &str;
    /// Attributes in declaration order.
    fn attributes(&self) -> &[(String, AttributeValue)];
    /// Relationship keys with their kind, in declaration order.
    fn relationships(&self) -> Vec<(&str, RelationshipKind)>;
    /// The related record, or `None` when the relationship is unset.
    fn belongs_to(&self, key: &str) -> Option<&RelatedRecord>;
    /// The related records, or `None` when the relationship is unset.
    fn has_many(&self, key: &str) -> Option<&[RelatedRecord]>;
}

#[derive(Debug, Clone, PartialEq)]
pub enum SnapshotRelationship {
    BelongsTo(Option<RelatedRecord>),
    HasMany(Option<Vec<RelatedRecord>>),
}

impl SnapshotRelationship {
    pub fn kind(&self) -> RelationshipKind {
        match self {
            SnapshotRelationship::BelongsTo(_) => RelationshipKind::BelongsTo,
            SnapshotRelationship::HasMany(_) => RelationshipKind::HasMany,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecordSnapshot {
    model_name: String,
    attributes: Vec<(String, AttributeValue)>,
    relationships: Vec<(String, SnapshotRelationship)>,
}

impl RecordSnapshot {
    pub fn new(model_name: &str) -> Self {
        Self {
            model_name: model_name.to_owned(),
            attributes: Vec::new(),
            relationships: Vec::new(),
        }
    }
    pub fn attribute(mut self, key: &str, value: Value, declared_type: &str) -> Self {
        let attribute = AttributeValue { value, declared_type: declared_type.to_owned() };
        match self.attributes.iter_mut().find(|(k, _)| k == key) {
            Some((_, existing)) => *existing = attribute,
            None => self.attributes.push((key.to_owned(), attribute)),
        }
        self
    }
    pub fn belongs_to(self, key: &str, related: Option<RelatedRecord>) -> Self {
        self.relationship(key, SnapshotRelationship::BelongsTo(related))
    }
    pub fn has_many(self, key: &str, related: Vec<RelatedRecord>) -> Self {
        self.relationship(key, SnapshotRelationship::HasMany(Some(related)))
    }
    /// Declares a hasMany that is not set, as opposed to set but empty.
    pub fn has_many_unset(self, key: &str) -> Self {
        self.relationship(key, SnapshotRelationship::HasMany(None))
    }
    fn relationship(mut self, key: &str, relationship: SnapshotRelationship) -> Self {
        match self.relationships.iter_mut().find(|(k, _)| k == key) {
            Some((_, existing)) => *existing = relationship,
            None => self.relationships.push((key.to_owned(), relationship)),
        }
        self
    }
    fn find(&self, key: &str) -> Option<&SnapshotRelationship> {
        self.relationships.iter().find(|(k, _)| k == key).map(|(_, r)| r)
    }

    /// Reads a snapshot written as
    /// `{"modelName": "project", "attributes": {"title": {"value": "T", "type": "string"}},
    ///   "relationships": {"author": {"kind": "belongsTo", "data": {"id": "1", "modelName": "user"}}}}`.
    pub fn from_json(json: &str) -> Result<Self> {
        let definition: SnapshotDefinition = serde_json::from_str(json)?;
        let mut snapshot = RecordSnapshot::new(&definition.model_name);
        for (key, attribute) in definition.attributes {
            let attribute: AttributeValue = serde_json::from_value(attribute)?;
            snapshot = snapshot.attribute(&key, attribute.value, &attribute.declared_type);
        }
        for (key, relationship) in definition.relationships {
            let relationship: RelationshipDefinition = serde_json::from_value(relationship)?;
            let relationship = match relationship.kind {
                RelationshipKind::BelongsTo => {
                    let related: Option<RelatedRecord> = serde_json::from_value(relationship.data)?;
                    SnapshotRelationship::BelongsTo(related)
                }
                RelationshipKind::HasMany => {
                    let related: Option<Vec<RelatedRecord>> = serde_json::from_value(relationship.data)?;
                    SnapshotRelationship::HasMany(related)
                }
            };
            snapshot = snapshot.relationship(&key, relationship);
        }
        if snapshot.model_name.is_empty() {
            return Err(NormalizeError::Json("snapshot has no model name".to_owned()));
        }
        Ok(snapshot)
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SnapshotDefinition {
    model_name: String,
    #[serde(default)]
    attributes: Map<String, Value>,
    #[serde(default)]
    relationships: Map<String, Value>,
}

#[derive(Deserialize)]
struct RelationshipDefinition {
    kind: RelationshipKind,
    #[serde(default)]
    data: Value,
}

impl Snapshot for RecordSnapshot {
    fn model_name(&self) -> &str {
        &self.model_name
    }
    fn attributes(&self) -> &[(String, AttributeValue)] {
        &self.attributes
    }
    fn relationships(&self) -> Vec<(&str, RelationshipKind)> {
        self.relationships.iter().map(|(k, r)| (k.as_str(), r.kind())).collect()
    }
    fn belongs_to(&self, key: &str) -> Option<&RelatedRecord> {
        match self.find(key) {
            Some(SnapshotRelationship::BelongsTo(related)) => related.as_ref(),
            _ => None,
        }
    }
    fn has_many(&self, key: &str) -> Option<&[RelatedRecord]> {
        match self.find(key) {
            Some(SnapshotRelationship::HasMany(related)) => related.as_deref(),
            _ => None,
        }
    }
}
