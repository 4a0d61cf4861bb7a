//! The normalized document: resources, resource identifiers and the included list.
//!
//! Every type here serializes (via serde) to the canonical wire shape:
//! `{ "data": Resource | [Resource], "included": [Resource] }` where a resource is
//! `{ "type", "id", "attributes", "relationships" }` and relationship data only ever
//! holds `{ "type", "id" }` identifiers.

use std::collections::HashSet;

use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::schema::OtherHasher;

// ------------- ResourceIdentifier -------------
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ResourceIdentifier {
    #[serde(rename = "type")]
    pub resource_type: String,
    pub id: String,
}

impl ResourceIdentifier {
    pub fn new(resource_type: &str, id: &str) -> Self {
        Self {
            resource_type: resource_type.to_owned(),
            id: id.to_owned(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum RelationshipData {
    One(ResourceIdentifier),
    Many(Vec<ResourceIdentifier>),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Relationship {
    pub data: RelationshipData,
}

/// Relationships of a resource in schema declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Relationships(Vec<(String, Relationship)>);

impl Relationships {
    pub fn new() -> Self {
        Self(Vec::new())
    }
    pub fn insert(&mut self, key: &str, data: RelationshipData) {
        let relationship = Relationship { data };
        match self.0.iter_mut().find(|(k, _)| k == key) {
            Some((_, existing)) => *existing = relationship,
            None => self.0.push((key.to_owned(), relationship)),
        }
    }
    pub fn get(&self, key: &str) -> Option<&Relationship> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, r)| r)
    }
    pub fn len(&self) -> usize {
        self.0.len()
    }
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for Relationships {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (key, relationship) in &self.0 {
            map.serialize_entry(key, relationship)?;
        }
        map.end()
    }
}

// ------------- Resource -------------
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Resource {
    #[serde(rename = "type")]
    pub resource_type: String,
    pub id: String,
    pub attributes: Map<String, Value>,
    pub relationships: Relationships,
}

impl Resource {
    pub fn new(resource_type: &str, id: &str) -> Self {
        Self {
            resource_type: resource_type.to_owned(),
            id: id.to_owned(),
            attributes: Map::new(),
            relationships: Relationships::new(),
        }
    }
    pub fn identifier(&self) -> ResourceIdentifier {
        ResourceIdentifier::new(&self.resource_type, &self.id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PrimaryData {
    Single(Resource),
    Many(Vec<Resource>),
}

impl PrimaryData {
    pub fn resources(&self) -> &[Resource] {
        match self {
            PrimaryData::Single(resource) => std::slice::from_ref(resource),
            PrimaryData::Many(resources) => resources.as_slice(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedDocument {
    pub data: PrimaryData,
    pub included: Vec<Resource>,
}

impl NormalizedDocument {
    pub fn to_value(&self) -> serde_json::Result<Value> {
        serde_json::to_value(self)
    }
}

// ------------- IncludedAccumulator -------------
/// Side list of embedded resources collected during one normalization.
/// A resource is kept once per `(type, id)`; later copies are discarded.
#[derive(Debug, Default)]
pub struct IncludedAccumulator {
    kept: Vec<Resource>,
    seen: HashSet<ResourceIdentifier, OtherHasher>,
}

impl IncludedAccumulator {
    pub fn new() -> Self {
        Self::default()
    }
    /// Returns false when a resource with the same identifier was already kept.
    pub fn keep(&mut self, resource: Resource) -> bool {
        if self.seen.insert(resource.identifier()) {
            self.kept.push(resource);
            true
        } else {
            false
        }
    }
    pub fn contains(&self, identifier: &ResourceIdentifier) -> bool {
        self.seen.contains(identifier)
    }
    pub fn len(&self) -> usize {
        self.kept.len()
    }
    pub fn is_empty(&self) -> bool {
        self.kept.is_empty()
    }
    /// Releases the kept resources in first-seen order, leaving out any that
    /// duplicate one of the primary resources.
    pub fn into_included(self, primary: &[Resource]) -> Vec<Resource> {
        let primary: HashSet<ResourceIdentifier, OtherHasher> = primary.iter().map(Resource::identifier).collect();
        self.kept
            .into_iter()
            .filter(|resource| !primary.contains(&resource.identifier()))
            .collect()
    }
}
