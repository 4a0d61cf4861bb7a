//! Inbound direction: raw query responses into normalized documents.
//!
//! A response carries its root under `data`, keyed by the primary type name for a
//! single record (`{"data": {"post": {..}}}`) or by the plural name for a collection
//! (`{"data": {"posts": [..]}}`). Each raw record is reduced to its declared
//! attributes, and every declared relationship is resolved from either its reference
//! form (`userId`, `commentIds`) or its embedded form (`user`, `comments`). Embedded
//! records are normalized recursively and flattened into the included list.

use std::fmt;
use std::str::FromStr;

use serde_json::{Map, Value};
use tracing::{debug, trace, warn};

use crate::document::{
    IncludedAccumulator, NormalizedDocument, PrimaryData, RelationshipData, Resource, ResourceIdentifier,
};
use crate::error::{NormalizeError, Result};
use crate::schema::{ModelSchema, RelationshipDescriptor, RelationshipKind, SchemaRegistry};

/// The shape the caller expects at the root of a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cardinality {
    Single,
    Many,
}

impl fmt::Display for Cardinality {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Cardinality::Single => write!(f, "single"),
            Cardinality::Many => write!(f, "many"),
        }
    }
}

impl FromStr for Cardinality {
    type Err = NormalizeError;
    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "single" | "one" => Ok(Cardinality::Single),
            "many" | "collection" => Ok(Cardinality::Many),
            other => Err(NormalizeError::Config(format!("unknown cardinality '{other}'"))),
        }
    }
}

fn malformed(message: String) -> NormalizeError {
    warn!(%message, "malformed payload");
    NormalizeError::MalformedPayload(message)
}

// Ids are strings on the wire, but integer ids are accepted and rendered in decimal.
fn identifier_text(value: &Value, field: &str) -> Result<String> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) if n.is_i64() || n.is_u64() => Ok(n.to_string()),
        other => Err(malformed(format!("field '{field}' is not an id: {other}"))),
    }
}

pub struct ResponseNormalizer<'a, R: SchemaRegistry + ?Sized> {
    registry: &'a R,
}

impl<'a, R: SchemaRegistry + ?Sized> ResponseNormalizer<'a, R> {
    pub fn new(registry: &'a R) -> Self {
        Self { registry }
    }

    /// Normalizes a whole response. `id` is the id the caller asked for, if any,
    /// and is only recorded in the logs.
    pub fn normalize_response(
        &self,
        primary_schema: &ModelSchema,
        payload: &Value,
        id: Option<&str>,
        cardinality: Cardinality,
    ) -> Result<NormalizedDocument> {
        let type_name = primary_schema.type_name();
        debug!(type_name, id = id.unwrap_or("-"), %cardinality, "normalizing response");
        let data = payload
            .get("data")
            .and_then(Value::as_object)
            .ok_or_else(|| malformed("payload has no 'data' object".to_owned()))?;
        let plural_name = primary_schema.plural_name();
        let (resolved, root) = match (data.get(type_name), data.get(&plural_name)) {
            (Some(root), None) => (Cardinality::Single, root),
            (None, Some(root)) => (Cardinality::Many, root),
            (Some(_), Some(_)) => {
                return Err(malformed(format!("both '{type_name}' and '{plural_name}' present under 'data'")));
            }
            (None, None) => {
                return Err(malformed(format!("neither '{type_name}' nor '{plural_name}' present under 'data'")));
            }
        };
        if resolved != cardinality {
            return Err(malformed(format!(
                "expected a {cardinality} response for '{type_name}', found a {resolved} root"
            )));
        }

        let mut included = IncludedAccumulator::new();
        let primary = match resolved {
            Cardinality::Single => {
                let raw = root
                    .as_object()
                    .ok_or_else(|| malformed(format!("root '{type_name}' is not an object")))?;
                PrimaryData::Single(self.normalize_raw_object(raw, primary_schema, &mut included)?)
            }
            Cardinality::Many => {
                let raws = root
                    .as_array()
                    .ok_or_else(|| malformed(format!("root '{plural_name}' is not an array")))?;
                let mut resources = Vec::with_capacity(raws.len());
                for (i, raw) in raws.iter().enumerate() {
                    let raw = raw
                        .as_object()
                        .ok_or_else(|| malformed(format!("element {i} of '{plural_name}' is not an object")))?;
                    resources.push(self.normalize_raw_object(raw, primary_schema, &mut included)?);
                }
                PrimaryData::Many(resources)
            }
        };
        let included = included.into_included(primary.resources());
        debug!(type_name, resources = primary.resources().len(), included = included.len(), "normalized response");
        Ok(NormalizedDocument { data: primary, included })
    }

    pub fn normalize_single_response(&self, primary_schema: &ModelSchema, payload: &Value, id: Option<&str>) -> Result<NormalizedDocument> {
        self.normalize_response(primary_schema, payload, id, Cardinality::Single)
    }

    pub fn normalize_array_response(&self, primary_schema: &ModelSchema, payload: &Value) -> Result<NormalizedDocument> {
        self.normalize_response(primary_schema, payload, None, Cardinality::Many)
    }

    /// Normalizes one raw record against its schema. Embedded related records are
    /// kept in `included`; the returned resource refers to them by identifier only.
    pub fn normalize_raw_object(
        &self,
        raw: &Map<String, Value>,
        schema: &ModelSchema,
        included: &mut IncludedAccumulator,
    ) -> Result<Resource> {
        let type_name = schema.type_name();
        let id = match raw.get("id") {
            Some(value) => identifier_text(value, "id")?,
            None => return Err(malformed(format!("record of type '{type_name}' has no id"))),
        };
        let mut resource = Resource::new(type_name, &id);
        for name in schema.attribute_names() {
            if let Some(value) = raw.get(name) {
                resource.attributes.insert(name.clone(), value.clone());
            }
        }
        for (key, descriptor) in schema.relationships() {
            match self.resolve_relationship(raw, key, descriptor, included)? {
                Some(data) => resource.relationships.insert(key, data),
                None => trace!(type_name, id = %id, key = %key, "relationship absent"),
            }
        }
        Ok(resource)
    }

    fn resolve_relationship(
        &self,
        raw: &Map<String, Value>,
        key: &str,
        descriptor: &RelationshipDescriptor,
        included: &mut IncludedAccumulator,
    ) -> Result<Option<RelationshipData>> {
        let related_type = descriptor.related_type.as_str();
        match descriptor.kind {
            RelationshipKind::BelongsTo => {
                let reference_key = format!("{key}Id");
                if let Some(value) = raw.get(&reference_key).filter(|v| !v.is_null()) {
                    let id = identifier_text(value, &reference_key)?;
                    trace!(key, related_type, %id, "belongsTo by reference");
                    return Ok(Some(RelationshipData::One(ResourceIdentifier::new(related_type, &id))));
                }
                match raw.get(key) {
                    None | Some(Value::Null) => Ok(None),
                    Some(Value::Object(embedded)) => {
                        trace!(key, related_type, "belongsTo embedded");
                        let identifier = self.normalize_embedded(embedded, related_type, included)?;
                        Ok(Some(RelationshipData::One(identifier)))
                    }
                    Some(other) => Err(malformed(format!("belongsTo '{key}' is not an object: {other}"))),
                }
            }
            RelationshipKind::HasMany => {
                let reference_key = format!("{key}Ids");
                if let Some(value) = raw.get(&reference_key).filter(|v| !v.is_null()) {
                    let ids = value
                        .as_array()
                        .ok_or_else(|| malformed(format!("field '{reference_key}' is not an array")))?;
                    let identifiers = ids
                        .iter()
                        .map(|id| identifier_text(id, &reference_key).map(|id| ResourceIdentifier::new(related_type, &id)))
                        .collect::<Result<Vec<_>>>()?;
                    trace!(key, related_type, count = identifiers.len(), "hasMany by reference");
                    return Ok(Some(RelationshipData::Many(identifiers)));
                }
                match raw.get(key) {
                    None | Some(Value::Null) => Ok(None),
                    Some(Value::Array(embedded)) => {
                        trace!(key, related_type, count = embedded.len(), "hasMany embedded");
                        let mut identifiers = Vec::with_capacity(embedded.len());
                        for (i, element) in embedded.iter().enumerate() {
                            let element = element
                                .as_object()
                                .ok_or_else(|| malformed(format!("element {i} of hasMany '{key}' is not an object")))?;
                            identifiers.push(self.normalize_embedded(element, related_type, included)?);
                        }
                        Ok(Some(RelationshipData::Many(identifiers)))
                    }
                    Some(other) => Err(malformed(format!("hasMany '{key}' is not an array: {other}"))),
                }
            }
        }
    }

    fn normalize_embedded(
        &self,
        embedded: &Map<String, Value>,
        related_type: &str,
        included: &mut IncludedAccumulator,
    ) -> Result<ResourceIdentifier> {
        let schema = self.registry.model_for(related_type)?;
        let resource = self.normalize_raw_object(embedded, schema, included)?;
        let identifier = resource.identifier();
        if !included.keep(resource) {
            trace!(related_type, id = %identifier.id, "duplicate embedded record skipped");
        }
        Ok(identifier)
    }
}

/// Normalizes a response in one call; see [`ResponseNormalizer::normalize_response`].
pub fn normalize_response<R: SchemaRegistry + ?Sized>(
    registry: &R,
    primary_schema: &ModelSchema,
    payload: &Value,
    id: Option<&str>,
    cardinality: Cardinality,
) -> Result<NormalizedDocument> {
    ResponseNormalizer::new(registry).normalize_response(primary_schema, payload, id, cardinality)
}
