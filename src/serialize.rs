//! Outbound direction: write snapshots into flat argument sets.

use serde_json::{Map, Value};
use tracing::{debug, trace};

use crate::case::KeyCase;
use crate::error::{NormalizeError, Result};
use crate::schema::RelationshipKind;
use crate::snapshot::Snapshot;
use crate::transform::TransformRegistry;

/// Variable name to value, ready to be passed to an outbound query.
pub type ArgumentSet = Map<String, Value>;

#[derive(Debug, Clone)]
pub struct SnapshotSerializer {
    transforms: TransformRegistry,
    case: KeyCase,
}

impl Default for SnapshotSerializer {
    fn default() -> Self {
        Self::new(TransformRegistry::with_defaults(), KeyCase::Identity)
    }
}

impl SnapshotSerializer {
    pub fn new(transforms: TransformRegistry, case: KeyCase) -> Self {
        Self { transforms, case }
    }

    /// Flattens a snapshot. Attributes go through the codec registered for their
    /// declared type; `belongsTo` keys become `<key>Id` and `hasMany` keys become
    /// `<key>Ids`. The key case is applied to the composed name. Unset
    /// relationships are left out; a set but empty `hasMany` becomes `[]`.
    pub fn serialize<S: Snapshot + ?Sized>(&self, snapshot: &S) -> Result<ArgumentSet> {
        debug!(model_name = snapshot.model_name(), case = ?self.case, "serializing snapshot");
        let mut arguments = ArgumentSet::new();
        for (key, attribute) in snapshot.attributes() {
            let declared_type = attribute.declared_type.as_str();
            let transform = self.transforms.transform_for(declared_type).ok_or_else(|| {
                NormalizeError::MissingTransform {
                    attribute: key.clone(),
                    declared_type: declared_type.to_owned(),
                }
            })?;
            let value = transform.serialize(&attribute.value).map_err(|message| NormalizeError::TransformFailed {
                attribute: key.clone(),
                declared_type: declared_type.to_owned(),
                message,
            })?;
            arguments.insert(self.case.apply(key), value);
        }
        for (key, kind) in snapshot.relationships() {
            match kind {
                RelationshipKind::BelongsTo => match snapshot.belongs_to(key) {
                    Some(related) => {
                        arguments.insert(self.case.apply(&format!("{key}Id")), Value::String(related.id.clone()));
                    }
                    None => trace!(key, "belongsTo unset"),
                },
                RelationshipKind::HasMany => match snapshot.has_many(key) {
                    Some(related) => {
                        let ids: Vec<Value> = related.iter().map(|r| Value::String(r.id.clone())).collect();
                        arguments.insert(self.case.apply(&format!("{key}Ids")), Value::Array(ids));
                    }
                    None => trace!(key, "hasMany unset"),
                },
            }
        }
        debug!(model_name = snapshot.model_name(), arguments = arguments.len(), "serialized snapshot");
        Ok(arguments)
    }
}
