//! gqlnorm – normalization of compact query responses and serialization of write snapshots.
//!
//! The crate sits between a query layer, which speaks in compact payloads such as
//! `{"data": {"post": {"id": "1", "title": "T", "userId": "2"}}}`, and a data layer that
//! wants canonical, relationship-normalized documents:
//! * A [`document::Resource`] is `{type, id, attributes, relationships}`.
//! * A [`document::ResourceIdentifier`] is the minimal `{type, id}` reference.
//! * A [`document::NormalizedDocument`] holds the primary resource(s) under `data`
//!   and every embedded related resource, once, under `included`.
//!
//! ## Modules
//! * [`schema`] – [`schema::ModelSchema`] declarations and the [`schema::SchemaRegistry`]
//!   trait with its map-backed [`schema::SchemaKeeper`].
//! * [`normalize`] – inbound direction, [`normalize::ResponseNormalizer`].
//! * [`serialize`] – outbound direction, [`serialize::SnapshotSerializer`] producing a
//!   flat [`serialize::ArgumentSet`].
//! * [`snapshot`] – the [`snapshot::Snapshot`] trait and a concrete [`snapshot::RecordSnapshot`].
//! * [`transform`] – per-type value codecs and the [`transform::TransformRegistry`].
//! * [`case`] – [`case::KeyCase`] applied to every outgoing key.
//! * [`settings`] – file and environment configuration for the binary.
//!
//! ## Relationships
//! A relationship is resolved from its reference form (`<key>Id`, `<key>Ids`) or, when
//! that is absent, its embedded form (`<key>` holding an object or an array of objects).
//! Embedded records are normalized recursively and flattened into `included`; the owner
//! only keeps their identifiers. A relationship present in neither form is left out.
//!
//! ## Quick Start
//! ```
//! use gqlnorm::normalize::{Cardinality, ResponseNormalizer};
//! use gqlnorm::schema::{ModelSchema, SchemaKeeper, SchemaRegistry};
//! use serde_json::json;
//!
//! let keeper: SchemaKeeper = [
//!     ModelSchema::new("post", ["title"]).belongs_to("user", "user", true),
//!     ModelSchema::new("user", ["name"]),
//! ].into_iter().collect();
//! let post = keeper.model_for("post").unwrap();
//! let payload = json!({"data": {"post": {"id": "1", "title": "T", "userId": "2"}}});
//! let document = ResponseNormalizer::new(&keeper)
//!     .normalize_response(post, &payload, Some("1"), Cardinality::Single)
//!     .unwrap();
//! assert_eq!(document.to_value().unwrap()["data"]["relationships"]["user"]["data"]["id"], "2");
//! ```
//!
//! All operations are pure and synchronous. Nothing is cached between calls and the
//! included list lives only for the duration of one normalization.

pub mod case;
pub mod document;
pub mod error;
pub mod normalize;
pub mod schema;
pub mod serialize;
pub mod settings;
pub mod snapshot;
pub mod transform;

pub use error::{NormalizeError, Result};
