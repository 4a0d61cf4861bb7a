//! Settings for the command line front end, read with the `config` crate.
//!
//! Sources, later ones overriding earlier ones:
//! * built-in defaults,
//! * a settings file (`gqlnorm.json` in the working directory unless a path is given),
//! * `GQLNORM_*` environment variables, e.g. `GQLNORM_KEY_CASE=underscore`.

use config::{Config, Environment, File};
use serde::Deserialize;

use crate::case::KeyCase;
use crate::error::Result;
use crate::schema::SchemaKeeper;
use crate::serialize::SnapshotSerializer;
use crate::transform::TransformRegistry;

pub const DEFAULT_SETTINGS_FILE: &str = "gqlnorm";

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub key_case: String,
    pub schema_file: String,
    pub log_level: String,
}

impl Settings {
    pub fn load(path: Option<&str>) -> Result<Self> {
        let file = match path {
            Some(path) => File::with_name(path),
            None => File::with_name(DEFAULT_SETTINGS_FILE).required(false),
        };
        let settings = Config::builder()
            .set_default("key_case", "identity")?
            .set_default("schema_file", "schema.json")?
            .set_default("log_level", "info")?
            .add_source(file)
            .add_source(Environment::with_prefix("GQLNORM"))
            .build()?
            .try_deserialize()?;
        Ok(settings)
    }
    pub fn key_case(&self) -> Result<KeyCase> {
        self.key_case.parse()
    }
    pub fn schema_keeper(&self) -> Result<SchemaKeeper> {
        SchemaKeeper::from_file(&self.schema_file)
    }
    pub fn serializer(&self) -> Result<SnapshotSerializer> {
        Ok(SnapshotSerializer::new(TransformRegistry::with_defaults(), self.key_case()?))
    }
}
