//! Command line front end.
//!
//! ```text
//! gqlnorm normalize <type> <single|many> <payload.json>
//! gqlnorm serialize <snapshot.json>
//! ```
//!
//! Settings (key case, schema file, log level) are read from `gqlnorm.json` and
//! `GQLNORM_*` environment variables; `GQLNORM_SETTINGS` points at another file.

use std::env;
use std::fs;
use std::process::ExitCode;

use serde_json::Value;
use tracing::info;
use tracing_subscriber::EnvFilter;

use gqlnorm::normalize::{Cardinality, ResponseNormalizer};
use gqlnorm::schema::SchemaRegistry;
use gqlnorm::settings::Settings;
use gqlnorm::snapshot::RecordSnapshot;
use gqlnorm::{NormalizeError, Result};

const USAGE: &str = "usage: gqlnorm normalize <type> <single|many> <payload.json>\n       gqlnorm serialize <snapshot.json>";

fn run(settings: &Settings, args: &[String]) -> Result<Value> {
    match args.iter().map(String::as_str).collect::<Vec<_>>().as_slice() {
        ["normalize", type_name, cardinality, payload_file] => {
            let cardinality: Cardinality = cardinality.parse()?;
            let keeper = settings.schema_keeper()?;
            info!(schemas = keeper.len(), schema_file = %settings.schema_file, "schemas loaded");
            let schema = keeper.model_for(type_name)?;
            let payload: Value = serde_json::from_str(&fs::read_to_string(payload_file)?)?;
            let document = ResponseNormalizer::new(&keeper).normalize_response(schema, &payload, None, cardinality)?;
            Ok(document.to_value()?)
        }
        ["serialize", snapshot_file] => {
            let snapshot = RecordSnapshot::from_json(&fs::read_to_string(snapshot_file)?)?;
            let arguments = settings.serializer()?.serialize(&snapshot)?;
            Ok(Value::Object(arguments))
        }
        _ => Err(NormalizeError::Config(USAGE.to_owned())),
    }
}

fn main() -> ExitCode {
    let settings = match Settings::load(env::var("GQLNORM_SETTINGS").ok().as_deref()) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&settings.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = env::args().skip(1).collect();
    match run(&settings, &args).and_then(|output| Ok(serde_json::to_string_pretty(&output)?)) {
        Ok(output) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}
