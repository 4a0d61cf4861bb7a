use gqlnorm::NormalizeError;
use gqlnorm::case::{KeyCase, underscore};
use gqlnorm::serialize::SnapshotSerializer;
use gqlnorm::snapshot::{RecordSnapshot, RelatedRecord};
use gqlnorm::transform::TransformRegistry;
use serde_json::{Value, json};

fn string_only() -> TransformRegistry {
    let mut transforms = TransformRegistry::new();
    transforms.register_fn("string", |v: &Value| Ok(v.clone()));
    transforms
}

fn project() -> RecordSnapshot {
    RecordSnapshot::new("project")
        .attribute("title", json!("The title"), "string")
        .attribute("body", json!("The body"), "string")
        .belongs_to("author", Some(RelatedRecord::new("1", "user")))
        .has_many("posts", vec![RelatedRecord::new("1", "post")])
}

#[test]
fn serializes_to_argument_set() {
    let serializer = SnapshotSerializer::new(string_only(), KeyCase::Identity);
    let arguments = serializer.serialize(&project()).expect("serialize ok");
    assert_eq!(
        Value::Object(arguments),
        json!({ "title": "The title", "body": "The body", "authorId": "1", "postIds": ["1"] })
    );
}

#[test]
fn serializes_with_custom_case() {
    let serializer = SnapshotSerializer::new(string_only(), KeyCase::custom(underscore));
    let snapshot = project().attribute("longBody", json!("The long body"), "string");
    let arguments = serializer.serialize(&snapshot).expect("serialize ok");
    assert_eq!(
        Value::Object(arguments),
        json!({
            "title": "The title",
            "body": "The body",
            "long_body": "The long body",
            "author_id": "1",
            "post_ids": ["1"]
        })
    );
}

#[test]
fn case_sees_composed_keys() {
    let serializer = SnapshotSerializer::new(string_only(), KeyCase::custom(|k: &str| format!("<{k}>")));
    let arguments = serializer.serialize(&project()).expect("serialize ok");
    let keys: Vec<&str> = arguments.keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["<title>", "<body>", "<authorId>", "<postIds>"]);
}

#[test]
fn missing_transform_names_attribute_and_type() {
    let serializer = SnapshotSerializer::new(string_only(), KeyCase::Identity);
    let snapshot = project().attribute("rating", json!(5), "number");
    match serializer.serialize(&snapshot) {
        Err(NormalizeError::MissingTransform { attribute, declared_type }) => {
            assert_eq!(attribute, "rating");
            assert_eq!(declared_type, "number");
        }
        other => panic!("expected MissingTransform, got {other:?}"),
    }
}

#[test]
fn unset_relationships() {
    let serializer = SnapshotSerializer::default();
    let snapshot = RecordSnapshot::new("project")
        .attribute("title", json!("T"), "string")
        .belongs_to("author", None)
        .has_many("posts", Vec::new());
    let arguments = serializer.serialize(&snapshot).expect("serialize ok");
    assert_eq!(Value::Object(arguments), json!({ "title": "T", "postIds": [] }));
}

#[test]
fn default_codecs_apply() {
    let serializer = SnapshotSerializer::new(TransformRegistry::with_defaults(), KeyCase::Underscore);
    let snapshot = RecordSnapshot::new("event")
        .attribute("startsOn", json!("2024-03-17T09:00:00Z"), "date")
        .attribute("seatCount", json!("120"), "number")
        .attribute("isPublic", json!("true"), "boolean")
        .attribute("price", json!("19.90"), "decimal")
        .attribute("note", Value::Null, "string");
    let arguments = serializer.serialize(&snapshot).expect("serialize ok");
    assert_eq!(
        Value::Object(arguments),
        json!({
            "starts_on": "2024-03-17",
            "seat_count": 120,
            "is_public": true,
            "price": "19.90",
            "note": null
        })
    );
}

#[test]
fn rejected_value_is_reported() {
    let serializer = SnapshotSerializer::default();
    let snapshot = RecordSnapshot::new("event").attribute("startsOn", json!("someday"), "date");
    let res = serializer.serialize(&snapshot);
    assert!(matches!(res, Err(NormalizeError::TransformFailed { .. })), "unparseable date should fail");
}

#[test]
fn snapshot_from_json() {
    let snapshot = RecordSnapshot::from_json(
        r#"{
            "modelName": "project",
            "attributes": {
                "title": { "value": "The title", "type": "string" },
                "body": { "value": "The body", "type": "string" }
            },
            "relationships": {
                "author": { "kind": "belongsTo", "data": { "id": "1", "modelName": "user" } },
                "posts": { "kind": "hasMany", "data": [{ "id": "1", "modelName": "post" }] },
                "editor": { "kind": "belongsTo", "data": null }
            }
        }"#,
    )
    .expect("snapshot parses");
    assert_eq!(snapshot, project().belongs_to("editor", None));
    let arguments = SnapshotSerializer::new(string_only(), KeyCase::Identity)
        .serialize(&snapshot)
        .expect("serialize ok");
    assert_eq!(
        Value::Object(arguments),
        json!({ "title": "The title", "body": "The body", "authorId": "1", "postIds": ["1"] })
    );
}

// A hasMany that is unset is left out, one that is set but empty becomes []
#[test]
fn unset_has_many_is_left_out() {
    let serializer = SnapshotSerializer::new(string_only(), KeyCase::Identity);
    let snapshot = RecordSnapshot::new("project")
        .attribute("title", json!("T"), "string")
        .has_many_unset("posts")
        .has_many("tags", Vec::new());
    let arguments = serializer.serialize(&snapshot).expect("serialize ok");
    assert_eq!(Value::Object(arguments), json!({ "title": "T", "tagIds": [] }));

    let snapshot = RecordSnapshot::from_json(
        r#"{
            "modelName": "project",
            "relationships": {
                "posts": { "kind": "hasMany", "data": null },
                "tags": { "kind": "hasMany", "data": [] },
                "author": { "kind": "belongsTo", "data": null }
            }
        }"#,
    )
    .expect("snapshot parses");
    let arguments = serializer.serialize(&snapshot).expect("serialize ok");
    assert_eq!(Value::Object(arguments), json!({ "tagIds": [] }), "null data means unset");
}
