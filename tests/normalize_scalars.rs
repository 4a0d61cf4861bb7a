use gqlnorm::NormalizeError;
use gqlnorm::normalize::{Cardinality, ResponseNormalizer, normalize_response};
use gqlnorm::schema::{ModelSchema, SchemaKeeper, SchemaRegistry};
use serde_json::json;

fn setup() -> SchemaKeeper {
    [ModelSchema::new("post", ["title", "body"])].into_iter().collect()
}

#[test]
fn single_record_with_scalars() {
    let keeper = setup();
    let post = keeper.model_for("post").expect("post schema");
    let payload = json!({
        "data": { "post": { "id": "1", "title": "The post title", "body": "The body title" } }
    });
    let document = normalize_response(&keeper, post, &payload, Some("1"), Cardinality::Single).expect("normalize ok");
    assert_eq!(
        document.to_value().expect("serializable"),
        json!({
            "data": {
                "type": "post",
                "id": "1",
                "attributes": { "title": "The post title", "body": "The body title" },
                "relationships": {}
            },
            "included": []
        })
    );
}

#[test]
fn plural_root_keeps_order() {
    let keeper = setup();
    let post = keeper.model_for("post").expect("post schema");
    let payload = json!({
        "data": { "posts": [
            { "id": "1", "title": "The post title", "body": "The body title" },
            { "id": "2", "title": "The other post title", "body": "The other body title" }
        ] }
    });
    let document = ResponseNormalizer::new(&keeper).normalize_array_response(post, &payload).expect("normalize ok");
    assert_eq!(
        document.to_value().expect("serializable"),
        json!({
            "data": [{
                "type": "post",
                "id": "1",
                "attributes": { "title": "The post title", "body": "The body title" },
                "relationships": {}
            }, {
                "type": "post",
                "id": "2",
                "attributes": { "title": "The other post title", "body": "The other body title" },
                "relationships": {}
            }],
            "included": []
        })
    );
}

#[test]
fn undeclared_fields_are_dropped() {
    let keeper = setup();
    let post = keeper.model_for("post").expect("post schema");
    // 'views' is not declared and the absent 'body' must not turn into a null
    let payload = json!({ "data": { "post": { "id": 7, "title": "T", "views": 12 } } });
    let document = normalize_response(&keeper, post, &payload, None, Cardinality::Single).expect("normalize ok");
    let value = document.to_value().expect("serializable");
    assert_eq!(value["data"]["id"], "7", "integer ids are rendered as strings");
    assert_eq!(value["data"]["attributes"], json!({ "title": "T" }));
}

#[test]
fn cardinality_mismatch_is_malformed() {
    let keeper = setup();
    let post = keeper.model_for("post").expect("post schema");
    let single = json!({ "data": { "post": { "id": "1" } } });
    let many = json!({ "data": { "posts": [] } });
    let res = normalize_response(&keeper, post, &single, None, Cardinality::Many);
    assert!(matches!(res, Err(NormalizeError::MalformedPayload(_))), "single root for a collection request");
    let res = normalize_response(&keeper, post, &many, None, Cardinality::Single);
    assert!(matches!(res, Err(NormalizeError::MalformedPayload(_))), "plural root for a single request");
}

#[test]
fn root_must_be_unambiguous() {
    let keeper = setup();
    let post = keeper.model_for("post").expect("post schema");
    for payload in [
        json!({ "data": { "article": { "id": "1" } } }),
        json!({ "data": { "post": { "id": "1" }, "posts": [] } }),
        json!({ "data": null }),
        json!({ "errors": [] }),
        json!({ "data": { "post": { "title": "no id" } } }),
        json!({ "data": { "post": [{ "id": "1" }] } }),
    ] {
        let res = normalize_response(&keeper, post, &payload, None, Cardinality::Single);
        assert!(matches!(res, Err(NormalizeError::MalformedPayload(_))), "payload {payload} should be rejected");
    }
}

#[test]
fn empty_collection() {
    let keeper = setup();
    let post = keeper.model_for("post").expect("post schema");
    let payload = json!({ "data": { "posts": [] } });
    let document = normalize_response(&keeper, post, &payload, None, Cardinality::Many).expect("normalize ok");
    assert_eq!(document.to_value().expect("serializable"), json!({ "data": [], "included": [] }));
}
