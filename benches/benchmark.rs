use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};
use gqlnorm::normalize::{Cardinality, ResponseNormalizer};
use gqlnorm::schema::{ModelSchema, SchemaKeeper, SchemaRegistry};
use gqlnorm::serialize::SnapshotSerializer;
use gqlnorm::snapshot::{RecordSnapshot, RelatedRecord};
use serde_json::{Value, json};

// 200 posts, each embedding its author and three comments; authors repeat
// every ten posts so the included list exercises deduplication
fn embedded_payload() -> Value {
    let posts: Vec<Value> = (0..200)
        .map(|i| {
            json!({
                "id": i.to_string(),
                "title": format!("Post {i}"),
                "body": "Lorem ipsum",
                "user": { "id": (i % 10).to_string(), "name": format!("User {}", i % 10) },
                "comments": (0..3).map(|c| json!({ "id": format!("{i}-{c}"), "body": "Nice" })).collect::<Vec<_>>()
            })
        })
        .collect();
    json!({ "data": { "posts": posts } })
}

pub fn criterion_benchmark(c: &mut Criterion) {
    let keeper: SchemaKeeper = [
        ModelSchema::new("post", ["title", "body"])
            .belongs_to("user", "user", false)
            .has_many("comments", "comment", false),
        ModelSchema::new("user", ["name"]),
        ModelSchema::new("comment", ["body"]),
    ]
    .into_iter()
    .collect();
    let post = keeper.model_for("post").expect("post schema");
    let payload = embedded_payload();
    let normalizer = ResponseNormalizer::new(&keeper);
    c.bench_function("normalize 200 embedded posts", |b| {
        b.iter(|| normalizer.normalize_response(post, black_box(&payload), None, Cardinality::Many))
    });

    let serializer = SnapshotSerializer::default();
    let snapshot = RecordSnapshot::new("post")
        .attribute("title", json!("Post"), "string")
        .attribute("publishedOn", json!("2024-03-17"), "date")
        .belongs_to("user", Some(RelatedRecord::new("1", "user")))
        .has_many("comments", (0..20).map(|i| RelatedRecord::new(&i.to_string(), "comment")).collect());
    c.bench_function("serialize snapshot", |b| b.iter(|| serializer.serialize(black_box(&snapshot))));
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
