//! Descriptor builder: the Thing Description document served on
//! description requests. Built once at registration, never mutated.

use serde_json::{Map, Value as Json, json};

use webthing_domain::member::{MemberDescriptor, Metadata};

use crate::introspect::{ActionSchema, EventSchema, PropertySchema, ThingSchema};
use crate::thing::Thing;

const CONTEXT: &str = "https://webthings.io/schemas";

/// Build the description of `thing`, whose own href is `href`.
pub fn build<T: Thing>(thing: &T, schema: &ThingSchema<T>, href: &str) -> Json {
    let mut document = Map::new();
    document.insert("@context".into(), json!(CONTEXT));
    document.insert("id".into(), json!(href));
    document.insert(
        "title".into(),
        json!(thing.title().unwrap_or_else(|| thing.name())),
    );
    if let Some(description) = thing.description() {
        document.insert("description".into(), json!(description));
    }
    document.insert("@type".into(), json!(thing.types()));

    document.insert(
        "properties".into(),
        Json::Object(
            schema
                .properties
                .iter()
                .map(|p| (p.descriptor.external_name().to_string(), property(p, href)))
                .collect(),
        ),
    );
    document.insert(
        "actions".into(),
        Json::Object(
            schema
                .actions
                .iter()
                .map(|a| (a.name.clone(), action(a, href)))
                .collect(),
        ),
    );
    document.insert(
        "events".into(),
        Json::Object(
            schema
                .events
                .iter()
                .map(|e| (e.name.clone(), event(e, href)))
                .collect(),
        ),
    );
    document.insert(
        "links".into(),
        json!([
            { "rel": "properties", "href": format!("{href}/properties") },
            { "rel": "actions", "href": format!("{href}/actions") },
            { "rel": "events", "href": format!("{href}/events") },
        ]),
    );

    Json::Object(document)
}

fn property<T>(schema: &PropertySchema<T>, href: &str) -> Json {
    let descriptor = &schema.descriptor;
    let mut body = member(descriptor);
    if descriptor.read_only {
        body.insert("readOnly".into(), json!(true));
    }
    body.insert(
        "links".into(),
        json!([{ "href": format!("{href}/properties/{}", descriptor.external_name()) }]),
    );
    Json::Object(body)
}

fn action<T>(schema: &ActionSchema<T>, href: &str) -> Json {
    let mut body = Map::new();
    annotate(&mut body, &schema.metadata);

    let properties: Map<String, Json> = schema
        .inputs
        .iter()
        .map(|input| {
            (
                input.descriptor.external_name().to_string(),
                Json::Object(member(&input.descriptor)),
            )
        })
        .collect();
    let required: Vec<&str> = schema
        .inputs
        .iter()
        .filter(|input| !input.descriptor.nullable)
        .map(|input| input.descriptor.external_name())
        .collect();

    let mut input = Map::new();
    input.insert("type".into(), json!("object"));
    input.insert("properties".into(), Json::Object(properties));
    if !required.is_empty() {
        input.insert("required".into(), json!(required));
    }
    body.insert("input".into(), Json::Object(input));
    body.insert(
        "links".into(),
        json!([{ "href": format!("{href}/actions/{}", schema.name) }]),
    );
    Json::Object(body)
}

fn event(schema: &EventSchema, href: &str) -> Json {
    let mut body = match &schema.payload {
        Some(payload) => member(payload),
        None => {
            let mut body = Map::new();
            annotate(&mut body, &schema.metadata);
            body
        }
    };
    body.insert(
        "links".into(),
        json!([{ "href": format!("{href}/events/{}", schema.name) }]),
    );
    Json::Object(body)
}

/// JSON-schema fragment of one member: type, metadata and constraints.
fn member(descriptor: &MemberDescriptor) -> Map<String, Json> {
    let mut body = Map::new();
    body.insert("type".into(), json!(descriptor.kind.json_type()));
    annotate(&mut body, &descriptor.metadata);

    let c = &descriptor.constraints;
    let bounds = [
        ("minimum", &c.minimum),
        ("maximum", &c.maximum),
        ("exclusiveMinimum", &c.exclusive_minimum),
        ("exclusiveMaximum", &c.exclusive_maximum),
        ("multipleOf", &c.multiple_of),
    ];
    for (keyword, bound) in present(bounds) {
        body.insert(keyword.into(), bound.to_json());
    }
    if let Some(length) = c.minimum_length {
        body.insert("minLength".into(), json!(length));
    }
    if let Some(length) = c.maximum_length {
        body.insert("maxLength".into(), json!(length));
    }
    if let Some(pattern) = &c.pattern {
        body.insert("pattern".into(), json!(pattern.as_str()));
    }
    if !c.enumeration.is_empty() {
        body.insert(
            "enum".into(),
            Json::Array(c.enumeration.iter().map(|v| v.to_json()).collect()),
        );
    }
    body
}

fn annotate(body: &mut Map<String, Json>, metadata: &Metadata) {
    let fields = [
        ("title", &metadata.title),
        ("description", &metadata.description),
        ("@type", &metadata.semantic_type),
        ("unit", &metadata.unit),
    ];
    for (keyword, value) in present(fields) {
        body.insert(keyword.into(), json!(value));
    }
}

fn present<'a, V, const N: usize>(
    entries: [(&'static str, &'a Option<V>); N],
) -> impl Iterator<Item = (&'static str, &'a V)> {
    entries
        .into_iter()
        .filter_map(|(keyword, value)| value.as_ref().map(|value| (keyword, value)))
}
