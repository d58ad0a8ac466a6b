use super::{DefaultValue, EntitySpec};
use crate::pipeline::body_schema::{text, BodySchema};

pub static SPEC: EntitySpec = EntitySpec {
    collection: "cinemas",
    display: "Cinema",
    id_param: "cinemaId",
    create_schema,
    update_schema,
    create_refs: &[],
    update_refs: &[],
    path_filters: &[],
    populate: &[],
    unique: &[],
    hidden: &[],
    defaults: &[("photo", DefaultValue::Text("no-photo.jpg"))],
};

fn base() -> BodySchema {
    BodySchema::new()
        .field("name", text().min(5).max(100))
        .field("address", text())
        .field("openingHours", text())
        .field("photo", text())
}

fn create_schema() -> BodySchema {
    base().require(&["name", "address"])
}

fn update_schema() -> BodySchema {
    base()
}
