use super::EntitySpec;
use crate::pipeline::body_schema::{text, BodySchema};

pub static SPEC: EntitySpec = EntitySpec {
    collection: "movie-types",
    display: "Movie type",
    id_param: "movieTypeId",
    create_schema,
    update_schema,
    create_refs: &[],
    update_refs: &[],
    path_filters: &[],
    populate: &[],
    unique: &[],
    hidden: &[],
    defaults: &[],
};

fn base() -> BodySchema {
    BodySchema::new().field("name", text().max(50)).field("description", text())
}

fn create_schema() -> BodySchema {
    base().require(&["name", "description"])
}

fn update_schema() -> BodySchema {
    base()
}
