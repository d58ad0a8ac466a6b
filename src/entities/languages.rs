use super::EntitySpec;
use crate::pipeline::body_schema::{text, BodySchema};

pub static SPEC: EntitySpec = EntitySpec {
    collection: "languages",
    display: "Language",
    id_param: "languageId",
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
    BodySchema::new().field("name", text().max(50))
}

fn create_schema() -> BodySchema {
    base().require(&["name"])
}

fn update_schema() -> BodySchema {
    base()
}
