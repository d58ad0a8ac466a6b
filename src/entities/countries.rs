use super::EntitySpec;
use crate::pipeline::body_schema::{text, BodySchema};

pub static SPEC: EntitySpec = EntitySpec {
    collection: "countries",
    display: "Country",
    id_param: "countryId",
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
    BodySchema::new().field("name", text().max(50)).field("code", text().max(5))
}

fn create_schema() -> BodySchema {
    base().require(&["name"])
}

fn update_schema() -> BodySchema {
    base()
}
