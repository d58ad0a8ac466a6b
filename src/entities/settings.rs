use super::EntitySpec;
use crate::pipeline::body_schema::{text, BodySchema};

pub static SPEC: EntitySpec = EntitySpec {
    collection: "settings",
    display: "Setting",
    id_param: "settingId",
    create_schema,
    update_schema,
    create_refs: &[],
    update_refs: &[],
    path_filters: &[],
    populate: &[],
    unique: &["name"],
    hidden: &[],
    defaults: &[],
};

fn base() -> BodySchema {
    BodySchema::new().field("name", text().max(50)).field("value", text())
}

fn create_schema() -> BodySchema {
    base().require(&["name", "value"])
}

fn update_schema() -> BodySchema {
    base()
}
