use super::EntitySpec;
use crate::pipeline::body_schema::{number, text, BodySchema};

pub static SPEC: EntitySpec = EntitySpec {
    collection: "memberships",
    display: "Membership",
    id_param: "membershipId",
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
    BodySchema::new()
        .field("name", text().max(50))
        .field("description", text())
        .field("discountPercentage", number().min(0).max(100))
}

fn create_schema() -> BodySchema {
    base().require(&["name", "description"])
}

fn update_schema() -> BodySchema {
    base()
}
