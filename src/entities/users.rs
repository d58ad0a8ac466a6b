use super::{DefaultValue, EntitySpec};
use crate::pipeline::body_schema::{choice, email, id, text, BodySchema};
use crate::pipeline::{PopulateRule, RefSource, ReferenceRule};

static REFS: &[ReferenceRule] = &[ReferenceRule {
    collection: "memberships",
    display: "Membership",
    source: RefSource::Body("membershipId"),
    destination: Some("membership"),
}];

pub static SPEC: EntitySpec = EntitySpec {
    collection: "users",
    display: "User",
    id_param: "userId",
    create_schema,
    update_schema,
    create_refs: REFS,
    update_refs: REFS,
    path_filters: &[],
    populate: &[PopulateRule { field: "membership", collection: "memberships" }],
    unique: &["name", "email"],
    hidden: &["password"],
    defaults: &[("role", DefaultValue::Text("customer"))],
};

fn base() -> BodySchema {
    BodySchema::new()
        .field("name", text().max(50))
        .field("email", email())
        .field("password", text().min(6).max(72))
        .field("role", choice(&["customer", "staff", "admin"]))
        .field("membershipId", id())
}

fn create_schema() -> BodySchema {
    base().require(&["name", "email", "password"])
}

fn update_schema() -> BodySchema {
    base()
}
