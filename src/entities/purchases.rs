use super::EntitySpec;
use crate::pipeline::body_schema::{id, text_list, BodySchema};
use crate::pipeline::{PopulateRule, RefSource, ReferenceRule};

static REFS: &[ReferenceRule] = &[ReferenceRule {
    collection: "showtimes",
    display: "Showtime",
    source: RefSource::Body("showtimeId"),
    destination: Some("showtime"),
}];

pub static SPEC: EntitySpec = EntitySpec {
    collection: "purchases",
    display: "Purchase",
    id_param: "purchaseId",
    create_schema,
    update_schema,
    create_refs: REFS,
    update_refs: REFS,
    path_filters: &[],
    populate: &[
        PopulateRule { field: "showtime", collection: "showtimes" },
        PopulateRule { field: "user", collection: "users" },
    ],
    unique: &[],
    hidden: &[],
    defaults: &[],
};

fn base() -> BodySchema {
    BodySchema::new().field("showtimeId", id()).field("seats", text_list())
}

fn create_schema() -> BodySchema {
    base().require(&["showtimeId", "seats"])
}

fn update_schema() -> BodySchema {
    base()
}
