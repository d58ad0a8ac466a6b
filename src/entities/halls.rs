use super::{DefaultValue, EntitySpec};
use crate::pipeline::body_schema::{id, text, text_list, BodySchema};
use crate::pipeline::{PathFilterRule, PopulateRule, RefSource, ReferenceRule};

// Creation only happens under /cinemas/:cinemaId/halls, so the parent
// cinema arrives as a path parameter rather than a body field
static CREATE_REFS: &[ReferenceRule] = &[
    ReferenceRule {
        collection: "cinemas",
        display: "Cinema",
        source: RefSource::Param("cinemaId"),
        destination: Some("cinema"),
    },
    ReferenceRule {
        collection: "hall-types",
        display: "Hall type",
        source: RefSource::Body("hallTypeId"),
        destination: Some("hallType"),
    },
];

static UPDATE_REFS: &[ReferenceRule] = &[
    ReferenceRule {
        collection: "cinemas",
        display: "Cinema",
        source: RefSource::Body("cinemaId"),
        destination: Some("cinema"),
    },
    ReferenceRule {
        collection: "hall-types",
        display: "Hall type",
        source: RefSource::Body("hallTypeId"),
        destination: Some("hallType"),
    },
];

pub static SPEC: EntitySpec = EntitySpec {
    collection: "halls",
    display: "Hall",
    id_param: "hallId",
    create_schema,
    update_schema,
    create_refs: CREATE_REFS,
    update_refs: UPDATE_REFS,
    path_filters: &[
        PathFilterRule {
            field: "cinema",
            param: "cinemaId",
            collection: "cinemas",
            display: "Cinema",
        },
        PathFilterRule {
            field: "hallType",
            param: "hallTypeId",
            collection: "hall-types",
            display: "Hall type",
        },
    ],
    populate: &[
        PopulateRule { field: "cinema", collection: "cinemas" },
        PopulateRule { field: "hallType", collection: "hall-types" },
    ],
    unique: &["name"],
    hidden: &[],
    defaults: &[("locationImage", DefaultValue::Text("no-photo.jpg"))],
};

fn base() -> BodySchema {
    BodySchema::new()
        .field("name", text().min(5).max(100))
        .field("seatRows", text_list())
        .field("seatColumns", text_list())
        .field("locationImage", text())
        .field("cinemaId", id())
        .field("hallTypeId", id())
}

fn create_schema() -> BodySchema {
    base().require(&["name", "seatRows", "seatColumns", "hallTypeId"]).without("cinemaId")
}

fn update_schema() -> BodySchema {
    base()
}
