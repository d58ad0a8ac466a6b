use super::EntitySpec;
use crate::pipeline::body_schema::{id, iso_date, BodySchema};
use crate::pipeline::{PathFilterRule, PopulateRule, RefSource, ReferenceRule};

static REFS: &[ReferenceRule] = &[
    ReferenceRule {
        collection: "movies",
        display: "Movie",
        source: RefSource::Body("movieId"),
        destination: Some("movie"),
    },
    ReferenceRule {
        collection: "halls",
        display: "Hall",
        source: RefSource::Body("hallId"),
        destination: Some("hall"),
    },
];

pub static SPEC: EntitySpec = EntitySpec {
    collection: "showtimes",
    display: "Showtime",
    id_param: "showtimeId",
    create_schema,
    update_schema,
    create_refs: REFS,
    update_refs: REFS,
    path_filters: &[PathFilterRule {
        field: "movie",
        param: "movieId",
        collection: "movies",
        display: "Movie",
    }],
    populate: &[
        PopulateRule { field: "movie", collection: "movies" },
        PopulateRule { field: "hall", collection: "halls" },
    ],
    unique: &[],
    hidden: &[],
    defaults: &[],
};

fn base() -> BodySchema {
    BodySchema::new()
        .field("startedDateTime", iso_date())
        .field("movieId", id())
        .field("hallId", id())
}

fn create_schema() -> BodySchema {
    base().require(&["startedDateTime", "movieId", "hallId"])
}

fn update_schema() -> BodySchema {
    base()
}
