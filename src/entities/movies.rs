use super::EntitySpec;
use crate::pipeline::body_schema::{id, id_list, integer, iso_date, number, text, uri, BodySchema};
use crate::pipeline::{PathFilterRule, PopulateRule, RefSource, ReferenceRule};

// Checked in declaration order; the first unresolved id fails the request
static REFS: &[ReferenceRule] = &[
    ReferenceRule {
        collection: "genres",
        display: "Genre",
        source: RefSource::Body("genreIds"),
        destination: Some("genres"),
    },
    ReferenceRule {
        collection: "movie-types",
        display: "Movie type",
        source: RefSource::Body("movieTypeId"),
        destination: Some("movieType"),
    },
    ReferenceRule {
        collection: "languages",
        display: "Language",
        source: RefSource::Body("spokenLanguageId"),
        destination: Some("spokenLanguage"),
    },
    ReferenceRule {
        collection: "languages",
        display: "Language",
        source: RefSource::Body("subtitleLanguageId"),
        destination: Some("subtitleLanguage"),
    },
    ReferenceRule {
        collection: "countries",
        display: "Country",
        source: RefSource::Body("countryId"),
        destination: Some("country"),
    },
];

pub static SPEC: EntitySpec = EntitySpec {
    collection: "movies",
    display: "Movie",
    id_param: "movieId",
    create_schema,
    update_schema,
    create_refs: REFS,
    update_refs: REFS,
    path_filters: &[
        PathFilterRule {
            field: "genres",
            param: "genreId",
            collection: "genres",
            display: "Genre",
        },
        PathFilterRule {
            field: "movieType",
            param: "movieTypeId",
            collection: "movie-types",
            display: "Movie type",
        },
    ],
    populate: &[
        PopulateRule { field: "genres", collection: "genres" },
        PopulateRule { field: "movieType", collection: "movie-types" },
        PopulateRule { field: "spokenLanguage", collection: "languages" },
        PopulateRule { field: "subtitleLanguage", collection: "languages" },
        PopulateRule { field: "country", collection: "countries" },
    ],
    unique: &[],
    hidden: &[],
    defaults: &[],
};

fn base() -> BodySchema {
    BodySchema::new()
        .field("title", text().max(100))
        .field("description", text())
        .field("ticketPrice", number().min(0))
        .field("durationInMinutes", integer().min(0))
        .field("releasedDate", iso_date())
        .field("trailerUrl", uri())
        .field("posterUrl", uri())
        .field("genreIds", id_list())
        .field("movieTypeId", id())
        .field("spokenLanguageId", id())
        .field("subtitleLanguageId", id())
        .field("countryId", id())
}

fn create_schema() -> BodySchema {
    base().require(&[
        "title",
        "description",
        "ticketPrice",
        "durationInMinutes",
        "releasedDate",
        "genreIds",
        "movieTypeId",
    ])
}

fn update_schema() -> BodySchema {
    base()
}
