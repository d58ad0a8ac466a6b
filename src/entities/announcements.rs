use super::{DefaultValue, EntitySpec};
use crate::pipeline::body_schema::{iso_date, text, BodySchema};

pub static SPEC: EntitySpec = EntitySpec {
    collection: "announcements",
    display: "Announcement",
    id_param: "announcementId",
    create_schema,
    update_schema,
    create_refs: &[],
    update_refs: &[],
    path_filters: &[],
    populate: &[],
    unique: &[],
    hidden: &[],
    defaults: &[
        ("image", DefaultValue::Text("no-photo.png")),
        ("startedDateTime", DefaultValue::Now),
    ],
};

fn base() -> BodySchema {
    BodySchema::new()
        .field("title", text().max(250))
        .field("description", text())
        .field("image", text())
        .field("startedDateTime", iso_date().min_now())
        .field("endedDateTime", iso_date().min_now())
}

fn create_schema() -> BodySchema {
    base().require(&["title", "description"])
}

fn update_schema() -> BodySchema {
    base()
}
