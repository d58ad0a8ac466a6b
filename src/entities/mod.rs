pub mod announcements;
pub mod cinemas;
pub mod countries;
pub mod genres;
pub mod hall_types;
pub mod halls;
pub mod languages;
pub mod memberships;
pub mod movie_types;
pub mod movies;
pub mod purchases;
pub mod settings;
pub mod showtimes;
pub mod users;

use crate::pipeline::{BodySchema, PathFilterRule, PopulateRule, ReferenceRule};

/// Value filled into a missing body field on create
#[derive(Debug, Clone, Copy)]
pub enum DefaultValue {
    Text(&'static str),
    Now,
}

/// Static descriptor driving the generic CRUD pipeline for one collection.
/// The pipeline functions interpret these tables; entities carry no code of
/// their own beyond schema construction.
pub struct EntitySpec {
    pub collection: &'static str,
    pub display: &'static str,
    /// Path parameter naming this entity's id in routes. Shared with the
    /// nested listings under the entity so route patterns stay consistent.
    pub id_param: &'static str,
    pub create_schema: fn() -> BodySchema,
    pub update_schema: fn() -> BodySchema,
    pub create_refs: &'static [ReferenceRule],
    pub update_refs: &'static [ReferenceRule],
    pub path_filters: &'static [PathFilterRule],
    pub populate: &'static [PopulateRule],
    pub unique: &'static [&'static str],
    pub hidden: &'static [&'static str],
    pub defaults: &'static [(&'static str, DefaultValue)],
}

pub static ALL: &[&EntitySpec] = &[
    &genres::SPEC,
    &movie_types::SPEC,
    &languages::SPEC,
    &countries::SPEC,
    &movies::SPEC,
    &cinemas::SPEC,
    &halls::SPEC,
    &hall_types::SPEC,
    &showtimes::SPEC,
    &settings::SPEC,
    &announcements::SPEC,
    &memberships::SPEC,
    &users::SPEC,
    &purchases::SPEC,
];

pub fn spec_for(collection: &str) -> Option<&'static EntitySpec> {
    ALL.iter().find(|spec| spec.collection == collection).copied()
}

pub fn collections() -> Vec<&'static str> {
    ALL.iter().map(|spec| spec.collection).collect()
}

/// Hidden-field lookup passed to population so referenced documents are
/// sanitized the same way as top-level ones
pub fn hidden_for(collection: &str) -> &'static [&'static str] {
    spec_for(collection).map(|spec| spec.hidden).unwrap_or(&[])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_resolves_collections() {
        assert_eq!(spec_for("genres").map(|s| s.display), Some("Genre"));
        assert_eq!(spec_for("movie-types").map(|s| s.display), Some("Movie type"));
        assert!(spec_for("nonexistent").is_none());
    }

    #[test]
    fn collection_names_are_store_safe() {
        for name in collections() {
            assert!(
                name.chars().all(|c| c.is_ascii_lowercase() || c == '-' || c == '_'),
                "unsafe collection name {name}"
            );
        }
    }

    #[test]
    fn users_hide_their_password() {
        assert_eq!(hidden_for("users"), &["password"]);
        assert!(hidden_for("genres").is_empty());
    }
}
