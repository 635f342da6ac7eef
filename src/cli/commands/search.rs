//! cli::commands::search
//!
//! `--search`: occurrence search with the `--s*` filters.
//!
//! `--sFields` is applied here rather than by GBIF: the search endpoint
//! always returns full records, so each record in `results` is cut down to
//! the selected fields before printing.

use serde_json::Value;

use super::{CommandError, Invocation};
use crate::backend::SearchParams;
use crate::cli::args::{Cli, SearchArgs};
use crate::core::config::Credentials;

/// Page size when `--limit` is not given.
pub const DEFAULT_SEARCH_LIMIT: u32 = 300;

pub(super) fn build(cli: &Cli, _: &Credentials) -> Result<Invocation, CommandError> {
    let params = search_params(
        &cli.search,
        cli.limit.unwrap_or(DEFAULT_SEARCH_LIMIT),
        cli.offset.unwrap_or(0),
    );
    if !params.has_filter() {
        return Err(CommandError::MissingArgument("More arguments are required"));
    }
    let fields = cli.search.fields.as_deref().and_then(FieldSelection::parse);
    Ok(Invocation::Search { params, fields })
}

fn search_params(args: &SearchArgs, limit: u32, offset: u32) -> SearchParams {
    SearchParams {
        q: args.q.clone(),
        spell_check: args.spell_check,
        repatriated: args.repatriated.clone(),
        taxon_key: args.taxon_key,
        kingdom_key: args.kingdom_key,
        phylum_key: args.phylum_key,
        class_key: args.class_key,
        order_key: args.order_key,
        family_key: args.family_key,
        genus_key: args.genus_key,
        subgenus_key: args.subgenus_key,
        scientific_name: args.scientific_name.clone(),
        dataset_key: args.dataset_key.clone(),
        catalog_number: args.catalog_number.clone(),
        recorded_by: args.recorded_by.clone(),
        collection_code: args.collection_code.clone(),
        institution_code: args.institution_code.clone(),
        country: args.country.clone(),
        publishing_country: args.publishing_country.clone(),
        basis_of_record: args.basis_of_record,
        event_date: args.event_date.clone(),
        year: args.year.clone(),
        month: args.month.clone(),
        decimal_latitude: args.decimal_latitude.clone(),
        decimal_longitude: args.decimal_longitude.clone(),
        elevation: args.elevation.clone(),
        depth: args.depth.clone(),
        geometry: args.geometry.clone(),
        has_geospatial_issue: args.has_geospatial_issue,
        issue: args.issue.clone(),
        has_coordinate: args.has_coordinate,
        type_status: args.type_status.clone(),
        record_number: args.record_number.clone(),
        last_interpreted: args.last_interpreted.clone(),
        continent: args.continent,
        mediatype: args.mediatype,
        establishment_means: args.establishment_means,
        facet: args.facet.clone(),
        facet_mincount: args.facet_mincount,
        facet_multiselect: args.facet_multiselect,
        limit,
        offset,
    }
}

/// Fields kept in each search result (`--sFields`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldSelection {
    /// Key, scientific name and coordinates.
    Minimal,
    /// The named fields.
    Only(Vec<String>),
}

impl FieldSelection {
    const MINIMAL: &'static [&'static str] = &[
        "key",
        "scientificName",
        "decimalLatitude",
        "decimalLongitude",
    ];

    /// Parse an `--sFields` value. `all` (or nothing) keeps every field.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.is_empty() || raw.eq_ignore_ascii_case("all") {
            return None;
        }
        if raw.eq_ignore_ascii_case("minimal") {
            return Some(FieldSelection::Minimal);
        }
        let fields: Vec<String> = raw
            .split(',')
            .map(str::trim)
            .filter(|f| !f.is_empty())
            .map(String::from)
            .collect();
        if fields.is_empty() {
            None
        } else {
            Some(FieldSelection::Only(fields))
        }
    }

    fn keeps(&self, field: &str) -> bool {
        match self {
            FieldSelection::Minimal => Self::MINIMAL.contains(&field),
            FieldSelection::Only(fields) => fields.iter().any(|f| f == field),
        }
    }

    /// Cut every record of a search page down to the selected fields.
    ///
    /// Paging metadata (`count`, `offset`, `endOfRecords`, ...) is left
    /// alone. Anything that is not a page with a `results` array passes
    /// through unchanged.
    pub fn apply(&self, mut page: Value) -> Value {
        if let Some(Value::Array(records)) = page.get_mut("results") {
            for record in records.iter_mut() {
                if let Value::Object(fields) = record {
                    fields.retain(|name, _| self.keeps(name));
                }
            }
        }
        page
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use serde_json::json;

    fn build_from(args: &[&str]) -> Result<Invocation, CommandError> {
        build(&Cli::parse_from(args), &Credentials::default())
    }

    #[test]
    fn search_without_filter_is_a_usage_error() {
        let err = build_from(&["gbif", "-s", "--limit", "5"]).unwrap_err();
        assert_eq!(err.to_string(), "More arguments are required");
        assert!(err.is_usage());
    }

    #[test]
    fn fields_alone_is_not_a_filter() {
        assert!(build_from(&["gbif", "-s", "--sFields", "minimal"]).is_err());
    }

    #[test]
    fn default_paging() {
        match build_from(&["gbif", "-s", "--sTaxonKey", "2435099"]).unwrap() {
            Invocation::Search { params, fields } => {
                assert_eq!(params.taxon_key, Some(2435099));
                assert_eq!(params.limit, DEFAULT_SEARCH_LIMIT);
                assert_eq!(params.offset, 0);
                assert_eq!(fields, None);
            }
            other => panic!("unexpected invocation: {:?}", other),
        }
    }

    #[test]
    fn explicit_paging_and_fields() {
        let invocation = build_from(&[
            "gbif", "-s", "--q", "puma", "--limit", "10", "--offset", "20", "--sFields", "key, year",
        ])
        .unwrap();
        match invocation {
            Invocation::Search { params, fields } => {
                assert_eq!(params.q.as_deref(), Some("puma"));
                assert_eq!((params.limit, params.offset), (10, 20));
                assert_eq!(
                    fields,
                    Some(FieldSelection::Only(vec!["key".into(), "year".into()]))
                );
            }
            other => panic!("unexpected invocation: {:?}", other),
        }
    }

    #[test]
    fn parse_selection() {
        assert_eq!(FieldSelection::parse("all"), None);
        assert_eq!(FieldSelection::parse(" "), None);
        assert_eq!(FieldSelection::parse(",,"), None);
        assert_eq!(FieldSelection::parse("MINIMAL"), Some(FieldSelection::Minimal));
    }

    #[test]
    fn minimal_keeps_core_fields_in_record_order() {
        let page = json!({
            "offset": 0,
            "count": 1,
            "results": [{
                "decimalLongitude": -8.6,
                "key": 1,
                "country": "Portugal",
                "scientificName": "Puma concolor",
                "decimalLatitude": 41.1
            }]
        });
        let trimmed = FieldSelection::Minimal.apply(page);
        assert_eq!(
            trimmed.to_string(),
            r#"{"offset":0,"count":1,"results":[{"decimalLongitude":-8.6,"key":1,"scientificName":"Puma concolor","decimalLatitude":41.1}]}"#
        );
    }

    #[test]
    fn non_page_values_pass_through() {
        let value = json!(["a", "b"]);
        assert_eq!(FieldSelection::Minimal.apply(value.clone()), value);
    }
}
