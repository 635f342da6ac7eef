//! backend::types
//!
//! Request types passed from the dispatcher to an `Occurrences` backend.
//!
//! Each parameter struct owns the mapping from its fields to GBIF query
//! parameter names (`to_query`), so the HTTP client never needs to know
//! about command-line flags.

use std::fmt;

use serde_json::{json, Map, Value};
use thiserror::Error;

use super::vocab::{BasisOfRecord, Continent, DownloadFormat, EstablishmentMeans, MediaType, PredicateType};

/// Query string as ordered `(name, value)` pairs.
pub type Query = Vec<(&'static str, String)>;

/// Parameters of an occurrence search.
///
/// Range-capable filters (`year`, `month`, coordinates, `elevation`,
/// `depth`, dates) are kept as strings so values like `1990,2000` pass
/// through untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchParams {
    pub q: Option<String>,
    pub spell_check: bool,
    pub repatriated: Option<String>,
    pub taxon_key: Option<u64>,
    pub kingdom_key: Option<u64>,
    pub phylum_key: Option<u64>,
    pub class_key: Option<u64>,
    pub order_key: Option<u64>,
    pub family_key: Option<u64>,
    pub genus_key: Option<u64>,
    pub subgenus_key: Option<u64>,
    pub scientific_name: Option<String>,
    pub dataset_key: Option<String>,
    pub catalog_number: Option<String>,
    pub recorded_by: Option<String>,
    pub collection_code: Option<String>,
    pub institution_code: Option<String>,
    pub country: Option<String>,
    pub publishing_country: Option<String>,
    pub basis_of_record: Option<BasisOfRecord>,
    pub event_date: Option<String>,
    pub year: Option<String>,
    pub month: Option<String>,
    pub decimal_latitude: Option<String>,
    pub decimal_longitude: Option<String>,
    pub elevation: Option<String>,
    pub depth: Option<String>,
    pub geometry: Option<String>,
    pub has_geospatial_issue: bool,
    pub issue: Option<String>,
    pub has_coordinate: bool,
    pub type_status: Option<String>,
    pub record_number: Option<String>,
    pub last_interpreted: Option<String>,
    pub continent: Option<Continent>,
    pub mediatype: Option<MediaType>,
    pub establishment_means: Option<EstablishmentMeans>,
    pub facet: Option<String>,
    pub facet_mincount: Option<u32>,
    pub facet_multiselect: bool,
    pub limit: u32,
    pub offset: u32,
}

impl SearchParams {
    /// Whether any filter is set. Paging fields do not count.
    pub fn has_filter(&self) -> bool {
        let paging = Self {
            limit: self.limit,
            offset: self.offset,
            ..Self::default()
        };
        *self != paging
    }

    /// GBIF query parameters. Unset filters and `false` flags are omitted.
    pub fn to_query(&self) -> Query {
        let mut query = Query::new();
        push(&mut query, "q", &self.q);
        push_flag(&mut query, "spellCheck", self.spell_check);
        push(&mut query, "repatriated", &self.repatriated);
        push(&mut query, "taxonKey", &self.taxon_key);
        push(&mut query, "kingdomKey", &self.kingdom_key);
        push(&mut query, "phylumKey", &self.phylum_key);
        push(&mut query, "classKey", &self.class_key);
        push(&mut query, "orderKey", &self.order_key);
        push(&mut query, "familyKey", &self.family_key);
        push(&mut query, "genusKey", &self.genus_key);
        push(&mut query, "subgenusKey", &self.subgenus_key);
        push(&mut query, "scientificName", &self.scientific_name);
        push(&mut query, "datasetKey", &self.dataset_key);
        push(&mut query, "catalogNumber", &self.catalog_number);
        push(&mut query, "recordedBy", &self.recorded_by);
        push(&mut query, "collectionCode", &self.collection_code);
        push(&mut query, "institutionCode", &self.institution_code);
        push(&mut query, "country", &self.country);
        push(&mut query, "publishingCountry", &self.publishing_country);
        push(&mut query, "basisOfRecord", &self.basis_of_record);
        push(&mut query, "eventDate", &self.event_date);
        push(&mut query, "year", &self.year);
        push(&mut query, "month", &self.month);
        push(&mut query, "decimalLatitude", &self.decimal_latitude);
        push(&mut query, "decimalLongitude", &self.decimal_longitude);
        push(&mut query, "elevation", &self.elevation);
        push(&mut query, "depth", &self.depth);
        push(&mut query, "geometry", &self.geometry);
        push_flag(&mut query, "hasGeospatialIssue", self.has_geospatial_issue);
        push(&mut query, "issue", &self.issue);
        push_flag(&mut query, "hasCoordinate", self.has_coordinate);
        push(&mut query, "typeStatus", &self.type_status);
        push(&mut query, "recordNumber", &self.record_number);
        push(&mut query, "lastInterpreted", &self.last_interpreted);
        push(&mut query, "continent", &self.continent);
        if let Some(mediatype) = self.mediatype.and_then(|m| m.api_value()) {
            query.push(("mediaType", mediatype.to_string()));
        }
        push(&mut query, "establishmentMeans", &self.establishment_means);
        if let Some(ref facet) = self.facet {
            // GBIF takes one facet parameter per field
            for field in facet.split(',').map(str::trim).filter(|f| !f.is_empty()) {
                query.push(("facet", field.to_string()));
            }
        }
        push(&mut query, "facetMincount", &self.facet_mincount);
        push_flag(&mut query, "facetMultiselect", self.facet_multiselect);
        query.push(("limit", self.limit.to_string()));
        query.push(("offset", self.offset.to_string()));
        query
    }
}

/// Dimensions of an occurrence count.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CountParams {
    pub taxon_key: Option<u64>,
    pub basis_of_record: Option<BasisOfRecord>,
    pub country: Option<String>,
    pub is_georeferenced: bool,
    pub dataset_key: Option<String>,
    pub publishing_country: Option<String>,
    pub type_status: Option<String>,
    pub issue: Option<String>,
    pub year: Option<String>,
}

impl CountParams {
    /// Whether at least one dimension is set.
    pub fn has_dimension(&self) -> bool {
        *self != Self::default()
    }

    /// GBIF query parameters for `/occurrence/count`.
    pub fn to_query(&self) -> Query {
        let mut query = Query::new();
        push(&mut query, "taxonKey", &self.taxon_key);
        push(&mut query, "basisOfRecord", &self.basis_of_record);
        push(&mut query, "country", &self.country);
        push_flag(&mut query, "isGeoreferenced", self.is_georeferenced);
        push(&mut query, "datasetKey", &self.dataset_key);
        push(&mut query, "publishingCountry", &self.publishing_country);
        push(&mut query, "typeStatus", &self.type_status);
        push(&mut query, "issue", &self.issue);
        push(&mut query, "year", &self.year);
        query
    }
}

fn push<T: fmt::Display>(query: &mut Query, name: &'static str, value: &Option<T>) {
    if let Some(value) = value {
        query.push((name, value.to_string()));
    }
}

fn push_flag(query: &mut Query, name: &'static str, set: bool) {
    if set {
        query.push((name, "true".to_string()));
    }
}

/// Username and password for authenticated download endpoints.
#[derive(Clone, PartialEq, Eq)]
pub struct BasicAuth {
    pub user: String,
    pub password: String,
}

// Custom Debug to avoid exposing the password
impl fmt::Debug for BasicAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BasicAuth")
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Whether `key` has the shape of a GBIF download key
/// (`0000066-140928181241064`): ASCII letters, digits and dashes only.
///
/// Keys end up as a URL path segment and as a file name, so anything that
/// could step out of either (`/`, `\`, `..`) is rejected.
pub fn is_download_key(key: &str) -> bool {
    !key.is_empty() && key.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
}

/// Errors from parsing `--queries` values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    #[error("no download queries given")]
    Empty,

    #[error("malformed query '{0}': expected 'key operator value'")]
    Malformed(String),

    #[error("unknown operator '{operator}' in query '{query}'")]
    UnknownOperator { query: String, operator: String },

    #[error("--q_type {0} takes exactly one query; use and/or to combine several")]
    SingleQueryExpected(PredicateType),
}

/// One parsed `key operator value` download query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Predicate {
    pub kind: PredicateType,
    /// GBIF search parameter in upper snake case (`TAXON_KEY`). Unused by `within`.
    pub key: String,
    pub value: String,
    /// `!=` is sent as `not(equals)`.
    pub negated: bool,
}

impl Predicate {
    /// Parse a query such as `country = US` or `geometry within POLYGON((...))`.
    ///
    /// The value is everything after the operator, so WKT geometries with
    /// spaces survive.
    pub fn parse(query: &str) -> Result<Self, QueryError> {
        let trimmed = query.trim();
        let (key, rest) = next_token(trimmed);
        let (operator, value) = next_token(rest);
        if key.is_empty() || operator.is_empty() || value.is_empty() {
            return Err(QueryError::Malformed(trimmed.to_string()));
        }

        let (kind, negated) = match operator {
            "=" | "==" => (PredicateType::Equals, false),
            "!=" => (PredicateType::Equals, true),
            "<" => (PredicateType::LessThan, false),
            "<=" => (PredicateType::LessThanOrEquals, false),
            ">" => (PredicateType::GreaterThan, false),
            ">=" => (PredicateType::GreaterThanOrEquals, false),
            "in" => (PredicateType::In, false),
            "within" => (PredicateType::Within, false),
            "like" => (PredicateType::Like, false),
            other => {
                return Err(QueryError::UnknownOperator {
                    query: trimmed.to_string(),
                    operator: other.to_string(),
                })
            }
        };

        Ok(Self {
            kind,
            key: search_parameter_name(key),
            value: value.to_string(),
            negated,
        })
    }

    /// GBIF predicate JSON.
    pub fn to_json(&self) -> Value {
        let leaf = match self.kind {
            PredicateType::Within => json!({ "type": "within", "geometry": self.value }),
            PredicateType::In => {
                let values: Vec<&str> = self
                    .value
                    .split(',')
                    .map(str::trim)
                    .filter(|v| !v.is_empty())
                    .collect();
                json!({ "type": "in", "key": self.key, "values": values })
            }
            kind => json!({ "type": kind.to_string(), "key": self.key, "value": self.value }),
        };
        if self.negated {
            json!({ "type": "not", "predicate": leaf })
        } else {
            leaf
        }
    }
}

/// Split off the first whitespace-delimited token; the rest keeps its
/// inner spacing.
fn next_token(s: &str) -> (&str, &str) {
    match s.find(char::is_whitespace) {
        Some(i) => (&s[..i], s[i..].trim()),
        None => (s, ""),
    }
}

/// Convert a camelCase parameter (`taxonKey`) to GBIF's `TAXON_KEY`.
///
/// Names already in upper snake case are returned unchanged.
pub fn search_parameter_name(key: &str) -> String {
    let mut out = String::with_capacity(key.len() + 4);
    let mut prev_lower = false;
    for c in key.chars() {
        if c.is_ascii_uppercase() && prev_lower {
            out.push('_');
        }
        prev_lower = c.is_ascii_lowercase() || c.is_ascii_digit();
        out.push(c.to_ascii_uppercase());
    }
    out
}

/// A download request ready to submit.
#[derive(Debug, Clone, PartialEq)]
pub struct DownloadRequest {
    pub auth: BasicAuth,
    /// Address GBIF notifies when the archive is ready.
    pub email: String,
    pub format: DownloadFormat,
    pub predicate: Value,
}

impl DownloadRequest {
    /// Build a request from raw `--queries` values combined under `pred_type`.
    ///
    /// Combinators (`and`, `or`) wrap all queries; `not` wraps a single
    /// query or an `and` of several. Any other type expects exactly one
    /// query and sends it as the bare predicate.
    pub fn new(
        queries: &[String],
        pred_type: PredicateType,
        format: DownloadFormat,
        auth: BasicAuth,
        email: impl Into<String>,
    ) -> Result<Self, QueryError> {
        if queries.is_empty() {
            return Err(QueryError::Empty);
        }
        let predicates = queries
            .iter()
            .map(|q| Predicate::parse(q).map(|p| p.to_json()))
            .collect::<Result<Vec<_>, _>>()?;

        if !pred_type.is_combinator() && predicates.len() != 1 {
            return Err(QueryError::SingleQueryExpected(pred_type));
        }

        let predicate = match pred_type {
            PredicateType::And | PredicateType::Or => {
                json!({ "type": pred_type.to_string(), "predicates": predicates })
            }
            PredicateType::Not if predicates.len() > 1 => {
                json!({ "type": "not", "predicate": { "type": "and", "predicates": predicates } })
            }
            PredicateType::Not => {
                let inner = predicates.into_iter().next().unwrap_or(Value::Null);
                json!({ "type": "not", "predicate": inner })
            }
            _ => predicates.into_iter().next().unwrap_or(Value::Null),
        };

        Ok(Self {
            auth,
            email: email.into(),
            format,
            predicate,
        })
    }

    /// JSON body for `POST /occurrence/download/request`.
    pub fn payload(&self) -> Value {
        let mut body = Map::new();
        body.insert("creator".into(), json!(self.auth.user));
        body.insert("notificationAddresses".into(), json!([self.email]));
        body.insert("sendNotification".into(), json!(true));
        body.insert("format".into(), json!(self.format.to_string()));
        body.insert("predicate".into(), self.predicate.clone());
        Value::Object(body)
    }
}
