//! cli::args
//!
//! Command-line argument definitions using clap derive.
//!
//! # Shape
//!
//! The CLI has no subcommands. Commands are presence flags (`--search`,
//! `--get`, `--count_year`, ...) and each command reads its companion
//! options from the same flat namespace (`--gKey`, `--cYear`, `--queries`).
//! Companions are grouped by command in the help output.
//!
//! # Legacy spellings
//!
//! The tool also accepts single-dash multi-letter
//! aliases (`-json`, `-gv`, `-cy`, ...). clap reads those as bundles of
//! short flags, so [`normalize_legacy_args`] rewrites them to their long
//! forms before parsing.

use std::ffi::OsString;
use std::path::PathBuf;

use clap::{ArgMatches, Args, CommandFactory, FromArgMatches, Parser, ValueEnum};

use crate::backend::{
    BasisOfRecord, Continent, DownloadFormat, EstablishmentMeans, MediaType, PredicateType,
};

/// gbif - query the GBIF occurrence API from the command line
#[derive(Parser, Debug, Clone)]
#[command(name = "gbif")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Show the parsed arguments and exit without calling GBIF
    #[arg(short, long)]
    pub verbose: bool,

    /// Pretty-print JSON output with two-space indentation
    #[arg(long)]
    pub json: bool,

    /// Sort object keys in JSON output
    #[arg(long = "sort-keys")]
    pub sort_keys: bool,

    /// Number of results per page [default: 300 for --search, 20 for --download_list]
    #[arg(long, value_name = "N")]
    pub limit: Option<u32>,

    /// Offset of the first result; limit 20 and offset 20 gets the second page
    #[arg(long, value_name = "N")]
    pub offset: Option<u32>,

    /// Enable debug logging on stderr
    #[arg(long)]
    pub debug: bool,

    /// Settings file [default: $GBIF_CONFIG or ~/.gbif/config.toml]
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Print a shell completion script and exit
    #[arg(long, value_name = "SHELL")]
    pub completions: Option<Shell>,

    #[command(flatten)]
    pub search: SearchArgs,

    #[command(flatten)]
    pub get: GetArgs,

    #[command(flatten)]
    pub count: CountArgs,

    #[command(flatten)]
    pub download: DownloadArgs,
}

impl Cli {
    /// Parse `args` (program name first), keeping the raw matches for the
    /// verbose dump.
    pub fn try_parse_with_matches<I, T>(args: I) -> Result<(Self, ArgMatches), clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        let matches = Self::command().try_get_matches_from(normalize_legacy_args(args))?;
        let cli = Self::from_arg_matches(&matches)?;
        Ok((cli, matches))
    }
}

/// Supported shells for completion scripts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    #[value(name = "powershell")]
    PowerShell,
}

/// `--search` and its filters.
#[derive(Args, Debug, Clone, Default)]
#[command(next_help_heading = "Search")]
pub struct SearchArgs {
    /// Search GBIF occurrences; needs --q or at least one --s* filter
    #[arg(short = 's', long = "search")]
    pub search: bool,

    /// Simple search parameter; a word or a phrase
    #[arg(long = "q", value_name = "TEXT")]
    pub q: Option<String>,

    /// Ask GBIF to check the spelling of --q
    #[arg(long = "sSpellCheck", id = "sSpellCheck")]
    pub spell_check: bool,

    /// Records whose publishing country differs from the country they were recorded in
    #[arg(long = "sRepatriated", id = "sRepatriated", value_name = "BOOL")]
    pub repatriated: Option<String>,

    /// Taxon key from the GBIF backbone
    #[arg(long = "sTaxonKey", id = "sTaxonKey", value_name = "KEY")]
    pub taxon_key: Option<u64>,

    /// Kingdom classification key
    #[arg(long = "sKingdomKey", id = "sKingdomKey", value_name = "KEY")]
    pub kingdom_key: Option<u64>,

    /// Phylum classification key
    #[arg(long = "sPhylumKey", id = "sPhylumKey", value_name = "KEY")]
    pub phylum_key: Option<u64>,

    /// Class classification key
    #[arg(long = "sClassKey", id = "sClassKey", value_name = "KEY")]
    pub class_key: Option<u64>,

    /// Order classification key
    #[arg(long = "sOrderKey", id = "sOrderKey", value_name = "KEY")]
    pub order_key: Option<u64>,

    /// Family classification key
    #[arg(long = "sFamilyKey", id = "sFamilyKey", value_name = "KEY")]
    pub family_key: Option<u64>,

    /// Genus classification key
    #[arg(long = "sGenusKey", id = "sGenusKey", value_name = "KEY")]
    pub genus_key: Option<u64>,

    /// Subgenus classification key
    #[arg(long = "sSubgenusKey", id = "sSubgenusKey", value_name = "KEY")]
    pub subgenus_key: Option<u64>,

    /// Scientific name from the GBIF backbone; included and synonym taxa match too
    #[arg(long = "sScientificName", id = "sScientificName", value_name = "NAME")]
    pub scientific_name: Option<String>,

    /// Occurrence dataset key (a UUID)
    #[arg(long = "sDatasetKey", id = "sDatasetKey", value_name = "UUID")]
    pub dataset_key: Option<String>,

    /// Catalog number assigned by the source collection
    #[arg(long = "sCatalogNumber", id = "sCatalogNumber")]
    pub catalog_number: Option<String>,

    /// Person who recorded the occurrence
    #[arg(long = "sRecordedBy", id = "sRecordedBy")]
    pub recorded_by: Option<String>,

    /// Collection code within the institution
    #[arg(long = "sCollectionCode", id = "sCollectionCode")]
    pub collection_code: Option<String>,

    /// Code of the institution the record belongs to
    #[arg(long = "sInstitutionCode", id = "sInstitutionCode")]
    pub institution_code: Option<String>,

    /// ISO-3166-1 two-letter code of the country the occurrence was recorded in
    #[arg(long = "sCountry", id = "sCountry", value_name = "CC")]
    pub country: Option<String>,

    /// ISO-3166-1 two-letter code of the publishing organization's country
    #[arg(long = "sPublishingCountry", id = "sPublishingCountry", value_name = "CC")]
    pub publishing_country: Option<String>,

    /// Basis of record
    #[arg(long = "sBasisOfRecord", id = "sBasisOfRecord", value_enum)]
    pub basis_of_record: Option<BasisOfRecord>,

    /// Occurrence date (yyyy, yyyy-MM, yyyy-MM-dd or MM-dd); ranges as smaller,larger
    #[arg(long = "sEventDate", id = "sEventDate", value_name = "DATE")]
    pub event_date: Option<String>,

    /// Four-digit year; ranges as smaller,larger (1990,1991)
    #[arg(long = "sYear", id = "sYear", value_name = "YEAR")]
    pub year: Option<String>,

    /// Month of the year starting at 1; ranges as smaller,larger
    #[arg(long = "sMonth", id = "sMonth", value_name = "MONTH")]
    pub month: Option<String>,

    /// Latitude between -90 and 90 (WGS 84); ranges as smaller,larger
    #[arg(
        long = "sDecimalLatitude",
        id = "sDecimalLatitude",
        value_name = "LAT",
        allow_hyphen_values = true
    )]
    pub decimal_latitude: Option<String>,

    /// Longitude between -180 and 180 (WGS 84); ranges as smaller,larger
    #[arg(
        long = "sDecimalLongitude",
        id = "sDecimalLongitude",
        value_name = "LON",
        allow_hyphen_values = true
    )]
    pub decimal_longitude: Option<String>,

    /// Elevation in meters above sea level; ranges as smaller,larger
    #[arg(
        long = "sElevation",
        id = "sElevation",
        value_name = "M",
        allow_hyphen_values = true
    )]
    pub elevation: Option<String>,

    /// Depth in meters relative to elevation; ranges as smaller,larger
    #[arg(
        long = "sDepth",
        id = "sDepth",
        value_name = "M",
        allow_hyphen_values = true
    )]
    pub depth: Option<String>,

    /// WKT shape (POINT, LINESTRING, LINEARRING, POLYGON or MULTIPOLYGON)
    #[arg(long = "sGeometry", id = "sGeometry", value_name = "WKT")]
    pub geometry: Option<String>,

    /// Only records with spatial issues
    #[arg(long = "sHasGeospatialIssue", id = "sHasGeospatialIssue")]
    pub has_geospatial_issue: bool,

    /// Only records flagged with this interpretation issue
    #[arg(long = "sIssue", id = "sIssue")]
    pub issue: Option<String>,

    /// Only records with coordinates
    #[arg(long = "sHasCoordinate", id = "sHasCoordinate")]
    pub has_coordinate: bool,

    /// Type status of the specimen
    #[arg(long = "sTypeStatus", id = "sTypeStatus")]
    pub type_status: Option<String>,

    /// Number recorded by the collector, not the GBIF record number
    #[arg(long = "sRecordNumber", id = "sRecordNumber")]
    pub record_number: Option<String>,

    /// Date the record was last modified in GBIF; ranges as smaller,larger
    #[arg(long = "sLastInterpreted", id = "sLastInterpreted", value_name = "DATE")]
    pub last_interpreted: Option<String>,

    /// Continent
    #[arg(long = "sContinent", id = "sContinent", value_enum)]
    pub continent: Option<Continent>,

    /// Fields to keep in each result: `minimal` or a comma-separated list
    #[arg(long = "sFields", id = "sFields", value_name = "FIELDS")]
    pub fields: Option<String>,

    /// Media type
    #[arg(long = "sMediatype", id = "sMediatype", value_enum)]
    pub mediatype: Option<MediaType>,

    /// Facet fields, comma-separated
    #[arg(long = "sFacet", id = "sFacet", value_name = "FIELDS")]
    pub facet: Option<String>,

    /// Establishment means
    #[arg(long = "sEstablishmentMeans", id = "sEstablishmentMeans", value_enum)]
    pub establishment_means: Option<EstablishmentMeans>,

    /// Minimum number of records for a facet value to be returned
    #[arg(long = "sFacetMincount", id = "sFacetMincount", value_name = "N")]
    pub facet_mincount: Option<u32>,

    /// Return counts for facet values that are not currently filtered
    #[arg(long = "sFacetMultiselect", id = "sFacetMultiselect")]
    pub facet_multiselect: bool,
}

/// `--get` family.
#[derive(Args, Debug, Clone, Default)]
#[command(next_help_heading = "Get")]
pub struct GetArgs {
    /// Details of a single interpreted occurrence; needs --gKey
    #[arg(short = 'g', long = "get")]
    pub get: bool,

    /// Verbatim occurrence record without interpretation; needs --gKey
    #[arg(long = "get_verbatim")]
    pub get_verbatim: bool,

    /// Raw occurrence fragment (xml or json); needs --gKey
    #[arg(long = "get_fragment")]
    pub get_fragment: bool,

    /// GBIF occurrence key
    #[arg(long = "gKey", id = "gKey", value_name = "KEY")]
    pub key: Option<u64>,
}

/// `--count` family.
#[derive(Args, Debug, Clone, Default)]
#[command(next_help_heading = "Count")]
pub struct CountArgs {
    /// Occurrence count over predefined dimensions; needs at least one --c* dimension
    #[arg(short = 'c', long = "count")]
    pub count: bool,

    /// Occurrence counts by basis of record
    #[arg(long = "count_basisofrecord")]
    pub count_basisofrecord: bool,

    /// Occurrence counts by year; needs --cYear
    #[arg(long = "count_year")]
    pub count_year: bool,

    /// Counts for datasets covering a taxon or country; needs --cTaxonKey and/or --cCountry
    #[arg(long = "count_datasets")]
    pub count_datasets: bool,

    /// Counts for countries covered by data published by a country; needs --cPublishingCountry
    #[arg(long = "count_country")]
    pub count_country: bool,

    /// Metrics supported by the count service
    #[arg(long = "count_schema")]
    pub count_schema: bool,

    /// Counts for countries publishing data about a country; needs --cCountry
    #[arg(long = "count_publishingCountry")]
    pub count_publishing_country: bool,

    /// Basis of record
    #[arg(long = "cBasisOfRecord", id = "cBasisOfRecord", value_enum)]
    pub basis_of_record: Option<BasisOfRecord>,

    /// Two-letter country code
    #[arg(long = "cCountry", id = "cCountry", value_name = "CC")]
    pub country: Option<String>,

    /// Only georeferenced records
    #[arg(long = "cIsGeoreferenced", id = "cIsGeoreferenced")]
    pub is_georeferenced: bool,

    /// Occurrence dataset key (a UUID)
    #[arg(long = "cDatasetKey", id = "cDatasetKey", value_name = "UUID")]
    pub dataset_key: Option<String>,

    /// Two-letter code of the publishing country
    #[arg(long = "cPublishingCountry", id = "cPublishingCountry", value_name = "CC")]
    pub publishing_country: Option<String>,

    /// Nomenclatural type status
    #[arg(long = "cTypeStatus", id = "cTypeStatus")]
    pub type_status: Option<String>,

    /// Interpretation issue
    #[arg(long = "cIssue", id = "cIssue")]
    pub issue: Option<String>,

    /// Four-digit year or range (1990,2000)
    #[arg(long = "cYear", id = "cYear", value_name = "YEAR")]
    pub year: Option<String>,

    /// Taxon key
    #[arg(long = "cTaxonKey", id = "cTaxonKey", value_name = "KEY")]
    pub taxon_key: Option<u64>,
}

/// `--download` family.
#[derive(Args, Debug, Clone, Default)]
#[command(next_help_heading = "Download")]
pub struct DownloadArgs {
    /// Request a download of occurrence data; needs --queries and GBIF_USER/GBIF_PWD/GBIF_EMAIL
    #[arg(short = 'd', long = "download")]
    pub download: bool,

    /// Metadata of a download; needs --dKey
    #[arg(long = "download_meta")]
    pub download_meta: bool,

    /// Downloads created by the user; needs GBIF_USER/GBIF_PWD
    #[arg(long = "download_list")]
    pub download_list: bool,

    /// Fetch a download archive; needs --dKey [--path]
    #[arg(long = "download_get")]
    pub download_get: bool,

    /// Download key, as returned by --download
    #[arg(long = "dKey", id = "dKey", value_name = "KEY")]
    pub key: Option<String>,

    /// Download queries as 'key operator value' (e.g. 'country = US')
    #[arg(short = 'q', long = "queries", num_args = 1.., value_name = "QUERY")]
    pub queries: Vec<String>,

    /// How queries are combined
    #[arg(long = "q_type", value_enum, default_value_t = PredicateType::And)]
    pub q_type: PredicateType,

    /// Archive format
    #[arg(long = "format", value_enum, default_value_t = DownloadFormat::SimpleCsv)]
    pub format: DownloadFormat,

    /// Directory the archive is written to as <key>.zip
    #[arg(long = "path", value_name = "DIR")]
    pub path: Option<PathBuf>,
}

/// Single-dash aliases and their long forms.
pub const LEGACY_ALIASES: &[(&str, &str)] = &[
    ("-json", "--json"),
    ("-gv", "--get_verbatim"),
    ("-gf", "--get_fragment"),
    ("-cf", "--count_basisofrecord"),
    ("-cy", "--count_year"),
    ("-cd", "--count_datasets"),
    ("-cc", "--count_country"),
    ("-cs", "--count_schema"),
    ("-cp", "--count_publishingCountry"),
    ("-dm", "--download_meta"),
    ("-dl", "--download_list"),
    ("-dg", "--download_get"),
];

/// Rewrite legacy single-dash aliases to their long forms.
///
/// Only whole arguments are rewritten, and nothing after a bare `--`.
pub fn normalize_legacy_args<I, T>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let mut after_separator = false;
    args.into_iter()
        .map(Into::into)
        .map(|arg| {
            if after_separator {
                return arg;
            }
            if arg == "--" {
                after_separator = true;
                return arg;
            }
            match arg
                .to_str()
                .and_then(|s| LEGACY_ALIASES.iter().find(|(alias, _)| *alias == s))
            {
                Some((_, long)) => OsString::from(long),
                None => arg,
            }
        })
        .collect()
}
