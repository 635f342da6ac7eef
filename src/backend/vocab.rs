//! backend::vocab
//!
//! Closed GBIF vocabularies accepted on the command line.
//!
//! Each enum derives `ValueEnum` so clap rejects unknown values at parse
//! time, and implements `Display` with the spelling GBIF expects on the wire.

use std::fmt;

use clap::ValueEnum;

/// Basis of record, as defined by the GBIF `BasisOfRecord` vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum BasisOfRecord {
    #[value(name = "FOSSIL_SPECIMEN")]
    FossilSpecimen,
    #[value(name = "HUMAN_OBSERVATION")]
    HumanObservation,
    #[value(name = "LITERATURE")]
    Literature,
    #[value(name = "LIVING_SPECIMEN")]
    LivingSpecimen,
    #[value(name = "MACHINE_OBSERVATION")]
    MachineObservation,
    #[value(name = "OBSERVATION")]
    Observation,
    #[value(name = "PRESERVED_SPECIMEN")]
    PreservedSpecimen,
    #[value(name = "UNKNOWN")]
    Unknown,
}

impl fmt::Display for BasisOfRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BasisOfRecord::FossilSpecimen => "FOSSIL_SPECIMEN",
            BasisOfRecord::HumanObservation => "HUMAN_OBSERVATION",
            BasisOfRecord::Literature => "LITERATURE",
            BasisOfRecord::LivingSpecimen => "LIVING_SPECIMEN",
            BasisOfRecord::MachineObservation => "MACHINE_OBSERVATION",
            BasisOfRecord::Observation => "OBSERVATION",
            BasisOfRecord::PreservedSpecimen => "PRESERVED_SPECIMEN",
            BasisOfRecord::Unknown => "UNKNOWN",
        };
        f.write_str(s)
    }
}

/// Continent filter. Lowercase on the command line, uppercase on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Continent {
    #[value(name = "africa")]
    Africa,
    #[value(name = "antarctica")]
    Antarctica,
    #[value(name = "asia")]
    Asia,
    #[value(name = "europe")]
    Europe,
    #[value(name = "north_america")]
    NorthAmerica,
    #[value(name = "south_america")]
    SouthAmerica,
    #[value(name = "oceania")]
    Oceania,
}

impl fmt::Display for Continent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Continent::Africa => "AFRICA",
            Continent::Antarctica => "ANTARCTICA",
            Continent::Asia => "ASIA",
            Continent::Europe => "EUROPE",
            Continent::NorthAmerica => "NORTH_AMERICA",
            Continent::SouthAmerica => "SOUTH_AMERICA",
            Continent::Oceania => "OCEANIA",
        };
        f.write_str(s)
    }
}

/// Media type filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum MediaType {
    /// No filtering on media type
    #[value(name = "NULL")]
    Null,
    #[value(name = "MovingImage")]
    MovingImage,
    #[value(name = "Sound")]
    Sound,
    #[value(name = "StillImage")]
    StillImage,
}

impl MediaType {
    /// Wire value, or `None` when no filter should be sent.
    pub fn api_value(&self) -> Option<&'static str> {
        match self {
            MediaType::Null => None,
            MediaType::MovingImage => Some("MovingImage"),
            MediaType::Sound => Some("Sound"),
            MediaType::StillImage => Some("StillImage"),
        }
    }
}

/// Establishment means filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum EstablishmentMeans {
    #[value(name = "INTRODUCED")]
    Introduced,
    #[value(name = "INVASIVE")]
    Invasive,
    #[value(name = "MANAGED")]
    Managed,
    #[value(name = "NATIVE")]
    Native,
    #[value(name = "NATURALISED")]
    Naturalised,
    #[value(name = "UNCERTAIN")]
    Uncertain,
}

impl fmt::Display for EstablishmentMeans {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EstablishmentMeans::Introduced => "INTRODUCED",
            EstablishmentMeans::Invasive => "INVASIVE",
            EstablishmentMeans::Managed => "MANAGED",
            EstablishmentMeans::Native => "NATIVE",
            EstablishmentMeans::Naturalised => "NATURALISED",
            EstablishmentMeans::Uncertain => "UNCERTAIN",
        };
        f.write_str(s)
    }
}

/// Archive format of an occurrence download.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum DownloadFormat {
    #[default]
    #[value(name = "SIMPLE_CSV")]
    SimpleCsv,
    #[value(name = "DWCA")]
    Dwca,
    #[value(name = "SPECIES_LIST")]
    SpeciesList,
    #[value(name = "SIMPLE_AVRO")]
    SimpleAvro,
    #[value(name = "SIMPLE_PARQUET")]
    SimpleParquet,
}

impl fmt::Display for DownloadFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DownloadFormat::SimpleCsv => "SIMPLE_CSV",
            DownloadFormat::Dwca => "DWCA",
            DownloadFormat::SpeciesList => "SPECIES_LIST",
            DownloadFormat::SimpleAvro => "SIMPLE_AVRO",
            DownloadFormat::SimpleParquet => "SIMPLE_PARQUET",
        };
        f.write_str(s)
    }
}

/// Predicate type used to combine download queries (`--q_type`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum PredicateType {
    #[value(name = "equals")]
    Equals,
    #[default]
    #[value(name = "and")]
    And,
    #[value(name = "or")]
    Or,
    #[value(name = "lessThan")]
    LessThan,
    #[value(name = "lessThanOrEquals")]
    LessThanOrEquals,
    #[value(name = "greaterThan")]
    GreaterThan,
    #[value(name = "greaterThanOrEquals")]
    GreaterThanOrEquals,
    #[value(name = "in")]
    In,
    #[value(name = "within")]
    Within,
    #[value(name = "not")]
    Not,
    #[value(name = "like")]
    Like,
}

impl PredicateType {
    /// Whether this type combines other predicates rather than testing a key.
    pub fn is_combinator(&self) -> bool {
        matches!(
            self,
            PredicateType::And | PredicateType::Or | PredicateType::Not
        )
    }
}

impl fmt::Display for PredicateType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PredicateType::Equals => "equals",
            PredicateType::And => "and",
            PredicateType::Or => "or",
            PredicateType::LessThan => "lessThan",
            PredicateType::LessThanOrEquals => "lessThanOrEquals",
            PredicateType::GreaterThan => "greaterThan",
            PredicateType::GreaterThanOrEquals => "greaterThanOrEquals",
            PredicateType::In => "in",
            PredicateType::Within => "within",
            PredicateType::Not => "not",
            PredicateType::Like => "like",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_matches_cli_spelling_for_uppercase_vocabularies() {
        for value in BasisOfRecord::value_variants() {
            let cli = value.to_possible_value().unwrap();
            assert_eq!(cli.get_name(), value.to_string());
        }
        for value in DownloadFormat::value_variants() {
            let cli = value.to_possible_value().unwrap();
            assert_eq!(cli.get_name(), value.to_string());
        }
        for value in PredicateType::value_variants() {
            let cli = value.to_possible_value().unwrap();
            assert_eq!(cli.get_name(), value.to_string());
        }
    }

    #[test]
    fn continent_is_uppercased_on_the_wire() {
        assert_eq!(Continent::NorthAmerica.to_string(), "NORTH_AMERICA");
        assert_eq!(
            Continent::from_str("south_america", false).unwrap(),
            Continent::SouthAmerica
        );
    }

    #[test]
    fn null_media_type_sends_nothing() {
        assert_eq!(MediaType::Null.api_value(), None);
        assert_eq!(MediaType::StillImage.api_value(), Some("StillImage"));
    }

    #[test]
    fn combinators() {
        assert!(PredicateType::And.is_combinator());
        assert!(PredicateType::Not.is_combinator());
        assert!(!PredicateType::Equals.is_combinator());
        assert_eq!(PredicateType::default(), PredicateType::And);
    }
}
