//! cli::commands::count
//!
//! The `--count` family. `--count` itself goes to the count endpoint with
//! whatever `--c*` dimensions are set; the others are the fixed breakdowns
//! under `/occurrence/counts`.

use super::{CommandError, Invocation};
use crate::backend::CountParams;
use crate::cli::args::Cli;
use crate::core::config::Credentials;

pub(super) fn build(cli: &Cli, _: &Credentials) -> Result<Invocation, CommandError> {
    let args = &cli.count;
    let params = CountParams {
        taxon_key: args.taxon_key,
        basis_of_record: args.basis_of_record,
        country: args.country.clone(),
        is_georeferenced: args.is_georeferenced,
        dataset_key: args.dataset_key.clone(),
        publishing_country: args.publishing_country.clone(),
        type_status: args.type_status.clone(),
        issue: args.issue.clone(),
        year: args.year.clone(),
    };
    if !params.has_dimension() {
        return Err(CommandError::MissingArgument("More arguments are required"));
    }
    Ok(Invocation::Count(params))
}

pub(super) fn build_basisofrecord(_: &Cli, _: &Credentials) -> Result<Invocation, CommandError> {
    Ok(Invocation::CountBasisOfRecord)
}

pub(super) fn build_year(cli: &Cli, _: &Credentials) -> Result<Invocation, CommandError> {
    cli.count
        .year
        .clone()
        .map(Invocation::CountYear)
        .ok_or(CommandError::MissingArgument("--cYear argument is required"))
}

pub(super) fn build_datasets(cli: &Cli, _: &Credentials) -> Result<Invocation, CommandError> {
    let args = &cli.count;
    if args.taxon_key.is_none() && args.country.is_none() {
        return Err(CommandError::MissingArgument(
            "--cTaxonKey and/or --cCountry argument is required",
        ));
    }
    Ok(Invocation::CountDatasets {
        taxon_key: args.taxon_key,
        country: args.country.clone(),
    })
}

pub(super) fn build_country(cli: &Cli, _: &Credentials) -> Result<Invocation, CommandError> {
    cli.count
        .publishing_country
        .clone()
        .map(Invocation::CountCountries)
        .ok_or(CommandError::MissingArgument(
            "--cPublishingCountry argument is required",
        ))
}

pub(super) fn build_publishing_country(
    cli: &Cli,
    _: &Credentials,
) -> Result<Invocation, CommandError> {
    cli.count
        .country
        .clone()
        .map(Invocation::CountPublishingCountries)
        .ok_or(CommandError::MissingArgument("--cCountry argument is required"))
}

pub(super) fn build_schema(_: &Cli, _: &Credentials) -> Result<Invocation, CommandError> {
    Ok(Invocation::CountSchema)
}
