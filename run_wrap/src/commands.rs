use crate::utils::read_json;
use anyhow::{anyhow, Result};
use instrument_config::{format_reports, load_catalog, validate_catalog, InstrumentCatalog};
use itertools::Itertools;
use log::{info, warn};
use run_types::{InstrumentCapabilities, SequencingRun};
use run_validation::{
    format_profile_reports, validate_profile_set, validate_run, ProfileCatalog, ProfileSet,
    ValidationReport,
};
use std::path::Path;
use std::process::ExitCode;

/// Capability snapshot of the instrument the run targets.
pub fn resolve_instrument(
    catalog: &InstrumentCatalog,
    run: &SequencingRun,
) -> Result<InstrumentCapabilities> {
    let definition = catalog.find(&run.instrument_platform).ok_or_else(|| {
        anyhow!(
            "unknown instrument '{}', expected one of: {}",
            run.instrument_platform,
            catalog.names().join(", ")
        )
    })?;
    Ok(definition.capabilities())
}

fn exit_code(has_errors: bool) -> ExitCode {
    if has_errors {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

pub fn validate(
    run_path: &Path,
    instruments: Option<&Path>,
    profiles: Option<&Path>,
    report: bool,
) -> Result<ExitCode> {
    let run: SequencingRun = read_json(run_path)?;
    let catalog = load_catalog(instruments)?;
    let instrument = resolve_instrument(&catalog, &run)?;
    let profiles: Option<ProfileSet> = profiles
        .map(|path| read_json::<ProfileSet>(path))
        .transpose()?;
    if let Some(set) = &profiles {
        let invalid = validate_profile_set(set)
            .iter()
            .filter(|r| !r.is_valid())
            .count();
        if invalid > 0 {
            warn!("{invalid} profile(s) are invalid, run check-profiles for details");
        }
    }
    info!(
        "validating {} samples on {} ({})",
        run.samples.len(),
        instrument.name,
        run.flowcell_type
    );

    let result = validate_run(
        &run,
        &instrument,
        profiles.as_ref().map(|p| p as &dyn ProfileCatalog),
    );
    let json = if report {
        serde_json::to_string_pretty(&ValidationReport::new(&run, &result))?
    } else {
        serde_json::to_string_pretty(&result)?
    };
    println!("{json}");
    Ok(exit_code(result.has_errors()))
}

pub fn check_instruments(instruments: Option<&Path>) -> Result<ExitCode> {
    let catalog = load_catalog(instruments)?;
    let reports = validate_catalog(&catalog);
    println!("{}", format_reports(&reports));
    Ok(exit_code(reports.iter().any(|r| !r.is_valid())))
}

pub fn check_profiles(profiles: &Path) -> Result<ExitCode> {
    let set: ProfileSet = read_json(profiles)?;
    let reports = validate_profile_set(&set);
    println!("{}", format_profile_reports(&reports));
    Ok(exit_code(reports.iter().any(|r| !r.is_valid())))
}
