// Warning groups (as of rust 1.55)
#![deny(
    future_incompatible,
    nonstandard_style,
    rust_2018_compatibility,
    rust_2021_compatibility,
    rust_2018_idioms,
    unused
)]
// Other warnings (as of rust 1.55)
#![deny(
    bindings_with_variant_name,
    confusable_idents,
    deprecated,
    elided_lifetimes_in_paths,
    irrefutable_let_patterns,
    non_shorthand_field_patterns,
    overlapping_range_endpoints,
    renamed_and_removed_lints,
    trivial_bounds,
    type_alias_bounds,
    unconditional_recursion,
    unused_comparisons,
    while_true
)]

//! Pre-flight validation of a sequencing run.
//!
//! Each validator is a pure function of the run and the instrument's
//! capability snapshot. [`validate_run`] runs all of them and collects their
//! findings into one [`ValidationResult`].

pub mod application_profile;
pub mod color_balance;
pub mod configuration;
pub mod grouping;
pub mod index_collision;
pub mod profile_check;
pub mod profiles;
pub mod report;
pub mod version;

pub use application_profile::validate_application_profiles;
pub use color_balance::{build_dark_cycle_info, calculate_color_balance, validate_dark_cycles};
pub use configuration::{validate_configuration, validate_sample_ids};
pub use index_collision::{calculate_index_distances, validate_index_collisions};
pub use profile_check::{format_profile_reports, validate_profile_set, ProfileReport};
pub use profiles::{ProfileCatalog, ProfileSet};
pub use report::ValidationReport;

use log::{debug, info};
use run_types::{InstrumentCapabilities, SequencingRun, ValidationResult};

/// Run every validator over `run`.
///
/// Application profiles are only checked when a catalog is given. Colour
/// balance and dark cycles are only analysed on instruments with colour
/// balance enabled.
pub fn validate_run(
    run: &SequencingRun,
    instrument: &InstrumentCapabilities,
    profiles: Option<&dyn ProfileCatalog>,
) -> ValidationResult {
    let has_samples = !run.samples.is_empty();
    let mut result = ValidationResult {
        chemistry_type: Some(instrument.chemistry),
        color_balance_enabled: instrument.color_balance_enabled,
        channel_config: instrument.channels.clone(),
        ..Default::default()
    };

    result.duplicate_sample_ids = validate_sample_ids(run);
    debug!("duplicate sample ids: {}", result.duplicate_sample_ids.len());

    result.index_collisions = validate_index_collisions(run, instrument);
    debug!("index collisions: {}", result.index_collisions.len());

    if has_samples {
        result.distance_matrices = calculate_index_distances(run, instrument);
        debug!("distance matrices for {} lane(s)", result.distance_matrices.len());
    }

    if has_samples && instrument.color_balance_enabled {
        result.color_balance = calculate_color_balance(run, instrument);
        result.dark_cycle_errors = validate_dark_cycles(run, instrument);
        result.dark_cycle_samples = build_dark_cycle_info(run, instrument);
        debug!(
            "colour balance: {} lane(s) with issues, {} dark cycle error(s)",
            result.color_balance_issue_count(),
            result.dark_cycle_errors.len()
        );
    }

    if let Some(catalog) = profiles.filter(|_| has_samples) {
        result.application_errors = validate_application_profiles(run, instrument, catalog);
        debug!("application profile errors: {}", result.application_errors.len());
    }

    result.configuration_errors = validate_configuration(run, instrument);
    debug!("configuration findings: {}", result.configuration_errors.len());

    info!(
        "validated run '{}' ({} samples): {} error(s), {} warning(s)",
        run.run_name,
        run.samples.len(),
        result.error_count(),
        result.warning_count()
    );
    result
}
