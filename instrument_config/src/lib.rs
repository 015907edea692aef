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

//! Instrument definitions: loading them from TOML, the built-in instrument
//! table, and checking definitions for mistakes.

mod catalog;
mod check;
mod definition;

pub use catalog::{default_catalog, load_catalog, InstrumentCatalog};
pub use check::{
    format_reports, validate_catalog, validate_definition, DefinitionIssue, DefinitionReport,
};
pub use definition::{FlowcellDefinition, InstrumentDefinition};
