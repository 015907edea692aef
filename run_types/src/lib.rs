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

//! In-memory description of a sequencing run, the instrument it runs on, the
//! profile catalog it references, and every record the run validators emit.

pub mod instrument;
pub mod profile;
pub mod run;
pub mod sample;
pub mod validation;

pub use instrument::{
    ChannelConfig, ChemistryType, I5Orientation, InstrumentCapabilities, OnboardApplication,
};
pub use profile::{ApplicationProfile, ApplicationProfileReference, TestProfile};
pub use run::{RunCycles, SequencingRun};
pub use sample::{Index, Sample};
pub use validation::*;
