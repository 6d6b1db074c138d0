//! Effect annotation of sequence variants.
//!
//! A variant is annotated against every transcript in reach: the `request` module provides the
//! strand-aware coordinate math, the `checkers` decide on the effect category, and the
//! `annotator` aggregates the effects of all transcripts.

pub mod annotator;
pub mod checkers;
pub mod cli;
pub mod codes;
pub mod effect;
pub mod error;
pub mod gene_models;
pub mod reference;
pub mod request;
pub mod variant;

#[cfg(test)]
mod fixtures;

pub use annotator::{Config, ConfigBuilder, EffectAnnotator};
pub use effect::{effects_description, Effect, EffectType, EffectsDescription};
pub use error::AnnotationError;
pub use variant::Variant;
