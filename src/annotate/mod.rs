//! Annotation of variants.

pub mod seqvars;
