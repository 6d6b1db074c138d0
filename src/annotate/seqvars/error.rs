//! Error type for the effect annotation engine.

/// Hard errors raised while annotating one variant against one transcript.
///
/// Everything else in the engine degrades to "not applicable" values; these errors signal
/// inconsistent input data and make the annotator drop the affected transcript.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum AnnotationError {
    /// No exon contains or touches the position.
    #[error("no exon of transcript {transcript} contains or flanks position {position}")]
    NoRegionForPosition { transcript: String, position: i32 },
    /// A coding exon lacks its reading frame.
    #[error("exon {exon_start}-{exon_stop} of transcript {transcript} has no frame")]
    MissingFrame {
        transcript: String,
        exon_start: i32,
        exon_stop: i32,
    },
    /// The reference genome could not provide a sequence.
    #[error("reference sequence not available: {0}")]
    Reference(String),
}
