//! Effect vocabulary, effect records, and their textual summaries.

use itertools::Itertools;
use parse_display::{Display, FromStr};

use super::error::AnnotationError;
use super::gene_models::{Strand, TranscriptModel};
use super::request::AnnotationRequest;

/// The closed vocabulary of variant effects.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Display,
    FromStr,
    serde::Deserialize,
    serde::Serialize,
    strum::EnumIter,
)]
pub enum EffectType {
    #[display("splice-site")]
    #[serde(rename = "splice-site")]
    SpliceSite,
    #[display("frame-shift")]
    #[serde(rename = "frame-shift")]
    FrameShift,
    #[display("nonsense")]
    #[serde(rename = "nonsense")]
    Nonsense,
    #[display("no-frame-shift-newStop")]
    #[serde(rename = "no-frame-shift-newStop")]
    NoFrameShiftNewStop,
    #[display("noStart")]
    #[serde(rename = "noStart")]
    NoStart,
    #[display("noEnd")]
    #[serde(rename = "noEnd")]
    NoEnd,
    #[display("missense")]
    #[serde(rename = "missense")]
    Missense,
    #[display("no-frame-shift")]
    #[serde(rename = "no-frame-shift")]
    NoFrameShift,
    #[display("CDS")]
    #[serde(rename = "CDS")]
    Cds,
    #[display("synonymous")]
    #[serde(rename = "synonymous")]
    Synonymous,
    #[display("3'UTR")]
    #[serde(rename = "3'UTR")]
    Utr3,
    #[display("5'UTR")]
    #[serde(rename = "5'UTR")]
    Utr5,
    #[display("intron")]
    #[serde(rename = "intron")]
    Intron,
    #[display("non-coding")]
    #[serde(rename = "non-coding")]
    NonCoding,
    #[display("5'UTR-intron")]
    #[serde(rename = "5'UTR-intron")]
    Utr5Intron,
    #[display("3'UTR-intron")]
    #[serde(rename = "3'UTR-intron")]
    Utr3Intron,
    #[display("non-coding-intron")]
    #[serde(rename = "non-coding-intron")]
    NonCodingIntron,
    #[display("intergenic")]
    #[serde(rename = "intergenic")]
    Intergenic,
}

impl EffectType {
    /// Severity rank, higher is more severe.
    pub fn severity(&self) -> i32 {
        match self {
            EffectType::SpliceSite => 23,
            EffectType::FrameShift => 22,
            EffectType::Nonsense => 21,
            EffectType::NoFrameShiftNewStop => 20,
            EffectType::NoStart => 19,
            EffectType::NoEnd => 18,
            EffectType::Missense => 17,
            EffectType::NoFrameShift => 16,
            EffectType::Cds => 15,
            EffectType::Synonymous => 14,
            EffectType::Utr3 => 11,
            EffectType::Utr5 => 10,
            EffectType::Intron => 9,
            EffectType::NonCoding => 8,
            EffectType::Utr5Intron => 7,
            EffectType::Utr3Intron => 6,
            EffectType::NonCodingIntron => 4,
            EffectType::Intergenic => 2,
        }
    }

    /// Whether the effect describes a variant within an intron.
    pub fn is_intronic(&self) -> bool {
        matches!(
            self,
            EffectType::Intron
                | EffectType::Utr5Intron
                | EffectType::Utr3Intron
                | EffectType::NonCodingIntron
        )
    }
}

/// Effect of a variant on one transcript.
#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
pub struct Effect {
    pub effect: EffectType,
    pub gene: Option<String>,
    pub transcript_id: Option<String>,
    pub strand: Option<Strand>,
    /// 1-based protein position of the first affected codon.
    pub prot_pos: Option<i32>,
    /// Protein length in amino acids.
    pub prot_length: Option<i32>,
    /// Amino acid change, e.g., `Arg->Ile,Glu`.
    pub aa_change: Option<String>,
    pub which_intron: Option<i32>,
    pub how_many_introns: Option<i32>,
    pub dist_from_coding: Option<i32>,
    pub dist_from_acceptor: Option<i32>,
    pub dist_from_donor: Option<i32>,
    pub intron_length: Option<i32>,
    pub mrna_length: Option<i32>,
    pub mrna_position: Option<i32>,
    pub length: Option<i32>,
    pub ref_aa: Option<Vec<String>>,
    pub alt_aa: Option<Vec<String>>,
}

impl std::fmt::Display for Effect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Effect gene:{} trID:{} strand:{} effect:{} protein pos:{}/{} aa: {}",
            self.gene.as_deref().unwrap_or_default(),
            self.transcript_id.as_deref().unwrap_or_default(),
            self.strand.map(|s| s.to_string()).unwrap_or_default(),
            self.effect,
            fmt_opt(self.prot_pos),
            fmt_opt(self.prot_length),
            self.aa_change.as_deref().unwrap_or_default(),
        )
    }
}

fn fmt_opt(value: Option<i32>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

impl Effect {
    /// Effect without transcript.
    pub fn new(effect: EffectType) -> Self {
        Self {
            effect,
            gene: None,
            transcript_id: None,
            strand: None,
            prot_pos: None,
            prot_length: None,
            aa_change: None,
            which_intron: None,
            how_many_introns: None,
            dist_from_coding: None,
            dist_from_acceptor: None,
            dist_from_donor: None,
            intron_length: None,
            mrna_length: None,
            mrna_position: None,
            length: None,
            ref_aa: None,
            alt_aa: None,
        }
    }

    pub fn with_transcript(effect: EffectType, tx: &TranscriptModel) -> Self {
        Self {
            gene: Some(tx.gene.clone()),
            transcript_id: Some(tx.tr_id.clone()),
            strand: Some(tx.strand),
            ..Self::new(effect)
        }
    }

    /// Effect with the mRNA length and position of the variant.
    pub fn with_request(effect: EffectType, request: &AnnotationRequest) -> Self {
        Self {
            mrna_length: Some(request.get_exonic_length()),
            mrna_position: Some(request.get_exonic_position()),
            ..Self::with_transcript(effect, request.transcript)
        }
    }

    pub fn with_prot_length(effect: EffectType, request: &AnnotationRequest) -> Self {
        Self {
            prot_length: Some(request.get_protein_length()),
            ..Self::with_request(effect, request)
        }
    }

    pub fn with_prot_pos(effect: EffectType, request: &AnnotationRequest) -> Self {
        Self {
            prot_pos: Some(request.get_protein_position().0),
            ..Self::with_prot_length(effect, request)
        }
    }

    /// Effect with protein position and amino acid change.
    pub fn with_aa_change(
        effect: EffectType,
        request: &AnnotationRequest,
    ) -> Result<Self, AnnotationError> {
        let (ref_aa, alt_aa) = request.get_amino_acids()?;
        let ref_aa = ref_aa.iter().map(|aa| aa.to_string()).collect::<Vec<_>>();
        let alt_aa = alt_aa.iter().map(|aa| aa.to_string()).collect::<Vec<_>>();
        Ok(Self {
            aa_change: Some(format!("{}->{}", ref_aa.join(","), alt_aa.join(","))),
            ref_aa: Some(ref_aa),
            alt_aa: Some(alt_aa),
            ..Self::with_prot_pos(effect, request)
        })
    }

    /// Effect of a variant in the intron between exon ends `start` and `end`.
    ///
    /// `index` is the 1-based number of the intron in genomic order.
    pub fn intronic_non_coding(
        effect: EffectType,
        request: &AnnotationRequest,
        start: i32,
        end: i32,
        index: i32,
    ) -> Self {
        let variant = request.variant;
        let dist_left = variant.position - start - 1;
        let dist_right = end - (variant.position + variant.reference.len() as i32);
        let how_many_introns = request.transcript.exons.len() as i32 - 1;

        let (dist_from_donor, dist_from_acceptor, which_intron) = match request.strand() {
            Strand::Plus => (dist_left, dist_right, index),
            Strand::Minus => (dist_right, dist_left, how_many_introns - index + 1),
        };
        let prot_length = request
            .transcript
            .is_coding()
            .then(|| request.get_protein_length());

        Self {
            prot_length,
            dist_from_coding: Some(dist_left.min(dist_right)),
            how_many_introns: Some(how_many_introns),
            intron_length: Some(end - start - 1),
            dist_from_donor: Some(dist_from_donor),
            dist_from_acceptor: Some(dist_from_acceptor),
            which_intron: Some(which_intron),
            ..Self::with_request(effect, request)
        }
    }

    /// Like [`Effect::intronic_non_coding`], with the protein position of the flanking exon.
    pub fn intronic(
        effect: EffectType,
        request: &AnnotationRequest,
        start: i32,
        end: i32,
        index: i32,
    ) -> Self {
        let prot_pos = match request.strand() {
            Strand::Plus => request.get_protein_position_for_pos(end),
            Strand::Minus => request.get_protein_position_for_pos(start),
        };
        Self {
            prot_pos,
            ..Self::intronic_non_coding(effect, request, start, end, index)
        }
    }

    /// Type-specific details, e.g., `3/10[15]` for intronic effects.
    pub fn details(&self) -> String {
        use EffectType::*;

        let mut result = String::new();
        if matches!(self.effect, NoStart | NoEnd | Cds) {
            result.push_str(&fmt_opt(self.prot_length));
        }
        if self.effect.is_intronic() {
            result.push_str(&format!(
                "{}/{}[{}]",
                fmt_opt(self.which_intron),
                fmt_opt(self.how_many_introns),
                fmt_opt(self.dist_from_coding)
            ));
        }
        if matches!(
            self.effect,
            NoFrameShift
                | NoFrameShiftNewStop
                | FrameShift
                | SpliceSite
                | Synonymous
                | Missense
                | Nonsense
        ) {
            result.push_str(&format!(
                "{}/{}",
                fmt_opt(self.prot_pos),
                fmt_opt(self.prot_length)
            ));
        }
        if matches!(
            self.effect,
            NoFrameShift | NoFrameShiftNewStop | Missense | Nonsense
        ) {
            result.push_str(&format!(
                "({})",
                self.aa_change.as_deref().unwrap_or_default()
            ));
        }
        if matches!(self.effect, Utr5 | Utr3) {
            result.push_str(&fmt_opt(self.dist_from_coding));
        }
        if self.effect == NonCoding {
            result.push_str(&fmt_opt(self.length));
        }
        result
    }
}

/// Summary of all effects of one variant.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct EffectsDescription {
    /// The most severe effect.
    pub worst_effect: EffectType,
    /// `gene:effect` pairs joined with `|`, most severe first.
    pub gene_effects: String,
    /// `transcript:gene:effect:details` joined with `|`, in input order.
    pub effect_details: String,
}

/// Summarize effects; `None` for an empty list.
///
/// The gene effects list the most severe effect once for each run of equal severity and gene.
pub fn effects_description(effects: &[Effect]) -> Option<EffectsDescription> {
    let mut sorted = effects.iter().collect::<Vec<_>>();
    sorted.sort_by_key(|effect| std::cmp::Reverse(effect.effect.severity()));
    let worst_effect = sorted.first()?.effect;

    if worst_effect == EffectType::Intergenic {
        let intergenic = worst_effect.to_string();
        return Some(EffectsDescription {
            worst_effect,
            gene_effects: intergenic.clone(),
            effect_details: intergenic,
        });
    }

    let gene_effects = sorted
        .iter()
        .dedup_by(|a, b| a.effect.severity() == b.effect.severity() && a.gene == b.gene)
        .map(|effect| format!("{}:{}", effect.gene.as_deref().unwrap_or_default(), effect.effect))
        .join("|");
    let effect_details = effects
        .iter()
        .map(|effect| {
            format!(
                "{}:{}:{}:{}",
                effect.transcript_id.as_deref().unwrap_or_default(),
                effect.gene.as_deref().unwrap_or_default(),
                effect.effect,
                effect.details()
            )
        })
        .join("|");

    Some(EffectsDescription {
        worst_effect,
        gene_effects,
        effect_details,
    })
}
