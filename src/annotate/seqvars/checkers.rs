//! Effect checkers for one variant against one transcript.
//!
//! The checkers are tried in order of decreasing priority and the first one that applies
//! determines the effects for the transcript.

use itertools::Itertools;
use parse_display::Display;
use strum::IntoEnumIterator;

use super::codes::Translation;
use super::effect::{Effect, EffectType};
use super::error::AnnotationError;
use super::gene_models::{Exon, Strand, TranscriptModel};
use super::request::AnnotationRequest;
use super::variant::{Variant, VariantKind};

/// Outcome of one checker, `None` if it does not apply.
pub type CheckResult = Result<Option<Vec<Effect>>, AnnotationError>;

/// The effect checkers in order of priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, strum::EnumIter)]
#[display(style = "kebab-case")]
pub enum Checker {
    NonCoding,
    SpliceSite,
    Intronic,
    StartLoss,
    StopLoss,
    Utr,
    Coding,
    CodingFallback,
}

impl Checker {
    pub fn check(&self, request: &AnnotationRequest) -> CheckResult {
        match self {
            Checker::NonCoding => check_non_coding(request),
            Checker::SpliceSite => check_splice_site(request),
            Checker::Intronic => check_intronic(request),
            Checker::StartLoss => check_start_loss(request),
            Checker::StopLoss => check_stop_loss(request),
            Checker::Utr => check_utr(request),
            Checker::Coding => check_coding(request),
            Checker::CodingFallback => check_coding_fallback(request),
        }
    }
}

/// Effects of the first applicable checker; empty if none applies, e.g., for variants in the
/// padding around a transcript.
pub fn check_transcript(request: &AnnotationRequest) -> Result<Vec<Effect>, AnnotationError> {
    for checker in Checker::iter() {
        if let Some(effects) = checker.check(request)? {
            tracing::trace!(
                "{} on {}: {} effect(s) from {}",
                request.variant,
                &request.transcript.tr_id,
                effects.len(),
                checker
            );
            return Ok(effects);
        }
    }
    Ok(Vec::new())
}

/// Introns as 1-based index in genomic order with the flanking exons.
fn introns(tx: &TranscriptModel) -> impl Iterator<Item = (i32, &Exon, &Exon)> {
    tx.exons
        .iter()
        .tuple_windows()
        .enumerate()
        .map(|(idx, (prev, next))| (idx as i32 + 1, prev, next))
}

/// Whether the variant lies completely within the intron between `prev` and `next`.
///
/// Insertions need intronic bases on both sides.
fn in_intron(variant: &Variant, prev: &Exon, next: &Exon) -> bool {
    match variant.kind() {
        VariantKind::Insertion => prev.stop + 1 < variant.position && variant.position < next.start,
        _ => prev.stop < variant.position && variant.ref_position_last() < next.start,
    }
}

/// Whether the variant touches the exon; insertions right after the exon count.
fn overlaps_exon(variant: &Variant, exon: &Exon) -> bool {
    match variant.kind() {
        VariantKind::Insertion => exon.start <= variant.position && variant.position <= exon.stop + 1,
        _ => variant.position <= exon.stop && exon.start <= variant.ref_position_last(),
    }
}

/// Whether the intron lies between the first and last coding base.
fn within_cds(tx: &TranscriptModel, prev: &Exon, next: &Exon) -> bool {
    prev.stop >= tx.cds.0 && next.start <= tx.cds.1
}

fn check_non_coding(request: &AnnotationRequest) -> CheckResult {
    let tx = request.transcript;
    if tx.is_coding() {
        return Ok(None);
    }
    let variant = request.variant;

    if tx.exons.iter().any(|exon| overlaps_exon(variant, exon)) {
        return Ok(Some(vec![Effect {
            length: Some(request.get_exonic_length()),
            ..Effect::with_request(EffectType::NonCoding, request)
        }]));
    }

    let effects = introns(tx)
        .filter(|(_, prev, next)| in_intron(variant, prev, next))
        .map(|(index, prev, next)| {
            Effect::intronic_non_coding(
                EffectType::NonCodingIntron,
                request,
                prev.stop,
                next.start,
                index,
            )
        })
        .collect::<Vec<_>>();
    Ok((!effects.is_empty()).then_some(effects))
}

fn check_splice_site(request: &AnnotationRequest) -> CheckResult {
    let tx = request.transcript;
    if !tx.is_coding() {
        return Ok(None);
    }
    let variant = request.variant;
    let (pos, last) = (variant.position, variant.ref_position_last());

    for (index, prev, next) in introns(tx) {
        let hit = [prev.stop + 1, prev.stop + 2, next.start - 2, next.start - 1]
            .into_iter()
            .filter(|site| prev.stop < *site && *site < next.start)
            .any(|site| pos <= site && site <= last);
        if hit {
            return Ok(Some(vec![Effect::intronic(
                EffectType::SpliceSite,
                request,
                prev.stop,
                next.start,
                index,
            )]));
        }
    }
    Ok(None)
}

fn check_intronic(request: &AnnotationRequest) -> CheckResult {
    let tx = request.transcript;
    if !tx.is_coding() {
        return Ok(None);
    }
    let effects = introns(tx)
        .filter(|(_, prev, next)| {
            within_cds(tx, prev, next) && in_intron(request.variant, prev, next)
        })
        .map(|(index, prev, next)| {
            Effect::intronic(EffectType::Intron, request, prev.stop, next.start, index)
        })
        .collect::<Vec<_>>();
    Ok((!effects.is_empty()).then_some(effects))
}

fn check_start_loss(request: &AnnotationRequest) -> CheckResult {
    if !request.transcript.is_coding() || !request.is_start_codon_affected() {
        return Ok(None);
    }
    if let Some((offset, remaining)) = request.find_start_codon()? {
        tracing::trace!(
            "start codon of {} kept at offset {} ({} bases left)",
            &request.transcript.tr_id,
            offset,
            remaining
        );
        return Ok(None);
    }
    Ok(Some(vec![Effect {
        prot_pos: Some(1),
        ..Effect::with_prot_length(EffectType::NoStart, request)
    }]))
}

fn check_stop_loss(request: &AnnotationRequest) -> CheckResult {
    if !request.transcript.is_coding() || !request.is_stop_codon_affected() {
        return Ok(None);
    }
    let (_, alt_aa) = request.get_amino_acids()?;
    if alt_aa.is_empty() || alt_aa.iter().any(Translation::is_stop) {
        return Ok(None);
    }
    Ok(Some(vec![Effect::with_prot_pos(EffectType::NoEnd, request)]))
}

/// Exonic bases in `start..=end`.
fn exonic_bases(tx: &TranscriptModel, start: i32, end: i32) -> i32 {
    tx.exons
        .iter()
        .map(|exon| (end.min(exon.stop) - start.max(exon.start) + 1).max(0))
        .sum()
}

/// UTR effect type on the given genomic side of the coding region.
fn utr_effect_type(strand: Strand, left: bool, intron: bool) -> EffectType {
    let five_prime = matches!((strand, left), (Strand::Plus, true) | (Strand::Minus, false));
    match (five_prime, intron) {
        (true, false) => EffectType::Utr5,
        (false, false) => EffectType::Utr3,
        (true, true) => EffectType::Utr5Intron,
        (false, true) => EffectType::Utr3Intron,
    }
}

fn check_utr(request: &AnnotationRequest) -> CheckResult {
    let tx = request.transcript;
    if !tx.is_coding() {
        return Ok(None);
    }
    let variant = request.variant;
    let (cds_start, cds_end) = tx.cds;
    let is_insertion = variant.kind() == VariantKind::Insertion;

    // Insertions right before a UTR exon get the distances of the preceding intron.
    if is_insertion {
        let boundary = introns(tx).find(|(_, _, next)| next.start == variant.position);
        if let Some((index, prev, next)) = boundary {
            let left = variant.position <= cds_start;
            if left || variant.position > cds_end {
                return Ok(Some(vec![Effect::intronic_non_coding(
                    utr_effect_type(tx.strand, left, false),
                    request,
                    prev.stop,
                    next.start,
                    index,
                )]));
            }
        }
    }

    if tx.exons.iter().any(|exon| overlaps_exon(variant, exon)) {
        let (left, dist_from_coding) = if variant.position < cds_start
            || (is_insertion && variant.position == cds_start)
        {
            (true, exonic_bases(tx, variant.position, cds_start - 1))
        } else if variant.position > cds_end {
            let last = if is_insertion {
                variant.position - 1
            } else {
                variant.position
            };
            (false, exonic_bases(tx, cds_end + 1, last))
        } else {
            return Ok(None);
        };
        return Ok(Some(vec![Effect {
            dist_from_coding: Some(dist_from_coding),
            ..Effect::with_prot_length(utr_effect_type(tx.strand, left, false), request)
        }]));
    }

    let effects = introns(tx)
        .filter(|(_, prev, next)| {
            !within_cds(tx, prev, next) && in_intron(variant, prev, next)
        })
        .map(|(index, prev, next)| {
            let effect_type = utr_effect_type(tx.strand, next.start <= cds_start, true);
            Effect::intronic_non_coding(effect_type, request, prev.stop, next.start, index)
        })
        .collect::<Vec<_>>();
    Ok((!effects.is_empty()).then_some(effects))
}

fn overlaps_cds(request: &AnnotationRequest) -> bool {
    let variant = request.variant;
    let (cds_start, cds_end) = request.transcript.cds;
    request.transcript.is_coding()
        && variant.position <= cds_end
        && cds_start <= variant.ref_position_last()
}

fn count_stops(amino_acids: &[Translation]) -> usize {
    amino_acids.iter().filter(|aa| aa.is_stop()).count()
}

fn check_coding(request: &AnnotationRequest) -> CheckResult {
    if !overlaps_cds(request) {
        return Ok(None);
    }
    let (ref_aa, alt_aa) = request.get_amino_acids()?;
    if ref_aa.is_empty() && alt_aa.is_empty() {
        return Ok(None);
    }

    let variant = request.variant;
    let diff = variant.alternate.len() as i32 - variant.reference.len() as i32;
    let new_stop = count_stops(alt_aa) > count_stops(ref_aa);
    let effect = if diff % 3 != 0 {
        Effect::with_prot_pos(EffectType::FrameShift, request)
    } else if diff != 0 {
        let effect_type = if new_stop {
            EffectType::NoFrameShiftNewStop
        } else {
            EffectType::NoFrameShift
        };
        Effect::with_aa_change(effect_type, request)?
    } else if !ref_aa.iter().chain(alt_aa.iter()).all(Translation::is_valid) {
        Effect::with_prot_length(EffectType::Cds, request)
    } else {
        let effect_type = if new_stop {
            EffectType::Nonsense
        } else if ref_aa != alt_aa {
            EffectType::Missense
        } else {
            EffectType::Synonymous
        };
        Effect::with_aa_change(effect_type, request)?
    };
    Ok(Some(vec![effect]))
}

fn check_coding_fallback(request: &AnnotationRequest) -> CheckResult {
    if !overlaps_cds(request) {
        return Ok(None);
    }
    Ok(Some(vec![Effect::with_prot_length(EffectType::Cds, request)]))
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::annotate::seqvars::codes::{reverse_complement, NUCLEAR_CODE};
    use crate::annotate::seqvars::fixtures::{self, mirror};
    use crate::annotate::seqvars::reference::InMemoryGenome;

    fn annotate(
        genome: &InMemoryGenome,
        tx: &TranscriptModel,
        variant: &Variant,
    ) -> Result<Vec<(String, String)>, anyhow::Error> {
        let request = AnnotationRequest::new(genome, &NUCLEAR_CODE, variant, tx);
        Ok(check_transcript(&request)?
            .iter()
            .map(|effect| (effect.effect.to_string(), effect.details()))
            .collect())
    }

    /// The variant on the reverse complement contig.
    fn mirrored(variant: &Variant) -> Result<Variant, anyhow::Error> {
        let position = if variant.reference.is_empty() {
            mirror(variant.position) + 1
        } else {
            mirror(variant.ref_position_last())
        };
        Variant::new(
            "2",
            position,
            &reverse_complement(&variant.reference),
            &reverse_complement(&variant.alternate),
        )
    }

    #[rstest::rstest]
    #[case::missense(42, "G", "A", "missense", "6/13(Arg->His)")]
    #[case::synonymous(43, "T", "C", "synonymous", "6/13")]
    #[case::nonsense(25, "A", "T", "nonsense", "4/13(Lys->End)")]
    #[case::frame_shift(44, "T", "", "frame-shift", "7/13")]
    #[case::no_frame_shift(44, "TTC", "", "no-frame-shift", "7/13(Phe->Gly)")]
    #[case::new_stop(44, "", "TAA", "no-frame-shift-newStop", "7/13(Phe->End)")]
    #[case::no_start(17, "T", "C", "noStart", "13")]
    #[case::no_end(76, "A", "C", "noEnd", "13")]
    #[case::stop_retained(76, "A", "G", "synonymous", "14/13")]
    #[case::unknown_codon(42, "G", "N", "CDS", "13")]
    #[case::donor(31, "G", "A", "splice-site", "6/13")]
    #[case::acceptor(40, "G", "A", "splice-site", "6/13")]
    #[case::second_intron(62, "T", "A", "splice-site", "12/13")]
    #[case::intron(35, "C", "A", "intron", "1/2[4]")]
    #[case::intron_insertion(34, "", "T", "intron", "1/2[3]")]
    #[case::utr5(13, "C", "A", "5'UTR", "3")]
    #[case::utr5_insertion_before_start(16, "", "A", "5'UTR", "0")]
    #[case::utr3(80, "C", "A", "3'UTR", "3")]
    fn plus_and_minus_strand(
        #[case] pos: i32,
        #[case] reference: &str,
        #[case] alternate: &str,
        #[case] effect: &str,
        #[case] details: &str,
    ) -> Result<(), anyhow::Error> {
        let genome = fixtures::genome();
        let expected = vec![(effect.to_string(), details.to_string())];

        let variant = Variant::new("1", pos, reference, alternate)?;
        assert_eq!(annotate(&genome, &fixtures::plus_tx(), &variant)?, expected);
        let variant = mirrored(&variant)?;
        assert_eq!(annotate(&genome, &fixtures::minus_tx(), &variant)?, expected);

        Ok(())
    }

    #[test]
    fn splice_site_details() -> Result<(), anyhow::Error> {
        let genome = fixtures::genome();
        let tx = fixtures::plus_tx();
        let variant = Variant::new("1", 29, "GGGT", "")?;
        let request = AnnotationRequest::new(&genome, &NUCLEAR_CODE, &variant, &tx);

        let effects = check_transcript(&request)?;
        assert_eq!(effects.len(), 1);
        let effect = &effects[0];
        assert_eq!(effect.effect, EffectType::SpliceSite);
        assert_eq!(effect.which_intron, Some(1));
        assert_eq!(effect.dist_from_donor, Some(-2));
        assert_eq!(effect.dist_from_acceptor, Some(8));
        assert_eq!(effect.dist_from_coding, Some(-2));
        assert_eq!(effect.intron_length, Some(10));

        Ok(())
    }

    #[test]
    fn utr_introns() -> Result<(), anyhow::Error> {
        let genome = fixtures::genome();

        let mut tx = fixtures::plus_tx();
        tx.cds = (41, 77);
        let variant = Variant::new("1", 35, "C", "A")?;
        let request = AnnotationRequest::new(&genome, &NUCLEAR_CODE, &variant, &tx);
        let effects = check_transcript(&request)?;
        assert_eq!(effects.len(), 1);
        assert_eq!(effects[0].effect, EffectType::Utr5Intron);
        assert_eq!(effects[0].which_intron, Some(1));
        assert_eq!(effects[0].prot_pos, None);
        assert!(effects[0].prot_length.is_some());

        let mut tx = fixtures::plus_tx();
        tx.cds = (16, 60);
        let variant = Variant::new("1", 65, "C", "A")?;
        let request = AnnotationRequest::new(&genome, &NUCLEAR_CODE, &variant, &tx);
        let effects = check_transcript(&request)?;
        assert_eq!(effects.len(), 1);
        assert_eq!(effects[0].effect, EffectType::Utr3Intron);
        assert_eq!(effects[0].which_intron, Some(2));
        assert_eq!(effects[0].details(), "2/2[4]");

        let mut tx = fixtures::minus_tx();
        tx.cds = (24, 60);
        let variant = Variant::new("2", 65, "G", "T")?;
        let request = AnnotationRequest::new(&genome, &NUCLEAR_CODE, &variant, &tx);
        let effects = check_transcript(&request)?;
        assert_eq!(effects.len(), 1);
        assert_eq!(effects[0].effect, EffectType::Utr5Intron);
        assert_eq!(effects[0].which_intron, Some(1));

        Ok(())
    }

    #[rstest::rstest]
    #[case("1", 31, "G", 1, 0)]
    #[case("1", 32, "T", 1, 1)]
    #[case("1", 39, "A", 1, 1)]
    #[case("1", 40, "G", 1, 0)]
    #[case("2", 61, "C", 1, 0)]
    #[case("2", 70, "C", 1, 0)]
    fn splice_site_in_utr_intron(
        #[case] chrom: &str,
        #[case] pos: i32,
        #[case] reference: &str,
        #[case] which: i32,
        #[case] dist: i32,
    ) -> Result<(), anyhow::Error> {
        let genome = fixtures::genome();
        let tx = match chrom {
            "1" => TranscriptModel {
                cds: (46, 77),
                ..fixtures::plus_tx()
            },
            _ => TranscriptModel {
                cds: (24, 55),
                ..fixtures::minus_tx()
            },
        };
        let alternate = if reference == "A" { "C" } else { "A" };
        let variant = Variant::new(chrom, pos, reference, alternate)?;
        let request = AnnotationRequest::new(&genome, &NUCLEAR_CODE, &variant, &tx);

        let effects = check_transcript(&request)?;
        assert_eq!(effects.len(), 1);
        assert_eq!(effects[0].effect, EffectType::SpliceSite);
        assert_eq!(effects[0].prot_pos, None);
        assert_eq!(effects[0].prot_length, Some(request.get_protein_length()));
        assert_eq!(effects[0].which_intron, Some(which));
        assert_eq!(effects[0].dist_from_coding, Some(dist));
        assert_eq!(effects[0].intron_length, Some(10));

        Ok(())
    }

    #[rstest::rstest]
    #[case::plus_donor("1", 31, "splice-site", "6/13")]
    #[case::plus_donor_second_base("1", 32, "splice-site", "6/13")]
    #[case::plus_acceptor("1", 39, "splice-site", "6/13")]
    #[case::plus_acceptor_last_base("1", 40, "splice-site", "6/13")]
    #[case::plus_exon_boundary("1", 41, "frame-shift", "6/13")]
    #[case::minus_acceptor("2", 61, "splice-site", "6/13")]
    #[case::minus_donor("2", 70, "splice-site", "6/13")]
    #[case::minus_exon_boundary("2", 71, "frame-shift", "5/13")]
    fn insertions_at_splice_boundaries(
        #[case] chrom: &str,
        #[case] pos: i32,
        #[case] effect: &str,
        #[case] details: &str,
    ) -> Result<(), anyhow::Error> {
        let genome = fixtures::genome();
        let tx = match chrom {
            "1" => fixtures::plus_tx(),
            _ => fixtures::minus_tx(),
        };
        let variant = Variant::new(chrom, pos, "", "T")?;

        assert_eq!(
            annotate(&genome, &tx, &variant)?,
            vec![(effect.to_string(), details.to_string())]
        );

        Ok(())
    }

    #[rstest::rstest]
    #[case::plus_before_start("1", 16, "5'UTR", "0")]
    #[case::plus_before_stop("1", 75, "noEnd", "13")]
    #[case::plus_after_stop("1", 78, "3'UTR", "0")]
    #[case::minus_after_start("2", 86, "5'UTR", "0")]
    #[case::minus_after_stop("2", 24, "noEnd", "13")]
    fn insertions_at_codon_boundaries(
        #[case] chrom: &str,
        #[case] pos: i32,
        #[case] effect: &str,
        #[case] details: &str,
    ) -> Result<(), anyhow::Error> {
        let genome = fixtures::genome();
        let tx = match chrom {
            "1" => fixtures::plus_tx(),
            _ => fixtures::minus_tx(),
        };
        let variant = Variant::new(chrom, pos, "", "A")?;

        assert_eq!(
            annotate(&genome, &tx, &variant)?,
            vec![(effect.to_string(), details.to_string())]
        );

        Ok(())
    }

    #[rstest::rstest]
    #[case::plus_5_utr("1", (46, 77), 41, "5'UTR", 1)]
    #[case::minus_5_utr("2", (24, 55), 71, "5'UTR", 1)]
    #[case::plus_3_utr("1", (16, 55), 71, "3'UTR", 2)]
    #[case::minus_3_utr("2", (46, 85), 41, "3'UTR", 2)]
    fn utr_insertion_at_exon_start(
        #[case] chrom: &str,
        #[case] cds: (i32, i32),
        #[case] pos: i32,
        #[case] effect: &str,
        #[case] which: i32,
    ) -> Result<(), anyhow::Error> {
        let genome = fixtures::genome();
        let tx = match chrom {
            "1" => TranscriptModel {
                cds,
                ..fixtures::plus_tx()
            },
            _ => TranscriptModel {
                cds,
                ..fixtures::minus_tx()
            },
        };
        let variant = Variant::new(chrom, pos, "", "A")?;
        let request = AnnotationRequest::new(&genome, &NUCLEAR_CODE, &variant, &tx);

        let effects = check_transcript(&request)?;
        assert_eq!(effects.len(), 1);
        assert_eq!(effects[0].effect.to_string(), effect);
        assert_eq!(effects[0].details(), "0");
        assert_eq!(effects[0].dist_from_coding, Some(0));
        assert_eq!(effects[0].intron_length, Some(10));
        assert_eq!(effects[0].which_intron, Some(which));
        assert_eq!(effects[0].prot_pos, None);

        Ok(())
    }

    #[rstest::rstest]
    #[case("1", 35, 1)]
    #[case("1", 65, 2)]
    #[case("2", 66, 1)]
    #[case("2", 36, 2)]
    fn intron_numbering(
        #[case] chrom: &str,
        #[case] pos: i32,
        #[case] which: i32,
    ) -> Result<(), anyhow::Error> {
        let genome = fixtures::genome();
        let tx = match chrom {
            "1" => fixtures::plus_tx(),
            _ => fixtures::minus_tx(),
        };
        let reference = if chrom == "1" { "C" } else { "G" };
        let variant = Variant::new(chrom, pos, reference, "A")?;
        let request = AnnotationRequest::new(&genome, &NUCLEAR_CODE, &variant, &tx);

        let effects = check_transcript(&request)?;
        assert_eq!(effects.len(), 1);
        assert_eq!(effects[0].effect, EffectType::Intron);
        assert_eq!(effects[0].which_intron, Some(which));
        assert_eq!(effects[0].how_many_introns, Some(2));

        Ok(())
    }

    #[rstest::rstest]
    #[case(15, "A", "C", "non-coding", "40")]
    #[case(31, "", "C", "non-coding", "40")]
    #[case(35, "A", "C", "non-coding-intron", "1/1[4]")]
    #[case(28, "AAAGT", "", "non-coding", "40")]
    fn non_coding(
        #[case] pos: i32,
        #[case] reference: &str,
        #[case] alternate: &str,
        #[case] effect: &str,
        #[case] details: &str,
    ) -> Result<(), anyhow::Error> {
        let genome = fixtures::genome();
        let variant = Variant::new("3", pos, reference, alternate)?;

        assert_eq!(
            annotate(&genome, &fixtures::non_coding_tx(), &variant)?,
            vec![(effect.to_string(), details.to_string())]
        );

        Ok(())
    }

    #[rstest::rstest]
    #[case(5, "C")]
    #[case(95, "C")]
    #[case(92, "")]
    fn outside_transcript(#[case] pos: i32, #[case] reference: &str) -> Result<(), anyhow::Error> {
        let genome = fixtures::genome();
        let variant = Variant::new("1", pos, reference, "A")?;

        assert_eq!(annotate(&genome, &fixtures::plus_tx(), &variant)?, vec![]);

        Ok(())
    }

    #[test]
    fn length_changes_not_multiple_of_three_shift_the_frame() -> Result<(), anyhow::Error> {
        let genome = fixtures::genome();
        let plus = fixtures::plus_tx();
        let minus = fixtures::minus_tx();

        let alleles = [("C", ""), ("CC", ""), ("", "A"), ("", "AG"), ("", "AGGG")];
        for range in [20..=29, 42..=59, 72..=73] {
            for pos in range {
                for (reference, alternate) in alleles {
                    let reference = genome_bases(&genome, pos, reference.len())?;
                    let variant = Variant::new("1", pos, &reference, alternate)?;
                    for (tx, variant) in [(&plus, variant.clone()), (&minus, mirrored(&variant)?)] {
                        let effects = annotate(&genome, tx, &variant)?;
                        assert_eq!(effects.len(), 1, "{}", &variant);
                        assert_eq!(effects[0].0, "frame-shift", "{}", &variant);
                    }
                }
            }
        }

        Ok(())
    }

    fn genome_bases(genome: &InMemoryGenome, pos: i32, len: usize) -> Result<String, anyhow::Error> {
        use crate::annotate::seqvars::reference::ReferenceGenome;

        if len == 0 {
            return Ok(String::new());
        }
        Ok(genome.get_sequence("1", pos, pos + len as i32 - 1)?)
    }

    #[test]
    fn substitutions_are_strand_symmetric() -> Result<(), anyhow::Error> {
        let genome = fixtures::genome();
        let plus = fixtures::plus_tx();
        let minus = fixtures::minus_tx();

        for pos in 1..=fixtures::CONTIG_LEN {
            let reference = genome_bases(&genome, pos, 1)?;
            for alternate in ["A", "C", "G", "T"] {
                if alternate == reference {
                    continue;
                }
                let variant = Variant::new("1", pos, &reference, alternate)?;
                assert_eq!(
                    annotate(&genome, &plus, &variant)?,
                    annotate(&genome, &minus, &mirrored(&variant)?)?,
                    "{}",
                    &variant
                );
            }
        }

        Ok(())
    }
}
