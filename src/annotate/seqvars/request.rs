//! Strand-aware coordinate engine for one variant against one transcript.
//!
//! All positions are 1-based genomic coordinates.  Exons are kept in genomic order for both
//! strands; the strand only changes the direction in which coding positions are counted and
//! in which codons are read.

use once_cell::unsync::OnceCell;

use super::codes::{reverse_complement, GeneticCode, Translation};
use super::error::AnnotationError;
use super::gene_models::{Region, Strand, TranscriptModel};
use super::reference::ReferenceGenome;
use super::variant::Variant;

/// Number of bases missing from `length` to the next full codon.
pub fn nucleotides_to_full_codon(length: i32) -> i32 {
    (3 - length.rem_euclid(3)).rem_euclid(3)
}

/// Reference and alternate amino acids, in transcript orientation.
pub type AminoAcids = (Vec<Translation>, Vec<Translation>);

/// Annotation of one variant against one transcript.
///
/// Derived values are computed on first use and kept for the lifetime of the request.
pub struct AnnotationRequest<'a> {
    genome: &'a dyn ReferenceGenome,
    code: &'static GeneticCode,
    pub variant: &'a Variant,
    pub transcript: &'a TranscriptModel,
    cds_regions: OnceCell<Vec<Region>>,
    amino_acids: OnceCell<AminoAcids>,
}

impl<'a> AnnotationRequest<'a> {
    pub fn new(
        genome: &'a dyn ReferenceGenome,
        code: &'static GeneticCode,
        variant: &'a Variant,
        transcript: &'a TranscriptModel,
    ) -> Self {
        Self {
            genome,
            code,
            variant,
            transcript,
            cds_regions: OnceCell::new(),
            amino_acids: OnceCell::new(),
        }
    }

    pub fn strand(&self) -> Strand {
        self.transcript.strand
    }

    pub fn code(&self) -> &'static GeneticCode {
        self.code
    }

    /// Coding parts of the exons, in genomic order.
    pub fn cds_regions(&self) -> &[Region] {
        self.cds_regions.get_or_init(|| self.transcript.cds_regions())
    }

    /// Reference sequence of the transcript's contig, empty if `end < start`.
    pub fn get_sequence(&self, start: i32, end: i32) -> Result<String, AnnotationError> {
        tracing::trace!("get_sequence {}-{}", start, end);
        if end < start {
            return Ok(String::new());
        }
        self.genome
            .get_sequence(&self.transcript.chrom, start, end)
    }

    fn clamp_in_cds(&self, pos: i32) -> i32 {
        pos.clamp(self.transcript.cds.0, self.transcript.cds.1.max(self.transcript.cds.0))
    }

    /// Offset of `pos` in the coding sequence, counted in transcript direction.
    ///
    /// A position one base outside a coding region is attributed to that region.  Positions
    /// outside all coding regions yield the full coding length.
    pub fn get_coding_nucleotide_position(&self, pos: i32) -> i32 {
        let mut length = 0;
        let near = |region: &Region| region.start - 1 <= pos && pos <= region.stop + 1;
        match self.strand() {
            Strand::Plus => {
                for region in self.cds_regions() {
                    if near(region) {
                        length += pos - region.start;
                        break;
                    }
                    length += region.len();
                }
            }
            Strand::Minus => {
                for region in self.cds_regions().iter().rev() {
                    if near(region) {
                        length += region.stop - pos;
                        break;
                    }
                    length += region.len();
                }
            }
        }
        tracing::trace!("coding nucleotide position of {} is {}", pos, length);
        length
    }

    /// First and last affected codon (1-based), in transcript direction.
    pub fn get_protein_position(&self) -> (i32, i32) {
        let start_pos = self.clamp_in_cds(self.variant.position);
        let end_pos = self
            .clamp_in_cds(self.variant.ref_position_last())
            .max(start_pos);

        let start = self.get_coding_nucleotide_position(start_pos);
        let end = self.get_coding_nucleotide_position(end_pos);
        match self.strand() {
            Strand::Plus => (start / 3 + 1, end / 3 + 1),
            Strand::Minus => (end / 3 + 1, start / 3 + 1),
        }
    }

    /// Codon (1-based) at `pos`, `None` outside the coding region.
    pub fn get_protein_position_for_pos(&self, pos: i32) -> Option<i32> {
        if pos < self.transcript.cds.0 || pos > self.transcript.cds.1 {
            return None;
        }
        Some(self.get_coding_nucleotide_position(pos) / 3 + 1)
    }

    /// Number of amino acids, excluding the stop codon.
    pub fn get_protein_length(&self) -> i32 {
        let last_coding = match self.strand() {
            Strand::Plus => self.transcript.cds.1,
            Strand::Minus => self.transcript.cds.0,
        };
        self.get_coding_nucleotide_position(last_coding) / 3
    }

    /// Number of exonic bases between `start` and `end`, in genomic direction.
    pub fn get_exonic_distance(&self, start: i32, end: i32) -> i32 {
        let mut length = 0;
        for exon in &self.transcript.exons {
            if exon.contains(start) {
                if exon.contains(end) {
                    return end - start;
                }
                length = exon.stop - start + 1;
            } else {
                length += exon.len();
            }

            if exon.contains(end) {
                length -= exon.stop - end + 1;
                break;
            }
        }
        length
    }

    /// Length of the mature mRNA.
    pub fn get_exonic_length(&self) -> i32 {
        match (self.transcript.exons.first(), self.transcript.exons.last()) {
            (Some(first), Some(last)) => self.get_exonic_distance(first.start, last.stop) + 1,
            _ => 0,
        }
    }

    /// Position of the variant in the mature mRNA, in genomic direction.
    pub fn get_exonic_position(&self) -> i32 {
        match self.transcript.exons.first() {
            Some(first) => self.get_exonic_distance(first.start, self.variant.position) + 1,
            None => 0,
        }
    }

    /// Index of the exon containing `pos`, else of the last exon within one base of it.
    pub fn get_coding_region_for_pos(&self, pos: i32) -> Option<usize> {
        let mut close_match = None;
        for (idx, exon) in self.transcript.exons.iter().enumerate() {
            if exon.contains(pos) {
                return Some(idx);
            } else if exon.start - 1 <= pos && pos <= exon.stop + 1 {
                close_match = Some(idx);
            }
        }
        close_match
    }

    fn coding_region_index(&self, pos: i32) -> Result<usize, AnnotationError> {
        self.get_coding_region_for_pos(pos)
            .ok_or_else(|| AnnotationError::NoRegionForPosition {
                transcript: self.transcript.tr_id.clone(),
                position: pos,
            })
    }

    /// Codon position (0, 1, 2) of `pos` within exon `index`.
    pub fn get_frame(&self, pos: i32, index: usize) -> Result<i32, AnnotationError> {
        let exon = &self.transcript.exons[index];
        let (cds_start, cds_end) = self.transcript.cds;
        let outside = match self.strand() {
            Strand::Plus => exon.stop < cds_start,
            Strand::Minus => exon.start > cds_end,
        };
        if outside {
            tracing::warn!(
                "cannot detect frame of {} in transcript {}: exon {}-{} is not coding",
                pos,
                &self.transcript.tr_id,
                exon.start,
                exon.stop
            );
            return Ok(0);
        }
        let frame = exon.frame.ok_or_else(|| AnnotationError::MissingFrame {
            transcript: self.transcript.tr_id.clone(),
            exon_start: exon.start,
            exon_stop: exon.stop,
        })?;
        let frame = match self.strand() {
            Strand::Plus => pos - cds_start.max(exon.start) + frame,
            Strand::Minus => cds_end.min(exon.stop) - pos + frame,
        }
        .rem_euclid(3);
        tracing::trace!("frame {} for pos={}", frame, pos);
        Ok(frame)
    }

    /// `length` genomic bases starting at `pos`.
    pub fn get_codons_right(&self, pos: i32, length: i32) -> Result<String, AnnotationError> {
        if length <= 0 {
            return Ok(String::new());
        }
        self.get_sequence(pos, pos + length - 1)
    }

    /// `length` genomic bases ending at `pos`.
    pub fn get_codons_left(&self, pos: i32, length: i32) -> Result<String, AnnotationError> {
        if length <= 0 {
            return Ok(String::new());
        }
        self.get_sequence(pos - length + 1, pos)
    }

    /// `length` exonic bases starting at `pos` in exon `index`, continuing into the following
    /// exons and past the last exon into flanking sequence.
    pub fn get_coding_right(
        &self,
        pos: i32,
        length: i32,
        index: usize,
    ) -> Result<String, AnnotationError> {
        tracing::trace!("get_coding_right pos={} len={} index={}", pos, length, index);
        let exons = &self.transcript.exons;
        let last_stop = exons.last().map(|exon| exon.stop).unwrap_or(pos);
        if pos > last_stop {
            return self.get_codons_right(pos, length);
        }

        let mut result = String::new();
        let mut remaining = length;
        let mut start = Some(pos);
        let mut index = index;
        while remaining > 0 {
            let Some(exon) = exons.get(index) else {
                result.push_str(&self.get_codons_right(last_stop + 1, remaining)?);
                break;
            };
            let from = start.unwrap_or(exon.start);
            let seq = self.get_sequence(from, (from + remaining - 1).min(exon.stop))?;
            remaining -= seq.len() as i32;
            result.push_str(&seq);
            start = None;
            index += 1;
        }
        Ok(result)
    }

    /// `length` exonic bases ending at `pos` in exon `index`, continuing into the preceding
    /// exons and before the first exon into flanking sequence.
    pub fn get_coding_left(
        &self,
        pos: i32,
        length: i32,
        index: usize,
    ) -> Result<String, AnnotationError> {
        tracing::trace!("get_coding_left pos={} len={} index={}", pos, length, index);
        let exons = &self.transcript.exons;
        let first_start = exons.first().map(|exon| exon.start).unwrap_or(pos);
        if length > 0 && pos < first_start {
            return self.get_codons_left(pos, length);
        }

        let mut pieces = Vec::new();
        let mut remaining = length;
        let mut end = Some(pos);
        let mut index = index;
        while remaining > 0 {
            let exon = &exons[index];
            let to = end.unwrap_or(exon.stop);
            let seq = self.get_sequence((to - remaining + 1).max(exon.start), to)?;
            remaining -= seq.len() as i32;
            pieces.push(seq);
            if index == 0 {
                pieces.push(self.get_codons_left(exon.start - 1, remaining)?);
                break;
            }
            end = None;
            index -= 1;
        }
        pieces.reverse();
        Ok(pieces.concat())
    }

    /// Reference and alternate codons covering the variant, in genomic orientation.
    ///
    /// Both strings are padded to whole codons independently, so their lengths differ for
    /// insertions and deletions.
    pub fn get_codons(&self) -> Result<(String, String), AnnotationError> {
        let result = match self.strand() {
            Strand::Plus => self.get_codons_plus()?,
            Strand::Minus => self.get_codons_minus()?,
        };
        tracing::trace!("ref codons={}, alt codons={}", &result.0, &result.1);
        Ok(result)
    }

    fn get_codons_plus(&self) -> Result<(String, String), AnnotationError> {
        let variant = self.variant;
        let pos = self.transcript.cds.0.max(variant.position);
        let index = self.coding_region_index(pos)?;
        let frame = self.get_frame(pos, index)?;

        let mut length = (variant.reference.len() as i32).max(1);
        length += nucleotides_to_full_codon(length + frame);

        let coding_before = self.get_coding_left(pos - 1, frame, index)?;
        let coding_after = self.get_coding_right(pos, length, index)?;
        let ref_codons = format!("{}{}", &coding_before, &coding_after);

        let mut length_alt = nucleotides_to_full_codon(variant.alternate.len() as i32 + frame);
        let mut alt_codons = coding_before + &variant.alternate;
        if alt_codons.is_empty() && length_alt == 0 {
            length_alt = 3;
        }
        alt_codons.push_str(&self.get_coding_right(
            variant.position + variant.reference.len() as i32,
            length_alt,
            index,
        )?);

        Ok((ref_codons, alt_codons))
    }

    fn get_codons_minus(&self) -> Result<(String, String), AnnotationError> {
        let variant = self.variant;
        let pos = variant.position.max(self.transcript.cds.0);
        let last = variant.position + variant.reference.len() as i32 - 1;
        if pos > last + 1 {
            return Ok((String::new(), String::new()));
        }

        let index = self.coding_region_index(pos)?;
        let frame = self.get_frame(last, index)?;
        let mut length = (last - pos + 1).max(1);
        length += nucleotides_to_full_codon(length + frame);

        let coding_before = self.get_coding_left(last, length, index)?;
        let coding_after = self.get_coding_right(last + 1, frame, index)?;
        let ref_codons = format!("{}{}", &coding_before, &coding_after);

        let mut length_alt = nucleotides_to_full_codon(variant.alternate.len() as i32 + frame);
        let alt_tail = format!("{}{}", &variant.alternate, &coding_after);
        if alt_tail.is_empty() && length_alt == 0 {
            length_alt = 3;
        }
        let alt_codons = self.get_coding_left(variant.position - 1, length_alt, index)? + &alt_tail;

        Ok((ref_codons, alt_codons))
    }

    /// Translate a codon given in genomic orientation.
    pub fn translate(&self, codon: &str) -> Translation {
        match self.strand() {
            Strand::Plus => self.code.translate(codon),
            Strand::Minus => self.code.translate(&reverse_complement(codon)),
        }
    }

    fn translate_codons(&self, codons: &str) -> Vec<Translation> {
        let bases = codons.chars().collect::<Vec<_>>();
        let triplets: Vec<String> = match self.strand() {
            Strand::Plus => bases.chunks(3).map(|c| c.iter().collect()).collect(),
            Strand::Minus => bases.rchunks(3).map(|c| c.iter().collect()).collect(),
        };
        triplets
            .iter()
            .map(|codon| self.translate(codon))
            .collect()
    }

    /// Reference and alternate amino acids, in transcript direction.
    pub fn get_amino_acids(&self) -> Result<&AminoAcids, AnnotationError> {
        self.amino_acids.get_or_try_init(|| {
            let (ref_codons, alt_codons) = self.get_codons()?;
            Ok((
                self.translate_codons(&ref_codons),
                self.translate_codons(&alt_codons),
            ))
        })
    }

    /// Whether `codon` (genomic orientation) can serve as start codon: it equals the reference
    /// start codon or is a canonical start codon.
    pub fn in_start_codons(&self, codon: &str) -> Result<bool, AnnotationError> {
        let (cds_start, cds_end) = self.transcript.cds;
        Ok(match self.strand() {
            Strand::Plus => {
                codon == self.get_sequence(cds_start, cds_start + 2)?
                    || self.code.is_start_codon(codon)
            }
            Strand::Minus => {
                codon == self.get_sequence(cds_end - 2, cds_end)?
                    || self.code.is_start_codon(&reverse_complement(codon))
            }
        })
    }

    /// Scan the alternate allele and its flanks for a start codon.
    ///
    /// Returns the offset into the alternate allele and the number of alternate bases from there
    /// on, `None` if no start codon is found.
    pub fn find_start_codon(&self) -> Result<Option<(i32, i32)>, AnnotationError> {
        let variant = self.variant;
        let alternate = variant.alternate.as_bytes();
        let alt_len = alternate.len() as i32;
        let end_pos = variant.position + variant.reference.len() as i32;

        for offset in -2..=alt_len {
            let pos = variant.position + offset;
            let mut codon = if variant.position - 1 >= pos {
                self.get_sequence(pos, variant.position - 1)?
            } else {
                String::new()
            };
            let start_index = offset.clamp(0, alt_len) as usize;
            let last_index = (offset + 3).clamp(0, alt_len) as usize;
            codon.push_str(&String::from_utf8_lossy(&alternate[start_index..last_index]));
            let remaining = 3 - codon.len() as i32 - 1;
            if remaining >= 0 {
                codon.push_str(&self.get_sequence(end_pos, end_pos + remaining)?);
            }
            tracing::trace!("checking start codon candidate {} at offset {}", &codon, offset);

            if self.in_start_codons(&codon)? {
                return Ok(Some((offset, alt_len - offset)));
            }
        }
        Ok(None)
    }

    /// Whether the variant touches the codon starting at `first`; an insertion spans its
    /// `position` only.
    fn overlaps_codon(&self, first: i32) -> bool {
        let variant = self.variant;
        variant.position <= first + 2 && first <= variant.ref_position_last()
    }

    fn overlaps_first_codon(&self) -> bool {
        self.overlaps_codon(self.transcript.cds.0)
    }

    fn overlaps_last_codon(&self) -> bool {
        self.overlaps_codon(self.transcript.cds.1 - 2)
    }

    /// Whether the variant touches the start codon.
    pub fn is_start_codon_affected(&self) -> bool {
        match self.strand() {
            Strand::Plus => self.overlaps_first_codon(),
            Strand::Minus => self.overlaps_last_codon(),
        }
    }

    /// Whether the variant touches the stop codon.
    pub fn is_stop_codon_affected(&self) -> bool {
        match self.strand() {
            Strand::Plus => self.overlaps_last_codon(),
            Strand::Minus => self.overlaps_first_codon(),
        }
    }

    fn has_left_utr(&self) -> bool {
        self.transcript
            .exons
            .first()
            .is_some_and(|exon| exon.start != self.transcript.cds.0)
    }

    fn has_right_utr(&self) -> bool {
        self.transcript
            .exons
            .last()
            .is_some_and(|exon| exon.stop != self.transcript.cds.1)
    }

    pub fn has_utr5_region(&self) -> bool {
        match self.strand() {
            Strand::Plus => self.has_left_utr(),
            Strand::Minus => self.has_right_utr(),
        }
    }

    pub fn has_utr3_region(&self) -> bool {
        match self.strand() {
            Strand::Plus => self.has_right_utr(),
            Strand::Minus => self.has_left_utr(),
        }
    }
}
