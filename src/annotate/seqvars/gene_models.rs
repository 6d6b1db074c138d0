//! Transcript models and their indexed collection.

use std::collections::HashMap;
use std::io::BufRead;
use std::path::Path;

use bio::data_structures::interval_tree::ArrayBackedIntervalTree;
use parse_display::{Display, FromStr};

use crate::common::{contig, io::std::open_read_maybe_gz};

/// Transcript strand.
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
)]
pub enum Strand {
    #[display("+")]
    #[serde(rename = "+")]
    Plus,
    #[display("-")]
    #[serde(rename = "-")]
    Minus,
}

/// Closed interval on a contig, 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    pub start: i32,
    pub stop: i32,
}

impl Region {
    pub fn new(start: i32, stop: i32) -> Self {
        Self { start, stop }
    }

    /// Number of bases in the region.
    pub fn len(&self) -> i32 {
        self.stop - self.start + 1
    }

    pub fn is_empty(&self) -> bool {
        self.stop < self.start
    }
}

/// One exon of a transcript.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Exon {
    /// 1-based first base.
    pub start: i32,
    /// 1-based last base.
    pub stop: i32,
    /// Codon position (0, 1, 2) of the first coding base, `None` for non-coding exons.
    pub frame: Option<i32>,
}

impl Exon {
    pub fn new(start: i32, stop: i32, frame: Option<i32>) -> Self {
        Self { start, stop, frame }
    }

    pub fn len(&self) -> i32 {
        self.stop - self.start + 1
    }

    pub fn is_empty(&self) -> bool {
        self.stop < self.start
    }

    /// Whether the exon contains `pos`.
    pub fn contains(&self, pos: i32) -> bool {
        self.start <= pos && pos <= self.stop
    }
}

/// Structure of one transcript on the genome.
///
/// Exons are sorted by position regardless of strand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptModel {
    pub gene: String,
    /// Unique transcript identifier.
    pub tr_id: String,
    /// Transcript name in the source, e.g., the RefSeq accession.
    pub tr_name: String,
    pub chrom: String,
    pub strand: Strand,
    /// Transcript start and end.
    pub tx: (i32, i32),
    /// Coding region start and end, `cds.0 >= cds.1` for non-coding transcripts.
    pub cds: (i32, i32),
    pub exons: Vec<Exon>,
    pub attributes: HashMap<String, String>,
}

impl TranscriptModel {
    /// Whether the transcript codes for a protein.
    pub fn is_coding(&self) -> bool {
        self.cds.0 < self.cds.1
    }

    /// Exonic parts of the coding region, in genomic order.
    pub fn cds_regions(&self) -> Vec<Region> {
        if !self.is_coding() {
            return Vec::new();
        }
        self.exons
            .iter()
            .map(|exon| Region::new(exon.start.max(self.cds.0), exon.stop.min(self.cds.1)))
            .filter(|region| !region.is_empty())
            .collect()
    }

    /// Exonic regions before the coding start (genomic orientation).
    fn regions_left_of_cds(&self) -> Vec<Region> {
        self.exons
            .iter()
            .filter(|exon| exon.start < self.cds.0)
            .map(|exon| Region::new(exon.start, exon.stop.min(self.cds.0 - 1)))
            .collect()
    }

    /// Exonic regions after the coding end (genomic orientation).
    fn regions_right_of_cds(&self) -> Vec<Region> {
        self.exons
            .iter()
            .filter(|exon| exon.stop > self.cds.1)
            .map(|exon| Region::new(exon.start.max(self.cds.1 + 1), exon.stop))
            .collect()
    }

    /// Exonic regions of the 5' UTR.
    pub fn utr5_regions(&self) -> Vec<Region> {
        if !self.is_coding() {
            return Vec::new();
        }
        match self.strand {
            Strand::Plus => self.regions_left_of_cds(),
            Strand::Minus => self.regions_right_of_cds(),
        }
    }

    /// Exonic regions of the 3' UTR.
    pub fn utr3_regions(&self) -> Vec<Region> {
        if !self.is_coding() {
            return Vec::new();
        }
        match self.strand {
            Strand::Plus => self.regions_right_of_cds(),
            Strand::Minus => self.regions_left_of_cds(),
        }
    }

    /// Sum of exon lengths.
    pub fn total_len(&self) -> i32 {
        self.exons.iter().map(Exon::len).sum()
    }

    /// Number of coding bases.
    pub fn cds_len(&self) -> i32 {
        self.cds_regions().iter().map(Region::len).sum()
    }

    /// Recompute exon frames from the coding region.
    pub fn update_frames(&mut self) {
        if !self.is_coding() {
            self.exons.iter_mut().for_each(|exon| exon.frame = None);
            return;
        }
        let (cds_start, cds_end) = self.cds;
        let order: Vec<usize> = match self.strand {
            Strand::Plus => (0..self.exons.len()).collect(),
            Strand::Minus => (0..self.exons.len()).rev().collect(),
        };
        let mut coding_len = 0;
        for idx in order {
            let exon = &mut self.exons[idx];
            let region = Region::new(exon.start.max(cds_start), exon.stop.min(cds_end));
            if region.is_empty() {
                exon.frame = None;
            } else {
                exon.frame = Some(coding_len % 3);
                coding_len += region.len();
            }
        }
    }
}

/// Supported gene model file formats.
#[derive(
    clap::ValueEnum,
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Display,
    FromStr,
    serde::Deserialize,
    serde::Serialize,
    strum::EnumIter,
)]
#[display(style = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum GeneModelsFormat {
    /// GPF default columns (`chr trID trOrigId gene strand tsBeg txEnd ...`), 1-based.
    #[default]
    Default,
    /// UCSC refFlat, 0-based half-open starts.
    RefFlat,
}

type IntervalTree = ArrayBackedIntervalTree<i32, u32>;

/// Collection of transcript models with a positional index.
pub struct GeneModels {
    transcripts: Vec<TranscriptModel>,
    /// Mapping from contig name to index in `trees`.
    contig_to_idx: HashMap<String, usize>,
    /// Interval tree over transcript extents, for each contig.
    trees: Vec<IntervalTree>,
    /// Mapping from gene symbol to indices in `transcripts`.
    gene_to_txs: HashMap<String, Vec<usize>>,
}

impl std::fmt::Debug for GeneModels {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeneModels")
            .field("transcripts", &self.transcripts.len())
            .field("contigs", &self.contig_to_idx.len())
            .finish()
    }
}

impl GeneModels {
    /// Build the indices over the given transcripts.
    pub fn new(transcripts: Vec<TranscriptModel>) -> Self {
        let mut contig_to_idx = HashMap::new();
        let mut trees: Vec<IntervalTree> = Vec::new();
        let mut gene_to_txs: HashMap<String, Vec<usize>> = HashMap::new();

        for (tx_idx, tx) in transcripts.iter().enumerate() {
            gene_to_txs.entry(tx.gene.clone()).or_default().push(tx_idx);
            if tx.tx.1 < tx.tx.0 {
                tracing::warn!(
                    "skipping transcript {} with empty extent {}-{}",
                    &tx.tr_id,
                    tx.tx.0,
                    tx.tx.1
                );
                continue;
            }
            let contig_idx = *contig_to_idx
                .entry(tx.chrom.clone())
                .or_insert(trees.len());
            if contig_idx >= trees.len() {
                trees.push(IntervalTree::new());
            }
            trees[contig_idx].insert(tx.tx.0..(tx.tx.1 + 1), tx_idx as u32);
        }
        trees.iter_mut().for_each(|t| t.index());

        tracing::debug!(
            "indexed {} transcripts on {} contigs",
            transcripts.len(),
            trees.len()
        );

        Self {
            transcripts,
            contig_to_idx,
            trees,
            gene_to_txs,
        }
    }

    /// Load gene models from a plain or gzip-compressed file.
    pub fn from_path<P>(path: P, format: GeneModelsFormat) -> Result<Self, anyhow::Error>
    where
        P: AsRef<Path>,
    {
        tracing::info!(
            "Loading gene models ({}) from {}",
            format,
            path.as_ref().display()
        );
        let reader = open_read_maybe_gz(path.as_ref())?;
        Self::from_reader(reader, format)
    }

    /// Load gene models in the given format.
    pub fn from_reader<R: BufRead>(
        reader: R,
        format: GeneModelsFormat,
    ) -> Result<Self, anyhow::Error> {
        let transcripts = match format {
            GeneModelsFormat::Default => parse_default_format(reader)?,
            GeneModelsFormat::RefFlat => parse_ref_flat_format(reader)?,
        };
        Ok(Self::new(transcripts))
    }

    pub fn transcripts(&self) -> &[TranscriptModel] {
        &self.transcripts
    }

    pub fn len(&self) -> usize {
        self.transcripts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transcripts.is_empty()
    }

    /// Resolve a contig name, trying `chr` prefix variations.
    fn tree_for(&self, chrom: &str) -> Option<&IntervalTree> {
        contig::aliases(chrom)
            .iter()
            .find_map(|alias| self.contig_to_idx.get(alias.as_str()))
            .map(|idx| &self.trees[*idx])
    }

    /// Whether any transcript lies on the contig.
    pub fn has_chromosome(&self, chrom: &str) -> bool {
        self.tree_for(chrom).is_some()
    }

    /// Transcripts whose extent, widened by `padding` on both sides, overlaps `[start, end]`.
    ///
    /// Transcripts are returned in load order.
    pub fn overlapping(
        &self,
        chrom: &str,
        start: i32,
        end: i32,
        padding: i32,
    ) -> Vec<&TranscriptModel> {
        let Some(tree) = self.tree_for(chrom) else {
            return Vec::new();
        };
        let (start, end) = if end < start { (end, start) } else { (start, end) };
        let mut tx_idxs = tree
            .find((start - padding)..(end + padding + 1))
            .iter()
            .map(|entry| *entry.data() as usize)
            .collect::<Vec<_>>();
        tx_idxs.sort_unstable();
        tx_idxs
            .into_iter()
            .map(|idx| &self.transcripts[idx])
            .collect()
    }

    /// All transcripts of the given gene.
    pub fn gene_models_by_gene(&self, gene: &str) -> Vec<&TranscriptModel> {
        self.gene_to_txs
            .get(gene)
            .map(|idxs| idxs.iter().map(|idx| &self.transcripts[*idx]).collect())
            .unwrap_or_default()
    }

    /// Gene symbols, sorted.
    pub fn gene_names(&self) -> Vec<&str> {
        let mut result = self
            .gene_to_txs
            .keys()
            .map(|gene| gene.as_str())
            .collect::<Vec<_>>();
        result.sort_unstable();
        result
    }
}

/// Parse a comma-separated list of integers, tolerating a trailing comma.
fn parse_int_list(value: &str) -> Result<Vec<i32>, anyhow::Error> {
    value
        .trim()
        .trim_end_matches(',')
        .split(',')
        .filter(|token| !token.is_empty())
        .map(|token| {
            token
                .trim()
                .parse::<i32>()
                .map_err(|e| anyhow::anyhow!("invalid integer {:?}: {}", token, e))
        })
        .collect()
}

/// Parse `key:value;key:value` attributes.
fn parse_attributes(value: &str) -> HashMap<String, String> {
    value
        .split(';')
        .filter_map(|item| item.split_once(':'))
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect()
}

/// One line of the GPF default gene models format.
#[derive(Debug, serde::Deserialize)]
struct DefaultRecord {
    chr: String,
    #[serde(rename = "trID")]
    tr_id: String,
    #[serde(rename = "trOrigId", default)]
    tr_orig_id: Option<String>,
    gene: String,
    strand: Strand,
    #[serde(rename = "tsBeg")]
    tx_start: i32,
    #[serde(rename = "txEnd")]
    tx_end: i32,
    #[serde(rename = "cdsStart")]
    cds_start: i32,
    #[serde(rename = "cdsEnd")]
    cds_end: i32,
    #[serde(rename = "exonStarts")]
    exon_starts: String,
    #[serde(rename = "exonEnds")]
    exon_ends: String,
    #[serde(rename = "exonFrames")]
    exon_frames: String,
    #[serde(default)]
    atts: Option<String>,
}

impl TryFrom<DefaultRecord> for TranscriptModel {
    type Error = anyhow::Error;

    fn try_from(record: DefaultRecord) -> Result<Self, Self::Error> {
        let starts = parse_int_list(&record.exon_starts)?;
        let ends = parse_int_list(&record.exon_ends)?;
        let frames = parse_int_list(&record.exon_frames)?;
        if starts.len() != ends.len() || starts.len() != frames.len() {
            anyhow::bail!(
                "transcript {}: {} exon starts, {} exon ends, {} exon frames",
                &record.tr_id,
                starts.len(),
                ends.len(),
                frames.len()
            );
        }
        let exons = itertools::izip!(starts, ends, frames)
            .map(|(start, stop, frame)| Exon::new(start, stop, (frame >= 0).then_some(frame)))
            .collect();

        Ok(TranscriptModel {
            gene: record.gene,
            tr_name: record
                .tr_orig_id
                .filter(|name| !name.is_empty())
                .unwrap_or_else(|| record.tr_id.clone()),
            tr_id: record.tr_id,
            chrom: record.chr,
            strand: record.strand,
            tx: (record.tx_start, record.tx_end),
            cds: (record.cds_start, record.cds_end),
            exons,
            attributes: record
                .atts
                .as_deref()
                .map(parse_attributes)
                .unwrap_or_default(),
        })
    }
}

/// Parse the GPF default format; a header line is required.
fn parse_default_format<R: BufRead>(reader: R) -> Result<Vec<TranscriptModel>, anyhow::Error> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(true)
        .from_reader(reader);
    let mut result = Vec::new();
    for record in reader.deserialize() {
        let record: DefaultRecord = record?;
        result.push(TranscriptModel::try_from(record)?);
    }
    tracing::debug!("parsed {} transcripts in default format", result.len());
    Ok(result)
}

/// One line of the UCSC refFlat format.
#[derive(Debug, serde::Deserialize)]
struct RefFlatRecord {
    gene_name: String,
    name: String,
    chrom: String,
    strand: Strand,
    tx_start: i32,
    tx_end: i32,
    cds_start: i32,
    cds_end: i32,
    exon_count: usize,
    exon_starts: String,
    exon_ends: String,
}

/// Parse refFlat; a `#geneName` header line is skipped as comment.
fn parse_ref_flat_format<R: BufRead>(reader: R) -> Result<Vec<TranscriptModel>, anyhow::Error> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .comment(Some(b'#'))
        .from_reader(reader);
    let mut counter: HashMap<String, usize> = HashMap::new();
    let mut result = Vec::new();
    for record in reader.deserialize() {
        let record: RefFlatRecord = record?;
        let starts = parse_int_list(&record.exon_starts)?;
        let ends = parse_int_list(&record.exon_ends)?;
        if starts.len() != ends.len() || starts.len() != record.exon_count {
            anyhow::bail!(
                "transcript {}: exon count {} but {} starts and {} ends",
                &record.name,
                record.exon_count,
                starts.len(),
                ends.len()
            );
        }

        let count = counter.entry(record.name.clone()).or_default();
        *count += 1;

        let mut tx = TranscriptModel {
            gene: record.gene_name,
            tr_id: format!("{}_{}", &record.name, count),
            tr_name: record.name,
            chrom: record.chrom,
            strand: record.strand,
            tx: (record.tx_start + 1, record.tx_end),
            cds: (record.cds_start + 1, record.cds_end),
            exons: starts
                .into_iter()
                .zip(ends)
                .map(|(start, stop)| Exon::new(start + 1, stop, None))
                .collect(),
            attributes: HashMap::new(),
        };
        tx.update_frames();
        result.push(tx);
    }
    tracing::debug!("parsed {} transcripts in refFlat format", result.len());
    Ok(result)
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::*;

    /// Plus strand transcript with three exons and UTRs on both sides.
    fn plus_tx() -> TranscriptModel {
        TranscriptModel {
            gene: String::from("GENEP"),
            tr_id: String::from("TXP_1"),
            tr_name: String::from("TXP"),
            chrom: String::from("1"),
            strand: Strand::Plus,
            tx: (11, 90),
            cds: (16, 75),
            exons: vec![
                Exon::new(11, 30, Some(0)),
                Exon::new(41, 60, Some(0)),
                Exon::new(71, 90, Some(2)),
            ],
            attributes: HashMap::new(),
        }
    }

    #[test]
    fn cds_regions_and_lengths() {
        let tx = plus_tx();
        assert!(tx.is_coding());
        assert_eq!(
            tx.cds_regions(),
            vec![Region::new(16, 30), Region::new(41, 60), Region::new(71, 75)]
        );
        assert_eq!(tx.cds_len(), 40);
        assert_eq!(tx.total_len(), 60);
        assert_eq!(tx.utr5_regions(), vec![Region::new(11, 15)]);
        assert_eq!(tx.utr3_regions(), vec![Region::new(76, 90)]);
    }

    #[test]
    fn utr_regions_minus_strand() {
        let tx = TranscriptModel {
            strand: Strand::Minus,
            ..plus_tx()
        };
        assert_eq!(tx.utr5_regions(), vec![Region::new(76, 90)]);
        assert_eq!(tx.utr3_regions(), vec![Region::new(11, 15)]);
    }

    #[test]
    fn non_coding_has_no_cds_regions() {
        let tx = TranscriptModel {
            cds: (91, 90),
            ..plus_tx()
        };
        assert!(!tx.is_coding());
        assert!(tx.cds_regions().is_empty());
        assert!(tx.utr5_regions().is_empty());
    }

    #[test]
    fn update_frames_plus() {
        let mut tx = plus_tx();
        tx.exons.iter_mut().for_each(|exon| exon.frame = None);
        tx.update_frames();
        assert_eq!(
            tx.exons.iter().map(|exon| exon.frame).collect::<Vec<_>>(),
            vec![Some(0), Some(0), Some(2)]
        );
    }

    #[test]
    fn update_frames_minus() {
        let mut tx = TranscriptModel {
            strand: Strand::Minus,
            cds: (16, 85),
            exons: vec![
                Exon::new(5, 10, None),
                Exon::new(11, 30, None),
                Exon::new(41, 60, None),
                Exon::new(71, 90, None),
            ],
            ..plus_tx()
        };
        tx.update_frames();
        // 71-85 has 15 coding bases, 41-60 has 20.
        assert_eq!(
            tx.exons.iter().map(|exon| exon.frame).collect::<Vec<_>>(),
            vec![None, Some(2), Some(0), Some(0)]
        );
    }

    const DEFAULT_FORMAT: &str = "\
chr\ttrID\ttrOrigId\tgene\tstrand\ttsBeg\ttxEnd\tcdsStart\tcdsEnd\texonStarts\texonEnds\texonFrames\tatts
1\tTXP_1\tTXP\tGENEP\t+\t11\t90\t16\t75\t11,41,71\t30,60,90\t0,0,2\tgene_version:3;source:test
1\tNC_1\tNC\tGENEN\t-\t100\t200\t201\t200\t100,150\t120,200\t-1,-1\t
";

    #[test]
    fn parse_default() -> Result<(), anyhow::Error> {
        let gene_models =
            GeneModels::from_reader(DEFAULT_FORMAT.as_bytes(), GeneModelsFormat::Default)?;
        assert_eq!(gene_models.len(), 2);

        let mut expected = plus_tx();
        expected.attributes = HashMap::from([
            (String::from("gene_version"), String::from("3")),
            (String::from("source"), String::from("test")),
        ]);
        assert_eq!(gene_models.transcripts()[0], expected);

        let non_coding = &gene_models.transcripts()[1];
        assert!(!non_coding.is_coding());
        assert_eq!(non_coding.strand, Strand::Minus);
        assert_eq!(non_coding.exons[1], Exon::new(150, 200, None));
        assert!(non_coding.attributes.is_empty());

        Ok(())
    }

    #[test]
    fn parse_default_mismatched_exons() {
        let text = "\
chr\ttrID\tgene\tstrand\ttsBeg\ttxEnd\tcdsStart\tcdsEnd\texonStarts\texonEnds\texonFrames\tatts
1\tTX_1\tG\t+\t11\t90\t16\t75\t11,41\t30\t0,0\t
";
        assert!(GeneModels::from_reader(text.as_bytes(), GeneModelsFormat::Default).is_err());
    }

    #[test]
    fn parse_ref_flat() -> Result<(), anyhow::Error> {
        let text = "\
#geneName\tname\tchrom\tstrand\ttxStart\ttxEnd\tcdsStart\tcdsEnd\texonCount\texonStarts\texonEnds
GENEP\tTXP\t1\t+\t10\t90\t15\t75\t3\t10,40,70,\t30,60,90,
GENEP\tTXP\t2\t+\t10\t90\t15\t75\t3\t10,40,70,\t30,60,90,
";
        let gene_models =
            GeneModels::from_reader(text.as_bytes(), GeneModelsFormat::RefFlat)?;
        assert_eq!(gene_models.len(), 2);
        assert_eq!(gene_models.transcripts()[0], plus_tx());
        assert_eq!(gene_models.transcripts()[1].tr_id, "TXP_2");
        assert_eq!(gene_models.transcripts()[1].tr_name, "TXP");
        assert_eq!(gene_models.gene_models_by_gene("GENEP").len(), 2);
        assert_eq!(gene_models.gene_names(), vec!["GENEP"]);

        Ok(())
    }

    #[rstest::rstest]
    #[case("1", 5, 10, 0, &[])]
    #[case("1", 5, 10, 1, &["TXP_1"])]
    #[case("1", 5, 11, 0, &["TXP_1"])]
    #[case("1", 90, 90, 0, &["TXP_1"])]
    #[case("1", 91, 95, 0, &[])]
    #[case("1", 91, 95, 5, &["TXP_1", "TX2_1"])]
    #[case("chr1", 50, 150, 0, &["TXP_1", "TX2_1"])]
    #[case("2", 50, 50, 0, &[])]
    fn overlapping(
        #[case] chrom: &str,
        #[case] start: i32,
        #[case] end: i32,
        #[case] padding: i32,
        #[case] expected: &[&str],
    ) {
        let other = TranscriptModel {
            tr_id: String::from("TX2_1"),
            tx: (100, 200),
            ..plus_tx()
        };
        let gene_models = GeneModels::new(vec![plus_tx(), other]);

        let tr_ids = gene_models
            .overlapping(chrom, start, end, padding)
            .iter()
            .map(|tx| tx.tr_id.as_str())
            .collect::<Vec<_>>();
        assert_eq!(tr_ids, expected);
        assert_eq!(gene_models.has_chromosome(chrom), chrom != "2");
    }
}
