//! Genetic codes and codon translation.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use parse_display::{Display, FromStr};

use crate::common::contig;

/// Three-letter name used for stop codons.
pub const STOP: &str = "End";

/// A genetic code: amino acids in lookup order together with their codons.
#[derive(Debug)]
pub struct GeneticCode {
    /// Name for logging.
    pub name: &'static str,
    /// Amino acids with codons, in lookup order.
    pub codons_aa: &'static [(&'static str, &'static [&'static str])],
    /// Canonical start codons.
    pub start_codons: &'static [&'static str],
    /// Stop codons.
    pub stop_codons: &'static [&'static str],
    /// Codon to amino acid; the first amino acid in `codons_aa` order wins.
    lookup: HashMap<&'static str, &'static str>,
}

impl GeneticCode {
    fn new(
        name: &'static str,
        codons_aa: &'static [(&'static str, &'static [&'static str])],
        start_codons: &'static [&'static str],
        stop_codons: &'static [&'static str],
    ) -> Self {
        let mut lookup = HashMap::new();
        for (aa, codons) in codons_aa {
            for codon in codons.iter() {
                lookup.entry(*codon).or_insert(*aa);
            }
        }
        Self {
            name,
            codons_aa,
            start_codons,
            stop_codons,
            lookup,
        }
    }

    /// Translate a single codon (transcript orientation).
    pub fn translate(&self, codon: &str) -> Translation {
        let codon = codon.to_ascii_uppercase();
        if codon.len() != 3 || !codon.bytes().all(|b| b"ACGTN".contains(&b)) {
            return Translation::Malformed;
        }
        match self.lookup.get(codon.as_str()) {
            Some(&aa) => Translation::Valid(aa),
            None => Translation::Unrecognized,
        }
    }

    /// Whether `codon` is one of the canonical start codons.
    pub fn is_start_codon(&self, codon: &str) -> bool {
        self.start_codons.iter().any(|c| *c == codon)
    }

    /// Whether `codon` is a stop codon.
    pub fn is_stop_codon(&self, codon: &str) -> bool {
        self.stop_codons.iter().any(|c| *c == codon)
    }
}

const NUCLEAR_START: &[&str] = &["ATG"];
const NUCLEAR_STOP: &[&str] = &["TAG", "TAA", "TGA"];

const NUCLEAR_CODONS_AA: &[(&str, &[&str])] = &[
    ("Gly", &["GGG", "GGA", "GGT", "GGC"]),
    ("Glu", &["GAG", "GAA"]),
    ("Asp", &["GAT", "GAC"]),
    ("Val", &["GTG", "GTA", "GTT", "GTC"]),
    ("Ala", &["GCG", "GCA", "GCT", "GCC"]),
    ("Arg", &["AGG", "AGA", "CGG", "CGA", "CGT", "CGC"]),
    ("Ser", &["AGT", "AGC", "TCG", "TCA", "TCT", "TCC"]),
    ("Lys", &["AAG", "AAA"]),
    ("Asn", &["AAT", "AAC"]),
    ("Met", NUCLEAR_START),
    ("Ile", &["ATA", "ATT", "ATC"]),
    ("Thr", &["ACG", "ACA", "ACT", "ACC"]),
    ("Trp", &["TGG"]),
    (STOP, NUCLEAR_STOP),
    ("Cys", &["TGT", "TGC"]),
    ("Tyr", &["TAT", "TAC"]),
    ("Leu", &["TTG", "TTA", "CTG", "CTA", "CTT", "CTC"]),
    ("Phe", &["TTT", "TTC"]),
    ("Gln", &["CAG", "CAA"]),
    ("His", &["CAT", "CAC"]),
    ("Pro", &["CCG", "CCA", "CCT", "CCC"]),
];

const MITOCHONDRIAL_START: &[&str] = &["ATG", "ATA"];
const MITOCHONDRIAL_STOP: &[&str] = &["TAA", "TAG"];

const MITOCHONDRIAL_CODONS_AA: &[(&str, &[&str])] = &[
    ("Gly", &["GGG", "GGA", "GGT", "GGC"]),
    ("Glu", &["GAG", "GAA"]),
    ("Asp", &["GAT", "GAC"]),
    ("Val", &["GTG", "GTA", "GTT", "GTC"]),
    ("Ala", &["GCG", "GCA", "GCT", "GCC"]),
    ("Arg", &["CGG", "CGA", "CGT", "CGC", "AGA", "AGG"]),
    ("Ser", &["AGT", "AGC", "TCG", "TCA", "TCT", "TCC"]),
    ("Lys", &["AAG", "AAA"]),
    ("Asn", &["AAT", "AAC"]),
    ("Met", MITOCHONDRIAL_START),
    ("Ile", &["ATT", "ATC"]),
    ("Thr", &["ACG", "ACA", "ACT", "ACC"]),
    (STOP, MITOCHONDRIAL_STOP),
    ("Trp", &["TGA", "TGG"]),
    ("Cys", &["TGT", "TGC"]),
    ("Tyr", &["TAT", "TAC"]),
    ("Leu", &["TTG", "TTA", "CTG", "CTA", "CTT", "CTC"]),
    ("Phe", &["TTT", "TTC"]),
    ("Gln", &["CAG", "CAA"]),
    ("His", &["CAT", "CAC"]),
    ("Pro", &["CCG", "CCA", "CCT", "CCC"]),
];

/// The standard (nuclear) genetic code.
pub static NUCLEAR_CODE: Lazy<GeneticCode> =
    Lazy::new(|| GeneticCode::new("nuclear", NUCLEAR_CODONS_AA, NUCLEAR_START, NUCLEAR_STOP));

/// The vertebrate mitochondrial genetic code.
pub static MITOCHONDRIAL_CODE: Lazy<GeneticCode> = Lazy::new(|| {
    GeneticCode::new(
        "mitochondrial",
        MITOCHONDRIAL_CODONS_AA,
        MITOCHONDRIAL_START,
        MITOCHONDRIAL_STOP,
    )
});

/// Result of translating one codon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Translation {
    /// Amino acid, three-letter name (`End` for stop).
    Valid(&'static str),
    /// Codon of wrong length or with letters other than `ACGTN`.
    Malformed,
    /// Well-formed codon without table entry, e.g., containing `N`.
    Unrecognized,
}

impl Translation {
    /// Whether this is a stop codon.
    pub fn is_stop(&self) -> bool {
        matches!(self, Translation::Valid(aa) if *aa == STOP)
    }

    /// Whether the translation is an amino acid.
    pub fn is_valid(&self) -> bool {
        matches!(self, Translation::Valid(_))
    }
}

impl std::fmt::Display for Translation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Translation::Valid(aa) => write!(f, "{}", aa),
            Translation::Malformed | Translation::Unrecognized => write!(f, "?"),
        }
    }
}

/// Selection of the genetic code to use.
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
#[display(style = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum GeneticCodeChoice {
    /// Mitochondrial code on mitochondrial contigs, nuclear code elsewhere.
    #[default]
    Auto,
    /// Always use the nuclear code.
    Nuclear,
    /// Always use the mitochondrial code.
    Mitochondrial,
}

impl GeneticCodeChoice {
    /// Resolve to the code to use on the given contig.
    pub fn code_for(&self, chrom: &str) -> &'static GeneticCode {
        match self {
            GeneticCodeChoice::Auto if contig::is_mitochondrial(chrom) => &*MITOCHONDRIAL_CODE,
            GeneticCodeChoice::Auto | GeneticCodeChoice::Nuclear => &*NUCLEAR_CODE,
            GeneticCodeChoice::Mitochondrial => &*MITOCHONDRIAL_CODE,
        }
    }
}

/// Reverse complement of a nucleotide sequence.
///
/// Letters other than `ACGTN` (either case) are mapped to `?` so that codons containing them
/// translate as malformed.
pub fn reverse_complement(seq: &str) -> String {
    seq.chars()
        .rev()
        .map(|c| match c.to_ascii_uppercase() {
            'A' => 'T',
            'T' => 'A',
            'C' => 'G',
            'G' => 'C',
            'N' => 'N',
            _ => '?',
        })
        .collect()
}
