//! Synthetic genome and transcripts shared by the unit tests.
//!
//! Contig `1` carries the plus strand transcript `TXP_1`, contig `2` is its reverse complement
//! and carries the mirrored minus strand transcript `TXM_1`; position `p` on `1` corresponds to
//! `101 - p` on `2`.  Contig `3` carries the non-coding transcript `NC_1`.

use std::collections::HashMap;

use super::codes::reverse_complement;
use super::gene_models::{Exon, GeneModels, Strand, TranscriptModel};
use super::reference::InMemoryGenome;

/// Length of contigs `1` and `2`.
pub const CONTIG_LEN: i32 = 100;

/// Coding sequence of `TXP_1`, 14 codons.
pub const CODING: &str = "ATGGCAGAAAAATGGCGTTTCGGACAGTACAGCCCAGATTAA";

/// Position on the mirrored contig.
pub fn mirror(pos: i32) -> i32 {
    CONTIG_LEN + 1 - pos
}

fn contig_1() -> String {
    let mut seq = vec![b'C'; CONTIG_LEN as usize];
    let mut put = |pos: usize, s: &str| {
        seq[pos - 1..pos - 1 + s.len()].copy_from_slice(s.as_bytes());
    };
    put(16, &CODING[0..15]);
    put(31, "GT");
    put(39, "AG");
    put(41, &CODING[15..35]);
    put(61, "GT");
    put(69, "AG");
    put(71, &CODING[35..42]);
    String::from_utf8_lossy(&seq).to_string()
}

fn contig_3() -> String {
    let mut seq = vec![b'A'; 80];
    seq[30..32].copy_from_slice(b"GT");
    seq[38..40].copy_from_slice(b"AG");
    String::from_utf8_lossy(&seq).to_string()
}

pub fn genome() -> InMemoryGenome {
    let plus = contig_1();
    let minus = reverse_complement(&plus);
    InMemoryGenome::new([("1", plus), ("2", minus), ("3", contig_3())])
}

/// Plus strand transcript: exons 11-30, 41-60, 71-90, coding 16-77.
pub fn plus_tx() -> TranscriptModel {
    TranscriptModel {
        gene: String::from("GP"),
        tr_id: String::from("TXP_1"),
        tr_name: String::from("TXP"),
        chrom: String::from("1"),
        strand: Strand::Plus,
        tx: (11, 90),
        cds: (16, 77),
        exons: vec![
            Exon::new(11, 30, Some(0)),
            Exon::new(41, 60, Some(0)),
            Exon::new(71, 90, Some(2)),
        ],
        attributes: HashMap::new(),
    }
}

/// Mirror image of [`plus_tx`] on contig `2`.
pub fn minus_tx() -> TranscriptModel {
    TranscriptModel {
        gene: String::from("GM"),
        tr_id: String::from("TXM_1"),
        tr_name: String::from("TXM"),
        chrom: String::from("2"),
        strand: Strand::Minus,
        tx: (11, 90),
        cds: (24, 85),
        exons: vec![
            Exon::new(11, 30, Some(2)),
            Exon::new(41, 60, Some(0)),
            Exon::new(71, 90, Some(0)),
        ],
        attributes: HashMap::new(),
    }
}

/// Non-coding transcript on contig `3`: exons 11-30, 41-60.
pub fn non_coding_tx() -> TranscriptModel {
    TranscriptModel {
        gene: String::from("GN"),
        tr_id: String::from("NC_1"),
        tr_name: String::from("NC"),
        chrom: String::from("3"),
        strand: Strand::Plus,
        tx: (11, 60),
        cds: (61, 60),
        exons: vec![Exon::new(11, 30, None), Exon::new(41, 60, None)],
        attributes: HashMap::new(),
    }
}

pub fn gene_models() -> GeneModels {
    GeneModels::new(vec![plus_tx(), minus_tx(), non_coding_tx()])
}
