//! Access to the reference genome sequence.

use std::collections::HashMap;
use std::io::{BufRead, Seek};
use std::path::Path;
use std::sync::Mutex;

use noodles::core::{Position, Region};

use super::error::AnnotationError;
use crate::common::contig;

/// Read-only access to reference sequence.
///
/// Implementations are shared between annotation calls and must be safe for concurrent reads.
pub trait ReferenceGenome: Send + Sync {
    /// Return the upper-case sequence of `chrom` from `start` to `end`.
    ///
    /// Coordinates are 1-based and inclusive.  An empty string is returned if `end < start`.
    /// The range is clipped to the contig.
    fn get_sequence(&self, chrom: &str, start: i32, end: i32) -> Result<String, AnnotationError>;
}

/// Clip the 1-based inclusive range to `[1, length]`, `None` if nothing remains.
fn clip(start: i32, end: i32, length: usize) -> Option<(usize, usize)> {
    let start = start.max(1) as usize;
    if end < 1 {
        return None;
    }
    let end = (end as usize).min(length);
    if end < start {
        None
    } else {
        Some((start, end))
    }
}

/// Resolve `chrom` to a known contig name, trying aliases.
fn resolve<'a, V>(contigs: &'a HashMap<String, V>, chrom: &str) -> Option<(&'a String, &'a V)> {
    contig::aliases(chrom)
        .iter()
        .find_map(|alias| contigs.get_key_value(alias.as_str()))
}

/// Reference genome backed by an indexed FASTA file.
pub struct FastaGenome<R> {
    reader: Mutex<noodles::fasta::io::IndexedReader<R>>,
    /// Contig lengths from the FAI index.
    lengths: HashMap<String, usize>,
}

impl<R> FastaGenome<R>
where
    R: BufRead + Seek,
{
    /// Wrap an indexed reader.
    pub fn new(reader: noodles::fasta::io::IndexedReader<R>) -> Self {
        let lengths = reader
            .index()
            .as_ref()
            .iter()
            .map(|record| {
                (
                    String::from_utf8_lossy(record.name().as_ref()).to_string(),
                    record.length() as usize,
                )
            })
            .collect();
        Self {
            reader: Mutex::new(reader),
            lengths,
        }
    }

    /// Names of the contigs in the FASTA index.
    pub fn contig_names(&self) -> Vec<&str> {
        self.lengths.keys().map(|name| name.as_str()).collect()
    }
}

/// Open an indexed FASTA file; the `.fai` file must exist next to it.
pub fn open_fasta<P>(path: P) -> Result<Box<dyn ReferenceGenome>, anyhow::Error>
where
    P: AsRef<Path>,
{
    tracing::info!("Opening reference FASTA file: {}", path.as_ref().display());
    let reader = noodles::fasta::io::indexed_reader::Builder::default()
        .build_from_path(path.as_ref())
        .map_err(|e| {
            anyhow::anyhow!(
                "could not open indexed FASTA {}: {}",
                path.as_ref().display(),
                e
            )
        })?;
    let genome = FastaGenome::new(reader);
    tracing::debug!("FASTA index lists {} contigs", genome.lengths.len());
    Ok(Box::new(genome))
}

impl<R> ReferenceGenome for FastaGenome<R>
where
    R: BufRead + Seek + Send,
{
    fn get_sequence(&self, chrom: &str, start: i32, end: i32) -> Result<String, AnnotationError> {
        if end < start {
            return Ok(String::new());
        }
        let (name, length) = resolve(&self.lengths, chrom)
            .ok_or_else(|| AnnotationError::Reference(format!("unknown contig {}", chrom)))?;
        let Some((start, end)) = clip(start, end, *length) else {
            return Ok(String::new());
        };

        let label = format!("{}:{}-{}", name, start, end);
        let start = Position::try_from(start)
            .map_err(|e| AnnotationError::Reference(format!("{}: {}", label, e)))?;
        let end = Position::try_from(end)
            .map_err(|e| AnnotationError::Reference(format!("{}: {}", label, e)))?;
        let region = Region::new(name.as_str(), start..=end);

        let mut reader = self
            .reader
            .lock()
            .map_err(|e| AnnotationError::Reference(format!("poisoned FASTA reader: {}", e)))?;
        let record = reader
            .query(&region)
            .map_err(|e| AnnotationError::Reference(format!("{}: {}", label, e)))?;
        Ok(String::from_utf8_lossy(record.sequence().as_ref()).to_ascii_uppercase())
    }
}

/// Reference genome held in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryGenome {
    contigs: HashMap<String, String>,
}

impl InMemoryGenome {
    /// Construct from `(name, sequence)` pairs.
    pub fn new<I, N, S>(contigs: I) -> Self
    where
        I: IntoIterator<Item = (N, S)>,
        N: Into<String>,
        S: AsRef<str>,
    {
        Self {
            contigs: contigs
                .into_iter()
                .map(|(name, seq)| (name.into(), seq.as_ref().to_ascii_uppercase()))
                .collect(),
        }
    }

    /// Load all records of a (non-indexed) FASTA file.
    pub fn from_fasta_reader<R: BufRead>(reader: R) -> Result<Self, anyhow::Error> {
        let mut reader = noodles::fasta::io::Reader::new(reader);
        let mut contigs = Vec::new();
        for result in reader.records() {
            let record = result?;
            let name = String::from_utf8_lossy(record.name().as_ref()).to_string();
            let seq = String::from_utf8_lossy(record.sequence().as_ref()).to_string();
            contigs.push((name, seq));
        }
        tracing::debug!("loaded {} contigs into memory", contigs.len());
        Ok(Self::new(contigs))
    }
}

impl ReferenceGenome for InMemoryGenome {
    fn get_sequence(&self, chrom: &str, start: i32, end: i32) -> Result<String, AnnotationError> {
        if end < start {
            return Ok(String::new());
        }
        let (_, seq) = resolve(&self.contigs, chrom)
            .ok_or_else(|| AnnotationError::Reference(format!("unknown contig {}", chrom)))?;
        Ok(match clip(start, end, seq.len()) {
            Some((start, end)) => seq[start - 1..end].to_string(),
            None => String::new(),
        })
    }
}
