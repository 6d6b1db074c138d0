//! Command line interface for annotating sequence variants.

use std::io::{Read, Write};
use std::time::Instant;

use clap::Parser;
use thousands::Separable;

use super::annotator::{ConfigBuilder, EffectAnnotator};
use super::codes::GeneticCodeChoice;
use super::effect::{effects_description, Effect};
use super::gene_models::{GeneModels, GeneModelsFormat};
use super::reference::open_fasta;
use crate::common::io::std::{open_read_maybe_gz, open_write_maybe_gz};

/// Gene models, reference genome, and annotation settings.
#[derive(clap::Args, Debug, Clone)]
pub struct AnnotatorArgs {
    /// Path to the gene models file (plain or gzip).
    #[arg(long)]
    pub path_gene_models: String,
    /// Format of the gene models file.
    #[arg(long, value_enum, default_value_t = GeneModelsFormat::Default)]
    pub gene_models_format: GeneModelsFormat,
    /// Path to the reference FASTA file, with `.fai` index next to it.
    #[arg(long)]
    pub path_reference_fasta: String,
    /// Consider transcripts within this distance of a variant.
    #[arg(long, default_value_t = 0)]
    pub promoter_len: i32,
    /// Genetic code to use.
    #[arg(long, value_enum, default_value_t = GeneticCodeChoice::Auto)]
    pub code: GeneticCodeChoice,
}

impl AnnotatorArgs {
    /// Load gene models and reference and construct the annotator.
    pub fn load(&self) -> Result<EffectAnnotator, anyhow::Error> {
        let start = Instant::now();
        tracing::info!("Loading gene models from {} ...", &self.path_gene_models);
        let gene_models = GeneModels::from_path(&self.path_gene_models, self.gene_models_format)?;
        tracing::info!(
            "... loaded {} transcripts in {:?}",
            gene_models.len().separate_with_commas(),
            start.elapsed()
        );
        let genome = open_fasta(&self.path_reference_fasta)?;
        let config = ConfigBuilder::default()
            .promoter_len(self.promoter_len)
            .code(self.code)
            .build()?;
        Ok(EffectAnnotator::new(genome, gene_models, config))
    }
}

/// Names of the columns holding the variant.
#[derive(clap::Args, Debug, Clone)]
pub struct VariantColumns {
    /// Column with the location `chrom:pos`.
    #[arg(long, default_value = "location")]
    pub location_column: String,
    /// Column with the variant in compact notation, e.g., `sub(A->T)`.
    #[arg(long, default_value = "variant")]
    pub variant_column: String,
    /// Column with the chromosome, used without location/variant columns.
    #[arg(long, default_value = "chrom")]
    pub chrom_column: String,
    /// Column with the VCF-style position.
    #[arg(long, default_value = "pos")]
    pub pos_column: String,
    /// Column with the VCF-style reference allele.
    #[arg(long, default_value = "ref")]
    pub ref_column: String,
    /// Column with the VCF-style alternate allele.
    #[arg(long, default_value = "alt")]
    pub alt_column: String,
}

/// Command line arguments for `annotate seqvars` sub command.
#[derive(Parser, Debug, Clone)]
#[command(about = "Annotate variants in a tab-separated column file", long_about = None)]
pub struct Args {
    #[command(flatten)]
    pub annotator: AnnotatorArgs,
    #[command(flatten)]
    pub columns: VariantColumns,
    /// Path to the input TSV file (plain or gzip), with header line.
    #[arg(long)]
    pub path_input_tsv: String,
    /// Path to the output TSV file, gzip compressed if ending in `.gz`.
    #[arg(long)]
    pub path_output_tsv: String,
    /// Stop after this many records.
    #[arg(long)]
    pub max_var_count: Option<usize>,
}

/// Command line arguments for `annotate variant` sub command.
#[derive(Parser, Debug, Clone)]
#[command(about = "Annotate a single variant", long_about = None)]
pub struct VariantArgs {
    #[command(flatten)]
    pub annotator: AnnotatorArgs,
    /// Location of the variant, `chrom:pos`.
    #[arg(long)]
    pub location: String,
    /// Variant in compact notation: `sub(A->T)`, `ins(ACG)`, or `del(3)`.
    #[arg(long)]
    pub variant: String,
    /// Write the effects as JSON.
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

/// How variants are read from a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum VariantSource {
    Notation {
        location: usize,
        variant: usize,
    },
    Vcf {
        chrom: usize,
        pos: usize,
        reference: usize,
        alternate: usize,
    },
}

impl VariantSource {
    fn from_headers(
        headers: &csv::StringRecord,
        columns: &VariantColumns,
    ) -> Result<Self, anyhow::Error> {
        let find = |name: &str| headers.iter().position(|header| header == name);

        if let (Some(location), Some(variant)) =
            (find(&columns.location_column), find(&columns.variant_column))
        {
            return Ok(Self::Notation { location, variant });
        }
        match (
            find(&columns.chrom_column),
            find(&columns.pos_column),
            find(&columns.ref_column),
            find(&columns.alt_column),
        ) {
            (Some(chrom), Some(pos), Some(reference), Some(alternate)) => Ok(Self::Vcf {
                chrom,
                pos,
                reference,
                alternate,
            }),
            _ => anyhow::bail!(
                "input needs columns {}/{} or {}/{}/{}/{}",
                &columns.location_column,
                &columns.variant_column,
                &columns.chrom_column,
                &columns.pos_column,
                &columns.ref_column,
                &columns.alt_column
            ),
        }
    }

    fn annotate(
        &self,
        annotator: &EffectAnnotator,
        record: &csv::StringRecord,
    ) -> Result<Vec<Effect>, anyhow::Error> {
        let field = |idx: usize| {
            record
                .get(idx)
                .ok_or_else(|| anyhow::anyhow!("record has no column {}", idx + 1))
        };
        match *self {
            Self::Notation { location, variant } => {
                annotator.annotate_variant(field(location)?, field(variant)?)
            }
            Self::Vcf {
                chrom,
                pos,
                reference,
                alternate,
            } => {
                let pos = field(pos)?
                    .parse::<i32>()
                    .map_err(|e| anyhow::anyhow!("invalid position: {}", e))?;
                annotator.annotate_vcf(field(chrom)?, pos, field(reference)?, field(alternate)?)
            }
        }
    }
}

/// Annotate all records of the column file in `reader`, return the number of records.
pub fn annotate_tsv<R, W>(
    annotator: &EffectAnnotator,
    columns: &VariantColumns,
    reader: R,
    writer: W,
    max_var_count: Option<usize>,
) -> Result<usize, anyhow::Error>
where
    R: Read,
    W: Write,
{
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(true)
        .from_reader(reader);
    let mut writer = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .from_writer(writer);

    let headers = reader.headers()?.clone();
    let source = VariantSource::from_headers(&headers, columns)?;
    tracing::debug!("reading variants from {:?}", &source);

    let mut headers_out = headers;
    for name in ["worst_effect", "gene_effects", "effect_details"] {
        headers_out.push_field(name);
    }
    writer.write_record(&headers_out)?;

    let mut total = 0usize;
    for (idx, record) in reader.records().enumerate() {
        let mut record = record?;
        let description = match source.annotate(annotator, &record) {
            Ok(effects) => effects_description(&effects),
            Err(e) => {
                // header is line 1
                tracing::warn!("could not annotate line {}: {}", idx + 2, e);
                None
            }
        };
        match description {
            Some(description) => {
                record.push_field(&description.worst_effect.to_string());
                record.push_field(&description.gene_effects);
                record.push_field(&description.effect_details);
            }
            None => {
                for _ in 0..3 {
                    record.push_field("");
                }
            }
        }
        writer.write_record(&record)?;

        total += 1;
        if let Some(max_var_count) = max_var_count {
            if total >= max_var_count {
                tracing::warn!(
                    "Stopping after {} records as requested by --max-var-count",
                    total
                );
                break;
            }
        }
    }
    writer.flush()?;

    Ok(total)
}

/// Main entry point for `annotate seqvars` sub command.
pub fn run(_common: &crate::common::Args, args: &Args) -> Result<(), anyhow::Error> {
    tracing::info!("args = {:?}", &args);
    let annotator = args.annotator.load()?;

    tracing::info!("Annotating {} ...", &args.path_input_tsv);
    let start = Instant::now();
    let total = annotate_tsv(
        &annotator,
        &args.columns,
        open_read_maybe_gz(&args.path_input_tsv)?,
        open_write_maybe_gz(&args.path_output_tsv)?,
        args.max_var_count,
    )?;
    tracing::info!(
        "... annotated {} records in {:?}",
        total.separate_with_commas(),
        start.elapsed()
    );

    Ok(())
}

/// Write the effects of one variant, one line each, followed by the description.
pub fn write_effects<W: Write>(effects: &[Effect], out: &mut W) -> Result<(), anyhow::Error> {
    for effect in effects {
        writeln!(out, "{}", effect)?;
    }
    if let Some(description) = effects_description(effects) {
        writeln!(
            out,
            "{}\t{}\t{}",
            description.worst_effect, &description.gene_effects, &description.effect_details
        )?;
    }
    Ok(())
}

/// Main entry point for `annotate variant` sub command.
pub fn run_variant(_common: &crate::common::Args, args: &VariantArgs) -> Result<(), anyhow::Error> {
    let annotator = args.annotator.load()?;
    let effects = annotator.annotate_variant(&args.location, &args.variant)?;
    let mut out = std::io::stdout().lock();
    if args.json {
        serde_json::to_writer_pretty(&mut out, &effects)?;
        writeln!(out)?;
        Ok(())
    } else {
        write_effects(&effects, &mut out)
    }
}
