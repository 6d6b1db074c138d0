//! Annotation of variants with their effects on all overlapping transcripts.

use super::checkers::check_transcript;
use super::codes::GeneticCodeChoice;
use super::effect::{Effect, EffectType};
use super::gene_models::GeneModels;
use super::reference::ReferenceGenome;
use super::request::AnnotationRequest;
use super::variant::Variant;

/// Configuration for the `EffectAnnotator`.
#[derive(Debug, Clone, Default, derive_builder::Builder)]
#[builder(pattern = "immutable")]
pub struct Config {
    /// Number of bases around each transcript to consider it overlapping a variant.
    #[builder(default)]
    pub promoter_len: i32,

    /// Genetic code to translate codons with.
    #[builder(default)]
    pub code: GeneticCodeChoice,
}

/// Computes variant effects from gene models and the reference genome.
pub struct EffectAnnotator {
    genome: Box<dyn ReferenceGenome>,
    gene_models: GeneModels,
    config: Config,
}

impl EffectAnnotator {
    pub fn new(genome: Box<dyn ReferenceGenome>, gene_models: GeneModels, config: Config) -> Self {
        Self {
            genome,
            gene_models,
            config,
        }
    }

    pub fn genome(&self) -> &dyn ReferenceGenome {
        self.genome.as_ref()
    }

    pub fn gene_models(&self) -> &GeneModels {
        &self.gene_models
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Effects of `variant` on all transcripts in reach.
    ///
    /// The result is never empty; without any transcript effect it holds a single `intergenic`
    /// effect.  Transcripts that fail annotation are logged and skipped.
    pub fn annotate(&self, variant: &Variant) -> Vec<Effect> {
        let code = self.config.code.code_for(&variant.chromosome);
        let transcripts = self.gene_models.overlapping(
            &variant.chromosome,
            variant.position,
            variant.ref_position_last(),
            self.config.promoter_len,
        );
        tracing::debug!(
            "{} overlaps {} transcript(s), using {} code",
            variant,
            transcripts.len(),
            code.name
        );

        let mut effects = Vec::new();
        for tx in transcripts {
            let request = AnnotationRequest::new(self.genome.as_ref(), code, variant, tx);
            match check_transcript(&request) {
                Ok(tx_effects) => effects.extend(tx_effects),
                Err(e) => tracing::warn!(
                    "skipping transcript {} for variant {}: {}",
                    &tx.tr_id,
                    variant,
                    e
                ),
            }
        }

        if effects.is_empty() {
            effects.push(Effect::new(EffectType::Intergenic));
        }
        effects
    }

    /// Annotate a variant given as location `chrom:pos` and compact notation.
    pub fn annotate_variant(
        &self,
        location: &str,
        notation: &str,
    ) -> Result<Vec<Effect>, anyhow::Error> {
        let variant = Variant::from_notation(self.genome.as_ref(), location, notation)?;
        Ok(self.annotate(&variant))
    }

    /// Annotate a variant given with VCF-style alleles.
    pub fn annotate_vcf(
        &self,
        chromosome: &str,
        position: i32,
        reference: &str,
        alternate: &str,
    ) -> Result<Vec<Effect>, anyhow::Error> {
        let variant = Variant::from_vcf(chromosome, position, reference, alternate)?;
        Ok(self.annotate(&variant))
    }
}
