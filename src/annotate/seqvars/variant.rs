//! Normalized sequence variants and the compact mutation notation.

use nom::{
    branch::alt,
    bytes::complete::{tag, tag_no_case, take_till1, take_while1},
    character::complete::{alpha1, char, digit1},
    combinator::{all_consuming, map, map_res},
    IResult, Parser,
};

use super::reference::ReferenceGenome;

/// Kind of a normalized variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, parse_display::Display)]
#[display(style = "snake_case")]
pub enum VariantKind {
    Substitution,
    Insertion,
    Deletion,
}

/// A single normalized allele.
///
/// For insertions the reference is empty and the inserted bases go before `position`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Variant {
    pub chromosome: String,
    /// 1-based position of the first reference base.
    pub position: i32,
    pub reference: String,
    pub alternate: String,
}

impl std::fmt::Display for Variant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{} {}", self.chromosome, self.position, self.notation())
    }
}

fn is_nucleotide(c: char) -> bool {
    matches!(c.to_ascii_uppercase(), 'A' | 'C' | 'G' | 'T' | 'N')
}

impl Variant {
    /// Construct a variant, upper-casing the alleles.
    pub fn new(
        chromosome: &str,
        position: i32,
        reference: &str,
        alternate: &str,
    ) -> Result<Self, anyhow::Error> {
        if position < 1 {
            anyhow::bail!("invalid position {} for variant on {}", position, chromosome);
        }
        if reference.is_empty() && alternate.is_empty() {
            anyhow::bail!(
                "reference and alternate are both empty at {}:{}",
                chromosome,
                position
            );
        }
        for allele in [reference, alternate] {
            if !allele.chars().all(is_nucleotide) {
                anyhow::bail!("invalid allele {:?} at {}:{}", allele, chromosome, position);
            }
        }
        Ok(Self {
            chromosome: chromosome.to_string(),
            position,
            reference: reference.to_ascii_uppercase(),
            alternate: alternate.to_ascii_uppercase(),
        })
    }

    /// Last reference position touched by the variant (inclusive).
    ///
    /// Insertions touch `position` itself.
    pub fn ref_position_last(&self) -> i32 {
        self.position + (self.reference.len() as i32).max(1) - 1
    }

    pub fn kind(&self) -> VariantKind {
        if self.reference.is_empty() {
            VariantKind::Insertion
        } else if self.alternate.is_empty() {
            VariantKind::Deletion
        } else {
            VariantKind::Substitution
        }
    }

    /// The compact notation, e.g., `sub(A->T)`, `ins(AC)` or `del(3)`.
    pub fn notation(&self) -> String {
        match self.kind() {
            VariantKind::Insertion => format!("ins({})", &self.alternate),
            VariantKind::Deletion => format!("del({})", self.reference.len()),
            VariantKind::Substitution => {
                format!("sub({}->{})", &self.reference, &self.alternate)
            }
        }
    }

    /// Construct from a location `chrom:pos` and a compact notation.
    ///
    /// The reference of deletions is taken from `genome`.
    pub fn from_notation(
        genome: &dyn ReferenceGenome,
        location: &str,
        notation: &str,
    ) -> Result<Self, anyhow::Error> {
        let (chromosome, position) = parse_location(location)?;
        match parse_notation(notation)? {
            Notation::Substitution(reference, alternate) => {
                Self::new(chromosome, position, reference, alternate)
            }
            Notation::Insertion(alternate) => Self::new(chromosome, position, "", &alternate),
            Notation::Deletion(length) => {
                let end = position
                    .checked_add(length - 1)
                    .ok_or_else(|| {
                        anyhow::anyhow!("deletion {} at {} is too long", notation, location)
                    })?;
                let reference = genome.get_sequence(chromosome, position, end)?;
                if reference.len() as i32 != length {
                    anyhow::bail!(
                        "deletion {} at {} extends beyond the contig",
                        notation,
                        location
                    );
                }
                Self::new(chromosome, position, &reference, "")
            }
        }
    }

    /// Construct from VCF-style alleles, trimming the shared prefix and then the shared suffix.
    pub fn from_vcf(
        chromosome: &str,
        position: i32,
        reference: &str,
        alternate: &str,
    ) -> Result<Self, anyhow::Error> {
        if !reference.chars().chain(alternate.chars()).all(is_nucleotide) {
            anyhow::bail!(
                "invalid alleles {:?}/{:?} at {}:{}",
                reference,
                alternate,
                chromosome,
                position
            );
        }
        let reference = reference.to_ascii_uppercase();
        let alternate = alternate.to_ascii_uppercase();

        let prefix = reference
            .bytes()
            .zip(alternate.bytes())
            .take_while(|(r, a)| r == a)
            .count();
        let (reference, alternate) = (&reference[prefix..], &alternate[prefix..]);

        let suffix = reference
            .bytes()
            .rev()
            .zip(alternate.bytes().rev())
            .take_while(|(r, a)| r == a)
            .count();
        let reference = &reference[..reference.len() - suffix];
        let alternate = &alternate[..alternate.len() - suffix];

        Self::new(chromosome, position + prefix as i32, reference, alternate)
    }
}

/// Parsed compact notation.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Notation<'a> {
    Substitution(&'a str, &'a str),
    Insertion(String),
    Deletion(i32),
}

fn substitution(input: &str) -> IResult<&str, Notation<'_>> {
    map(
        (tag_no_case("sub("), alpha1, tag("->"), alpha1, char(')')),
        |(_, reference, _, alternate, _)| Notation::Substitution(reference, alternate),
    )
    .parse(input)
}

/// Digits in the inserted sequence are dropped (`ins(3ACG)` inserts `ACG`).
fn insertion(input: &str) -> IResult<&str, Notation<'_>> {
    map(
        (
            tag_no_case("ins("),
            take_while1(|c: char| c.is_ascii_alphanumeric()),
            char(')'),
        ),
        |(_, seq, _): (&str, &str, char)| {
            Notation::Insertion(seq.chars().filter(|c| !c.is_ascii_digit()).collect())
        },
    )
    .parse(input)
}

fn deletion(input: &str) -> IResult<&str, Notation<'_>> {
    map(
        (
            tag_no_case("del("),
            map_res(digit1, |s: &str| s.parse::<i32>()),
            char(')'),
        ),
        |(_, length, _)| Notation::Deletion(length),
    )
    .parse(input)
}

fn parse_notation(notation: &str) -> Result<Notation<'_>, anyhow::Error> {
    let (_, result) = all_consuming(alt((substitution, insertion, deletion)))
        .parse(notation.trim())
        .map_err(|e| anyhow::anyhow!("invalid variant notation {:?}: {}", notation, e))?;
    match &result {
        Notation::Insertion(seq) if seq.is_empty() => {
            anyhow::bail!("insertion without sequence: {:?}", notation)
        }
        Notation::Deletion(length) if *length < 1 => {
            anyhow::bail!("deletion of length zero: {:?}", notation)
        }
        _ => {}
    }
    Ok(result)
}

fn location(input: &str) -> IResult<&str, (&str, i32)> {
    map(
        (
            take_till1(|c: char| c == ':'),
            char(':'),
            map_res(digit1, |s: &str| s.parse::<i32>()),
        ),
        |(chrom, _, pos)| (chrom, pos),
    )
    .parse(input)
}

/// Parse `chrom:pos`.
pub fn parse_location(value: &str) -> Result<(&str, i32), anyhow::Error> {
    let (_, result) = all_consuming(location)
        .parse(value.trim())
        .map_err(|e| anyhow::anyhow!("invalid location {:?}: {}", value, e))?;
    Ok(result)
}
