//! Contig name harmonization.
//!
//! Gene model files and reference FASTA files frequently disagree on whether contigs carry a
//! `chr` prefix and on the spelling of the mitochondrial contig.  The helpers here produce the
//! list of names to try, in order of preference.

/// Names used for the mitochondrial contig.
const MITOCHONDRIAL_NAMES: &[&str] = &["M", "MT", "chrM", "chrMT"];

/// Returns whether the contig name denotes the mitochondrial genome.
pub fn is_mitochondrial(name: &str) -> bool {
    MITOCHONDRIAL_NAMES.iter().any(|m| *m == name)
}

/// Strip a leading `chr` prefix, if any.
pub fn name_without_chr(name: &str) -> &str {
    name.strip_prefix("chr").unwrap_or(name)
}

/// Return the contig name followed by its known aliases.
///
/// The first element is always `name` itself.
pub fn aliases(name: &str) -> Vec<String> {
    let mut result = vec![name.to_string()];
    let mut push = |alias: String| {
        if !result.contains(&alias) {
            result.push(alias);
        }
    };

    if is_mitochondrial(name) {
        MITOCHONDRIAL_NAMES
            .iter()
            .for_each(|alias| push(alias.to_string()));
    } else if let Some(stripped) = name.strip_prefix("chr") {
        push(stripped.to_string());
    } else {
        push(format!("chr{}", name));
    }

    result
}
