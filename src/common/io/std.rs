//! Common I/O code using sync I/O.

use std::{
    fs::File,
    io::{BufRead, BufReader, BufWriter, Write},
    path::Path,
};

use flate2::{bufread::MultiGzDecoder, write::GzEncoder, Compression};

/// Returns whether the path looks like a gzip or bgzip file.
pub fn is_gz<P>(path: P) -> bool
where
    P: AsRef<Path>,
{
    [Some(Some("gz")), Some(Some("bgz"))].contains(&path.as_ref().extension().map(|s| s.to_str()))
}

/// Transparently open a file with gzip decoder for reading.
///
/// Note that decoding of multi-member gzip files is automatically supported, as is needed for
/// `bgzip` files.
///
/// # Arguments
///
/// * `path` - A path to the file to open.
pub fn open_read_maybe_gz<P>(path: P) -> Result<Box<dyn BufRead>, anyhow::Error>
where
    P: AsRef<Path>,
{
    let file = File::open(path.as_ref()).map_err(|e| {
        anyhow::anyhow!("could not open file {}: {}", path.as_ref().display(), e)
    })?;
    if is_gz(path.as_ref()) {
        tracing::trace!("Opening {:?} as gzip for reading", path.as_ref());
        let decoder = MultiGzDecoder::new(BufReader::new(file));
        Ok(Box::new(BufReader::new(decoder)))
    } else {
        tracing::trace!("Opening {:?} as plain text for reading", path.as_ref());
        Ok(Box::new(BufReader::new(file)))
    }
}

/// Transparently open a file with gzip encoder for writing.
///
/// # Arguments
///
/// * `path` - A path to the file to open.
pub fn open_write_maybe_gz<P>(path: P) -> Result<Box<dyn Write>, anyhow::Error>
where
    P: AsRef<Path>,
{
    let file = File::create(path.as_ref()).map_err(|e| {
        anyhow::anyhow!("could not create file {}: {}", path.as_ref().display(), e)
    })?;
    if is_gz(path.as_ref()) {
        tracing::trace!("Opening {:?} as gzip for writing", path.as_ref());
        let encoder = GzEncoder::new(BufWriter::new(file), Compression::default());
        Ok(Box::new(encoder))
    } else {
        tracing::trace!("Opening {:?} as plain text for writing", path.as_ref());
        Ok(Box::new(BufWriter::new(file)))
    }
}
