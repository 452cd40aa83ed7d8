use super::{Dataset, ImageSet, NUM_CLASSES};
use crate::error::{Error, Result};
use ndarray::Array2;
use std::fs::File;
use std::io::{BufReader, ErrorKind, Read};
use std::path::Path;

pub const IMAGE_MAGIC: u32 = 0x0000_0803;
pub const LABEL_MAGIC: u32 = 0x0000_0801;

/// Read exactly buf.len() bytes. Running out of input is a format error
fn read_exact<R: Read>(reader: &mut R, buf: &mut [u8], what: &str) -> Result<()> {
    reader.read_exact(buf).map_err(|err| match err.kind() {
        ErrorKind::UnexpectedEof => Error::Format(format!("file ended while reading {}", what)),
        _ => Error::Io(err),
    })
}

fn read_u32<R: Read>(reader: &mut R, what: &str) -> Result<u32> {
    let mut buf = [0u8; 4];
    read_exact(reader, &mut buf, what)?;

    Ok(u32::from_be_bytes(buf))
}

fn check_magic<R: Read>(reader: &mut R, expected: u32) -> Result<()> {
    let magic = read_u32(reader, "the magic number")?;

    match magic == expected {
        true => Ok(()),
        false => Err(Error::Format(format!(
            "invalid magic number {:#010x}, expected {:#010x}",
            magic, expected
        ))),
    }
}

/// Parse an IDX image stream
/// Header: magic, count, rows, cols (big-endian u32), then count * rows * cols pixels
pub fn read_images<R: Read>(mut reader: R) -> Result<ImageSet> {
    check_magic(&mut reader, IMAGE_MAGIC)?;
    let count = read_u32(&mut reader, "the image count")? as usize;
    let rows = read_u32(&mut reader, "the row count")? as usize;
    let cols = read_u32(&mut reader, "the column count")? as usize;
    tracing::debug!(count, rows, cols, "read image header");

    if rows == 0 || cols == 0 {
        return Err(Error::Format(format!("image size {}x{} has no pixels", rows, cols)));
    }
    let size = rows
        .checked_mul(cols)
        .ok_or_else(|| Error::Format(format!("image size {}x{} overflows", rows, cols)))?;
    let mut images = Vec::new();

    for idx in 0..count {
        // Only as large as the bytes the stream actually holds
        let mut pixels = Vec::new();
        reader.by_ref().take(size as u64).read_to_end(&mut pixels)?;
        if pixels.len() != size {
            return Err(Error::Format(format!(
                "file ended while reading image {} ({} of {} bytes)",
                idx,
                pixels.len(),
                size
            )));
        }
        images.push(Array2::from_shape_vec((rows, cols), pixels)?);
    }

    Ok(ImageSet { images, rows, cols })
}

/// Parse an IDX label stream
/// Header: magic, count (big-endian u32), then one byte per label
pub fn read_labels<R: Read>(mut reader: R) -> Result<Vec<u8>> {
    check_magic(&mut reader, LABEL_MAGIC)?;
    let count = read_u32(&mut reader, "the label count")? as usize;
    tracing::debug!(count, "read label header");

    let mut labels = Vec::new();
    let mut buf = [0u8; 1];

    for idx in 0..count {
        read_exact(&mut reader, &mut buf, &format!("label {}", idx))?;
        if buf[0] as usize >= NUM_CLASSES {
            return Err(Error::Format(format!(
                "label {} at position {} is not a digit",
                buf[0], idx
            )));
        }
        labels.push(buf[0]);
    }

    Ok(labels)
}

pub fn load_images<P: AsRef<Path>>(path: P) -> Result<ImageSet> {
    let file = File::open(path)?;

    read_images(BufReader::new(file))
}

pub fn load_labels<P: AsRef<Path>>(path: P) -> Result<Vec<u8>> {
    let file = File::open(path)?;

    read_labels(BufReader::new(file))
}

/// Load an image file and its label file as one dataset
pub fn load_dataset<P: AsRef<Path>, Q: AsRef<Path>>(images_path: P, labels_path: Q) -> Result<Dataset> {
    let images = load_images(images_path)?;
    let labels = load_labels(labels_path)?;
    tracing::info!(samples = images.len(), rows = images.rows, cols = images.cols, "loaded dataset");

    Dataset::new(images, labels)
}
