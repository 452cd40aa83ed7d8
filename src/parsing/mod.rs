use crate::error::{Error, Result};
use ndarray::{Array, Array2};

pub mod mnist;

/// Number of digit classes
pub const NUM_CLASSES: usize = 10;

const GREYSCALE_SIZE: f64 = 255f64;
const MIN_WEIGHT: f64 = 0.001;
const MAX_WEIGHT: f64 = 0.999;

/// A set of greyscale images that share the same dimensions
/// Each image is a (rows x cols) matrix of raw intensities
#[derive(Debug, Clone)]
pub struct ImageSet {
    pub images: Vec<Array2<u8>>,
    pub rows: usize,
    pub cols: usize,
}

impl ImageSet {
    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    /// Number of pixels in every image
    pub fn num_features(&self) -> usize {
        self.rows * self.cols
    }
}

/// Images paired with their digit labels, in file order
#[derive(Debug, Clone)]
pub struct Dataset {
    pub images: ImageSet,
    pub labels: Vec<u8>,
}

impl Dataset {
    /// Pair an image set with its labels. Both must hold the same number of samples
    pub fn new(images: ImageSet, labels: Vec<u8>) -> Result<Dataset> {
        if images.len() != labels.len() {
            return Err(Error::Format(format!(
                "image file holds {} samples but label file holds {}",
                images.len(),
                labels.len()
            )));
        }

        Ok(Dataset { images, labels })
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Matrix with one normalized sample per row
    pub fn design_matrix(&self) -> Array2<f64> {
        design_matrix(&self.images)
    }

    /// One-hot matrix of the labels over the ten digit classes
    pub fn one_hot(&self) -> Result<Array2<f64>> {
        one_hot(&self.labels, NUM_CLASSES)
    }
}

/// Map a raw intensity into [0.001, 0.999]
/// 255 would land exactly on 1.0, so it is clamped to 0.999
pub fn weight_from_byte(px: u8) -> f64 {
    let weight = px as f64 / GREYSCALE_SIZE * MAX_WEIGHT + MIN_WEIGHT;

    if weight >= 1f64 {
        MAX_WEIGHT
    } else {
        weight
    }
}

/// Inverse of weight_from_byte, up to one unit of byte precision
pub fn byte_from_weight(weight: f64) -> u8 {
    // `as` saturates at the bounds of u8
    ((weight - MIN_WEIGHT) / MAX_WEIGHT * GREYSCALE_SIZE) as u8
}

/// Flatten every image row-major and normalize it into one row of the result
pub fn design_matrix(images: &ImageSet) -> Array2<f64> {
    let mut data = Array::zeros((images.len(), images.num_features()));

    for (mut row, image) in data.rows_mut().into_iter().zip(&images.images) {
        for (dst, px) in row.iter_mut().zip(image.iter()) {
            *dst = weight_from_byte(*px);
        }
    }

    data
}

/// One row per label: 0.999 at the label's column and 0.001 everywhere else
pub fn one_hot(labels: &[u8], num_classes: usize) -> Result<Array2<f64>> {
    let mut target = Array::from_elem((labels.len(), num_classes), MIN_WEIGHT);

    for (idx, &label) in labels.iter().enumerate() {
        let label = label as usize;
        if label >= num_classes {
            return Err(Error::Shape(format!(
                "label {} at position {} does not fit {} classes",
                label, idx, num_classes
            )));
        }
        target[[idx, label]] = MAX_WEIGHT;
    }

    Ok(target)
}
