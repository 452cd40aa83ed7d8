use crate::error::Result;
use ndarray::ArrayView1;

pub mod neural_net;

pub trait Model {
    /// Perform one forward and backward pass on a single example and update the weights
    /// Returns the signed sum of the output errors
    fn train_step(&mut self, x: &ArrayView1<f64>, y: &ArrayView1<f64>, learning_rate: f64) -> Result<f64>;
    /// Predict the class index of a single example
    fn predict(&self, x: &ArrayView1<f64>) -> Result<usize>;
}
