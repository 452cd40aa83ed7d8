use crate::error::{Error, Result};
use ndarray::{Array, Array1, Array2, ArrayView1, Axis};
use rand::distributions::{Distribution, Uniform};
use rand::Rng;

use super::Model;

/// Fully connected network with one sigmoid hidden layer and a sigmoid output layer
/// There are no bias terms
#[derive(Debug, Clone)]
pub struct TwoLayerNet {
    hidden: Array2<f64>, // (hidden_size x input_size)
    output: Array2<f64>, // (output_size x hidden_size)
}

impl TwoLayerNet {
    /// Construct a network with weights drawn from the thread RNG
    pub fn new(input_size: usize, hidden_size: usize, output_size: usize) -> Result<TwoLayerNet> {
        Self::with_rng(input_size, hidden_size, output_size, &mut rand::thread_rng())
    }

    /// Construct a network whose weights are drawn uniformly from [-1/sqrt(fan_in), 1/sqrt(fan_in)]
    pub fn with_rng<R: Rng + ?Sized>(
        input_size: usize,
        hidden_size: usize,
        output_size: usize,
        rng: &mut R,
    ) -> Result<TwoLayerNet> {
        check_sizes(input_size, hidden_size, output_size)?;

        Ok(TwoLayerNet {
            hidden: init_weights(hidden_size, input_size, rng),
            output: init_weights(output_size, hidden_size, rng),
        })
    }

    /// Network with every weight set to zero
    pub fn zeros(input_size: usize, hidden_size: usize, output_size: usize) -> Result<TwoLayerNet> {
        check_sizes(input_size, hidden_size, output_size)?;

        Ok(TwoLayerNet {
            hidden: Array::zeros((hidden_size, input_size)),
            output: Array::zeros((output_size, hidden_size)),
        })
    }

    /// Build a network from explicit weight matrices
    pub fn from_weights(hidden: Array2<f64>, output: Array2<f64>) -> Result<TwoLayerNet> {
        if output.ncols() != hidden.nrows() {
            return Err(Error::Shape(format!(
                "output weights take {} inputs but the hidden layer has {} units",
                output.ncols(),
                hidden.nrows()
            )));
        }
        check_sizes(hidden.ncols(), hidden.nrows(), output.nrows())?;

        Ok(TwoLayerNet { hidden, output })
    }

    pub fn input_size(&self) -> usize {
        self.hidden.ncols()
    }

    pub fn hidden_size(&self) -> usize {
        self.hidden.nrows()
    }

    pub fn output_size(&self) -> usize {
        self.output.nrows()
    }

    pub fn hidden_weights(&self) -> &Array2<f64> {
        &self.hidden
    }

    pub fn output_weights(&self) -> &Array2<f64> {
        &self.output
    }

    /// Forward pass on one example
    /// Returns the hidden activations and the output activations
    pub fn forward(&self, x: &ArrayView1<f64>) -> Result<(Array1<f64>, Array1<f64>)> {
        if x.len() != self.input_size() {
            return Err(Error::Shape(format!(
                "expected an input of length {}, got {}",
                self.input_size(),
                x.len()
            )));
        }

        let act0 = self.hidden.dot(x).mapv(sigmoid);
        let act1 = self.output.dot(&act0).mapv(sigmoid);

        Ok((act0, act1))
    }
}

impl Model for TwoLayerNet {
    fn train_step(&mut self, x: &ArrayView1<f64>, y: &ArrayView1<f64>, learning_rate: f64) -> Result<f64> {
        if y.len() != self.output_size() {
            return Err(Error::Shape(format!(
                "expected a target of length {}, got {}",
                self.output_size(),
                y.len()
            )));
        }
        let (act0, act1) = self.forward(x)?;

        let output_errors = y - &act1;
        let cost = output_errors.sum();
        // Propagated through the weights as they were before this step
        let hidden_errors = self.output.t().dot(&output_errors);

        let output_delta = output_errors * act1.mapv(delta_sigmoid);
        let hidden_delta = hidden_errors * act0.mapv(delta_sigmoid);

        let output_grad = outer(&output_delta.view(), &act0.view());
        let hidden_grad = outer(&hidden_delta.view(), x);

        // The step follows the error y - a1, so the gradients are added
        self.output.scaled_add(learning_rate, &output_grad);
        self.hidden.scaled_add(learning_rate, &hidden_grad);

        Ok(cost)
    }

    fn predict(&self, x: &ArrayView1<f64>) -> Result<usize> {
        let (_, act1) = self.forward(x)?;

        Ok(argmax(&act1.view()))
    }
}

/// Index of the largest entry. Ties go to the lowest index
pub fn argmax(values: &ArrayView1<f64>) -> usize {
    let mut best = 0;
    let mut max = f64::NEG_INFINITY;

    for (idx, &x) in values.iter().enumerate() {
        if x > max {
            best = idx;
            max = x;
        }
    }

    best
}

fn sigmoid(z: f64) -> f64 {
    (1f64 + (-z).exp()).recip()
}

/// Derivative of the sigmoid written in terms of its output
fn delta_sigmoid(a: f64) -> f64 {
    a * (1f64 - a)
}

/// Column vector times row vector
fn outer(col: &ArrayView1<f64>, row: &ArrayView1<f64>) -> Array2<f64> {
    col.view()
        .insert_axis(Axis(1))
        .dot(&row.view().insert_axis(Axis(0)))
}

fn check_sizes(input_size: usize, hidden_size: usize, output_size: usize) -> Result<()> {
    if input_size == 0 || hidden_size == 0 || output_size == 0 {
        return Err(Error::Shape(format!(
            "layer sizes must be positive, got {}-{}-{}",
            input_size, hidden_size, output_size
        )));
    }

    Ok(())
}

fn init_weights<R: Rng + ?Sized>(rows: usize, fan_in: usize, rng: &mut R) -> Array2<f64> {
    let bound = (fan_in as f64).sqrt().recip();
    let distribution = Uniform::new_inclusive(-bound, bound);

    Array::from_shape_simple_fn((rows, fan_in), || distribution.sample(rng))
}
