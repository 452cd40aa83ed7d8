use crate::config::TrainingConfig;
use crate::error::{Error, Result};
use crate::model::neural_net::TwoLayerNet;
use crate::model::Model;
use crate::parsing::{Dataset, NUM_CLASSES};
use crate::preprocess::whiten;
use ndarray::{Array2, ArrayView2, Axis};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

/// Average training cost of one epoch
#[derive(Serialize, Debug, Clone, Copy, PartialEq)]
pub struct EpochCost {
    pub epoch: usize,
    pub cost: f64,
}

/// Outcome of a full train-then-evaluate run
#[derive(Debug, Clone)]
pub struct RunReport {
    pub epoch_costs: Vec<EpochCost>,
    pub accuracy: f64,
}

/// Train a model one example at a time for `num_epochs` epochs
/// After every epoch the rows of `data` and `target` are shuffled with the same permutation
/// Returns the average cost of each epoch
pub fn fit<M: Model, R: Rng + ?Sized>(
    model: &mut M,
    data: &mut Array2<f64>,
    target: &mut Array2<f64>,
    num_epochs: usize,
    learning_rate: f64,
    rng: &mut R,
) -> Result<Vec<EpochCost>> {
    if data.nrows() != target.nrows() {
        return Err(Error::Shape(format!(
            "{} samples but {} targets",
            data.nrows(),
            target.nrows()
        )));
    }

    let mut costs = vec![];

    for epoch in 0..num_epochs {
        let mut total = 0f64;

        for (x, y) in data.axis_iter(Axis(0)).zip(target.axis_iter(Axis(0))) {
            total += model.train_step(&x, &y, learning_rate)?;
        }

        let cost = match data.nrows() {
            0 => 0f64,
            n => total / n as f64,
        };
        tracing::info!(epoch, cost, "finished epoch");
        costs.push(EpochCost { epoch, cost });

        shuffle_rows(data, target, rng);
    }

    Ok(costs)
}

/// Fraction of samples whose predicted class equals the label
/// An empty set has an accuracy of 0
pub fn evaluate<M: Model>(model: &M, data: &ArrayView2<f64>, labels: &[u8]) -> Result<f64> {
    if data.nrows() != labels.len() {
        return Err(Error::Shape(format!(
            "{} samples but {} labels",
            data.nrows(),
            labels.len()
        )));
    }

    let mut correct = 0usize;

    for (x, &label) in data.axis_iter(Axis(0)).zip(labels) {
        if model.predict(&x)? == label as usize {
            correct += 1;
        }
    }

    match labels.len() {
        0 => Ok(0f64),
        total => Ok(correct as f64 / total as f64),
    }
}

/// Fisher-Yates shuffle applied to the rows of both matrices in unison
pub fn shuffle_rows<R: Rng + ?Sized>(data: &mut Array2<f64>, target: &mut Array2<f64>, rng: &mut R) {
    for i in (1..data.nrows()).rev() {
        let j = rng.gen_range(0..=i);
        if i != j {
            swap_rows(data, i, j);
            swap_rows(target, i, j);
        }
    }
}

fn swap_rows(m: &mut Array2<f64>, i: usize, j: usize) {
    for k in 0..m.ncols() {
        m.swap([i, k], [j, k]);
    }
}

/// Normalize, optionally whiten, train on `train` and report the accuracy on `test`
/// Each split is whitened with its own operator
pub fn run(config: &TrainingConfig, train: &Dataset, test: &Dataset) -> Result<RunReport> {
    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let mut data = prepare(train, config.whiten)?;
    let mut target = train.one_hot()?;
    let test_data = prepare(test, config.whiten)?;

    let mut net = TwoLayerNet::with_rng(data.ncols(), config.hidden_size, NUM_CLASSES, &mut rng)?;
    tracing::info!(
        input = net.input_size(),
        hidden = net.hidden_size(),
        output = net.output_size(),
        samples = data.nrows(),
        "start training"
    );

    let epoch_costs = fit(
        &mut net,
        &mut data,
        &mut target,
        config.num_epochs,
        config.learning_rate,
        &mut rng,
    )?;
    tracing::info!("end training");

    let accuracy = evaluate(&net, &test_data.view(), &test.labels)?;
    tracing::info!(accuracy, samples = test.len(), "evaluated");

    Ok(RunReport { epoch_costs, accuracy })
}

fn prepare(dataset: &Dataset, apply_whitening: bool) -> Result<Array2<f64>> {
    let data = dataset.design_matrix();

    match apply_whitening {
        true => whiten(&data.view()),
        false => Ok(data),
    }
}
