// End-to-end training on a synthetic problem small enough to run in a test.

use ndarray::{Array2, Axis};
use rand::distributions::{Distribution, Uniform};
use rand::rngs::StdRng;
use rand::SeedableRng;
use zca_digits::model::neural_net::{argmax, TwoLayerNet};
use zca_digits::parsing::one_hot;
use zca_digits::preprocess::whiten;
use zca_digits::training::{evaluate, fit};

const CENTERS: [(f64, f64); 4] = [(2.0, 2.0), (-2.0, 2.0), (-2.0, -2.0), (2.0, -2.0)];

// 50 points per quadrant, each at least 1.2 away from both axes
fn quadrants(rng: &mut StdRng) -> (Array2<f64>, Vec<u8>) {
    let spread = Uniform::new(-0.8, 0.8);
    let mut data = Array2::zeros((200, 2));
    let mut labels = Vec::with_capacity(200);

    for (i, mut row) in data.axis_iter_mut(Axis(0)).enumerate() {
        let class = i % CENTERS.len();
        let (cx, cy) = CENTERS[class];
        row[0] = cx + spread.sample(rng);
        row[1] = cy + spread.sample(rng);
        labels.push(class as u8);
    }

    (data, labels)
}

#[test]
fn learns_linearly_separable_quadrants() {
    let mut rng = StdRng::seed_from_u64(2024);
    let (data, labels) = quadrants(&mut rng);
    let mut net = TwoLayerNet::with_rng(2, 20, 4, &mut rng).unwrap();

    let mut shuffled = data.clone();
    let mut target = one_hot(&labels, 4).unwrap();
    let costs = fit(&mut net, &mut shuffled, &mut target, 50, 0.3, &mut rng).unwrap();
    assert_eq!(costs.len(), 50);

    let accuracy = evaluate(&net, &data.view(), &labels).unwrap();
    assert!(accuracy >= 0.95, "training accuracy {}", accuracy);
}

#[test]
fn fit_keeps_targets_attached_to_samples() {
    let mut rng = StdRng::seed_from_u64(8);
    let (mut data, labels) = quadrants(&mut rng);
    let mut target = one_hot(&labels, 4).unwrap();
    let mut net = TwoLayerNet::with_rng(2, 4, 4, &mut rng).unwrap();

    fit(&mut net, &mut data, &mut target, 3, 0.1, &mut rng).unwrap();

    for (row, t) in data.axis_iter(Axis(0)).zip(target.axis_iter(Axis(0))) {
        let quadrant = match (row[0] > 0.0, row[1] > 0.0) {
            (true, true) => 0,
            (false, true) => 1,
            (false, false) => 2,
            (true, false) => 3,
        };
        assert_eq!(argmax(&t), quadrant);
    }
}

#[test]
fn whitened_input_trains_without_errors() {
    let mut rng = StdRng::seed_from_u64(31);
    let (data, labels) = quadrants(&mut rng);
    let mut white = whiten(&data.view()).unwrap();
    let mut target = one_hot(&labels, 4).unwrap();
    let mut net = TwoLayerNet::with_rng(2, 8, 4, &mut rng).unwrap();

    let costs = fit(&mut net, &mut white, &mut target, 2, 0.3, &mut rng).unwrap();

    assert!(costs.iter().all(|c| c.cost.is_finite()));
}
