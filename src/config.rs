/// Hyper-parameters of a training run
#[derive(Clone, Debug, PartialEq)]
pub struct TrainingConfig {
    pub num_epochs: usize,
    pub learning_rate: f64,
    pub hidden_size: usize,
    /// Apply ZCA whitening to both splits before training
    pub whiten: bool,
    /// Fixed seed for weight initialization and shuffling
    /// If this is None the run draws its seed from entropy
    pub seed: Option<u64>,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        TrainingConfig {
            num_epochs: 5,
            learning_rate: 0.1,
            hidden_size: 100,
            whiten: true,
            seed: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_reference_run() {
        let config = TrainingConfig::default();

        assert_eq!(config.num_epochs, 5);
        assert_eq!(config.learning_rate, 0.1);
        assert!(config.whiten);
        assert!(config.seed.is_none());
    }
}
