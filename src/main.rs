use clap::Parser;
use json::object;
use std::fs::File;
use std::io::Write;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;
use zca_digits::config::TrainingConfig;
use zca_digits::parsing::mnist;
use zca_digits::training::{self, EpochCost, RunReport};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// IDX file with the training images
    #[arg(long)]
    train_images: String,

    /// IDX file with the training labels
    #[arg(long)]
    train_labels: String,

    /// IDX file with the test images
    #[arg(long)]
    test_images: String,

    /// IDX file with the test labels
    #[arg(long)]
    test_labels: String,

    /// Number of hidden units
    #[arg(long, default_value_t = 100)]
    hidden_size: usize,

    /// Learning rate of the network
    #[arg(short, long, default_value_t = 0.1)]
    learning_rate: f64,

    /// Number of epochs to train the network for
    #[arg(short, long, default_value_t = 5)]
    num_epochs: usize,

    /// Skip ZCA whitening
    #[arg(long)]
    no_whiten: bool,

    /// Seed for weight initialization and shuffling
    #[arg(short, long, default_value = None)]
    seed: Option<u64>,

    /// Save the average cost of every epoch as CSV
    #[arg(long, default_value = None)]
    loss_path: Option<String>,

    /// Save the configuration, costs and accuracy as JSON
    #[arg(long, default_value = None)]
    report_path: Option<String>,
}

impl From<&Args> for TrainingConfig {
    fn from(args: &Args) -> Self {
        TrainingConfig {
            num_epochs: args.num_epochs,
            learning_rate: args.learning_rate,
            hidden_size: args.hidden_size,
            whiten: !args.no_whiten,
            seed: args.seed,
        }
    }
}

/// Write the epoch costs in a "epoch,cost" format
fn write_losses(loss_path: &str, costs: &[EpochCost]) -> csv::Result<()> {
    let mut writer = csv::Writer::from_path(loss_path)?;

    for cost in costs {
        writer.serialize(cost)?;
    }
    writer.flush()?;

    Ok(())
}

/// Write the configuration, epoch costs and accuracy as a JSON object
fn write_report(report_path: &str, config: &TrainingConfig, report: &RunReport) -> std::io::Result<()> {
    let mut file = File::create(report_path)?;
    let costs: Vec<f64> = report.epoch_costs.iter().map(|c| c.cost).collect();

    let mut data = object! {};

    data["num_epochs"] = config.num_epochs.into();
    data["learning_rate"] = config.learning_rate.into();
    data["hidden_size"] = config.hidden_size.into();
    data["whiten"] = config.whiten.into();
    data["epoch_costs"] = costs.into();
    data["accuracy"] = report.accuracy.into();
    if let Some(seed) = config.seed {
        data["seed"] = seed.into();
    }

    file.write_all(data.dump().as_bytes())?;

    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let config = TrainingConfig::from(&args);

    let result = mnist::load_dataset(&args.train_images, &args.train_labels).and_then(|train| {
        let test = mnist::load_dataset(&args.test_images, &args.test_labels)?;
        training::run(&config, &train, &test)
    });

    let report = match result {
        Ok(report) => report,
        Err(err) => {
            tracing::error!("{}", err);
            return ExitCode::FAILURE;
        }
    };

    if let Some(loss_path) = &args.loss_path {
        if let Err(err) = write_losses(loss_path, &report.epoch_costs) {
            tracing::warn!("could not write losses to {}: {}", loss_path, err);
        }
    }

    if let Some(report_path) = &args.report_path {
        if let Err(err) = write_report(report_path, &config, &report) {
            tracing::warn!("could not write report to {}: {}", report_path, err);
        }
    }

    println!("Accuracy: {:.3}", report.accuracy);

    ExitCode::SUCCESS
}
