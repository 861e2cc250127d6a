//! Command-line client for the digit inference server.
//!
//! Sends one image file to `MLService.Predict` and prints the predicted digit.
//!
//! # Usage
//!
//! ```bash
//! digit-client [--endpoint URL] [--top K] <IMAGE>
//! ```

use clap::Parser;
use digit_serve::domain::{Prediction, ScoreVector};
use digit_serve::service::proto::PredictRequest;
use digit_serve::service::proto::ml_service_client::MlServiceClient;
use digit_serve::utils::{init_tracing, read_image_bytes};
use std::path::PathBuf;
use tracing::error;

/// Command-line arguments for the client
#[derive(Parser)]
#[command(name = "digit-client")]
#[command(about = "Classify a handwritten digit image with a running digit-serve")]
struct Args {
    /// Server endpoint
    #[arg(short, long, default_value = "http://localhost:50051")]
    endpoint: String,

    /// Also print the K best candidates with their scores
    #[arg(short, long)]
    top: Option<usize>,

    /// Image file to classify
    image: PathBuf,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let args = Args::parse();
    let image = read_image_bytes(&args.image)?;

    let mut client = MlServiceClient::connect(args.endpoint.clone()).await?;
    let response = match client.predict(PredictRequest { image }).await {
        Ok(response) => response.into_inner(),
        Err(status) => {
            error!(code = ?status.code(), "{}", status.message());
            return Err(status.into());
        }
    };

    println!("Predicted digit: {}", response.digit);

    if let Some(k) = args.top {
        let prediction = Prediction::from_scores(ScoreVector::new(response.scores)?);
        for (rank, (label, score)) in prediction.top_k(k).into_iter().enumerate() {
            println!("  {}. {} ({:.4})", rank + 1, label, score);
        }
    }

    Ok(())
}
