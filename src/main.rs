// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Registry Submission Tool
//!
//! Submits a document to the registry through the rate gate, optionally
//! several times concurrently to watch the gate hold callers back.
//!
//! ## Configuration
//!
//! Configuration is loaded from environment variables (a `.env` file is
//! read first when present):
//!
//! - `TIME_UNIT`: Window length unit (default: minutes)
//! - `REQUEST_LIMIT`: Requests per window (default: 10)
//! - `WINDOW_SECS`: Explicit window length in seconds
//! - `REGISTRY_ENDPOINT`: Document creation URL
//! - `REGISTRY_TIMEOUT_MS`: Request timeout (default: 30000)

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::{error, info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use registry_rate_gate::{
    Config, Description, Document, DocumentSubmitter, HttpTransport, Product, RateGate,
};

#[derive(Debug, Parser)]
#[command(name = "registry-submit", version, about = "Submit documents to the registry")]
struct Args {
    /// JSON document to submit (a built-in sample is used when omitted)
    #[arg(long)]
    document: Option<PathBuf>,

    /// Value for the Signature header
    #[arg(long, default_value = "signature")]
    signature: String,

    /// Number of concurrent submissions
    #[arg(long, default_value_t = 1)]
    count: usize,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer().json())
        .with(
            EnvFilter::builder()
                .with_default_directive(Level::INFO.into())
                .from_env_lossy(),
        )
        .init();

    dotenvy::dotenv().ok();
    let args = Args::parse();

    let config = Config::from_env()?;
    info!(
        endpoint = %config.registry.endpoint,
        request_limit = config.rate_limit.request_limit,
        window = ?config.rate_limit.window_duration(),
        "Starting registry submission"
    );

    let document: Document = match &args.document {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            serde_json::from_str(&raw).with_context(|| format!("parsing {}", path.display()))?
        }
        None => sample_document(),
    };
    let document = Arc::new(document);

    let gate = Arc::new(RateGate::from_config(&config.rate_limit)?);
    let transport = HttpTransport::new(&config.registry)?;
    let submitter = Arc::new(DocumentSubmitter::new(Arc::clone(&gate), transport));

    let mut tasks = JoinSet::new();
    for worker in 0..args.count {
        let submitter = Arc::clone(&submitter);
        let document = Arc::clone(&document);
        let signature = args.signature.clone();
        tasks.spawn(async move {
            let result = submitter.submit(document.as_ref(), &signature).await;
            (worker, result)
        });
    }

    let mut failures = 0usize;
    while let Some(joined) = tasks.join_next().await {
        let (worker, result) = joined?;
        match result {
            Ok(response) => info!(worker, status = response.status, "Document created"),
            Err(err) => {
                failures += 1;
                error!(worker, error = %err, status = ?err.status(), "Submission failed");
            }
        }
    }

    gate.shutdown().await;

    if failures > 0 {
        anyhow::bail!("{failures} of {} submissions failed", args.count);
    }
    Ok(())
}

fn sample_document() -> Document {
    let inn = "7701234567".to_string();
    Document {
        doc_id: "12345".to_string(),
        doc_status: "NEW".to_string(),
        doc_type: "LP_INTRODUCE_GOODS".to_string(),
        import_request: true,
        owner_inn: inn.clone(),
        participant_inn: inn.clone(),
        producer_inn: inn.clone(),
        production_date: "2023-01-01".to_string(),
        production_type: "TYPE".to_string(),
        reg_date: "2023-01-01".to_string(),
        reg_number: "12345".to_string(),
        description: Description {
            participant_inn: inn.clone(),
        },
        products: vec![Product {
            certificate_document: "CERT_DOC".to_string(),
            certificate_document_date: "2023-01-01".to_string(),
            certificate_document_number: "12345".to_string(),
            owner_inn: inn.clone(),
            producer_inn: inn,
            production_date: "2023-01-01".to_string(),
            tnved_code: "CODE".to_string(),
            uit_code: "UIT".to_string(),
            uitu_code: "UITU".to_string(),
        }],
    }
}
