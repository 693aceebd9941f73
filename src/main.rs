use anyhow::Result;

/// Main entry point
#[tokio::main]
async fn main() -> Result<()> {
    projsel::cli::run().await
}
