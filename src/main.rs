use anyhow::Result;
use valet::cli;

#[tokio::main]
async fn main() -> Result<()> {
    cli::run().await
}
