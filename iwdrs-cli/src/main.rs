#[tokio::main]
async fn main() -> anyhow::Result<()> {
    iwdrs_cli::run().await
}
