#[tokio::main]
async fn main() -> anyhow::Result<()> {
    oi_analyzer::run().await?;
    Ok(())
}
