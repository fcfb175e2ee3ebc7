#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = gradebook::run().await {
        eprintln!("gradebook fatal: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}
