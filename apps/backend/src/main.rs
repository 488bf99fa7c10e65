#[tokio::main]
async fn main() -> anyhow::Result<()> {
    clevercards_backend::run().await
}
