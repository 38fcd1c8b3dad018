#[tokio::main]
async fn main() -> std::io::Result<()> {
    raid_server::run_with_config().await
}
