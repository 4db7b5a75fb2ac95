#[tokio::main]
async fn main() {
    if let Err(e) = hearmeout_lib::run().await {
        eprintln!("hearmeout: {e}");
        std::process::exit(1);
    }
}
