use leasehold_api::run;

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("leasehold error: {err}");
        std::process::exit(1);
    }
}
