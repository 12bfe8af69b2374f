#[tokio::main]
async fn main() {
    carpool_backend::run().await;
}
