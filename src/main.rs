use manga_library::{
    run,
    telemetry::{get_subscriber, init_subscriber},
};

#[tokio::main]
async fn main() {
    let subscriber = get_subscriber("manga-library".into(), "info".into(), std::io::stdout);
    init_subscriber(subscriber);

    run().await.expect("Failed running server.");
}
