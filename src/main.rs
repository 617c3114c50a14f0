#[tokio::main]
async fn main() {
    bayroumeter::start_server().await;
}
