use std::sync::Arc;

use log::error;

use ws_load::config::Config;
use ws_load::worker;

#[tokio::main]
async fn main() {
    let env = env_logger::Env::default().filter_or(env_logger::DEFAULT_FILTER_ENV, "info");
    env_logger::init_from_env(env);

    let config = Config::from_args();

    println!(
        "Connecting to {} with {} concurrent connections",
        config.url, config.connections
    );

    let config = Arc::new(config);

    let mut handles = Vec::with_capacity(config.connections);
    for id in 0..config.connections {
        handles.push(tokio::spawn(worker::run(id, Arc::clone(&config))));
    }

    for handle in handles {
        if let Err(e) = handle.await {
            error!("Worker task panicked: {}", e);
        }
    }

    println!("All connections completed");
}
