use anyhow::Context;
use order_vault::config::AppConfig;
use order_vault::lifecycle::{setup_tracing, OrderSystem};
use order_vault::model::OrderLookup;
use order_vault::queue::QueueProducer;
use order_vault::{codec, manager::Command};
use std::time::Duration;
use tracing::{info, warn};

const SAMPLE_ORDER: &str = include_str!("../fixtures/order.json");

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    setup_tracing();

    let config = AppConfig::from_env();
    let system = OrderSystem::start(&config).await?;

    let document = codec::decode_document(SAMPLE_ORDER.as_bytes()).context("sample order is invalid")?;
    system.producer.publish(SAMPLE_ORDER.as_bytes().to_vec()).await?;
    info!(order_uid = %document.order_uid, topic = system.topic(), "Published sample order");

    let lookup = codec::encode_lookup(&OrderLookup::new(document.order_uid.clone()))?;
    let mut served = None;
    for _ in 0..50 {
        if system.manager.cache().get(&document.order_uid).is_some() {
            served = system.manager.dispatch(Command::GetOrder, &lookup).await;
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }

    match served {
        Some(bytes) => info!(order = %String::from_utf8_lossy(&bytes), "Served order"),
        None => warn!(order_uid = %document.order_uid, "Order was not ingested in time"),
    }

    system.shutdown().await.context("shutdown failed")?;
    Ok(())
}
