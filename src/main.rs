use std::time::Duration;

use rust_decimal::Decimal;
use tracing::{error, info, warn, Instrument};

use order_pipeline::inventory::load_products;
use order_pipeline::{setup_tracing, Item, OrderStatus, OrderSystem, Product, SystemConfig};

#[tokio::main]
async fn main() -> Result<(), String> {
    // A missing .env file is fine; the defaults apply.
    let _ = dotenvy::dotenv();
    setup_tracing();

    info!("Starting order pipeline");

    let config = SystemConfig::from_env().map_err(|e| e.to_string())?;
    let products = match load_products(&config.inventory_path) {
        Ok(products) => products,
        Err(e) => {
            warn!(error = %e, "Falling back to sample inventory");
            sample_inventory()
        }
    };

    let system = OrderSystem::start(&config, products);
    for product in system.order_client.get_all_products() {
        info!(product_id = %product.id, name = %product.name, stock = product.stock, price = %product.price, "Product available");
    }

    let span = tracing::info_span!("order_processing");
    let first = async {
        info!("Placing orders");
        let first = system
            .order_client
            .create_order(Item::new("p1", 4))
            .await
            .map_err(|e| e.to_string())?;
        if let Err(e) = system.order_client.create_order(Item::new("p1", 10)).await {
            error!(error = %e, "Order not accepted");
        }
        Ok::<_, String>(first)
    }
    .instrument(span)
    .await?;

    // Processing is asynchronous; wait for the first order to settle.
    let settled = wait_for_status(&system, &first.id, OrderStatus::Completed).await;
    if settled {
        let span = tracing::info_span!("reversal");
        async {
            match system.order_client.request_reversal(&first.id).await {
                Ok(order) => info!(order_id = %order.id, "Reversal requested"),
                Err(e) => error!(error = %e, "Reversal failed"),
            }
        }
        .instrument(span)
        .await;
        wait_for_status(&system, &first.id, OrderStatus::Reversed).await;
    }

    match system.stats_client.get_stats_within(config.stats_timeout).await {
        Ok(stats) => info!(
            completed = stats.completed_orders,
            rejected = stats.rejected_orders,
            reversed = stats.reversed_orders,
            revenue = %stats.revenue,
            "Order statistics"
        ),
        Err(e) => error!(error = %e, "Statistics unavailable"),
    }

    system.shutdown().await?;

    info!("Order pipeline stopped");
    Ok(())
}

async fn wait_for_status(system: &OrderSystem, order_id: &str, status: OrderStatus) -> bool {
    for _ in 0..50 {
        match system.order_client.get_order(order_id) {
            Ok(order) if order.status == status => return true,
            Ok(order) if order.status == OrderStatus::Rejected => {
                warn!(order_id, error = ?order.error, "Order rejected");
                return false;
            }
            _ => tokio::time::sleep(Duration::from_millis(20)).await,
        }
    }
    warn!(order_id, %status, "Order did not settle in time");
    false
}

fn sample_inventory() -> Vec<Product> {
    vec![
        Product::new("p1", "Coffee(bag)", 10, Decimal::new(200, 2)),
        Product::new("p2", "Tea(box)", 25, Decimal::new(350, 2)),
        Product::new("p3", "Sugar(kg)", 40, Decimal::new(99, 2)),
    ]
}
