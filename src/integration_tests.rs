use std::time::Duration;

use rust_decimal_macros::dec;
use tokio::time::{sleep, timeout, Instant};

use crate::app_system::{OrderSystem, SystemConfig};
use crate::clients::{OrderClient, StatsClient};
use crate::domain::{Item, Order, OrderStatus, Product, Statistics};
use crate::error::{OrderError, StatsError};

const SETTLE_TIMEOUT: Duration = Duration::from_secs(5);

fn start_with(products: Vec<Product>) -> OrderSystem {
    OrderSystem::start(&SystemConfig::default(), products)
}

async fn settle(client: &OrderClient, id: &str) -> Order {
    timeout(SETTLE_TIMEOUT, async {
        loop {
            let order = client.get_order(id).unwrap();
            if !matches!(order.status, OrderStatus::Pending | OrderStatus::ReversalRequested) {
                return order;
            }
            sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("order should settle")
}

async fn stats_when(client: &StatsClient, ready: impl Fn(&Statistics) -> bool) -> Statistics {
    timeout(SETTLE_TIMEOUT, async {
        loop {
            let stats = client.get_stats_within(Duration::from_secs(1)).await.unwrap();
            if ready(&stats) {
                return stats;
            }
            sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("statistics should catch up")
}

fn stock_of(client: &OrderClient, id: &str) -> i64 {
    client
        .get_all_products()
        .into_iter()
        .find(|p| p.id == id)
        .map(|p| p.stock)
        .unwrap()
}

#[tokio::test]
async fn test_order_reject_and_reverse_flow() {
    let system = start_with(vec![Product::new("p", "Pen(box)", 10, dec!(2.00))]);
    let orders = system.order_client.clone();

    let first = orders.create_order(Item::new("p", 4)).await.unwrap();
    let first = settle(&orders, &first.id).await;
    assert_eq!(first.status, OrderStatus::Completed);
    assert_eq!(first.total, Some(dec!(8.00)));
    assert_eq!(stock_of(&orders, "p"), 6);

    let second = orders.create_order(Item::new("p", 10)).await.unwrap();
    let second = settle(&orders, &second.id).await;
    assert_eq!(second.status, OrderStatus::Rejected);
    assert!(second.error.unwrap().contains("Not enough stock"));
    assert_eq!(stock_of(&orders, "p"), 6);

    let before = stats_when(&system.stats_client, |s| {
        s.completed_orders == 1 && s.rejected_orders == 1
    })
    .await;
    assert_eq!(before.revenue, dec!(8.00));

    let reversal = orders.request_reversal(&first.id).await.unwrap();
    assert_eq!(reversal.status, OrderStatus::ReversalRequested);
    let reversed = settle(&orders, &first.id).await;
    assert_eq!(reversed.status, OrderStatus::Reversed);
    assert_eq!(stock_of(&orders, "p"), 10);

    let after = stats_when(&system.stats_client, |s| s.reversed_orders == 1).await;
    assert_eq!(after.revenue, before.revenue - dec!(8.00));

    // Reversed is terminal.
    let err = orders.request_reversal(&first.id).await.unwrap_err();
    assert!(matches!(err, OrderError::InvalidState { from: OrderStatus::Reversed, .. }));

    system.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_reversal_of_rejected_order_is_refused() {
    let system = start_with(vec![Product::new("p", "Pen(box)", 1, dec!(2.00))]);
    let orders = system.order_client.clone();

    let order = orders.create_order(Item::new("p", 5)).await.unwrap();
    let order = settle(&orders, &order.id).await;
    assert_eq!(order.status, OrderStatus::Rejected);

    let err = orders.request_reversal(&order.id).await.unwrap_err();
    assert_eq!(
        err,
        OrderError::InvalidState {
            order_id: order.id.clone(),
            from: OrderStatus::Rejected,
            to: OrderStatus::ReversalRequested,
        }
    );
    assert_eq!(orders.get_order(&order.id).unwrap(), order);

    system.shutdown().await.unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_orders_never_oversell() {
    let system = start_with(vec![Product::new("p", "Pen(box)", 50, dec!(1.10))]);

    let submissions: Vec<_> = (0..100)
        .map(|_| {
            let orders = system.order_client.clone();
            tokio::spawn(async move { orders.create_order(Item::new("p", 1)).await })
        })
        .collect();

    let mut ids = Vec::new();
    for submission in submissions {
        ids.push(submission.await.unwrap().unwrap().id);
    }

    let mut completed = 0;
    let mut rejected = 0;
    for id in &ids {
        match settle(&system.order_client, id).await.status {
            OrderStatus::Completed => completed += 1,
            OrderStatus::Rejected => rejected += 1,
            other => panic!("unexpected status {other}"),
        }
    }
    assert_eq!(completed, 50);
    assert_eq!(rejected, 50);
    assert_eq!(stock_of(&system.order_client, "p"), 0);

    let stats = stats_when(&system.stats_client, |s| {
        s.completed_orders + s.rejected_orders == 100
    })
    .await;
    assert_eq!(stats.completed_orders, 50);
    assert_eq!(stats.revenue, dec!(55.00));

    system.shutdown().await.unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_mixed_orders_and_reversals_keep_stock_consistent() {
    let system = start_with(vec![
        Product::new("a", "Apple(kg)", 20, dec!(0.35)),
        Product::new("b", "Bread(loaf)", 5, dec!(2.49)),
    ]);
    let orders = system.order_client.clone();

    let submissions: Vec<_> = (0..40)
        .map(|i| {
            let orders = orders.clone();
            let item = if i % 2 == 0 {
                Item::new("a", (i % 3) + 1)
            } else {
                Item::new("b", 1)
            };
            tokio::spawn(async move { orders.create_order(item).await })
        })
        .collect();

    let mut settled = Vec::new();
    for submission in submissions {
        let order = submission.await.unwrap().unwrap();
        settled.push(settle(&orders, &order.id).await);
    }

    // Reverse every completed order concurrently, twice each.
    let reversals: Vec<_> = settled
        .iter()
        .filter(|o| o.status == OrderStatus::Completed)
        .map(|o| {
            let [first, second] = [o.id.clone(), o.id.clone()].map(|id| {
                let orders = orders.clone();
                tokio::spawn(async move { orders.request_reversal(&id).await })
            });
            (o.id.clone(), first, second)
        })
        .collect();
    assert!(!reversals.is_empty());
    for (id, first, second) in reversals {
        let results = [first.await.unwrap(), second.await.unwrap()];
        let accepted = results.iter().filter(|r| r.is_ok()).count();
        assert_eq!(accepted, 1, "exactly one reversal of {id} is accepted");
        for result in results {
            match result {
                Ok(order) => assert_eq!(order.status, OrderStatus::ReversalRequested),
                Err(OrderError::InvalidState { order_id, from, to }) => {
                    assert_eq!(order_id, id);
                    assert!(matches!(
                        from,
                        OrderStatus::ReversalRequested | OrderStatus::Reversed
                    ));
                    assert_eq!(to, OrderStatus::ReversalRequested);
                }
                Err(other) => panic!("unexpected reversal error {other}"),
            }
        }
    }

    for order in &settled {
        let current = settle(&orders, &order.id).await;
        match order.status {
            OrderStatus::Completed => assert_eq!(current.status, OrderStatus::Reversed),
            _ => assert_eq!(current.status, OrderStatus::Rejected),
        }
    }

    for product in orders.get_all_products() {
        assert!(product.stock >= 0);
    }
    assert_eq!(stock_of(&orders, "a"), 20);
    assert_eq!(stock_of(&orders, "b"), 5);

    system.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_expired_deadline_never_returns_stats() {
    let system = start_with(vec![Product::new("p", "Pen(box)", 10, dec!(2.00))]);

    for _ in 0..10 {
        let result = system.stats_client.get_stats(Instant::now()).await;
        assert_eq!(result, Err(StatsError::DeadlineExceeded));
    }

    system.shutdown().await.unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_concurrent_close_then_nothing_accepted() {
    let system = start_with(vec![Product::new("p", "Pen(box)", 10, dec!(2.00))]);
    let orders = system.order_client.clone();
    let stats = system.stats_client.clone();

    let completed = orders.create_order(Item::new("p", 1)).await.unwrap();
    settle(&orders, &completed.id).await;

    let first = system.shutdown_handle();
    let second = system.shutdown_handle();
    let a = tokio::spawn(async move { first.close() });
    let b = tokio::spawn(async move { second.close() });
    let (a, b) = (a.await.unwrap(), b.await.unwrap());
    assert!(a ^ b, "exactly one close call triggers shutdown");

    assert_eq!(
        orders.create_order(Item::new("p", 1)).await,
        Err(OrderError::Closed)
    );
    assert_eq!(
        orders.request_reversal(&completed.id).await,
        Err(OrderError::Closed)
    );
    assert_eq!(
        orders.get_order(&completed.id).unwrap().status,
        OrderStatus::Completed
    );

    // Closing again through the system itself is a no-op.
    assert!(!system.close());
    system.shutdown().await.unwrap();

    assert_eq!(
        stats.get_stats_within(Duration::from_secs(1)).await,
        Err(StatsError::Closed)
    );
}
