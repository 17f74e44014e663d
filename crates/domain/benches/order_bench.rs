use common::OrderItemId;
use criterion::{Criterion, criterion_group, criterion_main};
use domain::{Money, Order, OrderItem};

fn items(count: usize) -> Vec<OrderItem> {
    (0..count)
        .map(|i| {
            OrderItem::new(
                format!("item-{i}"),
                "Benchmark Widget",
                Money::from_cents(1000),
                "SKU-BENCH",
                2,
            )
        })
        .collect()
}

fn bench_create_order(c: &mut Criterion) {
    c.bench_function("domain/create_order_10_items", |b| {
        b.iter(|| Order::new("o1", "c1", items(10)).unwrap());
    });
}

fn bench_add_item(c: &mut Criterion) {
    let order = Order::new("o1", "c1", items(50)).unwrap();

    c.bench_function("domain/add_item_to_50", |b| {
        b.iter(|| {
            let mut order = order.clone();
            order
                .add_item(OrderItem::new(
                    "extra",
                    "Extra",
                    Money::from_cents(500),
                    "SKU-EXTRA",
                    1,
                ))
                .unwrap();
        });
    });
}

fn bench_remove_item(c: &mut Criterion) {
    let order = Order::new("o1", "c1", items(50)).unwrap();
    let target = OrderItemId::new("item-25");

    c.bench_function("domain/remove_item_from_50", |b| {
        b.iter(|| {
            let mut order = order.clone();
            order.remove_item(&target).unwrap();
        });
    });
}

criterion_group!(benches, bench_create_order, bench_add_item, bench_remove_item);
criterion_main!(benches);
