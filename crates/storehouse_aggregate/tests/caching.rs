//! Context and item cache reuse across the aggregator.

mod common;

use common::{Fixture, IRON, STONE, WOOD};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;
use storehouse_items::{ResourceUnit, TypeFilter};
use storehouse_world::{ProviderCategory, ProviderId};

fn stocked() -> Fixture {
    let fixture = Fixture::new();
    fixture.provider(
        1,
        ProviderCategory::LootableContainer,
        [ResourceUnit::new(WOOD, 10), ResourceUnit::new(STONE, 6)],
    );
    fixture.provider(2, ProviderCategory::VehicleCargo, [ResourceUnit::new(IRON, 4)]);
    fixture
}

#[test]
fn repeated_queries_share_one_discovery_and_one_pull() {
    let fixture = stocked();
    let aggregator = fixture.aggregator();

    assert_eq!(aggregator.item_count("ui", &TypeFilter::unfiltered()), 20);
    assert_eq!(aggregator.item_count("ui", &TypeFilter::from_single_type(WOOD)), 10);
    assert!(aggregator.has_item("ui", &TypeFilter::from_type_set([STONE, IRON])));

    let stats = aggregator.stats();
    assert_eq!(fixture.world.scan_count(), 1);
    assert_eq!(stats.context_misses, 1);
    assert_eq!(stats.context_hits, 2);
    assert_eq!(stats.item_cache_pulls, 1);
    assert_eq!(stats.item_cache_hits, 2);
}

#[test]
fn invalidation_reaches_contexts_already_handed_out() {
    let fixture = stocked();
    let aggregator = fixture.aggregator();

    let held = aggregator.create("held", false).expect("context");
    assert_eq!(held.item_count_of(WOOD), 10);

    let crate_ = fixture.world.provider(ProviderId(1)).expect("provider");
    crate_.add_unit(ResourceUnit::new(WOOD, 5));
    assert_eq!(held.item_count_of(WOOD), 10);

    aggregator.invalidate_cache();

    assert_eq!(held.item_count_of(WOOD), 15);
    let fresh = aggregator.create("fresh", false).expect("context");
    assert!(!Arc::ptr_eq(&held, &fresh));
    assert_eq!(fixture.world.scan_count(), 2);
}

#[test]
fn narrower_cache_does_not_answer_wider_query() {
    let fixture = stocked();
    let aggregator = fixture.aggregator();
    let context = aggregator.create("craft", false).expect("context");

    assert_eq!(context.item_count_of(WOOD), 10);
    assert_eq!(context.item_count(&TypeFilter::from_type_set([WOOD, STONE])), 16);
    assert_eq!(context.item_count(&TypeFilter::unfiltered()), 20);

    assert_eq!(aggregator.stats().item_cache_pulls, 3);
}

#[test]
fn empty_filters_never_reuse_a_pull() {
    let fixture = stocked();
    let aggregator = fixture.aggregator();
    let context = aggregator.create("craft", false).expect("context");
    let none = TypeFilter::from_type_set(core::iter::empty::<storehouse_items::ResourceTypeId>());

    assert_eq!(context.item_count(&none), 0);
    assert_eq!(context.item_count(&none), 0);

    assert_eq!(aggregator.stats().item_cache_pulls, 2);
}

#[test]
fn item_cache_expires_before_context() {
    let fixture = stocked();
    let aggregator = fixture.aggregator();
    let context = aggregator.create("ui", false).expect("context");

    let _ = context.item_count_of(WOOD);
    fixture.clock.advance(Duration::from_millis(801));
    let _ = context.item_count_of(WOOD);

    let same = aggregator.create("ui", false).expect("context");
    assert!(Arc::ptr_eq(&context, &same));
    assert_eq!(aggregator.stats().item_cache_pulls, 2);

    fixture.clock.advance(Duration::from_millis(200));
    let next = aggregator.create("ui", false).expect("context");
    assert!(!Arc::ptr_eq(&context, &next));
}

#[test]
fn concurrent_creates_discover_once() {
    const THREADS: usize = 8;

    let fixture = stocked();
    let aggregator = Arc::new(fixture.aggregator());
    let barrier = Arc::new(Barrier::new(THREADS));

    let handles: Vec<_> = (0..THREADS)
        .map(|_| {
            let aggregator = Arc::clone(&aggregator);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                aggregator.create("burst", false).expect("context")
            })
        })
        .collect();

    let contexts: Vec<_> = handles
        .into_iter()
        .map(|handle| handle.join().expect("thread panicked"))
        .collect();

    assert_eq!(fixture.world.scan_count(), 1);
    assert!(contexts.windows(2).all(|pair| Arc::ptr_eq(&pair[0], &pair[1])));
    let stats = aggregator.stats();
    assert_eq!(stats.context_misses, 1);
    assert_eq!(stats.context_hits, (THREADS - 1) as u64);
}

#[test]
fn concurrent_queries_on_one_context_pull_once() {
    const THREADS: usize = 6;

    let fixture = stocked();
    let aggregator = fixture.aggregator();
    let context = aggregator.create("ui", false).expect("context");
    let barrier = Arc::new(Barrier::new(THREADS));

    let handles: Vec<_> = (0..THREADS)
        .map(|_| {
            let context = Arc::clone(&context);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                context.item_count(&TypeFilter::unfiltered())
            })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().expect("thread panicked"), 20);
    }
    assert_eq!(aggregator.stats().item_cache_pulls, 1);
}
