use super::*;
use crate::key::{CompositeKey, KeyField};

fn market_key(country: &str, item: &str, year: i64) -> CompositeKey {
    CompositeKey::new(vec![
        KeyField::text(country),
        KeyField::text(item),
        KeyField::int(year),
    ])
}

#[test]
fn test_equal_keys_same_partition() {
    let partitioner = HashPartitioner::new();

    let a = market_key("US", "Snacks", 2015);
    let b = market_key("US", "Snacks", 2015);

    for partitions in [1, 2, 4, 7, 16] {
        let pa = partitioner.partition(&a, partitions).unwrap();
        let pb = partitioner.partition(&b, partitions).unwrap();
        assert_eq!(pa, pb, "equal keys diverged at {} partitions", partitions);
    }
}

#[test]
fn test_partition_stable_across_calls() {
    let partitioner = HashPartitioner::new();
    let key = market_key("Norway", "Cereal", 2013);

    let first = partitioner.partition(&key, 8).unwrap();
    for _ in 0..100 {
        assert_eq!(partitioner.partition(&key, 8).unwrap(), first);
    }
}

#[test]
fn test_partition_within_bounds() {
    let partitioner = HashPartitioner::new();

    for i in 0..200 {
        let key = market_key(&format!("country_{}", i), "Snacks", 2000 + i);
        for partitions in 1..10 {
            let p = partitioner.partition(&key, partitions).unwrap();
            assert!(p < partitions, "index {} out of range for {}", p, partitions);
        }
    }
}

#[test]
fn test_partition_distribution() {
    let partitioner = HashPartitioner::new();

    let mut counts = vec![0usize; 4];
    for i in 0..1000 {
        let key = market_key(&format!("country_{}", i), "Snacks", 2015);
        let p = partitioner.partition(&key, 4).unwrap();
        counts[p] += 1;
    }

    // Roughly 250 keys per partition; anything wildly off means the hash
    // is degenerate for this key shape.
    for count in counts {
        assert!(count > 150 && count < 350, "unbalanced distribution: {}", count);
    }
}

#[test]
fn test_zero_partitions_rejected() {
    let partitioner = HashPartitioner::new();
    let key = market_key("US", "Snacks", 2015);

    let err = partitioner.partition(&key, 0).unwrap_err();
    assert!(matches!(err, Error::Partition(_)));
}
