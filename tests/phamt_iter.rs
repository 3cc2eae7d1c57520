use std::collections::HashMap;

use phamt::Phamt;

#[test]
fn iterates_every_entry_exactly_once() {
    let mut map = Phamt::<i64>::empty();
    let mut expected = HashMap::new();
    for k in -50i128..50 {
        map = map.assoc(k, k as i64).unwrap();
        expected.insert(k, k as i64);
    }

    let mut seen = HashMap::new();
    for (k, v) in map.iter() {
        assert!(seen.insert(k, *v).is_none(), "key {k} yielded twice");
    }
    assert_eq!(seen.len(), expected.len());
    for (k, v) in expected {
        assert_eq!(seen.get(&k), Some(&v));
    }
}

#[test]
fn empty_map_iterates_to_nothing() {
    let map = Phamt::<u32>::empty();
    assert_eq!(map.iter().count(), 0);
}

#[test]
fn iterator_survives_the_source_map_being_dropped() {
    // The iterator owns its own Arc clones, so it must keep working
    // after every other handle to the map is gone.
    let map = Phamt::<u32>::empty().assoc(1, 1).unwrap().assoc(2, 2).unwrap();
    let iter = map.iter();
    drop(map);

    let mut collected: Vec<_> = iter.map(|(k, v)| (k, *v)).collect();
    collected.sort();
    assert_eq!(collected, vec![(1, 1), (2, 2)]);
}

#[test]
fn into_iter_on_a_reference_matches_iter() {
    let map = Phamt::<u32>::empty().assoc(5, 50).unwrap();
    let mut via_into_iter: Vec<_> = (&map).into_iter().map(|(k, v)| (k, *v)).collect();
    let mut via_iter: Vec<_> = map.iter().map(|(k, v)| (k, *v)).collect();
    via_into_iter.sort();
    via_iter.sort();
    assert_eq!(via_into_iter, via_iter);
}
