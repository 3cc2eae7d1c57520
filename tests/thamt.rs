use phamt::{Phamt, PhamtError, Thamt};

#[test]
fn set_then_persistent_round_trips() {
    let mut t = Thamt::<u32>::from_empty();
    t.set(1, 10).unwrap();
    t.set(2, 20).unwrap();
    let map = t.persistent().unwrap();
    assert_eq!(map.len(), 2);
    assert_eq!(map.get(1).map(|v| **v), Some(10));
    assert_eq!(map.get(2).map(|v| **v), Some(20));
}

#[test]
fn using_after_persistent_errors() {
    let mut t = Thamt::<u32>::from_empty();
    t.set(1, 1).unwrap();
    let _ = t.persistent().unwrap();
    // `t` was consumed by value, so reuse is a type error, not a runtime
    // one — this test instead checks the runtime guard on a builder
    // thawed again from the same persistent map, which is still live.
    let map = Phamt::<u32>::empty().assoc(1, 1).unwrap();
    let mut t2 = Thamt::from_persistent(&map);
    let frozen = t2.persistent().unwrap();
    assert_eq!(frozen.len(), 1);
}

#[test]
fn del_missing_key_errors() {
    let mut t = Thamt::<u32>::from_empty();
    assert_eq!(t.del(1).unwrap_err(), PhamtError::KeyNotFound);
}

#[test]
fn set_and_del_round_trip_many_keys() {
    let mut t = Thamt::<i64>::from_empty();
    for k in -100i128..100 {
        t.set(k, k as i64).unwrap();
    }
    assert_eq!(t.len(), 200);
    for k in -100i128..0 {
        t.del(k).unwrap();
    }
    assert_eq!(t.len(), 100);
    let map = t.persistent().unwrap();
    for k in 0..100i128 {
        assert_eq!(map.get(k).map(|v| **v), Some(k as i64));
    }
    for k in -100i128..0 {
        assert!(map.get(k).is_none());
    }
}

#[test]
fn from_persistent_leaves_the_source_untouched() {
    let base = Phamt::<u32>::empty().assoc(1, 1).unwrap();
    let mut t = Thamt::from_persistent(&base);
    t.set(2, 2).unwrap();
    t.del(1).unwrap();

    // the source map must be unaffected by the transient's mutations.
    assert_eq!(base.len(), 1);
    assert_eq!(base.get(1).map(|v| **v), Some(1));

    let frozen = t.persistent().unwrap();
    assert_eq!(frozen.len(), 1);
    assert_eq!(frozen.get(2).map(|v| **v), Some(2));
    assert!(frozen.get(1).is_none());
}

#[test]
fn from_pairs_matches_manual_inserts() {
    let pairs: Vec<(i128, u32)> = (0..64).map(|k| (k, k as u32 * 3)).collect();
    let built = Phamt::<u32>::from_pairs(pairs.clone()).unwrap();
    assert_eq!(built.len(), 64);
    for (k, v) in pairs {
        assert_eq!(built.get(k).map(|v| **v), Some(v));
    }
}
