use phamt::Phamt;

#[test]
fn from_sequence_assigns_ascending_keys() {
    let words = vec!["zero", "one", "two", "three"];
    let map = Phamt::<&str>::from_sequence(words.clone()).unwrap();
    assert_eq!(map.len(), words.len());
    for (i, w) in words.into_iter().enumerate() {
        assert_eq!(map.get(i as i128).map(|v| *v), Some(w));
    }
    assert!(map.get(4).is_none());
}

#[test]
fn from_sequence_on_an_empty_iterable_is_the_empty_map() {
    let map = Phamt::<u32>::from_sequence(std::iter::empty()).unwrap();
    assert!(map.is_empty());
}

#[test]
fn from_pairs_last_write_wins_on_duplicate_keys() {
    let map = Phamt::<u32>::from_pairs([(1, 10), (2, 20), (1, 99)]).unwrap();
    assert_eq!(map.len(), 2);
    assert_eq!(map.get(1).map(|v| **v), Some(99));
}
