extern crate byteorder;
extern crate lazy_linq;
#[macro_use]
extern crate scroll;

use std::cell::Cell;

use byteorder::{LittleEndian, WriteBytesExt};
use lazy_linq::{
    sequence, Builder, ContiguousExt, Enumerator, Grouping, Lazy, PullExt, ScratchPool,
    ScrollTransducer, SequenceError, State, TextSegment,
};
use scroll::LE;

#[derive(Debug, Copy, Clone, Default, PartialEq, Pread, Pwrite, SizeWith)]
#[repr(C)]
struct Reading {
    sensor: u32,
    value: u32,
}

const READING_SIZE: usize = 8;

fn readings_bytes(readings: &[(u32, u32)]) -> Vec<u8> {
    let mut bytes = Vec::new();
    for &(sensor, value) in readings {
        bytes.write_u32::<LittleEndian>(sensor).unwrap();
        bytes.write_u32::<LittleEndian>(value).unwrap();
    }
    bytes
}

#[test]
fn run_grouping_partitions_contiguous_runs_only() {
    let data = vec![1, 1, 2, 2, 1];
    let pulled: Vec<_> = data.iter().cloned().group_runs(|n| *n).collect();
    assert_eq!(
        pulled,
        vec![
            Grouping { key: 1, members: vec![1, 1] },
            Grouping { key: 2, members: vec![2, 2] },
            Grouping { key: 1, members: vec![1] },
        ]
    );

    let sliced: Vec<_> = data
        .as_slice()
        .group_runs(|n| **n)
        .map(|g| (g.key, g.members.to_vec()))
        .collect();
    let expected: Vec<_> = pulled.into_iter().map(|g| (g.key, g.members)).collect();
    assert_eq!(sliced, expected);
}

#[test]
fn split_keeps_empty_segments_and_drops_separators() {
    let from_text: Vec<_> = TextSegment::new("a,b,,c").split_on(',').map(|s| s.as_str()).collect();
    assert_eq!(from_text, vec!["a", "b", "", "c"]);

    let from_chars: Vec<String> = "a,b,,c"
        .chars()
        .split_on(',')
        .map(|segment| segment.into_iter().collect())
        .collect();
    assert_eq!(from_chars, vec!["a", "b", "", "c"]);
    assert!(from_chars.iter().all(|s| !s.contains(',')));

    let trailing: Vec<_> = TextSegment::new("a,b,").split_on(',').map(|s| s.as_str()).collect();
    assert_eq!(trailing, vec!["a", "b", ""]);
}

#[test]
fn constructing_adapters_pulls_nothing() {
    let pulls = Cell::new(0);
    let data = vec![3, 0, 4, 0, 5];
    let (pulls_ref, data_ref) = (&pulls, &data);
    let counted = move || data_ref.iter().inspect(move |_| pulls_ref.set(pulls_ref.get() + 1));

    let filtered = counted().where_by(|n| **n > 0);
    let projected = counted().select(|n| n * 2);
    let split = counted().split_on(&0);
    let grouped = counted().group_runs(|n| **n);
    let indexed = counted().indices_of(&0);
    assert_eq!(pulls.get(), 0);

    let lazy = Lazy::new(|| counted().split_on(&0));
    assert_eq!(pulls.get(), 0);

    drop((filtered, projected, grouped, indexed));
    let mut split = split;
    assert_eq!(split.next(), Some(vec![&3]));
    assert_eq!(pulls.get(), 2);

    assert_eq!(lazy.iter().count(), 3);
    assert_eq!(lazy.iter().count(), 3);
    assert_eq!(pulls.get(), 12);
}

#[test]
fn reset_fails_and_exhaustion_is_idempotent() {
    fn check<E: Enumerator>(mut it: E) {
        while it.next().is_some() {}
        assert_eq!(it.state(), State::Exhausted);
        assert!(it.next().is_none());
        assert!(it.next().is_none());
        let err = it.reset().unwrap_err();
        assert_eq!(
            err.downcast_ref::<SequenceError>(),
            Some(&SequenceError::Unsupported("reset"))
        );
    }

    let data = [1, 2, 2, 3];
    check(data.iter().where_by(|n| **n > 1));
    check(data.iter().select(|n| n + 1));
    check(data.iter().group_runs(|n| **n));
    check(data.iter().distinct_runs());
    check(data.iter().split_on(&2));
    check(data.iter().indices_of(&2));
    check(data.iter().last_n_indices_of(&2, 1).unwrap());
    check(data[..].where_by(|n| **n > 1).unwrap());
    check(data[..].select(|n| n + 1));
    check(data[..].group_runs(|n| **n));
    check(data[..].split_when(|n| **n == 2));
    check(data[..].split_seq(&[2, 2][..]).unwrap());
    check(data[..].indices_where(|n| **n == 2));
    check(data[..].order_by(|n| -**n).iter());
}

#[test]
fn index_search_is_ordered() {
    let data = vec![5, 3, 5, 5, 2];
    let all: Vec<_> = data.iter().indices_of(&5).collect();
    assert_eq!(all, vec![0, 2, 3]);
    let first: Vec<_> = data.iter().first_n_indices_of(&5, 2).unwrap().collect();
    assert_eq!(first, vec![0, 2]);
    let buffer_first: Vec<_> = data.as_slice().first_n_indices_of(&5, 2).unwrap().collect();
    assert_eq!(buffer_first, first);
    let last: Vec<_> = data.as_slice().last_n_indices_of(&5, 2).unwrap().collect();
    assert_eq!(last, vec![3, 2]);

    let text = TextSegment::new("ñaña");
    let from_text: Vec<_> = text.indices_of('a').collect();
    let from_chars: Vec<_> = "ñaña".chars().indices_of('a').collect();
    assert_eq!(from_text, vec![1, 3]);
    assert_eq!(from_text, from_chars);
    let last_in_text: Vec<_> = text.last_n_indices_of('ñ', 1).unwrap().collect();
    assert_eq!(last_in_text, vec![2]);

    let err = data.iter().first_n_indices_of(&5, 0).unwrap_err();
    match err.downcast_ref::<SequenceError>() {
        Some(&SequenceError::InvalidArgument { name, .. }) => assert_eq!(name, "count"),
        other => panic!("unexpected error: {:?}", other),
    }
}

#[test]
fn ordering_is_stable() {
    let items = [(1, "a"), (1, "b")];
    let asc: Vec<_> = items[..].order_by(|p| p.0).iter().map(|p| p.1).collect();
    assert_eq!(asc, vec!["a", "b"]);
    let desc: Vec<_> = items[..].order_by_descending(|p| p.0).iter().map(|p| p.1).collect();
    assert_eq!(desc, vec!["a", "b"]);
}

#[test]
fn disposal_is_safe_and_releases_scratch() {
    let pool = ScratchPool::new();
    let data = [1, 2, 3, 4, 5];

    let mut evens = data[..].where_in(|n| **n % 2 == 0, &pool).unwrap();
    assert_eq!(evens.next(), Some(&2));
    evens.dispose();
    evens.dispose();
    assert_eq!(evens.next(), None);
    assert_eq!(pool.outstanding(), 0);

    let untouched = data[..].where_in(|n| **n > 10, &pool).unwrap();
    drop(untouched);
    assert_eq!(pool.outstanding(), 0);

    let mut cursor = data.iter().split_on(&3).into_cursor();
    assert!(cursor.move_next());
    assert_eq!(cursor.current(), Some(&vec![&1, &2]));
    cursor.dispose();
    cursor.dispose();
    assert!(!cursor.move_next());
}

#[test]
fn empty_sources() {
    let empty: &[u8] = &[];
    assert_eq!(
        empty.where_by(|_| true).err().unwrap().downcast_ref::<SequenceError>(),
        Some(&SequenceError::EmptySource)
    );
    assert_eq!(empty.iter().where_by(|_| true).next(), None);
    assert_eq!(empty.iter().group_runs(|n| **n).next(), None);
    assert_eq!(empty.split_on(&0).next(), None);
    assert_eq!(empty.indices_of(&0).next(), None);
    assert_eq!(empty.order_by(|n| **n).iter().next(), None);
}

#[test]
fn scroll_records_pipeline() {
    let bytes = readings_bytes(&[(1, 10), (1, 250), (2, 30), (2, 40), (1, 300), (3, 5)]);
    assert_eq!(bytes.len(), 6 * READING_SIZE);
    let readings: ScrollTransducer<Reading> =
        ScrollTransducer::parse_with(&bytes, 6, LE).unwrap();
    assert_eq!(readings.get(4), Some(Reading { sensor: 1, value: 300 }));

    let runs: Vec<_> = readings
        .group_runs(|r| r.sensor)
        .map(|g| (g.key, g.members.len()))
        .collect();
    assert_eq!(runs, vec![(1, 2), (2, 2), (1, 1), (3, 1)]);

    let spikes: Vec<_> = readings.indices_where(|r| r.value > 100).collect();
    assert_eq!(spikes, vec![1, 4]);

    let loudest: Vec<_> = readings
        .order_by_descending(|r| r.value)
        .iter()
        .take(2)
        .map(|r| r.value)
        .collect();
    assert_eq!(loudest, vec![300, 250]);

    let quiet = readings.split_when(|r| r.value > 100).map(|segment| segment.len());
    assert_eq!(quiet.collect::<Vec<_>>(), vec![1, 2, 1]);
}

#[test]
fn builder_window_over_records() {
    let bytes = readings_bytes(&[(9, 0), (1, 1), (1, 2), (2, 3)]);
    let body = Builder::new(&bytes[..])
        .skip(1)
        .count(3)
        .parse_with::<_, scroll::Error>(LE)
        .unwrap();
    let sensors: Vec<u32> = body.elements().map(|r: Reading| r.sensor).collect();
    assert_eq!(sensors, vec![1, 1, 2]);

    let err = Builder::<_, Reading>::new(&bytes[..])
        .count(5)
        .parse_with::<_, scroll::Error>(LE)
        .unwrap_err();
    assert_eq!(
        err.downcast_ref::<SequenceError>(),
        Some(&SequenceError::ElementOverflow {
            nelements: 5,
            sizeof_element: READING_SIZE,
            src_size: 4 * READING_SIZE
        })
    );
}

#[test]
fn sequences_are_reiterable() {
    let log = "GET /a\nGET /b\n\nPOST /c\n";
    let requests = sequence(log.lines()).then(|lines| lines.where_by(|l| !l.is_empty()));
    let first: Vec<_> = requests.iter().collect();
    let second: Vec<_> = (&requests).into_iter().collect();
    assert_eq!(first, vec!["GET /a", "GET /b", "POST /c"]);
    assert_eq!(first, second);
}
