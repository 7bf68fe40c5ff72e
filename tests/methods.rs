use strata::{
    read, view_attach, write, ByKey, Dict, DictError, Lookup, Method, Natural, SwapMode,
};

fn key_of<'a>(entry: &'a (u64, &'static str)) -> &'a u64 {
    &entry.0
}

fn by_first() -> ByKey<for<'a> fn(&'a (u64, &'static str)) -> &'a u64> {
    ByKey::new(key_of as for<'a> fn(&'a (u64, &'static str)) -> &'a u64)
}

#[test]
fn every_method_round_trips_the_basics() {
    let methods = [
        Method::Set,
        Method::Bag,
        Method::OrderedSet,
        Method::OrderedBag,
        Method::List,
        Method::Stack,
        Method::Queue,
        Method::Deque,
        Method::SharableSet,
        Method::SharableBag,
    ];
    for method in methods {
        let mut dict = Dict::open(Natural, method);
        for v in [5u64, 1, 3] {
            assert!(dict.insert(v).unwrap().is_inserted(), "{method:?}");
        }
        assert_eq!(dict.len(), 3, "{method:?}");
        for v in [1u64, 3, 5] {
            assert!(dict.contains(&v), "{method:?}");
        }
        assert_eq!(dict.delete(&3), Some(3), "{method:?}");
        assert!(!dict.contains(&3), "{method:?}");
        assert_eq!(dict.len(), 2, "{method:?}");
        assert_eq!(dict.iter().count(), 2, "{method:?}");
    }
}

#[test]
fn migration_chain_keeps_the_objects() {
    let mut dict = Dict::open(Natural, Method::Queue);
    for v in [5u64, 1, 3, 1] {
        dict.insert(v).unwrap();
    }
    // queue order: arrival order front to back is oldest last
    assert_eq!(dict.method(), Method::Queue);

    dict.swap_method(Method::OrderedBag);
    assert_eq!(dict.iter().copied().collect::<Vec<_>>(), vec![1, 1, 3, 5]);

    // into a unique method: one of the two 1s is retired
    dict.swap_method(Method::Set);
    assert_eq!(dict.len(), 3);

    dict.swap_method(Method::List);
    assert_eq!(dict.len(), 3);
    let mut back: Vec<u64> = dict.iter().copied().collect();
    back.sort_unstable();
    assert_eq!(back, vec![1, 3, 5]);
}

#[test]
fn ordered_bag_keeps_arrival_order_within_a_run() {
    let disc = by_first();
    let mut dict = Dict::open(disc, Method::OrderedBag);
    dict.insert((7, "first")).unwrap();
    dict.insert((9, "odd one out")).unwrap();
    dict.insert((7, "second")).unwrap();
    dict.append((7, "third")).unwrap();

    let run: Vec<&'static str> = dict.iter().filter(|e| e.0 == 7).map(|e| e.1).collect();
    assert_eq!(run, vec!["first", "second", "third"]);
}

#[test]
fn install_displaces_the_leftmost_of_a_run() {
    let disc = by_first();
    let mut dict = Dict::open(disc, Method::OrderedBag);
    dict.insert((7, "first")).unwrap();
    dict.insert((7, "second")).unwrap();

    let installed = dict.install((7, "replacement")).unwrap();
    assert_eq!(installed.replaced, Some((7, "first")));
    assert_eq!(dict.len(), 2);
    let run: Vec<&'static str> = dict.iter().map(|e| e.1).collect();
    assert_eq!(run, vec!["replacement", "second"]);
}

#[test]
fn hash_bag_run_probes() {
    let disc = by_first();
    let mut dict = Dict::open(disc, Method::Bag);
    dict.insert((7, "first")).unwrap();
    dict.insert((7, "second")).unwrap();

    // at_least / at_most on a hash method resolve to the ends of the run
    let first = dict.at_least(&7).unwrap();
    let last = dict.at_most(&7).unwrap();
    assert_eq!(first.1, "first");
    assert_eq!(last.1, "second");
}

#[test]
fn sequence_closest_key_scan() {
    let mut dict = Dict::open(Natural, Method::List);
    for v in [50u64, 10, 30] {
        dict.append(v).unwrap();
    }
    assert_eq!(dict.at_least(&20), Some(&30));
    assert_eq!(dict.at_most(&20), Some(&10));
    assert_eq!(dict.at_least(&99), None);
    assert_eq!(dict.at_most(&5), None);
}

#[test]
fn bounded_capacity_returns_the_exact_object() {
    let disc = by_first();
    let mut dict = Dict::open_bounded(disc, Method::Set, 1);
    dict.insert((1, "kept")).unwrap();
    let err = dict.insert((2, "bounced")).unwrap_err();
    assert_eq!(err.into_inner(), (2, "bounced"));
    assert_eq!(dict.len(), 1);

    // installs over an existing key still work at the bound
    let installed = dict.install((1, "swapped")).unwrap();
    assert_eq!(installed.replaced, Some((1, "kept")));
    // but an install of a fresh key is refused
    let err = dict.install((3, "bounced too")).unwrap_err();
    assert_eq!(err.into_inner(), (3, "bounced too"));
    assert_eq!(dict.len(), 1);
}

#[test]
fn stat_reflects_each_family() {
    let mut hashed = Dict::open(Natural, Method::Bag);
    let mut ordered = Dict::open(Natural, Method::OrderedSet);
    let mut listed = Dict::open(Natural, Method::List);
    for v in 0u64..200 {
        hashed.insert(v).unwrap();
        ordered.insert(v).unwrap();
        listed.insert(v).unwrap();
    }

    let h = hashed.stat();
    assert_eq!(h.size, 200);
    assert!(h.top_slots > 0);
    assert!(!h.level_slots.is_empty());
    assert_eq!(h.level_size.iter().sum::<usize>(), 200);

    let o = ordered.stat();
    assert_eq!(o.size, 200);
    assert_eq!(o.top_slots, 0);
    assert!(o.max_level >= 1);
    assert_eq!(o.level_size.iter().sum::<usize>(), 200);

    let l = listed.stat();
    assert_eq!(l.size, 200);
    assert_eq!(l.max_level, 1);
    assert_eq!(l.level_size, vec![200]);
    assert_eq!(format!("{l}"), l.digest);
}

#[test]
fn discipline_rebuild_reorders_everything() {
    #[derive(Debug, Clone, Copy)]
    struct Reversed;
    impl strata::Discipline<u64> for Reversed {
        type Key = u64;
        fn key<'a>(&self, obj: &'a u64) -> &'a u64 {
            obj
        }
        fn compare(&self, a: &u64, b: &u64) -> std::cmp::Ordering {
            b.cmp(a)
        }
        fn hash(&self, key: &u64) -> u64 {
            strata::default_hash(key)
        }
    }

    // same key/hash logic under both orderings, so start with Reversed
    let mut dict = Dict::open(Reversed, Method::OrderedSet);
    for v in [1u64, 3, 5] {
        dict.insert(v).unwrap();
    }
    assert_eq!(dict.iter().copied().collect::<Vec<_>>(), vec![5, 3, 1]);

    dict.swap_discipline(Reversed, SwapMode::Rebuild).unwrap();
    assert_eq!(dict.len(), 3);

    // a compatibility claim that does not cover ordering is refused
    let refused = dict.swap_discipline(
        Reversed,
        SwapMode::AssertCompatible {
            same_compare: false,
            same_hash: true,
        },
    );
    assert_eq!(refused.unwrap_err(), DictError::IncompatibleDiscipline);

    // and a full claim is taken in place
    dict.swap_discipline(
        Reversed,
        SwapMode::AssertCompatible {
            same_compare: true,
            same_hash: true,
        },
    )
    .unwrap();
    assert_eq!(dict.iter().copied().collect::<Vec<_>>(), vec![5, 3, 1]);
}

#[test]
fn view_chain_probes_each_level_once() {
    let mut grandparent = Dict::open(Natural, Method::Set);
    grandparent.insert(100u64).unwrap();
    let grandparent = grandparent.into_shared();

    let mut parent = Dict::open(Natural, Method::Set);
    parent.insert(10u64).unwrap();
    let parent = parent.into_shared();

    let child = Dict::open(Natural, Method::Set).into_shared();

    view_attach(&parent, &grandparent).unwrap();
    view_attach(&child, &parent).unwrap();

    let guard = read(&child).unwrap();
    assert_eq!(guard.lookup(Lookup::Exact, &10, |v| *v).unwrap(), Some(10));
    assert_eq!(guard.lookup(Lookup::Exact, &100, |v| *v).unwrap(), Some(100));
    assert_eq!(guard.lookup(Lookup::Exact, &1, |v| *v).unwrap(), None);
    drop(guard);

    // a write to the middle of the chain is visible below it
    write(&parent).unwrap().insert(11u64).unwrap();
    let got = read(&child)
        .unwrap()
        .lookup(Lookup::Exact, &11, |v| *v)
        .unwrap();
    assert_eq!(got, Some(11));
}

#[test]
fn shared_bag_tolerates_parallel_run_scans() {
    let disc = by_first();
    let mut dict = Dict::open(disc, Method::SharableBag);
    for i in 0u64..50 {
        dict.insert((i % 5, "x")).unwrap();
    }
    std::thread::scope(|scope| {
        for _ in 0..4 {
            let dict = &dict;
            scope.spawn(move || {
                for key in 0u64..5 {
                    let mut run = 0;
                    let mut at = dict.find_handle(&key);
                    while let Some(h) = at {
                        if dict.get(h).unwrap().0 != key {
                            break;
                        }
                        run += 1;
                        at = dict.next(h);
                    }
                    assert_eq!(run, 10);
                }
            });
        }
    });
}
