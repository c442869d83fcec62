use sequence_interner::{BufferBank, DefaultSymbolTable, Sequence, SymbolTable};

type FxSymbolTable = SymbolTable<BufferBank, fxhash::FxBuildHasher>;

fn seq(value: u32) -> Sequence {
    Sequence::from_u32(value).unwrap()
}

#[test]
fn new_works() {
    let table = DefaultSymbolTable::new();
    assert_eq!(table.len(), 0);
    assert!(table.is_empty());
    assert_eq!(table.capacity(), 0);
    assert_eq!(table.symbol_bytes(), 0);
    let other = DefaultSymbolTable::new();
    assert_eq!(table, other);
}

#[test]
fn is_empty_works() {
    let mut table = DefaultSymbolTable::new();
    assert!(table.is_empty());
    table.get_or_intern("a");
    assert!(!table.is_empty());
}

#[test]
fn basic_interning() {
    let mut table = DefaultSymbolTable::with_capacity(8).unwrap();

    let mut assert_string_to_sequence = |expected: u32, existing: bool, value: &str| {
        let (sequence, found) = table.try_get_or_intern(value).unwrap();
        assert_eq!(found, existing, "unexpected found flag for {value:?}");
        assert_eq!(sequence, seq(expected), "unexpected sequence for {value:?}");
    };

    assert_string_to_sequence(1, false, "a1");
    assert_string_to_sequence(2, false, "a2");
    assert_string_to_sequence(3, false, "a3");
    assert_string_to_sequence(2, true, "a2");
    assert_string_to_sequence(3, true, "a3");

    assert!(table.symbol_bytes() > 0);

    assert_eq!(table.resolve(seq(1)), "a1");
    assert_eq!(table.resolve(seq(2)), "a2");
    assert_eq!(table.resolve(seq(3)), "a3");
}

#[test]
fn read_only_lookup_does_not_intern() {
    let mut table = DefaultSymbolTable::with_capacity(8).unwrap();

    // Won't add an entry if not asked to.
    assert_eq!(table.get("hat"), None);
    assert_eq!(table.len(), 0);

    let (sequence, found) = table.try_get_or_intern("hat").unwrap();
    assert!(!found);
    assert_eq!(sequence, seq(1));

    // Can find the existing entry without asking to add.
    assert_eq!(table.get("hat"), Some(seq(1)));
}

#[test]
fn read_only_lookup_leaves_the_table_unchanged() {
    let mut table = DefaultSymbolTable::with_capacity(8).unwrap();
    table.get_or_intern("present");
    let len = table.len();
    let capacity = table.capacity();

    for value in ["absent", "also absent", ""] {
        assert_eq!(table.get(value), None);
    }
    assert_eq!(table.len(), len);
    assert_eq!(table.capacity(), capacity);
}

#[test]
fn growth_preserves_every_entry() {
    let mut table = DefaultSymbolTable::with_capacity(8).unwrap();

    for i in 0..10_000u32 {
        let (sequence, found) = table.try_get_or_intern(&i.to_string()).unwrap();
        assert!(!found);
        assert_eq!(sequence, seq(i + 1));
    }
    assert_eq!(table.len(), 10_000);

    for i in 0..10_000u32 {
        let (sequence, found) = table.try_get_or_intern(&i.to_string()).unwrap();
        assert!(found);
        assert_eq!(sequence, seq(i + 1));
    }
    assert_eq!(table.len(), 10_000);

    for i in 0..10_000u32 {
        assert_eq!(table.resolve(seq(i + 1)), i.to_string());
    }
}

#[test]
fn growth_with_interleaved_reinsertion() {
    let mut table = DefaultSymbolTable::with_capacity(8).unwrap();

    for i in 0..10_000u32 {
        let (sequence, found) = table.try_get_or_intern(&i.to_string()).unwrap();
        assert!(!found);
        assert_eq!(sequence, seq(i + 1));

        let (sequence, found) = table.try_get_or_intern(&i.to_string()).unwrap();
        assert!(found);
        assert_eq!(sequence, seq(i + 1));
    }
}

#[test]
fn capacity_doubles_at_half_load() {
    let mut table = DefaultSymbolTable::with_capacity(8).unwrap();
    assert_eq!(table.capacity(), 16);

    for i in 0..8u32 {
        table.get_or_intern(&i.to_string());
    }
    assert_eq!(table.capacity(), 16);

    table.get_or_intern("8");
    assert_eq!(table.capacity(), 32);

    // Everything interned before the resize keeps its sequence.
    for i in 0..9u32 {
        assert_eq!(table.get(&i.to_string()), Some(seq(i + 1)));
    }
}

#[test]
fn empty_and_unicode_strings_intern() {
    let mut table = DefaultSymbolTable::new();
    let empty = table.get_or_intern("");
    let snowman = table.get_or_intern("☃ snowman");
    assert_eq!(table.resolve(empty), "");
    assert_eq!(table.resolve(snowman), "☃ snowman");
    assert_eq!(table.get(""), Some(empty));
}

#[test]
fn long_strings_intern() {
    let mut table = DefaultSymbolTable::new();
    let long = "long ".repeat(100);
    let longer = "longer ".repeat(10_000);

    let a = table.get_or_intern(&long);
    let b = table.get_or_intern(&longer);
    let c = table.get_or_intern("short");

    assert_eq!(table.resolve(a), long);
    assert_eq!(table.resolve(b), longer);
    assert_eq!(table.resolve(c), "short");
    assert_eq!(table.get(&long), Some(a));
}

#[test]
fn symbol_bytes_never_shrinks() {
    let mut table = DefaultSymbolTable::new();
    let mut last = table.symbol_bytes();
    for i in 0..1_000u32 {
        table.get_or_intern(&i.to_string());
        assert!(table.symbol_bytes() >= last);
        last = table.symbol_bytes();
    }
}

#[test]
fn iteration_follows_sequence_order() {
    let values = ["Earth", "Water", "Fire", "Air", "Water", "Earth"];
    let table = values.into_iter().collect::<DefaultSymbolTable>();
    assert_eq!(table.len(), 4);

    let collected: Vec<_> = table.iter().map(|(s, v)| (s.to_u32(), v)).collect();
    assert_eq!(
        collected,
        [(1, "Earth"), (2, "Water"), (3, "Fire"), (4, "Air")]
    );
    assert_eq!(table.iter().len(), 4);
}

#[test]
fn tables_with_equal_contents_are_equal() {
    let lhs = ["a", "b", "c"].into_iter().collect::<DefaultSymbolTable>();
    let rhs = ["a", "b", "c"].into_iter().collect::<DefaultSymbolTable>();
    let different = ["c", "b", "a"].into_iter().collect::<DefaultSymbolTable>();
    assert_eq!(lhs, rhs);
    assert_ne!(lhs, different);
}

#[test]
fn custom_hasher_interns() {
    let mut table = FxSymbolTable::new();
    for i in 0..1_000u32 {
        let (sequence, found) = table.try_get_or_intern(&i.to_string()).unwrap();
        assert!(!found);
        assert_eq!(sequence, seq(i + 1));
    }
    for i in 0..1_000u32 {
        assert_eq!(table.get(&i.to_string()), Some(seq(i + 1)));
    }
}

#[cfg(feature = "serde-1")]
mod serde {
    use super::*;

    #[test]
    fn sequence_round_trips_as_u32() {
        let sequence = seq(37);
        let json = serde_json::to_string(&sequence).unwrap();
        assert_eq!(json, "37");
        let back: Sequence = serde_json::from_str(&json).unwrap();
        assert_eq!(back, sequence);
    }

    #[test]
    fn zero_is_rejected() {
        assert!(serde_json::from_str::<Sequence>("0").is_err());
    }

    #[test]
    fn symbol_table_round_trips_as_a_string_sequence() {
        let mut table = DefaultSymbolTable::new();
        for value in ["foo", "bar", "baz", "bar"] {
            table.get_or_intern(value);
        }

        let json = serde_json::to_string(&table).unwrap();
        assert_eq!(json, r#"["foo","bar","baz"]"#);

        let back: DefaultSymbolTable = serde_json::from_str(&json).unwrap();
        assert_eq!(back, table);
        assert_eq!(back.get("bar"), Some(seq(2)));
        assert_eq!(back.resolve(seq(3)), "baz");
    }
}
