//! Property-based tests (proptest): interning, column round-trips, and set
//! semantics of the in-memory relation.

use proptest::prelude::*;
use std::collections::BTreeSet;
use std::sync::Arc;

use factlayer::{AttrType, Attribute, MemoryRelation, Relation, RelationSchema, SymbolTable, Tuple};

fn row_relation() -> MemoryRelation {
    MemoryRelation::new(
        RelationSchema::new(
            "row",
            vec![
                Attribute::new("s", AttrType::Symbol),
                Attribute::new("i", AttrType::Signed),
                Attribute::new("u", AttrType::Unsigned),
                Attribute::new("r", AttrType::Float),
            ],
        ),
        Arc::new(SymbolTable::new()),
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Distinct strings get distinct ids; repeated interning is stable
    #[test]
    fn prop_interning_distinct_and_stable(a in ".*", b in ".*") {
        let table = SymbolTable::new();
        let id_a = table.lookup(&a);
        let id_b = table.lookup(&b);
        prop_assert_eq!(table.lookup(&a), id_a);
        prop_assert_eq!(id_a == id_b, a == b);
        prop_assert_eq!(table.resolve(id_a), a);
    }

    /// Whatever is written column by column reads back unchanged after rewind
    #[test]
    fn prop_column_round_trip(
        s in "[a-z]{0,12}",
        i in any::<i32>(),
        u in any::<u32>(),
        r in any::<f32>().prop_filter("NaN has no equality", |f| !f.is_nan()),
    ) {
        let rel = row_relation();
        let mut t = Tuple::new(&rel);
        t.append_symbol(&s).append_number(i).append_unsigned(u).append_float(r);
        t.rewind();
        prop_assert_eq!(t.read_symbol(), s);
        prop_assert_eq!(t.read_number(), i);
        prop_assert_eq!(t.read_unsigned(), u);
        prop_assert_eq!(t.read_float(), r);
    }

    /// Size equals the number of distinct inserted tuples, each visited once
    #[test]
    fn prop_set_semantics(pairs in prop::collection::vec((0i32..20, 0i32..20), 0..60)) {
        let rel = MemoryRelation::new(
            RelationSchema::new(
                "pair",
                vec![Attribute::new("a", AttrType::Signed), Attribute::new("b", AttrType::Signed)],
            ),
            Arc::new(SymbolTable::new()),
        );
        for (a, b) in &pairs {
            rel.insert(&Tuple::from_values(&rel, [*a, *b]).unwrap());
        }

        let expected: BTreeSet<Vec<i32>> = pairs.iter().map(|(a, b)| vec![*a, *b]).collect();
        let visited: Vec<Vec<i32>> = rel.iter().map(Tuple::into_values).collect();
        prop_assert_eq!(rel.size(), expected.len());
        prop_assert_eq!(visited, expected.into_iter().collect::<Vec<_>>());
    }
}
