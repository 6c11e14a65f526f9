//! Tests for the ingestion pipeline: decoding, normalization, planning,
//! persistence, and the grouping view.

use listsplit::error::SplitError;
use listsplit::pipeline::decoder::{decode, RawRow, TabularFormat};
use listsplit::pipeline::grouping::group_by_agent;
use listsplit::pipeline::normalizer::{normalize, Record};
use listsplit::pipeline::planner::{plan, slot_counts, DISTRIBUTION_FANOUT};
use listsplit::pipeline::writer::{commit, Assignment};
use listsplit::pipeline;
use listsplit::registry::AgentRef;
use listsplit::store::AssignmentStore;
use uuid::Uuid;

fn agents(n: usize) -> Vec<AgentRef> {
    (0..n)
        .map(|i| {
            AgentRef::new(
                &format!("Agent {}", i),
                &format!("agent{}@example.com", i),
                "+15550000000",
            )
        })
        .collect()
}

fn records(n: usize) -> Vec<Record> {
    (0..n)
        .map(|i| Record {
            first_name: format!("Person{}", i),
            phone: format!("55500{:05}", i),
            notes: String::new(),
        })
        .collect()
}

fn raw_row(pairs: &[(&str, &str)]) -> RawRow {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn csv_of(n: usize) -> Vec<u8> {
    let mut data = String::from("firstName,phone,notes\n");
    for i in 0..n {
        data.push_str(&format!("Person{},123456789{},note {}\n", i, i % 10, i));
    }
    data.into_bytes()
}

// =============================================================================
// FileDecoder
// =============================================================================

#[test]
fn test_format_detection() {
    assert_eq!(
        TabularFormat::from_filename("leads.csv").unwrap(),
        TabularFormat::Csv
    );
    assert_eq!(
        TabularFormat::from_filename("LEADS.XLSX").unwrap(),
        TabularFormat::Xlsx
    );
    assert_eq!(
        TabularFormat::from_filename("old.xls").unwrap(),
        TabularFormat::Xls
    );

    let err = TabularFormat::from_filename("leads.txt").unwrap_err();
    assert!(matches!(err, SplitError::UnsupportedFormat(_)));

    let err = TabularFormat::from_filename("no-extension").unwrap_err();
    assert!(matches!(err, SplitError::UnsupportedFormat(_)));
}

#[test]
fn test_decode_csv_trims_and_skips_empty_lines() {
    let data = b"firstName, phone ,notes\n Alice , 123456 , hello \n\nBob,98765,\n";
    let rows = decode(data, "leads.csv").unwrap();

    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["firstName"], "Alice");
    assert_eq!(rows[0]["phone"], "123456");
    assert_eq!(rows[0]["notes"], "hello");
    assert_eq!(rows[1]["firstName"], "Bob");
    assert_eq!(rows[1]["notes"], "");
}

#[test]
fn test_decode_malformed_csv() {
    let data = b"firstName,phone\nAlice,123,extra-column\n";
    let err = decode(data, "leads.csv").unwrap_err();
    assert!(matches!(err, SplitError::Decode(_)));
}

#[test]
fn test_decode_unsupported_extension() {
    let err = decode(b"whatever", "leads.pdf").unwrap_err();
    assert!(matches!(err, SplitError::UnsupportedFormat(_)));
}

// =============================================================================
// RecordNormalizer
// =============================================================================

#[test]
fn test_normalize_header_variants() {
    let rows = vec![
        raw_row(&[("firstName", "Alice"), ("phone", "123456"), ("notes", "a")]),
        raw_row(&[("FirstName", "Bob"), ("Phone", "234567"), ("Notes", "b")]),
        raw_row(&[("firstname", "Carol"), ("PHONE", "345678"), ("NOTES", "c")]),
        raw_row(&[("FIRSTNAME", "Dave"), ("phone", "456789")]),
    ];

    let records = normalize(&rows).unwrap();
    assert_eq!(records.len(), 4);
    assert_eq!(records[0].first_name, "Alice");
    assert_eq!(records[1].first_name, "Bob");
    assert_eq!(records[2].first_name, "Carol");
    assert_eq!(records[3].first_name, "Dave");
    assert_eq!(records[3].notes, "");
}

#[test]
fn test_normalize_reports_first_invalid_row() {
    let rows = vec![
        raw_row(&[("firstName", "Alice"), ("phone", "123456")]),
        raw_row(&[("firstName", "Bob"), ("phone", "234567")]),
        raw_row(&[("firstName", "   "), ("phone", "345678")]),
        raw_row(&[("firstName", "Dave"), ("phone", "not-a-phone")]),
    ];

    let err = normalize(&rows).unwrap_err();
    match err {
        SplitError::Validation { row, field, .. } => {
            assert_eq!(row, 3);
            assert_eq!(field, "firstName");
        }
        other => panic!("expected Validation, got {:?}", other),
    }
}

#[test]
fn test_normalize_phone_rules() {
    for valid in ["+14155550123", "4155550123"] {
        let rows = vec![raw_row(&[("firstName", "Alice"), ("phone", valid)])];
        let records = normalize(&rows).unwrap();
        assert_eq!(records[0].phone, valid);
    }

    for invalid in ["abc123", "", "+", "415 555 0123"] {
        let rows = vec![raw_row(&[("firstName", "Alice"), ("phone", invalid)])];
        let err = normalize(&rows).unwrap_err();
        match err {
            SplitError::Validation { row, field, .. } => {
                assert_eq!(row, 1);
                assert_eq!(field, "phone");
            }
            other => panic!("expected Validation, got {:?}", other),
        }
    }
}

#[test]
fn test_normalize_trims_and_defaults_notes() {
    let rows = vec![raw_row(&[
        ("firstName", "  Alice  "),
        ("phone", " 123456 "),
        ("notes", "  call after 5pm  "),
    ])];

    let records = normalize(&rows).unwrap();
    assert_eq!(records[0].first_name, "Alice");
    assert_eq!(records[0].phone, "123456");
    assert_eq!(records[0].notes, "call after 5pm");
}

// =============================================================================
// DistributionPlanner
// =============================================================================

#[test]
fn test_plan_twelve_records_across_five_agents() {
    let pool = agents(5);
    let result = plan(records(12), &pool, DISTRIBUTION_FANOUT).unwrap();

    let counts: Vec<usize> = result.slices().iter().map(|s| s.records.len()).collect();
    assert_eq!(counts, vec![3, 3, 2, 2, 2]);

    let summary = result.summary();
    assert_eq!(summary.len(), 5);
    for (entry, agent) in summary.iter().zip(&pool) {
        assert_eq!(entry.agent.id, agent.id);
    }
}

#[test]
fn test_plan_zero_records() {
    let result = plan(Vec::new(), &agents(5), DISTRIBUTION_FANOUT).unwrap();

    assert_eq!(result.total(), 0);
    assert_eq!(result.slices().len(), 5);
    assert!(result.summary().is_empty());
}

#[test]
fn test_plan_fewer_records_than_agents() {
    let result = plan(records(3), &agents(5), DISTRIBUTION_FANOUT).unwrap();

    // The partition still accounts for all five agents, but the summary
    // omits the two empty slices.
    assert_eq!(result.slices().len(), 5);
    let counts: Vec<usize> = result.slices().iter().map(|s| s.records.len()).collect();
    assert_eq!(counts, vec![1, 1, 1, 0, 0]);
    assert_eq!(result.summary().len(), 3);
}

#[test]
fn test_plan_insufficient_agents() {
    let err = plan(records(12), &agents(4), DISTRIBUTION_FANOUT).unwrap_err();
    match err {
        SplitError::InsufficientAgents {
            required,
            available,
        } => {
            assert_eq!(required, 5);
            assert_eq!(available, 4);
        }
        other => panic!("expected InsufficientAgents, got {:?}", other),
    }

    // Record count does not matter.
    let err = plan(Vec::new(), &agents(4), DISTRIBUTION_FANOUT).unwrap_err();
    assert!(matches!(err, SplitError::InsufficientAgents { .. }));
}

#[test]
fn test_plan_uses_first_five_agents_only() {
    let pool = agents(7);
    let result = plan(records(12), &pool, DISTRIBUTION_FANOUT).unwrap();

    assert_eq!(result.slices().len(), 5);
    let participating: Vec<Uuid> = result.slices().iter().map(|s| s.agent.id).collect();
    let expected: Vec<Uuid> = pool.iter().take(5).map(|a| a.id).collect();
    assert_eq!(participating, expected);
}

#[test]
fn test_plan_preserves_record_order() {
    let input = records(23);
    let result = plan(input.clone(), &agents(5), DISTRIBUTION_FANOUT).unwrap();

    let concatenated: Vec<Record> = result
        .slices()
        .iter()
        .flat_map(|s| s.records.iter().cloned())
        .collect();
    assert_eq!(concatenated, input);
}

#[test]
fn test_plan_balance_property() {
    for total in 0..=17 {
        let result = plan(records(total), &agents(5), DISTRIBUTION_FANOUT).unwrap();
        let counts: Vec<usize> = result.slices().iter().map(|s| s.records.len()).collect();

        assert_eq!(counts.iter().sum::<usize>(), total, "total {}", total);
        let max = counts.iter().max().unwrap();
        let min = counts.iter().min().unwrap();
        assert!(max - min <= 1, "total {}: counts {:?}", total, counts);
    }
}

#[test]
fn test_slot_counts() {
    assert_eq!(slot_counts(12, 5), vec![3, 3, 2, 2, 2]);
    assert_eq!(slot_counts(0, 5), vec![0, 0, 0, 0, 0]);
    assert_eq!(slot_counts(5, 5), vec![1, 1, 1, 1, 1]);
    assert_eq!(slot_counts(3, 5), vec![1, 1, 1, 0, 0]);
}

// =============================================================================
// AssignmentWriter
// =============================================================================

#[test]
fn test_commit_persists_every_record() {
    let pool = agents(5);
    let result = plan(records(12), &pool, DISTRIBUTION_FANOUT).unwrap();
    let mut store = AssignmentStore::new();

    let (items, summary) = commit(&result, &mut store).unwrap();

    assert_eq!(items.len(), 12);
    assert_eq!(store.len(), 12);
    assert_eq!(summary.iter().map(|e| e.count).sum::<usize>(), 12);

    // Concatenating slices in agent order reproduces the input order.
    let names: Vec<&str> = items.iter().map(|a| a.first_name.as_str()).collect();
    let expected: Vec<String> = (0..12).map(|i| format!("Person{}", i)).collect();
    assert_eq!(names, expected);

    // First agent owns the first three rows.
    assert!(items[..3].iter().all(|a| a.agent_id == pool[0].id));
    assert_eq!(store.for_agent(&pool[0].id).len(), 3);
}

#[test]
fn test_commit_partial_failure_leaves_earlier_writes() {
    let result = plan(records(5), &agents(5), DISTRIBUTION_FANOUT).unwrap();
    let mut store = AssignmentStore::with_capacity(3);

    let err = commit(&result, &mut store).unwrap_err();
    assert!(matches!(err, SplitError::Persistence(_)));

    // Not rolled back: the writes that landed before the failure remain.
    assert_eq!(store.len(), 3);
    assert!(store.is_full());
}

// =============================================================================
// GroupingView
// =============================================================================

#[test]
fn test_group_by_agent_first_seen_order() {
    let a = Uuid::new_v4();
    let b = Uuid::new_v4();
    let c = Uuid::new_v4();

    let make = |agent_id: Uuid, name: &str| {
        Assignment::new(
            agent_id,
            &Record {
                first_name: name.to_string(),
                phone: "123456".to_string(),
                notes: String::new(),
            },
        )
    };

    let input = vec![
        make(a, "one"),
        make(b, "two"),
        make(a, "three"),
        make(c, "four"),
        make(b, "five"),
    ];

    let groups = group_by_agent(&input);

    let order: Vec<Uuid> = groups.iter().map(|g| g.agent_id).collect();
    assert_eq!(order, vec![a, b, c]);

    let a_names: Vec<&str> = groups[0].items.iter().map(|i| i.first_name.as_str()).collect();
    assert_eq!(a_names, vec!["one", "three"]);

    // Flattening in agent-then-record order reproduces the same multiset.
    let mut flattened: Vec<Uuid> = groups
        .iter()
        .flat_map(|g| g.items.iter().map(|i| i.id))
        .collect();
    let mut original: Vec<Uuid> = input.iter().map(|i| i.id).collect();
    flattened.sort();
    original.sort();
    assert_eq!(flattened, original);
}

#[test]
fn test_group_by_agent_empty_input() {
    assert!(group_by_agent(&[]).is_empty());
}

// =============================================================================
// End-to-end ingestion
// =============================================================================

#[test]
fn test_ingest_end_to_end() {
    let pool = agents(5);
    let mut store = AssignmentStore::new();

    let (items, distribution) = pipeline::ingest(
        &csv_of(12),
        "leads.csv",
        &pool,
        DISTRIBUTION_FANOUT,
        &mut store,
    )
    .unwrap();

    assert_eq!(items.len(), 12);
    assert_eq!(store.len(), 12);
    let counts: Vec<usize> = distribution.iter().map(|e| e.count).collect();
    assert_eq!(counts, vec![3, 3, 2, 2, 2]);
}

#[test]
fn test_ingest_validation_failure_never_persists() {
    let pool = agents(5);
    let mut store = AssignmentStore::new();

    let data = b"firstName,phone\nAlice,123456\nBob,123456\n,123456\n";
    let err = pipeline::ingest(data, "leads.csv", &pool, DISTRIBUTION_FANOUT, &mut store)
        .unwrap_err();

    assert!(matches!(err, SplitError::Validation { row: 3, .. }));
    assert!(store.is_empty());
}

#[test]
fn test_ingest_batches_are_independent() {
    let pool = agents(5);
    let mut store = AssignmentStore::new();

    pipeline::ingest(&csv_of(12), "a.csv", &pool, DISTRIBUTION_FANOUT, &mut store).unwrap();
    let (_, second) =
        pipeline::ingest(&csv_of(7), "b.csv", &pool, DISTRIBUTION_FANOUT, &mut store).unwrap();

    // The second batch partitions from zero: no running balance carries over.
    let counts: Vec<usize> = second.iter().map(|e| e.count).collect();
    assert_eq!(counts, vec![2, 2, 1, 1, 1]);
    assert_eq!(store.len(), 19);
}
