use std::fs;
use std::path::Path;

use tempfile::TempDir;

use tabular_report::aggregate::{AdvancedOptions, BasicOptions, Metric, MetricSpec};
use tabular_report::ingest::{NullObserver, SkipReason};
use tabular_report::parsers::ParserRegistry;
use tabular_report::pipeline::{advanced_report, basic_report, run_basic};
use tabular_report::types::{DataType, Value};

fn write(dir: &Path, name: &str, contents: &str) {
    fs::write(dir.join(name), contents).unwrap();
}

fn sort_by_id() -> BasicOptions {
    BasicOptions {
        sort_by: vec!["id".to_string()],
    }
}

#[test]
fn basic_report_merges_and_skips_unsupported_extensions() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "a.csv", "id,name\n1,x\n2,y\n");
    write(dir.path(), "b.xyz", "whatever\n");

    let registry = ParserRegistry::with_builtin_formats();
    let out = dir.path().join("report.tsv");
    let report = run_basic(dir.path(), &out, &registry, &sort_by_id(), &NullObserver).unwrap();

    assert_eq!(report.files_ingested, 1);
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(
        report.skipped[0].reason,
        SkipReason::UnsupportedFormat {
            extension: "xyz".to_string()
        }
    );

    let tsv = fs::read_to_string(&out).unwrap();
    assert_eq!(tsv, "id\tname\n1\tx\n2\ty\n");
}

#[test]
fn malformed_file_is_skipped_and_later_files_still_ingest() {
    let dir = TempDir::new().unwrap();
    // Second record has the wrong field count, which fails mid-stream; the
    // whole file must be dropped, including its first (valid) row.
    write(dir.path(), "bad.csv", "id,name\n1,x\n2\n");
    write(dir.path(), "good.csv", "id,name\n3,z\n");

    let registry = ParserRegistry::with_builtin_formats();
    let (result, report) =
        basic_report(dir.path(), &registry, &sort_by_id(), &NullObserver).unwrap();

    assert_eq!(report.files_ingested, 1);
    assert_eq!(report.skipped.len(), 1);
    assert!(matches!(
        report.skipped[0].reason,
        SkipReason::Malformed { .. }
    ));
    assert_eq!(result.rows, vec![vec![Value::Int64(3), Value::Utf8("z".into())]]);
}

#[test]
fn missing_columns_are_padded_with_the_null_sentinel() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "a.csv", "id,name\n1,x\n");
    write(dir.path(), "b.csv", "id\n2\n");

    let registry = ParserRegistry::with_builtin_formats();
    let out = dir.path().join("report.tsv");
    run_basic(dir.path(), &out, &registry, &sort_by_id(), &NullObserver).unwrap();

    let tsv = fs::read_to_string(&out).unwrap();
    // The null sentinel serializes as an empty field.
    assert_eq!(tsv, "id\tname\n1\tx\n2\t\n");
}

#[test]
fn conflicting_column_types_widen_without_rejecting_rows() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "ints.csv", "key,amount\na,1\nb,2\n");
    write(dir.path(), "floats.csv", "key,amount\na,0.5\n");

    let registry = ParserRegistry::with_builtin_formats();
    let options = AdvancedOptions {
        group_by: vec!["key".to_string()],
        metrics: vec![MetricSpec::new("amount", Metric::Sum)],
    };
    let (result, report) =
        advanced_report(dir.path(), &registry, &options, &NullObserver).unwrap();

    assert!(report.skipped.is_empty());
    assert_eq!(report.rows_ingested, 3);
    // amount widened to float, so the sum is a float even for the int rows.
    assert_eq!(result.schema.fields[1].data_type, DataType::Float64);
    assert_eq!(
        result.rows,
        vec![
            vec![Value::Utf8("a".into()), Value::Float64(1.5)],
            vec![Value::Utf8("b".into()), Value::Float64(2.0)],
        ]
    );
}

#[test]
fn mixed_formats_unify_into_one_report() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "one.csv", "id,name\n1,ada\n");
    write(dir.path(), "two.json", r#"[{"id": 2, "name": "grace"}]"#);
    write(dir.path(), "three.fwf", "id  name\n3   hopper\n");

    let registry = ParserRegistry::with_builtin_formats();
    let (result, report) =
        basic_report(dir.path(), &registry, &sort_by_id(), &NullObserver).unwrap();

    assert_eq!(report.files_ingested, 3);
    let ids: Vec<&Value> = result.rows.iter().map(|r| &r[0]).collect();
    assert_eq!(
        ids,
        vec![&Value::Int64(1), &Value::Int64(2), &Value::Int64(3)]
    );
}

#[test]
fn rerunning_the_pipeline_is_byte_identical() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "a.csv", "id,name\n2,y\n1,x\n");
    write(dir.path(), "b.json", r#"[{"id": 3, "name": "z"}]"#);

    let registry = ParserRegistry::with_builtin_formats();
    // Reports go elsewhere so the second run sees an unchanged input dir.
    let out_dir = TempDir::new().unwrap();
    let out1 = out_dir.path().join("run1.tsv");
    let out2 = out_dir.path().join("run2.tsv");
    run_basic(dir.path(), &out1, &registry, &sort_by_id(), &NullObserver).unwrap();
    run_basic(dir.path(), &out2, &registry, &sort_by_id(), &NullObserver).unwrap();

    assert_eq!(fs::read(&out1).unwrap(), fs::read(&out2).unwrap());
}

#[test]
fn advanced_result_is_invariant_under_file_permutation() {
    let contents_a = "region,amount\neast,1\nwest,2\n";
    let contents_b = "region,amount\neast,10\n";

    let registry = ParserRegistry::with_builtin_formats();
    let options = AdvancedOptions {
        group_by: vec!["region".to_string()],
        metrics: vec![
            MetricSpec::new("amount", Metric::Sum),
            MetricSpec::new("amount", Metric::Count),
        ],
    };

    // Same file set, opposite enumeration order (files are visited sorted by
    // name).
    let dir1 = TempDir::new().unwrap();
    write(dir1.path(), "1.csv", contents_a);
    write(dir1.path(), "2.csv", contents_b);
    let dir2 = TempDir::new().unwrap();
    write(dir2.path(), "1.csv", contents_b);
    write(dir2.path(), "2.csv", contents_a);

    let (result1, _) = advanced_report(dir1.path(), &registry, &options, &NullObserver).unwrap();
    let (result2, _) = advanced_report(dir2.path(), &registry, &options, &NullObserver).unwrap();

    assert_eq!(result1, result2);
    assert_eq!(
        result1.rows,
        vec![
            vec![Value::Utf8("east".into()), Value::Int64(11), Value::Int64(2)],
            vec![Value::Utf8("west".into()), Value::Int64(2), Value::Int64(1)],
        ]
    );
}

#[test]
fn empty_directory_produces_header_free_empty_report() {
    let dir = TempDir::new().unwrap();
    let registry = ParserRegistry::with_builtin_formats();
    let (result, report) =
        basic_report(dir.path(), &registry, &BasicOptions::default(), &NullObserver).unwrap();

    assert_eq!(report.files_ingested, 0);
    assert_eq!(result.schema.width(), 0);
    assert!(result.rows.is_empty());
}
