#![allow(clippy::expect_used)]

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use std::fmt::Write;
use xmlgrove::{serial, Document};

// ---------------------------------------------------------------------------
// Document generators
// ---------------------------------------------------------------------------

/// Generates a flat XML document with the given number of records.
fn make_records_xml(count: usize) -> String {
    let mut xml = String::from("<database>\n");
    for i in 0..count {
        let _ = writeln!(
            xml,
            "  <record id=\"{i}\"><name>Record {i}</name>\
             <value>{}</value><status>active</status></record>",
            i * 42
        );
    }
    xml.push_str("</database>\n");
    xml
}

/// Generates a document nested to the given depth.
fn make_nested_xml(depth: usize) -> String {
    let mut xml = String::new();
    for i in 0..depth {
        let _ = write!(xml, "<level n=\"{i}\">");
    }
    xml.push_str("bottom");
    for _ in 0..depth {
        xml.push_str("</level>");
    }
    xml
}

// ---------------------------------------------------------------------------
// Benchmarks
// ---------------------------------------------------------------------------

fn bench_parse(c: &mut Criterion) {
    let small = make_records_xml(10);
    let large = make_records_xml(1000);
    let nested = make_nested_xml(100);

    c.bench_function("parse_small", |b| {
        b.iter(|| {
            let mut doc = Document::new();
            doc.parse(black_box(&small)).expect("parse failed");
            black_box(doc.node_count())
        });
    });

    c.bench_function("parse_large", |b| {
        b.iter(|| {
            let mut doc = Document::new();
            doc.parse(black_box(&large)).expect("parse failed");
            black_box(doc.node_count())
        });
    });

    c.bench_function("parse_nested", |b| {
        b.iter(|| {
            let mut doc = Document::new();
            doc.parse(black_box(&nested)).expect("parse failed");
            black_box(doc.node_count())
        });
    });
}

fn bench_reparse_warm(c: &mut Criterion) {
    let large = make_records_xml(1000);

    c.bench_function("reparse_warm", |b| {
        let mut doc = Document::new();
        doc.parse(&large).expect("parse failed");
        b.iter(|| {
            doc.parse(black_box(&large)).expect("parse failed");
            black_box(doc.node_count())
        });
    });
}

fn bench_query(c: &mut Criterion) {
    let large = make_records_xml(1000);
    let mut doc = Document::new();
    doc.parse(&large).expect("parse failed");

    c.bench_function("query_descendant", |b| {
        b.iter(|| black_box(doc.query().descendant("name").count()));
    });

    c.bench_function("query_chain_with_filter", |b| {
        b.iter(|| {
            black_box(
                doc.query()
                    .child("database")
                    .child("record")
                    .filter(|n| n.attribute("id").is_some_and(|v| v.ends_with('7')))
                    .count(),
            )
        });
    });
}

fn bench_build_and_print(c: &mut Criterion) {
    c.bench_function("build_and_print", |b| {
        b.iter(|| {
            let mut doc = Document::new();
            let mut tree = doc.tree();
            let mut root = tree.element(None, "database", None);
            for i in 0..200 {
                let mut rec = root.element(None, "record", None);
                rec.attribute(None, "id", &i.to_string());
                rec.element(None, "name", Some("generated"));
            }
            black_box(serial::serialize(&doc))
        });
    });
}

criterion_group!(
    benches,
    bench_parse,
    bench_reparse_warm,
    bench_query,
    bench_build_and_print
);
criterion_main!(benches);
