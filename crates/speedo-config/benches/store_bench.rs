//! Criterion benchmarks for the settings store.
//!
//! Measures parsing and diff-merging of a settings file shaped like the HUD's
//! own (three sections, a few dozen keys, comments), plus a full
//! set-and-flush cycle against a temp directory.
//!
//! Run with:
//! ```bash
//! cargo bench --package speedo-config --bench store_bench
//! ```

use std::fmt::Write as _;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use speedo_config::document::{merge::merge_document, parse_document};
use speedo_config::{ConfigStore, FlushPolicy, LoadPolicy, TypedAccess};

// ── Fixtures ──────────────────────────────────────────────────────────────────

fn settings_text(extra_keys: usize) -> String {
    let mut text = String::from(
        "; Speedometer settings\n\
         [Core]\nUseMph=False\nDisplayMode=1\nEnableMenu=True\nMenuKey=F6\n\
         EnableSaving=True\nRainbowMode=0\nOnfootSpeedo=False\n\n\
         [UI]\nVertAlign=Bottom\nHorzAlign=Center\nOffsetX=0\nOffsetY=0\n\
         PanelWidth=66\nPanelHeight=24\nFontSize=0.5\nFontStyle=4\n\n\
         [Text]\nKphText=km/h\nMphText=mph\n",
    );
    text.push_str("\n[Extra]\n");
    for i in 0..extra_keys {
        let _ = writeln!(text, "Key{i}={i}");
    }
    text
}

// ── Benchmarks ────────────────────────────────────────────────────────────────

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_document");
    for extra in [0_usize, 100, 1000] {
        let text = settings_text(extra);
        group.bench_with_input(BenchmarkId::from_parameter(extra), &text, |b, text| {
            b.iter(|| parse_document(black_box(text)))
        });
    }
    group.finish();
}

fn bench_merge(c: &mut Criterion) {
    let original = settings_text(100);
    let dirty = parse_document("[Core]\nDisplayMode=2\nNewKey=1\n[Stats]\nDistanceKm=42.5\n");

    c.bench_function("merge_document_100_extra", |b| {
        b.iter(|| merge_document(black_box(Some(&original)), black_box(&dirty)))
    });
}

fn bench_set_and_flush(c: &mut Criterion) {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("bench.ini");
    std::fs::write(&path, settings_text(0)).expect("write fixture");
    let store = ConfigStore::open(&path, LoadPolicy::Eager, FlushPolicy::Manual).expect("open");

    let mut mode = 0;
    c.bench_function("set_value_and_flush", |b| {
        b.iter(|| {
            mode = (mode + 1) % 3;
            store.set_value("Core", "DisplayMode", mode).expect("set");
            store.flush().expect("flush")
        })
    });
}

criterion_group!(benches, bench_parse, bench_merge, bench_set_and_flush);
criterion_main!(benches);
