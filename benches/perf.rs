use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};
use scraper::Html;

use octagon_stats::fight_parse::{parse_fight_details, parse_round_totals, parse_sig_stats};
use octagon_stats::normalize::normalize_division_and_type;
use octagon_stats::page;

const FIGHT_PAGE: &str = include_str!("../tests/fixtures/fight_3round_decision.html");

fn bench_document_parse(c: &mut Criterion) {
    c.bench_function("document_parse", |b| {
        b.iter(|| {
            let doc = Html::parse_document(black_box(FIGHT_PAGE));
            black_box(page::table_count(&doc));
        })
    });
}

fn bench_fight_details(c: &mut Criterion) {
    let doc = Html::parse_document(FIGHT_PAGE);
    c.bench_function("fight_details", |b| {
        b.iter(|| {
            let parsed = parse_fight_details(black_box(&doc), "ev", "uid").unwrap();
            black_box(parsed.result.fighter1_uid.len());
        })
    });
}

fn bench_round_tables(c: &mut Criterion) {
    let doc = Html::parse_document(FIGHT_PAGE);
    c.bench_function("round_tables", |b| {
        b.iter(|| {
            let totals = parse_round_totals(black_box(&doc), "uid").unwrap();
            let sig = parse_sig_stats(black_box(&doc), "uid").unwrap();
            black_box(totals.result.len() + sig.result.len());
        })
    });
}

fn bench_division_grammar(c: &mut Criterion) {
    let titles = [
        "UFC Heavyweight Bout",
        "UFC Women's Strawweight Title Bout",
        "UFC 229 Lightweight Title Bout",
        "UFC Superfight Championship Bout",
    ];
    c.bench_function("division_grammar", |b| {
        b.iter(|| {
            for title in titles {
                black_box(normalize_division_and_type(black_box(title)));
            }
        })
    });
}

criterion_group!(
    benches,
    bench_document_parse,
    bench_fight_details,
    bench_round_tables,
    bench_division_grammar
);
criterion_main!(benches);
