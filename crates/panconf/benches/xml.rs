use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use panconf::{Document, Selector};

const SIMPLE_XML: &str = "<config version=\"10.1.0\"><shared/></config>";
const RUNNING_CONFIG: &str = include_str!("../tests/fixtures/running-config.xml");

fn bench_simple(c: &mut Criterion) {
    c.bench_function("panconf_xml_simple", |b| {
        b.iter(|| Document::parse(black_box(SIMPLE_XML)))
    });
}

fn bench_running_config(c: &mut Criterion) {
    c.bench_function("panconf_xml_running_config", |b| {
        b.iter(|| Document::parse(black_box(RUNNING_CONFIG)))
    });
}

fn bench_select(c: &mut Criterion) {
    let Ok(doc) = Document::parse(RUNNING_CONFIG) else {
        return;
    };
    let Ok(selector) = Selector::parse(".//vsys/entry[@name='vsys1']/rulebase") else {
        return;
    };
    c.bench_function("panconf_select_descendant", |b| {
        b.iter(|| selector.select(black_box(doc.root())))
    });
}

criterion_group!(benches, bench_simple, bench_running_config, bench_select);
criterion_main!(benches);
