use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use panconf::{Document, Format, RenderOptions};

const RUNNING_CONFIG: &str = include_str!("../tests/fixtures/running-config.xml");

fn bench_formats(c: &mut Criterion) {
    let Ok(doc) = Document::parse(RUNNING_CONFIG) else {
        return;
    };
    for format in Format::ALL {
        let options = match format {
            Format::Flat => RenderOptions::default().with_prefix("/"),
            Format::Commands => RenderOptions::default()
                .with_prefix("set ")
                .with_member_list(true),
            Format::Xml | Format::Structure => RenderOptions::default(),
        };
        c.bench_function(&format!("panconf_render_{}", format.name()), |b| {
            b.iter(|| doc.render(black_box(format), None, &options))
        });
    }
}

criterion_group!(benches, bench_formats);
criterion_main!(benches);
