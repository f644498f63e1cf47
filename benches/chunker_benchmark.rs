use criterion::{black_box, criterion_group, criterion_main, Criterion};

use docstypo3::{assemble, parse_string, replacements_from_text, scan};

const AUTHOR: &str = "Martin Bless <martin.bless@mbless.de>, T3Docs (https://docs.typo3.org/) \
                      and the TYPO3 Documentation Team, see also: [TYPO3](https://typo3.org/).";

fn long_template() -> (String, Vec<String>) {
    let mut template = String::new();
    let mut hrefs = Vec::new();
    for n in 0..200 {
        let href = format!("https://example.org/page/{}/", n);
        template.push_str(&format!("Item {} ({}) and ", n, href));
        hrefs.push(href);
    }
    template.push_str("the end.");
    (template, hrefs)
}

fn bench_scan(c: &mut Criterion) {
    let hrefs = [
        "martin.bless@mbless.de",
        "https://docs.typo3.org/",
        "https://typo3.org/",
    ];
    c.bench_function("scan_author", |b| {
        b.iter(|| assemble(scan(black_box(AUTHOR), &hrefs)))
    });

    let (template, hrefs) = long_template();
    c.bench_function("scan_200_links", |b| {
        b.iter(|| assemble(scan(black_box(template.as_str()), &hrefs)))
    });
}

fn bench_pipeline(c: &mut Criterion) {
    c.bench_function("parse_author", |b| b.iter(|| parse_string(black_box(AUTHOR))));
    c.bench_function("replacements_author", |b| {
        b.iter(|| replacements_from_text(black_box(AUTHOR)))
    });
}

criterion_group!(benches, bench_scan, bench_pipeline);
criterion_main!(benches);
