//! Benchmarks for navigation building and heading extraction.

#![allow(clippy::format_push_string)] // Benchmark setup code, performance not critical

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use xeo_site::{HeadingExtractor, NavGroup, NavItem, NavigationTree};

/// Navigation with `groups` groups of `breadth` entries, each with `breadth`
/// children.
fn generate_navigation(groups: usize, breadth: usize) -> Vec<NavGroup> {
    (0..groups)
        .map(|g| NavGroup {
            title: format!("Group {g}"),
            items: (0..breadth)
                .map(|i| {
                    let href = format!("/g{g}/section-{i}/README");
                    let children = (0..breadth)
                        .map(|j| {
                            NavItem::new(format!("Page {j}"), format!("/g{g}/section-{i}/page-{j}"))
                        })
                        .collect();
                    NavItem::new(format!("Section {i}"), href).with_items(children)
                })
                .collect(),
        })
        .collect()
}

/// Markdown with `sections` level-2 headings and a code block per section.
fn generate_markdown(sections: usize) -> String {
    let mut md = String::from("# Document Title\n\n");
    for i in 0..sections {
        md.push_str(&format!("## Section `{i}`\n\n"));
        md.push_str("Some text with **bold** words.\n\n```sh\n# not a heading\n```\n\n");
        md.push_str(&format!("### Detail {i}\n\nMore text.\n\n"));
    }
    md
}

fn bench_build_tree(c: &mut Criterion) {
    let mut group = c.benchmark_group("navigation_build");

    for breadth in [5, 10, 20] {
        let groups = generate_navigation(4, breadth);
        group.bench_with_input(BenchmarkId::from_parameter(breadth), &groups, |b, groups| {
            b.iter(|| NavigationTree::build(groups));
        });
    }

    group.finish();
}

fn bench_lookup(c: &mut Criterion) {
    let tree = NavigationTree::build(&generate_navigation(4, 20));
    let mut group = c.benchmark_group("navigation_lookup");

    group.bench_function("neighbors_hit", |b| {
        b.iter(|| tree.neighbors("/g3/section-19/page-10"));
    });
    group.bench_function("first_descendant", |b| {
        b.iter(|| tree.first_descendant("/g3"));
    });

    group.finish();
}

fn bench_extract_headings(c: &mut Criterion) {
    let mut group = c.benchmark_group("heading_extraction");

    for sections in [10, 100, 1000] {
        let markdown = generate_markdown(sections);
        group.throughput(Throughput::Bytes(markdown.len() as u64));

        group.bench_with_input(BenchmarkId::new("plain", sections), &markdown, |b, md| {
            let extractor = HeadingExtractor::new();
            b.iter(|| extractor.extract(md));
        });
        group.bench_with_input(BenchmarkId::new("skip_fences", sections), &markdown, |b, md| {
            let extractor = HeadingExtractor::new().with_skip_code_fences(true);
            b.iter(|| extractor.extract(md));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_build_tree, bench_lookup, bench_extract_headings);
criterion_main!(benches);
