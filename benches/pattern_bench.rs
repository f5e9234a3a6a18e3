use criterion::{Criterion, criterion_group, criterion_main};
use fsvault::ignore::{
    DirectoryArena, Entry, FileKind, InsertPosition, Rule, RuleList, classify,
};
use std::hint::black_box;

fn benchmark_pattern_compile(c: &mut Criterion) {
    c.bench_function("compile_literal_glob", |b| {
        b.iter(|| Rule::compile(black_box("./var/log/messages")).unwrap());
    });

    c.bench_function("compile_wildcard_glob", |b| {
        b.iter(|| Rule::compile(black_box("./var/log/**/*.gz")).unwrap());
    });

    c.bench_function("compile_raw_regex", |b| {
        b.iter(|| Rule::compile(black_box("PCRE:./home/[a-s].*~")).unwrap());
    });

    c.bench_function("compile_device_rule", |b| {
        b.iter(|| Rule::compile(black_box("DEVICE:<=0x10:3")).unwrap());
    });
}

fn benchmark_classify(c: &mut Criterion) {
    // A list shaped like a grown configuration: a few broad rules plus many
    // directory-specific ones.
    let mut texts = vec![
        "./proc/".to_string(),
        "./sys/".to_string(),
        "t./var/lib/keep".to_string(),
        "./**~".to_string(),
    ];
    for i in 0..100 {
        texts.push(format!("./srv/site{i}/cache/**"));
    }

    let mut rules = RuleList::new();
    let compiled = texts.iter().map(|t| Rule::compile(t).unwrap()).collect();
    rules.insert(compiled, InsertPosition::End).unwrap();

    let mut arena = DirectoryArena::new();
    let root = arena.push_root(&rules, 0);
    let srv = arena.push_child(&rules, root, 0);
    let site = arena.push_child(&rules, srv, 0);

    let entry = Entry {
        path: "./srv/site42/editor.swp~",
        kind: FileKind::File,
        dev: 0,
        ino: 0,
        parent: Some(site),
    };
    let view = arena.node(site).unwrap().view().clone();

    c.bench_function("classify_against_grown_list", |b| {
        b.iter(|| classify(black_box(&entry), &view, &rules, &arena).unwrap());
    });
}

criterion_group!(benches, benchmark_pattern_compile, benchmark_classify);
criterion_main!(benches);
