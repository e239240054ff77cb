#![allow(missing_docs)]

use backtrack::{Arg, Config, Database};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn setup_large_graph() -> Database<&'static str, u32> {
    let mut db = Database::with_config(Config::default().with_max_depth(256));

    // Each node links to the next five, wrapping around
    for i in 0..1000u32 {
        for j in 0..5 {
            db.add_fact("edge", [i, (i + j + 1) % 1000]);
        }
    }

    // two_hop(x, z) :- edge(x, y), edge(y, z)
    let mut rule = db.add_rule("two_hop", [Arg::Var, Arg::Var]).expect("fresh head");
    let (x, z) = (rule.params()[0], rule.params()[1]);
    let y = rule.var();
    rule.and("edge", [Arg::Term(x), Arg::Term(y)])
        .and_then(|rule| rule.and("edge", [Arg::Term(y), Arg::Term(z)]))
        .expect("own variables");

    // path(x, y) :- edge(x, y)
    // path(x, z) :- edge(x, y), path(y, z)
    let mut base = db.add_rule("path", [Arg::Var, Arg::Var]).expect("fresh head");
    let (x, y) = (base.params()[0], base.params()[1]);
    base.and("edge", [Arg::Term(x), Arg::Term(y)])
        .expect("own variables");
    let mut step = db.add_rule("path", [Arg::Var, Arg::Var]).expect("fresh head");
    let (x, z) = (step.params()[0], step.params()[1]);
    let y = step.var();
    step.and("edge", [Arg::Term(x), Arg::Term(y)])
        .and_then(|step| step.and("path", [Arg::Term(y), Arg::Term(z)]))
        .expect("own variables");

    db
}

fn query_specific_fact(c: &mut Criterion) {
    let mut db = setup_large_graph();
    let from = db.constant(500);
    let to = db.var();

    c.bench_function("query_specific_fact", |b| {
        b.iter(|| {
            let found = db.query("edge", 2, &[from, to]);
            db.unbind(to).expect("query variable");
            black_box(found)
        });
    });
}

fn query_two_hop_existence(c: &mut Criterion) {
    let mut db = setup_large_graph();
    let from = db.constant(0);
    let to = db.constant(10);

    c.bench_function("query_two_hop_existence", |b| {
        b.iter(|| black_box(db.query("two_hop", 2, &[from, to])));
    });
}

fn query_path_existence(c: &mut Criterion) {
    let mut db = setup_large_graph();
    let from = db.constant(0);
    let to = db.constant(100);

    c.bench_function("query_path_existence", |b| {
        b.iter(|| black_box(db.query("path", 2, &[from, to])));
    });
}

fn query_all_edges(c: &mut Criterion) {
    let mut db = setup_large_graph();
    let from = db.var();
    let to = db.var();

    c.bench_function("query_all_edges", |b| {
        b.iter(|| black_box(db.query_all("edge", 2, &[from, to])));
    });
}

criterion_group!(
    benches,
    query_specific_fact,
    query_two_hop_existence,
    query_path_existence,
    query_all_edges
);
criterion_main!(benches);
