use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use gw::security::{
    Action, ExecutionContext, GitOp, GithubOp, Intent, ProtectedResourceSet, Registry, SafetyGate,
};

fn bench_evaluate_by_tier(c: &mut Criterion) {
    let mut group = c.benchmark_group("evaluate");
    let gate = SafetyGate::new(Registry::new(), ProtectedResourceSet::default());
    let context = ExecutionContext::new(false, 100);
    let intent = Intent::new(true, true);

    let actions = [
        ("read", Action::git(GitOp::Status)),
        ("write", Action::github(GithubOp::RunCancel).with_target("12345")),
        ("dangerous", Action::git(GitOp::Rebase).with_target("feature")),
        ("protected", Action::git(GitOp::ForcePush).with_target("main")),
        ("unrecognized", Action::parse("git", "filter-branch", None).unwrap()),
    ];

    for (label, action) in &actions {
        group.bench_with_input(BenchmarkId::new("tier", label), action, |b, action| {
            b.iter(|| gate.evaluate(black_box(action), black_box(&intent), black_box(&context)))
        });
    }

    group.finish();
}

fn bench_evaluate_with_rate_limit(c: &mut Criterion) {
    let gate = SafetyGate::new(Registry::new(), ProtectedResourceSet::default());
    let context = ExecutionContext::new(true, 100).with_rate_limit_remaining(Some(42));
    let action = Action::github(GithubOp::PrList);

    c.bench_function("evaluate_with_rate_limit_warning", |b| {
        b.iter(|| gate.evaluate(black_box(&action), black_box(&Intent::read_only()), black_box(&context)))
    });
}

fn bench_classify_registry(c: &mut Criterion) {
    let registry = Registry::new();
    let entries = registry.entries();

    c.bench_function("classify_all_registered", |b| {
        b.iter(|| {
            for (op, _) in &entries {
                black_box(registry.classify(black_box(op)));
            }
        })
    });
}

criterion_group!(
    benches,
    bench_evaluate_by_tier,
    bench_evaluate_with_rate_limit,
    bench_classify_registry
);
criterion_main!(benches);
