use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use safealloc_core::{CycleDetector, ProcessId, RequestEvaluator, ResourceState, SafetyChecker, WaitForGraph};

const RESOURCES: usize = 8;

/// Every process holds one unit of each type and may claim one more;
/// Available covers exactly one process, so the check walks all of them
/// in index order.
fn chain_state(processes: usize) -> ResourceState {
    let claim = vec![vec![2; RESOURCES]; processes];
    let allocation = vec![vec![1; RESOURCES]; processes];
    ResourceState::from_available(claim, allocation, vec![1; RESOURCES]).unwrap()
}

/// Worst case for the restart-from-top scan: only the last unfinished
/// process is eligible each round.
fn reverse_state(processes: usize) -> ResourceState {
    let claim: Vec<Vec<u64>> = (0..processes)
        .map(|i| vec![(processes - i) as u64; RESOURCES])
        .collect();
    let allocation = vec![vec![1; RESOURCES]; processes];
    ResourceState::from_available(claim, allocation, vec![0; RESOURCES]).unwrap()
}

fn bench_safety_check(c: &mut Criterion) {
    let mut group = c.benchmark_group("safety_check");

    for processes in [16, 64, 256].iter() {
        group.throughput(Throughput::Elements(*processes as u64));

        let state = chain_state(*processes);
        group.bench_with_input(BenchmarkId::new("in_order", processes), &state, |b, state| {
            let checker = SafetyChecker::new();
            b.iter(|| black_box(checker.check(state)));
        });

        let state = reverse_state(*processes);
        group.bench_with_input(BenchmarkId::new("reverse", processes), &state, |b, state| {
            let checker = SafetyChecker::new();
            b.iter(|| black_box(checker.check(state)));
        });
    }
    group.finish();
}

fn bench_request_evaluation(c: &mut Criterion) {
    let mut group = c.benchmark_group("request_evaluation");

    for processes in [16, 64, 256].iter() {
        let state = chain_state(*processes);
        let request = vec![1; RESOURCES];
        group.bench_with_input(BenchmarkId::from_parameter(processes), &state, |b, state| {
            let evaluator = RequestEvaluator::default();
            b.iter(|| black_box(evaluator.evaluate(state, ProcessId(0), &request).unwrap()));
        });
    }
    group.finish();
}

fn bench_cycle_detection(c: &mut Criterion) {
    let mut group = c.benchmark_group("cycle_detection");

    for nodes in [100, 1_000, 10_000].iter() {
        let mut ring = WaitForGraph::new(*nodes);
        for i in 0..*nodes {
            ring.add_edge(ProcessId(i), ProcessId((i + 1) % nodes)).unwrap();
        }
        let mut dag = WaitForGraph::new(*nodes);
        for i in 0..*nodes {
            for step in 1..4 {
                if i + step < *nodes {
                    dag.add_edge(ProcessId(i), ProcessId(i + step)).unwrap();
                }
            }
        }

        group.throughput(Throughput::Elements(*nodes as u64));
        group.bench_with_input(BenchmarkId::new("ring", nodes), &ring, |b, graph| {
            b.iter(|| black_box(CycleDetector::detect(graph)));
        });
        group.bench_with_input(BenchmarkId::new("dag", nodes), &dag, |b, graph| {
            b.iter(|| black_box(CycleDetector::detect(graph)));
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_safety_check,
    bench_request_evaluation,
    bench_cycle_detection
);
criterion_main!(benches);
