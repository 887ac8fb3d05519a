use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use bufplan_core::{BufferAllocator, GraphModel, OperationNode, Planner, TopologicalSorter};

/// Layered graph: every node reads up to three nodes of the previous layer.
fn layered_graph(layers: usize, width: usize) -> GraphModel {
    let mut nodes = Vec::with_capacity(layers * width);
    for layer in 0..layers {
        for column in 0..width {
            let inputs: Vec<String> = if layer == 0 {
                Vec::new()
            } else {
                (0..3)
                    .map(|k| format!("n{}_{}", layer - 1, (column + k) % width))
                    .collect()
            };
            nodes.push(OperationNode::new(format!("n{layer}_{column}"), inputs));
        }
    }
    // Declared back to front so the sorter has to reorder everything.
    nodes.reverse();
    GraphModel::new(nodes).expect("layered graph is closed")
}

fn bench_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("pipeline");
    for &(layers, width) in &[(16, 16), (64, 32), (256, 64)] {
        let graph = layered_graph(layers, width);
        let order = TopologicalSorter::default()
            .sort(&graph)
            .expect("layered graph is acyclic");
        let id = format!("{layers}x{width}");

        group.bench_with_input(BenchmarkId::new("sort", &id), &graph, |b, graph| {
            b.iter(|| TopologicalSorter::default().sort(black_box(graph)))
        });
        group.bench_with_input(BenchmarkId::new("allocate", &id), &order, |b, order| {
            b.iter(|| BufferAllocator::new().allocate(black_box(order)))
        });
        group.bench_with_input(BenchmarkId::new("plan", &id), &graph, |b, graph| {
            b.iter(|| Planner::default().plan(black_box(graph)))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_pipeline);
criterion_main!(benches);
