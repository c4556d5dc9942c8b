//! Serializer and dispatcher benchmarks using criterion.

use std::hint::black_box;
use std::sync::Arc;

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use probe_core::math::{Quaternion, Vector3};
use probe_core::{
    BridgeConfig, IdentityCache, Introspectable, MainLoopDispatcher, ToValue, ValueSerializer,
};

#[derive(Introspectable)]
#[introspect(property(speed: f32))]
struct Body {
    mass: f32,
    velocity: Vector3,
    rotation: Quaternion,
    samples: Vec<f32>,
    tags: Vec<String>,
}

impl Body {
    fn speed(&self) -> f32 {
        self.velocity.length()
    }
}

fn body(samples: usize) -> Body {
    Body {
        mass: 80.0,
        velocity: Vector3::new(1.0, 0.0, 3.0),
        rotation: Quaternion::from_yaw(90.0),
        samples: (0..samples).map(|i| i as f32).collect(),
        tags: vec!["player".to_owned(), "local".to_owned()],
    }
}

fn serializer() -> ValueSerializer {
    ValueSerializer::new(Arc::new(IdentityCache::new()), &BridgeConfig::default())
}

fn serialize_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("serialize");
    let s = serializer();

    for len in [10, 20, 1000] {
        let values: Vec<Vec<i64>> = (0..len).map(|i| vec![i; 10]).collect();
        group.bench_with_input(BenchmarkId::new("nested_vec", len), &values, |b, values| {
            b.iter(|| black_box(s.serialize(&values.to_value(), 2)));
        });
    }

    for samples in [5, 50] {
        let target = body(samples);
        group.bench_with_input(
            BenchmarkId::new("dump_members", samples),
            &target,
            |b, target| {
                b.iter(|| black_box(s.dump_members(target, 2)));
            },
        );
    }

    group.finish();
}

fn dispatcher_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("dispatcher");

    for count in [100u64, 10_000] {
        group.throughput(Throughput::Elements(count));

        group.bench_with_input(
            BenchmarkId::new("enqueue_drain", count),
            &count,
            |b, &count| {
                let dispatcher = MainLoopDispatcher::<u64>::new();
                b.iter(|| {
                    for i in 0..count {
                        dispatcher.enqueue(move |sum| *sum += i);
                    }
                    let mut sum = 0;
                    black_box(dispatcher.drain(&mut sum));
                    black_box(sum)
                });
            },
        );
    }

    group.finish();
}

criterion_group!(benches, serialize_benchmarks, dispatcher_benchmarks);

criterion_main!(benches);
