// Copyright 2025 the Undercoat Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Benchmarks for `undercoat_props` + `undercoat_cascade`.

use criterion::{BatchSize, BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use std::sync::Once;

use undercoat_cascade::{CompiledOutput, Consumer, Session, SessionConfig};
use undercoat_props::{FieldId, PropertyBlock, PropertySet, PropsId, Tolerance, Value};

/// A consumer that only keeps an identity; applying is free.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
struct Part(u32);

impl Consumer for Part {
    fn apply_output(&self, block: &PropertyBlock) {
        black_box(block);
    }

    fn is_alive(&self) -> bool {
        true
    }
}

/// `parts` consumers, each with the same `layers` property sets applied.
fn populated(parts: u32, layers: i32, fields: i32) -> (Session<Part>, Vec<PropsId>) {
    let mut session = Session::new(SessionConfig::default(), || {});
    let sets: Vec<_> = (0..layers).map(|p| session.create_props(p)).collect();
    for (layer, props) in sets.iter().enumerate() {
        for field in 0..fields {
            session
                .set_float(*props, FieldId::new(field), layer as f32)
                .unwrap();
        }
    }
    for part in 0..parts {
        for props in &sets {
            session.set(&Part(part), *props);
        }
    }
    session.tick();
    (session, sets)
}

fn bench_props(c: &mut Criterion) {
    static PRINT_SIZES: Once = Once::new();
    PRINT_SIZES.call_once(|| {
        eprintln!(
            "sizes: Value={} PropertySet={} CompiledOutput<Part>={}",
            size_of::<Value>(),
            size_of::<PropertySet>(),
            size_of::<CompiledOutput<Part>>(),
        );
    });

    let mut group = c.benchmark_group("props/set");
    let tol = Tolerance::DEFAULT;

    group.bench_function("insert_8", |b| {
        b.iter_batched(
            || PropertySet::new(PropsId::from_serial(0), 0),
            |mut set| {
                for field in 0..8 {
                    set.set(FieldId::new(field), Value::Float(1.0), &tol);
                }
                black_box(set)
            },
            BatchSize::SmallInput,
        )
    });

    group.bench_function("unchanged", |b| {
        let mut set = PropertySet::new(PropsId::from_serial(0), 0);
        set.set(FieldId::new(3), Value::Float(1.0), &tol);
        let _ = set.finish_batch();
        b.iter(|| black_box(set.set(FieldId::new(3), Value::Float(1.000_01), &tol)))
    });

    group.finish();
}

fn bench_cascade(c: &mut Criterion) {
    let mut group = c.benchmark_group("cascade/build");

    for parts in [16_u32, 256] {
        group.bench_function(BenchmarkId::new("shared", parts), |b| {
            b.iter(|| black_box(populated(parts, 4, 8)))
        });
    }

    group.finish();

    let mut group = c.benchmark_group("cascade/frame");

    group.bench_function("value_change_owner", |b| {
        let (mut session, sets) = populated(256, 4, 8);
        let top = *sets.last().unwrap();
        let mut value = 0.0_f32;
        b.iter(|| {
            value += 1.0;
            session.set_float(top, FieldId::new(0), value).unwrap();
            black_box(session.tick())
        })
    });

    group.bench_function("value_change_shadowed", |b| {
        let (mut session, sets) = populated(256, 4, 8);
        let bottom = sets[0];
        let mut value = 0.0_f32;
        b.iter(|| {
            value += 1.0;
            session.set_float(bottom, FieldId::new(0), value).unwrap();
            black_box(session.tick())
        })
    });

    group.bench_function("structural_change", |b| {
        let (mut session, sets) = populated(256, 4, 8);
        let top = *sets.last().unwrap();
        let mut present = true;
        b.iter(|| {
            if present {
                session.remove_field(top, FieldId::new(0)).unwrap();
            } else {
                session.set_float(top, FieldId::new(0), 1.0).unwrap();
            }
            present = !present;
            black_box(session.tick())
        })
    });

    group.bench_function("membership_toggle", |b| {
        let (mut session, sets) = populated(256, 4, 8);
        let part = Part(0);
        let top = *sets.last().unwrap();
        b.iter(|| {
            session.remove(&part, top);
            session.set(&part, top);
        })
    });

    group.finish();
}

criterion_group!(benches, bench_props, bench_cascade);
criterion_main!(benches);
