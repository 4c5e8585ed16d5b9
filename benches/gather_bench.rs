use std::path::Path;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use field_gather::prelude::*;
use num_complex::Complex64;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

fn unit_cube() -> Region {
    Region::new(Vector::zero(), Vector::new(1.0, 1.0, 1.0))
}

fn eval(_: Component, p: Vector) -> Complex64 {
    let (x, y, z) = (p[Direction::X], p[Direction::Y], p[Direction::Z]);
    Complex64::new(x * y + z, x - y)
}

/// Unit cube cut into x-slabs at random interior boundaries.
fn slab_field(slabs: usize) -> SyntheticField<fn(Component, Vector) -> Complex64> {
    let mut rng = SmallRng::seed_from_u64(42);
    let mut edges: Vec<f64> = (1..slabs).map(|_| rng.r#gen::<f64>()).collect();
    edges.sort_by(f64::total_cmp);
    edges.insert(0, 0.0);
    edges.push(1.0);
    let chunks = edges
        .windows(2)
        .map(|w| {
            SyntheticChunk::new(Region::new(
                Vector::new(w[0], 0.0, 0.0),
                Vector::new(w[1], 1.0, 1.0),
            ))
        })
        .collect();
    SyntheticField::new(chunks, eval as fn(Component, Vector) -> Complex64)
}

fn bench_cube_output(c: &mut Criterion) {
    let field = slab_field(8);
    let symmetry = SymmetryGroup::trivial();
    let lattice = PeriodicLattice::aperiodic();
    let comm = NoComm;
    let mut ctx = OutputContext::new(&field, &symmetry, &lattice, &comm);
    ctx.real_fields = true;

    let mut group = c.benchmark_group("cube_output");
    for resolution in [8.0, 16.0, 32.0] {
        let request = OutputRequest::new(unit_cube(), resolution);
        group.bench_with_input(
            BenchmarkId::new("slabs8", resolution as usize),
            &request,
            |b, request| {
                b.iter(|| {
                    let mut writer = MemoryWriter::new();
                    output_dataset(
                        &ctx,
                        &mut writer,
                        Path::new("ex.h5"),
                        "ex",
                        Component::Ex,
                        Part::Real,
                        request,
                    )
                    .unwrap();
                    writer.data_calls()
                })
            },
        );
    }
    group.finish();
}

fn bench_mirrored_output(c: &mut Criterion) {
    let half = Region::new(Vector::zero(), Vector::new(0.5, 1.0, 1.0));
    let field = SyntheticField::single_chunk(half, eval as fn(Component, Vector) -> Complex64);
    let symmetry = SymmetryGroup::mirror(Direction::X, Vector::new(0.5, 0.5, 0.5), Parity::Even);
    let lattice = PeriodicLattice::aperiodic();
    let comm = NoComm;
    let mut ctx = OutputContext::new(&field, &symmetry, &lattice, &comm);
    ctx.real_fields = true;

    let mut group = c.benchmark_group("mirrored_output");
    for resolution in [8.0, 16.0, 32.0] {
        let request = OutputRequest::new(unit_cube(), resolution);
        group.bench_with_input(
            BenchmarkId::new("half_chunk", resolution as usize),
            &request,
            |b, request| {
                b.iter(|| {
                    let mut writer = MemoryWriter::new();
                    output_dataset(
                        &ctx,
                        &mut writer,
                        Path::new("ey.h5"),
                        "ey",
                        Component::Ey,
                        Part::Real,
                        request,
                    )
                    .unwrap();
                    writer.data_calls()
                })
            },
        );
    }
    group.finish();
}

criterion_group!(benches, bench_cube_output, bench_mirrored_output);
criterion_main!(benches);
