//! Conversion Performance Benchmarks
//!
//! This module benchmarks the registered array converters:
//! - Layout checks (accepting and rejecting)
//! - Zero-copy extraction versus copying extraction
//! - Native-to-foreign conversion

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use nalgebra::{DMatrix, DVector};
use ndarray::Array2;
use numbridge_convert::{expose_converters, ArrayVector, ColumnMajorMatrix, RowMajorMatrix};
use numbridge_host::{ArrayObject, ArrayOrder, ConverterRegistry, ForeignObject};

const SIZES: [usize; 3] = [16, 128, 512];

fn registry() -> ConverterRegistry {
    let mut registry = ConverterRegistry::new();
    expose_converters(&mut registry);
    registry
}

fn matrix(n: usize, order: ArrayOrder) -> ForeignObject {
    let arr = ArrayObject::from_fn(vec![n, n], order, |index| (index[0] * n + index[1]) as f64);
    match arr {
        Ok(arr) => ForeignObject::Array(arr),
        Err(err) => panic!("failed to allocate benchmark input: {err}"),
    }
}

// ============================================================================
// Layout Checks
// ============================================================================

fn bench_layout_checks(c: &mut Criterion) {
    let mut group = c.benchmark_group("layout_checks");
    let registry = registry();
    let c_matrix = matrix(64, ArrayOrder::C);

    group.bench_function("accept_row_major", |b| {
        b.iter(|| registry.is_convertible::<RowMajorMatrix<f64>>(black_box(&c_matrix)))
    });

    group.bench_function("reject_column_major", |b| {
        b.iter(|| registry.is_convertible::<ColumnMajorMatrix<f64>>(black_box(&c_matrix)))
    });

    group.bench_function("reject_wrong_kind", |b| {
        b.iter(|| registry.is_convertible::<RowMajorMatrix<f32>>(black_box(&c_matrix)))
    });

    group.finish();
}

// ============================================================================
// Extraction
// ============================================================================

fn bench_extract(c: &mut Criterion) {
    let mut group = c.benchmark_group("extract");
    let registry = registry();

    for n in SIZES {
        let c_matrix = matrix(n, ArrayOrder::C);
        let f_matrix = matrix(n, ArrayOrder::Fortran);
        group.throughput(Throughput::Elements((n * n) as u64));

        group.bench_with_input(BenchmarkId::new("row_major_view", n), &c_matrix, |b, object| {
            b.iter(|| registry.extract::<RowMajorMatrix<f64>>(black_box(object)))
        });

        group.bench_with_input(BenchmarkId::new("array2_copy", n), &c_matrix, |b, object| {
            b.iter(|| registry.extract::<Array2<f64>>(black_box(object)))
        });

        group.bench_with_input(BenchmarkId::new("dmatrix_copy", n), &f_matrix, |b, object| {
            b.iter(|| registry.extract::<DMatrix<f64>>(black_box(object)))
        });

        group.bench_with_input(BenchmarkId::new("vector_view", n), &c_matrix, |b, object| {
            b.iter(|| registry.extract::<ArrayVector<f64>>(black_box(object)))
        });
    }

    group.finish();
}

// ============================================================================
// Native To Foreign
// ============================================================================

fn bench_to_foreign(c: &mut Criterion) {
    let mut group = c.benchmark_group("to_foreign");
    let registry = registry();

    for n in SIZES {
        group.throughput(Throughput::Elements((n * n) as u64));

        let copy = DMatrix::<f64>::from_fn(n, n, |r, c| (r + c) as f64);
        group.bench_with_input(BenchmarkId::new("dmatrix", n), &copy, |b, value| {
            b.iter(|| registry.to_foreign(black_box(value)))
        });

        let vector = DVector::<f64>::from_fn(n * n, |i, _| i as f64);
        group.bench_with_input(BenchmarkId::new("dvector", n), &vector, |b, value| {
            b.iter(|| registry.to_foreign(black_box(value)))
        });

        if let Ok(view) = registry.extract::<RowMajorMatrix<f64>>(&matrix(n, ArrayOrder::C)) {
            group.bench_with_input(BenchmarkId::new("row_major_view", n), &view, |b, value| {
                b.iter(|| registry.to_foreign(black_box(value)))
            });
        }
    }

    group.finish();
}

// ============================================================================
// Criterion Main
// ============================================================================

criterion_group!(benches, bench_layout_checks, bench_extract, bench_to_foreign);

criterion_main!(benches);
