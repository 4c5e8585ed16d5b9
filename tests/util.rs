#![allow(dead_code)]
use std::path::Path;

use field_gather::prelude::*;

/// Region spanning `[min, max]` along x, degenerate in y and z.
pub fn line_x(min: f64, max: f64) -> Region {
    Region::new(Vector::new(min, 0.0, 0.0), Vector::new(max, 0.0, 0.0))
}

/// Square `[min, max]^2` in the xy-plane, degenerate in z.
pub fn square_xy(min: f64, max: f64) -> Region {
    Region::new(Vector::new(min, min, 0.0), Vector::new(max, max, 0.0))
}

/// Cube `[min, max]^3`.
pub fn cube(min: f64, max: f64) -> Region {
    Region::new(Vector::new(min, min, min), Vector::new(max, max, max))
}

/// Assert two sample slices agree to within `tol` at every point.
pub fn assert_near(got: &[f64], want: &[f64], tol: f64) {
    assert_eq!(got.len(), want.len(), "length mismatch");
    for (i, (g, w)) in got.iter().zip(want).enumerate() {
        assert!(
            (g - w).abs() <= tol,
            "sample {i}: got {g}, want {w} (tol {tol})\n got={got:?}\nwant={want:?}"
        );
    }
}

/// Bit patterns of a sample slice, for byte-identity comparisons.
pub fn to_bits(values: &[f64]) -> Vec<u64> {
    values.iter().map(|v| v.to_bits()).collect()
}

/// Writer that validates nothing and only counts the calls it receives.
#[derive(Default)]
pub struct CountingWriter {
    pub calls: usize,
    pub data_calls: usize,
    pub creates: usize,
}

impl ChunkWriter for CountingWriter {
    fn write_chunk(
        &mut self,
        _path: &Path,
        _dataset: &str,
        _dims: &[usize],
        _data: &[f64],
        _start: &[usize],
        count: &[usize],
        flags: &WriteFlags,
    ) -> Result<(), FieldGatherError> {
        self.calls += 1;
        if flags.create_dataset {
            self.creates += 1;
        }
        if count.iter().product::<usize>() > 0 {
            self.data_calls += 1;
        }
        Ok(())
    }
}

/// Writer that reports a backend failure once `remaining` calls are used up.
pub struct FailingWriter {
    pub remaining: usize,
    pub calls: usize,
}

impl FailingWriter {
    pub fn after(n: usize) -> Self {
        FailingWriter {
            remaining: n,
            calls: 0,
        }
    }
}

impl ChunkWriter for FailingWriter {
    fn write_chunk(
        &mut self,
        _path: &Path,
        dataset: &str,
        _dims: &[usize],
        _data: &[f64],
        _start: &[usize],
        _count: &[usize],
        _flags: &WriteFlags,
    ) -> Result<(), FieldGatherError> {
        self.calls += 1;
        if self.remaining == 0 {
            return Err(FieldGatherError::Writer {
                dataset: dataset.to_string(),
                source: "backend unavailable".into(),
            });
        }
        self.remaining -= 1;
        Ok(())
    }
}
