/*!
# I/O Utilities for Saving Chain Output to CSV

Functions to save chain samples and blocking curves to CSV files for
external plotting. Enable via the `csv` feature.
*/

use ndarray::Array2;
use std::error::Error;
use std::fs::File;

use csv::Writer;

use crate::blocking::BlockingCurve;

/**
Saves a matrix of chain samples (sample × dimension) as a CSV file.

The resulting file has a header row `"sample", "dim_0", "dim_1", ...` and
one row per retained state.

# Examples

```rust
use mcint::io::csv::save_csv;
use ndarray::arr2;

let samples = arr2(&[[0.1, -0.2], [0.3, 0.4]]);
save_csv(&samples, "/tmp/mcint_samples.csv").expect("Expecting saving data to succeed");
```
*/
pub fn save_csv<T: std::fmt::Display>(
    samples: &Array2<T>,
    filename: &str,
) -> Result<(), Box<dyn Error>> {
    let mut wtr = Writer::from_writer(File::create(filename)?);
    let n_dims = samples.ncols();

    let mut header: Vec<String> = vec!["sample".to_string()];
    header.extend((0..n_dims).map(|i| format!("dim_{}", i)));
    wtr.write_record(&header)?;

    for (sample_idx, row) in samples.outer_iter().enumerate() {
        let mut record = vec![sample_idx.to_string()];
        record.extend(row.iter().map(|v| v.to_string()));
        wtr.write_record(&record)?;
    }

    wtr.flush()?;
    Ok(())
}

/**
Saves a blocking curve as a CSV file with columns
`"block_len", "var_mean", "err"` — the layout error-bar plots want.

# Examples

```rust
use mcint::blocking::analyze;
use mcint::io::csv::save_blocking_csv;
use ndarray::Array1;

let series = Array1::from_iter((0..32).map(|i| i as f64));
let curve = analyze(series.view(), 4);
save_blocking_csv(&curve, "/tmp/mcint_blocking.csv").expect("Expecting saving data to succeed");
```
*/
pub fn save_blocking_csv<T: std::fmt::Display + Copy>(
    curve: &BlockingCurve<T>,
    filename: &str,
) -> Result<(), Box<dyn Error>> {
    let mut wtr = Writer::from_writer(File::create(filename)?);
    wtr.write_record(["block_len", "var_mean", "err"])?;

    for i in 0..curve.len() {
        wtr.write_record(&[
            curve.block_lengths[i].to_string(),
            curve.var_of_mean[i].to_string(),
            curve.error[i].to_string(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}
