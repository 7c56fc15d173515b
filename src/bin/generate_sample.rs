use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use clap::Parser;
use parquet::arrow::ArrowWriter;

const GATES: [&str; 4] = [
    "OR Similarity Score",
    "AND Similarity Score",
    "NOT XOR Similarity Score",
    "NOT AND Similarity Score",
];

/// Consecutive row blocks: (first row, prompt type, per-gate mean score).
/// The boundaries cover the row ranges of both built-in presets.
const BLOCKS: [(usize, &str, [f64; 4]); 5] = [
    (0, "Generic", [0.62, 0.48, 0.35, 0.55]),
    (59, "Factual", [0.71, 0.58, 0.30, 0.49]),
    (83, "Imaginative", [0.44, 0.39, 0.52, 0.61]),
    (119, "Extrinsic", [0.50, 0.33, 0.41, 0.68]),
    (176, "Intrinsic", [0.57, 0.45, 0.28, 0.63]),
];

/// Write a synthetic `logic_scores` table (CSV and Parquet).
#[derive(Parser, Debug)]
struct Args {
    /// Output directory
    #[arg(short, long, default_value = ".")]
    out_dir: PathBuf,

    /// Number of rows
    #[arg(short, long, default_value_t = 200)]
    rows: usize,

    /// PRNG seed
    #[arg(long, default_value_t = 42)]
    seed: u64,
}

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

fn block_for(row: usize) -> &'static (usize, &'static str, [f64; 4]) {
    BLOCKS
        .iter()
        .rev()
        .find(|(first, _, _)| row >= *first)
        .unwrap_or(&BLOCKS[0])
}

fn main() -> Result<()> {
    let args = Args::parse();
    let mut rng = SimpleRng::new(args.seed);

    let mut ids: Vec<i64> = Vec::with_capacity(args.rows);
    let mut prompt_types: Vec<&str> = Vec::with_capacity(args.rows);
    let mut scores: [Vec<f64>; 4] = Default::default();

    for row in 0..args.rows {
        let (_, prompt_type, means) = block_for(row);
        ids.push(row as i64);
        prompt_types.push(*prompt_type);
        for (gate, column) in scores.iter_mut().enumerate() {
            let v = rng.gauss(means[gate], 0.08).clamp(0.0, 1.0);
            column.push((v * 1e4).round() / 1e4);
        }
    }

    std::fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("creating {}", args.out_dir.display()))?;

    // Write CSV
    let csv_path = args.out_dir.join("logic_scores.csv");
    let mut writer = csv::Writer::from_path(&csv_path)
        .with_context(|| format!("creating {}", csv_path.display()))?;
    let mut header = vec!["Response ID", "Prompt Type"];
    header.extend(GATES);
    writer.write_record(&header)?;
    for row in 0..args.rows {
        let mut record = vec![ids[row].to_string(), prompt_types[row].to_string()];
        record.extend(scores.iter().map(|col| col[row].to_string()));
        writer.write_record(&record)?;
    }
    writer.flush()?;

    // Write Parquet
    let mut fields = vec![
        Field::new("Response ID", DataType::Int64, false),
        Field::new("Prompt Type", DataType::Utf8, false),
    ];
    fields.extend(GATES.iter().map(|g| Field::new(*g, DataType::Float64, false)));
    let schema = Arc::new(Schema::new(fields));

    let mut columns: Vec<arrow::array::ArrayRef> = vec![
        Arc::new(Int64Array::from(ids)),
        Arc::new(StringArray::from(prompt_types)),
    ];
    for column in scores {
        columns.push(Arc::new(Float64Array::from(column)));
    }
    let batch = RecordBatch::try_new(schema.clone(), columns).context("building record batch")?;

    let parquet_path = args.out_dir.join("logic_scores.parquet");
    let file = std::fs::File::create(&parquet_path)
        .with_context(|| format!("creating {}", parquet_path.display()))?;
    let mut writer = ArrowWriter::try_new(file, schema, None)?;
    writer.write(&batch)?;
    writer.close()?;

    println!(
        "Wrote {} rows to {} and {}",
        args.rows,
        csv_path.display(),
        parquet_path.display()
    );
    Ok(())
}
