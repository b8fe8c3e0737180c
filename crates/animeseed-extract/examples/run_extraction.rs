use std::env;
use std::path::PathBuf;

use animeseed_extract::{ExtractOptions, SeedEngine, SourceLayout};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let mut args = env::args().skip(1);
    let mut root: Option<PathBuf> = None;
    let mut sample_size: Option<usize> = None;
    let mut seed: Option<u64> = None;
    let mut out_dir: Option<PathBuf> = None;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--root" => root = args.next().map(PathBuf::from),
            "--n" => sample_size = args.next().map(|value| value.parse()).transpose()?,
            "--seed" => seed = args.next().map(|value| value.parse()).transpose()?,
            "--out" => out_dir = args.next().map(PathBuf::from),
            _ => return Err(format!("unexpected argument '{arg}'").into()),
        }
    }

    let mut options = ExtractOptions {
        sample_size: sample_size.ok_or("missing --n sample size")?,
        seed,
        progress: true,
        ..ExtractOptions::default()
    };
    if let Some(root) = root {
        options.layout = SourceLayout::rooted_at(&root);
    }
    if let Some(out_dir) = out_dir {
        options.out_dir = out_dir;
    }

    let result = SeedEngine::new(options).run()?;
    for table in &result.report.tables {
        println!("{} rows={} sha256={}", table.file, table.rows, table.sha256);
    }
    println!("out_dir={}", result.out_dir.display());
    Ok(())
}
