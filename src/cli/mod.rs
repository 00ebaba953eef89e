// ============================================================
// Layer 1 - CLI / Presentation Layer
// ============================================================
// Parses arguments with clap and hands off to Layer 2. The only
// thing done here besides routing is printing results.

pub mod commands;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, SampleArgs, StatsArgs, TokenizerArgs};

use crate::application::{
    sample_use_case::SampleUseCase,
    stats_use_case::StatsUseCase,
    tokenizer_use_case::TokenizerUseCase,
};

#[derive(Parser, Debug)]
#[command(
    name = "shape-text-data",
    version,
    about = "Inspect and sample text-query / point-cloud triplet datasets."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Stats(args)     => run_stats(args),
            Commands::Sample(args)    => run_sample(args),
            Commands::Tokenizer(args) => run_tokenizer(args),
        }
    }
}

fn run_stats(args: StatsArgs) -> Result<()> {
    let cfg   = args.data.resolve()?;
    let stats = StatsUseCase::new(cfg).execute()?;

    println!("split:             {} ({} rows)", stats.split, stats.split_rows);
    println!("train rows:        {}", stats.train_rows);
    println!("validation rows:   {}", stats.validation_rows);
    println!("query texts:       {}", stats.query_texts);
    println!("distinct queries:  {}", stats.distinct_queries);
    println!("catalog models:    {}", stats.catalog_size);
    println!("max positives:     {}", stats.max_positives);
    println!("missing clouds:    {}", stats.missing_clouds);

    if !stats.missing_texts.is_empty() {
        println!("queries without text: {}", stats.missing_texts.join(", "));
    }
    if !stats.saturated_queries.is_empty() {
        println!(
            "queries matching the whole catalog (no negative possible): {}",
            stats.saturated_queries.join(", ")
        );
    }
    Ok(())
}

fn run_sample(args: SampleArgs) -> Result<()> {
    let cfg   = args.into_config()?;
    let start = cfg.start;

    tracing::info!("Sampling from '{}'", cfg.dataset.root_dir.display());
    let report = SampleUseCase::new(cfg).execute()?;

    println!("{} examples in split", report.dataset_len);
    for (offset, item) in report.items.iter().enumerate() {
        let t = &item.triplet;
        println!(
            "#{:<5} {} \"{}\"  true={} ({} pts)  false={} ({} pts, {} draws)  tokens={}",
            start + offset,
            t.query_id,
            t.query_text,
            t.true_model_id,
            item.true_cloud.len(),
            t.false_model_id,
            item.false_cloud.len(),
            item.negative_draws,
            item.attention_mask.iter().filter(|&&m| m == 1).count(),
        );
    }

    if let Some(shapes) = report.batch {
        println!("\nbatch:");
        println!("  true_point_clouds   {:?}", shapes.true_point_clouds);
        println!("  false_point_clouds  {:?}", shapes.false_point_clouds);
        println!("  input_ids           {:?}", shapes.input_ids);
        println!("  attention_mask      {:?}", shapes.attention_mask);
    }
    Ok(())
}

fn run_tokenizer(args: TokenizerArgs) -> Result<()> {
    let cfg = args.into_config()?;
    let (path, vocab) = TokenizerUseCase::new(cfg).execute()?;
    println!("Tokenizer ready at '{}' ({} entries)", path.display(), vocab);
    Ok(())
}
