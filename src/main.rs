use clap::Parser;
use frame_match::{cli, config, error, runner};
use cli::{Cli, Commands};
use config::RunConfig;
use error::Result;
use frame_match_common::DatasetConfig;

fn main() {
    let cli = Cli::parse();

    if let Err(e) = execute(cli) {
        eprintln!("エラー: {}", e);
        std::process::exit(1);
    }
}

fn execute(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Run { root, config, dataset, assets, frame_interval, max_features } => {
            println!("🔍 frame-match - 照合\n");

            let datasets = config::load_dataset_config(&root, config.as_deref());
            if let (Some(id), Some(c)) = (dataset.as_deref(), datasets.as_ref()) {
                if c.find(id).is_none() {
                    eprintln!("⚠ データセット '{}' は設定にありません（既定を使用）", id);
                }
            }
            let selected = DatasetConfig::select(datasets.as_ref(), dataset.as_deref());

            let mut run_config = RunConfig::resolve(&root, &selected, assets.as_deref());
            run_config.frame_interval = frame_interval;
            run_config.max_features = max_features;
            run_config.verbose = cli.verbose;

            let summary = runner::run(&run_config)?;
            runner::print_summary(&summary);
        }

        Commands::Manifest { root, config, results, search } => {
            println!("📄 frame-match - マニフェスト再生成\n");

            let datasets = config::load_dataset_config(&root, config.as_deref());
            let targets = runner::ManifestTargets::from_flags(results, search);
            let written = runner::rebuild_manifests(
                &root,
                &DatasetConfig::datasets_or_default(datasets.as_ref()),
                targets,
            )?;
            println!("\n✅ {}ファイルを書き出しました", written.len());
        }

        Commands::Datasets { root, config } => {
            let datasets = config::load_dataset_config(&root, config.as_deref());
            let selected = DatasetConfig::select(datasets.as_ref(), None);

            println!("データセット:");
            for dataset in DatasetConfig::datasets_or_default(datasets.as_ref()) {
                let mark = if dataset.id == selected.id { "*" } else { " " };
                println!("  {} {} ({})", mark, dataset.id, dataset.display_name());
                println!("      参照画像: {}", root.join(&dataset.search_dir).display());
                println!("      結果:     {}", root.join(&dataset.results_dir).display());
            }
        }
    }

    Ok(())
}
