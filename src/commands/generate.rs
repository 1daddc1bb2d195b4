//! Generate static files

use anyhow::Result;
use notify_debouncer_mini::{new_debouncer, notify::RecursiveMode};
use std::sync::mpsc::channel;
use std::time::{Duration, Instant};

use crate::content::ContentLoader;
use crate::generator::Generator;
use crate::{Folio, CONFIG_FILE};

/// Load every project and write the full site
pub fn run(folio: &Folio) -> Result<()> {
    let start = Instant::now();

    let library = ContentLoader::new(folio).load()?;
    tracing::info!(
        "Loaded {} projects ({} featured)",
        library.len(),
        library.featured().len()
    );

    let generator = Generator::new(folio)?;
    generator.generate(&library)?;

    let duration = start.elapsed();
    tracing::info!("Generated in {:.2}s", duration.as_secs_f64());

    Ok(())
}

/// Watch the source directory and config file, regenerating on change
pub async fn watch(folio: &Folio) -> Result<()> {
    let (tx, rx) = channel();
    let mut debouncer = new_debouncer(Duration::from_millis(500), tx)?;

    debouncer
        .watcher()
        .watch(&folio.source_dir, RecursiveMode::Recursive)?;

    let config_path = folio.base_dir.join(CONFIG_FILE);
    if config_path.exists() {
        debouncer
            .watcher()
            .watch(&config_path, RecursiveMode::NonRecursive)?;
    }

    tracing::info!("Watching for changes. Press Ctrl+C to stop.");

    let folio = folio.clone();
    tokio::task::spawn_blocking(move || {
        for result in rx {
            match result {
                Ok(events) if !events.is_empty() => {
                    tracing::info!("File changed, regenerating...");
                    if let Err(e) = reload(&folio).and_then(|f| run(&f)) {
                        tracing::error!("Generation failed: {}", e);
                    }
                }
                Ok(_) => {}
                Err(e) => tracing::error!("Watch error: {:?}", e),
            }
        }
    })
    .await?;

    Ok(())
}

/// Re-read the config so edits to `_config.yml` take effect
pub fn reload(folio: &Folio) -> Result<Folio> {
    Folio::new(&folio.base_dir)
}
