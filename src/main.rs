use anyhow::{Context, Result};
use datevault::config::{Command, StoreConfig};
use datevault::models::object::ObjectRecord;
use datevault::{FileId, FileStore, filters};
use tokio::fs::File;
use tokio_util::io::ReaderStream;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // --- Logging setup ---
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // --- Parse config + command ---
    let (cfg, command) = StoreConfig::from_env_and_args()?;
    anyhow::ensure!(
        cfg.root.is_dir(),
        "store root {} does not exist",
        cfg.root.display()
    );
    tracing::debug!("using store root {}", cfg.root.display());

    let store = FileStore::new(&cfg.root).with_scan_limit(cfg.scan_limit);

    match command {
        Command::Put {
            file_id,
            input,
            public,
        } => {
            let id: FileId = file_id.parse()?;
            let record = match input {
                Some(path) => {
                    let file = File::open(&path)
                        .await
                        .with_context(|| format!("opening {}", path.display()))?;
                    store.write(&id, ReaderStream::new(file), public).await?
                }
                None => {
                    store
                        .write(&id, ReaderStream::new(tokio::io::stdin()), public)
                        .await?
                }
            };
            print_json(&record)?;
        }
        Command::Cat { file_id, output } => {
            let id: FileId = file_id.parse()?;
            match output {
                Some(path) => {
                    let mut file = File::create(&path)
                        .await
                        .with_context(|| format!("creating {}", path.display()))?;
                    store.read_to(&id, &mut file).await?;
                }
                None => {
                    store.read_to(&id, &mut tokio::io::stdout()).await?;
                }
            }
        }
        Command::Stat { file_id } => {
            let id: FileId = file_id.parse()?;
            print_json(&store.stat(&id).await?)?;
        }
        Command::Rm { file_ids } => {
            for raw in file_ids {
                let id: FileId = raw.parse()?;
                store.delete(&id).await?;
            }
        }
        Command::Publish { file_ids } => set_visibility_all(&store, file_ids, true).await?,
        Command::Unpublish { file_ids } => set_visibility_all(&store, file_ids, false).await?,
        Command::Tree { public, owner } => {
            let tree = store.date_tree(build_filter(public, owner)).await?;
            print_json(&tree)?;
        }
        Command::List {
            limit,
            older_than,
            public,
            owner,
        } => {
            let pages = store
                .list_paged(limit, build_filter(public, owner), older_than.as_deref())
                .await?;
            print_json(&pages)?;
        }
        Command::Dates => {
            let mut dates = store.partition_dates().await?;
            dates.sort();
            for date in dates {
                println!("{date}");
            }
        }
    }

    Ok(())
}

/// Compose the listing predicate from the CLI flags.
fn build_filter(public: bool, owner: Option<String>) -> Box<dyn Fn(&ObjectRecord) -> bool> {
    match (public, owner) {
        (true, Some(owner)) => Box::new(filters::visible_or_owned_by(owner)),
        (true, None) => Box::new(filters::visible_only()),
        (false, Some(owner)) => Box::new(filters::owned_by(owner)),
        (false, None) => Box::new(filters::any()),
    }
}

async fn set_visibility_all(store: &FileStore, file_ids: Vec<String>, visible: bool) -> Result<()> {
    for raw in file_ids {
        let id: FileId = raw.parse()?;
        store.set_visibility(&id, visible).await?;
    }
    Ok(())
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
