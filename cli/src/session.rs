//! Command execution against an opened index directory.

use anyhow::{Context, bail};
use clap::ArgMatches;
use marquee_core::types::{AppConfig, Config, KeyType, Movie};
use marquee_core::{IndexStore, IndexSynchronizer, RedbIndexStore, SyncReport};
use marquee_search::SearchEngine;
use serde_json::{Value, json};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info, warn};

/// JSON document printed for a command, and whether the command succeeded.
#[derive(Debug)]
pub struct Outcome {
    pub body: Value,
    pub ok: bool,
}

impl Outcome {
    fn success(body: Value) -> Self {
        Self { body, ok: true }
    }
}

pub struct Session {
    store: Arc<RedbIndexStore>,
    sync: IndexSynchronizer<RedbIndexStore>,
    engine: SearchEngine<RedbIndexStore>,
}

impl Session {
    /// Opens (or creates) the index in `data_dir` and loads its config.
    ///
    /// Invalid config values are logged and replaced with defaults.
    pub fn open(data_dir: &Path, config_path: Option<&Path>) -> anyhow::Result<Self> {
        let config = Config {
            base_path: data_dir.to_path_buf(),
        };
        let config_path = config_path
            .map(Path::to_path_buf)
            .unwrap_or_else(|| config.config_path());

        let app_config = AppConfig::load(&config_path)
            .with_context(|| format!("Failed to load {}", config_path.display()))?;
        for problem in app_config.validate() {
            warn!(problem = %problem, "Invalid config value, using default");
        }
        let app_config = app_config.with_defaults_for_invalid();

        let store = Arc::new(RedbIndexStore::open(config)?);
        Ok(Self {
            sync: IndexSynchronizer::new(Arc::clone(&store)),
            engine: SearchEngine::new(Arc::clone(&store), app_config.search),
            store,
        })
    }

    pub async fn dispatch(&self, matches: &ArgMatches) -> anyhow::Result<Outcome> {
        match matches.subcommand() {
            Some(("rebuild", sub)) => self.rebuild(&read_movies(path_arg(sub, "file")?)?).await,
            Some(("create", sub)) => self.create(&read_movies(path_arg(sub, "file")?)?).await,
            Some(("delete", sub)) => self.delete(&read_movies(path_arg(sub, "file")?)?).await,
            Some(("update", sub)) => {
                let before = read_movie(path_arg(sub, "before")?)?;
                let after = read_movie(path_arg(sub, "after")?)?;
                self.update(&before, &after).await
            }
            Some(("sweep", _)) => self.sweep().await,
            Some(("search", sub)) => {
                let query = sub.get_one::<String>("query").map_or("", String::as_str);
                let limit = sub.get_one::<usize>("limit").copied();
                self.search(query, limit).await
            }
            Some(("show", sub)) => {
                let text = sub.get_one::<String>("text").map_or("", String::as_str);
                let key_type = sub
                    .get_one::<KeyType>("type")
                    .copied()
                    .unwrap_or(KeyType::Movie);
                self.show(text, key_type).await
            }
            Some((other, _)) => bail!("Unknown command: {other}"),
            None => bail!("No command given"),
        }
    }

    pub async fn rebuild(&self, movies: &[Movie]) -> anyhow::Result<Outcome> {
        let report = self.sync.rebuild(movies).await;
        info!(
            movies = report.movies,
            keys = report.keys,
            associations = report.associations,
            "Rebuild finished"
        );

        Ok(Outcome {
            body: json!({
                "ok": report.failed_batches == 0,
                "movies": report.movies,
                "keys": report.keys,
                "associations": report.associations,
                "failedBatches": report.failed_batches,
            }),
            ok: report.failed_batches == 0,
        })
    }

    pub async fn create(&self, movies: &[Movie]) -> anyhow::Result<Outcome> {
        let mut total = SyncReport::default();
        for movie in movies {
            add_report(&mut total, self.sync.sync_on_create(movie).await);
        }
        Ok(sync_outcome(movies.len(), total))
    }

    pub async fn update(&self, before: &Movie, after: &Movie) -> anyhow::Result<Outcome> {
        if before.id != after.id {
            bail!("Movie ids differ: {} vs {}", before.id, after.id);
        }
        let report = self.sync.sync_on_update(before, after).await;
        Ok(sync_outcome(1, report))
    }

    pub async fn delete(&self, movies: &[Movie]) -> anyhow::Result<Outcome> {
        let mut total = SyncReport::default();
        for movie in movies {
            add_report(&mut total, self.sync.sync_on_delete(movie).await);
        }
        Ok(sync_outcome(movies.len(), total))
    }

    pub async fn sweep(&self) -> anyhow::Result<Outcome> {
        let deleted = self.store.delete_orphans().await?;
        let remaining = self.store.count().await?;
        Ok(Outcome::success(json!({
            "ok": true,
            "deleted": deleted,
            "remaining": remaining,
        })))
    }

    /// Runs an autocomplete query. Search failures become an error envelope
    /// rather than an `Err`.
    pub async fn search(&self, query: &str, limit: Option<usize>) -> anyhow::Result<Outcome> {
        match self.engine.autocomplete_with_default(query, limit).await {
            Ok(items) => Ok(Outcome::success(json!({
                "ok": true,
                "query": query,
                "count": items.len(),
                "items": items,
            }))),
            Err(err) => {
                error!(query, error = %err, "Search failed");
                Ok(Outcome {
                    body: json!({ "ok": false, "error": "SEARCH_FAILED" }),
                    ok: false,
                })
            }
        }
    }

    pub async fn show(&self, text: &str, key_type: KeyType) -> anyhow::Result<Outcome> {
        let key = self.store.get(text, key_type).await?;
        Ok(Outcome {
            ok: key.is_some(),
            body: json!({ "ok": key.is_some(), "key": key }),
        })
    }
}

fn add_report(total: &mut SyncReport, report: SyncReport) {
    total.upserted += report.upserted;
    total.removed += report.removed;
    total.orphans_deleted += report.orphans_deleted;
    total.failures += report.failures;
}

fn sync_outcome(movies: usize, report: SyncReport) -> Outcome {
    Outcome {
        body: json!({
            "ok": report.is_clean(),
            "movies": movies,
            "upserted": report.upserted,
            "removed": report.removed,
            "orphansDeleted": report.orphans_deleted,
            "failures": report.failures,
        }),
        ok: report.is_clean(),
    }
}

fn path_arg<'a>(matches: &'a ArgMatches, name: &str) -> anyhow::Result<&'a PathBuf> {
    matches
        .get_one::<PathBuf>(name)
        .with_context(|| format!("Missing argument: {name}"))
}

fn read_movies(path: &Path) -> anyhow::Result<Vec<Movie>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("{} is not a JSON array of movies", path.display()))
}

fn read_movie(path: &Path) -> anyhow::Result<Movie> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("{} is not a JSON movie", path.display()))
}

#[cfg(test)]
mod tests;
