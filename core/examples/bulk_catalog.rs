//! Indexes a synthetic catalog of 9000 movies for lookup timing.
//!
//! Run with: `cargo run -q --example bulk_catalog -p marquee_core [data-dir]`

use marquee_core::types::{CastMember, Config, EntityId, IndexedField, Movie};
use marquee_core::{IndexStore, IndexSynchronizer, RedbIndexStore};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

const MOVIE_COUNT: usize = 9000;

const TITLE_WORDS: [&str; 8] = ["별", "바다", "Star", "Night", "밤의", "Return", "그림자", "Empire"];
const SURNAMES: [&str; 6] = ["김", "이", "박", "최", "정", "강"];
const GIVEN_NAMES: [&str; 6] = ["민준", "서연", "도윤", "하은", "지호", "수아"];

#[tokio::main]
async fn main() {
    let base_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(".marquee-bulk"));
    println!("Using data path: {}", base_path.display());

    let store = Arc::new(
        RedbIndexStore::open(Config { base_path }).expect("Failed to open search index"),
    );
    let sync = IndexSynchronizer::new(Arc::clone(&store));

    let movies: Vec<Movie> = (0..MOVIE_COUNT).map(synthetic_movie).collect();

    println!("Indexing {} movies...", MOVIE_COUNT);
    let started = Instant::now();
    let report = sync.rebuild(&movies).await;
    println!(
        "Indexed {} keys ({} new associations, {} failed batches) in {:?}",
        report.keys,
        report.associations,
        report.failed_batches,
        started.elapsed()
    );

    for (field, prefix) in [
        (IndexedField::Normalized, "star"),
        (IndexedField::Jamo, "ㅂㅏ"),
        (IndexedField::Initials, "ㄱㄹ"),
    ] {
        let started = Instant::now();
        let found = store
            .find_by_prefix(field, prefix, 100)
            .await
            .expect("Prefix lookup failed");
        println!(
            "  {field} {prefix:?}: {} keys in {:?}",
            found.len(),
            started.elapsed()
        );
    }

    println!(
        "Index now has {} search keys",
        store.count().await.unwrap_or_default()
    );
}

fn synthetic_movie(n: usize) -> Movie {
    let first = TITLE_WORDS[n % TITLE_WORDS.len()];
    let second = TITLE_WORDS[(n / TITLE_WORDS.len()) % TITLE_WORDS.len()];
    let person = |offset: usize| {
        format!(
            "{}{}",
            SURNAMES[(n + offset) % SURNAMES.len()],
            GIVEN_NAMES[(n / SURNAMES.len() + offset) % GIVEN_NAMES.len()]
        )
    };

    Movie {
        id: EntityId::try_from(format!("movie-{n:05}")).expect("Invalid movie id"),
        title: format!("{first} {second} {n}"),
        director: Some(person(0)),
        cast: (1..=3).map(|offset| CastMember::new(person(offset))).collect(),
    }
}
