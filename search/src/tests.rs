use super::*;
use marquee_core::store::db::error::DatabaseError;
use marquee_core::store::{Association, IndexStore, RedbIndexStore, StorageError};
use marquee_core::types::{Config, EntityId, IndexedField, KeyType, SearchKey};
use std::sync::Arc;
use tempfile::TempDir;

mod common {
    use super::*;

    pub(super) struct Fixture {
        pub engine: SearchEngine<RedbIndexStore>,
        pub store: Arc<RedbIndexStore>,
        _temp_dir: TempDir,
    }

    pub(super) async fn fixture(keys: &[(&str, KeyType, &str)]) -> Fixture {
        fixture_with(keys, SearchConfig::default()).await
    }

    pub(super) async fn fixture_with(keys: &[(&str, KeyType, &str)], config: SearchConfig) -> Fixture {
        let temp_dir = TempDir::new().unwrap();
        let store = Arc::new(
            RedbIndexStore::open(Config {
                base_path: temp_dir.path().to_path_buf(),
            })
            .unwrap(),
        );

        let associations = keys
            .iter()
            .map(|(text, key_type, id)| {
                Association::new(*text, *key_type, EntityId::try_from(*id).unwrap())
            })
            .collect();
        store.bulk_upsert(associations).await.unwrap();

        Fixture {
            engine: SearchEngine::new(Arc::clone(&store), config),
            store,
            _temp_dir: temp_dir,
        }
    }

    pub(super) fn keys(items: &[AutocompleteItem]) -> Vec<&str> {
        items.iter().map(|item| item.key.as_str()).collect()
    }

    pub(super) fn catalog() -> Vec<(&'static str, KeyType, &'static str)> {
        vec![
            ("인터스텔라", KeyType::Movie, "m1"),
            ("Christopher Nolan", KeyType::Director, "m1"),
            ("Matthew McConaughey", KeyType::Actor, "m1"),
            ("인셉션", KeyType::Movie, "m2"),
            ("Christopher Nolan", KeyType::Director, "m2"),
            ("조커", KeyType::Movie, "m3"),
            ("조커", KeyType::Actor, "m4"),
            ("Star Wars", KeyType::Movie, "m5"),
            ("Star Trek", KeyType::Movie, "m6"),
            ("Starship Troopers", KeyType::Movie, "m7"),
            ("Stalker", KeyType::Movie, "m8"),
            ("기생충", KeyType::Movie, "m9"),
            ("봉준호", KeyType::Director, "m9"),
            ("송강호", KeyType::Actor, "m9"),
        ]
    }

    /// Store whose reads always fail.
    pub(super) struct BrokenStore;

    fn unavailable<T>() -> Result<T, StorageError> {
        Err(StorageError::Database(DatabaseError::Io(std::io::Error::other(
            "index unavailable",
        ))))
    }

    impl IndexStore for BrokenStore {
        async fn find_by_prefix(
            &self,
            _field: IndexedField,
            _prefix: &str,
            _cap: usize,
        ) -> Result<Vec<SearchKey>, StorageError> {
            unavailable()
        }

        async fn upsert_association(
            &self,
            _display_text: &str,
            _key_type: KeyType,
            _entity_id: &EntityId,
        ) -> Result<(), StorageError> {
            unavailable()
        }

        async fn remove_association(
            &self,
            _display_text: &str,
            _key_type: KeyType,
            _entity_id: &EntityId,
        ) -> Result<(), StorageError> {
            unavailable()
        }

        async fn delete_orphans(&self) -> Result<usize, StorageError> {
            unavailable()
        }

        async fn bulk_upsert(&self, _associations: Vec<Association>) -> Result<usize, StorageError> {
            unavailable()
        }

        async fn get(
            &self,
            _display_text: &str,
            _key_type: KeyType,
        ) -> Result<Option<SearchKey>, StorageError> {
            unavailable()
        }

        async fn count(&self) -> Result<u64, StorageError> {
            unavailable()
        }
    }
}

mod autocomplete {
    use super::common::{BrokenStore, catalog, fixture, fixture_with, keys};
    use super::*;

    #[tokio::test]
    async fn test_initials_query_finds_title() {
        let f = fixture(&catalog()).await;

        let items = f.engine.autocomplete("ㅇㅌㅅ", 10).await.unwrap();

        assert_eq!(keys(&items), vec!["인터스텔라"]);
        assert_eq!(items[0].key_type, KeyType::Movie);
        assert!((items[0].score - 0.1249).abs() < 1e-9);
        assert_eq!(items[0].entity_ids, vec![EntityId::try_from("m1").unwrap()]);
    }

    #[tokio::test]
    async fn test_partial_syllable_matches_through_jamo() {
        let f = fixture(&catalog()).await;

        let items = f.engine.autocomplete("인텃", 10).await.unwrap();

        assert_eq!(keys(&items), vec!["인터스텔라"]);
        assert_eq!(items[0].score, 0.0);
    }

    #[tokio::test]
    async fn test_shared_prefix_ranks_shorter_first() {
        let f = fixture(&catalog()).await;

        let items = f.engine.autocomplete("인", 10).await.unwrap();

        assert_eq!(keys(&items), vec!["인셉션", "인터스텔라"]);
    }

    #[tokio::test]
    async fn test_latin_prefix_order() {
        let f = fixture(&catalog()).await;

        let items = f.engine.autocomplete("star", 10).await.unwrap();

        assert_eq!(keys(&items), vec!["Star Trek", "Star Wars", "Starship Troopers"]);
    }

    #[tokio::test]
    async fn test_query_case_is_folded() {
        let f = fixture(&catalog()).await;

        let lower = f.engine.autocomplete("star", 10).await.unwrap();
        let upper = f.engine.autocomplete("STAR", 10).await.unwrap();

        assert_eq!(keys(&lower), keys(&upper));
    }

    #[tokio::test]
    async fn test_title_and_name_with_same_text() {
        let f = fixture(&catalog()).await;

        let items = f.engine.autocomplete("조커", 10).await.unwrap();

        let found: Vec<(&str, KeyType)> = items
            .iter()
            .map(|item| (item.key.as_str(), item.key_type))
            .collect();
        assert_eq!(found, vec![("조커", KeyType::Movie), ("조커", KeyType::Actor)]);
    }

    #[tokio::test]
    async fn test_shared_director_lists_every_movie() {
        let f = fixture(&catalog()).await;

        let items = f.engine.autocomplete("christopher", 10).await.unwrap();

        assert_eq!(keys(&items), vec!["Christopher Nolan"]);
        assert_eq!(items[0].entity_ids.len(), 2);
    }

    #[tokio::test]
    async fn test_limit_bounds_results() {
        let f = fixture(&catalog()).await;

        let items = f.engine.autocomplete("sta", 2).await.unwrap();

        assert_eq!(items.len(), 2);
    }

    #[tokio::test]
    async fn test_zero_limit_and_blank_query() {
        let f = fixture(&catalog()).await;

        assert!(f.engine.autocomplete("star", 0).await.unwrap().is_empty());
        assert!(f.engine.autocomplete("", 10).await.unwrap().is_empty());
        assert!(f.engine.autocomplete("   ", 10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_no_candidates() {
        let f = fixture(&catalog()).await;

        assert!(f.engine.autocomplete("zzz", 10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_every_prefix_finds_its_key() {
        let f = fixture(&catalog()).await;

        for (text, key_type, _) in catalog() {
            let normalized = marquee_core::normalize::normalize(text);
            let chars: Vec<char> = normalized.chars().collect();

            for end in 1..=chars.len() {
                let prefix: String = chars[..end].iter().collect();
                if prefix.trim().is_empty() {
                    continue;
                }
                let items = f.engine.autocomplete(&prefix, 50).await.unwrap();
                assert!(
                    items
                        .iter()
                        .any(|item| item.key == text && item.key_type == key_type),
                    "prefix {prefix:?} did not find {text}"
                );
            }
        }
    }

    #[tokio::test]
    async fn test_results_are_sorted_by_score() {
        let f = fixture(&catalog()).await;

        let items = f.engine.autocomplete("s", 10).await.unwrap();

        assert!(!items.is_empty());
        assert!(items.windows(2).all(|pair| pair[0].score <= pair[1].score));
    }

    #[tokio::test]
    async fn test_orphans_are_not_suggested_after_sweep() {
        let f = fixture(&catalog()).await;
        let m8 = EntityId::try_from("m8").unwrap();

        f.store
            .remove_association("Stalker", KeyType::Movie, &m8)
            .await
            .unwrap();
        f.store.delete_orphans().await.unwrap();

        let items = f.engine.autocomplete("stal", 10).await.unwrap();
        assert!(items.is_empty());
    }

    #[tokio::test]
    async fn test_default_limit_is_capped() {
        let many: Vec<(String, KeyType, String)> = (0..30)
            .map(|n| (format!("Alien {n:02}"), KeyType::Movie, format!("m{n}")))
            .collect();
        let borrowed: Vec<(&str, KeyType, &str)> = many
            .iter()
            .map(|(text, key_type, id)| (text.as_str(), *key_type, id.as_str()))
            .collect();
        let f = fixture(&borrowed).await;

        let items = f.engine.autocomplete_with_default("alien", None).await.unwrap();
        assert_eq!(items.len(), 10);

        let items = f.engine.autocomplete_with_default("alien", Some(100)).await.unwrap();
        assert_eq!(items.len(), 10);

        let items = f.engine.autocomplete_with_default("alien", Some(3)).await.unwrap();
        assert_eq!(items.len(), 3);
    }

    #[tokio::test]
    async fn test_weights_come_from_config() {
        let config = SearchConfig {
            bonuses: marquee_core::types::PrefixBonuses {
                normalized: 0.0,
                jamo: 0.0,
                initials: 0.0,
                display: 0.0,
            },
            ..SearchConfig::default()
        };
        let f = fixture_with(&catalog(), config).await;

        let items = f.engine.autocomplete("ㅇㅌㅅ", 10).await.unwrap();

        assert!((items[0].score - 0.1649).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_storage_failure_is_an_error() {
        let engine = SearchEngine::new(Arc::new(BrokenStore), SearchConfig::default());

        let result = engine.autocomplete("star", 10).await;

        let err = result.unwrap_err();
        assert!(matches!(err, SearchError::Storage(_)));
        assert!(err.to_string().starts_with("search failed"));
    }

    #[tokio::test]
    async fn test_serializes_api_shape() {
        let f = fixture(&catalog()).await;

        let items = f.engine.autocomplete("기생", 10).await.unwrap();
        let json = serde_json::to_value(&items).unwrap();

        assert_eq!(
            json,
            serde_json::json!([
                { "key": "기생충", "keyType": "movie", "movieIds": ["m9"], "score": 0.0 }
            ])
        );
    }
}
