use super::*;
use crate::commands::build_cli;
use marquee_core::types::{CastMember, EntityId};
use tempfile::TempDir;

mod common {
    use super::*;

    pub(super) fn movie(id: &str, title: &str, director: Option<&str>, cast: &[&str]) -> Movie {
        Movie {
            id: EntityId::try_from(id).unwrap(),
            title: title.to_string(),
            director: director.map(str::to_string),
            cast: cast.iter().map(|name| CastMember::new(*name)).collect(),
        }
    }

    pub(super) fn catalog() -> Vec<Movie> {
        vec![
            movie("m1", "인터스텔라", Some("Christopher Nolan"), &["Matthew McConaughey"]),
            movie("m2", "인셉션", Some("Christopher Nolan"), &[]),
            movie("m3", "기생충", Some("봉준호"), &["송강호"]),
        ]
    }

    pub(super) fn open(temp_dir: &TempDir) -> Session {
        Session::open(temp_dir.path(), None).unwrap()
    }
}

mod parse {
    use super::*;

    #[test]
    fn test_global_flags_after_subcommand() {
        let matches = build_cli()
            .try_get_matches_from(["marquee", "search", "인", "--limit", "3", "--data-dir", "/tmp/x"])
            .unwrap();

        assert_eq!(
            matches.get_one::<PathBuf>("data-dir"),
            Some(&PathBuf::from("/tmp/x"))
        );
        let (name, sub) = matches.subcommand().unwrap();
        assert_eq!(name, "search");
        assert_eq!(sub.get_one::<usize>("limit"), Some(&3));
    }

    #[test]
    fn test_default_data_dir() {
        let matches = build_cli()
            .try_get_matches_from(["marquee", "sweep"])
            .unwrap();

        assert_eq!(
            matches.get_one::<PathBuf>("data-dir"),
            Some(&PathBuf::from(".marquee"))
        );
        assert!(!matches.get_flag("verbose"));
    }

    #[test]
    fn test_show_key_type() {
        let matches = build_cli()
            .try_get_matches_from(["marquee", "show", "봉준호", "--type", "director"])
            .unwrap();

        let (_, sub) = matches.subcommand().unwrap();
        assert_eq!(sub.get_one::<KeyType>("type"), Some(&KeyType::Director));
    }

    #[test]
    fn test_rejects_unknown_key_type() {
        let result = build_cli().try_get_matches_from(["marquee", "show", "x", "--type", "genre"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_update_needs_two_files() {
        let result = build_cli().try_get_matches_from(["marquee", "update", "before.json"]);
        assert!(result.is_err());
    }
}

mod commands {
    use super::common::{catalog, movie, open};
    use super::*;

    #[tokio::test]
    async fn test_rebuild_then_search() {
        let temp_dir = TempDir::new().unwrap();
        let session = open(&temp_dir);

        let outcome = session.rebuild(&catalog()).await.unwrap();
        assert!(outcome.ok);
        assert_eq!(outcome.body["movies"], 3);
        assert_eq!(outcome.body["keys"], 7);

        let outcome = session.search("ㄱㅅㅊ", None).await.unwrap();
        assert!(outcome.ok);
        assert_eq!(outcome.body["query"], "ㄱㅅㅊ");
        assert_eq!(outcome.body["count"], 1);
        assert_eq!(outcome.body["items"][0]["key"], "기생충");
        assert_eq!(outcome.body["items"][0]["movieIds"][0], "m3");
    }

    #[tokio::test]
    async fn test_search_blank_query() {
        let temp_dir = TempDir::new().unwrap();
        let session = open(&temp_dir);

        let outcome = session.search("  ", Some(5)).await.unwrap();

        assert!(outcome.ok);
        assert_eq!(outcome.body["count"], 0);
    }

    #[tokio::test]
    async fn test_show_reports_entity_ids() {
        let temp_dir = TempDir::new().unwrap();
        let session = open(&temp_dir);
        session.create(&catalog()).await.unwrap();

        let outcome = session
            .show("Christopher Nolan", KeyType::Director)
            .await
            .unwrap();

        assert!(outcome.ok);
        assert_eq!(outcome.body["key"]["entityIds"], serde_json::json!(["m1", "m2"]));

        let missing = session.show("Christopher Nolan", KeyType::Actor).await.unwrap();
        assert!(!missing.ok);
        assert!(missing.body["key"].is_null());
    }

    #[tokio::test]
    async fn test_delete_and_update_remove_keys() {
        let temp_dir = TempDir::new().unwrap();
        let session = open(&temp_dir);
        let movies = catalog();
        session.create(&movies).await.unwrap();

        let outcome = session.delete(&movies[2..]).await.unwrap();
        assert!(outcome.ok);
        assert_eq!(outcome.body["removed"], 3);
        assert_eq!(outcome.body["orphansDeleted"], 3);

        let renamed = movie("m2", "인셉션 리마스터", Some("Christopher Nolan"), &[]);
        session.update(&movies[1], &renamed).await.unwrap();

        assert!(!session.show("기생충", KeyType::Movie).await.unwrap().ok);
        assert!(!session.show("인셉션", KeyType::Movie).await.unwrap().ok);
        assert!(session.show("인셉션 리마스터", KeyType::Movie).await.unwrap().ok);
    }

    #[tokio::test]
    async fn test_update_rejects_different_ids() {
        let temp_dir = TempDir::new().unwrap();
        let session = open(&temp_dir);
        let movies = catalog();

        assert!(session.update(&movies[0], &movies[1]).await.is_err());
    }

    #[tokio::test]
    async fn test_sweep_on_clean_index() {
        let temp_dir = TempDir::new().unwrap();
        let session = open(&temp_dir);
        session.rebuild(&catalog()).await.unwrap();

        let outcome = session.sweep().await.unwrap();

        assert_eq!(outcome.body["deleted"], 0);
        assert_eq!(outcome.body["remaining"], 7);
    }

    #[tokio::test]
    async fn test_dispatch_reads_movie_files() {
        let temp_dir = TempDir::new().unwrap();
        let session = open(&temp_dir);
        let file = temp_dir.path().join("movies.json");
        std::fs::write(
            &file,
            r#"[{ "id": "m9", "title": "Star Wars", "cast": [{ "name": "Mark Hamill", "role": "Luke" }] }]"#,
        )
        .unwrap();

        let matches = build_cli()
            .try_get_matches_from(["marquee", "create", file.to_str().unwrap()])
            .unwrap();
        let outcome = session.dispatch(&matches).await.unwrap();
        assert_eq!(outcome.body["upserted"], 2);

        let matches = build_cli()
            .try_get_matches_from(["marquee", "search", "mark"])
            .unwrap();
        let outcome = session.dispatch(&matches).await.unwrap();
        assert_eq!(outcome.body["items"][0]["key"], "Mark Hamill");
        assert_eq!(outcome.body["items"][0]["keyType"], "actor");
    }

    #[tokio::test]
    async fn test_invalid_config_falls_back_to_defaults() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(
            temp_dir.path().join("config.toml"),
            "[search]\nthreshold = 7.0\n",
        )
        .unwrap();

        let session = open(&temp_dir);

        assert_eq!(session.engine.config().threshold, 0.35);
    }

    #[tokio::test]
    async fn test_malformed_movie_file() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("bad.json");
        std::fs::write(&file, r#"{ "title": "no id" }"#).unwrap();

        assert!(read_movies(&file).is_err());
        assert!(read_movie(&file).is_err());
    }
}
