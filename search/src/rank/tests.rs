use super::*;
use marquee_core::types::{EntityId, KeyType, SearchKey};

fn candidate(text: &str, key_type: KeyType, source: MatchSource) -> Candidate {
    let mut key = SearchKey::new(text, key_type);
    key.entity_ids.insert(EntityId::try_from("m1").unwrap());
    Candidate { key, source }
}

fn movie(text: &str, source: MatchSource) -> Candidate {
    candidate(text, KeyType::Movie, source)
}

fn keys(items: &[AutocompleteItem]) -> Vec<&str> {
    items.iter().map(|item| item.key.as_str()).collect()
}

mod rank {
    use super::*;

    #[test]
    fn test_prefix_matches_tie_on_score_and_sort_by_length() {
        let candidates = vec![
            movie("Star Trek", MatchSource::Normalized),
            movie("Star Wars", MatchSource::Normalized),
            movie("Starship Troopers", MatchSource::Normalized),
        ];
        let query = QueryProjections::new("star");

        let items = rank(&candidates, &query, &SearchConfig::default(), 10);

        assert_eq!(keys(&items), vec!["Star Trek", "Star Wars", "Starship Troopers"]);
        assert!(items.iter().all(|item| item.score == 0.0));
    }

    #[test]
    fn test_initials_only_match_score() {
        let candidates = vec![movie("인터스텔라", MatchSource::Initials)];
        let query = QueryProjections::new("ㅇㅌㅅ");

        let items = rank(&candidates, &query, &SearchConfig::default(), 10);

        assert_eq!(keys(&items), vec!["인터스텔라"]);
        assert!((items[0].score - 0.1249).abs() < 1e-9);
        assert_eq!(items[0].entity_ids.len(), 1);
    }

    #[test]
    fn test_limit_truncates() {
        let candidates = vec![
            movie("Alien", MatchSource::Normalized),
            movie("Aliens", MatchSource::Normalized),
            movie("Alien 3", MatchSource::Normalized),
        ];
        let query = QueryProjections::new("alien");

        let items = rank(&candidates, &query, &SearchConfig::default(), 2);

        assert_eq!(keys(&items), vec!["Alien", "Aliens"]);
        assert!(rank(&candidates, &query, &SearchConfig::default(), 0).is_empty());
    }

    #[test]
    fn test_unmatched_candidates_are_backfilled() {
        let candidates = vec![movie("Alien", MatchSource::Other)];
        let query = QueryProjections::new("xyz");

        let items = rank(&candidates, &query, &SearchConfig::default(), 10);

        assert_eq!(keys(&items), vec!["Alien"]);
        assert_eq!(items[0].score, 0.9009);
    }

    #[test]
    fn test_same_text_different_types_both_ranked() {
        let candidates = vec![
            candidate("조커", KeyType::Movie, MatchSource::Normalized),
            candidate("조커", KeyType::Actor, MatchSource::Normalized),
        ];
        let query = QueryProjections::new("조커");

        let items = rank(&candidates, &query, &SearchConfig::default(), 10);

        let types: Vec<KeyType> = items.iter().map(|item| item.key_type).collect();
        assert_eq!(types, vec![KeyType::Movie, KeyType::Actor]);
    }
}

mod apply_bonuses {
    use super::*;

    #[test]
    fn test_bonuses_stack_and_floor_at_zero() {
        let bonuses = PrefixBonuses::default();
        let query = QueryProjections::new("Star");
        let star_wars = movie("Star Wars", MatchSource::Normalized);

        // normalized, jamo and display all apply
        let score = apply_bonuses(0.3, &star_wars, &query, &bonuses);
        assert!((score - 0.05).abs() < 1e-9);

        assert_eq!(apply_bonuses(0.1, &star_wars, &query, &bonuses), 0.0);
    }

    #[test]
    fn test_display_bonus_is_case_sensitive() {
        let bonuses = PrefixBonuses::default();
        let query = QueryProjections::new("star");
        let star_wars = movie("Star Wars", MatchSource::Normalized);

        let score = apply_bonuses(0.3, &star_wars, &query, &bonuses);
        assert!((score - 0.1).abs() < 1e-9);
    }

    #[test]
    fn test_no_bonus_without_prefix() {
        let bonuses = PrefixBonuses::default();
        let query = QueryProjections::new("wars");
        let star_wars = movie("Star Wars", MatchSource::Other);

        assert_eq!(apply_bonuses(0.3, &star_wars, &query, &bonuses), 0.3);
    }
}

mod backfill {
    use super::*;

    #[test]
    fn test_orders_by_source_then_length() {
        let candidates = vec![
            movie("Display Match", MatchSource::Display),
            movie("Longer Normalized", MatchSource::Normalized),
            movie("Norm", MatchSource::Normalized),
            movie("Jamo", MatchSource::Jamo),
        ];
        let mut scored = Vec::new();

        backfill(&mut scored, &candidates, &BackfillScores::default(), 10);

        let order: Vec<usize> = scored.iter().map(|entry| entry.index).collect();
        assert_eq!(order, vec![2, 1, 3, 0]);
        let scores: Vec<f64> = scored.iter().map(|entry| entry.score).collect();
        assert_eq!(scores, vec![0.1001, 0.1001, 0.2002, 0.4009]);
    }

    #[test]
    fn test_skips_scored_and_stops_at_limit() {
        let candidates = vec![
            movie("A", MatchSource::Normalized),
            movie("B", MatchSource::Normalized),
            movie("C", MatchSource::Initials),
        ];
        let mut scored = vec![Scored {
            index: 0,
            score: 0.0,
        }];

        backfill(&mut scored, &candidates, &BackfillScores::default(), 2);

        assert_eq!(scored.len(), 2);
        assert_eq!(scored[1], Scored {
            index: 1,
            score: 0.1001,
        });
    }
}

#[test]
fn round4_matches_fixed_point() {
    assert_eq!(round4(0.124938), 0.1249);
    assert_eq!(round4(0.12495001), 0.125);
    assert_eq!(round4(0.0), 0.0);
}
