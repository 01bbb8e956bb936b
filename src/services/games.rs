use crate::error::AppError;
use crate::models::games::*;
use crate::scoring::{GameCatalog, GameDefinition};
use chrono::NaiveDate;
use sha2::{Digest, Sha256};

pub fn list_games(catalog: &GameCatalog) -> Vec<GameInfo> {
    catalog.iter().map(GameInfo::from).collect()
}

fn seed_for_date(date: NaiveDate) -> u64 {
    let mut hasher = Sha256::new();
    hasher.update(date.format("%Y-%m-%d").to_string().as_bytes());
    hasher.update(b"rankle-featured");
    let digest = hasher.finalize();
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    u64::from_be_bytes(bytes)
}

fn pick_weighted(catalog: &GameCatalog, seed: u64) -> Option<&GameDefinition> {
    if catalog.is_empty() {
        return None;
    }
    let total: u64 = catalog.iter().map(|g| u64::from(g.rating)).sum();
    if total == 0 {
        return None;
    }
    let mut ticket = seed % total;
    for game in catalog.iter() {
        let weight = u64::from(game.rating);
        if ticket < weight {
            return Some(game);
        }
        ticket -= weight;
    }
    None
}

/// Same game for everyone on a given day; higher rated games come up more often.
pub fn game_of_the_day(catalog: &GameCatalog, date: NaiveDate) -> Result<FeaturedGame, AppError> {
    let game = pick_weighted(catalog, seed_for_date(date))
        .ok_or_else(|| AppError::Config("no rated games to feature".into()))?;
    Ok(FeaturedGame {
        date,
        game: GameInfo::from(game),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn lists_every_game_in_order() {
        let catalog = GameCatalog::standard().unwrap();
        let games = list_games(&catalog);
        assert_eq!(games.len(), catalog.len());
        assert_eq!(games[0].id, "wordle");
        assert!(games.iter().all(|g| !g.expected_format.is_empty()));
    }

    #[test]
    fn featured_game_is_stable_per_day() {
        let catalog = GameCatalog::standard().unwrap();
        let date = NaiveDate::from_ymd_opt(2024, 8, 20).unwrap();
        let first = game_of_the_day(&catalog, date).unwrap();
        let second = game_of_the_day(&catalog, date).unwrap();
        assert_eq!(first.game.id, second.game.id);
        assert_eq!(first.date, date);
    }

    #[test]
    fn featured_game_varies_over_a_month() {
        let catalog = GameCatalog::standard().unwrap();
        let start = NaiveDate::from_ymd_opt(2024, 8, 1).unwrap();
        let picks: HashSet<String> = start
            .iter_days()
            .take(31)
            .map(|d| game_of_the_day(&catalog, d).unwrap().game.id)
            .collect();
        assert!(picks.len() > 1);
    }

    #[test]
    fn empty_catalog_has_no_featured_game() {
        let catalog = GameCatalog::new(Vec::new()).unwrap();
        let date = NaiveDate::from_ymd_opt(2024, 8, 20).unwrap();
        assert!(matches!(game_of_the_day(&catalog, date), Err(AppError::Config(_))));
    }

    #[test]
    fn weights_respected() {
        let catalog = GameCatalog::standard().unwrap();
        let total: u64 = catalog.iter().map(|g| u64::from(g.rating)).sum();
        let first = catalog.iter().next().unwrap();
        assert_eq!(pick_weighted(&catalog, 0).unwrap().id, first.id);
        assert_eq!(pick_weighted(&catalog, total).unwrap().id, first.id);
        let last_rated = catalog.iter().filter(|g| g.rating > 0).last().unwrap();
        assert_eq!(pick_weighted(&catalog, total - 1).unwrap().id, last_rated.id);
    }
}
