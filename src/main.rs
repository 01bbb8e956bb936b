mod config;
mod db;
mod error;
mod handlers;
mod identity;
mod models;
mod scoring;
mod services;
mod state;
mod validation;

use config::Config;
use db::Db;
use ntex::web::{self, middleware::Logger};
use ntex_cors::Cors;
use scoring::GameCatalog;
use state::AppState;
use std::io;
use std::sync::Arc;

fn routes(cfg: &mut web::ServiceConfig) {
    cfg
        // Health check
        .route("/api/health", web::get().to(health))
        // Games
        .route("/api/games", web::get().to(handlers::games::list_games))
        .route("/api/games/featured", web::get().to(handlers::games::featured_game))
        // Users
        .service(
            web::resource("/api/users/me")
                .route(web::get().to(handlers::users::get_me))
                .route(web::post().to(handlers::users::upsert_me))
                .route(web::patch().to(handlers::users::update_me)),
        )
        // Scores
        .route("/api/scores", web::post().to(handlers::gameplay::submit_score))
        .route("/api/scores/me", web::get().to(handlers::gameplay::my_scores))
        .route("/api/analytics/me", web::get().to(handlers::gameplay::my_analytics))
        // Leaderboards
        .route("/api/leaderboard/global", web::get().to(handlers::leaderboard::global_leaderboard))
        .route(
            "/api/groups/{id}/leaderboard",
            web::get().to(handlers::leaderboard::group_leaderboard),
        )
        // Groups
        .route("/api/groups", web::post().to(handlers::groups::create_group))
        .route("/api/groups/mine", web::get().to(handlers::groups::my_groups))
        .route("/api/groups/public", web::get().to(handlers::groups::public_groups))
        .route("/api/groups/join", web::post().to(handlers::groups::join_group))
        .route("/api/groups/{id}/leave", web::post().to(handlers::groups::leave_group))
        .service(
            web::resource("/api/groups/{id}")
                .route(web::get().to(handlers::groups::get_group))
                .route(web::delete().to(handlers::groups::delete_group)),
        )
        // Friends
        .service(
            web::resource("/api/friends")
                .route(web::get().to(handlers::friends::list_friends))
                .route(web::post().to(handlers::friends::add_friend)),
        )
        // Feedback
        .route("/api/feedback", web::post().to(handlers::feedback::submit_feedback));
}

#[ntex::main]
async fn main() -> io::Result<()> {
    let filters = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into());
    pretty_env_logger::formatted_builder().parse_filters(&filters).init();

    let config = Config::from_env().map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
    let catalog = GameCatalog::standard().map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
    let db = Db::open(&config.database_path).map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;

    log::info!(
        "Rankle server starting on {} ({} games, database {})",
        config.bind_address(),
        catalog.len(),
        config.database_path
    );

    let state = Arc::new(AppState { db, catalog });
    let cors_origin = config.cors_origin.clone();

    web::HttpServer::new(move || {
        web::App::new()
            .state(state.clone())
            .wrap(
                Cors::new()
                    .allowed_origin(cors_origin.as_str())
                    .allowed_methods(vec!["GET", "POST", "PATCH", "DELETE", "OPTIONS"])
                    .allowed_headers(vec![
                        "Content-Type",
                        identity::USER_ID_HEADER,
                        identity::USER_NAME_HEADER,
                        identity::USER_EMAIL_HEADER,
                        identity::USER_PHOTO_HEADER,
                    ])
                    .max_age(3600)
                    .finish(),
            )
            .wrap(Logger::default())
            .configure(routes)
    })
    .bind(config.bind_address())?
    .run()
    .await
}

async fn health() -> web::HttpResponse {
    web::HttpResponse::Ok().json(&serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::Identity;
    use crate::scoring::leaderboard::LeaderboardKind;
    use ntex::http::StatusCode;
    use ntex::web::test;

    fn test_state() -> Arc<AppState> {
        Arc::new(AppState {
            db: Db::open_in_memory().expect("Failed to open in-memory DB"),
            catalog: GameCatalog::standard().expect("Failed to build catalog"),
        })
    }

    #[test]
    fn test_group_day_end_to_end() {
        let state = test_state();
        let ann = Identity::new("u-ann", Some("Ann"));
        let bob = Identity::new("u-bob", Some("Bob"));

        let group = services::groups::create_group(
            &state.db,
            &state.catalog,
            &ann,
            models::groups::CreateGroupRequest {
                name: "Puzzle Pals".into(),
                game_ids: vec!["wordle".into(), "connections".into()],
                join_code: Some("pals".into()),
                is_public: true,
            },
        )
        .unwrap();
        services::groups::join_group(
            &state.db,
            &bob,
            models::groups::JoinGroupRequest {
                join_code: "PALS".into(),
            },
        )
        .unwrap();

        let connections = "Connections Puzzle #746\n🟨🟨🟨🟨\n🟪🟪🟪🟪\n🟩🟩🟦🟩\n🟩🟩🟩🟩\n🟦🟦🟦🟦";
        for (who, game_id, text) in [
            (&ann, "wordle", "Wordle 1,468 4/6"),
            (&ann, "connections", connections),
            (&bob, "wordle", "Wordle 1,468 3/6"),
        ] {
            services::gameplay::submit_score(
                &state.db,
                &state.catalog,
                who,
                models::gameplay::ScoreSubmission {
                    game_id: game_id.into(),
                    group_id: Some(group.group_id.clone()),
                    text: text.into(),
                },
            )
            .unwrap();
        }

        let total = services::leaderboard::group_leaderboard(
            &state.db,
            "u-ann",
            &group.group_id,
            models::leaderboard::LeaderboardQuery {
                kind: None,
                scope: None,
                date: None,
            },
        )
        .unwrap();
        assert_eq!(total.entries[0].player_id, "u-ann");
        assert_eq!(total.entries[0].total_score, 80 + 85);
        assert_eq!(total.entries[1].total_score, 90);

        let ranked = services::leaderboard::group_leaderboard(
            &state.db,
            "u-bob",
            &group.group_id,
            models::leaderboard::LeaderboardQuery {
                kind: Some(LeaderboardKind::RankPoints),
                scope: None,
                date: None,
            },
        )
        .unwrap();
        // Bob won the only game he played; Ann was 2nd at wordle and 1st at connections.
        assert_eq!(ranked.entries[0].player_id, "u-bob");
        assert_eq!(ranked.entries[0].rank_points, Some(1));
        assert_eq!(ranked.entries[1].rank_points, Some(3));

        let profile = services::users::get_profile(&state.db, "u-ann").unwrap();
        assert_eq!(profile.profile.total_score, 165);
    }

    #[ntex::test]
    async fn test_health() {
        let app = test::init_service(web::App::new().state(test_state()).configure(routes)).await;
        let req = test::TestRequest::get().uri("/api/health").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[ntex::test]
    async fn test_profile_requires_identity() {
        let app = test::init_service(web::App::new().state(test_state()).configure(routes)).await;
        let req = test::TestRequest::get().uri("/api/users/me").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[ntex::test]
    async fn test_unparseable_score_is_unprocessable() {
        let app = test::init_service(web::App::new().state(test_state()).configure(routes)).await;
        let req = test::TestRequest::post()
            .uri("/api/scores")
            .header(identity::USER_ID_HEADER, "u-ann")
            .set_json(&serde_json::json!({ "game_id": "wordle", "text": "hello" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}
