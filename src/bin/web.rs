//! Single binary web server: JSON REST API over the league engine, backed by SQLite.
//! Run with: cargo run --bin web
//! Listens on 0.0.0.0:8080 by default. Override with env: HOST, PORT, DATABASE_URL,
//! THIRD_PLACE_MATCH (see `league_tournament::Config`).

use actix_web::{
    delete, get, post, put,
    web::{Data, Json, Path},
    App, HttpResponse, HttpServer, Responder,
};
use league_tournament::{
    add_player_to_tournament, compute_standings, create_player, create_tournament,
    delete_tournament, get_tournament, get_winner, list_players, list_tournaments,
    remove_player_from_tournament, Config, MatchId, PlayerId, Progression, ScoreSubmission,
    SqliteDatabase, TournamentError, TournamentId,
};
use serde::Deserialize;

/// Shared by every worker: the database pool and the progression engine (with its locks).
struct AppState {
    db: SqliteDatabase,
    progression: Progression,
}

type State = Data<AppState>;

#[derive(serde::Serialize)]
struct HealthResponse {
    ok: bool,
    service: &'static str,
}

#[derive(Deserialize)]
struct NameBody {
    name: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AddPlayerBody {
    player_id: PlayerId,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateMatchesBody {
    #[serde(default)]
    group_count: Option<usize>,
}

/// Path segment: tournament id (e.g. /api/tournaments/{id})
#[derive(Deserialize)]
struct TournamentPath {
    id: TournamentId,
}

/// Path segments: tournament id and player id (e.g. /api/tournaments/{id}/players/{player_id})
#[derive(Deserialize)]
struct TournamentPlayerPath {
    id: TournamentId,
    player_id: PlayerId,
}

#[derive(Deserialize)]
struct MatchPath {
    id: MatchId,
}

/// Map an engine error to its HTTP status with a `{"error": ...}` body.
fn error_response(e: TournamentError) -> HttpResponse {
    let body = serde_json::json!({ "error": e.to_string() });
    match e {
        TournamentError::Validation(_) | TournamentError::InsufficientParticipants { .. } => {
            HttpResponse::BadRequest().json(body)
        }
        TournamentError::NotFound { .. } => HttpResponse::NotFound().json(body),
        TournamentError::Conflict(_) => HttpResponse::Conflict().json(body),
        TournamentError::InconsistentState(_) | TournamentError::Database(_) => {
            log::error!("request failed: {e}");
            HttpResponse::InternalServerError().json(body)
        }
    }
}

fn respond<T: serde::Serialize>(result: Result<T, TournamentError>) -> HttpResponse {
    match result {
        Ok(value) => HttpResponse::Ok().json(value),
        Err(e) => error_response(e),
    }
}

#[get("/api/health")]
async fn api_health() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        ok: true,
        service: "league-tournament",
    })
}

#[get("/api/players")]
async fn api_list_players(state: State) -> HttpResponse {
    respond(list_players(&state.db).await)
}

#[post("/api/players")]
async fn api_create_player(state: State, body: Json<NameBody>) -> HttpResponse {
    match create_player(&state.db, &body.name).await {
        Ok(player) => HttpResponse::Created().json(player),
        Err(e) => error_response(e),
    }
}

/// Every tournament with roster and matches, newest first.
#[get("/api/tournaments")]
async fn api_list_tournaments(state: State) -> HttpResponse {
    respond(list_tournaments(&state.db).await)
}

#[post("/api/tournaments")]
async fn api_create_tournament(state: State, body: Json<NameBody>) -> HttpResponse {
    match create_tournament(&state.db, &body.name).await {
        Ok(tournament) => HttpResponse::Created().json(tournament),
        Err(e) => error_response(e),
    }
}

#[get("/api/tournaments/{id}")]
async fn api_get_tournament(state: State, path: Path<TournamentPath>) -> HttpResponse {
    respond(get_tournament(&state.db, path.id).await)
}

/// Delete a tournament with its matches and roster.
#[delete("/api/tournaments/{id}")]
async fn api_delete_tournament(state: State, path: Path<TournamentPath>) -> HttpResponse {
    match delete_tournament(&state.db, path.id).await {
        Ok(()) => HttpResponse::NoContent().finish(),
        Err(e) => error_response(e),
    }
}

/// Add a player to the roster (tournament must be pending).
#[post("/api/tournaments/{id}/players")]
async fn api_add_player(
    state: State,
    path: Path<TournamentPath>,
    body: Json<AddPlayerBody>,
) -> HttpResponse {
    if let Err(e) = add_player_to_tournament(&state.db, path.id, body.player_id).await {
        return error_response(e);
    }
    respond(get_tournament(&state.db, path.id).await)
}

/// Remove a player from the roster (tournament must be pending).
#[delete("/api/tournaments/{id}/players/{player_id}")]
async fn api_remove_player(state: State, path: Path<TournamentPlayerPath>) -> HttpResponse {
    if let Err(e) = remove_player_from_tournament(&state.db, path.id, path.player_id).await {
        return error_response(e);
    }
    respond(get_tournament(&state.db, path.id).await)
}

/// Shuffle the roster into groups and create the round-robin matches.
#[post("/api/tournaments/{id}/generate-matches")]
async fn api_generate_matches(
    state: State,
    path: Path<TournamentPath>,
    body: Option<Json<GenerateMatchesBody>>,
) -> HttpResponse {
    let group_count = body.and_then(|b| b.group_count);
    respond(
        state
            .progression
            .generate_matches(&state.db, path.id, group_count)
            .await,
    )
}

#[get("/api/tournaments/{id}/standings")]
async fn api_standings(state: State, path: Path<TournamentPath>) -> HttpResponse {
    respond(compute_standings(&state.db, path.id).await)
}

/// Champion once the final is played, otherwise `null`.
#[get("/api/tournaments/{id}/winner")]
async fn api_winner(state: State, path: Path<TournamentPath>) -> HttpResponse {
    respond(get_winner(&state.db, path.id).await)
}

/// Record a match result; the bracket advances as a side effect.
#[put("/api/matches/{id}/score")]
async fn api_update_score(
    state: State,
    path: Path<MatchPath>,
    body: Json<ScoreSubmission>,
) -> HttpResponse {
    respond(
        state
            .progression
            .submit_score(&state.db, path.id, &body)
            .await,
    )
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = Config::from_env();
    let db = SqliteDatabase::connect(&config.database_url)
        .await
        .map_err(std::io::Error::other)?;
    db.init_schema().await.map_err(std::io::Error::other)?;
    log::info!("Database ready at {}", config.database_url);
    if config.third_place_match {
        log::info!("Third-place match enabled");
    }

    let state = Data::new(AppState {
        db,
        progression: Progression::new(config.progression()),
    });

    let bind = (config.host.as_str(), config.port);
    log::info!("Starting server at http://{}:{}", bind.0, bind.1);

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .service(api_health)
            .service(api_list_players)
            .service(api_create_player)
            .service(api_list_tournaments)
            .service(api_create_tournament)
            .service(api_get_tournament)
            .service(api_delete_tournament)
            .service(api_add_player)
            .service(api_remove_player)
            .service(api_generate_matches)
            .service(api_standings)
            .service(api_winner)
            .service(api_update_score)
    })
    .bind(bind)?
    .run()
    .await
}
