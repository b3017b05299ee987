mod handlers;

use axum::{
    extract::FromRef,
    routing::{get, post, put},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::ServerConfig;
use crate::db::Database;
use crate::routines::RoutineCatalog;
use crate::stacks::HabitStacks;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub stacks: HabitStacks<Database>,
    pub routines: RoutineCatalog,
}

impl FromRef<AppState> for HabitStacks<Database> {
    fn from_ref(state: &AppState) -> Self {
        state.stacks.clone()
    }
}

impl FromRef<AppState> for RoutineCatalog {
    fn from_ref(state: &AppState) -> Self {
        state.routines.clone()
    }
}

/// Router with permissive CORS.
pub fn create_router(db: Database) -> Router {
    build_router(db, CorsLayer::permissive())
}

/// Router configured from [`ServerConfig`].
pub fn create_router_with_config(db: Database, config: &ServerConfig) -> Router {
    build_router(db, config.cors_layer())
}

fn build_router(db: Database, cors: CorsLayer) -> Router {
    let state = AppState {
        stacks: HabitStacks::new(db),
        routines: RoutineCatalog::builtin(),
    };

    let api = Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        // Routines
        .route("/predefined-routines", get(handlers::list_routines))
        // Habit stacks
        .route(
            "/habit-stacks",
            get(handlers::list_stacks).post(handlers::create_stack),
        )
        .route(
            "/habit-stacks/{id}",
            get(handlers::get_stack)
                .put(handlers::update_stack)
                .delete(handlers::delete_stack),
        )
        // Habits within a stack
        .route("/habit-stacks/{id}/habits", post(handlers::add_habit))
        .route(
            "/habit-stacks/{id}/habits/{habit_id}",
            put(handlers::update_habit).delete(handlers::remove_habit),
        );

    Router::new()
        .nest("/api", api)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}
