use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use habit_stacks::client::{HabitStacksClient, DEFAULT_URL};
use habit_stacks::config::{self, ServerConfig, DEFAULT_HOST, DEFAULT_PORT};
use habit_stacks::models::*;
use habit_stacks::{api, db};

#[derive(Parser)]
#[command(name = "hstk")]
#[command(about = "Build and keep habit stacks")]
struct Cli {
    /// Base URL of a running server, used by the client commands
    #[arg(long, global = true, env = "HABIT_STACKS_URL", default_value = DEFAULT_URL)]
    url: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve {
        #[arg(long, env = "HABIT_STACKS_HOST", default_value = DEFAULT_HOST)]
        host: String,

        #[arg(short, long, env = "HABIT_STACKS_PORT", default_value_t = DEFAULT_PORT)]
        port: u16,

        /// SQLite database file (defaults to the platform data directory)
        #[arg(long, env = "HABIT_STACKS_DB")]
        db: Option<PathBuf>,
    },
    /// List predefined routine templates
    Routines,
    /// List saved habit stacks
    List,
    /// Show one habit stack
    Show { id: String },
    /// Create a habit stack
    Create {
        /// Stack name (defaults to the routine's name with --from-routine)
        name: Option<String>,

        /// Seed the stack with a predefined routine's habits
        #[arg(long)]
        from_routine: Option<String>,

        /// Habit to add, in order (repeatable)
        #[arg(long = "habit")]
        habits: Vec<String>,
    },
    /// Rename a habit stack
    Rename { id: String, name: String },
    /// Delete a habit stack
    Delete { id: String },
    /// Append a habit to a stack
    AddHabit {
        stack_id: String,
        name: String,

        #[arg(long, default_value_t = 0)]
        order: u32,
    },
    /// Remove a habit from a stack
    RemoveHabit { stack_id: String, habit_id: String },
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG")
            .unwrap_or_else(|_| "habit_stacks=debug,tower_http=debug".into()),
    );

    // Logs go to stderr so client command output on stdout stays parseable
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn serve(config: ServerConfig) -> anyhow::Result<()> {
    let db = match &config.db_path {
        Some(path) => db::Database::open(path.clone())?,
        None => db::Database::open_default()?,
    };
    db.migrate()?;

    let app = api::create_router_with_config(db, &config);

    let listener = tokio::net::TcpListener::bind(config.bind_addr()).await?;
    tracing::info!("Habit stacks server listening on http://{}", config.bind_addr());

    axum::serve(listener, app).await?;
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let client = HabitStacksClient::new(&cli.url);

    match cli.command {
        Some(Commands::Serve { host, port, db }) => {
            serve(ServerConfig {
                host,
                port,
                db_path: db,
                cors_origins: config::cors_origins_from_env(),
            })
            .await?;
        }
        None => serve(ServerConfig::from_env()).await?,
        Some(Commands::Routines) => print_json(&client.list_routines().await?)?,
        Some(Commands::List) => print_json(&client.list_stacks().await?)?,
        Some(Commands::Show { id }) => print_json(&client.get_stack(&id).await?)?,
        Some(Commands::Create {
            name,
            from_routine,
            habits,
        }) => {
            // Every habit travels in the single create request
            let stack = match (from_routine, name) {
                (Some(routine_id), name) => {
                    client
                        .create_from_routine(&routine_id, name, habits)
                        .await?
                }
                (None, Some(name)) => {
                    client
                        .create_stack(&CreateStackInput::new(name).append_habits(habits))
                        .await?
                }
                (None, None) => anyhow::bail!("A stack name or --from-routine is required"),
            };
            print_json(&stack)?;
        }
        Some(Commands::Rename { id, name }) => {
            let input = UpdateStackInput {
                name: Patch::Set(name),
                ..Default::default()
            };
            print_json(&client.update_stack(&id, &input).await?)?;
        }
        Some(Commands::Delete { id }) => print_json(&client.delete_stack(&id).await?)?,
        Some(Commands::AddHabit {
            stack_id,
            name,
            order,
        }) => {
            print_json(
                &client
                    .add_habit(&stack_id, &AddHabitInput { name, order })
                    .await?,
            )?;
        }
        Some(Commands::RemoveHabit { stack_id, habit_id }) => {
            print_json(&client.remove_habit(&stack_id, &habit_id).await?)?;
        }
    }

    Ok(())
}
