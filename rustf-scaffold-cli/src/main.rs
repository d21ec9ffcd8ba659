use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

use commands::request::Operation;
use commands::GlobalArgs;

#[derive(Parser)]
#[command(name = "rustf-scaffold")]
#[command(about = "Generate RustF CRUD views and controllers from database tables")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (defaults to ./scaffold.toml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Database URL, overrides the configuration and DATABASE_URL
    #[arg(long, global = true)]
    database_url: Option<String>,

    /// JSON schema snapshot to use instead of a database
    #[arg(long, global = true)]
    schema_file: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List the tables available for scaffolding
    Tables {
        /// Output format (table, json)
        #[arg(long, default_value = "table")]
        format: String,
    },

    /// Build the editable field descriptors for a table
    Create {
        /// Table name
        table: String,

        /// Module title shown in the generated view
        #[arg(short, long)]
        title: String,

        /// Write the descriptor payload to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Preview the generated view for an edited descriptor payload
    Update {
        /// Descriptor payload produced by `create`
        payload: PathBuf,
    },

    /// Write the view and controller for a descriptor payload
    Produce {
        /// Descriptor payload produced by `create`
        payload: PathBuf,

        /// View file name (defaults to the configured view name)
        #[arg(long)]
        view_file: Option<String>,

        /// Controller file name (defaults to <Model>Controller)
        #[arg(long)]
        controller_file: Option<String>,

        /// Also save the six action permissions
        #[arg(long)]
        auth: bool,

        /// Also save a navigation menu entry
        #[arg(long)]
        menu: bool,

        /// Overwrite existing view and controller files
        #[arg(short, long)]
        force: bool,
    },

    /// Run one boundary operation on a JSON request and print the JSON response
    Request {
        #[arg(value_enum)]
        operation: Operation,

        /// Request file (stdin if not specified)
        #[arg(short, long)]
        input: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if cli.verbose {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    }

    let global = GlobalArgs {
        config: cli.config,
        database_url: cli.database_url,
        schema_file: cli.schema_file,
    };

    match cli.command {
        Commands::Tables { format } => commands::tables::run(&global, &format).await,
        Commands::Create {
            table,
            title,
            output,
        } => commands::create::run(&global, table, title, output).await,
        Commands::Update { payload } => commands::update::run(&global, &payload).await,
        Commands::Produce {
            payload,
            view_file,
            controller_file,
            auth,
            menu,
            force,
        } => {
            let options = commands::produce::ProduceOptions {
                view_file,
                controller_file,
                generate_auth: auth,
                generate_menu: menu,
                allow_overwrite: force,
            };
            commands::produce::run(&global, &payload, options).await
        }
        Commands::Request { operation, input } => {
            commands::request::run(&global, operation, input.as_deref()).await
        }
    }
}
