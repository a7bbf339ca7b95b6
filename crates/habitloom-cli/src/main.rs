use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "habitloom-cli", version, about = "Habitloom CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Habit management
    Habit {
        #[command(subcommand)]
        action: commands::habit::HabitAction,
    },
    /// Completion log queries
    Log {
        #[command(subcommand)]
        action: commands::log::LogAction,
    },
    /// Badge catalog and unlocks
    Badge {
        #[command(subcommand)]
        action: commands::badge::BadgeAction,
    },
    /// Daily maintenance sweep
    Sweep {
        #[command(subcommand)]
        action: commands::sweep::SweepAction,
    },
    /// Habit statistics
    Stats {
        #[command(subcommand)]
        action: commands::stats::StatsAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Generate shell completions
    Completions {
        /// Target shell
        shell: clap_complete::Shell,
    },
}

fn main() {
    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Habit { action } => commands::habit::run(action),
        Commands::Log { action } => commands::log::run(action),
        Commands::Badge { action } => commands::badge::run(action),
        Commands::Sweep { action } => commands::sweep::run(action),
        Commands::Stats { action } => commands::stats::run(action),
        Commands::Config { action } => commands::config::run(action),
        Commands::Completions { shell } => {
            use clap::CommandFactory;
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            clap_complete::generate(shell, &mut cmd, name, &mut std::io::stdout());
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
