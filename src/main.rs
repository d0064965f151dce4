use std::io;

use clap::Parser;

use kv_attention_tour::cli::{self, Cli, Commands};
use kv_attention_tour::logging::{LogConfig, LogTarget, init_logging};
use kv_attention_tour::{App, Result, tui};

fn main() -> Result<()> {
    let args = Cli::parse();
    let command = args.command.clone().unwrap_or(Commands::Run);

    let target = match (&args.log_file, &command) {
        (Some(path), _) => LogTarget::File(path.clone()),
        (None, Commands::Run) => LogTarget::Discard,
        (None, _) => LogTarget::Stderr,
    };
    init_logging(&LogConfig::from_verbosity(args.verbose).with_target(target))?;

    let config = args.load_config()?;
    match command {
        Commands::Run => {
            let mut app = App::from_config(&config);
            tui::run(&mut app)?;
        }
        Commands::Tracks => cli::list_tracks(&mut io::stdout().lock())?,
        Commands::Show { track, step } => {
            let track = cli::parse_track(&track)?;
            cli::show_track(&config, track, step, &mut io::stdout().lock())?;
        }
        Commands::Overview { phase } => {
            let phase = cli::parse_phase(phase)?;
            cli::show_overview(&config, phase, &mut io::stdout().lock())?;
        }
        Commands::Play {
            track,
            ticks,
            instant,
        } => {
            let track = cli::parse_track(&track)?;
            cli::play_track(&config, track, ticks, instant, &mut io::stdout().lock())?;
        }
    }

    Ok(())
}
