//! Integration tests for the non-interactive commands.

use kv_attention_tour::cli::{self, Cli, Commands};
use kv_attention_tour::nav::{Phase, Track};
use kv_attention_tour::{Error, TourConfig};

use clap::Parser;

fn output(f: impl FnOnce(&mut Vec<u8>) -> kv_attention_tour::Result<()>) -> String {
    let mut out = Vec::new();
    f(&mut out).unwrap();
    String::from_utf8(out).unwrap()
}

#[test]
fn test_list_tracks() {
    let text = output(|out| cli::list_tracks(out));
    assert!(text.contains("Prefill (prefill, 7 steps)"));
    assert!(text.contains("Decoding (KV cache) (decoding, 6 steps)"));
    assert!(text.contains("Decoding (no cache) (no-cache, 6 steps)"));
}

#[test]
fn test_show_single_step() {
    let config = TourConfig::default();
    let text = output(|out| cli::show_track(&config, Track::Prefill, Some(4), out));
    assert!(text.starts_with("4. Attention scores"));
    assert!(!text.contains("5. Weighted values"));
}

#[test]
fn test_show_whole_track() {
    let config = TourConfig::default();
    let text = output(|out| cli::show_track(&config, Track::Decoding, None, out));
    assert!(text.contains("1. Single-token input"));
    assert!(text.contains("6. Output for the new token"));
}

#[test]
fn test_show_out_of_range() {
    let mut out = Vec::new();
    let err = cli::show_track(&TourConfig::default(), Track::Prefill, Some(8), &mut out);
    assert!(matches!(
        err,
        Err(Error::StepOutOfRange {
            track: "prefill",
            step: 8,
            len: 7
        })
    ));
}

#[test]
fn test_boundary_parsing() {
    assert_eq!(cli::parse_track("no-cache").unwrap(), Track::NoCache);
    assert!(matches!(cli::parse_track("greedy"), Err(Error::UnknownTrack(_))));
    assert_eq!(cli::parse_phase(3).unwrap(), Phase::Three);
    assert!(matches!(cli::parse_phase(7), Err(Error::InvalidPhase(7))));
}

#[test]
fn test_overview_output() {
    let config = TourConfig::default();
    let text = output(|out| cli::show_overview(&config, Phase::Two, out));
    assert!(text.starts_with(Phase::Two.title()));
    assert!(text.contains("Kⁱ_cache"));
}

#[test]
fn test_instant_play_runs_to_the_end() {
    let config = TourConfig::default();
    let mut out = Vec::new();
    let ticks = cli::play_track(&config, Track::Prefill, None, true, &mut out).unwrap();
    let text = String::from_utf8(out).unwrap();

    assert_eq!(ticks, 6);
    assert!(text.contains("▶ 1. Input embedding"));
    assert!(text.contains("■ 7. Output projection and cache fill"));
}

#[test]
fn test_play_respects_tick_limit() {
    let config = TourConfig::default();
    let mut out = Vec::new();
    let ticks = cli::play_track(&config, Track::NoCache, Some(2), true, &mut out).unwrap();
    let text = String::from_utf8(out).unwrap();

    assert_eq!(ticks, 2);
    assert!(text.contains("▶ 3. Recompute the full score matrix"));
    assert!(!text.contains("4. Head outputs"));
}

#[test]
fn test_global_flags_after_subcommand() {
    let cli = Cli::parse_from(["kv-attention-tour", "overview", "--phase", "2", "-v"]);
    assert_eq!(cli.command, Some(Commands::Overview { phase: 2 }));
    assert_eq!(cli.verbose, 1);
    assert!(cli.load_config().is_ok());
}
