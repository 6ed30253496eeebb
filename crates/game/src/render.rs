use crate::state::GameState;
use chrono::Local;
use comfy_table::{presets::UTF8_FULL, Cell, CellAlignment, Table};
use core_types::{Attempt, LeaderboardEntry, TimeFilter};

/// The prompt shown for each state.
pub fn status_line(state: &GameState) -> String {
    match state {
        GameState::Waiting => "Press Enter to start.".to_string(),
        GameState::Ready { .. } => "Wait for green... (don't press anything yet)".to_string(),
        GameState::Green { .. } => ">>> GREEN! PRESS ENTER NOW! <<<".to_string(),
        GameState::Finished { reaction_time_ms } => format!(
            "{reaction_time_ms}ms! Type 's' to submit, or press Enter to play again."
        ),
        GameState::FalseStart { .. } => {
            "False start! You pressed too early. Press Enter to retry.".to_string()
        }
    }
}

fn rank_label(rank: u32) -> String {
    match rank {
        1 => "🥇".to_string(),
        2 => "🥈".to_string(),
        3 => "🥉".to_string(),
        n => format!("#{n}"),
    }
}

pub fn leaderboard_table(filter: TimeFilter, entries: &[LeaderboardEntry]) -> String {
    if entries.is_empty() {
        return format!(
            "Leaderboard ({}): no scores yet for this time period. Be the first!",
            filter.label()
        );
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_header(vec!["Rank", "Name", "Time", "Date"]);
    for entry in entries {
        table.add_row(vec![
            Cell::new(rank_label(entry.rank)).set_alignment(CellAlignment::Center),
            Cell::new(&entry.participant_name),
            Cell::new(format!("{}ms", entry.reaction_time_ms)).set_alignment(CellAlignment::Right),
            Cell::new(entry.created_at.with_timezone(&Local).format("%Y-%m-%d")),
        ]);
    }
    format!("Leaderboard ({})\n{table}", filter.label())
}

pub fn personal_best_line(name: &str, best: Option<&Attempt>) -> String {
    match best {
        Some(attempt) => format!(
            "Personal best for {name}: {}ms (set on {})",
            attempt.reaction_time_ms,
            attempt.created_at.with_timezone(&Local).format("%Y-%m-%d")
        ),
        None => format!("No personal best yet for {name}."),
    }
}

pub const HELP: &str = "\
Commands:
  <Enter>      start / react / continue
  s            submit a finished round
  n <name>     set your name
  f <filter>   show all_time, this_month, this_week or today
  l            reload the leaderboard
  h            show this help
  q            quit";
