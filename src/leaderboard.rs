//! High-score leaderboard: the ten best `(initials, score)` pairs, best first.
//!
//! On disk it is plain text, one `<initials> <score>` per line, always
//! rewritten in full.

use std::io::ErrorKind;
use std::path::Path;

use tracing::{info, warn};

use crate::compute::initial_letter;
use crate::config::{INITIALS_LEN, LEADERBOARD_CAPACITY};
use crate::error::{GameError, GameResult};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LeaderboardEntry {
    pub initials: String,
    pub score: u32,
}

impl LeaderboardEntry {
    pub fn new(initials: impl Into<String>, score: u32) -> Self {
        Self {
            initials: initials.into(),
            score,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Leaderboard {
    entries: Vec<LeaderboardEntry>,
}

impl Leaderboard {
    /// Build a board from arbitrary entries: sorted descending, truncated.
    pub fn from_entries(mut entries: Vec<LeaderboardEntry>) -> Self {
        entries.sort_by(|a, b| b.score.cmp(&a.score));
        entries.truncate(LEADERBOARD_CAPACITY);
        Self { entries }
    }

    pub fn entries(&self) -> &[LeaderboardEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn best(&self) -> Option<u32> {
        self.entries.first().map(|e| e.score)
    }

    /// Slot `score` would take, if it makes the board at all.  Ties rank
    /// below the scores already recorded.
    fn rank_of(&self, score: u32) -> Option<usize> {
        let rank = self
            .entries
            .iter()
            .position(|e| e.score < score)
            .unwrap_or(self.entries.len());
        (rank < LEADERBOARD_CAPACITY).then_some(rank)
    }

    pub fn qualifies(&self, score: u32) -> bool {
        self.rank_of(score).is_some()
    }

    /// Insert `entry` in score order.  Returns the updated board and whether
    /// the entry made it; a rejected entry leaves the board unchanged.
    pub fn insert(&self, entry: LeaderboardEntry) -> (Leaderboard, bool) {
        match self.rank_of(entry.score) {
            Some(rank) => {
                let mut entries = self.entries.clone();
                entries.insert(rank, entry);
                entries.truncate(LEADERBOARD_CAPACITY);
                (Leaderboard { entries }, true)
            }
            None => (self.clone(), false),
        }
    }
}

// ── Text format ───────────────────────────────────────────────────────────────

fn parse_line(line: &str, number: usize) -> GameResult<LeaderboardEntry> {
    let mut fields = line.split_whitespace();
    let (Some(initials), Some(score), None) = (fields.next(), fields.next(), fields.next())
    else {
        return Err(GameError::InvalidEntry {
            line: number,
            message: format!("expected `<initials> <score>`, got {line:?}"),
        });
    };
    let valid = (1..=INITIALS_LEN).contains(&initials.chars().count())
        && initials.chars().all(|c| initial_letter(c) == Some(c));
    if !valid {
        return Err(GameError::InvalidEntry {
            line: number,
            message: format!("initials must be 1 to {INITIALS_LEN} capital letters, got {initials:?}"),
        });
    }
    let score = score.parse().map_err(|e| GameError::InvalidEntry {
        line: number,
        message: format!("bad score {score:?}: {e}"),
    })?;
    Ok(LeaderboardEntry::new(initials, score))
}

/// Parse leaderboard text.  Blank lines are ignored; malformed lines are
/// skipped with a warning rather than failing the whole board.
pub fn parse(text: &str) -> Leaderboard {
    let entries = text
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .filter_map(|(i, line)| match parse_line(line, i + 1) {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!(error = %e, "skipping leaderboard line");
                None
            }
        })
        .collect();
    Leaderboard::from_entries(entries)
}

pub fn render(board: &Leaderboard) -> String {
    board
        .entries
        .iter()
        .map(|e| format!("{} {}\n", e.initials, e.score))
        .collect()
}

// ── Persistence ───────────────────────────────────────────────────────────────

/// Read the board from `path`.  A missing file is an empty board.
pub fn load(path: &Path) -> GameResult<Leaderboard> {
    match std::fs::read_to_string(path) {
        Ok(text) => {
            let board = parse(&text);
            info!(path = %path.display(), entries = board.len(), "leaderboard loaded");
            Ok(board)
        }
        Err(e) if e.kind() == ErrorKind::NotFound => {
            info!(path = %path.display(), "no leaderboard yet");
            Ok(Leaderboard::default())
        }
        Err(source) => Err(GameError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Rewrite the whole file at `path`.
pub fn save(path: &Path, board: &Leaderboard) -> GameResult<()> {
    std::fs::write(path, render(board)).map_err(|source| GameError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    info!(path = %path.display(), entries = board.len(), "leaderboard saved");
    Ok(())
}
