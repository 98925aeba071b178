//! JSON encoding of [`MatchSnapshot`] for the save/load collaborator.
//!
//! The engine produces snapshots with [`RoundEngine::snapshot`] and loads
//! them with [`RoundEngine::restore`]. This module only moves them to and
//! from JSON text and files.
//!
//! [`RoundEngine::snapshot`]: crate::engine::RoundEngine::snapshot
//! [`RoundEngine::restore`]: crate::engine::RoundEngine::restore

use std::path::Path;

use bakunawa_types::MatchSnapshot;

/// Errors that can occur when encoding, decoding, or loading a snapshot.
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    /// Snapshot JSON could not be produced or parsed.
    #[error("snapshot JSON error: {source}")]
    Json {
        /// The underlying serde error.
        #[from]
        source: serde_json::Error,
    },

    /// The snapshot file could not be read or written.
    #[error("snapshot file error: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// The snapshot describes an impossible match state.
    #[error("inconsistent snapshot: {reason}")]
    Inconsistent {
        /// What does not add up.
        reason: String,
    },
}

/// Encode a snapshot as pretty-printed JSON.
///
/// # Errors
///
/// Returns [`SnapshotError::Json`] if serialization fails.
pub fn to_json(snapshot: &MatchSnapshot) -> Result<String, SnapshotError> {
    Ok(serde_json::to_string_pretty(snapshot)?)
}

/// Decode a snapshot from JSON.
///
/// # Errors
///
/// Returns [`SnapshotError::Json`] for malformed input, or
/// [`SnapshotError::Inconsistent`] if round number and history disagree.
pub fn from_json(json: &str) -> Result<MatchSnapshot, SnapshotError> {
    let snapshot: MatchSnapshot = serde_json::from_str(json)?;
    check_consistency(&snapshot)?;
    Ok(snapshot)
}

/// Write a snapshot to `path` as JSON.
///
/// # Errors
///
/// Returns [`SnapshotError`] if encoding or writing fails.
pub fn save(path: &Path, snapshot: &MatchSnapshot) -> Result<(), SnapshotError> {
    std::fs::write(path, to_json(snapshot)?)?;
    Ok(())
}

/// Read a snapshot from a JSON file.
///
/// # Errors
///
/// Returns [`SnapshotError`] if reading, decoding, or the consistency check
/// fails.
pub fn load(path: &Path) -> Result<MatchSnapshot, SnapshotError> {
    let contents = std::fs::read_to_string(path)?;
    from_json(&contents)
}

/// Round number must be at least 1. History holds the resolved rounds,
/// numbered from 1 in order: either every round before the current one, or
/// those plus the current round once it has been resolved.
pub(crate) fn check_consistency(snapshot: &MatchSnapshot) -> Result<(), SnapshotError> {
    if snapshot.current_round < 1 {
        return Err(SnapshotError::Inconsistent {
            reason: String::from("current_round must be at least 1"),
        });
    }
    let before = usize::try_from(snapshot.current_round.saturating_sub(1)).unwrap_or(usize::MAX);
    let resolved = usize::try_from(snapshot.current_round).unwrap_or(usize::MAX);
    let len = snapshot.history.len();
    if len != before && len != resolved {
        return Err(SnapshotError::Inconsistent {
            reason: format!(
                "round {} needs {before} or {resolved} resolved rounds, snapshot has {len}",
                snapshot.current_round
            ),
        });
    }
    for (number, record) in (1_u32..).zip(&snapshot.history) {
        if record.round_number != number {
            return Err(SnapshotError::Inconsistent {
                reason: format!(
                    "history entry for round {number} is numbered {}",
                    record.round_number
                ),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use bakunawa_types::{MatchId, RoundRecord, Team};
    use chrono::Utc;

    use super::*;

    fn record(round_number: u32) -> RoundRecord {
        RoundRecord {
            round_number,
            dice_result: None,
            round_winner: Some(Team::Bakunawa),
            moon_judgment_triggered: false,
            phenomenon_triggered: false,
            active_moon_effect_name: None,
            active_phenomenon_name: None,
        }
    }

    fn snapshot(current_round: u32, history: Vec<RoundRecord>) -> MatchSnapshot {
        MatchSnapshot {
            match_id: MatchId::new(),
            current_round,
            favor: 2,
            active_phenomenon_name: Some(String::from("Crimson Eclipse")),
            phenomenon_duration: 1,
            last_moon_effect_name: None,
            history,
            saved_at: Utc::now(),
        }
    }

    #[test]
    fn json_round_trip() {
        let original = snapshot(3, vec![record(1), record(2)]);
        let json = to_json(&original).unwrap();
        assert!(json.contains("Crimson Eclipse"));
        assert_eq!(from_json(&json).unwrap(), original);
    }

    #[test]
    fn history_may_be_omitted_on_round_one() {
        let mut value = serde_json::to_value(snapshot(1, Vec::new())).unwrap();
        value.as_object_mut().unwrap().remove("history");
        let restored = from_json(&value.to_string()).unwrap();
        assert!(restored.history.is_empty());
    }

    #[test]
    fn rejects_history_length_mismatch() {
        let err = from_json(&to_json(&snapshot(3, vec![record(1)])).unwrap()).unwrap_err();
        assert!(matches!(err, SnapshotError::Inconsistent { .. }));
    }

    #[test]
    fn accepts_resolved_current_round() {
        let resolved = snapshot(3, vec![record(1), record(2), record(3)]);
        assert!(check_consistency(&resolved).is_ok());

        let ahead = snapshot(2, vec![record(1), record(2), record(3)]);
        assert!(check_consistency(&ahead).is_err());
    }

    #[test]
    fn rejects_misnumbered_history() {
        let bad = snapshot(3, vec![record(1), record(5)]);
        assert!(check_consistency(&bad).is_err());
        assert!(check_consistency(&snapshot(0, Vec::new())).is_err());
    }

    #[test]
    fn rejects_malformed_json() {
        assert!(matches!(
            from_json("{not json"),
            Err(SnapshotError::Json { .. })
        ));
    }

    #[test]
    fn file_round_trip() {
        let dir = std::env::temp_dir().join(format!("bakunawa-snapshot-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("match.json");

        let original = snapshot(2, vec![record(1)]);
        save(&path, &original).unwrap();
        assert_eq!(load(&path).unwrap(), original);

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
