// Roster identities and the read-only store the match engine consults.
//
// Also reads roster files for bulk import into the database: CSV with
// `team,number,name` columns (plus an optional `logo`), or a JSON array of
// teams with nested players.

use std::fmt;
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TeamId(pub i64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub i64);

impl fmt::Display for TeamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A rostered player. The jersey number is kept verbatim so "00" and "0"
/// stay distinct.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub number: String,
}

/// A team and its players, newest player first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub id: TeamId,
    pub name: String,
    pub logo: Option<String>,
    pub players: Vec<Player>,
}

impl Team {
    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }
}

// ---------------------------------------------------------------------------
// Store trait
// ---------------------------------------------------------------------------

/// Read access to team and player identities.
pub trait RosterStore {
    /// Look up a team (with its players) by id.
    fn team(&self, id: TeamId) -> Option<Team>;

    /// Every known team, ordered by name.
    fn teams(&self) -> Vec<Team>;
}

impl RosterStore for [Team] {
    fn team(&self, id: TeamId) -> Option<Team> {
        self.iter().find(|t| t.id == id).cloned()
    }

    fn teams(&self) -> Vec<Team> {
        let mut teams = self.to_vec();
        teams.sort_by(|a, b| a.name.cmp(&b.name));
        teams
    }
}

impl RosterStore for Vec<Team> {
    fn team(&self, id: TeamId) -> Option<Team> {
        self.as_slice().team(id)
    }

    fn teams(&self) -> Vec<Team> {
        self.as_slice().teams()
    }
}

// ---------------------------------------------------------------------------
// Roster file import
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum RosterImportError {
    #[error("failed to read file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("CSV error in {path}: {source}")]
    Csv { path: String, source: csv::Error },

    #[error("JSON error in {path}: {source}")]
    Json {
        path: String,
        source: serde_json::Error,
    },

    #[error("validation error: {0}")]
    Validation(String),
}

/// One parsed roster line.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RosterRow {
    pub team: String,
    pub number: String,
    pub name: String,
    #[serde(default)]
    pub logo: Option<String>,
}

impl RosterRow {
    /// Team, name and jersey number are all required, as for a player added
    /// by hand.
    fn is_complete(&self) -> bool {
        !(self.team.is_empty() || self.name.is_empty() || self.number.is_empty())
    }
}

fn load_rows_from_reader<R: Read>(rdr: R) -> Result<Vec<RosterRow>, csv::Error> {
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(rdr);
    let mut rows = Vec::new();
    for result in reader.deserialize::<RosterRow>() {
        match result {
            Ok(mut row) => {
                if !row.is_complete() {
                    warn!("skipping roster row missing team, number or name: {:?}", row);
                    continue;
                }
                row.logo = row.logo.filter(|logo| !logo.is_empty());
                rows.push(row);
            }
            Err(e) => {
                warn!("skipping malformed roster row: {}", e);
            }
        }
    }
    Ok(rows)
}

/// Read a roster CSV with `team,number,name` columns and an optional `logo`.
pub fn load_roster_csv(path: &Path) -> Result<Vec<RosterRow>, RosterImportError> {
    let file = std::fs::File::open(path).map_err(|e| RosterImportError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    let rows = load_rows_from_reader(file).map_err(|e| RosterImportError::Csv {
        path: path.display().to_string(),
        source: e,
    })?;
    non_empty(rows, path)
}

#[derive(Debug, Deserialize)]
struct JsonTeam {
    name: String,
    #[serde(default)]
    logo: Option<String>,
    #[serde(default)]
    players: Vec<JsonPlayer>,
}

#[derive(Debug, Deserialize)]
struct JsonPlayer {
    name: String,
    number: String,
}

fn rows_from_json<R: Read>(rdr: R) -> Result<Vec<RosterRow>, serde_json::Error> {
    let teams: Vec<JsonTeam> = serde_json::from_reader(rdr)?;
    let mut rows = Vec::new();
    for team in teams {
        let team_name = team.name.trim().to_string();
        let logo = team
            .logo
            .map(|logo| logo.trim().to_string())
            .filter(|logo| !logo.is_empty());
        for player in team.players {
            let row = RosterRow {
                team: team_name.clone(),
                number: player.number.trim().to_string(),
                name: player.name.trim().to_string(),
                logo: logo.clone(),
            };
            if !row.is_complete() {
                warn!("skipping roster entry missing team, number or name: {:?}", row);
                continue;
            }
            rows.push(row);
        }
    }
    Ok(rows)
}

/// Read a JSON roster:
/// `[{"name": .., "logo": .., "players": [{"name": .., "number": ..}]}]`.
pub fn load_roster_json(path: &Path) -> Result<Vec<RosterRow>, RosterImportError> {
    let file = std::fs::File::open(path).map_err(|e| RosterImportError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    let rows = rows_from_json(std::io::BufReader::new(file)).map_err(|e| {
        RosterImportError::Json {
            path: path.display().to_string(),
            source: e,
        }
    })?;
    non_empty(rows, path)
}

/// Read a roster file, choosing the format from the extension. Anything
/// other than `.json` is read as CSV.
pub fn load_roster_file(path: &Path) -> Result<Vec<RosterRow>, RosterImportError> {
    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    if is_json {
        load_roster_json(path)
    } else {
        load_roster_csv(path)
    }
}

fn non_empty(rows: Vec<RosterRow>, path: &Path) -> Result<Vec<RosterRow>, RosterImportError> {
    if rows.is_empty() {
        return Err(RosterImportError::Validation(format!(
            "{} produced zero valid roster rows",
            path.display()
        )));
    }
    Ok(rows)
}
