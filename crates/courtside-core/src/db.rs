// SQLite persistence layer for teams and players.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use anyhow::{bail, Context, Result};
use rusqlite::{params, Connection, OptionalExtension};
use tracing::warn;

use crate::roster::{Player, PlayerId, RosterRow, RosterStore, Team, TeamId};

/// SQLite-backed roster store. Match state and statistics are never written
/// here.
pub struct Database {
    conn: Mutex<Connection>,
}

/// Counts from one roster import.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub teams_added: usize,
    pub players_added: usize,
}

impl Database {
    /// Open (or create) a SQLite database at `path` and ensure all tables
    /// exist. Pass `":memory:"` for an ephemeral in-memory database.
    pub fn open(path: &str) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("failed to open database at {path}"))?;

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA busy_timeout = 5000;
             PRAGMA foreign_keys = ON;",
        )
        .context("failed to set database pragmas")?;

        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS teams (
                id   INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL UNIQUE,
                logo TEXT
            );

            CREATE TABLE IF NOT EXISTS players (
                id      INTEGER PRIMARY KEY AUTOINCREMENT,
                team_id INTEGER NOT NULL REFERENCES teams(id) ON DELETE CASCADE,
                name    TEXT NOT NULL,
                number  TEXT NOT NULL,
                UNIQUE(team_id, number)
            );
            ",
        )
        .context("failed to create database schema")?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Acquire the database connection.
    ///
    /// Panics if the mutex is poisoned.
    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().expect("database mutex poisoned")
    }

    /// Create a team. Names are trimmed and must be unique.
    pub fn add_team(&self, name: &str, logo: Option<&str>) -> Result<TeamId> {
        let name = name.trim();
        if name.is_empty() {
            bail!("team name must not be empty");
        }
        let conn = self.conn();
        let id: i64 = conn
            .query_row(
                "INSERT INTO teams (name, logo) VALUES (?1, ?2) RETURNING id",
                params![name, logo],
                |row| row.get(0),
            )
            .with_context(|| format!("failed to add team {name}"))?;
        Ok(TeamId(id))
    }

    /// Replace a team's logo reference.
    pub fn set_logo(&self, team: TeamId, logo: Option<&str>) -> Result<()> {
        let conn = self.conn();
        let updated = conn
            .execute(
                "UPDATE teams SET logo = ?1 WHERE id = ?2",
                params![logo, team.0],
            )
            .context("failed to update team logo")?;
        if updated == 0 {
            bail!("no team with id {team}");
        }
        Ok(())
    }

    /// Delete a team and, through the cascade, its players. Returns whether
    /// a team was removed.
    pub fn delete_team(&self, team: TeamId) -> Result<bool> {
        let conn = self.conn();
        let deleted = conn
            .execute("DELETE FROM teams WHERE id = ?1", params![team.0])
            .context("failed to delete team")?;
        Ok(deleted > 0)
    }

    /// Add a player to a team. Name and number are required; the number is
    /// stored verbatim and must be unique within the team.
    pub fn add_player(&self, team: TeamId, name: &str, number: &str) -> Result<PlayerId> {
        let (name, number) = (name.trim(), number.trim());
        if name.is_empty() || number.is_empty() {
            bail!("player name and number are required");
        }
        let conn = self.conn();
        let id: i64 = conn
            .query_row(
                "INSERT INTO players (team_id, name, number) VALUES (?1, ?2, ?3) RETURNING id",
                params![team.0, name, number],
                |row| row.get(0),
            )
            .with_context(|| format!("failed to add player {name} (#{number}) to team {team}"))?;
        Ok(PlayerId(id))
    }

    /// Returns whether a player was removed.
    pub fn delete_player(&self, player: PlayerId) -> Result<bool> {
        let conn = self.conn();
        let deleted = conn
            .execute("DELETE FROM players WHERE id = ?1", params![player.0])
            .context("failed to delete player")?;
        Ok(deleted > 0)
    }

    /// Load one team with its players, newest player first.
    pub fn load_team(&self, team: TeamId) -> Result<Option<Team>> {
        let conn = self.conn();
        let header = conn
            .query_row(
                "SELECT id, name, logo FROM teams WHERE id = ?1",
                params![team.0],
                |row| {
                    Ok(Team {
                        id: TeamId(row.get(0)?),
                        name: row.get(1)?,
                        logo: row.get(2)?,
                        players: Vec::new(),
                    })
                },
            )
            .optional()
            .context("failed to query team")?;

        let Some(mut loaded) = header else {
            return Ok(None);
        };
        loaded.players = load_players(&conn, Some(team))?
            .remove(&team)
            .unwrap_or_default();
        Ok(Some(loaded))
    }

    /// Load every team with its players, ordered by team name.
    pub fn load_teams(&self) -> Result<Vec<Team>> {
        let conn = self.conn();
        let mut stmt = conn
            .prepare("SELECT id, name, logo FROM teams ORDER BY name")
            .context("failed to prepare load_teams query")?;
        let mut teams = stmt
            .query_map([], |row| {
                Ok(Team {
                    id: TeamId(row.get(0)?),
                    name: row.get(1)?,
                    logo: row.get(2)?,
                    players: Vec::new(),
                })
            })
            .context("failed to query teams")?
            .collect::<std::result::Result<Vec<_>, _>>()
            .context("failed to map team rows")?;

        let mut players = load_players(&conn, None)?;
        for team in &mut teams {
            team.players = players.remove(&team.id).unwrap_or_default();
        }
        Ok(teams)
    }

    /// Import roster rows in a single transaction.
    ///
    /// Teams are matched by name and created when missing. A row that carries
    /// a logo replaces the stored one. A player whose number already exists
    /// on that team is skipped with a warning.
    pub fn import_rosters(&self, rows: &[RosterRow]) -> Result<ImportSummary> {
        let mut conn = self.conn();
        let tx = conn.transaction().context("failed to begin import transaction")?;
        let mut summary = ImportSummary::default();

        for row in rows {
            let inserted = tx
                .execute(
                    "INSERT OR IGNORE INTO teams (name, logo) VALUES (?1, ?2)",
                    params![row.team, row.logo],
                )
                .context("failed to upsert team in import")?;
            summary.teams_added += inserted;

            if inserted == 0 && row.logo.is_some() {
                tx.execute(
                    "UPDATE teams SET logo = ?1 WHERE name = ?2",
                    params![row.logo, row.team],
                )
                .context("failed to update team logo in import")?;
            }

            let team_id: i64 = tx
                .query_row(
                    "SELECT id FROM teams WHERE name = ?1",
                    params![row.team],
                    |r| r.get(0),
                )
                .context("failed to resolve team id in import")?;

            let inserted = tx
                .execute(
                    "INSERT OR IGNORE INTO players (team_id, name, number) VALUES (?1, ?2, ?3)",
                    params![team_id, row.name, row.number],
                )
                .context("failed to insert player in import")?;
            if inserted == 0 {
                warn!(
                    "skipping {} (#{}): number already taken on {}",
                    row.name, row.number, row.team
                );
            }
            summary.players_added += inserted;
        }

        tx.commit().context("failed to commit roster import")?;
        Ok(summary)
    }
}

/// Players grouped by team, newest first within each team.
fn load_players(conn: &Connection, team: Option<TeamId>) -> Result<HashMap<TeamId, Vec<Player>>> {
    let mut stmt = conn
        .prepare(
            "SELECT team_id, id, name, number FROM players
             WHERE ?1 IS NULL OR team_id = ?1
             ORDER BY id DESC",
        )
        .context("failed to prepare load_players query")?;

    let rows = stmt
        .query_map(params![team.map(|t| t.0)], |row| {
            Ok((
                TeamId(row.get(0)?),
                Player {
                    id: PlayerId(row.get(1)?),
                    name: row.get(2)?,
                    number: row.get(3)?,
                },
            ))
        })
        .context("failed to query players")?
        .collect::<std::result::Result<Vec<_>, _>>()
        .context("failed to map player rows")?;

    let mut grouped: HashMap<TeamId, Vec<Player>> = HashMap::new();
    for (team_id, player) in rows {
        grouped.entry(team_id).or_default().push(player);
    }
    Ok(grouped)
}

impl RosterStore for Database {
    fn team(&self, id: TeamId) -> Option<Team> {
        self.load_team(id).unwrap_or_else(|e| {
            warn!("roster lookup for team {id} failed: {e:#}");
            None
        })
    }

    fn teams(&self) -> Vec<Team> {
        self.load_teams().unwrap_or_else(|e| {
            warn!("loading teams failed: {e:#}");
            Vec::new()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_db() -> Database {
        Database::open(":memory:").expect("in-memory database should open")
    }

    fn row(team: &str, number: &str, name: &str) -> RosterRow {
        RosterRow {
            team: team.into(),
            number: number.into(),
            name: name.into(),
            logo: None,
        }
    }

    #[test]
    fn open_creates_tables() {
        let db = test_db();
        let conn = db.conn();
        let tables: Vec<String> = conn
            .prepare("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<Result<Vec<_>, _>>()
            .unwrap();
        assert!(tables.contains(&"teams".to_string()));
        assert!(tables.contains(&"players".to_string()));
    }

    #[test]
    fn add_and_load_team_with_players() {
        let db = test_db();
        let team = db.add_team("  Leones ", Some("leones.png")).unwrap();
        let first = db.add_player(team, "Marta", "00").unwrap();
        let second = db.add_player(team, "Ines", "4").unwrap();

        let loaded = db.load_team(team).unwrap().unwrap();
        assert_eq!(loaded.name, "Leones");
        assert_eq!(loaded.logo.as_deref(), Some("leones.png"));
        let ids: Vec<_> = loaded.players.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![second, first]);
        assert_eq!(loaded.players[1].number, "00");
    }

    #[test]
    fn missing_team_is_none() {
        let db = test_db();
        assert!(db.load_team(TeamId(42)).unwrap().is_none());
        assert!(RosterStore::team(&db, TeamId(42)).is_none());
    }

    #[test]
    fn rejects_blank_names_and_duplicate_numbers() {
        let db = test_db();
        assert!(db.add_team("   ", None).is_err());
        let team = db.add_team("Leones", None).unwrap();
        assert!(db.add_team("Leones", None).is_err());
        assert!(db.add_player(team, "", "5").is_err());
        db.add_player(team, "Luz", "5").unwrap();
        assert!(db.add_player(team, "Otra", "5").is_err());
    }

    #[test]
    fn foreign_keys_enforced() {
        let db = test_db();
        assert!(db.add_player(TeamId(999), "Nadie", "1").is_err());
    }

    #[test]
    fn deleting_team_cascades_to_players() {
        let db = test_db();
        let team = db.add_team("Aguilas", None).unwrap();
        db.add_player(team, "Pablo", "7").unwrap();
        assert!(db.delete_team(team).unwrap());
        assert!(!db.delete_team(team).unwrap());

        let conn = db.conn();
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM players", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn delete_player_removes_only_that_player() {
        let db = test_db();
        let team = db.add_team("Aguilas", None).unwrap();
        let pablo = db.add_player(team, "Pablo", "7").unwrap();
        db.add_player(team, "Rosa", "8").unwrap();
        assert!(db.delete_player(pablo).unwrap());
        let loaded = db.load_team(team).unwrap().unwrap();
        assert_eq!(loaded.players.len(), 1);
        assert_eq!(loaded.players[0].name, "Rosa");
    }

    #[test]
    fn set_logo_updates_existing_team() {
        let db = test_db();
        let team = db.add_team("Aguilas", None).unwrap();
        db.set_logo(team, Some("a.png")).unwrap();
        assert_eq!(db.load_team(team).unwrap().unwrap().logo.as_deref(), Some("a.png"));
        assert!(db.set_logo(TeamId(77), None).is_err());
    }

    #[test]
    fn import_rosters_is_idempotent() {
        let db = test_db();
        let rows = vec![
            row("Leones", "00", "Marta"),
            row("Leones", "4", "Ines"),
            row("Aguilas", "7", "Pablo"),
        ];
        let first = db.import_rosters(&rows).unwrap();
        assert_eq!(
            first,
            ImportSummary {
                teams_added: 2,
                players_added: 3
            }
        );

        let second = db.import_rosters(&rows).unwrap();
        assert_eq!(second, ImportSummary::default());

        let teams = db.load_teams().unwrap();
        let names: Vec<_> = teams.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["Aguilas", "Leones"]);
        assert_eq!(teams[1].players.len(), 2);
    }

    #[test]
    fn import_keeps_players_with_distinct_numbers() {
        let db = test_db();
        let rows = vec![row("Leones", "00", "Marta"), row("Leones", "0", "Ines")];
        let summary = db.import_rosters(&rows).unwrap();
        assert_eq!(summary.players_added, 2);

        let clash = db.import_rosters(&[row("Leones", "00", "Otra")]).unwrap();
        assert_eq!(clash.players_added, 0);
        let leones = &db.load_teams().unwrap()[0];
        assert_eq!(leones.players.len(), 2);
        assert!(leones.players.iter().all(|p| p.name != "Otra"));
    }

    #[test]
    fn import_sets_and_refreshes_team_logo() {
        let db = test_db();
        let mut first = row("Leones", "00", "Marta");
        first.logo = Some("leones.png".into());
        db.import_rosters(&[first]).unwrap();
        let team = db.load_teams().unwrap().remove(0);
        assert_eq!(team.logo.as_deref(), Some("leones.png"));

        // No logo in the file leaves the stored one alone
        db.import_rosters(&[row("Leones", "4", "Ines")]).unwrap();
        assert_eq!(
            db.load_team(team.id).unwrap().unwrap().logo.as_deref(),
            Some("leones.png")
        );

        let mut refreshed = row("Leones", "5", "Luz");
        refreshed.logo = Some("leones-2.png".into());
        let summary = db.import_rosters(&[refreshed]).unwrap();
        assert_eq!(summary.teams_added, 0);
        assert_eq!(
            db.load_team(team.id).unwrap().unwrap().logo.as_deref(),
            Some("leones-2.png")
        );
    }

    #[test]
    fn store_trait_matches_inherent_loaders() {
        let db = test_db();
        let team = db.add_team("Leones", None).unwrap();
        db.add_player(team, "Marta", "00").unwrap();
        assert_eq!(RosterStore::teams(&db), db.load_teams().unwrap());
        assert_eq!(RosterStore::team(&db, team), db.load_team(team).unwrap());
    }
}
