// Library root: the live scoreboard engine plus the roster store, config
// loading and CSV export that surround it.

pub mod config;
pub mod db;
pub mod export;
pub mod game;
pub mod roster;
