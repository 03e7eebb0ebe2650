pub mod backup;
pub mod config;
pub mod csv;
pub mod db;
