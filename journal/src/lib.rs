//! daynote journal - daily notes with carried-forward to-dos.
//!
//! This crate manages a journal of plain-text daily notes stored as
//! `root/YYYY/MM/YYYY-MM-DD.<ext>`. Each day's note is seeded with the
//! unfinished to-dos of the most recent earlier note, each stamped with the
//! date it originated from, and the earlier note is deleted if it holds
//! nothing but headings and to-do markers.
//!
//! # Modules
//!
//! - [`config`]: Configuration from environment variables
//! - [`error`]: Error types for journal operations
//! - [`note`]: Date to path naming scheme and new-note template
//! - [`locator`]: Discovery of existing notes and the previous note
//! - [`todo`]: To-do line parsing
//! - [`carry`]: Re-dating and ordering of carried to-dos
//! - [`emptiness`]: Whether a note holds anything worth keeping
//! - [`locks`]: Per-note mutual exclusion
//! - [`journal`]: Create, clean up and append operations
//! - [`clock`]: Injectable current time
//! - [`scheduler`]: Daily job trigger

mod atomic;
pub mod carry;
pub mod clock;
pub mod config;
pub mod emptiness;
pub mod error;
pub mod journal;
pub mod locator;
pub mod locks;
pub mod note;
pub mod scheduler;
pub mod todo;

pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{Config, ConfigError};
pub use error::{JournalError, Result};
pub use journal::{AppendOutcome, CleanupOutcome, CreateOutcome, DailyReport, Journal};
pub use note::NoteLayout;
pub use scheduler::{DailySchedule, Scheduler, SchedulerHandle};
