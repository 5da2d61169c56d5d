//! Collaborator side of the tenbou table engine.
//!
//! Seeds sessions, carries observations and answers across the agent
//! boundary, runs games to completion (one at a time or in rayon batches)
//! and replays recorded games.

pub mod game_loop;
pub mod message;
pub mod replay;
pub mod seeding;
pub mod simulator;
