pub mod feedback;
pub mod friends;
pub mod gameplay;
pub mod games;
pub mod groups;
pub mod leaderboard;
pub mod users;
