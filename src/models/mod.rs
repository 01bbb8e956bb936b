pub mod feedback;
pub mod friends;
pub mod games;
pub mod gameplay;
pub mod groups;
pub mod leaderboard;
pub mod users;
