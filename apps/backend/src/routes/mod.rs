pub mod auth;
pub mod practice;
pub mod quizzes;
pub mod users;
