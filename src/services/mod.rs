pub mod accounts;
pub mod ai;
pub mod chatbot;
pub mod courses;
pub mod matching;
pub mod profile;
pub mod recommendations;
