pub mod run;
pub mod variants;
