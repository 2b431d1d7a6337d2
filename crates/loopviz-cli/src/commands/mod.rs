pub mod repl;
pub mod run;
pub mod scenarios;
