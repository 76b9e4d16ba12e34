pub mod curriculum;
pub mod repl;
pub mod replay;
pub mod serve;
