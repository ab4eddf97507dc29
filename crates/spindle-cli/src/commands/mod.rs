pub mod ast;
pub mod check;
pub mod path;
pub mod run_common;
