mod cli;
mod commands;

use cli::{AstParams, CheckParams, PathParams, build_cli};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let matches = build_cli().get_matches();

    match matches.subcommand() {
        Some(("ast", m)) => {
            let params = AstParams::from_matches(m);
            commands::ast::run(params.into());
        }
        Some(("check", m)) => {
            let params = CheckParams::from_matches(m);
            commands::check::run(params.into());
        }
        Some(("path", m)) => {
            let params = PathParams::from_matches(m);
            commands::path::run(params.into());
        }
        _ => unreachable!("clap should have caught this"),
    }
}
