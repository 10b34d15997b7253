//! CLI module
//! Argument parsing and command dispatch for the quill binary

pub mod commands;

pub fn run() -> anyhow::Result<()> {
    commands::run()
}
