mod controllers;

fn main() -> anyhow::Result<()> {
    let _log_guard = dispatch_core::logging::init_logging()?;
    dispatch_core::cli::run_cli()
}
