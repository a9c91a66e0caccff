use anyhow::Context;

fn main() -> anyhow::Result<()> {
    // `.env` never overrides variables already set in the process environment.
    let dotenv = dotenvy::dotenv();
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .try_init();
    match dotenv {
        Ok(path) => log::debug!("loaded environment from {}", path.display()),
        Err(e) if e.not_found() => {}
        Err(e) => log::warn!("ignoring .env: {}", e),
    }
    namestore::run().context("namestore failed")
}
