use std::sync::Arc;

use clap::Parser;
use color_eyre::eyre::Result;
use compareflow::{
  action::Action,
  api::HttpBackend,
  app::App,
  cli::Cli,
  config::Config,
  router::Route,
  utils::{initialize_logging, initialize_panic_handler},
};

async fn tokio_main() -> Result<()> {
  initialize_logging()?;

  initialize_panic_handler()?;

  let args = Cli::parse();
  let config = Config::new()?;
  let api = args.api_config(&config.api);
  log::info!("Using API at {}", api.base_url);
  let backend = HttpBackend::new(&api)?;

  // Prompt before the terminal switches to raw mode.
  let startup = if let Some(token) = args.session_token() {
    vec![Action::RestoreSession(token)]
  } else if let Some(credentials) = args.credentials() {
    vec![Action::Navigate(Route::Login), Action::Login(credentials)]
  } else {
    vec![Action::Navigate(Route::Login)]
  };

  let mut app = App::new(config, Arc::new(backend), args.tick_rate, args.frame_rate)?;
  app.run(startup).await?;

  Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
  if let Err(e) = tokio_main().await {
    eprintln!("{} error: Something went wrong", env!("CARGO_PKG_NAME"));
    Err(e)
  } else {
    Ok(())
  }
}
