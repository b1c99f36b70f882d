use clap::Parser;

use crate::{config::ApiConfig, models::Credentials, utils::version};

#[derive(Parser, Debug)]
#[command(author, version = version(), about)]
pub struct Cli {
  #[arg(short, long, value_name = "FLOAT", help = "Tick rate, i.e. number of ticks per second", default_value_t = 4.0)]
  pub tick_rate: f64,

  #[arg(
    short('r'),
    long,
    value_name = "FLOAT",
    help = "Frame rate, i.e. number of frames per second",
    default_value_t = 30.0
  )]
  pub frame_rate: f64,

  // Backend options
  #[arg(
    short('a'),
    long = "api-url",
    value_name = "URL",
    help = "Base URL of the compareflow API (overrides the config file)"
  )]
  pub api_url: Option<String>,

  #[arg(
    long = "token",
    value_name = "TOKEN",
    env = "COMPAREFLOW_TOKEN",
    hide_env_values = true,
    help = "Resume a session with an existing access token"
  )]
  pub token: Option<String>,

  #[arg(short('U'), long = "username", value_name = "USERNAME", help = "Sign in as this user before the interface starts")]
  pub username: Option<String>,
}

impl Cli {
  /// Config file values with command line overrides applied.
  pub fn api_config(&self, base: &ApiConfig) -> ApiConfig {
    let mut config = base.clone();
    if let Some(url) = self.api_url.as_deref().map(str::trim).filter(|url| !url.is_empty()) {
      config.base_url = url.to_string();
    }
    config
  }

  /// Token passed on the command line or through the environment, if any.
  pub fn session_token(&self) -> Option<String> {
    self.token.as_deref().map(str::trim).filter(|token| !token.is_empty()).map(String::from)
  }

  /// Credentials for `--username`, prompting for the password on the terminal.
  pub fn credentials(&self) -> Option<Credentials> {
    let username = self.username.as_deref().map(str::trim).filter(|name| !name.is_empty())?;
    eprintln!("Password required for user '{username}'");
    let password = Self::prompt_password_with_paste_support();
    Some(Credentials { username: username.to_string(), password })
  }

  /// Prompt for password with better paste support
  pub fn prompt_password_with_paste_support() -> String {
    use dialoguer::Password;

    // dialoguer handles paste better than rpassword
    match Password::new().with_prompt("Password").allow_empty_password(false).interact() {
      Ok(password) => password,
      Err(_) => {
        eprintln!("Primary password input failed, trying fallback...");
        eprintln!("Tip: Use Ctrl+Shift+V or right-click to paste in most terminals");

        rpassword::prompt_password("Password (fallback): ").unwrap_or_else(|_| {
          eprintln!("All password input methods failed. Sign in from the login screen instead.");
          String::new()
        })
      },
    }
  }
}
