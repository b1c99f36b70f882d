use std::sync::Arc;

use color_eyre::eyre::Result;
use crossterm::event::KeyEvent;
use ratatui::prelude::Rect;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::{
  action::Action,
  api::Backend,
  components::{
    connection_form::ConnectionForm, connections::Connections, dashboard::Dashboard, login::Login, shell,
    validation_form::ValidationForm, validations::Validations, Component, Frame,
  },
  config::Config,
  dispatch::Dispatcher,
  mode::Mode,
  router::{guard, Route},
  store::{AuthEvent, ConnectionEvent, Store, ValidationEvent},
  tui,
};

pub struct App {
  pub config: Config,
  pub tick_rate: f64,
  pub frame_rate: f64,
  pub components: Vec<Box<dyn Component>>,
  pub should_quit: bool,
  pub should_suspend: bool,
  pub mode: Mode,
  pub route: Route,
  pub store: Store,
  pub last_tick_key_events: Vec<KeyEvent>,
  action_tx: UnboundedSender<Action>,
  action_rx: UnboundedReceiver<Action>,
  dispatcher: Dispatcher,
}

impl App {
  pub fn new(config: Config, backend: Arc<dyn Backend>, tick_rate: f64, frame_rate: f64) -> Result<Self> {
    let (action_tx, action_rx) = mpsc::unbounded_channel();
    let dispatcher = Dispatcher::new(backend, action_tx.clone());
    let components: Vec<Box<dyn Component>> = vec![
      Box::new(Login::new()),
      Box::new(Dashboard::new()),
      Box::new(Connections::new()),
      Box::new(ConnectionForm::new()),
      Box::new(Validations::new()),
      Box::new(ValidationForm::new()),
    ];
    let mut app = Self {
      config,
      tick_rate,
      frame_rate,
      components,
      should_quit: false,
      should_suspend: false,
      mode: Mode::default(),
      route: Route::default(),
      store: Store::new(),
      last_tick_key_events: Vec::new(),
      action_tx,
      action_rx,
      dispatcher,
    };
    app.init()?;
    Ok(app)
  }

  fn init(&mut self) -> Result<()> {
    for component in self.components.iter_mut() {
      component.register_action_handler(self.action_tx.clone())?;
    }

    for component in self.components.iter_mut() {
      component.register_config_handler(self.config.clone())?;
    }

    for component in self.components.iter_mut() {
      component.init(Rect::default())?;
    }
    Ok(())
  }

  pub fn action_sender(&self) -> UnboundedSender<Action> {
    self.action_tx.clone()
  }

  pub fn try_next_action(&mut self) -> Option<Action> {
    self.action_rx.try_recv().ok()
  }

  pub async fn next_action(&mut self) -> Option<Action> {
    self.action_rx.recv().await
  }

  fn active_page(&self) -> Option<&dyn Component> {
    self.components.iter().find(|c| c.mode() == self.mode).map(|c| c.as_ref())
  }

  /// Routes a terminal event through the mode keymap and to the active page.
  pub fn handle_event(&mut self, event: tui::Event) -> Result<()> {
    let action_tx = self.action_tx.clone();
    match event {
      tui::Event::Quit => action_tx.send(Action::Quit)?,
      tui::Event::Tick => action_tx.send(Action::Tick)?,
      tui::Event::Render => action_tx.send(Action::Render)?,
      tui::Event::Resize(x, y) => action_tx.send(Action::Resize(x, y))?,
      tui::Event::Key(key) => {
        let captured = self.active_page().is_some_and(|page| page.captures_keys());
        if !captured {
          if let Some(action) = self.config.action_for(self.mode, &[key]) {
            log::info!("Got action: {action:?}");
            action_tx.send(action.clone())?;
          } else {
            // If the key was not handled as a single key action,
            // then consider it for multi-key combinations.
            self.last_tick_key_events.push(key);

            if let Some(action) = self.config.action_for(self.mode, &self.last_tick_key_events) {
              log::info!("Got action: {action:?}");
              action_tx.send(action.clone())?;
            }
          }
        }
      },
      _ => {},
    }

    let mode = self.mode;
    for component in self.components.iter_mut().filter(|c| c.mode() == mode) {
      if let Some(action) = component.handle_events(Some(event.clone()), &self.store)? {
        action_tx.send(action)?;
      }
    }
    Ok(())
  }

  /// Applies one action: app-level state first, then every page sees it.
  pub fn update(&mut self, action: Action) -> Result<()> {
    if action != Action::Tick && action != Action::Render {
      log::debug!("{action:?}");
    }

    let mut forward = action.clone();
    match action {
      Action::Tick => {
        self.last_tick_key_events.drain(..);
      },
      Action::Quit => self.should_quit = true,
      Action::Suspend => self.should_suspend = true,
      Action::Resume => self.should_suspend = false,
      Action::Error(ref message) => log::error!("{message}"),
      Action::Navigate(requested) => {
        let landed = guard(requested, self.store.is_authenticated());
        if landed != requested {
          log::info!("{requested} redirected to {landed}");
        }
        self.route = landed;
        self.mode = landed.mode();
        forward = Action::Navigate(landed);
      },
      Action::Store(event) => {
        self.store.reduce(event);
        let landed = guard(self.route, self.store.is_authenticated());
        if landed != self.route {
          self.action_tx.send(Action::Navigate(landed))?;
        }
      },
      Action::RestoreSession(ref token) => {
        self.store.reduce(AuthEvent::Restore(token.clone()).into());
        self.dispatcher.dispatch(&action);
      },
      Action::Logout => {
        self.store.reduce(AuthEvent::Logout.into());
        self.dispatcher.dispatch(&action);
        self.action_tx.send(Action::Navigate(Route::Login))?;
      },
      Action::ClearError => {
        self.store.reduce(AuthEvent::ClearError.into());
        self.store.reduce(ConnectionEvent::ClearError.into());
        self.store.reduce(ValidationEvent::ClearError.into());
      },
      Action::ClearTestResult => self.store.reduce(ConnectionEvent::ClearTestResult.into()),
      Action::Refresh => {
        let refetch = match self.route.section() {
          Route::Dashboard => vec![Action::FetchConnections, Action::FetchValidations],
          Route::Connections => vec![Action::FetchConnections],
          Route::Validations => vec![Action::FetchValidations],
          _ => Vec::new(),
        };
        for action in refetch {
          self.action_tx.send(action)?;
        }
      },
      ref request => {
        self.dispatcher.dispatch(request);
      },
    }

    for component in self.components.iter_mut() {
      if let Some(action) = component.update(forward.clone(), &self.store)? {
        self.action_tx.send(action)?
      };
    }
    Ok(())
  }

  /// Shell chrome plus the page for the current mode.
  pub fn draw(&mut self, f: &mut Frame<'_>) -> Result<()> {
    let mode = self.mode;
    let hints = self.active_page().map(|page| page.key_hints()).unwrap_or_default();
    let body = shell::draw(f, f.area(), self.route, &self.store, &hints);
    for component in self.components.iter_mut().filter(|c| c.mode() == mode) {
      component.draw(f, body, &self.store)?;
    }
    Ok(())
  }

  pub async fn run(&mut self, startup: Vec<Action>) -> Result<()> {
    let mut tui = tui::Tui::new()?.tick_rate(self.tick_rate).frame_rate(self.frame_rate).paste(true);
    tui.enter()?;

    for action in startup {
      self.action_tx.send(action)?;
    }

    loop {
      if let Some(e) = tui.next().await {
        self.handle_event(e)?;
      }

      while let Ok(action) = self.action_rx.try_recv() {
        match action {
          Action::Resize(w, h) => {
            tui.resize(Rect::new(0, 0, w, h))?;
            self.render(&mut tui)?;
          },
          Action::Render => self.render(&mut tui)?,
          _ => {},
        }
        self.update(action)?;
      }

      if self.should_suspend {
        tui.suspend()?;
        self.action_tx.send(Action::Resume)?;
        tui = tui::Tui::new()?.tick_rate(self.tick_rate).frame_rate(self.frame_rate).paste(true);
        tui.enter()?;
      } else if self.should_quit {
        tui.stop()?;
        break;
      }
    }
    tui.exit()?;
    Ok(())
  }

  fn render(&mut self, tui: &mut tui::Tui) -> Result<()> {
    let action_tx = self.action_tx.clone();
    tui.draw(|f| {
      if let Err(e) = self.draw(f) {
        let _ = action_tx.send(Action::Error(format!("Failed to draw: {e:?}")));
      }
    })?;
    Ok(())
  }
}
