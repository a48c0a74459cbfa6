//! Entry point for the **zonesnap** daemon.
//!
//! Runs headless against a [`VirtualDesktop`] built from the config file.
//! The Unix-socket [`EventSource`] runs on a background thread and the main
//! thread drains its channel, so every engine call happens on one thread in
//! the order events arrived.  Overlay changes are logged by a second thread.
//!
//! ```text
//! RUST_LOG=info zonesnap [--config <path>] [--socket <path>]
//! ```

use log::{debug, error, info};
use std::path::PathBuf;
use std::sync::mpsc;
use zonesnap::config::Config;
use zonesnap::desktop::VirtualDesktop;
use zonesnap::input::{InputEvent, InputStateMachine};
use zonesnap::ipc::listener::UnixSocketListener;
use zonesnap::overlay::{ChannelOverlay, OverlayEvent};
use zonesnap::traits::{EventSource, FocusedWindowProvider};

/// Default socket path for the event listener.
fn default_socket_path() -> PathBuf {
    let runtime = std::env::var("XDG_RUNTIME_DIR").unwrap_or_else(|_| "/tmp".into());
    PathBuf::from(runtime).join("zonesnap.sock")
}

/// Resolve the config directory (`$XDG_CONFIG_HOME/zonesnap`).
fn config_dir() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME").unwrap_or_else(|_| {
        let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".into());
        format!("{}/.config", home)
    });
    PathBuf::from(base).join("zonesnap")
}

/// Value following `flag` on the command line, if any.
fn arg_value(flag: &str) -> Option<String> {
    let mut args = std::env::args().skip(1);
    while let Some(a) = args.next() {
        if a == flag {
            return args.next();
        }
    }
    None
}

/// Load the config from `path`, falling back to compiled-in defaults.
fn load_config(path: PathBuf) -> Config {
    match Config::load(&path) {
        Ok(cfg) => {
            info!("loaded config from {}", path.display());
            cfg
        }
        Err(e) => {
            info!("{}; using defaults", e);
            Config::default()
        }
    }
}

//  Main

fn main() {
    env_logger::init();

    let config_path = arg_value("--config")
        .map(PathBuf::from)
        .unwrap_or_else(|| config_dir().join("config.json"));
    let socket_path = arg_value("--socket")
        .map(PathBuf::from)
        .unwrap_or_else(default_socket_path);

    let config = load_config(config_path);
    let desktop = VirtualDesktop::from_config(&config.desktop);
    info!(
        "{} display(s), {} window(s); cycling {} drag {}",
        config.desktop.displays.len(),
        config.desktop.windows.len(),
        config.keys.cycling_modifiers,
        config.keys.drag_modifiers
    );

    let (overlay_tx, overlay_rx) = mpsc::channel::<OverlayEvent>();
    spawn_overlay_logger(overlay_rx);

    let mut machine = InputStateMachine::new(desktop, ChannelOverlay::new(overlay_tx), &config);

    let (event_tx, event_rx) = mpsc::channel::<InputEvent>();
    spawn_event_sources(event_tx, socket_path);

    info!("zonesnap running");
    for event in event_rx {
        let disposition = machine.handle(event);
        debug!("{:?} -> {:?}", disposition, machine.state());
    }

    for w in machine.wm().windows() {
        info!(
            "{} ({}) on {:?}",
            w.id,
            w.title,
            machine.wm().display_for(&w.id)
        );
    }
    info!("all event sources closed, exiting");
}

//  Helpers

fn spawn_event_sources(tx: mpsc::Sender<InputEvent>, socket_path: PathBuf) {
    std::thread::spawn(move || {
        let mut source = UnixSocketListener::new(&socket_path);
        if let Err(e) = source.run(tx) {
            error!("socket listener error: {}", e);
        }
    });
}

/// Log overlay changes as JSON, one line each.
fn spawn_overlay_logger(rx: mpsc::Receiver<OverlayEvent>) {
    std::thread::spawn(move || {
        for event in rx {
            match serde_json::to_string(&event) {
                Ok(json) => info!("overlay {}", json),
                Err(e) => error!("overlay event {:?}: {}", event, e),
            }
        }
    });
}
