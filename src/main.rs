use std::io;

use clap::Parser;
use tracing::{error, info};

use reading_ruler::app::ReaderApp;
use reading_ruler::components::DebugLogComponent;
use reading_ruler::components::debug_log::{install_panic_hook, set_global_debug_log};
use reading_ruler::config::{Cli, ReaderConfig};
use reading_ruler::drivers::console::{ConsoleInputDriver, ConsoleOutputDriver};
use reading_ruler::drivers::{InputDriver, OutputDriver};
use reading_ruler::event_loop::{ControlFlow, EventLoop};
use reading_ruler::preferences::PreferenceStore;
use reading_ruler::tracing_sub;

fn main() -> io::Result<()> {
    let cli = Cli::parse();
    let config = ReaderConfig::try_from(&cli).map_err(io::Error::other)?;

    let (debug_log, handle) = DebugLogComponent::new_default();
    set_global_debug_log(handle);
    if let Some(path) = &config.log_file {
        tracing_sub::set_log_file(path)?;
    }
    tracing_sub::init_default();
    install_panic_hook();

    let store = PreferenceStore::load(&config.prefs_path);
    let mut output = ConsoleOutputDriver::new()?;
    let (cols, rows) = output.size()?;
    let mut app = ReaderApp::new(&config, store, cols, rows)
        .map_err(io::Error::other)?
        .with_debug_log(debug_log);
    info!(file = %config.document.path.display(), "reader started");

    output.enter()?;
    let mut event_loop = EventLoop::new(ConsoleInputDriver::new(), config.tick);
    let result = event_loop.run(|driver, event| match event {
        Some(event) => Ok(app.handle_event(&event)),
        None => {
            if let Some(enabled) = app.state_mut().take_mouse_capture_change() {
                driver.set_mouse_capture(enabled)?;
            }
            app.tick();
            output.draw(|mut frame| app.draw(&mut frame))?;
            Ok(ControlFlow::Continue)
        }
    });
    output.exit()?;

    if let Err(err) = &result {
        error!(%err, "reader stopped");
    }
    result
}
