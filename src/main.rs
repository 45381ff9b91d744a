use gokart::{DemoConfig, Engine};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = DemoConfig::load_or_default("gokart.toml");
    log::info!(
        "[main] Starting {} ({}x{})",
        config.window_title,
        config.window_width,
        config.window_height
    );

    let engine = match Engine::new(config) {
        Ok(engine) => engine,
        Err(e) => {
            log::error!("[main] Engine initialization failed: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = engine.run() {
        log::error!("[main] Engine exited with error: {e:#}");
        std::process::exit(1);
    }
}
