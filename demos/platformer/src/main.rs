//! Side-scrolling coin collector: run, jump and climb ladders through a
//! Tiled map while the camera follows.

mod config;
mod controls;
mod level;
mod player;
mod session;

use anyhow::Result;
use coinclimb::Engine;

use crate::config::GameConfig;
use crate::session::Session;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = GameConfig::load()?;
    log::info!("Assets from {}", config.assets.root.display());

    Engine::new()
        .with_title(config.title.clone())
        .with_size(config.screen_width, config.screen_height)
        .with_vsync(true)
        .with_asset_root(config.assets.root.clone())
        .run(Session::new(config))
}
