mod api;
mod components;
mod config;
mod countries;
mod host;
mod model;
mod persist;
mod state;
mod store;
mod util;

use components::app::App;

fn main() {
    if console_log::init_with_level(log::Level::Debug).is_err() {
        web_sys::console::warn_1(&"logger already initialised".into());
    }
    host::ready();
    log::info!("[SESSION] bluewave mini app starting");
    yew::Renderer::<App>::new().render();
}
