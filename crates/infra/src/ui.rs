//! Settings UI rendered to the terminal

use earshot_core::domain::collaborators::{SettingsUi, SettingsView};
use tracing::{info, warn};

#[derive(Debug, Default)]
pub struct ConsoleUi;

impl ConsoleUi {
    pub fn new() -> Self {
        Self
    }
}

/// Settings as TOML followed by the HRTF data sets on offer
pub fn render_settings(view: &SettingsView) -> String {
    let settings = match toml::to_string_pretty(&view.settings) {
        Ok(s) => s,
        Err(e) => {
            warn!(error = %e, "Failed to render settings as TOML");
            format!("{:#?}\n", view.settings)
        }
    };
    let hrtf = if view.hrtf_data_names.is_empty() {
        "(none)".to_string()
    } else {
        view.hrtf_data_names.join(", ")
    };
    format!("{settings}\n# HRTF data sets: {hrtf}\n")
}

impl SettingsUi for ConsoleUi {
    fn show_settings_ui(&mut self, view: &SettingsView) {
        info!(hrtf_data_sets = view.hrtf_data_names.len(), "Showing settings");
        print!("{}", render_settings(view));
    }

    fn show_plugin_help(&mut self, url: &str, view: &SettingsView) {
        info!(url, "Showing plugin help");
        println!("Plugin help: {url}");
        print!("{}", render_settings(view));
    }
}
