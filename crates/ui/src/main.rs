use gpui::*;
use gpui_component::notification::NotificationList;
use gpui_component::{Root, ThemeRegistry};
use tracing_subscriber::EnvFilter;

use ollama_chat::app::{ChatAppShell, Quit, ToggleTheme, default_themes_path};
use ollama_chat::settings::SettingsStore;

/// Application entry point.
///
/// Bootstraps the GPUI application with:
/// 1. Asset loading via gpui-component-assets
/// 2. gpui-component initialization (required for Root, themes, notifications)
/// 3. Theme loading/watching from ./themes directory (non-fatal if missing)
/// 4. Global action handlers and key bindings
/// 5. Window creation with Root wrapper for gpui-component composition
fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let app = Application::new().with_assets(gpui_component_assets::Assets);

    app.run(|cx| {
        gpui_tokio_bridge::init(cx);

        // Must run before any Root is created.
        gpui_component::init(cx);

        if let Err(err) = ThemeRegistry::watch_dir(default_themes_path(), cx, |cx| {
            SettingsStore::load().settings().apply_theme(None, cx);
            tracing::info!("Theme directory watch initialized");
        }) {
            tracing::warn!(
                "Failed to watch themes directory: {}. Using default themes.",
                err
            );
            SettingsStore::load().settings().apply_theme(None, cx);
        }

        cx.on_action(|_: &Quit, cx| {
            cx.quit();
        });

        cx.bind_keys([
            KeyBinding::new("secondary-q", Quit, None),
            KeyBinding::new("secondary-shift-t", ToggleTheme, None),
        ]);

        cx.spawn(async move |cx| {
            cx.update(|cx| {
                let options = WindowOptions {
                    window_bounds: Some(WindowBounds::Windowed(Bounds::centered(
                        None,
                        size(px(900.), px(760.)),
                        cx,
                    ))),
                    titlebar: Some(TitlebarOptions {
                        title: Some("Ollama Chat".into()),
                        ..Default::default()
                    }),
                    ..Default::default()
                };

                // Root is required by gpui-component for notifications.
                cx.open_window(options, |window, cx| {
                    let notification_list = cx.new(|cx| NotificationList::new(window, cx));
                    let shell = cx.new(|cx| ChatAppShell::new(notification_list, window, cx));
                    cx.new(|cx| Root::new(shell, window, cx))
                })
                .expect("failed to open main window");

                cx.activate(true);
            })
        })
        .detach();
    });
}
