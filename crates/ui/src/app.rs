use std::path::PathBuf;

use gpui::*;
use gpui_component::notification::{Notification, NotificationList};
use gpui_component::{
    ActiveTheme, IconName, Sizable, ThemeMode,
    button::{Button, ButtonVariants},
    h_flex,
};

use crate::chat::ChatView;
use crate::settings::{SettingsChanged, SettingsState};

/// Returns the default themes directory path.
pub fn default_themes_path() -> PathBuf {
    PathBuf::from("./themes")
}

/// Theme mode the toggle switches to from `current`.
pub fn next_theme_mode(current: ThemeMode) -> ThemeMode {
    if current.is_dark() {
        ThemeMode::Light
    } else {
        ThemeMode::Dark
    }
}

gpui::actions!(shell, [ToggleTheme, Quit]);

/// Window root: the chat view, a theme toggle, and the notification layer.
pub struct ChatAppShell {
    notification_list: Entity<NotificationList>,
    settings_state: Entity<SettingsState>,
    chat_view: Entity<ChatView>,
}

impl ChatAppShell {
    pub fn new(
        notification_list: Entity<NotificationList>,
        window: &mut Window,
        cx: &mut Context<Self>,
    ) -> Self {
        let settings_state = SettingsState::new(cx);
        let settings = settings_state.read(cx).settings();
        let chat_view = cx.new(|cx| ChatView::new(&settings, window, cx));

        cx.subscribe_in(
            &settings_state,
            window,
            |_this, _, event: &SettingsChanged, window, cx| {
                event.settings.apply_theme(Some(window), cx);
                cx.refresh_windows();
            },
        )
        .detach();

        chat_view.update(cx, |chat_view, cx| chat_view.focus_input(window, cx));

        Self {
            notification_list,
            settings_state,
            chat_view,
        }
    }

    fn toggle_theme(&mut self, window: &mut Window, cx: &mut Context<Self>) {
        let settings = self.settings_state.read(cx).settings();
        let next_mode = next_theme_mode(settings.theme_mode);
        let updated = settings.as_ref().clone().with_theme_mode(next_mode);

        let result = self
            .settings_state
            .update(cx, |state, cx| state.update_settings(updated, cx));

        if let Err(error) = result {
            tracing::error!("failed to save theme mode: {error}");
            self.notification_list.update(cx, |list, cx| {
                list.push(
                    Notification::error(format!("Could not save settings: {error}")),
                    window,
                    cx,
                );
            });
        }
    }
}

impl Render for ChatAppShell {
    fn render(&mut self, _window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        let theme = cx.theme();
        let theme_icon = if theme.mode.is_dark() {
            IconName::Sun
        } else {
            IconName::Moon
        };

        div()
            .id("app-shell")
            .size_full()
            .relative()
            .bg(theme.background)
            .on_action(cx.listener(|this, _: &ToggleTheme, window, cx| {
                this.toggle_theme(window, cx);
            }))
            .child(self.chat_view.clone())
            // Sits inside the chat header, left of the model label.
            .child(
                h_flex()
                    .absolute()
                    .top(px(8.))
                    .right(px(160.))
                    .gap_2()
                    .child(
                        Button::new("toggle-theme")
                            .ghost()
                            .small()
                            .icon(theme_icon)
                            .on_click(cx.listener(|this, _, window, cx| {
                                this.toggle_theme(window, cx);
                            })),
                    ),
            )
            // Notification layer for toast messages
            .child(self.notification_list.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn theme_toggle_alternates_modes() {
        assert_eq!(next_theme_mode(ThemeMode::Light), ThemeMode::Dark);
        assert_eq!(next_theme_mode(ThemeMode::Dark), ThemeMode::Light);
    }
}
