use gpui::*;
use gpui_component::{
    ActiveTheme, Disableable, IconName, Sizable,
    button::{Button, ButtonVariants},
    h_flex,
    input::{Input, InputEvent, InputState},
};

use crate::chat::events::{DraftChanged, Submit};
use crate::chat::projection::{INPUT_PLACEHOLDER, InputProjection, SEND_LABEL};

/// Draft editor and send button.
///
/// Holds no chat state of its own: edits are forwarded as [`DraftChanged`] and
/// the enabled/label state is pushed back in from the session projection.
pub struct MessageInput {
    input_state: Entity<InputState>,
    editable: bool,
    submit_enabled: bool,
    submit_label: &'static str,
}

impl EventEmitter<DraftChanged> for MessageInput {}
impl EventEmitter<Submit> for MessageInput {}

impl MessageInput {
    pub fn new(window: &mut Window, cx: &mut Context<Self>) -> Self {
        let input_state = cx.new(|cx| InputState::new(window, cx).placeholder(INPUT_PLACEHOLDER));

        cx.subscribe_in(
            &input_state,
            window,
            |this, state, event: &InputEvent, _window, cx| match event {
                InputEvent::Change { .. } => {
                    let text = state.read(cx).value().to_string();
                    cx.emit(DraftChanged::new(text));
                }
                InputEvent::PressEnter { .. } => this.handle_submit(cx),
                _ => {}
            },
        )
        .detach();

        Self {
            input_state,
            editable: true,
            submit_enabled: false,
            submit_label: SEND_LABEL,
        }
    }

    pub fn apply_projection(&mut self, projection: InputProjection, cx: &mut Context<Self>) {
        self.editable = projection.editable;
        self.submit_enabled = projection.submit_enabled;
        self.submit_label = projection.submit_label;
        cx.notify();
    }

    pub fn clear(&mut self, window: &mut Window, cx: &mut Context<Self>) {
        self.input_state.update(cx, |state, cx| {
            state.set_value("", window, cx);
        });
    }

    pub fn focus(&self, window: &mut Window, cx: &mut Context<Self>) {
        self.input_state.update(cx, |state, cx| {
            state.focus(window, cx);
        });
    }

    fn handle_submit(&mut self, cx: &mut Context<Self>) {
        if !self.submit_enabled {
            return;
        }

        cx.emit(Submit);
    }
}

impl Render for MessageInput {
    fn render(&mut self, _window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        let theme = cx.theme();

        h_flex()
            .bg(theme.background)
            .gap_2()
            .p_3()
            .items_center()
            .border_t_1()
            .border_color(theme.border)
            .child(
                div().flex_1().min_w_0().child(
                    Input::new(&self.input_state)
                        .w_full()
                        .disabled(!self.editable),
                ),
            )
            .child(
                Button::new("send")
                    .small()
                    .primary()
                    .icon(IconName::ArrowUp)
                    .child(self.submit_label)
                    .disabled(!self.submit_enabled)
                    .on_click(cx.listener(|this, _, _window, cx| {
                        this.handle_submit(cx);
                    })),
            )
    }
}
