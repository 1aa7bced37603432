use std::collections::hash_map::DefaultHasher;
use std::hash::Hasher;
use std::time::Duration;

use gpui::*;
use gpui_component::{
    ActiveTheme, IconName, Sizable,
    button::{Button, ButtonVariants},
    h_flex,
    label::Label,
    text::TextView,
    v_flex,
};

use crate::chat::message::{Role, Turn};
use crate::chat::projection::{ChatProjection, TranscriptBlock};
use crate::chat::scroll_manager::ScrollManager;

const USER_BUBBLE_MAX_WIDTH: Pixels = px(540.);
const USER_BUBBLE_PADDING_X: Pixels = px(14.);
const USER_BUBBLE_PADDING_Y: Pixels = px(10.);
const TYPING_DOT_SIZE: Pixels = px(8.);
const TYPING_DOT_PERIOD: Duration = Duration::from_millis(900);
const MARKDOWN_SAFE_FALLBACK_THRESHOLD_BYTES: usize = 128 * 1024;

/// Scrollable transcript drawn from a [`ChatProjection`].
pub struct MessageList {
    blocks: Vec<TranscriptBlock>,
    scroll_manager: ScrollManager,
}

impl MessageList {
    pub fn new(_cx: &mut Context<Self>) -> Self {
        Self {
            blocks: Vec::new(),
            scroll_manager: ScrollManager::new(),
        }
    }

    pub fn set_projection(&mut self, projection: &ChatProjection, cx: &mut Context<Self>) {
        self.blocks = projection.blocks.clone();
        self.scroll_manager
            .observe_conversation(projection.turn_blocks().count());
        cx.notify();
    }

    fn render_block(&self, block: &TranscriptBlock, index: usize, cx: &Context<Self>) -> AnyElement {
        match block {
            TranscriptBlock::Welcome { title, hint } => self.render_welcome(*title, *hint, cx),
            TranscriptBlock::Turn(turn) if turn.role() == Role::User => {
                self.render_user_turn(turn, cx)
            }
            TranscriptBlock::Turn(turn) => self.render_assistant_turn(turn, index, cx),
            TranscriptBlock::TypingIndicator => self.render_typing_indicator(cx),
        }
    }

    fn render_welcome(&self, title: &'static str, hint: &'static str, cx: &Context<Self>) -> AnyElement {
        let theme = cx.theme();

        v_flex()
            .id("welcome-panel")
            .w_full()
            .py_16()
            .gap_2()
            .items_center()
            .child(
                div()
                    .text_lg()
                    .font_weight(FontWeight::SEMIBOLD)
                    .text_color(theme.foreground)
                    .child(title),
            )
            .child(
                Label::new(hint)
                    .text_sm()
                    .text_color(theme.muted_foreground),
            )
            .into_any_element()
    }

    fn render_user_turn(&self, turn: &Turn, cx: &Context<Self>) -> AnyElement {
        let theme = cx.theme();

        v_flex()
            .w_full()
            .items_end()
            .child(
                div()
                    .max_w(USER_BUBBLE_MAX_WIDTH)
                    .px(USER_BUBBLE_PADDING_X)
                    .py(USER_BUBBLE_PADDING_Y)
                    .rounded_lg()
                    .bg(theme.accent)
                    .text_color(theme.accent_foreground)
                    .child(Label::new(turn.content().to_string()).text_sm()),
            )
            .into_any_element()
    }

    fn render_assistant_turn(&self, turn: &Turn, index: usize, cx: &Context<Self>) -> AnyElement {
        let theme = cx.theme();

        v_flex()
            .w_full()
            .gap_2()
            .child(
                Label::new("Assistant")
                    .text_xs()
                    .text_color(theme.foreground.opacity(0.5)),
            )
            .child(render_assistant_content(turn, index))
            .into_any_element()
    }

    fn render_typing_indicator(&self, cx: &Context<Self>) -> AnyElement {
        let theme = cx.theme();
        let dot_color = theme.foreground.opacity(0.6);

        v_flex()
            .id("typing-indicator")
            .w_full()
            .gap_2()
            .child(
                Label::new("Assistant")
                    .text_xs()
                    .text_color(theme.foreground.opacity(0.5)),
            )
            .child(
                h_flex().gap_1().children((0..3usize).map(move |dot| {
                    // Stagger the dots so the pulse walks left to right.
                    let phase = dot as f32 / 3.0;
                    div()
                        .size(TYPING_DOT_SIZE)
                        .rounded_full()
                        .bg(dot_color)
                        .with_animation(
                            ("typing-dot", dot),
                            Animation::new(TYPING_DOT_PERIOD).repeat(),
                            move |el, delta| {
                                let wave = ((delta + 1.0 - phase) % 1.0 * std::f32::consts::TAU)
                                    .sin()
                                    .abs();
                                el.opacity(0.3 + 0.7 * wave)
                            },
                        )
                })),
            )
            .into_any_element()
    }
}

fn render_assistant_content(turn: &Turn, index: usize) -> AnyElement {
    let content = turn.content();
    if content.trim().is_empty() {
        return Label::new("(empty response)").text_sm().into_any_element();
    }

    if content.len() > MARKDOWN_SAFE_FALLBACK_THRESHOLD_BYTES {
        // Oversized payloads fall back to plain text to keep layout predictable.
        return Label::new(content.to_string())
            .text_sm()
            .into_any_element();
    }

    let markdown_id = ElementId::Name(SharedString::from(format!("assistant-markdown-{index}")));

    TextView::markdown(markdown_id, content.to_string())
        .code_block_actions(|code_block, _window, _cx| {
            let code = code_block.code().to_string();
            let mut hasher = DefaultHasher::new();
            hasher.write(code.as_bytes());
            let copy_button_id = format!("copy-code-{}", hasher.finish());

            h_flex().w_full().justify_end().child(
                Button::new(copy_button_id)
                    .ghost()
                    .small()
                    .icon(IconName::Copy)
                    .child("Copy")
                    .on_click(move |_, _, cx| {
                        cx.write_to_clipboard(ClipboardItem::new_string(code.clone()));
                    }),
            )
        })
        .selectable(true)
        .into_any_element()
}

impl Render for MessageList {
    fn render(&mut self, window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        self.scroll_manager.apply_pending_scroll(window);

        let rows = self
            .blocks
            .iter()
            .enumerate()
            .map(|(index, block)| self.render_block(block, index, cx))
            .collect::<Vec<_>>();

        v_flex()
            .id("message-list")
            .size_full()
            .min_h_0()
            .overflow_y_scroll()
            .track_scroll(self.scroll_manager.handle())
            .px_4()
            .py_3()
            .gap_4()
            .children(rows)
    }
}
