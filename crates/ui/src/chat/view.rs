use std::sync::Arc;

use gpui::*;
use gpui_component::{ActiveTheme, h_flex, label::Label, v_flex};
use gpui_tokio_bridge::Tokio;
use ollama_chat_llm::{ChatProvider, create_provider};

use crate::chat::events::{DraftChanged, Submit};
use crate::chat::session::{ChatSession, PendingRequest, dispatch};
use crate::chat::{MessageInput, MessageList};
use crate::settings::ChatSettings;

/// Coordinator between the session, the provider, and the list/input views.
pub struct ChatView {
    session: ChatSession,
    message_list: Entity<MessageList>,
    message_input: Entity<MessageInput>,
    provider: Option<Arc<dyn ChatProvider>>,
    provider_error: Option<String>,
    model_id: SharedString,
    request_task: Option<Task<()>>,
}

impl ChatView {
    pub fn new(settings: &ChatSettings, window: &mut Window, cx: &mut Context<Self>) -> Self {
        let message_list = cx.new(MessageList::new);
        let message_input = cx.new(|cx| MessageInput::new(window, cx));
        let (provider, provider_error) = Self::initialize_provider(settings);

        cx.subscribe(&message_input, |this, _, event: &DraftChanged, cx| {
            this.handle_draft_changed(event, cx);
        })
        .detach();

        cx.subscribe_in(&message_input, window, |this, _, _event: &Submit, window, cx| {
            this.handle_submit(window, cx);
        })
        .detach();

        let this = Self {
            session: ChatSession::new(),
            message_list,
            message_input,
            provider,
            provider_error,
            model_id: SharedString::from(settings.model.clone()),
            request_task: None,
        };
        this.sync_projection(cx);
        this
    }

    pub fn focus_input(&self, window: &mut Window, cx: &mut Context<Self>) {
        self.message_input
            .update(cx, |input, cx| input.focus(window, cx));
    }

    fn initialize_provider(
        settings: &ChatSettings,
    ) -> (Option<Arc<dyn ChatProvider>>, Option<String>) {
        match create_provider(settings.to_provider_config()) {
            Ok(provider) => (Some(provider), None),
            Err(error) => {
                tracing::error!(
                    endpoint = %settings.endpoint,
                    "failed to initialize chat provider: {error}"
                );
                (None, Some(error.to_string()))
            }
        }
    }

    fn handle_draft_changed(&mut self, event: &DraftChanged, cx: &mut Context<Self>) {
        self.session.update_draft(event.text.clone());

        // The transcript does not depend on the draft; only the input needs refreshing.
        let projection = self.session.project_input();
        self.message_input.update(cx, |input, cx| {
            input.apply_projection(projection, cx);
        });
    }

    fn handle_submit(&mut self, window: &mut Window, cx: &mut Context<Self>) {
        let Some(request) = self.session.submit() else {
            return;
        };

        self.message_input.update(cx, |input, cx| {
            input.clear(window, cx);
        });
        self.sync_projection(cx);
        self.spawn_request(request, cx);
    }

    fn spawn_request(&mut self, request: PendingRequest, cx: &mut Context<Self>) {
        let Some(provider) = self.provider.clone() else {
            let error = self
                .provider_error
                .clone()
                .unwrap_or_else(|| "chat provider is not configured".to_string());
            self.finish_request(Err(error), cx);
            return;
        };

        let worker = Tokio::spawn(cx, async move { dispatch(provider.as_ref(), request).await });

        self.request_task = Some(cx.spawn(async move |this, cx| {
            // A worker that panicked or was torn down still settles the request.
            let outcome = match worker.await {
                Ok(outcome) => outcome.map_err(|error| error.to_string()),
                Err(join_error) => Err(format!("chat request worker stopped: {join_error:?}")),
            };

            let _ = this.update(cx, |this, cx| {
                this.finish_request(outcome, cx);
            });
        }));
    }

    fn finish_request(&mut self, outcome: Result<String, String>, cx: &mut Context<Self>) {
        self.request_task.take();
        self.session.resolve(outcome);
        tracing::info!(
            turn_count = self.session.conversation().len(),
            "chat request settled"
        );
        self.sync_projection(cx);
    }

    fn sync_projection(&self, cx: &mut Context<Self>) {
        let projection = self.session.project();

        self.message_list.update(cx, |list, cx| {
            list.set_projection(&projection, cx);
        });
        self.message_input.update(cx, |input, cx| {
            input.apply_projection(projection.input, cx);
        });
        cx.notify();
    }
}

impl Render for ChatView {
    fn render(&mut self, _window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        let theme = cx.theme();

        v_flex()
            .id("chat-view")
            .relative()
            .size_full()
            .min_h_0()
            .overflow_hidden()
            .bg(theme.background)
            .child(
                h_flex()
                    .id("chat-view-header")
                    .h(px(48.))
                    .px_4()
                    .items_center()
                    .justify_between()
                    .border_b_1()
                    .border_color(theme.border)
                    .child(
                        div()
                            .text_sm()
                            .font_weight(FontWeight::MEDIUM)
                            .text_color(theme.foreground)
                            .child("Chat"),
                    )
                    .child(
                        Label::new(self.model_id.clone())
                            .text_xs()
                            .text_color(theme.muted_foreground),
                    ),
            )
            .child(
                div()
                    .id("chat-view-message-list")
                    .flex_1()
                    .min_h_0()
                    .child(self.message_list.clone()),
            )
            .child(
                div()
                    .id("chat-view-message-input")
                    .flex_shrink_0()
                    .w_full()
                    .child(self.message_input.clone()),
            )
    }
}
