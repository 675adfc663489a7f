use std::sync::Arc;

use gpui::prelude::FluentBuilder;
use gpui::*;
use gpui_component::{
    ActiveTheme, IconName, Sizable,
    button::{Button, ButtonVariants},
    h_flex,
    label::Label,
    v_flex,
};
use gpui_tokio_bridge::Tokio;
use thesis_chat_agent::{AgentBackend, Identity, RunRequest, create_backend, extract_reply};

use crate::chat::events::Submit;
use crate::chat::state::{PendingReply, ReplyOutcome, WidgetState};
use crate::chat::{MessageInput, MessageList};
use crate::settings::WidgetSettings;

pub const CHAT_TITLE: &str = "Thesis Chat";
pub const TYPING_INDICATOR: &str = "Agent is typing...";

/// Chat window coordinator: owns the widget state, the per-instance
/// identity and the backend handle, and wires input/list to them.
pub struct ChatView {
    state: WidgetState,
    identity: Identity,
    settings: WidgetSettings,
    backend: Option<Arc<dyn AgentBackend>>,
    message_list: Entity<MessageList>,
    message_input: Entity<MessageInput>,
}

impl ChatView {
    pub fn new(window: &mut Window, cx: &mut Context<Self>) -> Self {
        let settings = WidgetSettings::resolve();
        let identity = Identity::generate();
        let backend = match create_backend(settings.to_agent_config()) {
            Ok(backend) => Some(backend),
            Err(error) => {
                tracing::error!(
                    stage = error.stage(),
                    "failed to initialize agent client: {error}"
                );
                None
            }
        };

        tracing::info!(
            user_id = %identity.user_id,
            session_id = %identity.session_id,
            base_url = %settings.base_url,
            app_name = %settings.app_name,
            "chat widget initialized"
        );

        let message_list = cx.new(MessageList::new);
        let message_input = cx.new(|cx| MessageInput::new(window, cx));

        cx.subscribe_in(
            &message_input,
            window,
            |this, _, event: &Submit, window, cx| {
                this.handle_submit(event, window, cx);
            },
        )
        .detach();

        Self {
            state: WidgetState::new(),
            identity,
            settings,
            backend,
            message_list,
            message_input,
        }
    }

    pub fn state(&self) -> &WidgetState {
        &self.state
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn is_open(&self) -> bool {
        self.state.is_open()
    }

    pub fn intro_visible(&self) -> bool {
        self.state.intro_visible()
    }

    /// Bubble click.
    pub fn toggle(&mut self, cx: &mut Context<Self>) {
        let outcome = self.state.toggle();
        if outcome.start_session {
            self.start_session(cx);
        }
        if outcome.opened {
            self.message_list
                .update(cx, |list, cx| list.request_scroll_to_bottom(cx));
        }
        cx.notify();
    }

    pub fn close(&mut self, cx: &mut Context<Self>) {
        self.state.close();
        cx.notify();
    }

    fn start_session(&mut self, cx: &mut Context<Self>) {
        let Some(backend) = self.backend.clone() else {
            tracing::error!("cannot start agent session without an agent client");
            self.state.session_settled(false);
            return;
        };

        let task = Tokio::spawn(cx, backend.create_session(&self.identity));

        // Best effort: the widget is usable whether or not this succeeds.
        cx.spawn(async move |this, cx| {
            let started = match task.await {
                Ok(Ok(())) => true,
                Ok(Err(error)) => {
                    tracing::error!(stage = error.stage(), "failed to start agent session: {error}");
                    false
                }
                Err(error) => {
                    tracing::error!("agent session task did not complete: {error}");
                    false
                }
            };

            let _ = this.update(cx, |this, cx| {
                this.state.session_settled(started);
                cx.notify();
            });
        })
        .detach();
    }

    fn handle_submit(&mut self, event: &Submit, window: &mut Window, cx: &mut Context<Self>) {
        self.state.set_draft(event.content.clone());
        let Some(pending) = self.state.send(&event.content) else {
            return;
        };

        self.message_input.update(cx, |input, cx| {
            input.clear(window, cx);
        });
        self.sync_message_list(cx);
        self.dispatch_run(pending, cx);
        cx.notify();
    }

    fn dispatch_run(&mut self, pending: PendingReply, cx: &mut Context<Self>) {
        let Some(backend) = self.backend.clone() else {
            tracing::error!("cannot send message without an agent client");
            self.finish_send(pending, ReplyOutcome::Failed, cx);
            return;
        };

        let request = RunRequest::new(
            backend.config().app_name.clone(),
            &self.identity,
            pending.text(),
        );
        let task = Tokio::spawn(cx, backend.run(request));

        // Detached: closing the widget never cancels an in-flight request, and
        // overlapping sends settle independently in completion order.
        cx.spawn(async move |this, cx| {
            let outcome = match task.await {
                Ok(Ok(turns)) => {
                    let reply = extract_reply(&turns);
                    tracing::info!(
                        turn_count = turns.len(),
                        reply_chars = reply.chars().count(),
                        "agent replied"
                    );
                    ReplyOutcome::Reply(reply)
                }
                Ok(Err(error)) => {
                    tracing::error!(stage = error.stage(), "agent run failed: {error}");
                    ReplyOutcome::Failed
                }
                Err(error) => {
                    tracing::error!("agent run task did not complete: {error}");
                    ReplyOutcome::Failed
                }
            };

            let _ = this.update(cx, |this, cx| {
                this.finish_send(pending, outcome, cx);
            });
        })
        .detach();
    }

    fn finish_send(&mut self, pending: PendingReply, outcome: ReplyOutcome, cx: &mut Context<Self>) {
        self.state.settle(pending, outcome);
        self.sync_message_list(cx);
        cx.notify();
    }

    fn sync_message_list(&mut self, cx: &mut Context<Self>) {
        let messages = self.state.messages();
        let revision = self.state.transcript_revision();
        self.message_list.update(cx, |list, cx| {
            list.set_messages(messages, revision, cx);
        });
    }

    fn render_header(&self, cx: &Context<Self>) -> impl IntoElement {
        let theme = cx.theme();

        h_flex()
            .id("chat-view-header")
            .w_full()
            .flex_shrink_0()
            .px_3()
            .py_2()
            .items_center()
            .justify_between()
            .bg(theme.primary)
            .text_color(theme.primary_foreground)
            .child(Label::new(CHAT_TITLE).font_weight(FontWeight::BOLD))
            .child(
                Button::new("chat-view-close")
                    .ghost()
                    .small()
                    .icon(IconName::CircleX)
                    .on_click(cx.listener(|this, _, _window, cx| {
                        this.close(cx);
                    })),
            )
    }
}

impl Render for ChatView {
    fn render(&mut self, _window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        let theme = cx.theme();
        let loading = self.state.is_loading();

        v_flex()
            .id("chat-view")
            .size_full()
            .min_h_0()
            .overflow_hidden()
            .rounded_lg()
            .border_1()
            .border_color(theme.border)
            .bg(theme.background)
            .shadow_lg()
            .child(self.render_header(cx))
            .child(
                div()
                    .id("chat-view-message-list")
                    .flex_1()
                    .min_h_0()
                    .child(self.message_list.clone()),
            )
            .when(loading, |column| {
                column.child(
                    div()
                        .id("chat-view-typing")
                        .px_3()
                        .pb_1()
                        .text_xs()
                        .italic()
                        .text_color(theme.muted_foreground)
                        .child(TYPING_INDICATOR),
                )
            })
            .child(
                div()
                    .id("chat-view-message-input")
                    .flex_shrink_0()
                    .w_full()
                    .border_t_1()
                    .border_color(theme.border)
                    .child(self.message_input.clone()),
            )
    }
}
