use gpui::prelude::FluentBuilder;
use gpui::*;
use gpui_component::ActiveTheme;

use crate::chat::ChatView;

/// Chat window width.
pub const CHAT_WINDOW_WIDTH: f32 = 320.0;
/// Chat window height.
pub const CHAT_WINDOW_HEIGHT: f32 = 384.0;
pub const BUBBLE_SIZE: f32 = 56.0;
/// Distance between the bubble and the window edges.
pub const WIDGET_MARGIN: f32 = 24.0;
pub const BUBBLE_WINDOW_GAP: f32 = 8.0;
pub const INTRO_MESSAGE: &str = "Questions about the thesis? Ask me!";

const _: () = {
    assert!(BUBBLE_SIZE > 0.0);
    assert!(CHAT_WINDOW_WIDTH > BUBBLE_SIZE);
    assert!(WIDGET_MARGIN >= 0.0);
};

gpui::actions!(widget, [ToggleChat, Quit]);

/// Host window size that fits the open chat window above the bubble.
pub fn widget_window_size() -> Size<Pixels> {
    size(
        px(CHAT_WINDOW_WIDTH + WIDGET_MARGIN * 2.0),
        px(CHAT_WINDOW_HEIGHT + BUBBLE_SIZE + BUBBLE_WINDOW_GAP + WIDGET_MARGIN * 2.0),
    )
}

/// Floating bubble, one-time intro popover and the chat window above them.
pub struct ChatWidgetShell {
    chat_view: Entity<ChatView>,
}

impl ChatWidgetShell {
    pub fn new(window: &mut Window, cx: &mut Context<Self>) -> Self {
        let chat_view = cx.new(|cx| ChatView::new(window, cx));

        // The shell decides what is visible, so it re-renders on every view change.
        cx.observe(&chat_view, |_, _, cx| cx.notify()).detach();

        Self { chat_view }
    }

    pub fn chat_view(&self) -> &Entity<ChatView> {
        &self.chat_view
    }

    fn toggle_chat(&mut self, cx: &mut Context<Self>) {
        self.chat_view.update(cx, |chat_view, cx| chat_view.toggle(cx));
        cx.notify();
    }

    fn render_bubble(&self, cx: &Context<Self>) -> impl IntoElement {
        let theme = cx.theme();

        div()
            .id("chat-bubble")
            .absolute()
            .bottom(px(WIDGET_MARGIN))
            .right(px(WIDGET_MARGIN))
            .size(px(BUBBLE_SIZE))
            .rounded_full()
            .flex()
            .items_center()
            .justify_center()
            .bg(theme.primary)
            .text_color(theme.primary_foreground)
            .text_xl()
            .shadow_lg()
            .cursor_pointer()
            .on_click(cx.listener(|this, _, _window, cx| {
                this.toggle_chat(cx);
            }))
            .child("💬")
    }

    fn render_intro(&self, cx: &Context<Self>) -> impl IntoElement {
        let theme = cx.theme();

        div()
            .id("chat-intro")
            .absolute()
            .bottom(px(WIDGET_MARGIN + BUBBLE_SIZE / 4.0))
            .right(px(WIDGET_MARGIN + BUBBLE_SIZE + BUBBLE_WINDOW_GAP))
            .max_w(px(CHAT_WINDOW_WIDTH - BUBBLE_SIZE))
            .px_3()
            .py_2()
            .rounded_lg()
            .border_1()
            .border_color(theme.border)
            .bg(theme.background)
            .text_color(theme.foreground)
            .text_sm()
            .shadow_md()
            .child(INTRO_MESSAGE)
    }

    fn render_chat_window(&self) -> impl IntoElement {
        div()
            .id("chat-window")
            .absolute()
            .bottom(px(WIDGET_MARGIN + BUBBLE_SIZE + BUBBLE_WINDOW_GAP))
            .right(px(WIDGET_MARGIN))
            .w(px(CHAT_WINDOW_WIDTH))
            .h(px(CHAT_WINDOW_HEIGHT))
            .child(self.chat_view.clone())
    }
}

impl Render for ChatWidgetShell {
    fn render(&mut self, _window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        let theme = cx.theme();
        let (is_open, intro_visible) = {
            let chat_view = self.chat_view.read(cx);
            (chat_view.is_open(), chat_view.intro_visible())
        };

        div()
            .id("widget-shell")
            .key_context("ChatWidget")
            .size_full()
            .relative()
            .bg(theme.background)
            .on_action(cx.listener(|this, _: &ToggleChat, _window, cx| {
                this.toggle_chat(cx);
            }))
            .when(is_open, |shell| shell.child(self.render_chat_window()))
            .when(intro_visible && !is_open, |shell| {
                shell.child(self.render_intro(cx))
            })
            .child(self.render_bubble(cx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[::core::prelude::v1::test]
    fn host_window_fits_chat_window_and_bubble() {
        let window_size = widget_window_size();
        assert!(f32::from(window_size.width) >= CHAT_WINDOW_WIDTH);
        assert!(
            f32::from(window_size.height)
                >= CHAT_WINDOW_HEIGHT + BUBBLE_SIZE + BUBBLE_WINDOW_GAP
        );
    }
}
