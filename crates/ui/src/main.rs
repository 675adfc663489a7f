use gpui::*;
use gpui_component::Root;

use thesis_chat::app::{ChatWidgetShell, Quit, ToggleChat, widget_window_size};
use thesis_chat::chat::view::CHAT_TITLE;

/// Bootstraps GPUI, the tokio bridge used for agent requests, and a single
/// window hosting the chat widget.
fn main() {
    tracing_subscriber::fmt::init();

    let app = Application::new().with_assets(gpui_component_assets::Assets);

    app.run(|cx| {
        gpui_tokio_bridge::init(cx);

        // Required before any Root usage.
        gpui_component::init(cx);

        cx.on_action(|_: &Quit, cx| {
            cx.quit();
        });

        cx.bind_keys([
            KeyBinding::new("cmd-q", Quit, None),
            KeyBinding::new("ctrl-q", Quit, None),
            KeyBinding::new("cmd-k", ToggleChat, None),
            KeyBinding::new("ctrl-k", ToggleChat, None),
        ]);

        cx.spawn(async move |cx| {
            cx.update(|cx| {
                let options = WindowOptions {
                    window_bounds: Some(WindowBounds::Windowed(Bounds::centered(
                        None,
                        widget_window_size(),
                        cx,
                    ))),
                    titlebar: Some(TitlebarOptions {
                        title: Some(CHAT_TITLE.into()),
                        ..Default::default()
                    }),
                    ..Default::default()
                };

                let opened = cx.open_window(options, |window, cx| {
                    let shell = cx.new(|cx| ChatWidgetShell::new(window, cx));
                    cx.new(|cx| Root::new(shell, window, cx))
                });

                match opened {
                    Ok(_) => cx.activate(true),
                    Err(error) => {
                        tracing::error!("failed to open widget window: {error}");
                        cx.quit();
                    }
                }
            })
        })
        .detach();
    });
}
