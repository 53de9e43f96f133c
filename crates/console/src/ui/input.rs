use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tokio::sync::mpsc;

use protocol::commands::{parse_query_minute, parse_window_size};

use crate::app::{AppState, Focus, FormField, PromptKind};
use crate::events::ControllerCommand;

pub(crate) fn handle_key_event(
    key: KeyEvent,
    app: &mut AppState,
    cmd_tx: &mpsc::Sender<ControllerCommand>,
) -> bool {
    if app.confirm_quit {
        match key.code {
            KeyCode::Char('q') | KeyCode::Char('Q') => return true,
            KeyCode::Esc => {
                app.confirm_quit = false;
                return false;
            }
            _ => {
                app.confirm_quit = false;
            }
        }
    }

    if app.prompt.is_some() {
        handle_prompt_key(key, app, cmd_tx);
        return false;
    }

    match app.focus {
        Focus::Form => handle_form_key(key, app, cmd_tx),
        Focus::Console => handle_console_key(key, app, cmd_tx),
    }
    false
}

fn handle_form_key(key: KeyEvent, app: &mut AppState, cmd_tx: &mpsc::Sender<ControllerCommand>) {
    match key.code {
        KeyCode::Char('q') | KeyCode::Char('Q') => app.confirm_quit = true,
        KeyCode::Tab => app.focus = Focus::Console,
        KeyCode::Down => app.select_next_field(),
        KeyCode::Up => app.select_prev_field(),
        KeyCode::Left => app.prev_snapshot(),
        KeyCode::Right => app.next_snapshot(),
        KeyCode::Enter => match app.selected_field() {
            FormField::WorkType => app.form.toggle_work_type(),
            FormField::Normalize => app.form.toggle_normalize(),
            field => app.open_prompt(PromptKind::Field(field)),
        },
        KeyCode::Char('s') => {
            app.form_error = None;
            match app.form.build_run_config() {
                Ok(config) => {
                    let _ = cmd_tx.try_send(ControllerCommand::SaveConfig(config));
                }
                Err(err) => app.form_error = Some(err),
            }
        }
        KeyCode::Char('r') => {
            app.form_error = None;
            match app.form.build_run_config() {
                Ok(config) => {
                    let _ = cmd_tx.try_send(ControllerCommand::SaveAndRun(config));
                }
                Err(err) => app.form_error = Some(err),
            }
        }
        KeyCode::Char('u') => trigger_upload(app, cmd_tx),
        KeyCode::Char('t') => {
            let _ = cmd_tx.try_send(ControllerCommand::ToggleConsole);
        }
        KeyCode::Char('w') => app.open_prompt(PromptKind::WindowSize),
        KeyCode::Char('k') => app.open_prompt(PromptKind::QueryMinute),
        KeyCode::Char('x') => {
            let _ = cmd_tx.try_send(ControllerCommand::Reset);
        }
        KeyCode::Char('d') => {
            let _ = cmd_tx.try_send(ControllerCommand::DownloadOutput);
        }
        _ => {}
    }
}

fn handle_console_key(key: KeyEvent, app: &mut AppState, cmd_tx: &mpsc::Sender<ControllerCommand>) {
    match key.code {
        KeyCode::Esc | KeyCode::Tab => app.focus = Focus::Form,
        // Ctrl/Cmd+Enter sends; the newline is suppressed by not inserting it.
        KeyCode::Enter
            if key
                .modifiers
                .intersects(KeyModifiers::CONTROL | KeyModifiers::SUPER | KeyModifiers::META) =>
        {
            if !app.sending && !app.console_input.is_empty() {
                let _ = cmd_tx.try_send(ControllerCommand::SendConsoleText(
                    app.console_input.clone(),
                ));
            }
        }
        KeyCode::Enter => {
            if !app.sending {
                app.console_input.push('\n');
            }
        }
        KeyCode::Backspace => {
            if !app.sending {
                app.console_input.pop();
            }
        }
        KeyCode::Char(ch) => {
            if !app.sending {
                app.console_input.push(ch);
            }
        }
        _ => {}
    }
}

fn handle_prompt_key(key: KeyEvent, app: &mut AppState, cmd_tx: &mpsc::Sender<ControllerCommand>) {
    match key.code {
        KeyCode::Esc => app.prompt = None,
        KeyCode::Enter => commit_prompt(app, cmd_tx),
        KeyCode::Backspace => {
            if let Some(prompt) = app.prompt.as_mut() {
                prompt.buffer.pop();
            }
        }
        KeyCode::Char(ch) => {
            if let Some(prompt) = app.prompt.as_mut() {
                prompt.buffer.push(ch);
            }
        }
        _ => {}
    }
}

fn commit_prompt(app: &mut AppState, cmd_tx: &mpsc::Sender<ControllerCommand>) {
    let Some(prompt) = app.prompt.as_mut() else {
        return;
    };
    match prompt.kind {
        // Validation failures stay inline; nothing goes on the wire.
        PromptKind::WindowSize => match parse_window_size(&prompt.buffer) {
            Ok(size) => {
                let _ = cmd_tx.try_send(ControllerCommand::SetWindowSize(size));
                app.prompt = None;
            }
            Err(err) => prompt.error = Some(err),
        },
        PromptKind::QueryMinute => match parse_query_minute(&prompt.buffer) {
            Ok(minute) => {
                let _ = cmd_tx.try_send(ControllerCommand::QueryMinute(minute));
                app.prompt = None;
            }
            Err(err) => prompt.error = Some(err),
        },
        PromptKind::Field(field) => {
            let value = prompt.buffer.clone();
            app.prompt = None;
            commit_field(app, field, value, cmd_tx);
        }
    }
}

fn commit_field(
    app: &mut AppState,
    field: FormField,
    value: String,
    cmd_tx: &mpsc::Sender<ControllerCommand>,
) {
    app.form_error = None;
    app.form.set_text_field(field, value);
    match field {
        // Changing the time window re-runs right away so the chart reflects it.
        FormField::TimeRange => match app.form.build_run_config() {
            Ok(config) => {
                let _ = cmd_tx.try_send(ControllerCommand::SaveAndRun(config));
            }
            Err(err) => app.form_error = Some(err),
        },
        // Picking a file uploads it immediately.
        FormField::UploadPath => trigger_upload(app, cmd_tx),
        _ => {}
    }
}

fn trigger_upload(app: &mut AppState, cmd_tx: &mpsc::Sender<ControllerCommand>) {
    let path = app.form.upload_path.trim().to_string();
    if !path.is_empty() {
        // Show the local name until the server answers with its own path.
        if let Some(name) = std::path::Path::new(&path).file_name() {
            app.form.input_display = name.to_string_lossy().into_owned();
        }
    }
    let _ = cmd_tx.try_send(ControllerCommand::UploadInput(path));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FormDefaults;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn setup() -> (
        AppState,
        mpsc::Sender<ControllerCommand>,
        mpsc::Receiver<ControllerCommand>,
    ) {
        let (tx, rx) = mpsc::channel(8);
        (AppState::new(&FormDefaults::default()), tx, rx)
    }

    #[test]
    fn invalid_window_size_stays_inline_without_command() {
        let (mut app, tx, mut rx) = setup();
        app.open_prompt(PromptKind::WindowSize);
        for ch in "abc".chars() {
            handle_key_event(key(KeyCode::Char(ch)), &mut app, &tx);
        }
        handle_key_event(key(KeyCode::Enter), &mut app, &tx);
        let prompt = app.prompt.as_ref().expect("prompt stays open");
        assert!(prompt.error.is_some());
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn valid_query_minute_sends_command() {
        let (mut app, tx, mut rx) = setup();
        app.open_prompt(PromptKind::QueryMinute);
        for ch in "120".chars() {
            handle_key_event(key(KeyCode::Char(ch)), &mut app, &tx);
        }
        handle_key_event(key(KeyCode::Enter), &mut app, &tx);
        assert!(app.prompt.is_none());
        match rx.try_recv().expect("command sent") {
            ControllerCommand::QueryMinute(minute) => assert_eq!(minute, 120),
            _ => panic!("unexpected command"),
        }
    }

    #[test]
    fn ctrl_enter_sends_instead_of_inserting_newline() {
        let (mut app, tx, mut rx) = setup();
        app.focus = Focus::Console;
        app.console_input = "hello".to_string();
        handle_key_event(
            KeyEvent::new(KeyCode::Enter, KeyModifiers::CONTROL),
            &mut app,
            &tx,
        );
        assert_eq!(app.console_input, "hello");
        match rx.try_recv().expect("command sent") {
            ControllerCommand::SendConsoleText(text) => assert_eq!(text, "hello"),
            _ => panic!("unexpected command"),
        }
    }

    #[test]
    fn plain_enter_inserts_newline() {
        let (mut app, tx, _rx) = setup();
        app.focus = Focus::Console;
        app.console_input = "hello".to_string();
        handle_key_event(key(KeyCode::Enter), &mut app, &tx);
        assert_eq!(app.console_input, "hello\n");
    }

    #[test]
    fn sending_disables_console_edits() {
        let (mut app, tx, mut rx) = setup();
        app.focus = Focus::Console;
        app.sending = true;
        app.console_input = "queued".to_string();
        handle_key_event(key(KeyCode::Char('x')), &mut app, &tx);
        handle_key_event(
            KeyEvent::new(KeyCode::Enter, KeyModifiers::CONTROL),
            &mut app,
            &tx,
        );
        assert_eq!(app.console_input, "queued");
        assert!(rx.try_recv().is_err());
    }
}
