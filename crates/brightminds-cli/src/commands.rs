/// Result of processing a slash command typed into the widget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandResult {
    /// Display a message to the user.
    Message(String),
    /// Quit the application.
    Quit,
    /// Drop the current session and start a fresh one.
    NewConversation,
    /// Show provider, model and session state.
    ShowStatus,
    /// Change the color theme; empty string toggles dark/light.
    ThemeChanged(String),
    /// Switch the completion provider.
    ProviderChanged(String),
    /// Change the model for the current provider.
    ModelChanged(String),
    /// Not a command - treat as a question for the assistant.
    NotACommand,
}

pub fn handle_command(input: &str) -> CommandResult {
    let input = input.trim();
    if !input.starts_with('/') {
        return CommandResult::NotACommand;
    }

    let parts: Vec<&str> = input.splitn(2, ' ').collect();
    let cmd = parts[0];
    let arg = parts.get(1).map(|s| s.trim()).unwrap_or("");

    match cmd {
        "/help" | "/h" => show_help(),
        "/exit" | "/quit" | "/q" => CommandResult::Quit,
        "/new" | "/clear" => CommandResult::NewConversation,
        "/status" => CommandResult::ShowStatus,
        "/theme" => CommandResult::ThemeChanged(arg.to_string()),
        "/provider" => {
            if arg.is_empty() {
                CommandResult::Message(
                    "Available providers: openai, claude, ollama, proxy\nUsage: /provider <name>"
                        .into(),
                )
            } else {
                CommandResult::ProviderChanged(arg.to_string())
            }
        }
        "/model" => {
            if arg.is_empty() {
                CommandResult::Message("Usage: /model <model-name>".into())
            } else {
                CommandResult::ModelChanged(arg.to_string())
            }
        }
        "/version" => CommandResult::Message(format!(
            "Bright Minds assistant v{}",
            env!("CARGO_PKG_VERSION")
        )),
        _ => CommandResult::Message(format!("Unknown command: {cmd}. Type /help for commands.")),
    }
}

fn show_help() -> CommandResult {
    let help_text = "\
Assistant Commands

  /new, /clear          Start a fresh conversation
  /status               Show provider, model and session state
  /provider <name>      Switch provider (openai, claude, ollama, proxy)
  /model <name>         Change model
  /theme [dark|light]   Change or toggle the color theme
  /version              Show version information
  /help, /h             Show this help message
  /quit, /exit, /q      Quit

Keys: Enter send | Esc / Ctrl+O close widget | Ctrl+C quit";

    CommandResult::Message(help_text.into())
}
