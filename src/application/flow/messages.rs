//! Standard user-facing messages built from the text catalog.

use crate::config::{ConfigError, Translations};
use crate::domain::message::{ClickAction, Message, TextStyle};

/// A refusal or failure reason, in error style.
pub fn error_message(reason: &str) -> Message {
    Message::new().styled(reason, TextStyle::Error)
}

/// Lists the candidates as clickable options.
///
/// Each option runs `/<label> <name>`, which is exactly what the flow
/// waits for after sending this message.
pub fn method_choice_message(
    translations: &Translations,
    prefix_key: &str,
    candidates: &[&str],
    label: &str,
) -> Result<Message, ConfigError> {
    let tooltip = translations.of("candidate-tooltip")?;

    let mut message = Message::new()
        .text(translations.of(prefix_key)?)
        .line_break()
        .text(translations.of("choice-instructions")?);

    for name in candidates {
        message = message.line_break().text(" - ").link(
            *name,
            Some(tooltip.clone()),
            ClickAction::RunCommand(format!("/{} {}", label, name)),
        );
    }

    Ok(message)
}

/// Shows a registration code the user can copy with one click.
pub fn registration_code_message(
    translations: &Translations,
    code: &str,
) -> Result<Message, ConfigError> {
    Ok(Message::new()
        .styled(translations.of("registration-instructions")?, TextStyle::Bold)
        .line_break()
        .link(
            code,
            Some(translations.of("copy-to-clipboard")?),
            ClickAction::CopyToClipboard(code.to_string()),
        ))
}
