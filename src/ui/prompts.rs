//! Interactive prompts backed by dialoguer.

use console::{style, Term};
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Confirm, Input, Select};

use crate::error::{NsplanError, Result};

use super::{parse_bool_answer, Prompt, PromptOption, PromptResult, PromptType};

fn map_dialoguer_err(e: dialoguer::Error) -> NsplanError {
    NsplanError::Io(e.into())
}

/// Dialoguer theme without the default yellow `?` prefix.
fn prompt_theme() -> ColorfulTheme {
    ColorfulTheme {
        prompt_prefix: style(String::new()),
        ..ColorfulTheme::default()
    }
}

/// Prompt the user for input on the given terminal.
pub fn prompt_user(prompt: &Prompt, term: &Term) -> Result<PromptResult> {
    match &prompt.prompt_type {
        PromptType::Confirm => {
            let default = prompt
                .default
                .as_deref()
                .map(parse_bool_answer)
                .unwrap_or(false);
            let answer = Confirm::with_theme(&prompt_theme())
                .with_prompt(&prompt.question)
                .default(default)
                .interact_on(term)
                .map_err(map_dialoguer_err)?;
            Ok(PromptResult::Bool(answer))
        }
        PromptType::Input => {
            let theme = prompt_theme();
            let mut input = Input::<String>::with_theme(&theme).with_prompt(&prompt.question);
            if let Some(default) = &prompt.default {
                input = input.default(default.clone());
            }
            let answer = input.interact_on(term).map_err(map_dialoguer_err)?;
            Ok(PromptResult::String(answer))
        }
        PromptType::Select { options } => prompt_select(prompt, options, term),
    }
}

fn prompt_select(prompt: &Prompt, options: &[PromptOption], term: &Term) -> Result<PromptResult> {
    if options.is_empty() {
        return Err(NsplanError::Other(anyhow::anyhow!(
            "nothing to choose from for '{}'",
            prompt.key
        )));
    }

    let labels: Vec<&str> = options.iter().map(|o| o.label.as_str()).collect();
    let default_idx = prompt
        .default
        .as_ref()
        .and_then(|d| options.iter().position(|o| o.value == *d))
        .unwrap_or(0);

    let selection = Select::with_theme(&prompt_theme())
        .with_prompt(&prompt.question)
        .items(&labels)
        .default(default_idx)
        .interact_on(term)
        .map_err(map_dialoguer_err)?;

    Ok(PromptResult::String(options[selection].value.clone()))
}
