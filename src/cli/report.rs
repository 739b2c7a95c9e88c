//! User-facing failure reports.

use crate::error::{NsplanError, RollbackStatus};
use crate::ui::UserInterface;

/// Show `err` with its category and any follow-up the user needs.
pub fn report_error(ui: &mut dyn UserInterface, err: &NsplanError) {
    ui.error(&format!("{}: {}", err.category(), err));

    match err {
        NsplanError::ApplyFailed {
            rollback: RollbackStatus::Restored,
            ..
        } => {
            ui.warning("The previous configuration was restored and applied again.");
        }
        NsplanError::ApplyFailed {
            rollback: RollbackStatus::Failed(_),
            ..
        } => {
            ui.error("!!! ROLLBACK FAILED: network configuration is in an indeterminate state !!!");
            ui.error("Inspect the netplan directory and run `nsplan restore` or `netplan apply` by hand.");
        }
        NsplanError::AmbiguousConfiguration { .. } => {
            ui.message("Hint: pass --file <name> to choose a document.");
        }
        NsplanError::InterfaceSelectionRequired { .. } => {
            ui.message("Hint: pass --interface <name> to choose an interface.");
        }
        NsplanError::UnknownProvider { .. } => {
            ui.message("Hint: run `nsplan providers` to list the available providers.");
        }
        NsplanError::BackupNotFound { .. } => {
            ui.message("Hint: run `nsplan backups` to list the available backups.");
        }
        _ => {}
    }
}
