//! Confirmation dialog shown before a destructive action.
//!
//! The dialog holds no state of its own: it renders from its props and
//! forwards clicks to the callbacks it was given.

use std::fmt;

use console::{Term, style};
use dialoguer::Select;
use dialoguer::theme::ColorfulTheme;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variation {
    Secondary,
    Danger,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogAction {
    Cancel,
    Confirm,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ButtonView {
    pub label: &'static str,
    pub variation: Variation,
    pub action: DialogAction,
    pub disabled: bool,
}

/// Rendered output of [`ConfirmDelete`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialogView {
    pub heading: String,
    pub message: String,
    pub buttons: [ButtonView; 2],
}

impl DialogView {
    pub fn enabled_buttons(&self) -> impl Iterator<Item = &ButtonView> {
        self.buttons.iter().filter(|b| !b.disabled)
    }
}

impl fmt::Display for DialogView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", style(&self.heading).bold())?;
        writeln!(f, "{}", style(&self.message).dim())?;
        writeln!(f)?;
        let buttons: Vec<String> = self
            .buttons
            .iter()
            .map(|b| {
                let label = format!("[ {} ]", b.label);
                match (b.variation, b.disabled) {
                    (_, true) => style(label).dim().strikethrough().to_string(),
                    (Variation::Danger, false) => style(label).red().bold().to_string(),
                    (Variation::Secondary, false) => style(label).to_string(),
                }
            })
            .collect();
        write!(f, "{}", buttons.join("  "))
    }
}

/// Dialog asking the user to confirm deleting a `resource_name`.
pub struct ConfirmDelete<C, X>
where
    C: FnMut(),
    X: FnMut(),
{
    resource_name: String,
    on_confirm: C,
    on_close_modal: X,
    disabled: bool,
}

impl<C, X> ConfirmDelete<C, X>
where
    C: FnMut(),
    X: FnMut(),
{
    pub fn new(resource_name: impl Into<String>, on_confirm: C, on_close_modal: X) -> Self {
        Self {
            resource_name: resource_name.into(),
            on_confirm,
            on_close_modal,
            disabled: false,
        }
    }

    /// Block the confirm action, e.g. while a delete is already in flight.
    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    pub fn view(&self) -> DialogView {
        let name = &self.resource_name;
        DialogView {
            heading: format!("Delete {name}"),
            message: format!(
                "Are you sure you want to delete this {name} permanently? This action cannot be undone."
            ),
            buttons: [
                ButtonView {
                    label: "Cancel",
                    variation: Variation::Secondary,
                    action: DialogAction::Cancel,
                    disabled: false,
                },
                ButtonView {
                    label: "Delete",
                    variation: Variation::Danger,
                    action: DialogAction::Confirm,
                    disabled: self.disabled,
                },
            ],
        }
    }

    /// Click a button. Returns whether a callback ran.
    pub fn click(&mut self, action: DialogAction) -> bool {
        match action {
            DialogAction::Cancel => {
                (self.on_close_modal)();
                true
            }
            DialogAction::Confirm if self.disabled => false,
            DialogAction::Confirm => {
                (self.on_confirm)();
                true
            }
        }
    }

    /// Render on `term` and let the user pick a button.
    ///
    /// Escape counts as cancel. Disabled buttons are not offered.
    pub fn prompt(&mut self, term: &Term) -> dialoguer::Result<DialogAction> {
        let view = self.view();
        term.write_line(&view.to_string())?;

        let choices: Vec<&ButtonView> = view.enabled_buttons().collect();
        let labels: Vec<&str> = choices.iter().map(|b| b.label).collect();
        let picked = Select::with_theme(&ColorfulTheme::default())
            .items(&labels)
            .default(0)
            .interact_on_opt(term)?;

        let action = picked
            .and_then(|i| choices.get(i))
            .map(|b| b.action)
            .unwrap_or(DialogAction::Cancel);
        self.click(action);
        Ok(action)
    }
}
