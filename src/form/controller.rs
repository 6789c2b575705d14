//! Form controller: the single owner of the candidate form, its latest error
//! mapping and the committed model.
//!
//! Edits never touch the committed model directly. A commit re-reads the
//! authoritative error mapping computed from the candidate at that moment,
//! so a field reporting itself "touched" before the aggregate validity is
//! known can never commit a stale model.

use serde::Deserialize;
use std::collections::BTreeSet;
use thiserror::Error;
use tracing::debug;

use super::field::{AssetList, Field, FieldKind, FieldPath};
use super::validate::{ErrorMap, FieldError, validate};
use super::{AssetInput, NEW_ICON_URL, NEW_IMAGE_URL, SignatureForm};
use crate::model::{MAX_ICONS, MAX_IMAGES, SignatureModel};

/// A value delivered by an input widget.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Flag(bool),
    Text(String),
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Text(s)
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        FieldValue::Flag(b)
    }
}

/// Rejected edits. These never reach the error mapping: they describe a
/// widget sending something the form has no slot for.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditError {
    #[error("{field} expects a {expected} value")]
    TypeMismatch {
        field: FieldPath,
        expected: &'static str,
    },

    #[error("{list} has no entry at index {index}")]
    NoSuchEntry { list: &'static str, index: usize },

    #[error("{list} is full ({max} entries)")]
    Full { list: &'static str, max: usize },
}

impl EditError {
    /// Field-level error equivalent, for callers that surface it inline.
    pub fn as_field_error(&self) -> Option<FieldError> {
        match self {
            EditError::Full { max, .. } => Some(FieldError::TooManyItems { max: *max }),
            _ => None,
        }
    }
}

/// Owns one form's state across edits.
#[derive(Debug, Clone, Default)]
pub struct FormController {
    candidate: SignatureForm,
    errors: ErrorMap,
    touched: BTreeSet<FieldPath>,
    committed: Option<SignatureModel>,
}

impl FormController {
    /// Fresh form with defaults and nothing committed.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing candidate and commit it right away.
    pub fn with_form(candidate: SignatureForm) -> Self {
        let mut controller = Self {
            candidate,
            ..Self::default()
        };
        controller.commit();
        controller
    }

    pub fn form(&self) -> &SignatureForm {
        &self.candidate
    }

    /// Latest error mapping for the whole candidate.
    pub fn errors(&self) -> &ErrorMap {
        &self.errors
    }

    /// Errors for fields the user has already left, for inline display.
    pub fn visible_errors(&self) -> ErrorMap {
        self.errors.filtered(|path| self.is_touched(path))
    }

    pub fn is_touched(&self, path: &FieldPath) -> bool {
        if self.touched.contains(path) {
            return true;
        }
        // List-level errors ("icons") show once any entry was touched.
        let prefix = format!("{}.", path);
        self.touched.iter().any(|t| t.as_str().starts_with(&prefix))
    }

    /// The committed model, or `None` when absent.
    pub fn committed(&self) -> Option<&SignatureModel> {
        self.committed.as_ref()
    }

    /// Whether export controls should be enabled.
    pub fn can_export(&self) -> bool {
        self.committed.is_some() && self.errors.is_empty()
    }

    /// Apply a change notification and re-run validation.
    pub fn change(&mut self, field: Field, value: impl Into<FieldValue>) -> Result<(), EditError> {
        let value = value.into();
        match (field.kind(), value) {
            (FieldKind::Toggle, FieldValue::Flag(flag)) => self.set_toggle(field, flag),
            (FieldKind::Text, FieldValue::Text(text)) => self.set_text(field, text)?,
            (FieldKind::Toggle, FieldValue::Text(_)) => {
                return Err(EditError::TypeMismatch {
                    field: field.path(),
                    expected: "boolean",
                });
            }
            (FieldKind::Text, FieldValue::Flag(_)) => {
                return Err(EditError::TypeMismatch {
                    field: field.path(),
                    expected: "text",
                });
            }
        }

        self.errors = validate(&self.candidate);

        // Selects and switches have no blur; they commit on change.
        if !matches!(field.kind(), FieldKind::Text) || is_select(field) {
            self.touched.insert(field.path());
            self.commit();
        }
        Ok(())
    }

    /// Field exit: normalize, mark touched, re-validate and commit.
    pub fn blur(&mut self, field: Field) {
        if self.candidate.normalize(field) {
            debug!(field = %field, "normalized on blur");
        }
        self.touched.insert(field.path());
        self.commit();
    }

    /// Replace the committed model from the authoritative error mapping.
    ///
    /// Returns the committed model, if any.
    pub fn commit(&mut self) -> Option<&SignatureModel> {
        self.errors = validate(&self.candidate);
        self.committed = match self.candidate.to_model() {
            Ok(model) => {
                debug!(signature = %model, "committed signature");
                Some(model)
            }
            Err(errors) => {
                debug!(errors = errors.len(), "form has errors, nothing committed");
                None
            }
        };
        self.committed.as_ref()
    }

    pub fn add_image(&mut self) -> Result<usize, EditError> {
        self.add_asset(AssetList::Image, NEW_IMAGE_URL, MAX_IMAGES)
    }

    pub fn add_icon(&mut self) -> Result<usize, EditError> {
        self.add_asset(AssetList::Icons, NEW_ICON_URL, MAX_ICONS)
    }

    pub fn remove_image(&mut self, index: usize) -> Result<(), EditError> {
        self.remove_asset(AssetList::Image, index)
    }

    pub fn remove_icon(&mut self, index: usize) -> Result<(), EditError> {
        self.remove_asset(AssetList::Icons, index)
    }

    /// Back to defaults, no errors, nothing committed.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    fn add_asset(&mut self, list: AssetList, url: &str, max: usize) -> Result<usize, EditError> {
        let entries = self.candidate.assets_mut(list);
        if entries.len() >= max {
            return Err(EditError::Full {
                list: list.key(),
                max,
            });
        }
        entries.push(AssetInput::new(url, ""));
        let index = entries.len() - 1;
        self.errors = validate(&self.candidate);
        Ok(index)
    }

    fn remove_asset(&mut self, list: AssetList, index: usize) -> Result<(), EditError> {
        let entries = self.candidate.assets_mut(list);
        if index >= entries.len() {
            return Err(EditError::NoSuchEntry {
                list: list.key(),
                index,
            });
        }
        entries.remove(index);
        self.forget_touched_entries(list);
        self.commit();
        Ok(())
    }

    /// Entry paths shift after a removal; drop their touched state.
    fn forget_touched_entries(&mut self, list: AssetList) {
        let prefix = format!("{}.", list.key());
        self.touched.retain(|p| !p.as_str().starts_with(&prefix));
    }

    fn set_toggle(&mut self, field: Field, flag: bool) {
        match field {
            Field::IncludeBackground => self.candidate.include_background = flag,
            Field::IncludeBorder => self.candidate.include_border = flag,
            _ => unreachable!("toggle kind is only reported for toggle fields"),
        }
    }

    fn set_text(&mut self, field: Field, text: String) -> Result<(), EditError> {
        let form = &mut self.candidate;
        let slot = match field {
            Field::Name => &mut form.name,
            Field::Title => &mut form.title,
            Field::Company => &mut form.company,
            Field::Phone => &mut form.phone,
            Field::Email => &mut form.email,
            Field::Website => &mut form.website,
            Field::IconPosition => &mut form.icon_position,
            Field::IconAlignment => &mut form.icon_alignment,
            Field::BackgroundColor => &mut form.background_color,
            Field::BorderColor => &mut form.border_color,
            Field::BorderWidth => &mut form.border_width,
            Field::FontSize => &mut form.font_size,
            Field::AssetUrl(list, index) | Field::AssetAltText(list, index) => {
                let entry = form
                    .assets_mut(list)
                    .get_mut(index)
                    .ok_or(EditError::NoSuchEntry {
                        list: list.key(),
                        index,
                    })?;
                if matches!(field, Field::AssetUrl(..)) {
                    &mut entry.url
                } else {
                    &mut entry.alt_text
                }
            }
            Field::IncludeBackground | Field::IncludeBorder => {
                unreachable!("text kind is never reported for toggle fields")
            }
        };
        *slot = text;
        Ok(())
    }
}

fn is_select(field: Field) -> bool {
    matches!(field, Field::IconPosition | Field::IconAlignment)
}
