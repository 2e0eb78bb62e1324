//! Hero create/edit form

use crate::api_client::CmsClient;
use crate::error::{ClientError, ClientResult};
use nccms_core::{BgType, Hero, ResourceKind};
use serde_json::{Value, json};
use tracing::{error, info};

/// Fallback banner when the server gives no readable reason
const GENERIC_SAVE_ERROR: &str = "Could not save hero block. Please review the fields.";

/// Whether the form creates a new hero or edits an existing one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    /// POST to the collection
    Create,
    /// PATCH an existing record
    Edit,
}

/// Editable hero fields, kept as raw text until submit
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeroDraft {
    /// Record being edited
    pub id: Option<i64>,
    /// Headline, required
    pub title: String,
    /// Sub-headline
    pub subtitle: String,
    /// Primary call-to-action label
    pub cta_primary_label: String,
    /// Primary call-to-action link
    pub cta_primary_href: String,
    /// Secondary call-to-action label
    pub cta_secondary_label: String,
    /// Secondary call-to-action link
    pub cta_secondary_href: String,
    /// Background style
    pub bg_type: BgType,
    /// Active flag
    pub is_active: bool,
}

fn to_nullable(value: &str) -> Value {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Value::Null
    } else {
        Value::String(trimmed.to_string())
    }
}

impl HeroDraft {
    /// Draft pre-filled from a stored hero
    #[must_use]
    pub fn from_hero(hero: &Hero) -> Self {
        let text = |value: Option<&String>| value.cloned().unwrap_or_default();
        Self {
            id: Some(hero.id),
            title: hero.title.clone(),
            subtitle: text(hero.subtitle.as_ref()),
            cta_primary_label: text(hero.cta_primary_label.as_ref()),
            cta_primary_href: text(hero.cta_primary_href.as_ref()),
            cta_secondary_label: text(hero.cta_secondary_label.as_ref()),
            cta_secondary_href: text(hero.cta_secondary_href.as_ref()),
            bg_type: hero.bg_type,
            is_active: hero.is_active,
        }
    }

    /// Inline checks run before anything is sent
    ///
    /// # Errors
    ///
    /// Returns a validation error naming the offending field.
    pub fn validate(&self) -> ClientResult<()> {
        if self.title.trim().is_empty() {
            return Err(ClientError::validation(Some("title"), "Title is required."));
        }
        Ok(())
    }

    /// Request body; blank optional fields are sent as `null`
    #[must_use]
    pub fn to_payload(&self) -> Value {
        json!({
            "title": self.title.trim(),
            "subtitle": to_nullable(&self.subtitle),
            "cta_primary_label": to_nullable(&self.cta_primary_label),
            "cta_primary_href": to_nullable(&self.cta_primary_href),
            "cta_secondary_label": to_nullable(&self.cta_secondary_label),
            "cta_secondary_href": to_nullable(&self.cta_secondary_href),
            "bg_type": self.bg_type,
            "is_active": self.is_active,
        })
    }
}

/// Form state: the draft, the draft it was opened with, and the banner from
/// the last submit
#[derive(Debug, Clone)]
pub struct HeroForm {
    mode: FormMode,
    /// Field values
    pub draft: HeroDraft,
    initial: HeroDraft,
    error: Option<String>,
}

impl HeroForm {
    /// Empty form for a new hero
    #[must_use]
    pub fn create() -> Self {
        Self::with_draft(FormMode::Create, HeroDraft::default())
    }

    /// Form editing `hero`
    #[must_use]
    pub fn edit(hero: &Hero) -> Self {
        Self::with_draft(FormMode::Edit, HeroDraft::from_hero(hero))
    }

    /// Form in an explicit mode around an existing draft
    #[must_use]
    pub fn with_draft(mode: FormMode, draft: HeroDraft) -> Self {
        Self {
            mode,
            initial: draft.clone(),
            draft,
            error: None,
        }
    }

    /// Discard edits and the banner, restoring the draft the form opened with
    pub fn reset(&mut self) {
        self.draft = self.initial.clone();
        self.error = None;
    }

    /// Whether the draft differs from the one the form opened with
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.draft != self.initial
    }

    /// Create or edit
    #[must_use]
    pub const fn mode(&self) -> FormMode {
        self.mode
    }

    /// Banner message from the last submit
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Validate and send the draft
    ///
    /// # Errors
    ///
    /// Returns the validation error, "Missing hero identifier." for an edit
    /// without id, or the server error. The banner text is kept in
    /// [`Self::error`].
    pub async fn submit(&mut self, client: &CmsClient) -> ClientResult<Hero> {
        self.error = None;

        let result = self.send(client).await;
        match &result {
            Ok(hero) => info!(id = hero.id, mode = ?self.mode, "Hero saved"),
            Err(e) => {
                error!(mode = ?self.mode, error = %e, "Failed to submit hero form");
                self.error = Some(banner_for(e));
            }
        }
        result
    }

    async fn send(&self, client: &CmsClient) -> ClientResult<Hero> {
        self.draft.validate()?;
        let payload = self.draft.to_payload();

        let saved = match self.mode {
            FormMode::Create => client.create(ResourceKind::Hero, &payload).await?,
            FormMode::Edit => {
                let id = self
                    .draft
                    .id
                    .ok_or_else(|| ClientError::validation(Some("id"), "Missing hero identifier."))?;
                client.update(ResourceKind::Hero, id, &payload).await?
            }
        };

        Ok(serde_json::from_value(saved)?)
    }
}

fn banner_for(error: &ClientError) -> String {
    match error {
        ClientError::Validation { message, .. } => message.clone(),
        ClientError::Network(_) | ClientError::Unauthorized { .. } => error.user_message(),
        ClientError::Api { message, .. } if !message.is_empty() => message.clone(),
        _ => GENERIC_SAVE_ERROR.to_string(),
    }
}
