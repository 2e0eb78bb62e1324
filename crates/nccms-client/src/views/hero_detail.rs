//! Single hero lookup

use crate::api_client::CmsClient;
use crate::error::{ClientError, ClientResult};
use nccms_core::Hero;

/// Parse a hero id taken from user input
///
/// # Errors
///
/// Returns a validation error for anything but a positive integer.
pub fn parse_hero_id(raw: &str) -> ClientResult<i64> {
    raw.trim()
        .parse::<i64>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or_else(|| ClientError::validation(Some("id"), "Invalid hero ID."))
}

/// Load one hero by its raw id
///
/// Invalid ids are rejected before any request; a missing hero surfaces as
/// [`ClientError::NotFound`].
///
/// # Errors
///
/// Returns the validation, not-found or transport error.
pub async fn load_hero_detail(client: &CmsClient, raw_id: &str) -> ClientResult<Hero> {
    let id = parse_hero_id(raw_id)?;
    client.get_hero(id).await.map_err(|e| match e {
        ClientError::NotFound { .. } => ClientError::NotFound {
            resource: format!("hero {id}"),
        },
        other => other,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_hero_id() {
        assert_eq!(parse_hero_id(" 42 ").unwrap(), 42);
        for raw in ["", "abc", "4.5", "-1", "0"] {
            assert_eq!(parse_hero_id(raw).unwrap_err().to_string(), "Invalid hero ID.");
        }
    }
}
