//! Dashboard overview of every CMS collection

use crate::api_client::CmsClient;
use futures::future::join_all;
use nccms_core::{Clock, CollectionSummary, ResourceKind};
use tracing::warn;

/// One collection's card
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardCard {
    /// Collection shown
    pub kind: ResourceKind,
    /// Card heading
    pub title: &'static str,
    /// Count and freshness, default when the fetch failed
    pub summary: CollectionSummary,
    /// Relative "last updated" label
    pub updated: Option<String>,
    /// Error banner when the collection could not be loaded
    pub error: Option<String>,
}

impl DashboardCard {
    /// "N Records", "1 Record", or a dash when the count is unknown
    #[must_use]
    pub fn record_label(&self) -> String {
        match self.summary.count {
            Some(1) => "1 Record".to_string(),
            Some(count) => format!("{count} Records"),
            None => "\u{2014}".to_string(),
        }
    }

    /// Footer line of the card
    #[must_use]
    pub fn meta_label(&self) -> String {
        if self.error.is_some() {
            return "Unable to load data.".to_string();
        }
        match &self.updated {
            Some(label) => format!("Last updated: {label}"),
            None => "Last updated: unknown".to_string(),
        }
    }
}

/// All collection cards, in fixed dashboard order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dashboard {
    /// Cards in [`ResourceKind::ALL`] order
    pub cards: Vec<DashboardCard>,
}

impl Dashboard {
    /// Fetch every collection concurrently
    ///
    /// A failing collection only marks its own card.
    pub async fn load(client: &CmsClient, clock: &dyn Clock) -> Self {
        let fetches = ResourceKind::ALL.into_iter().map(|kind| async move {
            (kind, client.list(kind).await)
        });

        let cards = join_all(fetches)
            .await
            .into_iter()
            .map(|(kind, result)| match result {
                Ok(data) => {
                    let summary = CollectionSummary::from_payload(&data);
                    DashboardCard {
                        kind,
                        title: kind.title(),
                        summary,
                        updated: summary.updated_label(clock),
                        error: None,
                    }
                }
                Err(e) => {
                    warn!(resource = %kind, error = %e, "Failed to load dashboard collection");
                    DashboardCard {
                        kind,
                        title: kind.title(),
                        summary: CollectionSummary::default(),
                        updated: None,
                        error: Some(e.user_message()),
                    }
                }
            })
            .collect();

        Self { cards }
    }

    /// Card for `kind`
    #[must_use]
    pub fn card(&self, kind: ResourceKind) -> Option<&DashboardCard> {
        self.cards.iter().find(|card| card.kind == kind)
    }

    /// Sum of the known record counts
    #[must_use]
    pub fn total_records(&self) -> u64 {
        self.cards.iter().filter_map(|card| card.summary.count).sum()
    }
}
