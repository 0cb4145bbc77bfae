use crate::{AppState, CenterPanelTag};

/// The single center view. Exactly one is visible at a time.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum CenterPanel {
    FeedItemDetail { item_id: String },
    FeedList,
    ProjectDashboard { project_id: String },
    Welcome,
}

/// Precedence: feed-item detail > feed list > active project > welcome.
pub fn resolve_center_panel(
    active_project_id: Option<&str>,
    center_panel_tag: Option<CenterPanelTag>,
    active_feed_item_id: Option<&str>,
) -> CenterPanel {
    if center_panel_tag == Some(CenterPanelTag::DataFeed) {
        if let Some(item_id) = active_feed_item_id {
            return CenterPanel::FeedItemDetail {
                item_id: item_id.to_owned(),
            };
        }
        return CenterPanel::FeedList;
    }

    if let Some(project_id) = active_project_id {
        return CenterPanel::ProjectDashboard {
            project_id: project_id.to_owned(),
        };
    }

    CenterPanel::Welcome
}

impl AppState {
    pub fn center_panel(&self) -> CenterPanel {
        resolve_center_panel(
            self.active_project_id.as_deref(),
            self.center_panel_tag,
            self.active_feed_item_id.as_deref(),
        )
    }
}
