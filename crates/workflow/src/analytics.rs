//! Principal dashboard figures.

use std::sync::Arc;

use portal_core::actor::Actor;
use portal_core::error::CoreError;
use portal_core::lab_booking::LabBooking;
use portal_core::project::Project;
use portal_core::roles::Role;
use portal_core::status::ApprovalStatus;
use portal_core::store::{BookingFilter, PortalStore, ProjectFilter};
use serde::Serialize;

/// How many recent projects and bookings the summary carries.
pub const RECENT_LIMIT: i64 = 5;

#[derive(Debug, Clone, Serialize)]
pub struct PortalSummary {
    pub total_projects: usize,
    pub pending_projects: usize,
    pub approved_projects: usize,
    pub rejected_projects: usize,
    pub funded_projects: usize,
    pub total_grant_amount: f64,
    pub pending_lab_bookings: usize,
    pub recent_projects: Vec<Project>,
    pub recent_lab_bookings: Vec<LabBooking>,
}

#[derive(Clone)]
pub struct PortalAnalytics {
    store: Arc<dyn PortalStore>,
}

impl PortalAnalytics {
    pub fn new(store: Arc<dyn PortalStore>) -> Self {
        Self { store }
    }

    pub async fn summary(&self, actor: &Actor) -> Result<PortalSummary, CoreError> {
        if actor.role != Role::Principal {
            return Err(CoreError::Forbidden(
                "Only the principal may view portal analytics".to_string(),
            ));
        }

        let projects = self.store.list_projects(&ProjectFilter::default()).await?;
        let count = |status: ApprovalStatus| projects.iter().filter(|p| p.status == status).count();
        let funded: Vec<&Project> = projects.iter().filter(|p| p.funding.is_funded).collect();

        let pending_lab_bookings = self
            .store
            .list_bookings(&BookingFilter {
                status: Some(ApprovalStatus::Pending),
                ..Default::default()
            })
            .await?
            .len();
        let recent_lab_bookings = self
            .store
            .list_bookings(&BookingFilter {
                limit: Some(RECENT_LIMIT),
                ..Default::default()
            })
            .await?;

        let summary = PortalSummary {
            total_projects: projects.len(),
            pending_projects: count(ApprovalStatus::Pending),
            approved_projects: count(ApprovalStatus::Approved),
            rejected_projects: count(ApprovalStatus::Rejected),
            funded_projects: funded.len(),
            total_grant_amount: funded.iter().map(|p| p.funding.amount_granted).sum(),
            pending_lab_bookings,
            recent_projects: projects
                .iter()
                .take(RECENT_LIMIT as usize)
                .cloned()
                .collect(),
            recent_lab_bookings,
        };
        tracing::debug!(
            principal_id = actor.id,
            total_projects = summary.total_projects,
            "Portal summary computed"
        );
        Ok(summary)
    }
}
