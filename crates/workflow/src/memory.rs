//! In-memory adapters for the store and notifier seams.
//!
//! Deterministic and test-friendly. The workflow and API test suites run
//! against these instead of PostgreSQL and SMTP.

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};
use std::sync::{Mutex, RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use chrono::Utc;
use portal_core::collaboration::{Collaboration, Milestone, NewCollaboration, NewMilestone};
use portal_core::error::{StoreError, StoreResult};
use portal_core::lab_booking::{LabBooking, NewLabBooking};
use portal_core::labs::SlotKey;
use portal_core::notify::{DispatchError, Notification, Notifier};
use portal_core::project::{NewProject, Project, Revision, INITIAL_VERSION};
use portal_core::status::ApprovalStatus;
use portal_core::store::{
    BookingFilter, CollaborationStore, LabBookingStore, MilestoneStore, PortalStore, ProjectFilter,
    ProjectStore,
};
use portal_core::types::DbId;

/// In-memory portal store.
#[derive(Default)]
pub struct InMemoryStore {
    next_id: AtomicI64,
    projects: RwLock<HashMap<DbId, Project>>,
    bookings: RwLock<HashMap<DbId, LabBooking>>,
    collaborations: RwLock<HashMap<DbId, Collaboration>>,
    milestones: RwLock<Vec<Milestone>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn allocate_id(&self) -> DbId {
        self.next_id.fetch_add(1, Ordering::SeqCst) + 1
    }
}

fn read<'a, T>(lock: &'a RwLock<T>, name: &str) -> StoreResult<RwLockReadGuard<'a, T>> {
    lock.read()
        .map_err(|_| StoreError::Backend(format!("{name} lock poisoned")))
}

fn write<'a, T>(lock: &'a RwLock<T>, name: &str) -> StoreResult<RwLockWriteGuard<'a, T>> {
    lock.write()
        .map_err(|_| StoreError::Backend(format!("{name} lock poisoned")))
}

fn apply_limit<T>(mut rows: Vec<T>, limit: Option<i64>) -> Vec<T> {
    if let Some(limit) = limit {
        rows.truncate(limit.max(0) as usize);
    }
    rows
}

fn holds_slot(booking: &LabBooking, key: &SlotKey) -> bool {
    booking.status == ApprovalStatus::Approved
        && booking.lab == key.lab
        && booking.date == key.date
        && booking.slot == key.slot
}

#[async_trait]
impl ProjectStore for InMemoryStore {
    async fn insert_project(&self, input: &NewProject) -> StoreResult<Project> {
        let now = Utc::now();
        let project = Project {
            id: self.allocate_id(),
            title: input.title.clone(),
            description: input.description.clone(),
            domain: input.domain.clone(),
            department: input.department.clone(),
            project_type: input.project_type,
            year: input.year.clone(),
            owner_id: input.owner_id,
            owner_email: input.owner_email.clone(),
            owner_name: input.owner_name.clone(),
            team_members: input.team_members.clone(),
            mentor: input.mentor.clone(),
            research_paper: input.research_paper.clone(),
            github_link: input.github_link.clone(),
            file_url: input.file_url.clone(),
            funding: input.funding.clone(),
            status: input.status,
            approver_id: input.approver_id,
            version: INITIAL_VERSION,
            history: Vec::new(),
            created_at: now,
            updated_at: now,
        };
        write(&self.projects, "projects")?.insert(project.id, project.clone());
        Ok(project)
    }

    async fn find_project(&self, id: DbId) -> StoreResult<Option<Project>> {
        Ok(read(&self.projects, "projects")?.get(&id).cloned())
    }

    async fn save_project(
        &self,
        project: &Project,
        expected: &Revision,
    ) -> StoreResult<Option<Project>> {
        let mut guard = write(&self.projects, "projects")?;
        let Some(stored) = guard.get_mut(&project.id) else {
            return Ok(None);
        };
        if stored.revision() != *expected {
            return Ok(None);
        }

        // Stored history is append-only.
        let mut history = std::mem::take(&mut stored.history);
        for entry in &project.history {
            if !history.iter().any(|h| h.version == entry.version) {
                history.push(entry.clone());
            }
        }
        *stored = Project {
            history,
            ..project.clone()
        };
        Ok(Some(stored.clone()))
    }

    async fn delete_project(&self, id: DbId) -> StoreResult<bool> {
        Ok(write(&self.projects, "projects")?.remove(&id).is_some())
    }

    async fn list_projects(&self, filter: &ProjectFilter) -> StoreResult<Vec<Project>> {
        let guard = read(&self.projects, "projects")?;
        let mut rows: Vec<Project> = guard
            .values()
            .filter(|p| filter.owner_id.map_or(true, |id| p.owner_id == id))
            .filter(|p| filter.approver_id.map_or(true, |id| p.approver_id == Some(id)))
            .cloned()
            .collect();
        rows.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        Ok(apply_limit(rows, filter.limit))
    }
}

#[async_trait]
impl LabBookingStore for InMemoryStore {
    async fn insert_booking(&self, input: &NewLabBooking) -> StoreResult<LabBooking> {
        let now = Utc::now();
        let booking = LabBooking {
            id: self.allocate_id(),
            lab: input.lab.clone(),
            date: input.date,
            slot: input.slot,
            reason: input.reason.clone(),
            owner_id: input.owner_id,
            owner_name: input.owner_name.clone(),
            project_id: input.project_id,
            status: ApprovalStatus::Pending,
            confirmation_email: input.confirmation_email.clone(),
            created_at: now,
            updated_at: now,
        };
        write(&self.bookings, "bookings")?.insert(booking.id, booking.clone());
        Ok(booking)
    }

    async fn find_booking(&self, id: DbId) -> StoreResult<Option<LabBooking>> {
        Ok(read(&self.bookings, "bookings")?.get(&id).cloned())
    }

    async fn find_approved_booking(&self, key: &SlotKey) -> StoreResult<Option<LabBooking>> {
        Ok(read(&self.bookings, "bookings")?
            .values()
            .find(|b| holds_slot(b, key))
            .cloned())
    }

    async fn update_booking_status(
        &self,
        id: DbId,
        status: ApprovalStatus,
    ) -> StoreResult<Option<LabBooking>> {
        let mut guard = write(&self.bookings, "bookings")?;
        let key = match guard.get(&id) {
            Some(b) if b.status == ApprovalStatus::Pending => b.slot_key(),
            _ => return Ok(None),
        };

        // Same guarantee as the partial unique index in PostgreSQL.
        if status == ApprovalStatus::Approved
            && guard.values().any(|b| b.id != id && holds_slot(b, &key))
        {
            return Err(StoreError::Conflict(format!(
                "{} on {} {} is already booked",
                key.lab, key.date, key.slot
            )));
        }

        let Some(booking) = guard.get_mut(&id) else {
            return Ok(None);
        };
        booking.status = status;
        booking.updated_at = Utc::now();
        Ok(Some(booking.clone()))
    }

    async fn delete_booking(&self, id: DbId) -> StoreResult<bool> {
        Ok(write(&self.bookings, "bookings")?.remove(&id).is_some())
    }

    async fn delete_pending_bookings(&self, owner_id: DbId, ids: &[DbId]) -> StoreResult<u64> {
        let mut guard = write(&self.bookings, "bookings")?;
        let before = guard.len();
        guard.retain(|id, b| {
            !(ids.contains(id) && b.owner_id == owner_id && b.status == ApprovalStatus::Pending)
        });
        Ok((before - guard.len()) as u64)
    }

    async fn list_bookings(&self, filter: &BookingFilter) -> StoreResult<Vec<LabBooking>> {
        let guard = read(&self.bookings, "bookings")?;
        let mut rows: Vec<LabBooking> = guard
            .values()
            .filter(|b| filter.owner_id.map_or(true, |id| b.owner_id == id))
            .filter(|b| filter.status.map_or(true, |s| b.status == s))
            .cloned()
            .collect();
        rows.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        Ok(apply_limit(rows, filter.limit))
    }
}

#[async_trait]
impl CollaborationStore for InMemoryStore {
    async fn insert_collaboration(&self, input: &NewCollaboration) -> StoreResult<Collaboration> {
        let collab = Collaboration {
            id: self.allocate_id(),
            sender_id: input.sender_id,
            sender: input.sender.clone(),
            receiver_email: input.receiver_email.clone(),
            project: input.project.clone(),
            message: input.message.clone(),
            status: ApprovalStatus::Pending,
            created_at: Utc::now(),
        };
        write(&self.collaborations, "collaborations")?.insert(collab.id, collab.clone());
        Ok(collab)
    }

    async fn find_collaboration(&self, id: DbId) -> StoreResult<Option<Collaboration>> {
        Ok(read(&self.collaborations, "collaborations")?.get(&id).cloned())
    }

    async fn resolve_collaboration(
        &self,
        id: DbId,
        status: ApprovalStatus,
    ) -> StoreResult<Option<Collaboration>> {
        let mut guard = write(&self.collaborations, "collaborations")?;
        match guard.get_mut(&id) {
            Some(collab) if collab.status == ApprovalStatus::Pending => {
                collab.status = status;
                Ok(Some(collab.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn list_collaborations_for(&self, email: &str) -> StoreResult<Vec<Collaboration>> {
        let guard = read(&self.collaborations, "collaborations")?;
        let mut rows: Vec<Collaboration> = guard
            .values()
            .filter(|c| c.sender.email == email || c.receiver_email == email)
            .cloned()
            .collect();
        rows.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        Ok(rows)
    }

    async fn list_incoming_collaborations(&self, email: &str) -> StoreResult<Vec<Collaboration>> {
        let guard = read(&self.collaborations, "collaborations")?;
        let mut rows: Vec<Collaboration> = guard
            .values()
            .filter(|c| c.receiver_email == email)
            .cloned()
            .collect();
        rows.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        Ok(rows)
    }
}

#[async_trait]
impl MilestoneStore for InMemoryStore {
    async fn insert_milestone(&self, input: &NewMilestone) -> StoreResult<Milestone> {
        let milestone = Milestone {
            id: self.allocate_id(),
            collaboration_id: input.collaboration_id,
            phase: input.phase.clone(),
            report: input.report.clone(),
            submitted_by: input.submitted_by,
            author_id: input.author_id,
            author_email: input.author_email.clone(),
            created_at: Utc::now(),
        };
        write(&self.milestones, "milestones")?.push(milestone.clone());
        Ok(milestone)
    }

    async fn list_milestones(&self, collaboration_id: DbId) -> StoreResult<Vec<Milestone>> {
        Ok(read(&self.milestones, "milestones")?
            .iter()
            .filter(|m| m.collaboration_id == collaboration_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl PortalStore for InMemoryStore {
    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Notifier
// ---------------------------------------------------------------------------

/// Notifier that keeps every delivered message in an outbox.
///
/// Built with [`RecordingNotifier::failing`] it rejects every send instead,
/// while still counting attempts.
#[derive(Default)]
pub struct RecordingNotifier {
    outbox: Mutex<Vec<Notification>>,
    attempts: AtomicUsize,
    fail: bool,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    /// Delivered notifications in send order.
    pub fn sent(&self) -> Vec<Notification> {
        self.outbox
            .lock()
            .map(|outbox| outbox.clone())
            .unwrap_or_default()
    }

    /// Delivered notifications addressed to `to`.
    pub fn sent_to(&self, to: &str) -> Vec<Notification> {
        self.sent().into_iter().filter(|n| n.to == to).collect()
    }

    /// Every send call, failed or not.
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    pub fn clear(&self) {
        if let Ok(mut outbox) = self.outbox.lock() {
            outbox.clear();
        }
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, notification: &Notification) -> Result<(), DispatchError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(DispatchError::Transport("recording notifier set to fail".to_string()));
        }
        self.outbox
            .lock()
            .map_err(|_| DispatchError::Transport("outbox lock poisoned".to_string()))?
            .push(notification.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use chrono::NaiveDate;
    use portal_core::labs::TimeSlot;
    use portal_core::project::{Funding, ProjectType};

    use super::*;

    fn booking(owner_id: DbId) -> NewLabBooking {
        NewLabBooking {
            lab: "IoT".into(),
            date: NaiveDate::from_ymd_opt(2025, 1, 20).unwrap(),
            slot: TimeSlot::Morning,
            reason: "Calibration".into(),
            owner_id,
            owner_name: "Stu".into(),
            project_id: 1,
            confirmation_email: "stu@uni.edu".into(),
        }
    }

    fn project(owner_id: DbId) -> NewProject {
        NewProject {
            title: "Soil moisture mesh".into(),
            description: "LoRa sensor network".into(),
            domain: "IoT".into(),
            department: None,
            project_type: ProjectType::UserDefined,
            year: "2025".into(),
            owner_id,
            owner_email: "stu@uni.edu".into(),
            owner_name: "Stu".into(),
            team_members: Vec::new(),
            mentor: None,
            research_paper: None,
            github_link: None,
            file_url: Some("/uploads/synopsis.pdf".into()),
            funding: Funding::default(),
            status: ApprovalStatus::Pending,
            approver_id: None,
        }
    }

    #[tokio::test]
    async fn second_approval_for_same_slot_conflicts() {
        let store = InMemoryStore::new();
        let a = store.insert_booking(&booking(1)).await.unwrap();
        let b = store.insert_booking(&booking(2)).await.unwrap();

        store
            .update_booking_status(a.id, ApprovalStatus::Approved)
            .await
            .unwrap()
            .unwrap();
        assert_matches!(
            store.update_booking_status(b.id, ApprovalStatus::Approved).await,
            Err(StoreError::Conflict(_))
        );
        // Rejection is still allowed.
        let rejected = store
            .update_booking_status(b.id, ApprovalStatus::Rejected)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(rejected.status, ApprovalStatus::Rejected);
    }

    #[tokio::test]
    async fn decided_booking_is_not_decided_again() {
        let store = InMemoryStore::new();
        let a = store.insert_booking(&booking(1)).await.unwrap();

        store
            .update_booking_status(a.id, ApprovalStatus::Approved)
            .await
            .unwrap()
            .unwrap();
        assert!(store
            .update_booking_status(a.id, ApprovalStatus::Rejected)
            .await
            .unwrap()
            .is_none());
        assert_eq!(
            store.find_booking(a.id).await.unwrap().unwrap().status,
            ApprovalStatus::Approved
        );
        assert!(store
            .update_booking_status(a.id + 100, ApprovalStatus::Approved)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn save_with_stale_revision_is_refused() {
        let store = InMemoryStore::new();
        let loaded = store.insert_project(&project(1)).await.unwrap();
        let seen = loaded.revision();

        let mut approved = loaded.clone();
        approved.status = ApprovalStatus::Approved;
        approved.approver_id = Some(10);
        approved.updated_at = loaded.updated_at + chrono::Duration::seconds(1);
        assert!(store.save_project(&approved, &seen).await.unwrap().is_some());

        let mut retitled = loaded.clone();
        retitled.title = "Retitled".into();
        assert!(store.save_project(&retitled, &seen).await.unwrap().is_none());

        let stored = store.find_project(loaded.id).await.unwrap().unwrap();
        assert_eq!(stored.status, ApprovalStatus::Approved);
        assert_eq!(stored.title, loaded.title);
    }

    #[tokio::test]
    async fn batch_delete_only_touches_own_pending() {
        let store = InMemoryStore::new();
        let mine = store.insert_booking(&booking(1)).await.unwrap();
        let theirs = store.insert_booking(&booking(2)).await.unwrap();
        let approved = store.insert_booking(&booking(1)).await.unwrap();
        store
            .update_booking_status(approved.id, ApprovalStatus::Approved)
            .await
            .unwrap()
            .unwrap();

        let removed = store
            .delete_pending_bookings(1, &[mine.id, theirs.id, approved.id])
            .await
            .unwrap();
        assert_eq!(removed, 1);
        assert!(store.find_booking(theirs.id).await.unwrap().is_some());
        assert!(store.find_booking(approved.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn resolve_is_compare_and_swap() {
        let store = InMemoryStore::new();
        let collab = store
            .insert_collaboration(&NewCollaboration {
                sender_id: 1,
                sender: Default::default(),
                receiver_email: "prof@uni.edu".into(),
                project: Default::default(),
                message: None,
            })
            .await
            .unwrap();

        assert!(store
            .resolve_collaboration(collab.id, ApprovalStatus::Approved)
            .await
            .unwrap()
            .is_some());
        assert!(store
            .resolve_collaboration(collab.id, ApprovalStatus::Rejected)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn failing_notifier_counts_attempts() {
        let notifier = RecordingNotifier::failing();
        let n = Notification::new("a@uni.edu", "s", "b");
        assert!(notifier.send(&n).await.is_err());
        assert_eq!(notifier.attempts(), 1);
        assert!(notifier.sent().is_empty());
    }
}
