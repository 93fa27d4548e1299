//! Plain-text notification builders.

use portal_core::actor::Actor;
use portal_core::collaboration::Collaboration;
use portal_core::lab_booking::LabBooking;
use portal_core::labs::Lab;
use portal_core::notify::Notification;
use portal_core::project::Project;
use portal_core::status::ApprovalStatus;

const SUBJECT_PREFIX: &str = "[Research Portal]";

fn subject(text: &str) -> String {
    format!("{SUBJECT_PREFIX} {text}")
}

/// Sent to the owner and every team member after a reviewer decision.
pub fn project_decision(project: &Project, recipient: &str) -> Notification {
    let verdict = match project.status {
        ApprovalStatus::Approved => "approved",
        ApprovalStatus::Rejected => "rejected",
        ApprovalStatus::Pending => "returned to review",
    };
    Notification::new(
        recipient,
        subject(&format!("Project Update: {}", project.status)),
        format!(
            "The project \"{}\" (version {}) has been {verdict}.\n\nDomain: {}\nOwner: {}",
            project.title, project.version, project.domain, project.owner_name
        ),
    )
}

/// Sent to the lab's faculty contact. Replies go to the requester.
pub fn lab_request(booking: &LabBooking, lab: &Lab, project_title: &str, requester: &Actor) -> Notification {
    Notification::new(
        &lab.faculty_email,
        subject(&format!("Lab Request: {} on {}", lab.name, booking.date)),
        format!(
            "{} has requested {} on {} ({}).\n\nProject: {project_title}\nReason: {}\n\nReply to this email to contact the requester.",
            requester.name, lab.name, booking.date, booking.slot, booking.reason
        ),
    )
    .with_reply_to(&requester.email)
}

/// Sent to the requester's confirmation address when a request is filed.
pub fn lab_request_receipt(booking: &LabBooking, lab: &Lab) -> Notification {
    Notification::new(
        &booking.confirmation_email,
        subject("Lab Request Received"),
        format!(
            "Your request for {} on {} ({}) is pending faculty approval.",
            lab.name, booking.date, booking.slot
        ),
    )
}

/// Sent to the requester's confirmation address after a decision.
pub fn lab_decision(booking: &LabBooking) -> Notification {
    Notification::new(
        &booking.confirmation_email,
        subject(&format!("Lab Booking {}", booking.status)),
        format!(
            "Your booking of {} on {} ({}) is now {}.",
            booking.lab, booking.date, booking.slot, booking.status
        ),
    )
}

/// Sent to the receiver when a proposal arrives.
pub fn collaboration_request(collab: &Collaboration) -> Notification {
    let sender = &collab.sender;
    let mut body = format!(
        "{} ({}, {}) would like to collaborate on \"{}\".",
        sender.name, sender.role, sender.email, collab.project.title
    );
    if let Some(department) = &sender.department {
        body.push_str(&format!("\nDepartment: {department}"));
    }
    if let Some(message) = &collab.message {
        body.push_str(&format!("\n\nMessage:\n{message}"));
    }
    Notification::new(
        &collab.receiver_email,
        subject(&format!("Collaboration Request: {}", collab.project.title)),
        body,
    )
    .with_reply_to(&sender.email)
}

/// Copy for the sender confirming the proposal was filed.
pub fn collaboration_receipt(collab: &Collaboration) -> Notification {
    Notification::new(
        collab.sender_email(),
        subject("Collaboration Request Sent"),
        format!(
            "Your proposal to {} about \"{}\" has been sent.",
            collab.receiver_email, collab.project.title
        ),
    )
}

/// Sent to the sender once the receiver has decided.
pub fn collaboration_decision(collab: &Collaboration) -> Notification {
    Notification::new(
        collab.sender_email(),
        subject(&format!("Collaboration {}", collab.status)),
        format!(
            "{} has {} your collaboration proposal about \"{}\".",
            collab.receiver_email,
            collab.status.name().to_lowercase(),
            collab.project.title
        ),
    )
}

/// Free-text instruction from the receiver to the sender.
pub fn directive(collab: &Collaboration, issuer: &Actor, text: &str) -> Notification {
    Notification::new(
        collab.sender_email(),
        subject(&format!("Directive: {}", collab.project.title)),
        format!("{} writes:\n\n{text}", issuer.name),
    )
    .with_reply_to(&issuer.email)
}
