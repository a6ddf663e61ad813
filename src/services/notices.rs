use crate::schemas::{EmailStatus, NoticeKind};

/// Render-ready state of one notice kind for one rent term.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct NoticeState {
    pub kind: NoticeKind,
    pub sent: bool,
    /// "sent on {date}" caption when a delivery timestamp exists.
    pub sent_on: Option<String>,
}

/// Derive the per-kind notice states from a rent's email status maps.
///
/// A kind absent from the `status` map is simply not sent — billing
/// generation predates the notice emails, so holes are the normal case.
pub fn notice_states(email_status: Option<&EmailStatus>, english_locale: bool) -> Vec<NoticeState> {
    NoticeKind::ALL
        .iter()
        .map(|kind| {
            let sent = email_status
                .and_then(|es| es.status.get(kind))
                .copied()
                .unwrap_or(false);
            let sent_on = if sent {
                email_status
                    .and_then(|es| es.last.get(kind))
                    .map(|delivery| {
                        let format = if english_locale { "%m/%d/%Y" } else { "%d/%m/%Y" };
                        format!("sent on {}", delivery.sent_date.format(format))
                    })
            } else {
                None
            };
            NoticeState {
                kind: *kind,
                sent,
                sent_on,
            }
        })
        .collect()
}

/// The furthest stage the server has reached in the
/// pending → first → second → last → receipt notice lifecycle.
/// Purely observational: the client never forces a transition.
pub fn furthest_notice(email_status: Option<&EmailStatus>) -> Option<NoticeKind> {
    let email_status = email_status?;
    NoticeKind::ALL
        .iter()
        .rev()
        .find(|kind| email_status.status.get(*kind).copied().unwrap_or(false))
        .copied()
}
