//! Who may change chat-wide settings.

use crate::domain::ChatKind;

/// A caller's membership status as reported by the messenger.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MemberStatus {
    Creator,
    Administrator,
    Member,
    Restricted,
    Left,
    Banned,
}

impl MemberStatus {
    pub fn is_privileged(&self) -> bool {
        matches!(self, Self::Creator | Self::Administrator)
    }
}

/// Private chats are always manageable by their only user. Elsewhere the
/// caller must be creator or administrator; an unknown status (lookup failed
/// or no caller) is treated as not privileged.
pub fn can_manage(kind: ChatKind, status: Option<MemberStatus>) -> bool {
    if kind.is_private() {
        return true;
    }
    status.is_some_and(|s| s.is_privileged())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn private_chats_are_always_manageable() {
        assert!(can_manage(ChatKind::Private, None));
        assert!(can_manage(ChatKind::Private, Some(MemberStatus::Member)));
    }

    #[test]
    fn groups_require_admin_or_creator() {
        for kind in [ChatKind::Group, ChatKind::Supergroup, ChatKind::Channel, ChatKind::Unknown] {
            assert!(can_manage(kind, Some(MemberStatus::Creator)));
            assert!(can_manage(kind, Some(MemberStatus::Administrator)));
            assert!(!can_manage(kind, Some(MemberStatus::Member)));
            assert!(!can_manage(kind, Some(MemberStatus::Restricted)));
            assert!(!can_manage(kind, None), "lookup failure must deny");
        }
    }
}
