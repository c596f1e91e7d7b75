//! Request scopes exchanged with the orchestration layer.
//!
//! Locating produces [`ContextList`] and [`UserList`]; after approval the
//! orchestration layer hands back an [`ApprovedContextList`] or an
//! [`ApprovedUserList`] to export or erase.

use std::collections::BTreeSet;

/// Set of context IDs holding a user's data.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContextList {
    ids: BTreeSet<i64>,
}

impl ContextList {
    /// Create an empty list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add context IDs.
    pub fn extend(&mut self, ids: impl IntoIterator<Item = i64>) {
        self.ids.extend(ids);
    }

    /// Whether a context is in the list.
    pub fn contains(&self, context_id: i64) -> bool {
        self.ids.contains(&context_id)
    }

    /// Context IDs in ascending order.
    pub fn ids(&self) -> Vec<i64> {
        self.ids.iter().copied().collect()
    }

    /// Number of contexts.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Whether the list is empty.
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// Accumulator of users with data in one context.
///
/// Users are appended per category as found, so the same user may appear
/// more than once. Use [`UserList::distinct`] for the deduplicated set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserList {
    context_id: i64,
    user_ids: Vec<i64>,
}

impl UserList {
    /// Create an empty accumulator for a context.
    pub fn new(context_id: i64) -> Self {
        Self {
            context_id,
            user_ids: Vec::new(),
        }
    }

    /// Context being enumerated.
    pub fn context_id(&self) -> i64 {
        self.context_id
    }

    /// Append one user.
    pub fn add_user(&mut self, user_id: i64) {
        self.user_ids.push(user_id);
    }

    /// Append several users.
    pub fn add_users(&mut self, user_ids: impl IntoIterator<Item = i64>) {
        self.user_ids.extend(user_ids);
    }

    /// Users in insertion order, duplicates included.
    pub fn user_ids(&self) -> &[i64] {
        &self.user_ids
    }

    /// Distinct users in ascending order.
    pub fn distinct(&self) -> Vec<i64> {
        let set: BTreeSet<i64> = self.user_ids.iter().copied().collect();
        set.into_iter().collect()
    }
}

/// Contexts approved for export or erasure of one user's data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApprovedContextList {
    /// User the request is about.
    pub user_id: i64,
    /// Approved contexts.
    pub context_ids: Vec<i64>,
}

impl ApprovedContextList {
    /// Create an approved list.
    pub fn new(user_id: i64, context_ids: impl IntoIterator<Item = i64>) -> Self {
        Self {
            user_id,
            context_ids: context_ids.into_iter().collect(),
        }
    }

    /// Whether no context was approved.
    pub fn is_empty(&self) -> bool {
        self.context_ids.is_empty()
    }
}

impl From<(i64, &ContextList)> for ApprovedContextList {
    fn from((user_id, contexts): (i64, &ContextList)) -> Self {
        Self::new(user_id, contexts.ids())
    }
}

/// Users approved for erasure within one context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApprovedUserList {
    /// Context the request is about.
    pub context_id: i64,
    /// Approved users.
    pub user_ids: Vec<i64>,
}

impl ApprovedUserList {
    /// Create an approved list.
    pub fn new(context_id: i64, user_ids: impl IntoIterator<Item = i64>) -> Self {
        Self {
            context_id,
            user_ids: user_ids.into_iter().collect(),
        }
    }

    /// Whether no user was approved.
    pub fn is_empty(&self) -> bool {
        self.user_ids.is_empty()
    }
}

impl From<&UserList> for ApprovedUserList {
    fn from(list: &UserList) -> Self {
        Self::new(list.context_id, list.distinct())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_list_is_a_set() {
        let mut list = ContextList::new();
        list.extend([3, 1, 3, 2]);
        assert_eq!(list.ids(), vec![1, 2, 3]);
        assert!(list.contains(2));
        assert!(!list.contains(4));
    }

    #[test]
    fn test_user_list_keeps_duplicates() {
        let mut list = UserList::new(7);
        list.add_user(5);
        list.add_users([4, 5]);
        assert_eq!(list.user_ids(), &[5, 4, 5]);
        assert_eq!(list.distinct(), vec![4, 5]);
    }

    #[test]
    fn test_approved_from_located() {
        let mut users = UserList::new(7);
        users.add_users([2, 2, 1]);
        let approved = ApprovedUserList::from(&users);
        assert_eq!(approved.context_id, 7);
        assert_eq!(approved.user_ids, vec![1, 2]);

        let mut contexts = ContextList::new();
        contexts.extend([9]);
        let approved = ApprovedContextList::from((5, &contexts));
        assert_eq!(approved.user_id, 5);
        assert_eq!(approved.context_ids, vec![9]);
        assert!(!approved.is_empty());
    }
}
