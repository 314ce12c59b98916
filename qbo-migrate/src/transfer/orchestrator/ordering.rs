//! Root-first ordering of hierarchical records

use std::collections::HashMap;

use crate::transfer::types::{Account, Class, path_depth};

/// Stable sort by ascending depth
fn sort_by_depth<E>(records: &mut Vec<E>, depth: impl Fn(&E) -> usize) {
    let mut keyed: Vec<(usize, E)> = records.drain(..).map(|r| (depth(&r), r)).collect();
    keyed.sort_by_key(|(d, _)| *d);
    records.extend(keyed.into_iter().map(|(_, r)| r));
}

/// Number of `ParentRef` hops above each account
///
/// The walk stops at a parent outside the set, or after as many hops as
/// there are records, which only happens on a cycle.
pub fn account_depth(account: &Account, parents: &HashMap<String, Option<String>>) -> usize {
    let limit = parents.len();
    let mut depth = 0;
    let mut current = account.parent_ref.as_ref().map(|p| p.value.clone());

    while let Some(id) = current {
        depth += 1;
        if depth > limit {
            log::warn!(
                "Account parent chain of {} does not terminate",
                account.name.as_deref().unwrap_or_default()
            );
            break;
        }
        current = parents.get(&id).cloned().flatten();
    }
    depth
}

pub fn order_accounts(records: &mut Vec<Account>) {
    let parents: HashMap<String, Option<String>> = records
        .iter()
        .filter_map(|a| {
            let id = a.id.clone()?;
            Some((id, a.parent_ref.as_ref().map(|p| p.value.clone())))
        })
        .collect();
    sort_by_depth(records, |a| account_depth(a, &parents));
}

pub fn order_classes(records: &mut Vec<Class>) {
    sort_by_depth(records, |c| path_depth(c.path().unwrap_or_default()));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transfer::types::Reference;

    fn account(id: &str, parent: Option<&str>) -> Account {
        Account {
            id: Some(id.into()),
            name: Some(format!("Account {}", id)),
            parent_ref: parent.map(|p| Reference::new(p, None)),
            ..Default::default()
        }
    }

    fn ids(records: &[Account]) -> Vec<&str> {
        records.iter().filter_map(|a| a.id.as_deref()).collect()
    }

    #[test]
    fn test_accounts_root_first() {
        let mut records = vec![
            account("3", Some("2")),
            account("2", Some("1")),
            account("9", None),
            account("1", None),
        ];
        order_accounts(&mut records);
        assert_eq!(ids(&records), vec!["9", "1", "2", "3"]);
    }

    #[test]
    fn test_account_cycle_terminates() {
        let mut records = vec![account("1", Some("2")), account("2", Some("1")), account("3", None)];
        order_accounts(&mut records);
        assert_eq!(records[0].id.as_deref(), Some("3"));
        assert_eq!(records.len(), 3);
    }

    #[test]
    fn test_classes_by_path_depth() {
        let class = |fqn: &str| Class {
            name: fqn.rsplit(':').next().map(String::from),
            fully_qualified_name: Some(fqn.into()),
            ..Default::default()
        };
        let mut records = vec![class("A:B:C"), class("X"), class("A:B"), class("A")];
        order_classes(&mut records);
        let paths: Vec<_> = records.iter().filter_map(|c| c.path()).collect();
        assert_eq!(paths, vec!["X", "A", "A:B", "A:B:C"]);
    }
}
