use std::collections::HashSet;
use ap_core::FeedEntry;

/// The first entry, in the given order, whose link has not been published.
pub fn next_entry<'a>(entries: &'a [FeedEntry], posted: &HashSet<String>) -> Option<&'a FeedEntry> {
    entries
        .iter()
        .find(|entry| !entry.link.is_empty() && !posted.contains(entry.link.trim()))
}

/// Every entry not yet published, preserving order.
pub fn pending_entries<'a>(entries: &'a [FeedEntry], posted: &HashSet<String>) -> Vec<&'a FeedEntry> {
    entries
        .iter()
        .filter(|entry| !entry.link.is_empty() && !posted.contains(entry.link.trim()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str) -> FeedEntry {
        FeedEntry {
            title: name.to_uppercase(),
            link: format!("https://food.example.com/{}", name),
            ..Default::default()
        }
    }

    #[test]
    fn test_next_entry_skips_posted() {
        let entries = vec![entry("a"), entry("b"), entry("c")];
        let posted: HashSet<String> = ["https://food.example.com/a".to_string()].into();
        assert_eq!(next_entry(&entries, &posted).unwrap().title, "B");
    }

    #[test]
    fn test_next_entry_all_posted() {
        let entries = vec![entry("a"), entry("b")];
        let posted: HashSet<String> = entries.iter().map(|e| e.link.clone()).collect();
        assert!(next_entry(&entries, &posted).is_none());
        assert!(next_entry(&[], &posted).is_none());
    }

    #[test]
    fn test_pending_entries() {
        let entries = vec![entry("a"), entry("b"), entry("c")];
        let posted: HashSet<String> = ["https://food.example.com/b".to_string()].into();
        let pending: Vec<_> = pending_entries(&entries, &posted).iter().map(|e| e.title.clone()).collect();
        assert_eq!(pending, vec!["A", "C"]);
    }
}
