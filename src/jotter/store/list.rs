//! Copy-on-write helpers over the cached note list. Each returns a fresh list
//! so the store can publish it in one replace.

use crate::model::Note;
use std::collections::HashSet;

pub fn find<'a>(notes: &'a [Note], id: &str) -> Option<&'a Note> {
    notes.iter().find(|n| n.id == id)
}

/// Replace in place when `note.id` is present, else insert at the head.
pub fn upserted(notes: &[Note], note: Note) -> Vec<Note> {
    let mut next = notes.to_vec();
    match next.iter().position(|n| n.id == note.id) {
        Some(idx) => next[idx] = note,
        None => next.insert(0, note),
    }
    next
}

/// Put `note` at the head, dropping any other entry with the same id.
pub fn at_head(notes: &[Note], note: Note) -> Vec<Note> {
    let mut next = Vec::with_capacity(notes.len() + 1);
    next.extend(notes.iter().filter(|n| n.id != note.id).cloned());
    next.insert(0, note);
    next
}

pub fn without(notes: &[Note], id: &str) -> Vec<Note> {
    notes.iter().filter(|n| n.id != id).cloned().collect()
}

/// First occurrence of each id wins.
pub fn deduplicated(notes: Vec<Note>) -> Vec<Note> {
    let mut seen = HashSet::new();
    notes
        .into_iter()
        .filter(|n| seen.insert(n.id.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(notes: &[Note]) -> Vec<&str> {
        notes.iter().map(|n| n.id.as_str()).collect()
    }

    fn sample() -> Vec<Note> {
        vec![
            Note::new("1", "One", ""),
            Note::new("2", "Two", ""),
            Note::new("3", "Three", ""),
        ]
    }

    #[test]
    fn upsert_replaces_in_place() {
        let next = upserted(&sample(), Note::new("2", "Second", ""));
        assert_eq!(ids(&next), vec!["1", "2", "3"]);
        assert_eq!(next[1].title, "Second");
    }

    #[test]
    fn upsert_inserts_unknown_at_head() {
        let next = upserted(&sample(), Note::new("9", "Nine", ""));
        assert_eq!(ids(&next), vec!["9", "1", "2", "3"]);
    }

    #[test]
    fn at_head_moves_existing_entry() {
        let next = at_head(&sample(), Note::new("3", "Three again", ""));
        assert_eq!(ids(&next), vec!["3", "1", "2"]);
        assert_eq!(next[0].title, "Three again");
    }

    #[test]
    fn without_drops_only_matching_id() {
        assert_eq!(ids(&without(&sample(), "2")), vec!["1", "3"]);
        assert_eq!(without(&sample(), "missing").len(), 3);
    }

    #[test]
    fn dedup_keeps_first() {
        let mut notes = sample();
        notes.push(Note::new("1", "Dup", ""));
        let unique = deduplicated(notes);
        assert_eq!(ids(&unique), vec!["1", "2", "3"]);
        assert_eq!(unique[0].title, "One");
    }

    #[test]
    fn find_by_id() {
        let notes = sample();
        assert_eq!(find(&notes, "3").map(|n| n.title.as_str()), Some("Three"));
        assert!(find(&notes, "4").is_none());
    }
}
