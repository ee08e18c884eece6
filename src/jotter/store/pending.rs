use super::list;
use crate::model::Note;

/// An optimistic mutation that has been applied locally but not yet settled.
///
/// Each variant holds exactly what is needed to confirm or undo it, so two
/// overlapping operations never share captured state.
#[derive(Debug, Clone)]
pub enum PendingOp {
    /// A provisional note under a placeholder id.
    Create { provisional: Note },
    /// `snapshot` is the note as it was before `patched` replaced it.
    Update { snapshot: Note, patched: Note },
    /// The entity taken out of the list.
    Remove { removed: Note },
}

impl PendingOp {
    pub fn label(&self) -> &'static str {
        match self {
            PendingOp::Create { .. } => "create",
            PendingOp::Update { .. } => "update",
            PendingOp::Remove { .. } => "remove",
        }
    }

    /// The optimistic step.
    pub fn apply(&self, notes: &[Note]) -> Vec<Note> {
        match self {
            PendingOp::Create { provisional } => list::at_head(notes, provisional.clone()),
            PendingOp::Update { patched, .. } => list::upserted(notes, patched.clone()),
            PendingOp::Remove { removed } => list::without(notes, &removed.id),
        }
    }

    /// Swap in the server's copy. A removal has nothing to confirm.
    pub fn confirm(&self, notes: &[Note], confirmed: Note) -> Vec<Note> {
        match self {
            PendingOp::Create { provisional } => {
                list::at_head(&list::without(notes, &provisional.id), confirmed)
            }
            PendingOp::Update { .. } => list::upserted(notes, confirmed),
            PendingOp::Remove { .. } => notes.to_vec(),
        }
    }

    /// The inverse of [`PendingOp::apply`].
    ///
    /// A failed create is deleted rather than restored since the server never
    /// had it. A failed removal comes back at the head, not its old slot.
    pub fn rollback(&self, notes: &[Note]) -> Vec<Note> {
        match self {
            PendingOp::Create { provisional } => list::without(notes, &provisional.id),
            PendingOp::Update { snapshot, .. } => list::upserted(notes, snapshot.clone()),
            PendingOp::Remove { removed } => list::at_head(notes, removed.clone()),
        }
    }
}
